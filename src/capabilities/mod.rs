mod camera;
mod media_store;
mod network;

pub use self::camera::{
    Camera, CameraError, CameraFacing, CameraOperation, CameraOutput, CameraPermission,
    CameraResult, PermissionStatus, QR_SCAN_INTERVAL_MS,
};
pub use self::media_store::{
    MediaStore, MediaStoreError, MediaStoreOperation, MediaStoreOutput, MediaStoreResult,
};
pub use self::network::{Network, NetworkOperation, NetworkStatus};

// We use Crux's built-in Render and Http capabilities directly; everything
// the shell provides beyond that (camera, document directory, media
// library, connectivity) is a custom capability in this module.
pub use crux_core::render::Render;
pub use crux_http::Http;

use crate::app::App;
use crate::Event;

pub type AppHttp = Http<Event>;
pub type AppRender = Render<Event>;
pub type AppCamera = Camera<Event>;
pub type AppMediaStore = MediaStore<Event>;
pub type AppNetwork = Network<Event>;

#[derive(crux_core::macros::Effect)]
pub struct Capabilities {
    pub http: Http<Event>,
    pub render: Render<Event>,
    pub camera: Camera<Event>,
    pub media_store: MediaStore<Event>,
    pub network: Network<Event>,
}
