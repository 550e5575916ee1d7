#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::too_many_lines)]

pub mod capabilities;
pub mod lookup;
pub mod media;
pub mod scan;

use serde::{Deserialize, Serialize};

use crate::capabilities::{
    CameraFacing, CameraOutput, CameraPermission, CameraResult, MediaStoreOutput, MediaStoreResult,
    NetworkStatus, QR_SCAN_INTERVAL_MS,
};
use crate::lookup::{LookupError, LookupState};
use crate::media::{MediaFile, MediaKind};

pub use app::App;
pub use capabilities::{Capabilities, Effect};
pub use crux_core::App as CruxApp;

pub const SCAN_HINT_READY: &str = "Point camera at QR code";
pub const SCAN_HINT_PROCESSING: &str = "Processing...";
pub const SCAN_SUB_HINT: &str = "QR code must contain a numeric ID";
pub const LOOKUP_LOADING_TEXT: &str = "Loading item data...";
pub const GALLERY_EMPTY_TITLE: &str = "No media files found";
pub const GALLERY_EMPTY_SUBTITLE: &str =
    "Tap the camera button to capture your first photo or video";
pub const DELETE_CONFIRM_TITLE: &str = "Delete File";
pub const DELETE_CONFIRM_MESSAGE: &str = "Are you sure you want to delete this file?";

/// The four screens the shell can show. Parameters crossing the navigation
/// boundary (lookup id, viewer file name) are plain strings held on the
/// model, not enum payloads, so the screen value stays trivially
/// serializable for the FFI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Screen {
    #[default]
    Gallery,
    Capture,
    Lookup,
    MediaViewer,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    #[default]
    Qr,
    Picture,
    Video,
}

impl CameraMode {
    /// One step of the mode toggle: qr -> picture -> video -> qr.
    #[must_use]
    pub const fn cycled(self) -> Self {
        match self {
            Self::Qr => Self::Picture,
            Self::Picture => Self::Video,
            Self::Video => Self::Qr,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Qr => "qr",
            Self::Picture => "picture",
            Self::Video => "video",
        }
    }

    #[must_use]
    pub const fn indicator(self) -> &'static str {
        match self {
            Self::Qr => "QR MODE",
            Self::Picture => "PICTURE MODE",
            Self::Video => "VIDEO MODE",
        }
    }

    #[must_use]
    pub const fn is_qr(self) -> bool {
        matches!(self, Self::Qr)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PermissionState {
    #[default]
    Unknown,
    Requesting,
    Granted,
    Denied,
}

impl PermissionState {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    #[must_use]
    pub const fn is_denied(self) -> bool {
        matches!(self, Self::Denied)
    }
}

/// Modal message the shell presents over whatever screen is active.
/// Dismissal comes back as [`Event::AlertDismissed`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    pub title: String,
    pub message: String,
}

impl Alert {
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("Error", message)
    }
}

#[derive(Default)]
pub struct Model {
    pub screen: Screen,
    pub document_directory: String,

    pub camera_mode: CameraMode,
    pub camera_facing: CameraFacing,
    pub has_scanned: bool,
    pub is_recording: bool,
    pub camera_permission: PermissionState,
    pub microphone_permission: PermissionState,

    pub lookup_id: Option<String>,
    pub lookup: LookupState,
    pub lookup_generation: u64,

    pub gallery: Vec<MediaFile>,
    pub gallery_loading: bool,

    pub viewer_name: Option<String>,
    pub confirming_delete: bool,
    pub library_permission: PermissionState,

    pub active_alert: Option<Alert>,
}

impl Model {
    pub fn set_alert(&mut self, alert: Alert) {
        self.active_alert = Some(alert);
    }

    pub fn clear_alert(&mut self) {
        self.active_alert = None;
    }

    /// Full URI of the file open in the media viewer.
    #[must_use]
    pub fn viewer_uri(&self) -> Option<String> {
        self.viewer_name
            .as_ref()
            .map(|name| format!("{}{}", self.document_directory, name))
    }

    /// Invalidates any in-flight lookup and drops the lookup screen state.
    /// Responses tagged with an older generation are discarded on arrival.
    pub fn discard_lookup(&mut self) {
        self.lookup_generation += 1;
        self.lookup = LookupState::Empty;
        self.lookup_id = None;
    }
}

#[derive(Debug)]
pub enum Event {
    AppStarted {
        document_directory: String,
    },

    // Navigation
    GalleryOpened,
    CaptureOpened,
    MediaSelected {
        name: String,
    },

    // Capture screen
    CameraModeToggled,
    CameraFacingToggled,
    CameraPermissionChecked(Box<CameraResult>),
    QrCodeScanned {
        data: String,
    },
    ShutterPressed,
    CameraFinished(Box<CameraResult>),

    // Lookup screen
    LookupRequested {
        id: String,
    },
    LookupRetryRequested,
    ScanAnotherRequested,
    NetworkStatusChecked {
        generation: u64,
        status: NetworkStatus,
    },
    LookupResponse {
        generation: u64,
        response: Box<crux_http::Result<crux_http::Response<String>>>,
    },

    // Gallery screen
    GalleryListingReceived(Box<MediaStoreResult>),

    // Media viewer
    ViewerDeleteRequested,
    ViewerDeleteCancelled,
    ViewerDeleteConfirmed,
    ViewerDeleteChecked(Box<MediaStoreResult>),
    ViewerDeleteCompleted(Box<MediaStoreResult>),
    ViewerSaveRequested,
    ViewerLibraryPermission(Box<MediaStoreResult>),
    ViewerSaveCompleted(Box<MediaStoreResult>),

    AlertDismissed,
}

impl Event {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::AppStarted { .. } => "app_started",
            Self::GalleryOpened => "gallery_opened",
            Self::CaptureOpened => "capture_opened",
            Self::MediaSelected { .. } => "media_selected",
            Self::CameraModeToggled => "camera_mode_toggled",
            Self::CameraFacingToggled => "camera_facing_toggled",
            Self::CameraPermissionChecked(_) => "camera_permission_checked",
            Self::QrCodeScanned { .. } => "qr_code_scanned",
            Self::ShutterPressed => "shutter_pressed",
            Self::CameraFinished(_) => "camera_finished",
            Self::LookupRequested { .. } => "lookup_requested",
            Self::LookupRetryRequested => "lookup_retry_requested",
            Self::ScanAnotherRequested => "scan_another_requested",
            Self::NetworkStatusChecked { .. } => "network_status_checked",
            Self::LookupResponse { .. } => "lookup_response",
            Self::GalleryListingReceived(_) => "gallery_listing_received",
            Self::ViewerDeleteRequested => "viewer_delete_requested",
            Self::ViewerDeleteCancelled => "viewer_delete_cancelled",
            Self::ViewerDeleteConfirmed => "viewer_delete_confirmed",
            Self::ViewerDeleteChecked(_) => "viewer_delete_checked",
            Self::ViewerDeleteCompleted(_) => "viewer_delete_completed",
            Self::ViewerSaveRequested => "viewer_save_requested",
            Self::ViewerLibraryPermission(_) => "viewer_library_permission",
            Self::ViewerSaveCompleted(_) => "viewer_save_completed",
            Self::AlertDismissed => "alert_dismissed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureView {
    pub mode: CameraMode,
    pub mode_indicator: String,
    pub facing: CameraFacing,
    pub qr_overlay_visible: bool,
    pub scan_hint: String,
    pub scan_sub_hint: String,
    pub scan_interval_ms: u64,
    pub is_recording: bool,
    pub camera_ready: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LookupView {
    Loading {
        message: String,
    },
    Error {
        message: String,
        can_retry: bool,
    },
    Item {
        subtitle: String,
        item_id: String,
        name: String,
        thumbnail_png: Option<Vec<u8>>,
    },
    NoData {
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryView {
    pub files: Vec<MediaFile>,
    pub loading: bool,
    pub empty_title: String,
    pub empty_subtitle: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewerView {
    pub name: String,
    pub uri: String,
    pub kind: MediaKind,
    pub confirming_delete: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViewModel {
    pub screen: Screen,
    pub capture: CaptureView,
    pub lookup: LookupView,
    pub gallery: GalleryView,
    pub viewer: Option<ViewerView>,
    pub alert: Option<Alert>,
}

pub mod app {
    use super::*;
    use crate::lookup::{lookup_url, normalize_response, ItemRecord};
    use crate::media::gallery_files;
    use crate::scan::validate_payload;

    #[derive(Default)]
    pub struct App;

    impl App {
        /// Runs (or re-runs) the lookup sequence for the id on the model:
        /// Loading -> connectivity check -> fetch. Each attempt gets a fresh
        /// generation so a retry fully supersedes an in-flight load.
        fn start_lookup(model: &mut Model, caps: &Capabilities) {
            let Some(id) = model.lookup_id.clone().filter(|id| !id.is_empty()) else {
                // Terminal for this load; retry without an id stays here.
                model.lookup = LookupState::Error(LookupError::MissingId.to_string());
                return;
            };

            model.lookup_generation += 1;
            let generation = model.lookup_generation;
            model.lookup = LookupState::Loading;

            tracing::debug!(%id, generation, "starting item lookup");

            caps.network.check_connectivity(move |status| Event::NetworkStatusChecked {
                generation,
                status,
            });
        }

        fn send_lookup_request(model: &mut Model, caps: &Capabilities) {
            let Some(id) = model.lookup_id.clone() else {
                model.lookup = LookupState::Error(LookupError::MissingId.to_string());
                return;
            };

            let url = match lookup_url(&id) {
                Ok(url) => url,
                Err(e) => {
                    Self::fail_lookup(model, &e);
                    return;
                }
            };

            let generation = model.lookup_generation;
            caps.http
                .get(url.as_str())
                .header("Accept", "application/json")
                .header("Content-Type", "application/json")
                .expect_string()
                .send(move |response| Event::LookupResponse {
                    generation,
                    response: Box::new(response),
                });
        }

        fn handle_lookup_response(
            model: &mut Model,
            response: crux_http::Result<crux_http::Response<String>>,
        ) {
            match Self::lookup_outcome(response) {
                Ok(record) => {
                    model.lookup = LookupState::Success(record);
                }
                Err(e) => Self::fail_lookup(model, &e),
            }
        }

        fn lookup_outcome(
            response: crux_http::Result<crux_http::Response<String>>,
        ) -> Result<ItemRecord, LookupError> {
            let mut response = response.map_err(|e| LookupError::Transport {
                message: e.to_string(),
            })?;

            let status = response.status();
            if !status.is_success() {
                return Err(LookupError::Status {
                    status: status.into(),
                    reason: status.canonical_reason().to_string(),
                });
            }

            let body = response.take_body().unwrap_or_default();
            normalize_response(&body)
        }

        /// Every failed fetch lands in the error state and raises the same
        /// immediate alert the user sees on the item screen.
        fn fail_lookup(model: &mut Model, error: &LookupError) {
            let message = error.to_string();
            tracing::warn!(%message, "item lookup failed");
            model.lookup = LookupState::Error(message.clone());
            model.set_alert(Alert::error(format!("Failed to fetch item data: {message}")));
        }

        fn begin_gallery_refresh(model: &mut Model, caps: &Capabilities) {
            model.gallery_loading = true;
            caps.media_store
                .list_files(|result| Event::GalleryListingReceived(Box::new(result)));
        }

        fn apply_gallery_listing(model: &mut Model, result: MediaStoreResult) {
            model.gallery_loading = false;

            match result {
                Ok(MediaStoreOutput::Listing { names }) => {
                    model.gallery = gallery_files(&model.document_directory, &names);
                    tracing::debug!(
                        total = names.len(),
                        listed = model.gallery.len(),
                        "gallery listing refreshed"
                    );
                }
                Ok(other) => {
                    tracing::warn!(?other, "unexpected media store output for listing");
                }
                Err(e) => {
                    tracing::error!(error = %e, "gallery listing failed");
                    model.gallery.clear();
                    model.set_alert(Alert::error("Failed to load files from storage"));
                }
            }
        }

        fn ensure_capture_permissions(model: &mut Model, caps: &Capabilities) {
            if !model.camera_permission.is_granted() {
                caps.camera.check_permission(CameraPermission::Camera, |result| {
                    Event::CameraPermissionChecked(Box::new(result))
                });
            }
            if !model.microphone_permission.is_granted() {
                caps.camera
                    .check_permission(CameraPermission::Microphone, |result| {
                        Event::CameraPermissionChecked(Box::new(result))
                    });
            }
        }

        fn apply_camera_permission(model: &mut Model, caps: &Capabilities, result: CameraResult) {
            match result {
                Ok(CameraOutput::PermissionStatus { kind, status }) => {
                    let slot = match kind {
                        CameraPermission::Camera => &mut model.camera_permission,
                        CameraPermission::Microphone => &mut model.microphone_permission,
                    };

                    if status.is_granted() {
                        *slot = PermissionState::Granted;
                    } else if *slot == PermissionState::Requesting {
                        // The prompt itself came back negative.
                        *slot = PermissionState::Denied;
                    } else if status.can_request() {
                        *slot = PermissionState::Requesting;
                        caps.camera.request_permission(kind, |result| {
                            Event::CameraPermissionChecked(Box::new(result))
                        });
                    } else {
                        *slot = PermissionState::Denied;
                    }
                }
                Ok(other) => {
                    tracing::warn!(?other, "unexpected camera output for permission check");
                }
                Err(e) => {
                    tracing::error!(error = %e, "camera permission check failed");
                }
            }
        }

        fn apply_camera_result(model: &mut Model, result: CameraResult) {
            match result {
                Ok(CameraOutput::Saved { file_name }) => {
                    model.is_recording = false;
                    tracing::info!(%file_name, "capture saved to document directory");
                }
                Ok(CameraOutput::RecordingStarted) => {
                    model.is_recording = true;
                }
                Ok(CameraOutput::RecordingStopped | CameraOutput::Cancelled) => {
                    model.is_recording = false;
                }
                Ok(CameraOutput::PermissionStatus { .. }) => {
                    tracing::warn!("permission status delivered on capture channel");
                }
                Err(e) => {
                    model.is_recording = false;
                    model.set_alert(Alert::error(e.to_string()));
                }
            }
        }

        fn build_lookup_view(model: &Model) -> LookupView {
            let id_text = model.lookup_id.clone().unwrap_or_default();

            match &model.lookup {
                LookupState::Loading => LookupView::Loading {
                    message: LOOKUP_LOADING_TEXT.to_string(),
                },
                LookupState::Error(message) => LookupView::Error {
                    message: message.clone(),
                    can_retry: true,
                },
                LookupState::Success(record) => LookupView::Item {
                    subtitle: format!("ID: {id_text}"),
                    item_id: record.item_id_text(),
                    name: record.name_text(),
                    thumbnail_png: record.decoded_thumbnail_png(),
                },
                LookupState::Empty => LookupView::NoData {
                    message: format!("No data available for ID: {id_text}"),
                },
            }
        }

        fn build_viewer_view(model: &Model) -> Option<ViewerView> {
            let name = model.viewer_name.clone()?;
            let uri = model.viewer_uri()?;
            let kind = MediaKind::classify(&uri);

            Some(ViewerView {
                name,
                uri,
                kind,
                confirming_delete: model.confirming_delete,
            })
        }
    }

    impl crux_core::App for App {
        type Event = Event;
        type Model = Model;
        type ViewModel = ViewModel;
        type Capabilities = Capabilities;

        fn update(&self, event: Event, model: &mut Model, caps: &Capabilities) {
            tracing::debug!(event = event.name(), "dispatching event");

            match event {
                Event::AppStarted { document_directory } => {
                    model.document_directory = document_directory;
                    self.update(Event::GalleryOpened, model, caps);
                }

                Event::GalleryOpened => {
                    model.screen = Screen::Gallery;
                    model.viewer_name = None;
                    model.confirming_delete = false;
                    model.discard_lookup();
                    Self::begin_gallery_refresh(model, caps);
                    caps.render.render();
                }

                Event::CaptureOpened => {
                    model.screen = Screen::Capture;
                    model.camera_mode = CameraMode::Qr;
                    model.camera_facing = CameraFacing::Back;
                    model.has_scanned = false;
                    model.is_recording = false;
                    model.discard_lookup();
                    Self::ensure_capture_permissions(model, caps);
                    caps.render.render();
                }

                Event::MediaSelected { name } => {
                    model.screen = Screen::MediaViewer;
                    model.viewer_name = Some(name);
                    model.confirming_delete = false;
                    caps.render.render();
                }

                Event::CameraModeToggled => {
                    model.camera_mode = model.camera_mode.cycled();
                    model.has_scanned = false;
                    caps.render.render();
                }

                Event::CameraFacingToggled => {
                    model.camera_facing = model.camera_facing.toggled();
                    caps.render.render();
                }

                Event::CameraPermissionChecked(result) => {
                    Self::apply_camera_permission(model, caps, *result);
                    caps.render.render();
                }

                Event::QrCodeScanned { data } => {
                    // Scan callbacks fire repeatedly for the same visible
                    // code; the latch admits one detection per armed period.
                    if model.screen != Screen::Capture
                        || !model.camera_mode.is_qr()
                        || model.has_scanned
                        || data.is_empty()
                    {
                        return;
                    }

                    model.has_scanned = true;

                    match validate_payload(&data) {
                        Ok(id) => {
                            tracing::info!(%id, "QR code accepted");
                            self.update(
                                Event::LookupRequested { id: id.to_string() },
                                model,
                                caps,
                            );
                        }
                        Err(e) => {
                            tracing::debug!(error = %e, "QR code rejected");
                            model.set_alert(Alert::new("Invalid QR Code", e.to_string()));
                            caps.render.render();
                        }
                    }
                }

                Event::ShutterPressed => match model.camera_mode {
                    CameraMode::Qr => {}
                    CameraMode::Picture => {
                        caps.camera.capture_photo(model.camera_facing, |result| {
                            Event::CameraFinished(Box::new(result))
                        });
                    }
                    CameraMode::Video => {
                        if model.is_recording {
                            caps.camera
                                .stop_recording(|result| Event::CameraFinished(Box::new(result)));
                        } else {
                            caps.camera.start_recording(model.camera_facing, |result| {
                                Event::CameraFinished(Box::new(result))
                            });
                        }
                    }
                },

                Event::CameraFinished(result) => {
                    Self::apply_camera_result(model, *result);
                    caps.render.render();
                }

                Event::LookupRequested { id } => {
                    model.screen = Screen::Lookup;
                    model.lookup_id = if id.is_empty() { None } else { Some(id) };
                    Self::start_lookup(model, caps);
                    caps.render.render();
                }

                Event::LookupRetryRequested => {
                    Self::start_lookup(model, caps);
                    caps.render.render();
                }

                Event::ScanAnotherRequested => {
                    self.update(Event::CaptureOpened, model, caps);
                }

                Event::NetworkStatusChecked { generation, status } => {
                    if generation != model.lookup_generation {
                        tracing::debug!(generation, "discarding stale connectivity result");
                        return;
                    }

                    if status.connected {
                        Self::send_lookup_request(model, caps);
                    } else {
                        Self::fail_lookup(model, &LookupError::Offline);
                    }
                    caps.render.render();
                }

                Event::LookupResponse {
                    generation,
                    response,
                } => {
                    if generation != model.lookup_generation {
                        tracing::debug!(generation, "discarding stale lookup response");
                        return;
                    }

                    Self::handle_lookup_response(model, *response);
                    caps.render.render();
                }

                Event::GalleryListingReceived(result) => {
                    Self::apply_gallery_listing(model, *result);
                    caps.render.render();
                }

                Event::ViewerDeleteRequested => {
                    model.confirming_delete = true;
                    caps.render.render();
                }

                Event::ViewerDeleteCancelled => {
                    model.confirming_delete = false;
                    caps.render.render();
                }

                Event::ViewerDeleteConfirmed => {
                    model.confirming_delete = false;
                    if let Some(uri) = model.viewer_uri() {
                        caps.media_store.file_exists(uri, |result| {
                            Event::ViewerDeleteChecked(Box::new(result))
                        });
                    }
                    caps.render.render();
                }

                Event::ViewerDeleteChecked(result) => {
                    match *result {
                        Ok(MediaStoreOutput::Exists { exists: true }) => {
                            if let Some(uri) = model.viewer_uri() {
                                caps.media_store.delete_file(uri, |result| {
                                    Event::ViewerDeleteCompleted(Box::new(result))
                                });
                            }
                        }
                        Ok(MediaStoreOutput::Exists { exists: false }) => {
                            model.set_alert(Alert::error("File does not exist."));
                        }
                        Ok(other) => {
                            tracing::warn!(?other, "unexpected media store output for exists");
                        }
                        Err(e) => {
                            model.set_alert(Alert::error(format!("Delete failed: {e}")));
                        }
                    }
                    caps.render.render();
                }

                Event::ViewerDeleteCompleted(result) => match *result {
                    Ok(MediaStoreOutput::Deleted) => {
                        tracing::info!("file deleted, returning to gallery");
                        self.update(Event::GalleryOpened, model, caps);
                    }
                    Ok(other) => {
                        tracing::warn!(?other, "unexpected media store output for delete");
                        caps.render.render();
                    }
                    Err(e) => {
                        model.set_alert(Alert::error(format!("Delete failed: {e}")));
                        caps.render.render();
                    }
                },

                Event::ViewerSaveRequested => {
                    if model.library_permission.is_granted() {
                        if let Some(uri) = model.viewer_uri() {
                            caps.media_store.save_to_library(uri, |result| {
                                Event::ViewerSaveCompleted(Box::new(result))
                            });
                        }
                    } else {
                        model.library_permission = PermissionState::Requesting;
                        caps.media_store.request_library_permission(|result| {
                            Event::ViewerLibraryPermission(Box::new(result))
                        });
                    }
                    caps.render.render();
                }

                Event::ViewerLibraryPermission(result) => {
                    match *result {
                        Ok(MediaStoreOutput::LibraryPermission { status })
                            if status.is_granted() =>
                        {
                            model.library_permission = PermissionState::Granted;
                            if let Some(uri) = model.viewer_uri() {
                                caps.media_store.save_to_library(uri, |result| {
                                    Event::ViewerSaveCompleted(Box::new(result))
                                });
                            }
                        }
                        Ok(MediaStoreOutput::LibraryPermission { .. }) => {
                            model.library_permission = PermissionState::Denied;
                            model.set_alert(Alert::new(
                                "Permission Required",
                                "Please grant permission to save to gallery.",
                            ));
                        }
                        Ok(other) => {
                            tracing::warn!(?other, "unexpected media store output for permission");
                        }
                        Err(e) => {
                            model.library_permission = PermissionState::Denied;
                            model.set_alert(Alert::error(format!("Failed to save media: {e}")));
                        }
                    }
                    caps.render.render();
                }

                Event::ViewerSaveCompleted(result) => {
                    match *result {
                        Ok(MediaStoreOutput::SavedToLibrary) => {
                            model.set_alert(Alert::new("Success", "Saved to gallery."));
                        }
                        Ok(other) => {
                            tracing::warn!(?other, "unexpected media store output for save");
                        }
                        Err(e) => {
                            model.set_alert(Alert::error(format!("Failed to save media: {e}")));
                        }
                    }
                    caps.render.render();
                }

                Event::AlertDismissed => {
                    model.clear_alert();
                    if model.screen == Screen::Capture {
                        // Acknowledging a scan error re-arms the scanner.
                        model.has_scanned = false;
                    }
                    caps.render.render();
                }
            }
        }

        fn view(&self, model: &Model) -> ViewModel {
            let capture = CaptureView {
                mode: model.camera_mode,
                mode_indicator: model.camera_mode.indicator().to_string(),
                facing: model.camera_facing,
                qr_overlay_visible: model.camera_mode.is_qr(),
                scan_hint: if model.has_scanned {
                    SCAN_HINT_PROCESSING.to_string()
                } else {
                    SCAN_HINT_READY.to_string()
                },
                scan_sub_hint: SCAN_SUB_HINT.to_string(),
                scan_interval_ms: QR_SCAN_INTERVAL_MS,
                is_recording: model.is_recording,
                camera_ready: model.camera_permission.is_granted(),
            };

            let gallery = GalleryView {
                files: model.gallery.clone(),
                loading: model.gallery_loading,
                empty_title: GALLERY_EMPTY_TITLE.to_string(),
                empty_subtitle: GALLERY_EMPTY_SUBTITLE.to_string(),
            };

            ViewModel {
                screen: model.screen,
                capture,
                lookup: Self::build_lookup_view(model),
                gallery,
                viewer: Self::build_viewer_view(model),
                alert: model.active_alert.clone(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capabilities::{CameraError, MediaStoreError, PermissionStatus};
    use crux_core::testing::AppTester;

    fn tester() -> AppTester<App, Effect> {
        AppTester::default()
    }

    fn capture_ready_model() -> Model {
        Model {
            document_directory: "file:///documents/".to_string(),
            screen: Screen::Capture,
            camera_permission: PermissionState::Granted,
            microphone_permission: PermissionState::Granted,
            ..Model::default()
        }
    }

    #[test]
    fn mode_toggle_cycles_and_resets_latch() {
        let app = tester();
        let mut model = capture_ready_model();
        model.has_scanned = true;

        app.update(Event::CameraModeToggled, &mut model);
        assert_eq!(model.camera_mode, CameraMode::Picture);
        assert!(!model.has_scanned);

        app.update(Event::CameraModeToggled, &mut model);
        assert_eq!(model.camera_mode, CameraMode::Video);

        app.update(Event::CameraModeToggled, &mut model);
        assert_eq!(model.camera_mode, CameraMode::Qr);
    }

    #[test]
    fn valid_scan_navigates_to_lookup() {
        let app = tester();
        let mut model = capture_ready_model();

        let update = app.update(
            Event::QrCodeScanned {
                data: "42".to_string(),
            },
            &mut model,
        );

        assert!(model.has_scanned);
        assert_eq!(model.screen, Screen::Lookup);
        assert_eq!(model.lookup_id.as_deref(), Some("42"));
        assert!(model.lookup.is_loading());
        assert!(update
            .effects
            .iter()
            .any(|e| matches!(e, Effect::Network(_))));
    }

    #[test]
    fn repeated_scans_are_debounced() {
        let app = tester();
        let mut model = capture_ready_model();

        let first = app.update(
            Event::QrCodeScanned {
                data: "42".to_string(),
            },
            &mut model,
        );
        let generation_after_first = model.lookup_generation;
        assert!(first.effects.iter().any(|e| matches!(e, Effect::Network(_))));

        // Latched: the second detection of the same visible code is a no-op.
        let second = app.update(
            Event::QrCodeScanned {
                data: "42".to_string(),
            },
            &mut model,
        );
        assert_eq!(model.lookup_generation, generation_after_first);
        assert!(second.effects.is_empty());
    }

    #[test]
    fn empty_scan_data_is_ignored() {
        let app = tester();
        let mut model = capture_ready_model();

        let update = app.update(
            Event::QrCodeScanned {
                data: String::new(),
            },
            &mut model,
        );

        assert!(!model.has_scanned);
        assert!(update.effects.is_empty());
    }

    #[test]
    fn scans_outside_qr_mode_are_ignored() {
        let app = tester();
        let mut model = capture_ready_model();
        model.camera_mode = CameraMode::Picture;

        app.update(
            Event::QrCodeScanned {
                data: "42".to_string(),
            },
            &mut model,
        );

        assert!(!model.has_scanned);
        assert_eq!(model.screen, Screen::Capture);
    }

    #[test]
    fn invalid_scan_raises_alert_and_dismissal_rearms() {
        let app = tester();
        let mut model = capture_ready_model();

        app.update(
            Event::QrCodeScanned {
                data: "abc".to_string(),
            },
            &mut model,
        );

        assert!(model.has_scanned);
        assert_eq!(model.screen, Screen::Capture);
        let alert = model.active_alert.clone().expect("alert should be raised");
        assert_eq!(alert.title, "Invalid QR Code");
        assert_eq!(alert.message, "QR code must contain a valid numeric ID");

        app.update(Event::AlertDismissed, &mut model);
        assert!(model.active_alert.is_none());
        assert!(!model.has_scanned);
    }

    #[test]
    fn lookup_without_id_is_terminal_error() {
        let app = tester();
        let mut model = Model::default();

        let update = app.update(Event::LookupRequested { id: String::new() }, &mut model);

        assert_eq!(model.screen, Screen::Lookup);
        assert_eq!(
            model.lookup,
            LookupState::Error("No ID provided".to_string())
        );
        // No connectivity check, no fetch.
        assert!(!update
            .effects
            .iter()
            .any(|e| matches!(e, Effect::Network(_) | Effect::Http(_))));
    }

    #[test]
    fn disconnected_network_fails_without_fetch() {
        let app = tester();
        let mut model = Model::default();

        app.update(
            Event::LookupRequested {
                id: "18".to_string(),
            },
            &mut model,
        );
        let generation = model.lookup_generation;

        let update = app.update(
            Event::NetworkStatusChecked {
                generation,
                status: NetworkStatus::disconnected(),
            },
            &mut model,
        );

        assert_eq!(
            model.lookup,
            LookupState::Error(
                "No internet connection. Please check your network and try again.".to_string()
            )
        );
        assert!(!update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
        let alert = model.active_alert.clone().expect("alert should be raised");
        assert!(alert.message.starts_with("Failed to fetch item data:"));
    }

    #[test]
    fn connected_network_issues_fetch() {
        let app = tester();
        let mut model = Model::default();

        app.update(
            Event::LookupRequested {
                id: "18".to_string(),
            },
            &mut model,
        );
        let generation = model.lookup_generation;

        let update = app.update(
            Event::NetworkStatusChecked {
                generation,
                status: NetworkStatus::connected(),
            },
            &mut model,
        );

        assert!(model.lookup.is_loading());
        assert!(update.effects.iter().any(|e| matches!(e, Effect::Http(_))));
    }

    #[test]
    fn stale_connectivity_results_are_discarded() {
        let app = tester();
        let mut model = Model::default();

        app.update(
            Event::LookupRequested {
                id: "18".to_string(),
            },
            &mut model,
        );
        let stale_generation = model.lookup_generation;

        // A retry supersedes the in-flight attempt.
        app.update(Event::LookupRetryRequested, &mut model);
        assert!(model.lookup_generation > stale_generation);

        let update = app.update(
            Event::NetworkStatusChecked {
                generation: stale_generation,
                status: NetworkStatus::disconnected(),
            },
            &mut model,
        );

        // The stale result neither changes state nor spawns effects.
        assert!(model.lookup.is_loading());
        assert!(update.effects.is_empty());
    }

    #[test]
    fn scan_another_returns_to_armed_capture() {
        let app = tester();
        let mut model = Model {
            screen: Screen::Lookup,
            lookup_id: Some("18".to_string()),
            lookup: LookupState::Error("boom".to_string()),
            ..Model::default()
        };

        app.update(Event::ScanAnotherRequested, &mut model);

        assert_eq!(model.screen, Screen::Capture);
        assert!(!model.has_scanned);
        assert_eq!(model.camera_mode, CameraMode::Qr);
        assert_eq!(model.lookup, LookupState::Empty);
        assert!(model.lookup_id.is_none());
    }

    #[test]
    fn gallery_listing_is_classified_and_filtered() {
        let app = tester();
        let mut model = Model {
            document_directory: "file:///documents/".to_string(),
            ..Model::default()
        };

        app.update(Event::GalleryOpened, &mut model);
        assert!(model.gallery_loading);

        app.update(
            Event::GalleryListingReceived(Box::new(Ok(MediaStoreOutput::Listing {
                names: vec![
                    "a.jpg".to_string(),
                    "clip.mov".to_string(),
                    "anim.gif".to_string(),
                    "notes.txt".to_string(),
                ],
            }))),
            &mut model,
        );

        assert!(!model.gallery_loading);
        assert_eq!(model.gallery.len(), 2);
        assert_eq!(model.gallery[0].kind, MediaKind::Image);
        assert_eq!(model.gallery[1].kind, MediaKind::Video);
        assert_eq!(model.gallery[1].uri, "file:///documents/clip.mov");
    }

    #[test]
    fn gallery_listing_failure_empties_list_and_alerts() {
        let app = tester();
        let mut model = Model {
            gallery: vec![MediaFile::new("file:///d/", "old.jpg")],
            ..Model::default()
        };

        app.update(
            Event::GalleryListingReceived(Box::new(Err(MediaStoreError::Unavailable))),
            &mut model,
        );

        assert!(model.gallery.is_empty());
        let alert = model.active_alert.clone().expect("alert should be raised");
        assert_eq!(alert.message, "Failed to load files from storage");
    }

    #[test]
    fn delete_flow_checks_existence_first() {
        let app = tester();
        let mut model = Model {
            document_directory: "file:///documents/".to_string(),
            screen: Screen::MediaViewer,
            viewer_name: Some("a.jpg".to_string()),
            ..Model::default()
        };

        app.update(Event::ViewerDeleteRequested, &mut model);
        assert!(model.confirming_delete);

        let update = app.update(Event::ViewerDeleteConfirmed, &mut model);
        assert!(!model.confirming_delete);
        assert!(update
            .effects
            .iter()
            .any(|e| matches!(e, Effect::MediaStore(_))));

        app.update(
            Event::ViewerDeleteChecked(Box::new(Ok(MediaStoreOutput::Exists { exists: false }))),
            &mut model,
        );
        let alert = model.active_alert.clone().expect("alert should be raised");
        assert_eq!(alert.message, "File does not exist.");
    }

    #[test]
    fn successful_delete_returns_to_gallery() {
        let app = tester();
        let mut model = Model {
            document_directory: "file:///documents/".to_string(),
            screen: Screen::MediaViewer,
            viewer_name: Some("a.jpg".to_string()),
            ..Model::default()
        };

        let update = app.update(
            Event::ViewerDeleteCompleted(Box::new(Ok(MediaStoreOutput::Deleted))),
            &mut model,
        );

        assert_eq!(model.screen, Screen::Gallery);
        assert!(model.viewer_name.is_none());
        // Navigating back refreshes the listing.
        assert!(update
            .effects
            .iter()
            .any(|e| matches!(e, Effect::MediaStore(_))));
    }

    #[test]
    fn save_denied_permission_aborts_with_alert() {
        let app = tester();
        let mut model = Model {
            document_directory: "file:///documents/".to_string(),
            screen: Screen::MediaViewer,
            viewer_name: Some("a.jpg".to_string()),
            ..Model::default()
        };

        let update = app.update(Event::ViewerSaveRequested, &mut model);
        assert_eq!(model.library_permission, PermissionState::Requesting);
        assert!(update
            .effects
            .iter()
            .any(|e| matches!(e, Effect::MediaStore(_))));

        let update = app.update(
            Event::ViewerLibraryPermission(Box::new(Ok(MediaStoreOutput::LibraryPermission {
                status: PermissionStatus::Denied,
            }))),
            &mut model,
        );

        assert_eq!(model.library_permission, PermissionState::Denied);
        let alert = model.active_alert.clone().expect("alert should be raised");
        assert_eq!(alert.title, "Permission Required");
        assert_eq!(alert.message, "Please grant permission to save to gallery.");
        // No save was attempted.
        assert!(!update
            .effects
            .iter()
            .any(|e| matches!(e, Effect::MediaStore(_))));
    }

    #[test]
    fn save_granted_permission_saves_and_confirms() {
        let app = tester();
        let mut model = Model {
            document_directory: "file:///documents/".to_string(),
            screen: Screen::MediaViewer,
            viewer_name: Some("clip.mov".to_string()),
            ..Model::default()
        };

        app.update(Event::ViewerSaveRequested, &mut model);
        let update = app.update(
            Event::ViewerLibraryPermission(Box::new(Ok(MediaStoreOutput::LibraryPermission {
                status: PermissionStatus::Granted,
            }))),
            &mut model,
        );
        assert_eq!(model.library_permission, PermissionState::Granted);
        assert!(update
            .effects
            .iter()
            .any(|e| matches!(e, Effect::MediaStore(_))));

        app.update(
            Event::ViewerSaveCompleted(Box::new(Ok(MediaStoreOutput::SavedToLibrary))),
            &mut model,
        );
        let alert = model.active_alert.clone().expect("alert should be raised");
        assert_eq!(alert.title, "Success");
        assert_eq!(alert.message, "Saved to gallery.");
    }

    #[test]
    fn capture_failure_raises_alert() {
        let app = tester();
        let mut model = capture_ready_model();
        model.camera_mode = CameraMode::Picture;

        app.update(
            Event::CameraFinished(Box::new(Err(CameraError::CaptureFailed {
                reason: "sensor busy".to_string(),
            }))),
            &mut model,
        );

        let alert = model.active_alert.clone().expect("alert should be raised");
        assert_eq!(alert.message, "capture failed: sensor busy");
    }

    #[test]
    fn recording_lifecycle_tracks_shell_responses() {
        let app = tester();
        let mut model = capture_ready_model();
        model.camera_mode = CameraMode::Video;

        app.update(
            Event::CameraFinished(Box::new(Ok(CameraOutput::RecordingStarted))),
            &mut model,
        );
        assert!(model.is_recording);

        app.update(
            Event::CameraFinished(Box::new(Ok(CameraOutput::Saved {
                file_name: "clip.mp4".to_string(),
            }))),
            &mut model,
        );
        assert!(!model.is_recording);
    }

    #[test]
    fn view_reflects_scan_latch() {
        let app = tester();
        let mut model = capture_ready_model();

        let view = app.view(&model);
        assert_eq!(view.capture.scan_hint, SCAN_HINT_READY);
        assert!(view.capture.qr_overlay_visible);
        assert_eq!(view.capture.scan_interval_ms, 500);

        model.has_scanned = true;
        let view = app.view(&model);
        assert_eq!(view.capture.scan_hint, SCAN_HINT_PROCESSING);
    }

    #[test]
    fn view_renders_lookup_states() {
        let app = tester();
        let mut model = Model {
            screen: Screen::Lookup,
            lookup_id: Some("18".to_string()),
            ..Model::default()
        };

        model.lookup = LookupState::Loading;
        assert_eq!(
            app.view(&model).lookup,
            LookupView::Loading {
                message: LOOKUP_LOADING_TEXT.to_string()
            }
        );

        model.lookup = LookupState::Error("boom".to_string());
        assert_eq!(
            app.view(&model).lookup,
            LookupView::Error {
                message: "boom".to_string(),
                can_retry: true
            }
        );

        model.lookup = LookupState::Success(
            crate::lookup::normalize_response(r#"{"ItmID":18,"ItmNm":"Widget"}"#).unwrap(),
        );
        let view = app.view(&model);
        match view.lookup {
            LookupView::Item {
                subtitle,
                item_id,
                name,
                thumbnail_png,
            } => {
                assert_eq!(subtitle, "ID: 18");
                assert_eq!(item_id, "18");
                assert_eq!(name, "Widget");
                assert!(thumbnail_png.is_none());
            }
            other => panic!("expected item view, got {other:?}"),
        }
    }

    #[test]
    fn view_derives_viewer_kind_from_uri() {
        let app = tester();
        let model = Model {
            document_directory: "file:///documents/".to_string(),
            screen: Screen::MediaViewer,
            viewer_name: Some("clip.mov".to_string()),
            ..Model::default()
        };

        let viewer = app.view(&model).viewer.expect("viewer should be present");
        assert_eq!(viewer.uri, "file:///documents/clip.mov");
        assert_eq!(viewer.kind, MediaKind::Video);
        assert!(!viewer.confirming_delete);
    }
}
