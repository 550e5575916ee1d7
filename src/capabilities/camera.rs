use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Barcode scanner callback interval the shell configures on the camera
/// view while QR mode is active.
pub const QR_SCAN_INTERVAL_MS: u64 = 500;

#[derive(Clone)]
pub struct Camera<E> {
    context: CapabilityContext<CameraOperation, E>,
}

impl<Ev> Capability<Ev> for Camera<Ev> {
    type Operation = CameraOperation;
    type MappedSelf<MappedEv> = Camera<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        Camera::new(self.context.map_event(f))
    }
}

impl<E> Camera<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<CameraOperation, E>) -> Self {
        Self { context }
    }

    pub fn check_permission<F>(&self, kind: CameraPermission, callback: F)
    where
        F: FnOnce(CameraResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(CameraOperation::CheckPermission { kind })
                .await;
            ctx.update_app(callback(result));
        });
    }

    pub fn request_permission<F>(&self, kind: CameraPermission, callback: F)
    where
        F: FnOnce(CameraResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(CameraOperation::RequestPermission { kind })
                .await;
            ctx.update_app(callback(result));
        });
    }

    /// Captures a still photo into the app's document directory. The shell
    /// answers with the saved file name; the gallery picks it up on its
    /// next listing pass.
    pub fn capture_photo<F>(&self, facing: CameraFacing, callback: F)
    where
        F: FnOnce(CameraResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(CameraOperation::CapturePhoto { facing })
                .await;
            ctx.update_app(callback(result));
        });
    }

    pub fn start_recording<F>(&self, facing: CameraFacing, callback: F)
    where
        F: FnOnce(CameraResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(CameraOperation::StartRecording { facing })
                .await;
            ctx.update_app(callback(result));
        });
    }

    /// Stops an in-flight recording. The shell answers the original
    /// `StartRecording` request with the saved file; this one only
    /// acknowledges the stop.
    pub fn stop_recording<F>(&self, callback: F)
    where
        F: FnOnce(CameraResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(CameraOperation::StopRecording).await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraOperation {
    CheckPermission { kind: CameraPermission },
    RequestPermission { kind: CameraPermission },
    CapturePhoto { facing: CameraFacing },
    StartRecording { facing: CameraFacing },
    StopRecording,
}

impl Operation for CameraOperation {
    type Output = CameraResult;
}

/// The two runtime permissions the capture screen needs: video recording
/// also records audio, so the microphone is requested alongside the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CameraPermission {
    Camera,
    Microphone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraFacing {
    #[default]
    Back,
    Front,
}

impl CameraFacing {
    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Back => Self::Front,
            Self::Front => Self::Back,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Front => "front",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PermissionStatus {
    Granted,
    Denied,
    DeniedPermanently,
    NotDetermined,
}

impl PermissionStatus {
    #[must_use]
    pub const fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    /// Mirrors the platform's "can ask again" flag: prompting is only
    /// useful before the user has permanently denied.
    #[must_use]
    pub const fn can_request(self) -> bool {
        matches!(self, Self::NotDetermined | Self::Denied)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraOutput {
    PermissionStatus {
        kind: CameraPermission,
        status: PermissionStatus,
    },
    /// A capture or recording finished and was written to the document
    /// directory under `file_name`.
    Saved {
        file_name: String,
    },
    RecordingStarted,
    RecordingStopped,
    Cancelled,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum CameraError {
    #[error("camera permission denied")]
    PermissionDenied,

    #[error("camera unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("capture failed: {reason}")]
    CaptureFailed { reason: String },

    #[error("no recording in progress")]
    NotRecording,

    #[error("another capture is in progress")]
    Busy,
}

impl CameraError {
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. } | Self::Busy)
    }
}

pub type CameraResult = Result<CameraOutput, CameraError>;
