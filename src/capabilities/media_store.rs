use crux_core::capability::{Capability, CapabilityContext, Operation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::camera::PermissionStatus;

/// Access to the app's document directory and the OS media library.
///
/// The shell owns the filesystem; the core only ever sees file names and
/// full URIs. Listing is re-requested on every gallery focus, nothing is
/// cached across passes.
#[derive(Clone)]
pub struct MediaStore<E> {
    context: CapabilityContext<MediaStoreOperation, E>,
}

impl<Ev> Capability<Ev> for MediaStore<Ev> {
    type Operation = MediaStoreOperation;
    type MappedSelf<MappedEv> = MediaStore<MappedEv>;

    fn map_event<F, NewEv>(&self, f: F) -> Self::MappedSelf<NewEv>
    where
        F: Fn(NewEv) -> Ev + Send + Sync + 'static,
        Ev: 'static,
        NewEv: 'static + Send,
    {
        MediaStore::new(self.context.map_event(f))
    }
}

impl<E> MediaStore<E>
where
    E: 'static,
{
    pub fn new(context: CapabilityContext<MediaStoreOperation, E>) -> Self {
        Self { context }
    }

    /// Lists the file names in the document directory.
    pub fn list_files<F>(&self, callback: F)
    where
        F: FnOnce(MediaStoreResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx.request_from_shell(MediaStoreOperation::ListFiles).await;
            ctx.update_app(callback(result));
        });
    }

    pub fn file_exists<F>(&self, uri: impl Into<String>, callback: F)
    where
        F: FnOnce(MediaStoreResult) -> E + Send + 'static,
    {
        let uri = uri.into();
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(MediaStoreOperation::FileExists { uri })
                .await;
            ctx.update_app(callback(result));
        });
    }

    pub fn delete_file<F>(&self, uri: impl Into<String>, callback: F)
    where
        F: FnOnce(MediaStoreResult) -> E + Send + 'static,
    {
        let uri = uri.into();
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(MediaStoreOperation::DeleteFile { uri })
                .await;
            ctx.update_app(callback(result));
        });
    }

    pub fn check_library_permission<F>(&self, callback: F)
    where
        F: FnOnce(MediaStoreResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(MediaStoreOperation::CheckLibraryPermission)
                .await;
            ctx.update_app(callback(result));
        });
    }

    pub fn request_library_permission<F>(&self, callback: F)
    where
        F: FnOnce(MediaStoreResult) -> E + Send + 'static,
    {
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(MediaStoreOperation::RequestLibraryPermission)
                .await;
            ctx.update_app(callback(result));
        });
    }

    /// Copies a local file into the OS-managed media library. Requires the
    /// library write permission to already be granted.
    pub fn save_to_library<F>(&self, uri: impl Into<String>, callback: F)
    where
        F: FnOnce(MediaStoreResult) -> E + Send + 'static,
    {
        let uri = uri.into();
        let ctx = self.context.clone();
        self.context.spawn(async move {
            let result = ctx
                .request_from_shell(MediaStoreOperation::SaveToLibrary { uri })
                .await;
            ctx.update_app(callback(result));
        });
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaStoreOperation {
    ListFiles,
    FileExists { uri: String },
    DeleteFile { uri: String },
    CheckLibraryPermission,
    RequestLibraryPermission,
    SaveToLibrary { uri: String },
}

impl Operation for MediaStoreOperation {
    type Output = MediaStoreResult;
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaStoreOutput {
    Listing { names: Vec<String> },
    Exists { exists: bool },
    Deleted,
    LibraryPermission { status: PermissionStatus },
    SavedToLibrary,
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
pub enum MediaStoreError {
    #[error("document directory not available")]
    Unavailable,

    #[error("file not found: {uri}")]
    NotFound { uri: String },

    #[error("media library permission denied")]
    PermissionDenied,

    #[error("{message}")]
    Io { message: String },
}

pub type MediaStoreResult = Result<MediaStoreOutput, MediaStoreError>;
