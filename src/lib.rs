pub mod api;
pub mod auth;
pub mod config;
pub mod events;
pub mod library;
pub mod snapshot;
pub mod store;
pub mod sync;
pub mod utils;

pub use api::{ApiError, ArticlesApi, AuthApi, HttpApiClient, RemoteArticle, build_http_client};
pub use auth::{
    AuthenticatedCaller, CallError, CredentialError, CredentialStore, FileCredentialStore,
    MemoryCredentialStore, Session,
};
pub use config::{StashConfig, default_data_dir};
pub use events::{LibraryEvent, LibraryEventBus, RemoteOperation};
pub use library::{Library, LibraryError, RemoteStatus, SaveOutcome};
pub use snapshot::{CaptureError, CaptureResult, CaptureSettings, SnapshotEngine};
pub use store::{Catalog, SnapshotLocation, SnapshotRecord, SnapshotStore, StoreError};
pub use sync::{ReconciliationEngine, SyncError, SyncOutcome, SyncReport};
