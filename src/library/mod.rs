//! The library: single owner of the in-memory catalog
//!
//! Every user-facing operation goes through [`Library`]. Operations that touch
//! both sides run as two phases: the local change is applied and saved first,
//! then the server is told on a best-effort basis. A failed remote phase is
//! reported through [`RemoteStatus`] and a [`LibraryEvent`]; it never rolls the
//! local change back.

mod errors;
mod types;

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use url::Url;
use uuid::Uuid;

pub use errors::LibraryError;
pub use types::{RemoteStatus, SaveOutcome};

use crate::api::{ArticlesApi, AuthApi, HttpApiClient, build_http_client};
use crate::auth::{AuthenticatedCaller, CallError, CredentialStore, FileCredentialStore, Session};
use crate::config::StashConfig;
use crate::events::{LibraryEvent, LibraryEventBus, RemoteOperation};
use crate::snapshot::SnapshotEngine;
use crate::store::{Catalog, SnapshotLocation, SnapshotRecord, SnapshotStore};
use crate::sync::{ReconciliationEngine, SyncError, SyncOutcome, apply_remote};
use crate::utils::CREDENTIALS_FILENAME;

/// Shortest id prefix accepted by [`Library::resolve`]
const MIN_ID_PREFIX_LEN: usize = 4;

pub struct Library<A, S> {
    store: SnapshotStore,
    engine: SnapshotEngine,
    caller: AuthenticatedCaller<A, S>,
    reconciler: ReconciliationEngine<A, S>,
    events: LibraryEventBus,
    catalog: Mutex<Catalog>,
}

impl Library<HttpApiClient, FileCredentialStore> {
    /// Open the library under `config.data_dir()` with on-disk credentials
    pub async fn open(config: &StashConfig) -> Result<Self, LibraryError> {
        let credentials = FileCredentialStore::new(config.data_dir().join(CREDENTIALS_FILENAME));
        Library::with_credentials(config, Arc::new(credentials)).await
    }
}

impl<S: CredentialStore> Library<HttpApiClient, S> {
    /// Open the library with the HTTP API client and a caller-chosen credential store
    pub async fn with_credentials(config: &StashConfig, credentials: Arc<S>) -> Result<Self, LibraryError> {
        let client = build_http_client(config)?;
        let api = Arc::new(HttpApiClient::new(client.clone(), config));
        let engine = SnapshotEngine::from_config(client, config);
        let store = SnapshotStore::new(config.data_dir());
        Ok(Self::with_parts(store, engine, api, credentials, config.max_concurrent_captures()).await)
    }
}

impl<A, S> Library<A, S>
where
    A: AuthApi + ArticlesApi,
    S: CredentialStore,
{
    /// Assemble a library from its collaborators and load the catalog
    pub async fn with_parts(
        store: SnapshotStore,
        engine: SnapshotEngine,
        api: Arc<A>,
        credentials: Arc<S>,
        max_concurrent_captures: usize,
    ) -> Self {
        let caller = AuthenticatedCaller::new(api, Session::new(credentials));
        let events = LibraryEventBus::default();
        let reconciler = ReconciliationEngine::new(
            caller.clone(),
            engine.clone(),
            store.clone(),
            events.clone(),
            max_concurrent_captures,
        );
        let catalog = Mutex::new(store.load().await);

        Self {
            store,
            engine,
            caller,
            reconciler,
            events,
            catalog,
        }
    }

    pub fn events(&self) -> &LibraryEventBus {
        &self.events
    }

    pub fn store(&self) -> &SnapshotStore {
        &self.store
    }

    /// Copy of the current catalog
    pub fn catalog(&self) -> Catalog {
        self.catalog.lock().clone()
    }

    pub fn get(&self, local_id: Uuid) -> Option<SnapshotRecord> {
        self.catalog.lock().get(local_id).cloned()
    }

    /// Where a renderer finds the snapshot of `local_id`
    pub fn locate(&self, local_id: Uuid) -> Result<Option<SnapshotLocation>, LibraryError> {
        let record = self.get(local_id).ok_or(LibraryError::NotFound(local_id))?;
        Ok(self.store.locate(&record))
    }

    /// Find a record by full local id or a unique prefix of it
    pub fn resolve(&self, key: &str) -> Result<Uuid, LibraryError> {
        let key = key.trim().to_ascii_lowercase();
        if let Ok(id) = Uuid::parse_str(&key) {
            return self
                .get(id)
                .map(|r| r.local_id)
                .ok_or(LibraryError::NotFound(id));
        }
        if key.len() < MIN_ID_PREFIX_LEN {
            return Err(LibraryError::UnknownKey(key));
        }

        let matches: Vec<Uuid> = self
            .catalog
            .lock()
            .records()
            .iter()
            .map(|r| r.local_id)
            .filter(|id| id.to_string().starts_with(&key))
            .collect();
        match matches.as_slice() {
            [id] => Ok(*id),
            [] => Err(LibraryError::UnknownKey(key)),
            _ => Err(LibraryError::AmbiguousKey {
                count: matches.len(),
                key,
            }),
        }
    }

    pub fn is_signed_in(&self) -> bool {
        self.caller.session().is_signed_in()
    }

    /// Exchange credentials for tokens and store them
    pub async fn login(&self, email: &str, password: &str) -> Result<(), LibraryError> {
        let tokens = self.caller.api().login(email, password).await?;
        if tokens.refresh_token.is_none() {
            log::warn!("Login returned no refresh token; the session will not renew itself");
        }
        self.caller
            .session()
            .store_tokens(&tokens.token, tokens.refresh_token.as_deref())?;
        log::info!("Signed in as {email}");
        Ok(())
    }

    pub fn logout(&self) -> Result<(), LibraryError> {
        self.caller.session().clear()?;
        log::info!("Signed out");
        Ok(())
    }

    /// Capture `url`, record it, then register it with the server
    pub async fn save_page(&self, url: &Url, favorited: bool) -> Result<SaveOutcome, LibraryError> {
        let capture = self.engine.capture(url).await?;
        let record = SnapshotRecord::captured(url.clone(), capture.title, capture.cache_dir, favorited);
        let local_id = record.local_id;

        let snapshot = {
            let mut catalog = self.catalog.lock();
            catalog.insert(record.clone());
            catalog.clone()
        };
        if let Err(e) = self.store.save(&snapshot).await {
            self.catalog.lock().remove(local_id);
            if let Some(dir) = &record.cache_dir {
                self.store.remove_cache(dir).await;
            }
            return Err(e.into());
        }
        self.events.publish(LibraryEvent::PageSaved {
            local_id,
            title: record.title.clone(),
            asset_count: capture.asset_count,
            timestamp: Utc::now(),
        });
        log::info!("Saved {} locally ({} assets)", url, capture.asset_count);

        if !self.is_signed_in() {
            return Ok(SaveOutcome {
                record,
                asset_count: capture.asset_count,
                remote: RemoteStatus::Skipped,
            });
        }

        let api = self.caller.api();
        let created = self
            .caller
            .call(|token| async move { api.create_article(&token, url.as_str(), favorited).await })
            .await;

        let remote = match created {
            Ok(item) => {
                let (snapshot, displaced) = {
                    let mut catalog = self.catalog.lock();
                    // The server may hand back an id an older record already holds
                    let other_id = catalog
                        .find_by_remote_id(item.id)
                        .map(|other| other.local_id)
                        .filter(|other| *other != local_id);
                    let displaced = other_id.and_then(|other| catalog.remove(other));
                    if let Some(record) = catalog.get_mut(local_id) {
                        apply_remote(record, &item);
                    }
                    catalog.sort();
                    (catalog.clone(), displaced)
                };
                if let Some(old) = displaced {
                    log::info!("Replaced older record {} for remote id {}", old.local_id, item.id);
                    if let Some(dir) = old.cache_dir {
                        self.store.remove_cache(&dir).await;
                    }
                }
                if let Err(e) = self.store.save(&snapshot).await {
                    log::warn!("Failed to save remote id for {local_id}: {e}");
                }
                self.remote_status(local_id, RemoteOperation::Create, Ok(()))
            }
            Err(e) => self.remote_status(local_id, RemoteOperation::Create, Err(e)),
        };

        Ok(SaveOutcome {
            record: self.get(local_id).unwrap_or(record),
            asset_count: capture.asset_count,
            remote,
        })
    }

    /// Archive or unarchive locally, then on the server
    pub async fn set_archived(&self, local_id: Uuid, archived: bool) -> Result<RemoteStatus, LibraryError> {
        let (snapshot, remote_id) = {
            let mut catalog = self.catalog.lock();
            let record = catalog
                .get_mut(local_id)
                .ok_or(LibraryError::NotFound(local_id))?;
            record.archived = archived;
            let remote_id = record.remote_id;
            (catalog.clone(), remote_id)
        };
        self.store.save(&snapshot).await?;

        let operation = if archived {
            RemoteOperation::Archive
        } else {
            RemoteOperation::Unarchive
        };
        let Some(remote_id) = remote_id else {
            return Ok(RemoteStatus::Skipped);
        };

        let api = self.caller.api();
        let result = self
            .caller
            .call(|token| async move { api.set_archived(&token, remote_id, archived).await })
            .await;
        Ok(self.remote_status(local_id, operation, result))
    }

    /// Favorite flag is local state only
    pub async fn set_favorited(&self, local_id: Uuid, favorited: bool) -> Result<(), LibraryError> {
        let snapshot = {
            let mut catalog = self.catalog.lock();
            let record = catalog
                .get_mut(local_id)
                .ok_or(LibraryError::NotFound(local_id))?;
            record.favorited = favorited;
            catalog.clone()
        };
        self.store.save(&snapshot).await?;
        Ok(())
    }

    /// Remove the record and its snapshot, then delete it on the server
    pub async fn delete(&self, local_id: Uuid) -> Result<RemoteStatus, LibraryError> {
        let (snapshot, removed) = {
            let mut catalog = self.catalog.lock();
            let removed = catalog
                .remove(local_id)
                .ok_or(LibraryError::NotFound(local_id))?;
            (catalog.clone(), removed)
        };
        self.store.save(&snapshot).await?;
        if let Some(dir) = &removed.cache_dir {
            self.store.remove_cache(dir).await;
        }

        let Some(remote_id) = removed.remote_id else {
            return Ok(RemoteStatus::Skipped);
        };

        let api = self.caller.api();
        let result = self
            .caller
            .call(|token| async move { api.delete_article(&token, remote_id).await })
            .await;
        Ok(self.remote_status(local_id, RemoteOperation::Delete, result))
    }

    /// Reconcile with the server and backfill missing snapshots
    pub async fn sync(&self) -> Result<SyncOutcome, SyncError> {
        let outcome = self.reconciler.sync(&self.catalog).await;
        if matches!(outcome, Err(SyncError::SessionExpired)) {
            self.events.publish(LibraryEvent::SessionExpired {
                timestamp: Utc::now(),
            });
        }
        outcome
    }

    /// Turn a phase-2 result into a status and an event
    fn remote_status(
        &self,
        local_id: Uuid,
        operation: RemoteOperation,
        result: Result<(), CallError>,
    ) -> RemoteStatus {
        let timestamp = Utc::now();
        match result {
            Ok(()) => {
                log::debug!("Remote {operation} applied for {local_id}");
                self.events.publish(LibraryEvent::RemoteApplied {
                    local_id,
                    operation,
                    timestamp,
                });
                RemoteStatus::Applied
            }
            Err(CallError::MustReauthenticate) => {
                log::info!("Remote {operation} for {local_id} needs a new login");
                self.events.publish(LibraryEvent::SessionExpired { timestamp });
                RemoteStatus::SessionExpired
            }
            Err(CallError::Api(e)) => {
                log::warn!("Remote {operation} for {local_id} failed: {e}");
                self.events.publish(LibraryEvent::RemoteFailed {
                    local_id,
                    operation,
                    message: e.to_string(),
                    timestamp,
                });
                RemoteStatus::Failed(e.to_string())
            }
        }
    }
}
