//! Download manager implementation.
//!
//! Chooses a write strategy per call and drives it to completion:
//!
//! - **Direct path**: allocate a hidden target in the downloads collection,
//!   write, commit. Runs synchronously inside [`DownloadManager::save`].
//! - **Picker path**: park the request, launch the "create document" dialog
//!   and return [`SaveOutcome::Pending`]. The host later calls
//!   [`DownloadManager::on_picker_result`], which writes and fulfils the
//!   request's completion handle.
//!
//! # Concurrency Model
//!
//! - One request in flight per manager; a second `save` is rejected with `Busy`
//! - In-flight requests are keyed by `RequestId`, so a picker result can only
//!   resolve the request that launched it
//! - The slot lock is never held across a platform call that moves bytes

mod guard;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::oneshot;

use savekit_core::{
    ContentStorePort, DocumentPickerPort, DownloadRequest, PendingSave, PickerResult,
    PlatformCapability, PlatformProbePort, RequestId, SaveError, SaveEvent,
    SaveEventEmitterPort, SaveOutcome, SaveReport, SaveSettings, SavedFile, StorageTarget,
    TargetHandle, TargetSpec, resolve_mime,
};

use crate::writer::StorageWriter;
use guard::PendingTargetGuard;

/// Observable state of the manager.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManagerState {
    /// Nothing in flight; `save` will be accepted.
    Idle,
    /// A direct write is running on another thread.
    AwaitingWrite(RequestId),
    /// Waiting for the host to deliver the picker result.
    AwaitingPickerResult(RequestId),
}

/// A request parked until the user picks a destination.
struct PendingOperation {
    request: DownloadRequest,
    mime_type: &'static str,
    completion: oneshot::Sender<SaveReport>,
}

enum InFlight {
    DirectWrite,
    AwaitingPicker(PendingOperation),
}

/// Dependencies for building a download manager.
pub struct DownloadManagerDeps {
    /// OS version probe.
    pub probe: Arc<dyn PlatformProbePort>,
    /// Content store for both target kinds.
    pub store: Arc<dyn ContentStorePort>,
    /// "Create document" dialog.
    pub picker: Arc<dyn DocumentPickerPort>,
    /// Event sink for the host layer.
    pub emitter: Arc<dyn SaveEventEmitterPort>,
    /// Behavior configuration.
    pub settings: SaveSettings,
}

/// Build a download manager from its dependencies.
pub fn build_download_manager(deps: DownloadManagerDeps) -> DownloadManager {
    DownloadManager::new(deps)
}

/// Saves payloads through whichever strategy the platform supports.
pub struct DownloadManager {
    probe: Arc<dyn PlatformProbePort>,
    store: Arc<dyn ContentStorePort>,
    picker: Arc<dyn DocumentPickerPort>,
    emitter: Arc<dyn SaveEventEmitterPort>,
    writer: StorageWriter,
    settings: SaveSettings,
    in_flight: Mutex<HashMap<RequestId, InFlight>>,
}

impl DownloadManager {
    /// Create a new manager.
    pub fn new(deps: DownloadManagerDeps) -> Self {
        Self {
            writer: StorageWriter::new(Arc::clone(&deps.store)),
            probe: deps.probe,
            store: deps.store,
            picker: deps.picker,
            emitter: deps.emitter,
            settings: deps.settings,
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Settings the manager was built with.
    pub const fn settings(&self) -> &SaveSettings {
        &self.settings
    }

    /// Classify the running platform. Recomputed on every call.
    pub fn capability(&self) -> PlatformCapability {
        PlatformCapability::classify(
            self.probe.os_version(),
            self.settings.direct_write_min_os_version,
        )
    }

    /// Current state.
    pub fn state(&self) -> ManagerState {
        let slots = self.slots();
        match slots.iter().next() {
            None => ManagerState::Idle,
            Some((id, InFlight::DirectWrite)) => ManagerState::AwaitingWrite(*id),
            Some((id, InFlight::AwaitingPicker(_))) => ManagerState::AwaitingPickerResult(*id),
        }
    }

    /// Number of requests waiting for a picker result (0 or 1).
    pub fn pending_count(&self) -> usize {
        self.slots()
            .values()
            .filter(|entry| matches!(entry, InFlight::AwaitingPicker(_)))
            .count()
    }

    /// Save a payload.
    ///
    /// Returns `Succeeded` or `Failed` when the direct path finishes inside
    /// the call, `Pending` when the user has to pick a destination, and
    /// `Failed(Busy)` when another request is still in flight. The direct
    /// path blocks the calling thread for the duration of the write.
    pub fn save(&self, request: DownloadRequest) -> SaveOutcome {
        if let Err(e) = request.validate() {
            tracing::warn!(error = %e, "Rejected save request");
            return SaveOutcome::Failed(e);
        }

        match self.capability() {
            PlatformCapability::DirectScopedWrite => self.save_direct(request),
            PlatformCapability::PickerRequired => self.save_with_picker(request),
        }
    }

    /// Deliver the document picker result for `request_id`.
    ///
    /// Results for unknown or already resolved requests are ignored and
    /// return `None`. Otherwise the parked request is released first, then
    /// written (if confirmed), and the report is sent to its completion
    /// handle and returned.
    pub fn on_picker_result(&self, request_id: RequestId, result: PickerResult) -> Option<SaveReport> {
        let Some(op) = self.take_pending(request_id) else {
            tracing::debug!(%request_id, "Ignoring picker result for unknown request");
            return None;
        };

        let report = match result.into_confirmed_target() {
            None => {
                tracing::info!(%request_id, file_name = %op.request.file_name(), "Save cancelled by user");
                SaveReport::Cancelled
            }
            Some(handle) => self.write_picked(request_id, &op, handle),
        };

        self.emit_report(request_id, &op, &report);

        if op.completion.send(report.clone()).is_err() {
            tracing::debug!(%request_id, "Completion handle dropped before result arrived");
        }

        Some(report)
    }

    fn save_direct(&self, request: DownloadRequest) -> SaveOutcome {
        let request_id = RequestId::new();
        if let Err(e) = self.reserve(request_id, InFlight::DirectWrite) {
            return SaveOutcome::Failed(e);
        }
        let _slot = SlotRelease {
            manager: self,
            request_id,
        };

        let mime_type = resolve_mime(request.file_name());
        let spec = TargetSpec::new(request.file_name(), mime_type);
        let location = self.store.canonical_downloads_location();

        tracing::debug!(
            file_name = %spec.display_name,
            mime_type,
            len = request.len(),
            location = location.as_str(),
            "Saving through scoped storage"
        );

        let target = match self.store.allocate_scoped_target(&spec, &location) {
            Ok(target) => target,
            Err(e) => {
                tracing::warn!(file_name = %spec.display_name, error = %e, "Target allocation failed");
                return self.fail_direct(&spec, SaveError::allocation(e.to_string()));
            }
        };

        let guard = PendingTargetGuard::new(
            self.store.as_ref(),
            target,
            self.settings.failed_write_policy,
        );
        let handle = guard.target().handle().clone();

        match self.writer.write(guard.target(), request.content()) {
            Ok(bytes_written) => {
                if let Err(e) = guard.finalize() {
                    tracing::warn!(%handle, error = %e, "Failed to finalize saved file");
                    return self.fail_direct(&spec, SaveError::finalize(e.to_string()));
                }

                let file = SavedFile {
                    display_name: spec.display_name,
                    mime_type: spec.mime_type,
                    handle,
                    bytes_written,
                };
                tracing::info!(file_name = %file.display_name, bytes_written, "Saved to downloads");
                self.emitter.emit(SaveEvent::succeeded(None, file.clone()));
                SaveOutcome::Succeeded(file)
            }
            Err(err) => {
                if let Err(e) = guard.abandon() {
                    tracing::warn!(%handle, error = %e, "Failed to release target after write failure");
                }
                self.fail_direct(&spec, err)
            }
        }
    }

    fn fail_direct(&self, spec: &TargetSpec, err: SaveError) -> SaveOutcome {
        tracing::warn!(file_name = %spec.display_name, reason = err.reason(), error = %err, "Save failed");
        self.emitter
            .emit(SaveEvent::failed(None, spec.display_name.clone(), err.clone()));
        SaveOutcome::Failed(err)
    }

    fn save_with_picker(&self, request: DownloadRequest) -> SaveOutcome {
        let mime_type = resolve_mime(request.file_name());
        let spec = TargetSpec::new(request.file_name(), mime_type);
        let request_id = RequestId::new();
        let (tx, rx) = oneshot::channel();

        let op = PendingOperation {
            request,
            mime_type,
            completion: tx,
        };
        if let Err(e) = self.reserve(request_id, InFlight::AwaitingPicker(op)) {
            tracing::warn!(file_name = %spec.display_name, error = %e, "Save rejected");
            return SaveOutcome::Failed(e);
        }

        if let Err(e) = self.picker.launch_create_document_dialog(&request_id, &spec) {
            self.release(request_id);
            let err = SaveError::launch(e.to_string());
            tracing::warn!(%request_id, error = %err, "Document picker launch failed");
            self.emitter.emit(SaveEvent::failed(
                Some(request_id),
                spec.display_name,
                err.clone(),
            ));
            return SaveOutcome::Failed(err);
        }

        tracing::debug!(%request_id, file_name = %spec.display_name, mime_type, "Awaiting picker result");
        self.emitter.emit(SaveEvent::picker_launched(request_id, &spec));
        SaveOutcome::Pending(PendingSave::new(request_id, rx))
    }

    fn write_picked(&self, request_id: RequestId, op: &PendingOperation, handle: TargetHandle) -> SaveReport {
        if let Err(e) = self.store.persist_write_grant(&handle) {
            tracing::warn!(%request_id, %handle, error = %e, "Failed to persist write grant");
            return SaveReport::Failed {
                error: SaveError::grant(e.to_string()),
            };
        }

        let target = StorageTarget::picked(handle);
        match self.writer.write(&target, op.request.content()) {
            Ok(bytes_written) => {
                let file = SavedFile {
                    display_name: op.request.file_name().to_string(),
                    mime_type: op.mime_type.to_string(),
                    handle: target.handle().clone(),
                    bytes_written,
                };
                tracing::info!(%request_id, handle = %file.handle, bytes_written, "Saved to picked document");
                SaveReport::Succeeded { file }
            }
            Err(error) => SaveReport::Failed { error },
        }
    }

    fn emit_report(&self, request_id: RequestId, op: &PendingOperation, report: &SaveReport) {
        match report {
            SaveReport::Succeeded { file } => {
                self.emitter
                    .emit(SaveEvent::succeeded(Some(request_id), file.clone()));
            }
            SaveReport::Failed { error } => {
                tracing::warn!(%request_id, reason = error.reason(), error = %error, "Save failed");
                self.emitter.emit(SaveEvent::failed(
                    Some(request_id),
                    op.request.file_name(),
                    error.clone(),
                ));
            }
            SaveReport::Cancelled => {
                if self.settings.report_cancellation {
                    self.emitter.emit(SaveEvent::cancelled(request_id));
                }
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // In-flight slot management
    // ─────────────────────────────────────────────────────────────────────────

    fn slots(&self) -> MutexGuard<'_, HashMap<RequestId, InFlight>> {
        self.in_flight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claim the single in-flight slot, or report who holds it.
    fn reserve(&self, request_id: RequestId, entry: InFlight) -> Result<(), SaveError> {
        let mut slots = self.slots();
        if let Some(holder) = slots.keys().next() {
            return Err(SaveError::busy(*holder));
        }
        slots.insert(request_id, entry);
        Ok(())
    }

    fn release(&self, request_id: RequestId) {
        self.slots().remove(&request_id);
    }

    /// Remove and return the parked request for `request_id`, if any.
    fn take_pending(&self, request_id: RequestId) -> Option<PendingOperation> {
        let mut slots = self.slots();
        if !matches!(slots.get(&request_id), Some(InFlight::AwaitingPicker(_))) {
            return None;
        }
        match slots.remove(&request_id) {
            Some(InFlight::AwaitingPicker(op)) => Some(op),
            _ => None,
        }
    }
}

/// Frees a direct-write slot on every exit path.
struct SlotRelease<'a> {
    manager: &'a DownloadManager,
    request_id: RequestId,
}

impl Drop for SlotRelease<'_> {
    fn drop(&mut self) {
        self.manager.release(self.request_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savekit_core::{DownloadsLocation, NoopSaveEmitter, PlatformError};
    use std::io::{self, Write};

    mockall::mock! {
        Store {}

        impl ContentStorePort for Store {
            fn canonical_downloads_location(&self) -> DownloadsLocation;
            fn allocate_scoped_target(
                &self,
                spec: &TargetSpec,
                location: &DownloadsLocation,
            ) -> Result<StorageTarget, PlatformError>;
            fn finalize_target(&self, target: &StorageTarget) -> Result<(), PlatformError>;
            fn discard_target(&self, target: &StorageTarget) -> Result<(), PlatformError>;
            fn persist_write_grant(&self, handle: &TargetHandle) -> Result<(), PlatformError>;
            fn open_output(&self, target: &StorageTarget) -> io::Result<Box<dyn Write + Send>>;
        }
    }

    mockall::mock! {
        Picker {}

        impl DocumentPickerPort for Picker {
            fn launch_create_document_dialog(
                &self,
                request_id: &RequestId,
                spec: &TargetSpec,
            ) -> Result<(), PlatformError>;
        }
    }

    struct FixedProbe(u32);

    impl PlatformProbePort for FixedProbe {
        fn os_version(&self) -> u32 {
            self.0
        }
    }

    fn manager(os_version: u32, store: MockStore, picker: MockPicker) -> DownloadManager {
        build_download_manager(DownloadManagerDeps {
            probe: Arc::new(FixedProbe(os_version)),
            store: Arc::new(store),
            picker: Arc::new(picker),
            emitter: Arc::new(NoopSaveEmitter::new()),
            settings: SaveSettings::default(),
        })
    }

    fn downloads() -> DownloadsLocation {
        DownloadsLocation::new("content://media/external/downloads")
    }

    #[test]
    fn test_allocation_failure_skips_write() {
        let mut store = MockStore::new();
        store.expect_canonical_downloads_location().returning(downloads);
        store
            .expect_allocate_scoped_target()
            .withf(|spec, _| spec.mime_type == "application/pdf")
            .times(1)
            .returning(|_, _| Err(PlatformError::AllocationFailed("insert failed".into())));
        store.expect_open_output().never();
        store.expect_finalize_target().never();
        store.expect_discard_target().never();

        let manager = manager(33, store, MockPicker::new());
        let outcome = manager.save(DownloadRequest::new("report.pdf", b"12345".to_vec()));

        match outcome {
            SaveOutcome::Failed(err) => assert_eq!(err.reason(), "allocation"),
            other => panic!("expected allocation failure, got {other:?}"),
        }
        assert_eq!(manager.state(), ManagerState::Idle);
    }

    #[test]
    fn test_invalid_request_touches_no_port() {
        let mut store = MockStore::new();
        store.expect_canonical_downloads_location().never();
        store.expect_allocate_scoped_target().never();
        let mut picker = MockPicker::new();
        picker.expect_launch_create_document_dialog().never();

        let manager = manager(33, store, picker);
        let outcome = manager.save(DownloadRequest::new("", b"x".to_vec()));

        assert!(matches!(outcome, SaveOutcome::Failed(SaveError::InvalidRequest { .. })));
    }

    #[test]
    fn test_picker_launch_failure_clears_slot() {
        let mut picker = MockPicker::new();
        picker
            .expect_launch_create_document_dialog()
            .times(1)
            .returning(|_, _| Err(PlatformError::PickerUnavailable("no activity".into())));

        let manager = manager(28, MockStore::new(), picker);
        let outcome = manager.save(DownloadRequest::new("x.bin", b"abc".to_vec()));

        assert!(matches!(outcome, SaveOutcome::Failed(SaveError::Launch { .. })));
        assert_eq!(manager.state(), ManagerState::Idle);
        assert_eq!(manager.pending_count(), 0);
    }

    #[test]
    fn test_grant_failure_reports_and_skips_write() {
        let mut store = MockStore::new();
        store
            .expect_persist_write_grant()
            .times(1)
            .returning(|h| Err(PlatformError::PermissionDenied(h.clone())));
        store.expect_open_output().never();
        let mut picker = MockPicker::new();
        picker
            .expect_launch_create_document_dialog()
            .returning(|_, _| Ok(()));

        let manager = manager(28, store, picker);
        let SaveOutcome::Pending(pending) =
            manager.save(DownloadRequest::new("notes.txt", b"abc".to_vec()))
        else {
            panic!("expected pending outcome");
        };

        let report = manager
            .on_picker_result(
                pending.request_id(),
                PickerResult::confirmed(TargetHandle::new("content://docs/9")),
            )
            .unwrap();

        assert!(matches!(report, SaveReport::Failed { error: SaveError::Grant { .. } }));
        assert_eq!(manager.state(), ManagerState::Idle);
    }

    #[test]
    fn test_cancel_resolves_pending_handle() {
        let mut picker = MockPicker::new();
        picker
            .expect_launch_create_document_dialog()
            .withf(|_, spec| spec.mime_type == "application/octet-stream")
            .times(1)
            .returning(|_, _| Ok(()));

        let manager = manager(28, MockStore::new(), picker);
        let SaveOutcome::Pending(pending) =
            manager.save(DownloadRequest::new("x.bin", b"abc".to_vec()))
        else {
            panic!("expected pending outcome");
        };
        let request_id = pending.request_id();
        assert_eq!(manager.state(), ManagerState::AwaitingPickerResult(request_id));

        let mut wait = tokio_test::task::spawn(pending.wait());
        tokio_test::assert_pending!(wait.poll());

        let report = manager.on_picker_result(request_id, PickerResult::cancelled());

        assert_eq!(report, Some(SaveReport::Cancelled));
        assert!(wait.is_woken());
        tokio_test::assert_ready_eq!(wait.poll(), SaveReport::Cancelled);
        assert_eq!(manager.state(), ManagerState::Idle);
        assert_eq!(manager.on_picker_result(request_id, PickerResult::cancelled()), None);
    }

    #[test]
    fn test_capability_recomputed_per_call() {
        let manager = manager(29, MockStore::new(), MockPicker::new());
        assert_eq!(manager.capability(), PlatformCapability::DirectScopedWrite);

        let manager = build_download_manager(DownloadManagerDeps {
            probe: Arc::new(FixedProbe(29)),
            store: Arc::new(MockStore::new()),
            picker: Arc::new(MockPicker::new()),
            emitter: Arc::new(NoopSaveEmitter::new()),
            settings: SaveSettings {
                direct_write_min_os_version: 30,
                ..SaveSettings::default()
            },
        });
        assert_eq!(manager.capability(), PlatformCapability::PickerRequired);
    }
}
