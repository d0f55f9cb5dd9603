//! Commit step for scoped targets.
//!
//! A scoped target is allocated hidden. The guard pairs that allocation with
//! exactly one commit: `finalize` after a good write, or the configured
//! failure policy otherwise, including when the write path unwinds. A target
//! that cannot be finalized is discarded, so none is ever left pending.

use savekit_core::{ContentStorePort, FailedWritePolicy, PlatformError, StorageTarget};

pub(super) struct PendingTargetGuard<'a> {
    store: &'a dyn ContentStorePort,
    target: StorageTarget,
    on_failure: FailedWritePolicy,
    released: bool,
}

impl<'a> PendingTargetGuard<'a> {
    pub(super) fn new(
        store: &'a dyn ContentStorePort,
        target: StorageTarget,
        on_failure: FailedWritePolicy,
    ) -> Self {
        Self {
            store,
            target,
            on_failure,
            released: false,
        }
    }

    pub(super) const fn target(&self) -> &StorageTarget {
        &self.target
    }

    /// Make the target visible after a successful write.
    ///
    /// On failure the target is discarded and the finalize error returned.
    pub(super) fn finalize(mut self) -> Result<(), PlatformError> {
        self.released = true;
        self.finalize_or_discard()
    }

    /// Release the target after a failed write.
    pub(super) fn abandon(mut self) -> Result<(), PlatformError> {
        self.released = true;
        self.release_failed()
    }

    fn finalize_or_discard(&self) -> Result<(), PlatformError> {
        self.store.finalize_target(&self.target).inspect_err(|_| {
            if let Err(e) = self.store.discard_target(&self.target) {
                tracing::warn!(
                    handle = %self.target.handle(),
                    error = %e,
                    "Failed to discard target after finalize failure"
                );
            }
        })
    }

    fn release_failed(&self) -> Result<(), PlatformError> {
        match self.on_failure {
            FailedWritePolicy::Finalize => self.finalize_or_discard(),
            FailedWritePolicy::Discard => self.store.discard_target(&self.target),
        }
    }
}

impl Drop for PendingTargetGuard<'_> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if let Err(e) = self.release_failed() {
            tracing::warn!(
                handle = %self.target.handle(),
                error = %e,
                "Failed to release pending target"
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savekit_core::{DownloadsLocation, TargetHandle, TargetSpec};
    use std::io::{self, Write};
    use std::sync::Mutex;

    #[derive(Default)]
    struct CallLog {
        calls: Mutex<Vec<&'static str>>,
        fail_finalize: bool,
    }

    impl CallLog {
        fn failing_finalize() -> Self {
            Self {
                fail_finalize: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl ContentStorePort for CallLog {
        fn canonical_downloads_location(&self) -> DownloadsLocation {
            DownloadsLocation::new("mem://downloads")
        }

        fn allocate_scoped_target(
            &self,
            _spec: &TargetSpec,
            _location: &DownloadsLocation,
        ) -> Result<StorageTarget, PlatformError> {
            unreachable!()
        }

        fn finalize_target(&self, target: &StorageTarget) -> Result<(), PlatformError> {
            self.calls.lock().unwrap().push("finalize");
            if self.fail_finalize {
                return Err(PlatformError::UnknownTarget(target.handle().clone()));
            }
            Ok(())
        }

        fn discard_target(&self, _target: &StorageTarget) -> Result<(), PlatformError> {
            self.calls.lock().unwrap().push("discard");
            Ok(())
        }

        fn persist_write_grant(&self, _handle: &TargetHandle) -> Result<(), PlatformError> {
            unreachable!()
        }

        fn open_output(&self, _target: &StorageTarget) -> io::Result<Box<dyn Write + Send>> {
            unreachable!()
        }
    }

    fn target() -> StorageTarget {
        StorageTarget::scoped(TargetHandle::new("mem://1"))
    }

    #[test]
    fn test_finalize_runs_once() {
        let log = CallLog::default();
        let guard = PendingTargetGuard::new(&log, target(), FailedWritePolicy::Discard);

        guard.finalize().unwrap();

        assert_eq!(log.calls(), vec!["finalize"]);
    }

    #[test]
    fn test_failed_finalize_discards_target() {
        let log = CallLog::failing_finalize();
        let guard = PendingTargetGuard::new(&log, target(), FailedWritePolicy::Finalize);

        assert!(guard.finalize().is_err());
        assert_eq!(log.calls(), vec!["finalize", "discard"]);

        let log = CallLog::failing_finalize();
        let guard = PendingTargetGuard::new(&log, target(), FailedWritePolicy::Finalize);
        assert!(guard.abandon().is_err());
        assert_eq!(log.calls(), vec!["finalize", "discard"]);
    }

    #[test]
    fn test_abandon_follows_policy() {
        let log = CallLog::default();
        PendingTargetGuard::new(&log, target(), FailedWritePolicy::Finalize)
            .abandon()
            .unwrap();
        PendingTargetGuard::new(&log, target(), FailedWritePolicy::Discard)
            .abandon()
            .unwrap();

        assert_eq!(log.calls(), vec!["finalize", "discard"]);
    }

    #[test]
    fn test_drop_without_release_applies_policy() {
        let log = CallLog::default();
        {
            let _guard = PendingTargetGuard::new(&log, target(), FailedWritePolicy::Discard);
        }
        assert_eq!(log.calls(), vec!["discard"]);
    }
}
