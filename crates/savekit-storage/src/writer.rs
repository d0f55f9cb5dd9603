//! Byte transfer into a storage target.
//!
//! The writer only moves bytes. Making a scoped target visible is the
//! manager's job, because the commit step differs between the two paths.

use std::io::Write;
use std::sync::Arc;

use savekit_core::{ContentStorePort, SaveError, StorageTarget};

/// Writes a payload into a target through the content store.
#[derive(Clone)]
pub struct StorageWriter {
    store: Arc<dyn ContentStorePort>,
}

impl StorageWriter {
    /// Create a writer over `store`.
    pub fn new(store: Arc<dyn ContentStorePort>) -> Self {
        Self { store }
    }

    /// Write `bytes` into `target`, returning the number of bytes written.
    ///
    /// The output channel lives only for the duration of this call and is
    /// closed on every exit path. If the channel cannot be opened nothing is
    /// written.
    pub fn write(&self, target: &StorageTarget, bytes: &[u8]) -> Result<u64, SaveError> {
        let mut channel = self.store.open_output(target).map_err(|e| {
            tracing::warn!(handle = %target.handle(), error = %e, "Failed to open output channel");
            SaveError::from_io_error(&e)
        })?;

        channel
            .write_all(bytes)
            .and_then(|()| channel.flush())
            .map_err(|e| {
                tracing::warn!(
                    handle = %target.handle(),
                    len = bytes.len(),
                    error = %e,
                    "Write into storage target failed"
                );
                SaveError::from_io_error(&e)
            })?;

        tracing::debug!(handle = %target.handle(), len = bytes.len(), "Payload written");
        Ok(u64::try_from(bytes.len()).unwrap_or(u64::MAX))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use savekit_core::{DownloadsLocation, PlatformError, TargetHandle, TargetSpec};
    use std::io;
    use std::sync::Mutex;

    /// Shared buffer standing in for the file behind a target.
    #[derive(Clone, Default)]
    struct SharedBuf(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuf {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Writer that accepts `limit` bytes and then fails.
    struct FailingAfter {
        inner: SharedBuf,
        limit: usize,
    }

    impl Write for FailingAfter {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.limit == 0 {
                return Err(io::Error::new(io::ErrorKind::StorageFull, "no space left"));
            }
            let n = buf.len().min(self.limit);
            self.limit -= n;
            self.inner.write(&buf[..n])
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    enum Behavior {
        Ok,
        OpenFails,
        FailAfter(usize),
    }

    struct BufferStore {
        buf: SharedBuf,
        behavior: Behavior,
    }

    impl ContentStorePort for BufferStore {
        fn canonical_downloads_location(&self) -> DownloadsLocation {
            DownloadsLocation::new("mem://downloads")
        }

        fn allocate_scoped_target(
            &self,
            spec: &TargetSpec,
            _location: &DownloadsLocation,
        ) -> Result<StorageTarget, PlatformError> {
            Ok(StorageTarget::scoped(TargetHandle::new(spec.display_name.clone())))
        }

        fn finalize_target(&self, _target: &StorageTarget) -> Result<(), PlatformError> {
            Ok(())
        }

        fn discard_target(&self, _target: &StorageTarget) -> Result<(), PlatformError> {
            Ok(())
        }

        fn persist_write_grant(&self, _handle: &TargetHandle) -> Result<(), PlatformError> {
            Ok(())
        }

        fn open_output(&self, _target: &StorageTarget) -> io::Result<Box<dyn Write + Send>> {
            match self.behavior {
                Behavior::Ok => Ok(Box::new(self.buf.clone())),
                Behavior::OpenFails => Err(io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "permission revoked",
                )),
                Behavior::FailAfter(limit) => Ok(Box::new(FailingAfter {
                    inner: self.buf.clone(),
                    limit,
                })),
            }
        }
    }

    fn writer(behavior: Behavior) -> (StorageWriter, SharedBuf) {
        let buf = SharedBuf::default();
        let store = BufferStore {
            buf: buf.clone(),
            behavior,
        };
        (StorageWriter::new(Arc::new(store)), buf)
    }

    fn target() -> StorageTarget {
        StorageTarget::picked(TargetHandle::new("mem://doc"))
    }

    #[test]
    fn test_writes_exact_bytes() {
        let (writer, buf) = writer(Behavior::Ok);

        let written = writer.write(&target(), b"hello").unwrap();

        assert_eq!(written, 5);
        assert_eq!(buf.0.lock().unwrap().as_slice(), b"hello");
    }

    #[test]
    fn test_empty_payload() {
        let (writer, buf) = writer(Behavior::Ok);
        assert_eq!(writer.write(&target(), &[]).unwrap(), 0);
        assert!(buf.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_open_failure_writes_nothing() {
        let (writer, buf) = writer(Behavior::OpenFails);

        let err = writer.write(&target(), b"hello").unwrap_err();

        assert_eq!(err.reason(), "write");
        assert!(matches!(err, SaveError::Write { ref kind, .. } if kind == "PermissionDenied"));
        assert!(buf.0.lock().unwrap().is_empty());
    }

    #[test]
    fn test_mid_write_failure_is_reported() {
        let (writer, buf) = writer(Behavior::FailAfter(2));

        let err = writer.write(&target(), b"hello").unwrap_err();

        assert!(matches!(err, SaveError::Write { ref kind, .. } if kind == "StorageFull"));
        assert_eq!(buf.0.lock().unwrap().as_slice(), b"he");
    }
}
