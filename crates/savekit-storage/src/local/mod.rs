//! Filesystem-backed platform for desktop hosts and tests.
//!
//! Mirrors the device semantics closely enough to drive the download manager
//! end to end:
//!
//! - Scoped targets are hidden `.pending-*` files in the downloads directory,
//!   renamed to a unique visible name on finalize
//! - Picked documents are plain file paths, writable only after their grant
//!   has been persisted
//! - "Launching" the picker records the dialog; the host (or a test) answers
//!   it later through the manager

mod app_info;

pub use app_info::{LocalAppInfo, build_version_from_semver};

use std::collections::{HashMap, VecDeque};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};

use uuid::Uuid;

use savekit_core::{
    ContentStorePort, DocumentPickerPort, DownloadsLocation, PlatformError, PlatformProbePort,
    RequestId, StorageTarget, TargetHandle, TargetOrigin, TargetSpec, ensure_directory,
};

const SCOPED_SCHEME: &str = "savekit://downloads/";
const PENDING_PREFIX: &str = ".pending-";
/// Finalized paths and write grants remembered per platform.
const TRACKED_HANDLE_LIMIT: usize = 256;
/// Suffixed names tried before finalize gives up.
const MAX_NAME_ATTEMPTS: u32 = 10_000;

/// A document picker invocation waiting for an answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedDialog {
    /// Request to echo back with the picker result.
    pub request_id: RequestId,
    /// Suggested file name.
    pub display_name: String,
    /// Content type the dialog filters on.
    pub mime_type: String,
}

struct ScopedEntry {
    pending_path: PathBuf,
    display_name: String,
}

/// Handle-keyed map that forgets its oldest entries past `limit`.
struct RecentHandles<V> {
    entries: HashMap<TargetHandle, V>,
    order: VecDeque<TargetHandle>,
    limit: usize,
}

impl<V> RecentHandles<V> {
    fn new(limit: usize) -> Self {
        Self {
            entries: HashMap::new(),
            order: VecDeque::new(),
            limit,
        }
    }

    fn insert(&mut self, handle: TargetHandle, value: V) {
        if self.entries.insert(handle.clone(), value).is_none() {
            self.order.push_back(handle);
        }
        while self.order.len() > self.limit {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
            }
        }
    }

    fn get(&self, handle: &TargetHandle) -> Option<&V> {
        self.entries.get(handle)
    }

    fn contains(&self, handle: &TargetHandle) -> bool {
        self.entries.contains_key(handle)
    }
}

struct LocalState {
    pending: HashMap<TargetHandle, ScopedEntry>,
    finalized: RecentHandles<PathBuf>,
    grants: RecentHandles<()>,
    dialogs: Vec<LaunchedDialog>,
}

impl Default for LocalState {
    fn default() -> Self {
        Self {
            pending: HashMap::new(),
            finalized: RecentHandles::new(TRACKED_HANDLE_LIMIT),
            grants: RecentHandles::new(TRACKED_HANDLE_LIMIT),
            dialogs: Vec::new(),
        }
    }
}

/// Platform adapter over a local downloads directory.
pub struct LocalPlatform {
    downloads_dir: PathBuf,
    os_version: u32,
    state: Mutex<LocalState>,
}

impl LocalPlatform {
    /// Create a platform rooted at `downloads_dir`, reporting `os_version`.
    pub fn new(downloads_dir: impl Into<PathBuf>, os_version: u32) -> Self {
        Self {
            downloads_dir: downloads_dir.into(),
            os_version,
            state: Mutex::new(LocalState::default()),
        }
    }

    /// The downloads directory.
    pub fn downloads_dir(&self) -> &Path {
        &self.downloads_dir
    }

    /// Drain the picker dialogs launched since the last call.
    pub fn take_launched_dialogs(&self) -> Vec<LaunchedDialog> {
        std::mem::take(&mut self.state().dialogs)
    }

    /// Filesystem path behind a handle, once it is visible.
    ///
    /// Scoped targets resolve only after finalize, and only for the most
    /// recent finalized targets; picked handles are paths.
    pub fn resolve_path(&self, handle: &TargetHandle) -> Option<PathBuf> {
        if let Some(path) = self.state().finalized.get(handle) {
            return Some(path.clone());
        }
        if handle.as_str().starts_with(SCOPED_SCHEME) {
            return None;
        }
        Some(PathBuf::from(handle.as_str()))
    }

    /// Number of scoped targets still hidden.
    pub fn pending_target_count(&self) -> usize {
        self.state().pending.len()
    }

    fn state(&self) -> MutexGuard<'_, LocalState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl PlatformProbePort for LocalPlatform {
    fn os_version(&self) -> u32 {
        self.os_version
    }
}

impl ContentStorePort for LocalPlatform {
    fn canonical_downloads_location(&self) -> DownloadsLocation {
        DownloadsLocation::new(self.downloads_dir.to_string_lossy())
    }

    fn allocate_scoped_target(
        &self,
        spec: &TargetSpec,
        location: &DownloadsLocation,
    ) -> Result<StorageTarget, PlatformError> {
        let dir = PathBuf::from(location.as_str());
        ensure_directory(&dir).map_err(|e| PlatformError::AllocationFailed(e.to_string()))?;

        let id = Uuid::new_v4();
        let display_name = sanitize_display_name(&spec.display_name);
        let pending_path = dir.join(format!("{PENDING_PREFIX}{id}-{display_name}"));

        OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&pending_path)
            .map_err(|e| PlatformError::AllocationFailed(e.to_string()))?;

        let handle = TargetHandle::new(format!("{SCOPED_SCHEME}{id}"));
        tracing::debug!(%handle, path = %pending_path.display(), "Allocated pending target");

        self.state().pending.insert(
            handle.clone(),
            ScopedEntry {
                pending_path,
                display_name,
            },
        );
        Ok(StorageTarget::scoped(handle))
    }

    fn finalize_target(&self, target: &StorageTarget) -> Result<(), PlatformError> {
        if target.origin() == TargetOrigin::Picked {
            return Ok(());
        }

        let entry = self
            .state()
            .pending
            .remove(target.handle())
            .ok_or_else(|| PlatformError::UnknownTarget(target.handle().clone()))?;

        let dir = entry
            .pending_path
            .parent()
            .map_or_else(|| self.downloads_dir.clone(), Path::to_path_buf);

        let visible = match publish(&entry.pending_path, &dir, &entry.display_name) {
            Ok(visible) => visible,
            Err(e) => {
                self.state().pending.insert(target.handle().clone(), entry);
                return Err(e.into());
            }
        };

        tracing::debug!(handle = %target.handle(), path = %visible.display(), "Finalized target");
        self.state()
            .finalized
            .insert(target.handle().clone(), visible);
        Ok(())
    }

    fn discard_target(&self, target: &StorageTarget) -> Result<(), PlatformError> {
        if target.origin() == TargetOrigin::Picked {
            return Ok(());
        }

        let entry = self
            .state()
            .pending
            .remove(target.handle())
            .ok_or_else(|| PlatformError::UnknownTarget(target.handle().clone()))?;

        match fs::remove_file(&entry.pending_path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn persist_write_grant(&self, handle: &TargetHandle) -> Result<(), PlatformError> {
        let path = Path::new(handle.as_str());
        let parent_ok = path
            .parent()
            .is_some_and(|p| p.as_os_str().is_empty() || p.is_dir());
        if handle.as_str().starts_with(SCOPED_SCHEME) || !parent_ok {
            return Err(PlatformError::UnknownTarget(handle.clone()));
        }

        self.state().grants.insert(handle.clone(), ());
        Ok(())
    }

    fn open_output(&self, target: &StorageTarget) -> io::Result<Box<dyn Write + Send>> {
        let path = match target.origin() {
            TargetOrigin::Scoped => self
                .state()
                .pending
                .get(target.handle())
                .map(|entry| entry.pending_path.clone())
                .ok_or_else(|| {
                    io::Error::new(
                        io::ErrorKind::NotFound,
                        format!("no pending target {}", target.handle()),
                    )
                })?,
            TargetOrigin::Picked => {
                if !self.state().grants.contains(target.handle()) {
                    return Err(io::Error::new(
                        io::ErrorKind::PermissionDenied,
                        format!("no write grant for {}", target.handle()),
                    ));
                }
                PathBuf::from(target.handle().as_str())
            }
        };

        let file = File::create(path)?;
        Ok(Box::new(file))
    }
}

impl DocumentPickerPort for LocalPlatform {
    fn launch_create_document_dialog(
        &self,
        request_id: &RequestId,
        spec: &TargetSpec,
    ) -> Result<(), PlatformError> {
        tracing::info!(
            %request_id,
            file_name = %spec.display_name,
            mime_type = %spec.mime_type,
            "Create document dialog requested"
        );
        self.state().dialogs.push(LaunchedDialog {
            request_id: *request_id,
            display_name: spec.display_name.clone(),
            mime_type: spec.mime_type.clone(),
        });
        Ok(())
    }
}

/// Replace path separators so a display name stays a single file name.
fn sanitize_display_name(name: &str) -> String {
    name.trim().replace(['/', '\\'], "_")
}

/// Move `pending` to the first free `name`, `name (1).ext`, ... in `dir`.
///
/// Each candidate is claimed with `create_new` before the rename, so an
/// existing file is never replaced.
fn publish(pending: &Path, dir: &Path, name: &str) -> io::Result<PathBuf> {
    let (stem, ext) = match name.rfind('.') {
        Some(idx) if idx > 0 => (&name[..idx], &name[idx..]),
        _ => (name, ""),
    };

    for n in 0..MAX_NAME_ATTEMPTS {
        let candidate = if n == 0 {
            dir.join(name)
        } else {
            dir.join(format!("{stem} ({n}){ext}"))
        };

        match OpenOptions::new().write(true).create_new(true).open(&candidate) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e),
        }

        return match fs::rename(pending, &candidate) {
            Ok(()) => Ok(candidate),
            Err(e) => {
                let _ = fs::remove_file(&candidate);
                Err(e)
            }
        };
    }

    Err(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("no free file name for {name} in {}", dir.display()),
    ))
}
