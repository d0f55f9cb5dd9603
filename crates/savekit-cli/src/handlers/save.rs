//! Save command handler.
//!
//! Runs one save through the download manager. When the platform needs the
//! document picker, the CLI stands in for the host UI: `--pick` confirms the
//! dialog with that destination, otherwise the dialog is cancelled.

use std::path::{Path, PathBuf};

use savekit_core::{PickerResult, SaveOutcome, SaveReport, SavedFile, TargetHandle};
use savekit_storage::DownloadRequest;

use crate::bootstrap::CliContext;
use crate::error::CliError;

/// Arguments for the save command.
#[derive(Debug, Clone)]
pub struct SaveArgs {
    /// File whose contents are saved.
    pub input: PathBuf,
    /// Display name override.
    pub name: Option<String>,
    /// Destination to confirm if the picker is shown.
    pub pick: Option<PathBuf>,
}

/// Execute the save command.
///
/// Returns the terminal report; `Cancelled` is not an error.
pub async fn execute(ctx: &mut CliContext, args: SaveArgs) -> Result<SaveReport, CliError> {
    let content = std::fs::read(&args.input)
        .map_err(|e| CliError::Io(format!("{}: {e}", args.input.display())))?;
    let name = match args.name {
        Some(name) => name,
        None => default_name(&args.input)?,
    };

    let request = DownloadRequest::new(name, content);
    if request.is_empty() {
        tracing::warn!(file_name = %request.file_name(), "Input is empty; saving a zero-byte file");
    }

    let outcome = ctx.manager.save(request);
    tracing::debug!(status = outcome.status(), "Save call returned");

    let report = match outcome {
        SaveOutcome::Succeeded(file) => SaveReport::Succeeded { file },
        SaveOutcome::Failed(error) => SaveReport::Failed { error },
        SaveOutcome::Pending(pending) => {
            for dialog in ctx.platform.take_launched_dialogs() {
                println!(
                    "Choose where to save {} ({})",
                    dialog.display_name, dialog.mime_type
                );
            }

            let result = args.pick.as_ref().map_or_else(PickerResult::cancelled, |path| {
                PickerResult::confirmed(TargetHandle::new(path.to_string_lossy()))
            });
            ctx.manager.on_picker_result(pending.request_id(), result);
            pending.wait().await
        }
    };

    for event in ctx.drain_events() {
        tracing::debug!(event = event.event_name(), request_id = ?event.request_id(), "Save event");
    }

    match &report {
        SaveReport::Succeeded { file } => print_saved(ctx, file),
        SaveReport::Cancelled => println!("Save cancelled"),
        SaveReport::Failed { error } => {
            println!("{}", error.user_message());
            return Err(CliError::Save(error.clone()));
        }
    }
    Ok(report)
}

fn default_name(input: &Path) -> Result<String, CliError> {
    input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .ok_or_else(|| {
            CliError::Arguments(format!("{} has no file name; pass --name", input.display()))
        })
}

fn print_saved(ctx: &CliContext, file: &SavedFile) {
    let location = ctx
        .platform
        .resolve_path(&file.handle)
        .map_or_else(|| file.handle.to_string(), |p| p.display().to_string());
    println!(
        "Saved successfully: {} ({}, {} bytes) to {location}",
        file.display_name, file.mime_type, file.bytes_written
    );
}
