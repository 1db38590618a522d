use super::error::{Result, TranscodeError};
use super::natsort::natural_cmp;
use super::types::FileEntry;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// Content-type detection for candidate files
pub trait ContentSniffer {
    /// MIME type guessed from the file's leading bytes, if recognised
    fn mime_type(&self, path: &Path) -> std::io::Result<Option<String>>;
}

/// Magic-number sniffing backed by the `infer` crate
#[derive(Debug, Default, Clone, Copy)]
pub struct InferSniffer;

impl ContentSniffer for InferSniffer {
    fn mime_type(&self, path: &Path) -> std::io::Result<Option<String>> {
        Ok(infer::get_from_path(path)?.map(|kind| kind.mime_type().to_string()))
    }
}

/// Check if the sniffed content of a file is video
pub fn is_video_file(path: &Path, sniffer: &dyn ContentSniffer) -> Result<bool> {
    let mime = sniffer
        .mime_type(path)
        .map_err(|e| TranscodeError::io(format!("Failed to read {}", path.display()), e))?;

    Ok(mime.is_some_and(|m| m.starts_with("video/")))
}

/// Turn the input path into the ordered list of files to encode.
///
/// A single file is always used as-is. A directory contributes its direct
/// regular-file children whose content sniffs as video, in natural order.
pub fn discover(path: &Path, sniffer: &dyn ContentSniffer) -> Result<Vec<FileEntry>> {
    let metadata = std::fs::metadata(path).map_err(|e| {
        TranscodeError::UserInput(format!("Cannot access {}: {}", path.display(), e))
    })?;

    if !metadata.is_dir() {
        return Ok(vec![FileEntry::new(path.to_path_buf())]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(false)
    {
        let entry = entry.map_err(|e| {
            let context = format!("Failed to read directory {}", path.display());
            match e.into_io_error() {
                Some(io) => TranscodeError::io(context, io),
                None => TranscodeError::UserInput(context),
            }
        })?;

        if !entry.file_type().is_file() {
            continue;
        }

        if is_video_file(entry.path(), sniffer)? {
            files.push(entry.into_path());
        } else {
            debug!(path = %entry.path().display(), "skipping non-video file");
        }
    }

    if files.is_empty() {
        return Err(TranscodeError::UserInput(
            "Chosen directory has no video files".to_string(),
        ));
    }

    files.sort_by(|a, b| {
        let a = a.file_name().unwrap_or_default().to_string_lossy();
        let b = b.file_name().unwrap_or_default().to_string_lossy();
        natural_cmp(&a, &b)
    });

    Ok(files.into_iter().map(FileEntry::new).collect())
}
