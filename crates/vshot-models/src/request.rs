//! Job request built from user input.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A local video file selected for upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoFile {
    /// File name sent with the upload
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Where to read the bytes from
    pub path: PathBuf,
}

impl VideoFile {
    pub fn new(path: impl Into<PathBuf>, name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            path: path.into(),
        }
    }

    /// Build from a path on disk, reading its size.
    pub fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = std::fs::metadata(path)?;
        if !metadata.is_file() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("{} is not a file", path.display()),
            ));
        }
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(path, name, metadata.len()))
    }

    /// Human-readable size, e.g. `10.00 MB`.
    pub fn formatted_size(&self) -> String {
        format_bytes(self.size)
    }

    pub fn estimated_processing_time(&self) -> String {
        estimate_processing_time(self.size)
    }
}

/// Everything needed for one submit attempt.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct JobRequest {
    /// Selected video, if any
    pub file: Option<VideoFile>,
    /// Seconds between screenshots, if entered
    pub interval_seconds: Option<f64>,
}

impl JobRequest {
    pub fn new(file: VideoFile, interval_seconds: f64) -> Self {
        Self {
            file: Some(file),
            interval_seconds: Some(interval_seconds),
        }
    }

    /// Interval as sent in the `interval` form field.
    pub fn interval_field(&self) -> String {
        self.interval_seconds
            .map(|i| i.to_string())
            .unwrap_or_default()
    }
}

/// Format bytes as human-readable string (KB, MB, GB).
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

/// Rough server-side processing time, assuming one second per MiB.
///
/// Reported in seconds up to one minute, then in minutes rounded up.
pub fn estimate_processing_time(bytes: u64) -> String {
    const MIB: u64 = 1024 * 1024;

    let seconds = bytes.div_ceil(MIB);
    let minutes = seconds.div_ceil(60);
    if minutes > 1 {
        format!("approximately {} minutes", minutes)
    } else {
        format!("approximately {} seconds", seconds)
    }
}
