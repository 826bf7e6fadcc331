//! Pre-submit checks for job requests.
//!
//! Each check is usable on its own so a form can re-check a single field when
//! it changes. [`validate`] runs all of them in order and stops at the first
//! failure.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::request::{JobRequest, VideoFile};

/// Accepted video extensions (compared case-insensitively).
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["mp4", "avi", "mov", "mkv", "flv", "wmv"];

/// Largest accepted upload: 500 MiB.
pub const MAX_FILE_SIZE: u64 = 500 * 1024 * 1024;

/// Smallest accepted screenshot interval, in seconds.
pub const MIN_INTERVAL_SECS: f64 = 0.1;

pub type ValidationResult = Result<(), ValidationError>;

/// User-correctable input problems. Never sent to the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Error, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ValidationError {
    #[error("Please select a video file")]
    NoFile,

    #[error("Please select a valid video file (MP4, AVI, MOV, MKV, FLV, WMV)")]
    BadType,

    #[error("File size must be less than 500MB")]
    TooLarge,

    #[error("Please enter a valid interval greater than 0")]
    NoInterval,

    #[error("Minimum interval is 0.1 seconds")]
    IntervalTooSmall,
}

/// Run every check in order.
pub fn validate(request: &JobRequest) -> ValidationResult {
    let file = check_file_present(request.file.as_ref())?;
    check_extension(&file.name)?;
    check_size(file.size)?;
    check_interval(request.interval_seconds)
}

/// Presence, type and size of the selected file.
pub fn check_file(file: Option<&VideoFile>) -> ValidationResult {
    let file = check_file_present(file)?;
    check_extension(&file.name)?;
    check_size(file.size)
}

pub fn check_file_present(file: Option<&VideoFile>) -> Result<&VideoFile, ValidationError> {
    file.ok_or(ValidationError::NoFile)
}

/// The extension is whatever follows the last `.`; a name without one is
/// checked as a whole.
pub fn check_extension(file_name: &str) -> ValidationResult {
    let extension = file_name.rsplit('.').next().unwrap_or(file_name);
    if ALLOWED_EXTENSIONS
        .iter()
        .any(|allowed| allowed.eq_ignore_ascii_case(extension))
    {
        Ok(())
    } else {
        Err(ValidationError::BadType)
    }
}

pub fn check_size(size: u64) -> ValidationResult {
    if size > MAX_FILE_SIZE {
        Err(ValidationError::TooLarge)
    } else {
        Ok(())
    }
}

pub fn check_interval(interval: Option<f64>) -> ValidationResult {
    match interval {
        Some(value) if value.is_finite() && value > 0.0 => {
            if value < MIN_INTERVAL_SECS {
                Err(ValidationError::IntervalTooSmall)
            } else {
                Ok(())
            }
        }
        _ => Err(ValidationError::NoInterval),
    }
}

/// Parse raw interval text from an input field.
///
/// Reads the leading decimal number and ignores whatever follows it, so
/// `"2s"` is 2. Text that does not start with a number yields `None`, which
/// [`check_interval`] reports as [`ValidationError::NoInterval`].
pub fn parse_interval(text: &str) -> Option<f64> {
    let text = text.trim_start();
    let bytes = text.as_bytes();
    let digits_from = |start: usize| {
        bytes[start..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count()
    };

    let mut end = usize::from(matches!(bytes.first(), Some(b'+' | b'-')));
    let int_digits = digits_from(end);
    end += int_digits;

    let mut frac_digits = 0;
    if bytes.get(end) == Some(&b'.') {
        frac_digits = digits_from(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let sign = usize::from(matches!(bytes.get(end + 1), Some(b'+' | b'-')));
        let exp_digits = digits_from(end + 1 + sign);
        if exp_digits > 0 {
            end += 1 + sign + exp_digits;
        }
    }

    text[..end].parse().ok()
}
