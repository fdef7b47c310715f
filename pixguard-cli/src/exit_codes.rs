//! Exit codes following sysexits.h conventions.
//!
//! Scripts can tell a missing file apart from an image that simply carries
//! no watermark.

use pixguard_core::PixguardError;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Command line usage or configuration error.
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Data format error (undecodable image, corrupt or mismatched payload).
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Cannot open input file.
/// Maps to EX_NOINPUT from sysexits.h.
pub const INPUT_ERROR: i32 = 66;

/// I/O error (cannot write output file).
/// Maps to EX_IOERR from sysexits.h.
pub const IO_ERROR: i32 = 74;

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        let engine_error = err
            .chain()
            .find_map(|cause| cause.downcast_ref::<PixguardError>());

        let code = match engine_error {
            Some(PixguardError::InvalidConfig(_)) => USAGE_ERROR,
            Some(PixguardError::MalformedBitstring(_)) => GENERAL_ERROR,
            Some(_) => DATA_ERROR,
            None => classify_message(&message),
        };

        Self {
            code,
            message: Some(message),
        }
    }
}

fn classify_message(message: &str) -> i32 {
    if message.contains("Failed to read") {
        INPUT_ERROR
    } else if message.contains("Failed to write") || message.contains("serialize") {
        IO_ERROR
    } else if message.contains("Owner mismatch") || message.contains("Failed to parse index") {
        DATA_ERROR
    } else {
        GENERAL_ERROR
    }
}
