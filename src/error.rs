//! Error types for fetching, classifying and exporting registrations.
//!
//! Every failure in the library is fatal for the run. [`GuestlistError::kind`]
//! groups the variants into the coarse categories the binary reports.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Transport or response-format failure while fetching attendees.
    Fetch,
    /// Registrant data does not agree with the day buckets.
    Inconsistent,
    /// Settings or day configuration are missing a required value.
    ConfigIncomplete,
    /// Reading or writing local files failed.
    Io,
}

/// Errors raised by the guestlist library.
#[derive(Debug, Error)]
pub enum GuestlistError {
    /// The request for a page could not be delivered or timed out.
    #[error("page {page} request delivery: {source}")]
    Transport {
        page: u32,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code.
    #[error("page {page}: bad response, status code={status}")]
    Status { page: u32, status: u16 },

    /// The page body is not the expected JSON document.
    #[error("page {page}: reading response body: {source}")]
    MalformedPage {
        page: u32,
        #[source]
        source: serde_json::Error,
    },

    /// An attendee record could not be decoded.
    #[error("page {page}, attendee {index}: {reason}")]
    MalformedRecord {
        page: u32,
        index: usize,
        reason: String,
    },

    /// An attendee record has no `profile` object.
    #[error("page {page}, attendee {index}: attendee missing profile")]
    MissingProfile { page: u32, index: usize },

    /// The string-encoded attendee id is not a number.
    #[error("page {page}, attendee {index}: expected attendee id to be a number, got '{value}'")]
    InvalidAttendeeId {
        page: u32,
        index: usize,
        value: String,
    },

    /// A registrant sits in a bucket that does not match its role.
    #[error("mismatched ticket/role: bucket '{bucket}' holds {email} with role '{role}'")]
    BucketMismatch {
        bucket: String,
        email: String,
        role: String,
    },

    /// The same email appears more than once in one day's guest list.
    #[error("duplicate email {email} in guest list for '{ticket_type}'")]
    DuplicateEmail { ticket_type: String, email: String },

    /// The number of day buckets differs from the expected count.
    #[error("expected {expected} day buckets, found {found}")]
    UnexpectedDayCount { expected: usize, found: usize },

    /// Two ticket types map to the same output file.
    #[error("ticket types '{first}' and '{second}' both map to {}", .path.display())]
    FileNameCollision {
        first: String,
        second: String,
        path: PathBuf,
    },

    /// No day configuration entry exists for a ticket type.
    #[error("no day configuration for ticket type '{ticket_type}'")]
    MissingDayConfig { ticket_type: String },

    /// A required value is empty.
    #[error("{field} must not be empty{}", context_suffix(.context))]
    EmptyValue {
        field: &'static str,
        context: Option<String>,
    },

    /// A setting is present but cannot be used.
    #[error("invalid setting {name}: {reason}")]
    InvalidSetting { name: &'static str, reason: String },

    /// The day configuration file is not valid JSON of the expected shape.
    #[error("parsing day configuration {}: {source}", .path.display())]
    DayConfig {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Reading or writing a CSV file failed.
    #[error("CSV error in {}: {source}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Encoding a guest list document failed.
    #[error("encoding guest list for '{ticket_type}': {source}")]
    Encode {
        ticket_type: String,
        #[source]
        source: serde_json::Error,
    },

    /// A file system operation failed.
    #[error("I/O error with '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn context_suffix(context: &Option<String>) -> String {
    match context {
        Some(c) => format!(" (for '{c}')"),
        None => String::new(),
    }
}

impl GuestlistError {
    /// Category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            GuestlistError::Transport { .. }
            | GuestlistError::Status { .. }
            | GuestlistError::MalformedPage { .. }
            | GuestlistError::MalformedRecord { .. }
            | GuestlistError::MissingProfile { .. }
            | GuestlistError::InvalidAttendeeId { .. } => ErrorKind::Fetch,
            GuestlistError::BucketMismatch { .. }
            | GuestlistError::DuplicateEmail { .. }
            | GuestlistError::UnexpectedDayCount { .. }
            | GuestlistError::FileNameCollision { .. } => ErrorKind::Inconsistent,
            GuestlistError::MissingDayConfig { .. }
            | GuestlistError::EmptyValue { .. }
            | GuestlistError::InvalidSetting { .. }
            | GuestlistError::DayConfig { .. } => ErrorKind::ConfigIncomplete,
            GuestlistError::Csv { .. }
            | GuestlistError::Encode { .. }
            | GuestlistError::Io { .. } => ErrorKind::Io,
        }
    }

    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        GuestlistError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, GuestlistError>;
