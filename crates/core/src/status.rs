//! Vendor job identifiers and normalized job status.

use std::fmt;

/// Opaque identifier a vendor assigns to a generation job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    /// Returns `None` for blank identifiers, which vendors sometimes send in
    /// place of omitting the field.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Job status as reported by a vendor, collapsed onto the states the poll
/// loop cares about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorStatus {
    /// Anything that is not terminal. Keeps the raw status for logging.
    Pending { status: Option<String> },
    Completed { video_url: Option<String> },
    Failed,
    Canceled,
}

impl VendorStatus {
    /// Map a raw vendor status string onto a [`VendorStatus`].
    ///
    /// `video_url` is only kept for `completed`. Matching ignores case and
    /// accepts both `canceled` and `cancelled`.
    pub fn from_raw(status: Option<&str>, video_url: Option<String>) -> Self {
        let normalized = status.map(|s| s.trim().to_ascii_lowercase());
        match normalized.as_deref() {
            Some("completed") => Self::Completed { video_url },
            Some("failed") => Self::Failed,
            Some("canceled") | Some("cancelled") => Self::Canceled,
            _ => Self::Pending {
                status: status.map(str::to_string),
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending { .. })
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending { status: Some(s) } => f.write_str(s),
            Self::Pending { status: None } => f.write_str("unknown"),
            Self::Completed { .. } => f.write_str("completed"),
            Self::Failed => f.write_str("failed"),
            Self::Canceled => f.write_str("canceled"),
        }
    }
}
