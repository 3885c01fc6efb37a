//! Domain types shared by the clipforge crates.
//!
//! Holds the validated [`GenerationRequest`] submitted by clients, the
//! normalized [`VendorStatus`] reported by video vendors, and the
//! validation error type used at the HTTP boundary.

pub mod error;
pub mod request;
pub mod status;

pub use error::CoreError;
pub use request::{ClipDuration, GenerationRequest, ImagePayload, ImageUpload};
pub use status::{JobId, VendorStatus};
