//! Client-submitted generation requests and their boundary validation.

use base64::Engine;

use crate::error::CoreError;

// ---------------------------------------------------------------------------
// Validation messages
// ---------------------------------------------------------------------------

pub const DURATION_ERROR: &str = "Duration must be 15 or 25 seconds";
pub const IMAGE_REQUIRED_ERROR: &str = "Image is required";
pub const IMAGE_UNREADABLE_ERROR: &str = "Failed to read image file";
pub const PROMPT_REQUIRED_ERROR: &str = "Prompt is required";

/// MIME type assumed when an upload does not declare one.
pub const DEFAULT_IMAGE_MIME: &str = "image/png";

// ---------------------------------------------------------------------------
// Duration
// ---------------------------------------------------------------------------

/// Length of the requested clip. Vendors only accept these two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClipDuration {
    Fifteen,
    TwentyFive,
}

impl ClipDuration {
    /// Parse the raw form value. Only the exact strings `"15"` and `"25"`
    /// are accepted.
    pub fn parse(raw: Option<&str>) -> Result<Self, CoreError> {
        match raw {
            Some("15") => Ok(Self::Fifteen),
            Some("25") => Ok(Self::TwentyFive),
            _ => Err(CoreError::Validation(DURATION_ERROR.into())),
        }
    }

    pub fn as_secs(self) -> u32 {
        match self {
            Self::Fifteen => 15,
            Self::TwentyFive => 25,
        }
    }
}

impl From<ClipDuration> for u32 {
    fn from(d: ClipDuration) -> Self {
        d.as_secs()
    }
}

impl std::fmt::Display for ClipDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_secs())
    }
}

// ---------------------------------------------------------------------------
// Image
// ---------------------------------------------------------------------------

/// Raw image bytes plus the MIME type reported by the uploader.
#[derive(Clone, PartialEq, Eq)]
pub struct ImagePayload {
    pub data: Vec<u8>,
    pub mime_type: String,
}

impl ImagePayload {
    /// Blank or missing MIME types fall back to [`DEFAULT_IMAGE_MIME`].
    pub fn new(data: Vec<u8>, mime_type: Option<&str>) -> Self {
        let mime_type = mime_type
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .unwrap_or(DEFAULT_IMAGE_MIME)
            .to_string();
        Self { data, mime_type }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.data)
    }

    /// Returns the image as a `data:<mime>;base64,<payload>` URI.
    pub fn to_data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, self.to_base64())
    }

    /// File extension matching the MIME type, for vendors that take a file
    /// upload rather than a data URI.
    pub fn file_extension(&self) -> &str {
        let essence = self
            .mime_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        match essence.split_once('/') {
            Some((_, "jpeg")) | Some((_, "jpg")) | Some((_, "pjpeg")) => "jpg",
            Some((_, "svg+xml")) => "svg",
            Some((_, subtype))
                if !subtype.is_empty() && subtype.chars().all(|c| c.is_ascii_alphanumeric()) =>
            {
                subtype
            }
            _ => "png",
        }
    }
}

// Image bytes are never worth printing.
impl std::fmt::Debug for ImagePayload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImagePayload")
            .field("mime_type", &self.mime_type)
            .field("size", &self.data.len())
            .finish()
    }
}

/// Outcome of reading the `image` form field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageUpload {
    /// No field, or a field with no content (an empty browser file input).
    Missing,
    /// The field was present but its body could not be read.
    Unreadable,
    Received(ImagePayload),
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// A validated image-to-video request, ready to hand to a provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Trimmed prompt text. May be empty for vendors that allow it.
    pub prompt: String,
    pub duration: ClipDuration,
    pub image: ImagePayload,
}

impl GenerationRequest {
    pub fn new(prompt: &str, duration: ClipDuration, image: ImagePayload) -> Self {
        Self {
            prompt: prompt.trim().to_string(),
            duration,
            image,
        }
    }

    /// Validate raw form values in the order clients expect errors:
    /// duration, image presence, image readability, then prompt (only when
    /// `prompt_required`).
    pub fn from_form(
        prompt: Option<&str>,
        duration: Option<&str>,
        image: ImageUpload,
        prompt_required: bool,
    ) -> Result<Self, CoreError> {
        let duration = ClipDuration::parse(duration)?;

        let image = match image {
            ImageUpload::Missing => {
                return Err(CoreError::Validation(IMAGE_REQUIRED_ERROR.into()))
            }
            ImageUpload::Unreadable => {
                return Err(CoreError::Validation(IMAGE_UNREADABLE_ERROR.into()))
            }
            ImageUpload::Received(payload) => payload,
        };

        let request = Self::new(prompt.unwrap_or_default(), duration, image);
        if prompt_required && request.prompt.is_empty() {
            return Err(CoreError::Validation(PROMPT_REQUIRED_ERROR.into()));
        }
        Ok(request)
    }
}
