use std::fmt;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

/// Content types accepted for customer images, compared case-insensitively.
pub const ALLOWED_CONTENT_TYPES: &[&str] = &[
    "image/jpeg",
    "image/jpg",
    "image/png",
    "image/gif",
    "image/webp",
];

/// Largest decoded payload accepted (5 MiB, inclusive).
pub const MAX_FILE_SIZE_BYTES: usize = 5 * 1024 * 1024;

/// Smallest decoded payload accepted (inclusive).
pub const MIN_FILE_SIZE_BYTES: usize = 100;

/// An image as submitted by a caller, before any rule has been applied.
#[derive(Debug, Clone, Copy)]
pub struct ImageCandidate<'a> {
    pub content_type: &'a str,
    pub image_data: &'a str,
    pub file_name: &'a str,
}

/// An image that passed every rule. Carries the size derived from decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidatedImage {
    pub file_size_bytes: i64,
}

/// Why a candidate image was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageRejection {
    InvalidContentType(String),
    MissingData,
    InvalidBase64,
    TooLarge { actual: usize, max: usize },
    TooSmall,
}

impl fmt::Display for ImageRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidContentType(content_type) => write!(
                f,
                "Invalid content type '{content_type}'. Allowed types: {}",
                ALLOWED_CONTENT_TYPES.join(", ")
            ),
            Self::MissingData => f.write_str("Image data is required."),
            Self::InvalidBase64 => f.write_str("Invalid base64 format."),
            Self::TooLarge { actual, max } => write!(
                f,
                "File size ({} bytes) exceeds maximum allowed size ({} bytes).",
                group_thousands(*actual),
                group_thousands(*max)
            ),
            Self::TooSmall => f.write_str("File appears to be too small to be a valid image."),
        }
    }
}

impl std::error::Error for ImageRejection {}

/// Run every image rule in order; the first failing rule wins.
///
/// Pure: the verdict depends only on the candidate.
pub fn validate_image(candidate: &ImageCandidate<'_>) -> Result<ValidatedImage, ImageRejection> {
    if !is_allowed_content_type(candidate.content_type) {
        return Err(ImageRejection::InvalidContentType(
            candidate.content_type.to_string(),
        ));
    }

    if candidate.image_data.trim().is_empty() {
        return Err(ImageRejection::MissingData);
    }

    let bytes = decode_payload(candidate.image_data).map_err(|_| ImageRejection::InvalidBase64)?;

    if bytes.len() > MAX_FILE_SIZE_BYTES {
        return Err(ImageRejection::TooLarge {
            actual: bytes.len(),
            max: MAX_FILE_SIZE_BYTES,
        });
    }
    if bytes.len() < MIN_FILE_SIZE_BYTES {
        return Err(ImageRejection::TooSmall);
    }

    Ok(ValidatedImage {
        file_size_bytes: bytes.len() as i64,
    })
}

pub fn is_allowed_content_type(content_type: &str) -> bool {
    let lowered = content_type.to_lowercase();
    ALLOWED_CONTENT_TYPES.contains(&lowered.as_str())
}

/// Returns the base64 body of a payload, dropping a `data:<mime>;base64,` prefix.
pub fn payload_body(payload: &str) -> &str {
    match payload.split_once(',') {
        Some((_, body)) => body,
        None => payload,
    }
}

/// Decode a stored or submitted payload into raw bytes.
///
/// ASCII whitespace inside the body (line-wrapped base64) is ignored.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let body = payload_body(payload);
    if body.bytes().any(|b| b.is_ascii_whitespace()) {
        let compact: String = body.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        STANDARD.decode(compact)
    } else {
        STANDARD.decode(body)
    }
}

/// Format a byte count with `,` thousands separators.
fn group_thousands(n: usize) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}
