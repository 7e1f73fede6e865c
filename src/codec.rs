use base64::Engine;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    #[serde(rename = "image/jpeg")]
    Jpeg,
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/webp")]
    Webp,
}

impl MediaType {
    pub fn as_str(self) -> &'static str {
        match self {
            MediaType::Jpeg => "image/jpeg",
            MediaType::Png => "image/png",
            MediaType::Webp => "image/webp",
        }
    }

    fn from_format(format: image::ImageFormat) -> Option<Self> {
        match format {
            image::ImageFormat::Jpeg => Some(MediaType::Jpeg),
            image::ImageFormat::Png => Some(MediaType::Png),
            image::ImageFormat::WebP => Some(MediaType::Webp),
            _ => None,
        }
    }

    /// Trusts the declared content type when it names a supported format,
    /// otherwise sniffs the magic bytes. Pixel data is never decoded.
    pub fn resolve(declared: Option<&str>, bytes: &[u8]) -> Option<Self> {
        let declared = declared
            .map(|d| d.split(';').next().unwrap_or(d).trim().to_ascii_lowercase())
            .and_then(|d| match d.as_str() {
                "image/jpg" | "image/pjpeg" => Some(MediaType::Jpeg),
                other => image::ImageFormat::from_mime_type(other).and_then(Self::from_format),
            });
        declared.or_else(|| image::guess_format(bytes).ok().and_then(Self::from_format))
    }
}

/// Photo in transport form, ready to be embedded in a model request.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct EncodedImage {
    pub data: String,
    pub media_type: MediaType,
}

impl EncodedImage {
    pub fn new(raw: &[u8], media_type: MediaType) -> Self {
        Self { data: encode(raw), media_type }
    }
}

pub fn encode(raw: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(raw)
}

#[cfg(test)]
pub fn decode(text: &str) -> Result<Vec<u8>, base64::DecodeError> {
    base64::engine::general_purpose::STANDARD.decode(text)
}
