use crate::foundation::error::{PreviewError, PreviewResult};
use base64::{Engine as _, engine::general_purpose::STANDARD as BASE64};
use serde::{Deserialize, Serialize};

/// Still-image encodings the surface can produce.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    /// `image/jpeg`
    Jpeg,
    /// `image/png`
    #[default]
    Png,
}

impl ImageFormat {
    /// MIME type used on the wire.
    pub fn mime(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    /// Inverse of [`ImageFormat::mime`].
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            _ => None,
        }
    }

    fn image_format(self) -> image::ImageFormat {
        match self {
            Self::Jpeg => image::ImageFormat::Jpeg,
            Self::Png => image::ImageFormat::Png,
        }
    }
}

/// Encoded still captured from the surface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapturedImage {
    /// Encoding of `bytes`.
    pub format: ImageFormat,
    /// Encoded image bytes.
    pub bytes: Vec<u8>,
}

impl CapturedImage {
    /// Parse a base64 `data:` URL such as `data:image/png;base64,iVBOR...`.
    pub fn from_data_url(url: &str) -> PreviewResult<Self> {
        let rest = url
            .strip_prefix("data:")
            .ok_or_else(|| PreviewError::protocol("image blob is not a data: URL"))?;
        let (meta, payload) = rest
            .split_once(',')
            .ok_or_else(|| PreviewError::protocol("data: URL has no payload"))?;
        let mime = meta
            .strip_suffix(";base64")
            .ok_or_else(|| PreviewError::protocol("data: URL payload is not base64"))?;
        let format = ImageFormat::from_mime(mime).ok_or_else(|| {
            PreviewError::protocol(format!("unsupported image type '{mime}'"))
        })?;
        let bytes = BASE64
            .decode(payload)
            .map_err(|e| PreviewError::protocol(format!("decode image payload: {e}")))?;
        Ok(Self { format, bytes })
    }

    /// Re-encode as a base64 `data:` URL.
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.format.mime(),
            BASE64.encode(&self.bytes)
        )
    }

    /// Decode into pixels.
    pub fn decode(&self) -> PreviewResult<image::DynamicImage> {
        image::load_from_memory_with_format(&self.bytes, self.format.image_format())
            .map_err(|e| PreviewError::Other(anyhow::Error::new(e).context("decode captured image")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/protocol/capture.rs"]
mod tests;
