//! Texture transcoding.
//!
//! Decodes an embedded texture, shrinks it when it exceeds the configured
//! edge length, and re-encodes it in the same format family. This module
//! works purely on byte slices; it never touches the filesystem.

mod resize;

pub use resize::target_dimensions;

use std::io::Cursor;

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::{CompressionType, FilterType as PngFilter, PngEncoder};
use image::imageops::FilterType;
use image::{DynamicImage, ImageFormat, ImageReader, Limits};

use crate::{Error, Result};

/// Default maximum texture edge in pixels.
pub const DEFAULT_MAX_SIZE: u32 = 2048;

/// Default JPEG quality.
pub const DEFAULT_QUALITY: u8 = 85;

/// Default decode budget in pixels. Photogrammetry atlases can be huge.
pub const DEFAULT_MAX_DECODE_PIXELS: u64 = 200_000_000;

/// Parameters for a transcode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscodeSettings {
    /// Largest allowed width or height after transcoding.
    pub max_size: u32,
    /// JPEG quality, 1-100. Ignored for PNG.
    pub quality: u8,
    /// Upper bound on decoded pixels.
    pub max_decode_pixels: u64,
}

impl Default for TranscodeSettings {
    fn default() -> Self {
        Self {
            max_size: DEFAULT_MAX_SIZE,
            quality: DEFAULT_QUALITY,
            max_decode_pixels: DEFAULT_MAX_DECODE_PIXELS,
        }
    }
}

/// Output format family, chosen from the image's declared MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFamily {
    Jpeg,
    Png,
}

impl ImageFamily {
    /// Map a glTF `mimeType`. A missing MIME type means JPEG.
    pub fn from_mime(mime: Option<&str>) -> Result<Self> {
        match mime {
            None | Some("image/jpeg") => Ok(Self::Jpeg),
            Some("image/png") => Ok(Self::Png),
            Some(other) => Err(Error::unsupported_image(format!(
                "MIME type {} is not transcodable",
                other
            ))),
        }
    }

    /// MIME type written by this family.
    pub fn mime_type(&self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Jpeg => "JPEG",
            Self::Png => "PNG",
        }
    }
}

/// Result of a successful transcode.
#[derive(Debug, Clone)]
pub struct Transcoded {
    /// Re-encoded image bytes.
    pub data: Vec<u8>,
    /// Size of the input in bytes.
    pub original_len: usize,
    /// Size of `data` in bytes.
    pub new_len: usize,
    /// Final width in pixels.
    pub width: u32,
    /// Final height in pixels.
    pub height: u32,
}

impl Transcoded {
    /// Whether the re-encoded image is smaller than the input.
    pub fn is_smaller(&self) -> bool {
        self.new_len < self.original_len
    }
}

/// Decode, downscale if needed, and re-encode an image.
///
/// # Arguments
///
/// * `data` - Encoded image bytes
/// * `mime` - Declared glTF MIME type (`None` means JPEG)
/// * `settings` - Size and quality parameters
///
/// # Errors
///
/// [`Error::UnsupportedImage`] when the MIME type or the encoded content is
/// not JPEG/PNG, or the codec rejects the data. The caller is expected to
/// keep the original bytes in that case.
pub fn transcode(data: &[u8], mime: Option<&str>, settings: &TranscodeSettings) -> Result<Transcoded> {
    let family = ImageFamily::from_mime(mime)?;
    let img = decode(data, settings.max_decode_pixels)?;

    let img = match target_dimensions(img.width(), img.height(), settings.max_size) {
        Some((width, height)) => {
            tracing::trace!(
                "Downscaling {}x{} -> {}x{}",
                img.width(),
                img.height(),
                width,
                height
            );
            img.resize_exact(width, height, FilterType::Lanczos3)
        }
        None => img,
    };

    let encoded = encode(img, family, settings.quality)?;

    Ok(Transcoded {
        original_len: data.len(),
        new_len: encoded.data.len(),
        data: encoded.data,
        width: encoded.width,
        height: encoded.height,
    })
}

/// Decode a JPEG or PNG image.
pub fn decode(data: &[u8], max_pixels: u64) -> Result<DynamicImage> {
    let mut reader = ImageReader::new(Cursor::new(data))
        .with_guessed_format()
        .map_err(|e| Error::unsupported_image(e.to_string()))?;

    match reader.format() {
        Some(ImageFormat::Jpeg) | Some(ImageFormat::Png) => {}
        Some(other) => {
            return Err(Error::unsupported_image(format!(
                "{:?} encoding is not supported",
                other
            )))
        }
        None => return Err(Error::unsupported_image("unrecognized image encoding")),
    }

    let mut limits = Limits::default();
    // Worst case four bytes per decoded pixel
    limits.max_alloc = Some(max_pixels.saturating_mul(4));
    reader.limits(limits);

    reader
        .decode()
        .map_err(|e| Error::unsupported_image(e.to_string()))
}

struct Encoded {
    data: Vec<u8>,
    width: u32,
    height: u32,
}

fn encode(img: DynamicImage, family: ImageFamily, quality: u8) -> Result<Encoded> {
    let mut data = Vec::new();

    let img = match family {
        ImageFamily::Jpeg => flatten_for_jpeg(img),
        ImageFamily::Png => img,
    };

    let written = match family {
        ImageFamily::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut data, quality.clamp(1, 100));
            img.write_with_encoder(encoder)
        }
        ImageFamily::Png => {
            let encoder =
                PngEncoder::new_with_quality(&mut data, CompressionType::Best, PngFilter::Adaptive);
            img.write_with_encoder(encoder)
        }
    };

    written.map_err(|e| Error::Encode {
        format: family.name(),
        message: e.to_string(),
    })?;

    Ok(Encoded {
        data,
        width: img.width(),
        height: img.height(),
    })
}

/// JPEG has no alpha and no palette: keep 8-bit gray and RGB as they are,
/// convert everything else to opaque RGB.
fn flatten_for_jpeg(img: DynamicImage) -> DynamicImage {
    match img {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => img,
        other => DynamicImage::ImageRgb8(other.to_rgb8()),
    }
}
