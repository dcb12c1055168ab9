//! Image decode / re-encode before encryption.
//!
//! Stored payloads are not the raw source bytes: the image is decoded and
//! re-encoded in the format named by its extension, which normalizes the
//! payload and rejects files that are not really images.

use std::fs;
use std::path::Path;

use crate::error::{Result, VaultError};

/// Turns an image file into the byte buffer that gets encrypted.
///
/// Implementations must be deterministic for identical input.
pub trait ImageCodec {
    fn reencode(&self, path: &Path) -> Result<Vec<u8>>;
}

/// Stores the file bytes untouched. Useful in tests and for builds without
/// the `raster` feature.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughCodec;

impl ImageCodec for PassthroughCodec {
    fn reencode(&self, path: &Path) -> Result<Vec<u8>> {
        fs::read(path).map_err(|e| VaultError::io(path, e))
    }
}

#[cfg(feature = "raster")]
pub use raster::{guess_extension, RasterCodec};

#[cfg(feature = "raster")]
mod raster {
    use std::io::Cursor;
    use std::path::Path;

    use image::{ImageError, ImageFormat};
    use tracing::debug;

    use super::ImageCodec;
    use crate::error::{Result, VaultError};

    /// Decode with the `image` crate and re-encode in the source format.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct RasterCodec;

    impl RasterCodec {
        /// Output format named by the file extension.
        pub fn format_for(path: &Path) -> Result<ImageFormat> {
            let ext = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
            ImageFormat::from_extension(ext).ok_or_else(|| {
                VaultError::format(
                    format!("image {}", path.display()),
                    format!("no encoder for extension {ext:?}"),
                )
            })
        }
    }

    impl ImageCodec for RasterCodec {
        fn reencode(&self, path: &Path) -> Result<Vec<u8>> {
            let format = Self::format_for(path)?;

            let image = image::open(path).map_err(|e| match e {
                ImageError::IoError(io) => VaultError::io(path, io),
                other => VaultError::format(format!("image {}", path.display()), other),
            })?;

            let mut buffer = Cursor::new(Vec::new());
            image
                .write_to(&mut buffer, format)
                .map_err(|e| VaultError::format(format!("image {}", path.display()), e))?;

            let bytes = buffer.into_inner();
            debug!(
                path = %path.display(),
                format = ?format,
                width = image.width(),
                height = image.height(),
                bytes = bytes.len(),
                "Re-encoded image"
            );
            Ok(bytes)
        }
    }

    /// Preferred file extension for a decrypted payload, sniffed from its magic bytes.
    pub fn guess_extension(bytes: &[u8]) -> Option<&'static str> {
        image::guess_format(bytes)
            .ok()
            .and_then(|format| format.extensions_str().first().copied())
    }
}
