//! Contains the error types shared across the crate.

use crate::{MAX_CODEBOOK_BITS, MAX_PIXELS};
use thiserror::Error;

/// An error returned by the quantizer.
///
/// The pixel grid is never modified when one of these is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QuantizeError {
    /// The grid has no pixels, so there is nothing to average.
    #[error("cannot quantize an image with no pixels")]
    EmptyImage,
    /// The grid has more than [`MAX_PIXELS`] pixels.
    #[error("{0} pixels is above the maximum of {max}", max = MAX_PIXELS)]
    TooManyPixels(u64),
    /// The requested number of codebook bits is above [`MAX_CODEBOOK_BITS`].
    #[error("{0} codebook bits is above the maximum of {max}", max = MAX_CODEBOOK_BITS)]
    CodebookBitsOutOfRange(u8),
    /// The codebook could not be doubled beyond the inner number of entries.
    #[error("failed to grow the codebook past {0} entries")]
    CodebookTooLarge(usize),
    /// The cancellation flag was raised before the run finished.
    #[error("quantization was cancelled")]
    Cancelled,
}

/// An error returned while reading or writing a TGA image.
#[derive(Debug, Error)]
pub enum TgaError {
    /// The underlying reader or writer failed, including on truncated input.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    /// The image is not an uncompressed 24-bit truecolor image without a color map.
    #[error(
        "unsupported TGA image: type {image_type}, {pixel_depth} bits per pixel, \
         color map length {colormap_length}"
    )]
    Unsupported {
        /// The image type field.
        image_type: u8,
        /// The bits per pixel field.
        pixel_depth: u8,
        /// The color map length field.
        colormap_length: u16,
    },
    /// The grid to encode does not match the dimensions of the decoded header.
    #[error("grid is {width}x{height} but the TGA header describes {expected_width}x{expected_height}")]
    DimensionMismatch {
        /// The width stored in the header.
        expected_width: u32,
        /// The height stored in the header.
        expected_height: u32,
        /// The width of the grid.
        width: u32,
        /// The height of the grid.
        height: u32,
    },
    /// The grid is too large to describe in a TGA header.
    #[error("a {width}x{height} image is above the TGA maximum of {max}x{max}", max = u16::MAX)]
    TooLarge {
        /// The width of the grid.
        width: u32,
        /// The height of the grid.
        height: u32,
    },
}

/// Any error returned by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// See [`QuantizeError`].
    #[error(transparent)]
    Quantize(#[from] QuantizeError),
    /// See [`TgaError`].
    #[error(transparent)]
    Tga(#[from] TgaError),
}
