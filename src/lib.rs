//! Lossy color compression of truecolor images through Linde-Buzo-Gray vector quantization.
//!
//! `lbgquant` reduces the colors of an image to a codebook of at most `2^bits` colors.
//! The codebook grows by repeatedly splitting every code in two with a small random perturbation
//! and refining the codes k-means style, using the Manhattan distance between RGB colors.
//!
//! # Overview
//! - [`PixelGrid`]: the decoded image, quantized in place.
//! - [`lbg`]: the quantizer itself, configured through [`LbgOptions`].
//! - [`Perturbation`]: the source of the random offsets used for splitting.
//!   Seeded by default, and replaceable for fully deterministic runs.
//! - [`Tga`]: a codec for uncompressed 24-bit TGA files that preserves all non-pixel bytes.
//!
//! # Features
//! - `image`: enables conversion between [`PixelGrid`] and `image::RgbImage`.
//! - `cli`: builds the `lbgquant` command-line tool.
//!
//! # Examples
//! ```
//! # use lbgquant::{lbg, LbgOptions, PixelGrid};
//! # use palette::Srgb;
//! # fn main() -> Result<(), lbgquant::QuantizeError> {
//! let colors = (0..64u8).map(|i| Srgb::new(i * 4, 255 - i * 4, 128)).collect();
//! let mut grid = PixelGrid::from_colors(8, 8, colors).unwrap();
//!
//! let options = LbgOptions::new().codebook_bits(2).seed(7);
//! let summary = lbg::quantize_with(&mut grid, &options)?;
//!
//! assert!(summary.codebook.len() <= 4);
//! println!("mse: {}, snr: {} dB", summary.mse, summary.snr);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::expect_used,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::many_single_char_names,
    clippy::missing_panics_doc,
    clippy::unreadable_literal,
    clippy::wildcard_imports
)]

mod grid;
mod perturbation;
mod pipeline;
mod types;

pub mod color;
pub mod lbg;
pub mod tga;

pub use grid::*;
pub use lbg::{LbgOptions, QuantizeSummary};
pub use perturbation::*;
pub use pipeline::*;
pub use tga::{RasterCodec, Tga, TgaHeader};
pub use types::*;

/// The maximum supported number of codebook doublings.
///
/// The codebook can never hold more than `2^MAX_CODEBOOK_BITS` colors,
/// though memory runs out long before that.
pub const MAX_CODEBOOK_BITS: u8 = 127;

/// The maximum number of pixels a grid may hold to be quantized.
///
/// Per-code pixel counts are stored as `u32`.
pub const MAX_PIXELS: u32 = u32::MAX;

#[cfg(test)]
pub(crate) mod tests {
    use crate::{color::Color, PixelGrid};
    use palette::Srgb;
    use rand::{Rng, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    pub fn test_data(len: usize) -> Vec<Color> {
        let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(42);
        (0..len)
            .map(|_| Srgb::new(rng.gen(), rng.gen(), rng.gen()))
            .collect()
    }

    pub fn test_data_256() -> Vec<Color> {
        test_data(256)
    }

    pub fn test_data_1024() -> Vec<Color> {
        test_data(1024)
    }

    #[allow(clippy::unwrap_used)]
    pub fn test_grid(width: u32, height: u32) -> PixelGrid {
        PixelGrid::from_colors(width, height, test_data(width as usize * height as usize)).unwrap()
    }
}
