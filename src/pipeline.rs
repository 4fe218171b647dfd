//! Decode, quantize, and re-encode a TGA image in one call.

use crate::{lbg, Error, LbgOptions, Perturbation, QuantizeSummary, RasterCodec, Tga};

/// Quantizes the TGA image in `bytes` according to `options`
/// and returns the re-encoded image alongside the run's [`QuantizeSummary`].
///
/// The header and trailing bytes of the input are preserved exactly.
///
/// # Errors
/// If `bytes` cannot be decoded (see [`Tga::read`]) or quantization fails
/// (see [`lbg::quantize_with_perturbation`]).
pub fn quantize_tga(bytes: &[u8], options: &LbgOptions) -> Result<(Vec<u8>, QuantizeSummary), Error> {
    let mut tga = Tga::new();
    let mut grid = tga.decode(bytes)?;
    let summary = lbg::quantize_with(&mut grid, options)?;
    Ok((tga.encode(&grid)?, summary))
}

/// Like [`quantize_tga`], but draws perturbations from `perturbation`.
///
/// # Errors
/// See [`quantize_tga`].
pub fn quantize_tga_with_perturbation(
    bytes: &[u8],
    options: &LbgOptions,
    perturbation: &mut impl Perturbation,
) -> Result<(Vec<u8>, QuantizeSummary), Error> {
    let mut tga = Tga::new();
    let mut grid = tga.decode(bytes)?;
    let summary = lbg::quantize_with_perturbation(&mut grid, options, perturbation)?;
    Ok((tga.encode(&grid)?, summary))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{tests::*, tga::HEADER_LEN, FixedPerturbation, PixelGrid, QuantizeError, TgaError};
    use palette::Srgb;

    #[test]
    fn average_only() {
        let grid = test_grid(8, 8);
        let mut bytes = Tga::new().encode(&grid).unwrap();
        bytes.extend_from_slice(b"trailing metadata");

        let (output, summary) = quantize_tga(&bytes, &LbgOptions::new()).unwrap();

        assert_eq!(output.len(), bytes.len());
        assert_eq!(output[..HEADER_LEN], bytes[..HEADER_LEN]);
        assert!(output.ends_with(b"trailing metadata"));

        let quantized = Tga::new().decode(&output).unwrap();
        assert_eq!(summary.codebook.len(), 1);
        assert!(quantized.colors().iter().all(|&c| c == summary.codebook[0]));
    }

    #[test]
    fn exact_colors_survive() {
        let colors = [0, 60, 120, 180].map(|r| Srgb::new(r, 0, 0));
        let grid = PixelGrid::from_colors(2, 2, colors.to_vec()).unwrap();
        let bytes = Tga::new().encode(&grid).unwrap();

        let (output, summary) = quantize_tga_with_perturbation(
            &bytes,
            &LbgOptions::new().codebook_bits(2),
            &mut FixedPerturbation(Srgb::new(10, 0, 0)),
        )
        .unwrap();

        assert_eq!(output, bytes);
        assert_eq!(summary.distortion, 0);
    }

    #[test]
    fn errors_are_wrapped() {
        assert!(matches!(
            quantize_tga(&[0; 4], &LbgOptions::new()),
            Err(Error::Tga(TgaError::Io(_)))
        ));

        let empty = Tga::new().encode(&PixelGrid::filled(0, 3, Srgb::new(0, 0, 0))).unwrap();
        assert!(matches!(
            quantize_tga(&empty, &LbgOptions::new()),
            Err(Error::Quantize(QuantizeError::EmptyImage))
        ));
    }
}
