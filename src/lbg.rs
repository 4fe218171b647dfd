//! Linde-Buzo-Gray vector quantization.
//!
//! The codebook starts as the single average color of the image and grows by doubling:
//! every code `c` gains a sibling `c + p`, where `p` is one small random perturbation shared
//! by the whole doubling round. Between doublings, pixels are reassigned to their nearest code
//! by Manhattan distance and every non-empty region's code is moved to the average of its members,
//! as in k-means.
//!
//! The run stops once the relative change in distortion drops below
//! [`max_error`](LbgOptions::max_error) (default `1%`). The stop rule is checked after
//! reassignment but before codes are improved, so the codes written to the image are the ones
//! the final assignment was made against.
//!
//! Nothing bounds the number of iterations by default.
//! See [`LbgOptions::max_iterations`] and [`LbgOptions::cancel_flag`] for ways to cut a run short.

// Referenced paper:
// Y. Linde, A. Buzo, R. Gray, An Algorithm for Vector Quantizer Design,
// IEEE Transactions on Communications, vol. 28, no. 1, 84–95, 1980.
// https://doi.org/10.1109/TCOM.1980.1094577

use crate::{
    color::{self, Color, ColorSum, BLACK},
    Perturbation, PixelGrid, QuantizeError, RandomPerturbation, MAX_CODEBOOK_BITS, MAX_PIXELS,
};
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use tracing::{debug, warn};

/// The default relative distortion change under which a run stops.
pub const DEFAULT_MAX_ERROR: f64 = 0.01;

/// A builder struct to specify the parameters for the LBG quantizer.
///
/// # Examples
/// ```
/// # use lbgquant::LbgOptions;
/// let options = LbgOptions::new()
///     .codebook_bits(4)
///     .max_iterations(Some(100))
///     .seed(42);
/// ```
#[derive(Debug, Clone)]
pub struct LbgOptions {
    /// The log2 of the maximum codebook size.
    pub(crate) codebook_bits: u8,
    /// The relative distortion change under which the run stops.
    pub(crate) max_error: f64,
    /// The optional cap on the number of iterations.
    pub(crate) max_iterations: Option<u32>,
    /// The seed value for the default perturbation source.
    pub(crate) seed: u64,
    /// A flag that, once raised, cancels the run.
    pub(crate) cancel: Option<Arc<AtomicBool>>,
}

impl Default for LbgOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl LbgOptions {
    /// Creates a new [`LbgOptions`] with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            codebook_bits: 0,
            max_error: DEFAULT_MAX_ERROR,
            max_iterations: None,
            seed: 0,
            cancel: None,
        }
    }

    /// Sets the log2 of the maximum codebook size, i.e., the maximum number of doublings.
    ///
    /// Must be at most [`MAX_CODEBOOK_BITS`]. The default is `0`, which quantizes the image
    /// to its average color.
    #[must_use]
    pub fn codebook_bits(mut self, bits: u8) -> Self {
        self.codebook_bits = bits;
        self
    }

    /// Sets the relative distortion change under which the run stops.
    ///
    /// The default is [`DEFAULT_MAX_ERROR`].
    #[must_use]
    pub fn max_error(mut self, max_error: f64) -> Self {
        self.max_error = max_error;
        self
    }

    /// Sets an upper bound on the number of iterations.
    ///
    /// Once reached, the run stops as if it had converged, except that
    /// [`QuantizeSummary::converged`] will be `false`.
    /// At least one iteration is always run, so a limit of `0` acts like `1`.
    /// The default is `None`, in which case only the stop rule ends the run.
    #[must_use]
    pub fn max_iterations(mut self, max_iterations: Option<u32>) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Sets the seed value for the random perturbations used by [`quantize`] and [`quantize_with`].
    ///
    /// The default seed is `0`.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Sets a flag that is checked at the start of every iteration.
    /// If it is `true`, the run returns [`QuantizeError::Cancelled`].
    #[must_use]
    pub fn cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Whether the cancellation flag has been raised.
    fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

/// The result of a quantization run.
///
/// The quantized colors themselves are written into the [`PixelGrid`];
/// this holds the codebook and statistics for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct QuantizeSummary {
    /// The final codebook. Its length is always `2^doublings`.
    ///
    /// The codes are not guaranteed to be unique.
    pub codebook: Vec<Color>,
    /// The number of pixels assigned to each code in `codebook`.
    ///
    /// Each count is not guaranteed to be non-zero.
    pub counts: Vec<u32>,
    /// The number of times the codebook was doubled.
    pub doublings: u8,
    /// The number of iterations that were run.
    pub iterations: u32,
    /// The final mean Manhattan distance between each pixel and its code (truncated).
    pub distortion: u64,
    /// The mean of the squared Manhattan distances between each original and quantized color.
    pub mse: f64,
    /// The signal to noise ratio in decibels, `f64::INFINITY` if `mse` is `0`.
    pub snr: f64,
    /// Whether the run ended through the stop rule rather than the iteration cap.
    pub converged: bool,
}

/// Returns the index of the code nearest to `color`, preferring the lowest index on ties.
#[inline]
fn nearest(codebook: &[Color], color: Color) -> usize {
    let mut min_index = 0;
    let mut min_distance = u32::MAX;
    for (i, &code) in codebook.iter().enumerate() {
        let distance = color::manhattan_distance(code, color);
        if distance < min_distance {
            min_distance = distance;
            min_index = i;
        }
    }
    min_index
}

/// The working state of a quantization run.
struct State<'a> {
    /// The original colors, never modified during the run.
    colors: &'a [Color],
    /// The current codes.
    codebook: Vec<Color>,
    /// The index of the code each color is assigned to.
    assignments: Vec<usize>,
}

impl<'a> State<'a> {
    /// Starts with the average color as the only code, or `None` if there are no colors.
    fn new(colors: &'a [Color]) -> Option<Self> {
        let average = color::average(colors)?;
        Some(Self {
            colors,
            codebook: vec![average],
            assignments: vec![0; colors.len()],
        })
    }

    /// Appends `code + perturbation` for every code.
    fn double_codebook(&mut self, perturbation: Color) -> Result<(), QuantizeError> {
        let Self { codebook, .. } = self;
        let len = codebook.len();
        codebook
            .try_reserve_exact(len)
            .map_err(|_| QuantizeError::CodebookTooLarge(len))?;

        codebook.extend_from_within(..);
        for code in &mut codebook[len..] {
            *code = color::add(*code, perturbation);
        }

        Ok(())
    }

    /// Assigns every color to its nearest code.
    fn reassign(&mut self) {
        let Self { colors, codebook, assignments } = self;
        for (assignment, &color) in assignments.iter_mut().zip(colors.iter()) {
            *assignment = nearest(codebook, color);
        }
    }

    /// The mean distance between each color and its code, truncated.
    fn distortion(&self) -> u64 {
        let Self { colors, codebook, assignments } = self;
        let total = colors
            .iter()
            .zip(assignments)
            .map(|(&color, &i)| u64::from(color::manhattan_distance(color, codebook[i])))
            .sum::<u64>();

        total / colors.len() as u64
    }

    /// Moves every code to the average of the colors assigned to it.
    fn improve_codes(&mut self) {
        let Self { colors, codebook, assignments } = self;

        let mut sums = vec![ColorSum::default(); codebook.len()];
        for (&color, &i) in colors.iter().zip(assignments.iter()) {
            sums[i].push(color);
        }

        // empty regions keep their previous code
        for (code, sum) in codebook.iter_mut().zip(&sums) {
            if let Some(average) = sum.average() {
                *code = average;
            }
        }
    }

    /// The number of colors assigned to each code.
    fn counts(&self) -> Vec<u32> {
        let mut counts = vec![0; self.codebook.len()];
        for &i in &self.assignments {
            counts[i] += 1;
        }
        counts
    }

    /// Computes the mean squared error and signal to noise ratio of the current assignment.
    #[allow(clippy::cast_precision_loss)]
    fn statistics(&self) -> (f64, f64) {
        let Self { colors, codebook, assignments } = self;

        let (noise, signal) = colors.iter().zip(assignments).fold(
            (0u64, 0u64),
            |(noise, signal), (&color, &i)| {
                let error = u64::from(color::manhattan_distance(codebook[i], color));
                let power = u64::from(color::manhattan_distance(color, BLACK));
                (noise + error * error, signal + power * power)
            },
        );

        let n = colors.len() as f64;
        let mse = noise as f64 / n;
        let snr = if noise == 0 {
            f64::INFINITY
        } else {
            10.0 * ((signal as f64 / n) / mse).log10()
        };

        (mse, snr)
    }
}

/// Quantizes `grid` in place with a codebook of at most `2^codebook_bits` colors,
/// using default [`LbgOptions`] otherwise.
///
/// # Errors
/// See [`quantize_with_perturbation`].
///
/// # Examples
/// ```
/// # use lbgquant::{lbg, PixelGrid};
/// # use palette::Srgb;
/// # fn main() -> Result<(), lbgquant::QuantizeError> {
/// let colors = vec![Srgb::new(0, 0, 0), Srgb::new(10, 10, 10), Srgb::new(0, 0, 30), Srgb::new(2, 2, 2)];
/// let mut grid = PixelGrid::from_colors(2, 2, colors).unwrap();
/// let summary = lbg::quantize(&mut grid, 0)?;
/// assert!(grid.colors().iter().all(|&c| c == Srgb::new(3, 3, 10)));
/// assert_eq!(summary.codebook, vec![Srgb::new(3, 3, 10)]);
/// # Ok(())
/// # }
/// ```
pub fn quantize(grid: &mut PixelGrid, codebook_bits: u8) -> Result<QuantizeSummary, QuantizeError> {
    quantize_with(grid, &LbgOptions::new().codebook_bits(codebook_bits))
}

/// Quantizes `grid` in place according to `options`,
/// drawing perturbations from a [`RandomPerturbation`] seeded with [`LbgOptions::seed`].
///
/// # Errors
/// See [`quantize_with_perturbation`].
pub fn quantize_with(
    grid: &mut PixelGrid,
    options: &LbgOptions,
) -> Result<QuantizeSummary, QuantizeError> {
    let mut perturbation = RandomPerturbation::from_seed(options.seed);
    quantize_with_perturbation(grid, options, &mut perturbation)
}

/// Quantizes `grid` in place according to `options`, drawing one color from `perturbation`
/// for each codebook doubling.
///
/// Every pixel of `grid` is replaced by its code from the final codebook.
///
/// # Errors
/// Returns an error and leaves `grid` untouched if:
/// - `grid` has no pixels ([`QuantizeError::EmptyImage`])
/// - `grid` has more than [`MAX_PIXELS`] pixels ([`QuantizeError::TooManyPixels`])
/// - the number of codebook bits is above [`MAX_CODEBOOK_BITS`]
///   ([`QuantizeError::CodebookBitsOutOfRange`])
/// - the codebook cannot be allocated ([`QuantizeError::CodebookTooLarge`])
/// - the cancellation flag is raised ([`QuantizeError::Cancelled`])
pub fn quantize_with_perturbation(
    grid: &mut PixelGrid,
    options: &LbgOptions,
    perturbation: &mut impl Perturbation,
) -> Result<QuantizeSummary, QuantizeError> {
    if options.codebook_bits > MAX_CODEBOOK_BITS {
        return Err(QuantizeError::CodebookBitsOutOfRange(options.codebook_bits));
    }

    let (width, height) = grid.dimensions();
    let pixels = u64::from(width) * u64::from(height);
    if pixels > u64::from(MAX_PIXELS) {
        return Err(QuantizeError::TooManyPixels(pixels));
    }

    let mut state = State::new(grid.colors()).ok_or(QuantizeError::EmptyImage)?;

    let mut previous = state.distortion();
    let mut doublings = 0;
    let mut iterations = 0;
    let mut converged = true;

    let distortion = loop {
        if options.is_cancelled() {
            return Err(QuantizeError::Cancelled);
        }

        iterations += 1;

        if doublings < options.codebook_bits {
            let perturbation = perturbation.next_perturbation();
            state.double_codebook(perturbation)?;
            doublings += 1;
            debug!(doublings, codebook_len = state.codebook.len(), ?perturbation, "doubled codebook");
        }

        state.reassign();
        let distortion = state.distortion();

        #[allow(clippy::cast_precision_loss)]
        let rate = if distortion == 0 {
            0.0
        } else {
            distortion.abs_diff(previous) as f64 / distortion as f64
        };

        debug!(iterations, distortion, rate, "reassigned pixels");

        if rate < options.max_error {
            break distortion;
        }

        // codes must stay the ones the assignment was made against
        if options.max_iterations.is_some_and(|max| iterations >= max) {
            warn!(iterations, "stopping before convergence: iteration limit reached");
            converged = false;
            break distortion;
        }

        previous = distortion;
        state.improve_codes();
    };

    let (mse, snr) = state.statistics();
    let counts = state.counts();
    let State { codebook, assignments, .. } = state;

    for (color, &i) in grid.colors_mut().iter_mut().zip(&assignments) {
        *color = codebook[i];
    }

    debug!(iterations, doublings, distortion, mse, snr, converged, "quantization finished");

    Ok(QuantizeSummary {
        codebook,
        counts,
        doublings,
        iterations,
        distortion,
        mse,
        snr,
        converged,
    })
}
