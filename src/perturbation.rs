//! Sources of the small color offsets used to split codebook entries.
//!
//! Each time the codebook doubles, exactly one perturbation color is drawn and added
//! (with wrapping arithmetic) to every existing code to create its sibling.
//! The source is a trait so that callers can make runs reproducible or fully deterministic.

use crate::color::Color;
use palette::cast;
use rand::{prelude::Distribution, Rng, SeedableRng};
use rand_distr::Uniform;
use rand_xoshiro::Xoroshiro128PlusPlus;
use std::ops::RangeInclusive;

/// The signed range each perturbation channel is drawn from.
pub const PERTURBATION_RANGE: RangeInclusive<i8> = -10..=10;

/// A source of perturbation colors.
pub trait Perturbation {
    /// Returns the perturbation for the next codebook doubling.
    fn next_perturbation(&mut self) -> Color;
}

impl<F: FnMut() -> Color> Perturbation for F {
    fn next_perturbation(&mut self) -> Color {
        self()
    }
}

/// Draws each channel uniformly from [`PERTURBATION_RANGE`].
///
/// Negative values are reinterpreted as their two's complement byte,
/// so `-10` becomes `246` and subtracts `10` once added with wrapping.
///
/// # Examples
/// ```
/// # use lbgquant::{Perturbation, RandomPerturbation};
/// let mut a = RandomPerturbation::from_seed(42);
/// let mut b = RandomPerturbation::from_seed(42);
/// assert_eq!(a.next_perturbation(), b.next_perturbation());
/// ```
#[derive(Debug, Clone)]
pub struct RandomPerturbation<R> {
    /// The random number generator.
    rng: R,
    /// The per-channel distribution.
    distribution: Uniform<i8>,
}

impl<R: Rng> RandomPerturbation<R> {
    /// Creates a new [`RandomPerturbation`] that draws from the given generator.
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            distribution: Uniform::from(PERTURBATION_RANGE),
        }
    }
}

impl RandomPerturbation<Xoroshiro128PlusPlus> {
    /// Creates a new [`RandomPerturbation`] backed by a generator seeded with `seed`.
    #[must_use]
    pub fn from_seed(seed: u64) -> Self {
        Self::new(Xoroshiro128PlusPlus::seed_from_u64(seed))
    }
}

impl<R: Rng> Perturbation for RandomPerturbation<R> {
    fn next_perturbation(&mut self) -> Color {
        let Self { rng, distribution } = self;
        #[allow(clippy::cast_sign_loss)]
        let channels = [(); 3].map(|()| distribution.sample(&mut *rng) as u8);
        cast::from_array(channels)
    }
}

/// Always returns the same perturbation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedPerturbation(pub Color);

impl Perturbation for FixedPerturbation {
    fn next_perturbation(&mut self) -> Color {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palette::Srgb;

    #[test]
    fn channels_in_range() {
        let mut perturbation = RandomPerturbation::from_seed(0);
        let mut seen_negative = false;
        let mut seen_positive = false;

        for _ in 0..1000 {
            for c in cast::into_array(perturbation.next_perturbation()) {
                #[allow(clippy::cast_possible_wrap)]
                let c = c as i8;
                assert!(PERTURBATION_RANGE.contains(&c));
                seen_negative |= c < 0;
                seen_positive |= c > 0;
            }
        }

        assert!(seen_negative && seen_positive);
    }

    #[test]
    fn same_seed_same_sequence() {
        let mut a = RandomPerturbation::from_seed(1234);
        let mut b = RandomPerturbation::from_seed(1234);
        let a = (0..64).map(|_| a.next_perturbation()).collect::<Vec<_>>();
        let b = (0..64).map(|_| b.next_perturbation()).collect::<Vec<_>>();
        assert_eq!(a, b);
    }

    #[test]
    fn closures_and_fixed() {
        let mut fixed = FixedPerturbation(Srgb::new(1, 2, 3));
        assert_eq!(fixed.next_perturbation(), Srgb::new(1, 2, 3));

        let colors: [Color; 2] = [Srgb::new(10, 0, 0), Srgb::new(0, 10, 0)];
        let mut sequence = colors.into_iter().cycle();
        let mut next = || sequence.next().unwrap_or_default();
        assert_eq!(next.next_perturbation(), Srgb::new(10, 0, 0));
        assert_eq!(next.next_perturbation(), Srgb::new(0, 10, 0));
        assert_eq!(next.next_perturbation(), Srgb::new(10, 0, 0));
    }
}
