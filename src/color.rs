//! Operations on the 3-channel color vectors that the quantizer clusters.
//!
//! Colors are plain [`Srgb<u8>`] values. All arithmetic here is integer arithmetic:
//! addition wraps modulo `256` per channel and averages truncate.

use palette::{cast, Srgb};

/// The color vector type used throughout the crate.
pub type Color = Srgb<u8>;

/// Pure black, the reference point for signal power.
pub const BLACK: Color = Srgb::new(0, 0, 0);

/// Adds two colors channel by channel, wrapping each channel modulo `256`.
///
/// This is intentionally not saturating: adding a perturbation like `246` (`-10` as a byte)
/// to a channel of `5` yields `251`.
///
/// # Examples
/// ```
/// # use lbgquant::color;
/// # use palette::Srgb;
/// let sum = color::add(Srgb::new(250, 5, 0), Srgb::new(10, 251, 7));
/// assert_eq!(sum, Srgb::new(4, 0, 7));
/// ```
#[must_use]
#[inline]
pub fn add(a: Color, b: Color) -> Color {
    let a = cast::into_array(a);
    let b = cast::into_array(b);
    cast::from_array([
        a[0].wrapping_add(b[0]),
        a[1].wrapping_add(b[1]),
        a[2].wrapping_add(b[2]),
    ])
}

/// Manhattan (taxicab) distance between two colors.
#[must_use]
#[inline]
pub fn manhattan_distance(a: Color, b: Color) -> u32 {
    let a = cast::into_array(a);
    let b = cast::into_array(b);
    (0..3).map(|c| u32::from(a[c].abs_diff(b[c]))).sum()
}

/// Returns the channel-wise average of `colors` using truncating integer division,
/// or `None` if `colors` is empty.
#[must_use]
pub fn average<'a>(colors: impl IntoIterator<Item = &'a Color>) -> Option<Color> {
    let mut sum = ColorSum::default();
    for &color in colors {
        sum.push(color);
    }
    sum.average()
}

/// A running per-channel sum of colors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ColorSum {
    /// The sum of each channel.
    components: [u64; 3],
    /// The number of colors summed.
    count: u64,
}

impl ColorSum {
    /// Adds a color to the sum.
    #[inline]
    pub(crate) fn push(&mut self, color: Color) {
        for (sum, c) in self.components.iter_mut().zip(cast::into_array(color)) {
            *sum += u64::from(c);
        }
        self.count += 1;
    }

    /// The truncated average of the summed colors, or `None` if nothing was summed.
    pub(crate) fn average(&self) -> Option<Color> {
        if self.count == 0 {
            None
        } else {
            #[allow(clippy::cast_possible_truncation)]
            let average = self.components.map(|sum| (sum / self.count) as u8);
            Some(cast::from_array(average))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::*;
    use rand::{seq::SliceRandom, SeedableRng};
    use rand_xoshiro::Xoroshiro128PlusPlus;

    #[test]
    fn add_wraps_each_channel() {
        assert_eq!(add(Srgb::new(250, 5, 0), Srgb::new(10, 251, 0)), Srgb::new(4, 0, 0));
        assert_eq!(add(Srgb::new(255, 255, 255), Srgb::new(1, 1, 1)), BLACK);

        #[allow(clippy::cast_sign_loss)]
        let minus_ten = -10i8 as u8;
        assert_eq!(
            add(Srgb::new(5, 100, 10), Srgb::new(minus_ten, minus_ten, minus_ten)),
            Srgb::new(251, 90, 0)
        );
    }

    #[test]
    fn distance_is_symmetric() {
        let colors = test_data_256();
        for &a in &colors {
            for &b in &colors[..16] {
                assert_eq!(manhattan_distance(a, b), manhattan_distance(b, a));
            }
            assert_eq!(manhattan_distance(a, a), 0);
        }

        assert_eq!(manhattan_distance(BLACK, Srgb::new(255, 255, 255)), 765);
        assert_eq!(manhattan_distance(Srgb::new(10, 20, 30), Srgb::new(20, 10, 33)), 23);
    }

    #[test]
    fn average_truncates() {
        let colors = [Srgb::new(0, 0, 0), Srgb::new(1, 1, 3)];
        assert_eq!(average(&colors), Some(Srgb::new(0, 0, 1)));

        let colors = [Srgb::new(255, 255, 255); 7];
        assert_eq!(average(&colors), Some(Srgb::new(255, 255, 255)));
    }

    #[test]
    fn average_of_nothing() {
        assert_eq!(average(&[] as &[Color]), None);
        assert_eq!(ColorSum::default().average(), None);
    }

    #[test]
    fn average_is_order_invariant() {
        let mut colors = test_data_1024();
        let expected = average(&colors);

        let rng = &mut Xoroshiro128PlusPlus::seed_from_u64(7);
        for _ in 0..4 {
            colors.shuffle(rng);
            assert_eq!(average(&colors), expected);
        }
    }
}
