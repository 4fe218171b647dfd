//! The decoded image as a dense grid of pixels.

use crate::{color::Color, MAX_PIXELS};
use std::slice::ChunksExact;
#[cfg(feature = "image")]
use {
    image::RgbImage,
    palette::cast::{ComponentsAs, IntoComponents},
};

/// A single pixel: its fixed `(row, column)` coordinate and its color.
///
/// Row `0` is the top row of the image as laid out in memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pixel {
    /// The 0-indexed row, counted from the top.
    pub row: u32,
    /// The 0-indexed column, counted from the left.
    pub column: u32,
    /// The color of the pixel.
    pub color: Color,
}

/// A `height` × `width` image stored as a row-major slice of colors.
///
/// The grid is owned by the caller. Quantization borrows it mutably and rewrites colors in
/// place, so its dimensions never change after construction.
///
/// # Examples
/// ```
/// # use lbgquant::PixelGrid;
/// # use palette::Srgb;
/// let mut grid = PixelGrid::filled(3, 2, Srgb::new(0, 0, 0));
/// grid.set(1, 2, Srgb::new(255, 0, 0));
/// assert_eq!(grid.get(1, 2), Some(Srgb::new(255, 0, 0)));
/// assert_eq!(grid.num_pixels(), 6);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelGrid {
    /// The number of columns.
    width: u32,
    /// The number of rows.
    height: u32,
    /// The colors, `width * height` of them, row 0 first.
    colors: Vec<Color>,
}

impl PixelGrid {
    /// Creates a grid from row-major `colors`.
    /// Returns `None` if the length of `colors` is not equal to `width * height`
    /// or if `width * height` is greater than [`MAX_PIXELS`].
    #[must_use]
    pub fn from_colors(width: u32, height: u32, colors: Vec<Color>) -> Option<Self> {
        let pixels = u64::from(width) * u64::from(height);
        if pixels <= u64::from(MAX_PIXELS) && colors.len() as u64 == pixels {
            Some(Self { width, height, colors })
        } else {
            None
        }
    }

    /// Creates a grid without ensuring that `colors` has `width * height` entries.
    pub(crate) const fn new_unchecked(width: u32, height: u32, colors: Vec<Color>) -> Self {
        Self { width, height, colors }
    }

    /// Creates a grid where every pixel has the same color.
    #[must_use]
    pub fn filled(width: u32, height: u32, color: Color) -> Self {
        Self {
            width,
            height,
            colors: vec![color; width as usize * height as usize],
        }
    }

    /// The number of columns.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// The number of rows.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// `(width, height)`
    #[must_use]
    pub const fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// The total number of pixels.
    #[must_use]
    pub fn num_pixels(&self) -> usize {
        self.colors.len()
    }

    /// Whether the grid has no pixels at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Maps a coordinate to an index into the color slice.
    fn index(&self, row: u32, column: u32) -> Option<usize> {
        if row < self.height && column < self.width {
            Some(row as usize * self.width as usize + column as usize)
        } else {
            None
        }
    }

    /// Gets the color at `(row, column)`, or `None` if it is out of bounds.
    #[must_use]
    pub fn get(&self, row: u32, column: u32) -> Option<Color> {
        self.index(row, column).map(|i| self.colors[i])
    }

    /// Gets a mutable reference to the color at `(row, column)`.
    pub fn get_mut(&mut self, row: u32, column: u32) -> Option<&mut Color> {
        self.index(row, column).map(|i| &mut self.colors[i])
    }

    /// Sets the color at `(row, column)`. Returns `false` if the coordinate is out of bounds.
    pub fn set(&mut self, row: u32, column: u32, color: Color) -> bool {
        if let Some(pixel) = self.get_mut(row, column) {
            *pixel = color;
            true
        } else {
            false
        }
    }

    /// All colors in row-major order.
    #[must_use]
    pub fn colors(&self) -> &[Color] {
        &self.colors
    }

    /// All colors in row-major order, mutably.
    pub fn colors_mut(&mut self) -> &mut [Color] {
        &mut self.colors
    }

    /// Consumes the grid and returns its row-major colors.
    #[must_use]
    pub fn into_colors(self) -> Vec<Color> {
        self.colors
    }

    /// Iterates over the rows from top to bottom.
    ///
    /// A grid with a width of `0` yields no rows.
    pub fn rows(&self) -> ChunksExact<'_, Color> {
        self.colors.chunks_exact(self.width.max(1) as usize)
    }

    /// Iterates over every pixel with its coordinate, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = Pixel> + '_ {
        (0..self.height).flat_map(move |row| {
            (0..self.width).map(move |column| Pixel {
                row,
                column,
                color: self.colors[row as usize * self.width as usize + column as usize],
            })
        })
    }
}

#[cfg(feature = "image")]
impl From<&RgbImage> for PixelGrid {
    fn from(image: &RgbImage) -> Self {
        let (width, height) = image.dimensions();
        let pixels = width as usize * height as usize;
        let colors: &[Color] = image.as_raw()[..(pixels * 3)].components_as();
        Self::new_unchecked(width, height, colors.to_vec())
    }
}

#[cfg(feature = "image")]
impl From<&PixelGrid> for RgbImage {
    fn from(grid: &PixelGrid) -> Self {
        let buf = grid.colors.clone().into_components();

        #[allow(clippy::unwrap_used)]
        {
            // the grid holds exactly width * height colors,
            // so buf is large enough by nature of its construction
            RgbImage::from_vec(grid.width, grid.height, buf).unwrap()
        }
    }
}
