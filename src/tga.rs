//! Reading and writing uncompressed 24-bit truecolor TGA images.
//!
//! Only the fields needed to locate the pixels are interpreted. Everything else, the image ID
//! and every byte after the pixel data (extension area, developer area, footer), is kept
//! as opaque bytes and written back verbatim, so decoding and then encoding an unchanged grid
//! reproduces the input exactly.

use crate::{PixelGrid, TgaError};
use palette::Srgb;
use std::io::{self, ErrorKind, Read, Write};

/// The length of the fixed TGA header in bytes.
pub const HEADER_LEN: usize = 18;

/// The image type of uncompressed truecolor images.
const TRUECOLOR: u8 = 2;

/// The only supported number of bits per pixel.
const PIXEL_DEPTH: u8 = 24;

/// The image descriptor bit that marks rows as stored from the top down.
const TOP_LEFT_ORIGIN: u8 = 0x20;

/// A codec between raw bytes and a [`PixelGrid`].
///
/// A codec may capture metadata while decoding so that encoding the same logical image
/// afterwards preserves it.
pub trait RasterCodec {
    /// The error type.
    type Error;

    /// Decodes an image, remembering any metadata needed to encode it again.
    ///
    /// # Errors
    /// If `bytes` is not a supported image.
    fn decode(&mut self, bytes: &[u8]) -> Result<PixelGrid, Self::Error>;

    /// Encodes `grid` with the metadata captured by the last [`decode`](Self::decode).
    ///
    /// # Errors
    /// If `grid` cannot be represented.
    fn encode(&self, grid: &PixelGrid) -> Result<Vec<u8>, Self::Error>;
}

/// The raw TGA header, including the trailing image ID field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TgaHeader(Vec<u8>);

impl TgaHeader {
    /// Creates a minimal header for a bottom-left origin image without an image ID.
    ///
    /// # Errors
    /// If either dimension does not fit in a `u16`.
    pub fn for_dimensions(width: u32, height: u32) -> Result<Self, TgaError> {
        let too_large = || TgaError::TooLarge { width, height };
        let w = u16::try_from(width).map_err(|_| too_large())?;
        let h = u16::try_from(height).map_err(|_| too_large())?;

        let mut header = vec![0; HEADER_LEN];
        header[2] = TRUECOLOR;
        header[12..14].copy_from_slice(&w.to_le_bytes());
        header[14..16].copy_from_slice(&h.to_le_bytes());
        header[16] = PIXEL_DEPTH;
        Ok(Self(header))
    }

    /// Reads and validates a header and its image ID field.
    fn read(reader: &mut impl Read) -> Result<Self, TgaError> {
        let mut header = vec![0; HEADER_LEN];
        reader.read_exact(&mut header)?;

        let header = Self(header);
        if header.image_type() != TRUECOLOR
            || header.pixel_depth() != PIXEL_DEPTH
            || header.colormap_length() != 0
        {
            return Err(TgaError::Unsupported {
                image_type: header.image_type(),
                pixel_depth: header.pixel_depth(),
                colormap_length: header.colormap_length(),
            });
        }

        let Self(mut bytes) = header;
        let id_length = usize::from(bytes[0]);
        bytes.resize(HEADER_LEN + id_length, 0);
        reader.read_exact(&mut bytes[HEADER_LEN..])?;

        Ok(Self(bytes))
    }

    /// Reads a little-endian `u16` field.
    fn u16_at(&self, offset: usize) -> u16 {
        u16::from_le_bytes([self.0[offset], self.0[offset + 1]])
    }

    /// The image type field.
    #[must_use]
    pub fn image_type(&self) -> u8 {
        self.0[2]
    }

    /// The number of color map entries.
    #[must_use]
    pub fn colormap_length(&self) -> u16 {
        self.u16_at(5)
    }

    /// The width in pixels.
    #[must_use]
    pub fn width(&self) -> u16 {
        self.u16_at(12)
    }

    /// The height in pixels.
    #[must_use]
    pub fn height(&self) -> u16 {
        self.u16_at(14)
    }

    /// The number of bits per pixel.
    #[must_use]
    pub fn pixel_depth(&self) -> u8 {
        self.0[16]
    }

    /// Whether rows are stored from the top down instead of the bottom up.
    #[must_use]
    pub fn top_left_origin(&self) -> bool {
        self.0[17] & TOP_LEFT_ORIGIN != 0
    }

    /// The image ID field.
    #[must_use]
    pub fn image_id(&self) -> &[u8] {
        &self.0[HEADER_LEN..]
    }

    /// The raw header bytes, including the image ID.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

/// A TGA codec that passes the header and trailing bytes of the last decoded image through.
///
/// # Examples
/// ```
/// # use lbgquant::{PixelGrid, RasterCodec, Tga};
/// # use palette::Srgb;
/// # fn main() -> Result<(), lbgquant::TgaError> {
/// let grid = PixelGrid::filled(2, 2, Srgb::new(1, 2, 3));
/// let bytes = Tga::new().encode(&grid)?;
///
/// let mut tga = Tga::new();
/// assert_eq!(tga.decode(&bytes)?, grid);
/// assert_eq!(tga.encode(&grid)?, bytes);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct Tga {
    /// The header of the last decoded image.
    header: Option<TgaHeader>,
    /// The bytes after the pixel data of the last decoded image.
    trailer: Vec<u8>,
}

impl Tga {
    /// Creates a codec with no captured metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The header captured by the last decode, if any.
    #[must_use]
    pub fn header(&self) -> Option<&TgaHeader> {
        self.header.as_ref()
    }

    /// The bytes that followed the pixel data in the last decoded image.
    #[must_use]
    pub fn trailer(&self) -> &[u8] {
        &self.trailer
    }

    /// Reads an image from `reader`, capturing its header and trailing bytes.
    ///
    /// # Errors
    /// Returns [`TgaError::Unsupported`] for anything other than uncompressed 24-bit truecolor,
    /// and [`TgaError::Io`] if the reader fails or ends before the pixel data does.
    pub fn read(&mut self, mut reader: impl Read) -> Result<PixelGrid, TgaError> {
        let header = TgaHeader::read(&mut reader)?;
        let width = usize::from(header.width());
        let height = usize::from(header.height());

        // grow with the input instead of trusting the declared size up front
        let len = width * height * 3;
        let mut data = Vec::new();
        reader.by_ref().take(len as u64).read_to_end(&mut data)?;
        if data.len() < len {
            return Err(io::Error::from(ErrorKind::UnexpectedEof).into());
        }

        let mut trailer = Vec::new();
        reader.read_to_end(&mut trailer)?;

        let mut colors = vec![Srgb::new(0, 0, 0); width * height];
        if width > 0 {
            for (i, row) in data.chunks_exact(width * 3).enumerate() {
                let row_index = if header.top_left_origin() { i } else { height - 1 - i };
                let dest = &mut colors[(row_index * width)..((row_index + 1) * width)];
                for (color, bgr) in dest.iter_mut().zip(row.chunks_exact(3)) {
                    *color = Srgb::new(bgr[2], bgr[1], bgr[0]);
                }
            }
        }

        let grid = PixelGrid::new_unchecked(header.width().into(), header.height().into(), colors);

        self.header = Some(header);
        self.trailer = trailer;

        Ok(grid)
    }

    /// Writes `grid` to `writer` using the captured header and trailing bytes.
    ///
    /// Without a prior [`read`](Self::read), a minimal header and no trailing bytes are written.
    ///
    /// # Errors
    /// Returns [`TgaError::DimensionMismatch`] if `grid` does not have the dimensions of the
    /// captured header, [`TgaError::TooLarge`] if it cannot be described by a TGA header,
    /// and [`TgaError::Io`] if the writer fails.
    pub fn write(&self, mut writer: impl Write, grid: &PixelGrid) -> Result<(), TgaError> {
        let (width, height) = grid.dimensions();

        let synthesized;
        let header = if let Some(header) = &self.header {
            let expected = (u32::from(header.width()), u32::from(header.height()));
            if expected != (width, height) {
                return Err(TgaError::DimensionMismatch {
                    expected_width: expected.0,
                    expected_height: expected.1,
                    width,
                    height,
                });
            }
            header
        } else {
            synthesized = TgaHeader::for_dimensions(width, height)?;
            &synthesized
        };

        writer.write_all(header.as_bytes())?;

        let mut row_bytes = Vec::with_capacity(width as usize * 3);
        let mut write_row = |row: &[Srgb<u8>]| {
            row_bytes.clear();
            row_bytes.extend(row.iter().flat_map(|c| [c.blue, c.green, c.red]));
            writer.write_all(&row_bytes)
        };

        if header.top_left_origin() {
            grid.rows().try_for_each(&mut write_row)?;
        } else {
            grid.rows().rev().try_for_each(&mut write_row)?;
        }

        writer.write_all(&self.trailer)?;
        Ok(())
    }
}

impl RasterCodec for Tga {
    type Error = TgaError;

    fn decode(&mut self, bytes: &[u8]) -> Result<PixelGrid, Self::Error> {
        self.read(bytes)
    }

    fn encode(&self, grid: &PixelGrid) -> Result<Vec<u8>, Self::Error> {
        let mut bytes = Vec::with_capacity(
            self.header.as_ref().map_or(HEADER_LEN, |h| h.as_bytes().len())
                + grid.num_pixels() * 3
                + self.trailer.len(),
        );
        self.write(&mut bytes, grid)?;
        Ok(bytes)
    }
}
