use geo::RasterSize;
use inf::Color;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum TileFormat {
    #[default]
    Unknown,
    Png,
    RawArgb,
}

impl TileFormat {
    pub fn extension(&self) -> &str {
        match self {
            TileFormat::Png => "png",
            TileFormat::RawArgb | TileFormat::Unknown => "",
        }
    }
}

/// Encoded tile payload
#[derive(Debug, Clone, Default)]
pub struct TileData {
    pub format: TileFormat,
    pub data: Vec<u8>,
}

impl TileData {
    pub fn new(format: TileFormat, data: Vec<u8>) -> TileData {
        TileData { format, data }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// A rendered tile as a pixel buffer
#[derive(Debug, Clone, PartialEq)]
pub struct TileBitmap {
    size: RasterSize,
    pixels: Vec<Color>,
}

impl TileBitmap {
    pub fn new(size: RasterSize, pixels: Vec<Color>) -> Result<Self> {
        if pixels.len() != size.cell_count() {
            return Err(Error::SizeMismatch {
                size1: (size.rows, size.cols),
                size2: (pixels.len(), 1),
            });
        }

        Ok(TileBitmap { size, pixels })
    }

    pub fn from_argb(size: RasterSize, pixels: &[u32]) -> Result<Self> {
        TileBitmap::new(size, pixels.iter().map(|&bits| Color::from_argb(bits)).collect())
    }

    pub fn filled(size: RasterSize, color: Color) -> Self {
        TileBitmap {
            size,
            pixels: vec![color; size.cell_count()],
        }
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn width(&self) -> usize {
        self.size.cols
    }

    pub fn height(&self) -> usize {
        self.size.rows
    }

    pub fn pixels(&self) -> &[Color] {
        &self.pixels
    }

    pub fn pixel(&self, row: usize, col: usize) -> Color {
        self.pixels[row * self.size.cols + col]
    }
}
