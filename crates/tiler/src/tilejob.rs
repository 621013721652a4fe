use std::path::PathBuf;

use geo::Tile;
use raster::ResampleMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColoringMode {
    #[default]
    Grayscale,
    ColorMap,
}

/// The display settings that influence the pixel content of a rendered tile
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DisplayParams {
    pub coloring: ColoringMode,
    /// Identity of the colormap stylesheet used for `ColoringMode::ColorMap`
    pub style: Option<PathBuf>,
    pub resampling: ResampleMethod,
    pub dpi_ratio: u8,
}

impl Default for DisplayParams {
    fn default() -> Self {
        DisplayParams {
            coloring: ColoringMode::Grayscale,
            style: None,
            resampling: ResampleMethod::NearestNeighbour,
            dpi_ratio: 1,
        }
    }
}

/// A pending tile request. Identity is the tile coordinate plus everything that
/// influences its pixels: the display parameters and the source identity.
/// Equal jobs are deduplicated by the pending queue and the tile cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TileJob {
    pub tile: Tile,
    pub source: PathBuf,
    pub display: DisplayParams,
}

impl TileJob {
    pub fn new<P: Into<PathBuf>>(tile: Tile, source: P, display: DisplayParams) -> Self {
        TileJob {
            tile,
            source: source.into(),
            display,
        }
    }
}

impl std::fmt::Display for TileJob {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.tile, self.source.display())
    }
}
