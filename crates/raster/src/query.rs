use geo::{crs::Epsg, ArrayDataType, RasterSize, Rect};

/// The read contract for a dataset: which world window to decode, in which
/// coordinate reference system, which bands, and the target pixel grid and
/// packed datatype of the result.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterQuery {
    pub bounds: Rect<f64>,
    pub crs: Epsg,
    /// Band indexes to read, empty means all bands
    pub bands: Vec<usize>,
    pub size: RasterSize,
    pub dtype: ArrayDataType,
}

impl RasterQuery {
    pub fn new(bounds: Rect<f64>, crs: Epsg, size: RasterSize, dtype: ArrayDataType) -> Self {
        RasterQuery {
            bounds,
            crs,
            bands: Vec::new(),
            size,
            dtype,
        }
    }

    pub fn with_bands(mut self, bands: Vec<usize>) -> Self {
        self.bands = bands;
        self
    }

    /// The band indexes to read given the available band count
    pub fn band_selection(&self, available: usize) -> Vec<usize> {
        if self.bands.is_empty() {
            (0..available).collect()
        } else {
            self.bands.clone()
        }
    }
}
