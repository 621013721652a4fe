use std::collections::HashMap;
use std::path::{Path, PathBuf};

use geo::{crs::Epsg, CoordinateTransformer, GeoReference, RasterSize, Rect};

use crate::{Band, Dataset, Driver, Error, Raster, RasterQuery, Result};

/// Dataset backed by a decoded in-memory raster, used for synthetic layers
/// and as a lightweight stand-in for file backed datasets in tests.
pub struct MemoryDataset {
    raster: Raster,
    name: String,
    path: PathBuf,
    closed: bool,
}

impl MemoryDataset {
    pub fn new(raster: Raster, path: &Path, name: &str) -> Result<Self> {
        if !raster.georef().is_valid() {
            return Err(Error::InvalidArgument(format!(
                "Dataset {} has no usable georeferencing: {}",
                name,
                raster.georef()
            )));
        }

        Ok(MemoryDataset {
            raster,
            name: name.to_string(),
            path: path.to_path_buf(),
            closed: false,
        })
    }
}

impl Dataset for MemoryDataset {
    fn name(&self) -> &str {
        &self.name
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn crs(&self) -> Epsg {
        self.raster.georef().epsg().unwrap_or_default()
    }

    fn bounding_box(&self) -> Rect<f64> {
        self.raster.georef().bounding_box()
    }

    fn raster_size(&self) -> RasterSize {
        self.raster.size()
    }

    fn bands(&self) -> &[Band] {
        self.raster.bands()
    }

    fn read(&mut self, query: &RasterQuery) -> Result<Raster> {
        if self.closed {
            return Err(Error::Runtime(format!("Dataset {} is closed", self.name)));
        }

        // bring the query window into the dataset CRS, sampling stays linear
        // within the transformed window
        let window = if query.crs == self.crs() {
            query.bounds
        } else {
            CoordinateTransformer::from_epsg(query.crs, self.crs())?.transform_rect(&query.bounds)?
        };

        let selection = query.band_selection(self.raster.band_count());
        for &band in &selection {
            if band >= self.raster.band_count() {
                return Err(Error::InvalidArgument(format!(
                    "Band index {} out of range, dataset has {} bands",
                    band,
                    self.raster.band_count()
                )));
            }
        }

        let out_georef = GeoReference::with_extent(query.crs, query.bounds, query.size, self.raster.nodata().value());
        let bands: Vec<Band> = selection.iter().map(|&band| self.raster.bands()[band].clone()).collect();
        let mut result = Raster::filled_with_nodata(out_georef, query.dtype, bands, self.raster.nodata())?;

        let cell_width = window.width() / query.size.cols as f64;
        let cell_height = window.height() / query.size.rows as f64;

        for row in 0..query.size.rows {
            let y = window.top_left().y() - (row as f64 + 0.5) * cell_height;
            for col in 0..query.size.cols {
                let x = window.top_left().x() + (col as f64 + 0.5) * cell_width;

                let cell = self.raster.georef().point_to_cell(geo::Point::new(x, y))?;
                if !self.raster.georef().is_cell_on_map(cell) {
                    continue;
                }

                let index = row * query.size.cols + col;
                for (out_band, &src_band) in selection.iter().enumerate() {
                    result.write_sample(out_band, index, self.raster.sample_at(src_band, cell));
                }
            }
        }

        Ok(result)
    }

    fn close(&mut self) {
        self.closed = true;
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}

/// Driver serving rasters that were registered up front under a resource name
#[derive(Default)]
pub struct MemoryDriver {
    datasets: HashMap<PathBuf, (String, Raster)>,
}

impl MemoryDriver {
    pub fn new() -> Self {
        MemoryDriver::default()
    }

    pub fn add_dataset<P: Into<PathBuf>, S: Into<String>>(&mut self, path: P, name: S, raster: Raster) {
        self.datasets.insert(path.into(), (name.into(), raster));
    }
}

impl Driver for MemoryDriver {
    fn name(&self) -> &'static str {
        "memory"
    }

    fn can_open(&self, path: &Path) -> bool {
        self.datasets.contains_key(path)
    }

    fn open(&self, path: &Path) -> Result<Box<dyn Dataset>> {
        let (name, raster) = self
            .datasets
            .get(path)
            .ok_or_else(|| Error::InvalidPath(path.to_path_buf()))?;

        Ok(Box::new(MemoryDataset::new(raster.clone(), path, name)?))
    }
}
