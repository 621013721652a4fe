use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use geo::{crs, CoordinateTransformer, RasterSize, Tile};
use inf::ColorMap;
use raster::{operations, params, Dataset, DriverRegistry, Hints, ParamValue, Params, RasterOpRegistry, RasterQuery};

use crate::{ColoringMode, Error, Result, TileBitmap, TileJob};

/// Produces tile bitmaps for the rendering pipeline.
/// `start`/`stop` drive the underlying resources, independent of the worker
/// thread that invokes `execute_job`.
pub trait Renderer: Send {
    /// Produces the pixels for a job, `None` when there is nothing to render
    fn execute_job(&mut self, job: &TileJob) -> Result<Option<TileBitmap>>;
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self);
    fn is_working(&self) -> bool;
    fn file_path(&self) -> &Path;
    fn destroy(&mut self);
}

/// Renderer that reads from a driver backed dataset and processes the pixels
/// through the operation registry: reprojection when the dataset lives in a
/// different CRS, colormap or grayscale coloring, resampling for high dpi.
pub struct DatasetRenderer {
    drivers: Arc<DriverRegistry>,
    ops: Arc<RasterOpRegistry>,
    path: PathBuf,
    driver_hint: Option<String>,
    dataset: Option<Box<dyn Dataset>>,
    styles: HashMap<PathBuf, ColorMap>,
    working: bool,
}

impl DatasetRenderer {
    pub fn new<P: Into<PathBuf>>(drivers: Arc<DriverRegistry>, ops: Arc<RasterOpRegistry>, path: P) -> Self {
        DatasetRenderer {
            drivers,
            ops,
            path: path.into(),
            driver_hint: None,
            dataset: None,
            styles: HashMap::new(),
            working: false,
        }
    }

    pub fn with_driver_hint<S: Into<String>>(mut self, hint: S) -> Self {
        self.driver_hint = Some(hint.into());
        self
    }

    fn colormap_for_style(&mut self, style: &Path) -> Result<ColorMap> {
        if let Some(cmap) = self.styles.get(style) {
            return Ok(cmap.clone());
        }

        let doc = std::fs::read_to_string(style)?;
        let cmap = ColorMap::from_stylesheet(&doc)?;
        self.styles.insert(style.to_path_buf(), cmap.clone());
        Ok(cmap)
    }

    fn render_tile(&mut self, job: &TileJob) -> Result<Option<TileBitmap>> {
        let coloring_params = match (&job.display.coloring, &job.display.style) {
            (ColoringMode::ColorMap, Some(style)) => {
                let cmap = self.colormap_for_style(style)?;
                Params::new().set(params::COLOR_MAP, ParamValue::ColorMap(cmap))
            }
            // without a stylesheet the colormap must come from the band descriptor
            _ => Params::new(),
        };

        let dataset = self
            .dataset
            .as_mut()
            .ok_or_else(|| Error::Runtime("Renderer is not started".to_string()))?;

        let bands = dataset.bands();
        if bands.is_empty() {
            return Err(Error::Runtime(format!("Dataset {} has no bands", dataset.name())));
        }
        let dtype = bands[0].dtype();

        let tile_bounds = job.tile.web_mercator_bounds();
        let dataset_crs = dataset.crs();

        // the dataset read happens in its own CRS, the reprojection onto the
        // web mercator tile grid is a raster operation
        let read_bounds = if dataset_crs == crs::epsg::WGS84_WEB_MERCATOR {
            tile_bounds
        } else {
            CoordinateTransformer::from_epsg(crs::epsg::WGS84_WEB_MERCATOR, dataset_crs)?.transform_rect(&tile_bounds)?
        };

        if !read_bounds.intersects(&dataset.bounding_box()) {
            return Ok(None);
        }

        let base_size = RasterSize::square(Tile::TILE_SIZE as usize);
        let query = RasterQuery::new(read_bounds, dataset_crs, base_size, dtype).with_bands(vec![0]);
        let mut raster = dataset.read(&query)?;

        if dataset_crs != crs::epsg::WGS84_WEB_MERCATOR {
            let reproject_params = Params::new()
                .set(params::TARGET_CRS, ParamValue::Crs(crs::epsg::WGS84_WEB_MERCATOR))
                .set(params::TARGET_BOUNDS, ParamValue::Bounds(tile_bounds));
            self.ops
                .execute(&mut raster, operations::REPROJECT, &reproject_params, &Hints::new(), None)?;
        }

        let coloring_op = match job.display.coloring {
            ColoringMode::ColorMap => operations::COLOR_MAP,
            ColoringMode::Grayscale => operations::GRAYSCALE,
        };
        self.ops.execute(&mut raster, coloring_op, &coloring_params, &Hints::new(), None)?;

        let target_size = RasterSize::square(Tile::TILE_SIZE as usize * job.display.dpi_ratio.max(1) as usize);
        if raster.size() != target_size {
            let resample_params = Params::new()
                .set(params::TARGET_SIZE, ParamValue::Size(target_size))
                .set(params::METHOD, ParamValue::Method(job.display.resampling));
            self.ops
                .execute(&mut raster, operations::RESAMPLE, &resample_params, &Hints::new(), None)?;
        }

        Ok(Some(TileBitmap::from_argb(target_size, &raster.argb_pixels()?)?))
    }
}

impl Renderer for DatasetRenderer {
    fn execute_job(&mut self, job: &TileJob) -> Result<Option<TileBitmap>> {
        self.working = true;
        let result = self.render_tile(job);
        self.working = false;
        result
    }

    fn start(&mut self) -> Result<()> {
        if self.dataset.is_some() {
            return Ok(());
        }

        match self.drivers.open(&self.path, self.driver_hint.as_deref())? {
            Some(dataset) => {
                log::info!("[RENDER] Opened {} ({})", dataset.name(), self.path.display());
                self.dataset = Some(dataset);
                Ok(())
            }
            None => Err(Error::Runtime(format!("No driver available for {}", self.path.display()))),
        }
    }

    fn stop(&mut self) {
        if let Some(mut dataset) = self.dataset.take() {
            dataset.close();
            log::info!("[RENDER] Closed {}", self.path.display());
        }
    }

    fn is_working(&self) -> bool {
        self.working
    }

    fn file_path(&self) -> &Path {
        &self.path
    }

    fn destroy(&mut self) {
        self.stop();
        self.styles.clear();
    }
}
