use std::path::Path;

use geo::{crs::Epsg, RasterSize, Rect};

use crate::{Band, Raster, RasterQuery, Result};

/// Capability test and factory for a dataset format
pub trait Driver: Send + Sync {
    fn name(&self) -> &'static str;
    /// Whether the driver can open the resource at `path`.
    /// Must not fail, internal probing errors map to `false`.
    fn can_open(&self, path: &Path) -> bool;
    /// Opens the resource, may fail with an I/O error
    fn open(&self, path: &Path) -> Result<Box<dyn Dataset>>;
}

/// An open handle to a geospatial raster resource
pub trait Dataset: Send {
    fn name(&self) -> &str;
    fn description(&self) -> &str {
        ""
    }
    /// Identifies the backing resource
    fn path(&self) -> &Path;
    fn crs(&self) -> Epsg;
    /// World coordinate extent in the dataset CRS
    fn bounding_box(&self) -> Rect<f64>;
    fn raster_size(&self) -> RasterSize;
    fn bands(&self) -> &[Band];
    /// Decodes the pixels covered by the query, honoring its target size and datatype
    fn read(&mut self, query: &RasterQuery) -> Result<Raster>;
    /// Releases the backing handle, reads after close fail
    fn close(&mut self);
    fn is_closed(&self) -> bool;
}

/// Holds the available drivers in deterministic registration order and picks
/// the first (or hinted) one that can open a resource.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: Vec<Box<dyn Driver>>,
}

impl DriverRegistry {
    pub fn new() -> Self {
        DriverRegistry::default()
    }

    /// The registry with the built-in drivers registered
    pub fn with_default_drivers() -> Self {
        let mut registry = DriverRegistry::new();
        registry.register(Box::new(crate::MbtilesDriver));
        registry
    }

    pub fn register(&mut self, driver: Box<dyn Driver>) {
        self.drivers.push(driver);
    }

    pub fn driver(&self, name: &str) -> Option<&dyn Driver> {
        self.drivers.iter().find(|driver| driver.name() == name).map(Box::as_ref)
    }

    pub fn driver_names(&self) -> Vec<&'static str> {
        self.drivers.iter().map(|driver| driver.name()).collect()
    }

    /// Opens a resource with the hinted driver when it applies, otherwise with the
    /// first registered driver that can handle it. `Ok(None)` when no driver matches,
    /// an error only when the chosen driver fails to open the resource.
    pub fn open(&self, path: &Path, hint: Option<&str>) -> Result<Option<Box<dyn Dataset>>> {
        if let Some(hint) = hint {
            match self.driver(hint) {
                Some(driver) if driver.can_open(path) => {
                    log::debug!("Opening {} with hinted driver {}", path.display(), driver.name());
                    return driver.open(path).map(Some);
                }
                _ => log::debug!("Driver hint {} does not apply to {}", hint, path.display()),
            }
        }

        for driver in &self.drivers {
            if driver.can_open(path) {
                log::debug!("Opening {} with driver {}", path.display(), driver.name());
                return driver.open(path).map(Some);
            }
        }

        Ok(None)
    }
}
