//! Geospatial raster tile rendering engine.
//!
//! - `geo`: coordinate systems, tile math and georeferencing primitives
//! - `inf`: shared infrastructure (errors, colors, colormaps, progress)
//! - `sqlite`: lightweight sqlite access used by the MBTiles driver
//! - `raster`: the raster data model, driver and operation registries and the
//!   pixel processing operations (resampling, reprojection, coloring)
//! - `tiler`: the asynchronous tile rendering pipeline

pub use geo;
pub use inf;
pub use raster;
pub use sqlite;
pub use tiler;
