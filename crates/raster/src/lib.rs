#![warn(clippy::unwrap_used)]

mod band;
mod colorize;
mod dataset;
mod mbtilesdriver;
mod memorydriver;
mod ops;
mod query;
mod raster;
mod reproject;
pub mod resample;

pub use band::Band;
pub use band::ColorInterpretation;
pub use colorize::ColorMapOp;
pub use colorize::GrayscaleOp;
pub use dataset::Dataset;
pub use dataset::Driver;
pub use dataset::DriverRegistry;
pub use mbtilesdriver::MbtilesDriver;
pub use memorydriver::MemoryDataset;
pub use memorydriver::MemoryDriver;
pub use ops::operations;
pub use ops::params;
pub use ops::Hints;
pub use ops::ParamValue;
pub use ops::Params;
pub use ops::Priority;
pub use ops::RasterOp;
pub use ops::RasterOpRegistry;
pub use query::RasterQuery;
pub use raster::Raster;
pub use reproject::ReprojectOp;
pub use resample::ResampleMethod;
pub use resample::ResampleOp;

pub type Error = inf::Error;
pub type Result<T = ()> = inf::Result<T>;
