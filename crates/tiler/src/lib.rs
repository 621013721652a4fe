#![warn(clippy::unwrap_used)]

mod events;
mod imageprocessing;
mod jobqueue;
mod layer;
mod renderer;
#[cfg(feature = "serde")]
mod sessionstate;
mod tilecache;
mod tiledata;
mod tilejob;
mod worker;

pub use events::LogRenderEvents;
pub use events::RenderEvents;
pub use imageprocessing::bitmap_to_png;
pub use imageprocessing::encode_png;
pub use jobqueue::JobQueue;
pub use layer::RasterLayer;
pub use renderer::DatasetRenderer;
pub use renderer::Renderer;
#[cfg(feature = "serde")]
pub use sessionstate::SessionState;
pub use tilecache::TileCache;
pub use tiledata::TileBitmap;
pub use tiledata::TileData;
pub use tiledata::TileFormat;
pub use tilejob::ColoringMode;
pub use tilejob::DisplayParams;
pub use tilejob::TileJob;
pub use worker::TileWorker;

pub type Error = inf::Error;
pub type Result<T = ()> = inf::Result<T>;
