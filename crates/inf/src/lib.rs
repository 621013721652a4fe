#![warn(clippy::unwrap_used)]

pub use error::Error;
pub type Result<T = ()> = std::result::Result<T, Error>;

pub mod cast;
pub mod color;
pub mod colormap;
mod error;
pub mod grayscale;
pub mod progress;

#[doc(inline)]
pub use color::Color;
#[doc(inline)]
pub use colormap::ColorMap;
#[doc(inline)]
pub use colormap::ColorMapEntry;
pub use progress::ProgressListener;
