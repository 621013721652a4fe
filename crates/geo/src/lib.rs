#![warn(clippy::unwrap_used)]

pub type Error = inf::Error;
pub type Result<T = ()> = inf::Result<T>;

mod arraydatatype;
mod cell;
pub mod constants;
mod coordinate;
mod coordinatetransformer;
pub mod crs;
mod georeference;
mod geotransform;
mod latlonbounds;
mod nodata;
mod rastersize;
pub mod rect;
mod tile;

#[doc(inline)]
pub use arraydatatype::ArrayDataType;
pub use cell::Cell;
pub use coordinate::Coordinate;
pub use coordinatetransformer::CoordinateTransformer;
pub use georeference::CellSize;
#[doc(inline)]
pub use georeference::GeoReference;
pub use geotransform::GeoTransform;
#[doc(inline)]
pub use latlonbounds::LatLonBounds;
#[doc(inline)]
pub use nodata::Nodata;
pub use rastersize::RasterSize;
#[doc(inline)]
pub use rect::Rect;
#[doc(inline)]
pub use tile::Tile;
pub use tile::ZoomLevelStrategy;

pub type Point<T = f64> = geo_types::Point<T>;
