use crate::{crs::Epsg, Cell, GeoTransform, Point, RasterSize, Rect, Result};

/// Pixel size in world units, the y size is negative for north-up rasters
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CellSize {
    x: f64,
    y: f64,
}

impl CellSize {
    pub const fn new(x: f64, y: f64) -> Self {
        CellSize { x, y }
    }

    pub const fn square(size: f64) -> Self {
        CellSize::new(size, -size)
    }

    pub fn is_valid(&self) -> bool {
        self.x != 0.0 && self.y != 0.0 && self.x.is_finite() && self.y.is_finite()
    }

    pub fn x(&self) -> f64 {
        self.x
    }

    pub fn y(&self) -> f64 {
        self.y
    }
}

/// Georeferencing metadata of a raster: the coordinate reference system,
/// the pixel grid size and the affine raster-to-world transformation.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct GeoReference {
    epsg: Option<Epsg>,
    size: RasterSize,
    geo_transform: GeoTransform,
    nodata: Option<f64>,
}

impl GeoReference {
    pub fn new(epsg: Epsg, size: RasterSize, geo_transform: GeoTransform, nodata: Option<f64>) -> Self {
        GeoReference {
            epsg: Some(epsg),
            size,
            geo_transform,
            nodata,
        }
    }

    pub fn with_top_left(epsg: Epsg, size: RasterSize, top_left: Point, cell_size: CellSize, nodata: Option<f64>) -> Self {
        GeoReference {
            epsg: Some(epsg),
            size,
            geo_transform: GeoTransform::from_top_left_and_cell_size(top_left, cell_size),
            nodata,
        }
    }

    /// Builds the georeference covering `bounds` with a `size` pixel grid
    pub fn with_extent(epsg: Epsg, bounds: Rect<f64>, size: RasterSize, nodata: Option<f64>) -> Self {
        let cell_size = CellSize::new(
            bounds.width() / size.cols.max(1) as f64,
            -bounds.height() / size.rows.max(1) as f64,
        );

        Self::with_top_left(epsg, size, bounds.top_left(), cell_size, nodata)
    }

    pub fn without_spatial_reference(size: RasterSize, nodata: Option<f64>) -> Self {
        GeoReference {
            size,
            nodata,
            ..Default::default()
        }
    }

    pub fn epsg(&self) -> Option<Epsg> {
        self.epsg
    }

    pub fn size(&self) -> RasterSize {
        self.size
    }

    pub fn set_size(&mut self, size: RasterSize) {
        self.size = size;
    }

    pub fn nodata(&self) -> Option<f64> {
        self.nodata
    }

    pub fn set_nodata(&mut self, nodata: Option<f64>) {
        self.nodata = nodata;
    }

    pub fn geo_transform(&self) -> GeoTransform {
        self.geo_transform
    }

    pub fn cell_size(&self) -> CellSize {
        CellSize::new(self.geo_transform.cell_size_x(), self.geo_transform.cell_size_y())
    }

    pub fn top_left(&self) -> Point {
        self.geo_transform.top_left()
    }

    pub fn bottom_right(&self) -> Point {
        self.geo_transform.apply(self.size.cols as f64, self.size.rows as f64)
    }

    pub fn bounding_box(&self) -> Rect<f64> {
        Rect::from_points(self.top_left(), self.bottom_right())
    }

    /// The world position of the center of a cell
    pub fn cell_center(&self, cell: Cell) -> Point<f64> {
        self.geo_transform.apply(cell.col as f64 + 0.5, cell.row as f64 + 0.5)
    }

    pub fn point_to_cell(&self, point: Point<f64>) -> Result<Cell> {
        let inverse = self.geo_transform.invert()?;
        let raster_pos = inverse.apply(point.x(), point.y());
        Ok(Cell::from_row_col(raster_pos.y().floor() as i32, raster_pos.x().floor() as i32))
    }

    pub fn is_cell_on_map(&self, cell: Cell) -> bool {
        cell.is_valid() && (cell.row as usize) < self.size.rows && (cell.col as usize) < self.size.cols
    }

    /// A georeference is only usable for rendering when it has a known projection,
    /// a non empty pixel grid and a sane cell size
    pub fn is_valid(&self) -> bool {
        self.epsg.is_some() && !self.size.is_empty() && self.cell_size().is_valid()
    }
}

impl std::fmt::Display for GeoReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.epsg {
            Some(epsg) => write!(f, "{} {}", epsg, self.size),
            None => write!(f, "<no srs> {}", self.size),
        }
    }
}
