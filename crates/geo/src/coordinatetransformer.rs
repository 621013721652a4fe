use proj4rs::transform::transform;
use proj4rs::Proj;

use crate::{crs::Epsg, Coordinate, Error, Point, Rect, Result};

/// Transforms world coordinates between two coordinate reference systems.
/// Construction fails when no transformation exists between the two systems.
pub struct CoordinateTransformer {
    source: Proj,
    target: Proj,
    source_srs: String,
    target_srs: String,
}

impl CoordinateTransformer {
    pub fn from_epsg(source_epsg: Epsg, target_epsg: Epsg) -> Result<Self> {
        let source = Proj::from_epsg_code(source_epsg.code() as u16).map_err(|err| projection_error(source_epsg, err))?;
        let target = Proj::from_epsg_code(target_epsg.code() as u16).map_err(|err| projection_error(target_epsg, err))?;

        Ok(CoordinateTransformer {
            source,
            target,
            source_srs: source_epsg.to_string(),
            target_srs: target_epsg.to_string(),
        })
    }

    pub fn transform_point(&self, point: Point) -> Result<Point> {
        let mut p = point;
        self.transform_point_in_place(&mut p)?;
        Ok(p)
    }

    pub fn transform_point_in_place(&self, point: &mut Point) -> Result<()> {
        // proj4rs operates on radians for geographic systems
        if self.source.is_latlong() {
            *point = Point::new(point.x().to_radians(), point.y().to_radians());
        }

        transform(&self.source, &self.target, point).map_err(|err| {
            Error::Projection(format!("{} -> {}: {}", self.source_srs, self.target_srs, err))
        })?;

        if self.target.is_latlong() {
            *point = Point::new(point.x().to_degrees(), point.y().to_degrees());
        }

        Ok(())
    }

    /// Transforms a whole slice, one failing point fails the batch
    pub fn transform_points_in_place(&self, points: &mut [Point]) -> Result<()> {
        for point in points.iter_mut() {
            self.transform_point_in_place(point)?;
        }
        Ok(())
    }

    pub fn transform_coordinate(&self, coord: Coordinate) -> Result<Coordinate> {
        Ok(Coordinate::from(self.transform_point(coord.into())?))
    }

    /// Transforms a bounding box by transforming its corners and taking the hull
    pub fn transform_rect(&self, rect: &Rect<f64>) -> Result<Rect<f64>> {
        let mut corners = [rect.top_left(), rect.top_right(), rect.bottom_left(), rect.bottom_right()];
        self.transform_points_in_place(&mut corners)?;

        let mut xs = corners.map(|p| p.x());
        let mut ys = corners.map(|p| p.y());
        xs.sort_by(f64::total_cmp);
        ys.sort_by(f64::total_cmp);

        Ok(Rect::from_nw_se(Point::new(xs[0], ys[3]), Point::new(xs[3], ys[0])))
    }

    pub fn source_srs(&self) -> &str {
        &self.source_srs
    }

    pub fn target_srs(&self) -> &str {
        &self.target_srs
    }
}

fn projection_error(epsg: Epsg, err: proj4rs::errors::Error) -> Error {
    Error::Projection(format!("{}: {}", epsg, err))
}
