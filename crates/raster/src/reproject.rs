use geo::{CoordinateTransformer, Point};
use inf::ProgressListener;

use crate::{
    ops::{params, Params},
    Error, Hints, Raster, RasterOp, Result,
};

/// The `reproject` operation.
///
/// Remaps the pixel content of a raster from its own coordinate reference
/// system into the target system supplied via the `target_crs` parameter by
/// inverse mapping: every pixel of the grid is positioned in target model
/// space, transformed back into source model space and nearest sampled from
/// the source grid. Positions that fall outside the source bounding box
/// receive the band's resolved nodata sentinel.
///
/// The declared bounds and CRS of the raster are left untouched, only the
/// pixel buffer is replaced, and only when the whole operation succeeds.
pub struct ReprojectOp;

impl RasterOp for ReprojectOp {
    fn operation_name(&self) -> &'static str {
        crate::operations::REPROJECT
    }

    fn validate_params(&self, params: &Params) -> bool {
        params.crs(params::TARGET_CRS).is_some()
    }

    fn execute(&self, raster: &mut Raster, params: &Params, _hints: &Hints, progress: Option<&dyn ProgressListener>) -> Result<()> {
        let target_crs = params
            .crs(params::TARGET_CRS)
            .ok_or_else(|| Error::InvalidArgument("reproject: missing target crs parameter".to_string()))?;
        let source_crs = raster
            .georef()
            .epsg()
            .ok_or_else(|| Error::InvalidArgument("reproject: raster has no CRS".to_string()))?;

        if source_crs == target_crs && params.bounds(params::TARGET_BOUNDS).is_none() {
            return Ok(());
        }

        let to_target = CoordinateTransformer::from_epsg(source_crs, target_crs)?;
        let to_source = CoordinateTransformer::from_epsg(target_crs, source_crs)?;

        let size = raster.size();
        let src_bbox = raster.georef().bounding_box();

        // the grid is repopulated for the requested target window when one is
        // supplied, otherwise for the reprojected source extent
        let reprojected_bbox = match params.bounds(params::TARGET_BOUNDS) {
            Some(bounds) => bounds,
            None => to_target.transform_rect(&src_bbox)?,
        };

        // target space resolution of the reprojected extent over the source grid
        let x_res = reprojected_bbox.width() / size.cols as f64;
        let y_res = reprojected_bbox.height() / size.rows as f64;
        let origin = reprojected_bbox.top_left();

        let dtype = raster.dtype();
        let sample_width = dtype.size();
        let plane_len = size.cell_count() * sample_width;
        let inverse_transform = raster.georef().geo_transform().invert()?;

        let sentinels: Vec<f64> = raster
            .bands()
            .iter()
            .map(|band| {
                let nodata = match band.nodata() {
                    geo::Nodata::None => raster.nodata(),
                    configured => configured,
                };
                nodata.resolved_for(dtype)
            })
            .collect::<Result<_>>()?;

        let mut output = vec![0u8; raster.data().len()];
        let mut row_points: Vec<Point> = Vec::with_capacity(size.cols);

        for y in 0..size.rows {
            row_points.clear();
            for x in 0..size.cols {
                row_points.push(Point::new(
                    origin.x() + (x as f64 + 0.5) * x_res,
                    origin.y() - (y as f64 + 0.5) * y_res,
                ));
            }

            let transformed = transform_row(&to_source, &mut row_points);

            for (x, source_point) in transformed.iter().enumerate() {
                let index = y * size.cols + x;
                let source_cell = source_point
                    .filter(|point| src_bbox.contains(*point))
                    .map(|point| {
                        let raster_pos = inverse_transform.apply(point.x(), point.y());
                        geo::Cell::from_row_col(raster_pos.y().floor() as i32, raster_pos.x().floor() as i32)
                    })
                    .filter(|cell| raster.georef().is_cell_on_map(*cell));

                match source_cell {
                    Some(cell) => {
                        let source_index = cell.index_in_raster(size.cols);
                        for band in 0..raster.band_count() {
                            let src_offset = band * plane_len + source_index * sample_width;
                            let dst_offset = band * plane_len + index * sample_width;
                            output[dst_offset..dst_offset + sample_width]
                                .copy_from_slice(&raster.data()[src_offset..src_offset + sample_width]);
                        }
                    }
                    None => {
                        for (band, &sentinel) in sentinels.iter().enumerate() {
                            write_sentinel(dtype, sentinel, &mut output[band * plane_len + index * sample_width..]);
                        }
                    }
                }
            }

            if let Some(progress) = progress {
                progress.progress(((y + 1) * 100 / size.rows) as u8);
            }
        }

        raster.replace_data(output)
    }
}

/// Transforms a row of target space positions back into source model space.
/// A failing batch falls back to per point transforms, points outside the
/// projection domain become `None`.
fn transform_row(to_source: &CoordinateTransformer, points: &mut [Point]) -> Vec<Option<Point>> {
    let originals: Vec<Point> = points.to_vec();
    if to_source.transform_points_in_place(points).is_ok() {
        return points.iter().copied().map(Some).collect();
    }

    originals.iter().map(|&point| to_source.transform_point(point).ok()).collect()
}

fn write_sentinel(dtype: geo::ArrayDataType, sentinel: f64, out: &mut [u8]) {
    use geo::ArrayDataType as T;
    match dtype {
        T::Uint8 => out[..1].copy_from_slice(&[sentinel as u8]),
        T::Uint16 => out[..2].copy_from_slice(&(sentinel as u16).to_ne_bytes()),
        T::Int16 => out[..2].copy_from_slice(&(sentinel as i16).to_ne_bytes()),
        T::Int32 => out[..4].copy_from_slice(&(sentinel as i32).to_ne_bytes()),
        T::Uint32 => out[..4].copy_from_slice(&(sentinel as u32).to_ne_bytes()),
        T::Int64 => out[..8].copy_from_slice(&(sentinel as i64).to_ne_bytes()),
        T::Float32 => out[..4].copy_from_slice(&(sentinel as f32).to_ne_bytes()),
        T::Float64 => out[..8].copy_from_slice(&sentinel.to_ne_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use geo::{crs, ArrayDataType, GeoReference, Nodata, Point, RasterSize, Rect};

    use super::*;
    use crate::{operations, Band, ParamValue, RasterOpRegistry};

    fn web_mercator_raster(bounds: Rect<f64>, size: RasterSize, nodata: Nodata) -> Raster {
        let georef = GeoReference::with_extent(crs::epsg::WGS84_WEB_MERCATOR, bounds, size, nodata.value());
        let band = Band::new("values", ArrayDataType::Int16).with_nodata(nodata);
        let mut raster =
            Raster::filled_with_nodata(georef, ArrayDataType::Int16, vec![band], nodata).expect("valid raster");

        for index in 0..size.cell_count() {
            raster.write_sample(0, index, index as f64);
        }

        raster
    }

    #[test]
    fn missing_target_crs_aborts_without_mutation() {
        let nodata = Nodata::exact(-9999.0);
        let bounds = Rect::from_nw_se(Point::new(0.0, 1000.0), Point::new(1000.0, 0.0));
        let mut raster = web_mercator_raster(bounds, RasterSize::square(4), nodata);
        let before: Vec<f64> = raster.samples(0).collect();

        let registry = RasterOpRegistry::with_default_ops();
        let result = registry.execute(&mut raster, operations::REPROJECT, &Params::new(), &Hints::new(), None);

        assert!(result.is_err());
        let after: Vec<f64> = raster.samples(0).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn identical_crs_preserves_pixel_content() -> Result<()> {
        let nodata = Nodata::exact(-9999.0);
        let bounds = Rect::from_nw_se(Point::new(0.0, 1000.0), Point::new(1000.0, 0.0));
        let mut raster = web_mercator_raster(bounds, RasterSize::square(4), nodata);
        let before: Vec<f64> = raster.samples(0).collect();

        let params = Params::new().set(params::TARGET_CRS, ParamValue::Crs(crs::epsg::WGS84_WEB_MERCATOR));
        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::REPROJECT, &params, &Hints::new(), None)?;

        let after: Vec<f64> = raster.samples(0).collect();
        assert_eq!(before, after);
        Ok(())
    }

    #[test]
    fn reprojection_keeps_declared_bounds_and_crs() -> Result<()> {
        let nodata = Nodata::exact(-9999.0);
        // a central european extent in web mercator
        let bounds = Rect::from_nw_se(Point::new(400_000.0, 6_700_000.0), Point::new(700_000.0, 6_500_000.0));
        let mut raster = web_mercator_raster(bounds, RasterSize::square(8), nodata);

        let params = Params::new().set(params::TARGET_CRS, ParamValue::Crs(crs::epsg::WGS84));
        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::REPROJECT, &params, &Hints::new(), None)?;

        assert_eq!(raster.georef().epsg(), Some(crs::epsg::WGS84_WEB_MERCATOR));
        assert_eq!(raster.georef().bounding_box(), bounds);
        assert_eq!(raster.size(), RasterSize::square(8));

        // the remapped content comes from the source grid or is nodata
        for sample in raster.samples(0) {
            assert!(sample == -9999.0 || (0.0..64.0).contains(&sample));
        }
        Ok(())
    }

    #[test]
    fn content_is_remapped_between_crs_pairs() -> Result<()> {
        let nodata = Nodata::exact(-1.0);
        // a large north-south extent makes the mercator latitude distortion span several cells
        let bounds = Rect::from_nw_se(Point::new(400_000.0, 8_000_000.0), Point::new(4_400_000.0, 4_000_000.0));
        let mut raster = web_mercator_raster(bounds, RasterSize::square(64), nodata);
        let before: Vec<f64> = raster.samples(0).collect();

        let params = Params::new().set(params::TARGET_CRS, ParamValue::Crs(crs::epsg::WGS84));
        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::REPROJECT, &params, &Hints::new(), None)?;

        let after: Vec<f64> = raster.samples(0).collect();
        assert_ne!(before, after);
        assert!(after.iter().any(|&sample| sample >= 0.0), "everything became nodata");
        Ok(())
    }

    #[test]
    fn extent_outside_the_target_window_becomes_nodata() -> Result<()> {
        let nodata = Nodata::exact(-9999.0);
        let bounds = Rect::from_nw_se(Point::new(400_000.0, 6_700_000.0), Point::new(700_000.0, 6_500_000.0));
        let mut raster = web_mercator_raster(bounds, RasterSize::square(8), nodata);

        // a target window on the other side of the world
        let params = Params::new()
            .set(params::TARGET_CRS, ParamValue::Crs(crs::epsg::WGS84))
            .set(
                params::TARGET_BOUNDS,
                ParamValue::Bounds(Rect::from_nw_se(Point::new(-120.0, -10.0), Point::new(-110.0, -20.0))),
            );
        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::REPROJECT, &params, &Hints::new(), None)?;

        assert!(raster.samples(0).all(|sample| sample == -9999.0));
        Ok(())
    }
}
