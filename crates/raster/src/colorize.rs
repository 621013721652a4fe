use geo::ArrayDataType;
use inf::{color, grayscale, ColorMap, ProgressListener};

use crate::{
    ops::{params, Params},
    Band, Error, Hints, Raster, RasterOp, Result,
};

fn band_index(raster: &Raster, params: &Params) -> Result<usize> {
    let band = params.int(params::BAND).unwrap_or(0) as usize;
    if band >= raster.band_count() {
        return Err(Error::InvalidArgument(format!(
            "Band index {} out of range, raster has {} bands",
            band,
            raster.band_count()
        )));
    }

    Ok(band)
}

fn replace_with_argb(raster: &mut Raster, pixels: Vec<u32>) -> Result<()> {
    let mut data = Vec::with_capacity(pixels.len() * 4);
    for pixel in pixels {
        data.extend_from_slice(&pixel.to_ne_bytes());
    }

    raster.reshape(
        *raster.georef(),
        ArrayDataType::Uint32,
        vec![Band::new("colors", ArrayDataType::Uint32)],
        data,
    )
}

/// The `colormap` operation: colors raw samples through a threshold colormap.
/// The colormap comes from the parameter map or from the band descriptor,
/// requesting the operation without either is an explicit failure.
pub struct ColorMapOp;

impl RasterOp for ColorMapOp {
    fn operation_name(&self) -> &'static str {
        crate::operations::COLOR_MAP
    }

    fn validate_params(&self, _params: &Params) -> bool {
        // the colormap may come from the band, checked during execution
        true
    }

    fn execute(&self, raster: &mut Raster, params: &Params, _hints: &Hints, progress: Option<&dyn ProgressListener>) -> Result<()> {
        let band_index = band_index(raster, params)?;
        let band = &raster.bands()[band_index];

        let colormap: ColorMap = match params.colormap(params::COLOR_MAP).or_else(|| band.colormap()) {
            Some(cmap) if !cmap.is_empty() => cmap.clone(),
            _ => {
                return Err(Error::InvalidArgument(
                    "colormap: no colormap configured for the raster".to_string(),
                ));
            }
        };

        let nodata = band.nodata();
        let pixels: Vec<u32> = raster
            .samples(band_index)
            .map(|sample| {
                if nodata.is_nodata(sample) {
                    color::TRANSPARENT.to_argb()
                } else {
                    colormap.color_for_value(sample).to_argb()
                }
            })
            .collect();

        if let Some(progress) = progress {
            progress.progress(100);
        }

        replace_with_argb(raster, pixels)
    }
}

/// The `grayscale` operation: linearly scales raw samples between the global
/// minimum and maximum into opaque gray pixels. NaN samples are skipped while
/// determining the range and rendered transparent.
pub struct GrayscaleOp;

impl RasterOp for GrayscaleOp {
    fn operation_name(&self) -> &'static str {
        crate::operations::GRAYSCALE
    }

    fn validate_params(&self, _params: &Params) -> bool {
        true
    }

    fn execute(&self, raster: &mut Raster, params: &Params, _hints: &Hints, progress: Option<&dyn ProgressListener>) -> Result<()> {
        let band_index = band_index(raster, params)?;

        // first pass: global value range
        let (min, max) = grayscale::value_range(raster.samples(band_index)).unwrap_or((0.0, 0.0));
        if let Some(progress) = progress {
            progress.progress(50);
        }

        // second pass: scale every sample onto [0, 255]
        let pixels: Vec<u32> = raster
            .samples(band_index)
            .map(|sample| {
                if sample.is_nan() {
                    color::TRANSPARENT.to_argb()
                } else {
                    grayscale::color_for_value(sample, min, max).to_argb()
                }
            })
            .collect();

        if let Some(progress) = progress {
            progress.progress(100);
        }

        replace_with_argb(raster, pixels)
    }
}

#[cfg(test)]
mod tests {
    use geo::{crs, GeoReference, Nodata, Point, RasterSize, Rect};
    use inf::{Color, ColorMapEntry};

    use super::*;
    use crate::{operations, ParamValue, RasterOpRegistry};

    fn raster_with_samples(samples: &[f64], band: Band) -> Raster {
        let size = RasterSize::with_rows_cols(1, samples.len());
        let georef = GeoReference::with_extent(
            crs::epsg::WGS84_WEB_MERCATOR,
            Rect::from_nw_se(Point::new(0.0, 10.0), Point::new(samples.len() as f64 * 10.0, 0.0)),
            size,
            None,
        );

        let dtype = band.dtype();
        let nodata = band.nodata();
        let mut raster = Raster::filled_with_nodata(georef, dtype, vec![band], nodata).expect("valid raster");
        for (index, &sample) in samples.iter().enumerate() {
            raster.write_sample(0, index, sample);
        }

        raster
    }

    fn threshold_map() -> ColorMap {
        ColorMap::new(
            vec![
                ColorMapEntry::new(color::RED, 0.0),
                ColorMapEntry::new(color::GREEN, 10.0),
                ColorMapEntry::new(color::BLUE, 20.0),
            ],
            None,
        )
    }

    #[test]
    fn colormap_via_params() -> Result<()> {
        let band = Band::new("values", geo::ArrayDataType::Float32);
        let mut raster = raster_with_samples(&[5.0, 15.0, 25.0], band);

        let params = Params::new().set(params::COLOR_MAP, ParamValue::ColorMap(threshold_map()));
        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::COLOR_MAP, &params, &Hints::new(), None)?;

        let pixels = raster.argb_pixels()?;
        assert_eq!(pixels, vec![color::RED.to_argb(), color::GREEN.to_argb(), color::BLUE.to_argb()]);
        Ok(())
    }

    #[test]
    fn colormap_via_band_descriptor() -> Result<()> {
        let band = Band::new("values", geo::ArrayDataType::Float32).with_colormap(threshold_map());
        let mut raster = raster_with_samples(&[12.0], band);

        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::COLOR_MAP, &Params::new(), &Hints::new(), None)?;
        assert_eq!(raster.argb_pixels()?, vec![color::GREEN.to_argb()]);
        Ok(())
    }

    #[test]
    fn missing_colormap_is_an_explicit_error() {
        let band = Band::new("values", geo::ArrayDataType::Float32);
        let mut raster = raster_with_samples(&[5.0], band);

        let result =
            RasterOpRegistry::with_default_ops().execute(&mut raster, operations::COLOR_MAP, &Params::new(), &Hints::new(), None);
        assert!(result.is_err());
    }

    #[test]
    fn band_nodata_renders_transparent() -> Result<()> {
        let band = Band::new("values", geo::ArrayDataType::Float32).with_nodata(Nodata::exact(-9999.0));
        let mut raster = raster_with_samples(&[5.0, -9999.0], band);

        let params = Params::new().set(params::COLOR_MAP, ParamValue::ColorMap(threshold_map()));
        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::COLOR_MAP, &params, &Hints::new(), None)?;

        let pixels = raster.argb_pixels()?;
        assert_eq!(pixels[0], color::RED.to_argb());
        assert_eq!(pixels[1], color::TRANSPARENT.to_argb());
        Ok(())
    }

    #[test]
    fn grayscale_scales_between_min_and_max() -> Result<()> {
        let band = Band::new("values", geo::ArrayDataType::Uint8);
        let mut raster = raster_with_samples(&[0.0, 85.0, 170.0, 255.0], band);

        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::GRAYSCALE, &Params::new(), &Hints::new(), None)?;

        let pixels = raster.argb_pixels()?;
        assert_eq!(pixels[0], Color::grey(0).to_argb());
        assert_eq!(pixels[1], Color::grey(85).to_argb());
        assert_eq!(pixels[2], Color::grey(171).to_argb());
        assert_eq!(pixels[3], Color::grey(255).to_argb());
        Ok(())
    }

    #[test]
    fn grayscale_of_a_constant_buffer_is_black() -> Result<()> {
        let band = Band::new("values", geo::ArrayDataType::Float64);
        let mut raster = raster_with_samples(&[7.0, 7.0, 7.0], band);

        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::GRAYSCALE, &Params::new(), &Hints::new(), None)?;
        assert!(raster.argb_pixels()?.iter().all(|&pixel| pixel == Color::grey(0).to_argb()));
        Ok(())
    }
}
