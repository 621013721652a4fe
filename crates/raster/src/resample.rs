//! Pixel resampling on packed 32 bit ARGB buffers.

use geo::{GeoReference, RasterSize};
use inf::ProgressListener;

use crate::{
    ops::{params, Params},
    Error, Hints, Raster, RasterOp, Result,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ResampleMethod {
    #[default]
    NearestNeighbour,
    Bilinear,
    Bicubic,
}

/// Resamples a packed ARGB pixel block to the destination size.
/// Matching source and destination sizes return a plain copy for every method.
pub fn resample(src: &[u32], src_size: RasterSize, dst_size: RasterSize, method: ResampleMethod) -> Vec<u32> {
    assert_eq!(src.len(), src_size.cell_count(), "source buffer does not match its size");

    if src_size == dst_size {
        return src.to_vec();
    }

    if src_size.is_empty() || dst_size.is_empty() {
        return vec![0; dst_size.cell_count()];
    }

    match method {
        ResampleMethod::NearestNeighbour => resample_nearest(src, src_size, dst_size),
        ResampleMethod::Bilinear => resample_bilinear(src, src_size, dst_size),
        ResampleMethod::Bicubic => resample_bicubic(src, src_size, dst_size),
    }
}

fn axis_ratio(src: usize, dst: usize) -> f64 {
    (src - 1) as f64 / dst as f64
}

fn resample_nearest(src: &[u32], src_size: RasterSize, dst_size: RasterSize) -> Vec<u32> {
    let x_ratio = axis_ratio(src_size.cols, dst_size.cols);
    let y_ratio = axis_ratio(src_size.rows, dst_size.rows);

    let mut dst = Vec::with_capacity(dst_size.cell_count());
    for i in 0..dst_size.rows {
        let py = (y_ratio * i as f64).round() as usize;
        for j in 0..dst_size.cols {
            let px = (x_ratio * j as f64).round() as usize;
            dst.push(src[py * src_size.cols + px]);
        }
    }

    dst
}

fn channel(pixel: u32, shift: u32) -> f64 {
    ((pixel >> shift) & 0xFF) as f64
}

fn resample_bilinear(src: &[u32], src_size: RasterSize, dst_size: RasterSize) -> Vec<u32> {
    let x_ratio = axis_ratio(src_size.cols, dst_size.cols);
    let y_ratio = axis_ratio(src_size.rows, dst_size.rows);

    let mut dst = Vec::with_capacity(dst_size.cell_count());
    for i in 0..dst_size.rows {
        let fy = y_ratio * i as f64;
        let y = fy as usize;
        let dy = fy - y as f64;
        let y1 = (y + 1).min(src_size.rows - 1);

        for j in 0..dst_size.cols {
            let fx = x_ratio * j as f64;
            let x = fx as usize;
            let dx = fx - x as f64;
            let x1 = (x + 1).min(src_size.cols - 1);

            let a = src[y * src_size.cols + x];
            let b = src[y * src_size.cols + x1];
            let c = src[y1 * src_size.cols + x];
            let d = src[y1 * src_size.cols + x1];

            let blend = |shift: u32| -> u32 {
                let value = channel(a, shift) * (1.0 - dx) * (1.0 - dy)
                    + channel(b, shift) * dx * (1.0 - dy)
                    + channel(c, shift) * dy * (1.0 - dx)
                    + channel(d, shift) * dx * dy;
                (value.round().clamp(0.0, 255.0)) as u32
            };

            dst.push(0xFF00_0000 | (blend(16) << 16) | (blend(8) << 8) | blend(0));
        }
    }

    dst
}

/// Cubic convolution kernel coefficient, the Catmull-Rom style two piece kernel
const KERNEL_COEFFICIENT: f64 = -0.5;

fn cubic_weight(r: f64) -> f64 {
    let a = KERNEL_COEFFICIENT;
    let r = r.abs();
    if r < 1.0 {
        (a + 2.0) * r * r * r - (a + 3.0) * r * r + 1.0
    } else if r < 2.0 {
        a * r * r * r - 5.0 * a * r * r + 8.0 * a * r - 4.0 * a
    } else {
        0.0
    }
}

fn resample_bicubic(src: &[u32], src_size: RasterSize, dst_size: RasterSize) -> Vec<u32> {
    let x_ratio = axis_ratio(src_size.cols, dst_size.cols);
    let y_ratio = axis_ratio(src_size.rows, dst_size.rows);

    let clamp_col = |col: i64| -> usize { col.clamp(0, src_size.cols as i64 - 1) as usize };
    let clamp_row = |row: i64| -> usize { row.clamp(0, src_size.rows as i64 - 1) as usize };

    let mut dst = Vec::with_capacity(dst_size.cell_count());
    for i in 0..dst_size.rows {
        let fy = y_ratio * i as f64;
        let y = fy.floor() as i64;
        let dy = fy - y as f64;

        // separable 1D weights per axis
        let wy: [f64; 4] = std::array::from_fn(|n| cubic_weight(n as f64 - 1.0 - dy));

        for j in 0..dst_size.cols {
            let fx = x_ratio * j as f64;
            let x = fx.floor() as i64;
            let dx = fx - x as f64;

            let wx: [f64; 4] = std::array::from_fn(|m| cubic_weight(m as f64 - 1.0 - dx));

            let mut red = 0.0;
            let mut green = 0.0;
            let mut blue = 0.0;
            for (n, weight_y) in wy.iter().enumerate() {
                // out of bounds taps replicate the edge row/column
                let row = clamp_row(y + n as i64 - 1);
                for (m, weight_x) in wx.iter().enumerate() {
                    let col = clamp_col(x + m as i64 - 1);
                    let pixel = src[row * src_size.cols + col];
                    let weight = weight_x * weight_y;
                    red += channel(pixel, 16) * weight;
                    green += channel(pixel, 8) * weight;
                    blue += channel(pixel, 0) * weight;
                }
            }

            let pack = |value: f64| -> u32 { value.round().clamp(0.0, 255.0) as u32 };
            dst.push(0xFF00_0000 | (pack(red) << 16) | (pack(green) << 8) | pack(blue));
        }
    }

    dst
}

/// The `resample` operation, applies to single band packed ARGB rasters.
/// The declared bounds are preserved, the pixel grid is replaced by the target size.
pub struct ResampleOp;

impl RasterOp for ResampleOp {
    fn operation_name(&self) -> &'static str {
        crate::operations::RESAMPLE
    }

    fn default_params(&self) -> Params {
        Params::new().set(params::METHOD, crate::ParamValue::Method(ResampleMethod::default()))
    }

    fn validate_params(&self, params: &Params) -> bool {
        params.size(params::TARGET_SIZE).is_some() && params.method(params::METHOD).is_some()
    }

    fn execute(&self, raster: &mut Raster, params: &Params, _hints: &Hints, progress: Option<&dyn ProgressListener>) -> Result<()> {
        let target_size = params
            .size(params::TARGET_SIZE)
            .ok_or_else(|| Error::InvalidArgument("resample: missing target size".to_string()))?;
        let method = params.method(params::METHOD).unwrap_or_default();

        let pixels = raster.argb_pixels()?;
        let resampled = resample(&pixels, raster.size(), target_size, method);
        if let Some(progress) = progress {
            progress.progress(100);
        }

        let georef = GeoReference::with_extent(
            raster.georef().epsg().ok_or_else(|| Error::InvalidArgument("resample: raster has no CRS".to_string()))?,
            raster.georef().bounding_box(),
            target_size,
            raster.georef().nodata(),
        );

        let mut data = Vec::with_capacity(resampled.len() * 4);
        for pixel in resampled {
            data.extend_from_slice(&pixel.to_ne_bytes());
        }

        raster.reshape(georef, geo::ArrayDataType::Uint32, raster.bands().to_vec(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const METHODS: [ResampleMethod; 3] = [ResampleMethod::NearestNeighbour, ResampleMethod::Bilinear, ResampleMethod::Bicubic];

    fn gradient(size: RasterSize) -> Vec<u32> {
        (0..size.cell_count()).map(|i| 0xFF00_0000 | (i as u32 * 7) % 256).collect()
    }

    #[test]
    fn equal_size_is_the_identity() {
        let size = RasterSize::with_rows_cols(7, 5);
        let pixels = gradient(size);

        for method in METHODS {
            assert_eq!(resample(&pixels, size, size, method), pixels, "{:?}", method);
        }
    }

    #[test]
    fn uniform_input_stays_uniform() {
        let color = 0xFF12_3456;
        let src_size = RasterSize::with_rows_cols(8, 6);
        let pixels = vec![color; src_size.cell_count()];

        for method in [ResampleMethod::Bilinear, ResampleMethod::Bicubic] {
            for dst_size in [RasterSize::with_rows_cols(16, 12), RasterSize::with_rows_cols(3, 2), RasterSize::square(17)] {
                let result = resample(&pixels, src_size, dst_size, method);
                assert_eq!(result.len(), dst_size.cell_count());
                assert!(
                    result.iter().all(|&pixel| pixel == color),
                    "{:?} -> {:?} introduced artifacts on constant input",
                    method,
                    dst_size
                );
            }
        }
    }

    #[test]
    fn nearest_picks_the_rounded_source_pixel() {
        // 2x2 block upscaled to 4x4, each source pixel should appear unmodified
        let src_size = RasterSize::square(2);
        let pixels = vec![0xFF000001, 0xFF000002, 0xFF000003, 0xFF000004];
        let result = resample(&pixels, src_size, RasterSize::square(4), ResampleMethod::NearestNeighbour);

        assert_eq!(result.len(), 16);
        for pixel in &result {
            assert!(pixels.contains(pixel));
        }
        assert_eq!(result[0], pixels[0]);
    }

    #[test]
    fn downscale_produces_the_requested_size() {
        let src_size = RasterSize::with_rows_cols(16, 16);
        let pixels = gradient(src_size);
        for method in METHODS {
            let result = resample(&pixels, src_size, RasterSize::with_rows_cols(4, 5), method);
            assert_eq!(result.len(), 20);
        }
    }

    #[test]
    fn bilinear_output_is_opaque() {
        let src_size = RasterSize::square(4);
        // semi transparent input, output alpha is forced opaque
        let pixels = vec![0x8000_00FF; src_size.cell_count()];
        let result = resample(&pixels, src_size, RasterSize::square(8), ResampleMethod::Bilinear);
        assert!(result.iter().all(|&pixel| pixel >> 24 == 0xFF));
    }

    #[test]
    fn resample_operation_replaces_the_pixel_grid() -> Result<()> {
        use geo::{crs, Point, Rect};

        use crate::{operations, ParamValue, RasterOpRegistry};

        let bounds = Rect::from_nw_se(Point::new(0.0, 100.0), Point::new(100.0, 0.0));
        let georef = GeoReference::with_extent(crs::epsg::WGS84_WEB_MERCATOR, bounds, RasterSize::square(2), None);
        let mut raster = Raster::from_argb(georef, &[0xFF101010u32; 4])?;

        let params = Params::new()
            .set(params::TARGET_SIZE, ParamValue::Size(RasterSize::square(4)))
            .set(params::METHOD, ParamValue::Method(ResampleMethod::Bilinear));
        RasterOpRegistry::with_default_ops().execute(&mut raster, operations::RESAMPLE, &params, &crate::Hints::new(), None)?;

        assert_eq!(raster.size(), RasterSize::square(4));
        assert_eq!(raster.georef().bounding_box(), bounds);
        assert!(raster.argb_pixels()?.iter().all(|&pixel| pixel == 0xFF101010));
        Ok(())
    }

    #[test]
    fn single_pixel_source() {
        let pixels = vec![0xFFAB_CDEF];
        for method in METHODS {
            let result = resample(&pixels, RasterSize::square(1), RasterSize::square(4), method);
            assert_eq!(result.len(), 16);
            assert!(result.iter().all(|&pixel| pixel == 0xFFAB_CDEF), "{:?}", method);
        }
    }
}
