use std::collections::HashMap;

use geo::{ArrayDataType, Cell, GeoReference, Nodata, RasterSize};

use crate::{Band, Error, Result};

/// A decoded block of raster samples.
/// The buffer holds band major, row major packed samples in the declared datatype
/// and native byte order. The buffer length always equals
/// `rows * cols * band_count * datatype.size()`.
#[derive(Debug, Clone)]
pub struct Raster {
    georef: GeoReference,
    dtype: ArrayDataType,
    bands: Vec<Band>,
    nodata: Nodata,
    metadata: HashMap<String, String>,
    data: Vec<u8>,
}

impl Raster {
    pub fn new(georef: GeoReference, dtype: ArrayDataType, bands: Vec<Band>, nodata: Nodata, data: Vec<u8>) -> Result<Self> {
        let expected = georef.size().cell_count() * bands.len() * dtype.size();
        if data.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "Raster buffer size mismatch: expected {} bytes, got {}",
                expected,
                data.len()
            )));
        }

        Ok(Raster {
            georef,
            dtype,
            bands,
            nodata,
            metadata: HashMap::new(),
            data,
        })
    }

    /// A raster with every sample set to the resolved nodata sentinel
    pub fn filled_with_nodata(georef: GeoReference, dtype: ArrayDataType, bands: Vec<Band>, nodata: Nodata) -> Result<Self> {
        let sentinel = nodata.resolved_for(dtype)?;
        let cell_count = georef.size().cell_count();
        let band_count = bands.len();

        let mut raster = Raster::new(georef, dtype, bands, nodata, vec![0; cell_count * band_count * dtype.size()])?;
        for band in 0..band_count {
            for index in 0..cell_count {
                raster.write_sample(band, index, sentinel);
            }
        }

        Ok(raster)
    }

    /// A single band raster of packed ARGB pixels
    pub fn from_argb(georef: GeoReference, pixels: &[u32]) -> Result<Self> {
        let mut data = Vec::with_capacity(pixels.len() * 4);
        for pixel in pixels {
            data.extend_from_slice(&pixel.to_ne_bytes());
        }

        Raster::new(
            georef,
            ArrayDataType::Uint32,
            vec![Band::new("colors", ArrayDataType::Uint32)],
            Nodata::NONE,
            data,
        )
    }

    pub fn georef(&self) -> &GeoReference {
        &self.georef
    }

    pub fn size(&self) -> RasterSize {
        self.georef.size()
    }

    pub fn dtype(&self) -> ArrayDataType {
        self.dtype
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    pub fn band_count(&self) -> usize {
        self.bands.len()
    }

    pub fn nodata(&self) -> Nodata {
        self.nodata
    }

    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    pub fn metadata_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.metadata
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn plane_len(&self) -> usize {
        self.size().cell_count() * self.dtype.size()
    }

    /// The packed sample bytes of a single band
    pub fn plane(&self, band: usize) -> &[u8] {
        let len = self.plane_len();
        &self.data[band * len..(band + 1) * len]
    }

    pub fn plane_mut(&mut self, band: usize) -> &mut [u8] {
        let len = self.plane_len();
        &mut self.data[band * len..(band + 1) * len]
    }

    pub fn read_sample(&self, band: usize, index: usize) -> f64 {
        let width = self.dtype.size();
        let offset = band * self.plane_len() + index * width;
        sample_from_bytes(self.dtype, &self.data[offset..offset + width])
    }

    pub fn sample_at(&self, band: usize, cell: Cell) -> f64 {
        self.read_sample(band, cell.index_in_raster(self.size().cols))
    }

    pub fn write_sample(&mut self, band: usize, index: usize, value: f64) {
        let width = self.dtype.size();
        let offset = band * self.plane_len() + index * width;
        sample_to_bytes(self.dtype, value, &mut self.data[offset..offset + width]);
    }

    /// The samples of a band as f64 values in row major order
    pub fn samples(&self, band: usize) -> impl Iterator<Item = f64> + '_ {
        let dtype = self.dtype;
        self.plane(band).chunks_exact(dtype.size()).map(move |chunk| sample_from_bytes(dtype, chunk))
    }

    /// The packed ARGB pixels of a single band Uint32 raster
    pub fn argb_pixels(&self) -> Result<Vec<u32>> {
        if self.dtype != ArrayDataType::Uint32 || self.bands.len() != 1 {
            return Err(Error::InvalidArgument(format!(
                "Not an ARGB raster: {} bands of {}",
                self.bands.len(),
                self.dtype
            )));
        }

        Ok(self
            .plane(0)
            .chunks_exact(4)
            .map(|chunk| u32::from_ne_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect())
    }

    /// Replaces the pixel content, keeping the declared bounds and projection
    pub(crate) fn replace_data(&mut self, data: Vec<u8>) -> Result<()> {
        if data.len() != self.data.len() {
            return Err(Error::SizeMismatch {
                size1: (self.data.len(), 1),
                size2: (data.len(), 1),
            });
        }

        self.data = data;
        Ok(())
    }

    /// Replaces content and shape in one go, used by operations that change the
    /// band layout or datatype (coloring, resampling)
    pub(crate) fn reshape(&mut self, georef: GeoReference, dtype: ArrayDataType, bands: Vec<Band>, data: Vec<u8>) -> Result<()> {
        let expected = georef.size().cell_count() * bands.len() * dtype.size();
        if data.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "Raster buffer size mismatch: expected {} bytes, got {}",
                expected,
                data.len()
            )));
        }

        self.georef = georef;
        self.dtype = dtype;
        self.bands = bands;
        self.data = data;
        Ok(())
    }
}

fn sample_from_bytes(dtype: ArrayDataType, bytes: &[u8]) -> f64 {
    match dtype {
        ArrayDataType::Uint8 => f64::from(bytes[0]),
        ArrayDataType::Uint16 => f64::from(u16::from_ne_bytes([bytes[0], bytes[1]])),
        ArrayDataType::Int16 => f64::from(i16::from_ne_bytes([bytes[0], bytes[1]])),
        ArrayDataType::Int32 => f64::from(i32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        ArrayDataType::Uint32 => f64::from(u32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        ArrayDataType::Int64 => i64::from_ne_bytes(bytes.try_into().unwrap_or_default()) as f64,
        ArrayDataType::Float32 => f64::from(f32::from_ne_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])),
        ArrayDataType::Float64 => f64::from_ne_bytes(bytes.try_into().unwrap_or_default()),
    }
}

fn sample_to_bytes(dtype: ArrayDataType, value: f64, out: &mut [u8]) {
    match dtype {
        ArrayDataType::Uint8 => out.copy_from_slice(&[value as u8]),
        ArrayDataType::Uint16 => out.copy_from_slice(&(value as u16).to_ne_bytes()),
        ArrayDataType::Int16 => out.copy_from_slice(&(value as i16).to_ne_bytes()),
        ArrayDataType::Int32 => out.copy_from_slice(&(value as i32).to_ne_bytes()),
        ArrayDataType::Uint32 => out.copy_from_slice(&(value as u32).to_ne_bytes()),
        ArrayDataType::Int64 => out.copy_from_slice(&(value as i64).to_ne_bytes()),
        ArrayDataType::Float32 => out.copy_from_slice(&(value as f32).to_ne_bytes()),
        ArrayDataType::Float64 => out.copy_from_slice(&value.to_ne_bytes()),
    }
}

#[cfg(test)]
mod tests {
    use geo::{crs, Point, Rect};

    use super::*;

    fn test_georef(rows: usize, cols: usize) -> GeoReference {
        GeoReference::with_extent(
            crs::epsg::WGS84_WEB_MERCATOR,
            Rect::from_nw_se(Point::new(0.0, 100.0), Point::new(100.0, 0.0)),
            RasterSize::with_rows_cols(rows, cols),
            None,
        )
    }

    #[test]
    fn buffer_length_invariant() {
        let bands = vec![Band::new("b1", ArrayDataType::Int16), Band::new("b2", ArrayDataType::Int16)];
        assert!(Raster::new(test_georef(4, 4), ArrayDataType::Int16, bands.clone(), Nodata::NONE, vec![0; 64]).is_ok());
        assert!(Raster::new(test_georef(4, 4), ArrayDataType::Int16, bands, Nodata::NONE, vec![0; 63]).is_err());
    }

    #[test]
    fn sample_round_trip() -> Result {
        let mut raster = Raster::filled_with_nodata(
            test_georef(2, 2),
            ArrayDataType::Float32,
            vec![Band::new("values", ArrayDataType::Float32)],
            Nodata::exact(-9999.0),
        )?;

        assert_eq!(raster.read_sample(0, 0), -9999.0);
        raster.write_sample(0, 3, 42.5);
        assert_eq!(raster.read_sample(0, 3), 42.5);
        assert_eq!(raster.sample_at(0, Cell::from_row_col(1, 1)), 42.5);

        let samples: Vec<f64> = raster.samples(0).collect();
        assert_eq!(samples, vec![-9999.0, -9999.0, -9999.0, 42.5]);
        Ok(())
    }

    #[test]
    fn band_planes_are_band_major() -> Result {
        let bands = vec![Band::new("b1", ArrayDataType::Uint8), Band::new("b2", ArrayDataType::Uint8)];
        let data = vec![1, 2, 3, 4, 5, 6, 7, 8];
        let raster = Raster::new(test_georef(2, 2), ArrayDataType::Uint8, bands, Nodata::NONE, data)?;

        assert_eq!(raster.plane(0), &[1, 2, 3, 4]);
        assert_eq!(raster.plane(1), &[5, 6, 7, 8]);
        assert_eq!(raster.read_sample(1, 0), 5.0);
        Ok(())
    }

    #[test]
    fn argb_access() -> Result {
        let pixels = [0xFF00_0000u32, 0xFFFF_FFFF, 0x8012_3456, 0x0000_0001];
        let raster = Raster::from_argb(test_georef(2, 2), &pixels)?;
        assert_eq!(raster.argb_pixels()?, pixels);

        let gray = Raster::filled_with_nodata(
            test_georef(2, 2),
            ArrayDataType::Uint8,
            vec![Band::new("gray", ArrayDataType::Uint8)],
            Nodata::NONE,
        )?;
        assert!(gray.argb_pixels().is_err());
        Ok(())
    }
}
