use crate::{ArrayDataType, Error, Result};

/// Sentinel value matcher for missing raster measurements.
/// `Nodata::NONE` never matches, otherwise a sample `v` is missing iff `|v - value| <= tolerance`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Nodata {
    #[default]
    None,
    Value {
        value: f64,
        tolerance: f64,
    },
}

impl Nodata {
    pub const NONE: Nodata = Nodata::None;

    pub fn new(value: f64, tolerance: f64) -> Self {
        Nodata::Value { value, tolerance }
    }

    pub fn exact(value: f64) -> Self {
        Nodata::Value { value, tolerance: 0.0 }
    }

    pub fn is_nodata(&self, sample: f64) -> bool {
        match *self {
            Nodata::None => false,
            Nodata::Value { value, tolerance } => {
                if value.is_nan() {
                    sample.is_nan()
                } else {
                    (sample - value).abs() <= tolerance
                }
            }
        }
    }

    pub fn value_or_none(&self, sample: f64) -> Option<f64> {
        if self.is_nodata(sample) { None } else { Some(sample) }
    }

    pub fn value(&self) -> Option<f64> {
        match *self {
            Nodata::None => None,
            Nodata::Value { value, .. } => Some(value),
        }
    }

    /// The sentinel value to write for the given datatype.
    /// A configured value must be representable in the datatype within the declared
    /// tolerance, an unconfigured nodata falls back to the datatype convention.
    pub fn resolved_for(&self, dtype: ArrayDataType) -> Result<f64> {
        match *self {
            Nodata::None => Ok(dtype.default_nodata_value()),
            Nodata::Value { value, tolerance } => {
                let stored = round_trip(value, dtype);
                if value.is_nan() && dtype.is_floating_point() {
                    return Ok(value);
                }

                if (stored - value).abs() <= tolerance {
                    Ok(stored)
                } else {
                    Err(Error::InvalidArgument(format!(
                        "Nodata value {} is not representable as {}",
                        value, dtype
                    )))
                }
            }
        }
    }
}

fn round_trip(value: f64, dtype: ArrayDataType) -> f64 {
    match dtype {
        ArrayDataType::Uint8 => value as u8 as f64,
        ArrayDataType::Uint16 => value as u16 as f64,
        ArrayDataType::Int16 => value as i16 as f64,
        ArrayDataType::Int32 => value as i32 as f64,
        ArrayDataType::Uint32 => value as u32 as f64,
        ArrayDataType::Int64 => value as i64 as f64,
        ArrayDataType::Float32 => value as f32 as f64,
        ArrayDataType::Float64 => value,
    }
}
