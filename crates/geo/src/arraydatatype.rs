/// The numeric datatype of packed raster samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(u8)]
pub enum ArrayDataType {
    Uint8 = 0,
    Uint16 = 1,
    Int16 = 2,
    Int32 = 3,
    Uint32 = 4,
    Int64 = 5,
    Float32 = 6,
    Float64 = 7,
}

impl ArrayDataType {
    /// The sample width in bytes
    pub const fn size(&self) -> usize {
        match self {
            Self::Uint8 => 1,
            Self::Uint16 | Self::Int16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Float64 => 8,
        }
    }

    pub const fn is_floating_point(&self) -> bool {
        matches!(self, Self::Float32 | Self::Float64)
    }

    /// The conventional nodata sentinel for the datatype:
    /// unsigned types use their maximum, signed types their minimum, floats use NaN
    pub fn default_nodata_value(&self) -> f64 {
        match self {
            Self::Uint8 => f64::from(u8::MAX),
            Self::Uint16 => f64::from(u16::MAX),
            Self::Int16 => f64::from(i16::MIN),
            Self::Int32 => f64::from(i32::MIN),
            Self::Uint32 => f64::from(u32::MAX),
            Self::Int64 => i64::MIN as f64,
            Self::Float32 | Self::Float64 => f64::NAN,
        }
    }

    pub fn to_str(&self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Uint32 => "uint32",
            Self::Int64 => "int64",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl std::fmt::Display for ArrayDataType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}
