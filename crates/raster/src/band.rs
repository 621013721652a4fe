use geo::{ArrayDataType, Nodata};
use inf::ColorMap;

/// The display role of a raster band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ColorInterpretation {
    #[default]
    Undefined,
    Gray,
    Red,
    Green,
    Blue,
    Other,
}

/// Immutable descriptor of a single raster channel
#[derive(Debug, Clone)]
pub struct Band {
    name: String,
    dtype: ArrayDataType,
    interpretation: ColorInterpretation,
    colormap: Option<ColorMap>,
    nodata: Nodata,
}

impl Band {
    pub fn new<S: Into<String>>(name: S, dtype: ArrayDataType) -> Self {
        Band {
            name: name.into(),
            dtype,
            interpretation: ColorInterpretation::Undefined,
            colormap: None,
            nodata: Nodata::NONE,
        }
    }

    pub fn with_interpretation(mut self, interpretation: ColorInterpretation) -> Self {
        self.interpretation = interpretation;
        self
    }

    pub fn with_colormap(mut self, colormap: ColorMap) -> Self {
        self.colormap = Some(colormap);
        self
    }

    pub fn with_nodata(mut self, nodata: Nodata) -> Self {
        self.nodata = nodata;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dtype(&self) -> ArrayDataType {
        self.dtype
    }

    pub fn interpretation(&self) -> ColorInterpretation {
        self.interpretation
    }

    pub fn colormap(&self) -> Option<&ColorMap> {
        self.colormap.as_ref()
    }

    pub fn nodata(&self) -> Nodata {
        self.nodata
    }
}
