use std::collections::HashMap;

use geo::{crs::Epsg, RasterSize};
use inf::{ColorMap, ProgressListener};

use crate::{Error, Raster, ResampleMethod, Result};

/// Well known operation names
pub mod operations {
    pub const REPROJECT: &str = "reproject";
    pub const RESAMPLE: &str = "resample";
    pub const COLOR_MAP: &str = "colormap";
    pub const GRAYSCALE: &str = "grayscale";
}

/// Well known parameter keys
pub mod params {
    pub const TARGET_CRS: &str = "target_crs";
    pub const TARGET_BOUNDS: &str = "target_bounds";
    pub const TARGET_SIZE: &str = "target_size";
    pub const METHOD: &str = "method";
    pub const COLOR_MAP: &str = "colormap";
    pub const BAND: &str = "band";
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Priority {
    Low,
    Normal,
    High,
    Highest,
}

#[derive(Debug, Clone)]
pub enum ParamValue {
    Int(i64),
    Float(f64),
    Text(String),
    Crs(Epsg),
    Size(RasterSize),
    Bounds(geo::Rect<f64>),
    Method(ResampleMethod),
    ColorMap(ColorMap),
}

/// Operation parameter map with typed accessors
#[derive(Debug, Clone, Default)]
pub struct Params(HashMap<String, ParamValue>);

pub type Hints = HashMap<String, String>;

impl Params {
    pub fn new() -> Self {
        Params::default()
    }

    pub fn set<S: Into<String>>(mut self, key: S, value: ParamValue) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    pub fn insert<S: Into<String>>(&mut self, key: S, value: ParamValue) {
        self.0.insert(key.into(), value);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&ParamValue> {
        self.0.get(key)
    }

    pub fn crs(&self, key: &str) -> Option<Epsg> {
        match self.0.get(key) {
            Some(ParamValue::Crs(epsg)) => Some(*epsg),
            Some(ParamValue::Int(code)) => Some(Epsg::new(*code as u32)),
            _ => None,
        }
    }

    pub fn int(&self, key: &str) -> Option<i64> {
        match self.0.get(key) {
            Some(ParamValue::Int(val)) => Some(*val),
            _ => None,
        }
    }

    pub fn size(&self, key: &str) -> Option<RasterSize> {
        match self.0.get(key) {
            Some(ParamValue::Size(size)) => Some(*size),
            _ => None,
        }
    }

    pub fn bounds(&self, key: &str) -> Option<geo::Rect<f64>> {
        match self.0.get(key) {
            Some(ParamValue::Bounds(bounds)) => Some(*bounds),
            _ => None,
        }
    }

    pub fn method(&self, key: &str) -> Option<ResampleMethod> {
        match self.0.get(key) {
            Some(ParamValue::Method(method)) => Some(*method),
            _ => None,
        }
    }

    pub fn colormap(&self, key: &str) -> Option<&ColorMap> {
        match self.0.get(key) {
            Some(ParamValue::ColorMap(cmap)) => Some(cmap),
            _ => None,
        }
    }

    /// Fills in the keys of `defaults` that are not present
    pub fn merge_defaults(&mut self, defaults: Params) {
        for (key, value) in defaults.0 {
            self.0.entry(key).or_insert(value);
        }
    }
}

/// A named, pluggable pixel processing operation
pub trait RasterOp: Send + Sync {
    fn operation_name(&self) -> &'static str;

    fn priority(&self) -> Priority {
        Priority::Normal
    }

    fn default_hints(&self) -> Hints {
        Hints::default()
    }

    fn default_params(&self) -> Params {
        Params::default()
    }

    /// Whether the parameter map carries everything the operation needs
    fn validate_params(&self, params: &Params) -> bool;

    fn execute(&self, raster: &mut Raster, params: &Params, hints: &Hints, progress: Option<&dyn ProgressListener>) -> Result<()>;
}

/// Groups the discovered operation implementations by name and dispatches a
/// request to the highest priority implementation for that name.
#[derive(Default)]
pub struct RasterOpRegistry {
    ops: Vec<Box<dyn RasterOp>>,
}

impl RasterOpRegistry {
    pub fn new() -> Self {
        RasterOpRegistry::default()
    }

    /// The registry with the built-in operations registered
    pub fn with_default_ops() -> Self {
        let mut registry = RasterOpRegistry::new();
        registry.register(Box::new(crate::ReprojectOp));
        registry.register(Box::new(crate::ResampleOp));
        registry.register(Box::new(crate::ColorMapOp));
        registry.register(Box::new(crate::GrayscaleOp));
        registry
    }

    pub fn register(&mut self, op: Box<dyn RasterOp>) {
        self.ops.push(op);
    }

    /// The implementation with the strictly highest priority for the name.
    /// Priority ties keep the first registered implementation.
    fn select(&self, name: &str) -> Option<&dyn RasterOp> {
        let mut best: Option<&dyn RasterOp> = None;
        for op in self.ops.iter().filter(|op| op.operation_name() == name) {
            match best {
                Some(current) if op.priority() <= current.priority() => (),
                _ => best = Some(op.as_ref()),
            }
        }

        best
    }

    /// Executes the named operation against the raster.
    /// Requesting a name with no registered implementation is a hard failure.
    pub fn execute(
        &self,
        raster: &mut Raster,
        name: &str,
        params: &Params,
        hints: &Hints,
        progress: Option<&dyn ProgressListener>,
    ) -> Result<()> {
        let op = self.select(name).ok_or_else(|| Error::UnsupportedOperation(name.to_string()))?;

        let mut merged_params = params.clone();
        merged_params.merge_defaults(op.default_params());

        let mut merged_hints = op.default_hints();
        merged_hints.extend(hints.clone());

        if !op.validate_params(&merged_params) {
            return Err(Error::InvalidArgument(format!("Invalid parameters for operation {}", name)));
        }

        log::debug!("Executing raster operation {}", name);
        op.execute(raster, &merged_params, &merged_hints, progress)
    }
}
