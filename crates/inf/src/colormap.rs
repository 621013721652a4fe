use xml::reader::{EventReader, XmlEvent};

use crate::{
    color::{self, Color},
    Error, Result,
};

/// A single threshold entry of a colormap stylesheet
#[derive(Clone, Debug, PartialEq)]
pub struct ColorMapEntry {
    pub color: Color,
    pub opacity: f64,
    pub quantity: f64,
    pub label: Option<String>,
}

impl ColorMapEntry {
    pub fn new(color: Color, quantity: f64) -> Self {
        ColorMapEntry {
            color,
            opacity: 1.0,
            quantity,
            label: None,
        }
    }

    fn render_color(&self) -> Color {
        self.color.with_alpha((self.opacity * 255.0).round().clamp(0.0, 255.0) as u8)
    }
}

/// Ordered value -> color mapping with floor lookup semantics:
/// a value is colored using the entry with the greatest quantity that does not exceed it.
/// An optional nodata quantity is matched exactly, before the threshold lookup.
#[derive(Clone, Debug, Default)]
pub struct ColorMap {
    entries: Vec<ColorMapEntry>,
    nodata: Option<ColorMapEntry>,
}

impl ColorMap {
    pub fn new(mut entries: Vec<ColorMapEntry>, nodata: Option<ColorMapEntry>) -> Self {
        entries.sort_by(|lhs, rhs| lhs.quantity.total_cmp(&rhs.quantity));
        ColorMap { entries, nodata }
    }

    /// Parses a colormap stylesheet: repeated `ColorMapEntry` elements with
    /// `color` and `quantity` attributes and optional `opacity` and `label`.
    /// An entry labeled "nodata" configures the nodata mapping instead of a threshold.
    pub fn from_stylesheet(doc: &str) -> Result<Self> {
        let mut entries = Vec::new();
        let mut nodata = None;

        for event in EventReader::from_str(doc) {
            let event = event.map_err(|err| Error::Parse(format!("Invalid colormap stylesheet: {}", err)))?;
            let XmlEvent::StartElement { name, attributes, .. } = event else {
                continue;
            };

            if name.local_name != "ColorMapEntry" {
                continue;
            }

            let mut entry = ColorMapEntry::new(color::TRANSPARENT, f64::NAN);
            for attr in attributes {
                match attr.name.local_name.as_str() {
                    "color" => entry.color = Color::from_hex(&attr.value)?,
                    "quantity" => entry.quantity = attr.value.trim().parse()?,
                    "opacity" => entry.opacity = attr.value.trim().parse()?,
                    "label" => entry.label = Some(attr.value),
                    _ => (),
                }
            }

            if entry.quantity.is_nan() {
                return Err(Error::Parse("Colormap entry without quantity".to_string()));
            }

            if entry.label.as_deref() == Some("nodata") {
                nodata = Some(entry);
            } else {
                entries.push(entry);
            }
        }

        Ok(ColorMap::new(entries, nodata))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn entries(&self) -> &[ColorMapEntry] {
        &self.entries
    }

    pub fn nodata_quantity(&self) -> Option<f64> {
        self.nodata.as_ref().map(|entry| entry.quantity)
    }

    pub fn color_for_value(&self, value: f64) -> Color {
        if let Some(nodata) = &self.nodata {
            if value == nodata.quantity {
                return nodata.render_color();
            }
        }

        // Floor lookup, values below the lowest threshold clamp to the first entry
        let index = self.entries.partition_point(|entry| entry.quantity <= value);
        match self.entries.get(index.saturating_sub(1)) {
            Some(entry) => entry.render_color(),
            None => color::TRANSPARENT,
        }
    }
}
