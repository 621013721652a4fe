use crate::color::Color;

/// Minimum and maximum over a sample stream, NaN samples are skipped.
/// Returns `None` when the stream contains no valid samples.
pub fn value_range(samples: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut range: Option<(f64, f64)> = None;
    for sample in samples {
        if sample.is_nan() {
            continue;
        }

        range = Some(match range {
            Some((min, max)) => (min.min(sample), max.max(sample)),
            None => (sample, sample),
        });
    }

    range
}

/// Maps a sample onto [0, 255] using `256 * (value - min) / (max - min)`,
/// clamped so the maximum sample lands on 255. A degenerate range maps to 0.
pub fn scale(value: f64, min: f64, max: f64) -> u8 {
    if !(max > min) || value.is_nan() {
        return 0;
    }

    (256.0 * (value - min) / (max - min)).round().clamp(0.0, 255.0) as u8
}

pub fn color_for_value(value: f64, min: f64, max: f64) -> Color {
    Color::grey(scale(value, min, max))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn byte_samples_map_onto_their_own_values() {
        let samples = [0.0, 85.0, 170.0, 255.0];
        let (min, max) = value_range(samples.iter().copied()).unwrap();
        assert_eq!((min, max), (0.0, 255.0));

        let greys: Vec<u8> = samples.iter().map(|&v| scale(v, min, max)).collect();
        assert_eq!(greys, vec![0, 85, 171, 255]);
    }

    #[test]
    fn degenerate_range_maps_to_black() {
        assert_eq!(scale(42.0, 42.0, 42.0), 0);
        assert_eq!(color_for_value(42.0, 42.0, 42.0), Color::grey(0));
    }

    #[test]
    fn nan_samples_are_skipped() {
        let (min, max) = value_range([f64::NAN, 3.0, 1.0, f64::NAN].into_iter()).unwrap();
        assert_eq!((min, max), (1.0, 3.0));
        assert!(value_range([f64::NAN].into_iter()).is_none());
    }
}
