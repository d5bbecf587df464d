//! Display formatting shared by every panel that shows dollar or count values.

use crate::GuidanceEntry;

/// Shown wherever a number is missing or not finite.
pub const PLACEHOLDER: &str = "—";

fn magnitude(value: f64) -> String {
    let abs = value.abs();
    if abs >= 1_000_000_000.0 {
        format!("{:.2}B", value / 1_000_000_000.0)
    } else if abs >= 1_000_000.0 {
        format!("{:.2}M", value / 1_000_000.0)
    } else if abs >= 1_000.0 {
        format!("{:.1}K", value / 1_000.0)
    } else {
        format!("{value:.2}")
    }
}

fn with_unit(formatted: String, unit: Option<&str>) -> String {
    match unit.map(str::trim).filter(|u| !u.is_empty()) {
        Some(unit) => format!("{formatted} {unit}"),
        None => formatted,
    }
}

/// `1.50B`, `2.25M`, `3.4K`, `12.00`, or the placeholder; unit appended after a space.
pub fn format_magnitude(value: Option<f64>, unit: Option<&str>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => with_unit(magnitude(v), unit),
        None => PLACEHOLDER.to_string(),
    }
}

/// Guidance range (`low – high`), a single bound, or the point value.
pub fn format_guidance_value(entry: &GuidanceEntry) -> Option<String> {
    let finite = |v: Option<f64>| v.filter(|v| v.is_finite()).map(magnitude);
    let low = finite(entry.value_low);
    let high = finite(entry.value_high);

    let text = match (low, high) {
        (Some(low), Some(high)) => format!("{low} – {high}"),
        (Some(bound), None) | (None, Some(bound)) => bound,
        (None, None) => finite(entry.value_point)?,
    };
    Some(with_unit(text, entry.unit.as_deref()))
}

/// Signed percent with two decimals, e.g. `+4.20%`.
pub fn format_percent(value: Option<f64>) -> String {
    match value.filter(|v| v.is_finite()) {
        Some(v) => format!("{v:+.2}%"),
        None => PLACEHOLDER.to_string(),
    }
}

/// SVG polyline points scaled into a `width` x `height` box.
pub fn sparkline_points(values: &[f64], width: f64, height: f64) -> String {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return String::new();
    }

    let min = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let max = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    let step = if finite.len() > 1 {
        width / (finite.len() - 1) as f64
    } else {
        0.0
    };

    finite
        .iter()
        .enumerate()
        .map(|(idx, v)| {
            let x = step * idx as f64;
            let y = if span == 0.0 {
                height / 2.0
            } else {
                height - (v - min) / span * height
            };
            format!("{x:.1},{y:.1}")
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magnitude_thresholds() {
        assert_eq!(format_magnitude(Some(999.5), None), "999.50");
        assert_eq!(format_magnitude(Some(1_500.0), None), "1.5K");
        assert_eq!(format_magnitude(Some(2_500_000.0), None), "2.50M");
        assert_eq!(format_magnitude(Some(3_200_000_000.0), None), "3.20B");
        assert_eq!(format_magnitude(Some(-4_200_000.0), None), "-4.20M");
        assert_eq!(format_magnitude(Some(0.0), None), "0.00");
    }

    #[test]
    fn magnitude_placeholder_and_unit() {
        assert_eq!(format_magnitude(None, Some("USD")), PLACEHOLDER);
        assert_eq!(format_magnitude(Some(f64::NAN), None), PLACEHOLDER);
        assert_eq!(format_magnitude(Some(f64::INFINITY), None), PLACEHOLDER);
        assert_eq!(format_magnitude(Some(1.5e9), Some("USD")), "1.50B USD");
        assert_eq!(format_magnitude(Some(12.0), Some("  ")), "12.00");
    }

    #[test]
    fn magnitude_is_stable() {
        let first = format_magnitude(Some(123_456.0), Some("shares"));
        let second = format_magnitude(Some(123_456.0), Some("shares"));
        assert_eq!(first, second);
        assert_eq!(first, "123.5K shares");
    }

    #[test]
    fn guidance_value_prefers_range() {
        let range = GuidanceEntry {
            value_low: Some(10e9),
            value_high: Some(12e9),
            value_point: Some(11e9),
            unit: Some("USD".to_string()),
            ..Default::default()
        };
        assert_eq!(format_guidance_value(&range).as_deref(), Some("10.00B – 12.00B USD"));

        let high_only = GuidanceEntry {
            value_high: Some(0.35),
            ..Default::default()
        };
        assert_eq!(format_guidance_value(&high_only).as_deref(), Some("0.35"));

        let point = GuidanceEntry {
            value_point: Some(5.0),
            unit: Some("%".to_string()),
            ..Default::default()
        };
        assert_eq!(format_guidance_value(&point).as_deref(), Some("5.00 %"));

        assert_eq!(format_guidance_value(&GuidanceEntry::default()), None);
    }

    #[test]
    fn percent_is_signed() {
        assert_eq!(format_percent(Some(4.2)), "+4.20%");
        assert_eq!(format_percent(Some(-1.0)), "-1.00%");
        assert_eq!(format_percent(None), PLACEHOLDER);
    }

    #[test]
    fn sparkline_scales_into_box() {
        assert_eq!(sparkline_points(&[], 100.0, 20.0), "");
        assert_eq!(sparkline_points(&[1.0, 3.0], 100.0, 20.0), "0.0,20.0 100.0,0.0");
        assert_eq!(sparkline_points(&[2.0, 2.0], 10.0, 20.0), "0.0,10.0 10.0,10.0");
    }
}
