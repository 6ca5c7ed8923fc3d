use std::collections::HashMap;

/// Host-side parameter range, mirroring the plugin's normalisable range with
/// a skew factor (skew < 1 spends more of the travel on the low end).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalisableRange {
    pub start: f64,
    pub end: f64,
    pub skew: f64,
}

impl NormalisableRange {
    pub fn new(start: f64, end: f64, skew: f64) -> Self {
        let skew = if skew.is_finite() && skew > 0.0 { skew } else { 1.0 };
        Self { start, end, skew }
    }

    pub fn linear(start: f64, end: f64) -> Self {
        Self::new(start, end, 1.0)
    }

    fn span(&self) -> Option<f64> {
        let span = self.end - self.start;
        (span > 0.0).then_some(span)
    }

    pub fn to_normalised(&self, value: f64) -> f64 {
        let Some(span) = self.span() else {
            return 0.0;
        };
        let proportion = ((value - self.start) / span).clamp(0.0, 1.0);
        if self.skew == 1.0 {
            proportion
        } else {
            proportion.powf(self.skew)
        }
    }

    pub fn from_normalised(&self, normalised: f64) -> f64 {
        let Some(span) = self.span() else {
            return self.start;
        };
        let normalised = normalised.clamp(0.0, 1.0);
        let proportion = if self.skew == 1.0 {
            normalised
        } else {
            normalised.powf(1.0 / self.skew)
        };
        self.start + span * proportion
    }
}

/// Normalised value of every parameter, as returned by the bulk fetch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParameterSnapshot {
    values: HashMap<String, f64>,
}

impl ParameterSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, param_id: impl Into<String>, normalised: f64) {
        self.values.insert(param_id.into(), normalised);
    }

    pub fn get(&self, param_id: &str) -> Option<f64> {
        self.values.get(param_id).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.values.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

impl FromIterator<(String, f64)> for ParameterSnapshot {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        Self {
            values: iter.into_iter().collect(),
        }
    }
}

/// Choice index for a normalised choice parameter with `count` entries.
pub fn choice_index_from_normalised(normalised: f64, count: usize) -> usize {
    if count <= 1 {
        return 0;
    }
    let last = (count - 1) as f64;
    (normalised.clamp(0.0, 1.0) * last).round() as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_range_maps_endpoints_and_midpoint() {
        let range = NormalisableRange::linear(-24.0, 24.0);
        assert_eq!(range.to_normalised(-24.0), 0.0);
        assert_eq!(range.to_normalised(24.0), 1.0);
        assert_eq!(range.to_normalised(0.0), 0.5);
        assert_eq!(range.from_normalised(0.5), 0.0);
        assert_eq!(range.to_normalised(100.0), 1.0);
    }

    #[test]
    fn skewed_range_favours_low_end() {
        let cutoff = NormalisableRange::new(20.0, 20_000.0, 0.3);
        let mid = cutoff.from_normalised(0.5);
        assert!(mid < 10_010.0 / 2.0, "skew should pull midpoint down, got {mid}");
        assert!((cutoff.to_normalised(mid) - 0.5).abs() < 1e-9);
        assert_eq!(cutoff.from_normalised(0.0), 20.0);
        assert!((cutoff.from_normalised(1.0) - 20_000.0).abs() < 1e-9);
    }

    #[test]
    fn degenerate_range_is_inert() {
        let range = NormalisableRange::linear(5.0, 5.0);
        assert_eq!(range.to_normalised(5.0), 0.0);
        assert_eq!(range.from_normalised(0.7), 5.0);
        assert_eq!(NormalisableRange::new(0.0, 1.0, -2.0).skew, 1.0);
    }

    #[test]
    fn choice_index_rounds_to_nearest_entry() {
        assert_eq!(choice_index_from_normalised(0.0, 4), 0);
        assert_eq!(choice_index_from_normalised(1.0 / 3.0, 4), 1);
        assert_eq!(choice_index_from_normalised(0.66, 4), 2);
        assert_eq!(choice_index_from_normalised(1.0, 4), 3);
        assert_eq!(choice_index_from_normalised(1.5, 4), 3);
        assert_eq!(choice_index_from_normalised(0.9, 1), 0);
    }
}
