use serde::Serialize;

pub const HIGH_CONFIDENCE: f64 = 0.7;
pub const MEDIUM_CONFIDENCE: f64 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl ConfidenceTier {
    /// Lower bounds are inclusive; anything non-finite counts as `Low`.
    pub fn from_confidence(confidence: f64) -> Self {
        if !confidence.is_finite() {
            return ConfidenceTier::Low;
        }
        if confidence >= HIGH_CONFIDENCE {
            ConfidenceTier::High
        } else if confidence >= MEDIUM_CONFIDENCE {
            ConfidenceTier::Medium
        } else {
            ConfidenceTier::Low
        }
    }

    pub fn badge(&self, percent: u8) -> String {
        match self {
            ConfidenceTier::High => format!("✓ {percent}% confidence"),
            ConfidenceTier::Medium => format!("⚠ {percent}% confidence"),
            ConfidenceTier::Low => format!("✗ {percent}% confidence"),
        }
    }
}

pub fn confidence_percent(confidence: f64) -> u8 {
    if !confidence.is_finite() {
        return 0;
    }
    (confidence.clamp(0.0, 1.0) * 100.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tier_boundaries_are_inclusive_on_the_lower_bound() {
        let tiers: Vec<ConfidenceTier> = [0.39, 0.40, 0.69, 0.70]
            .into_iter()
            .map(ConfidenceTier::from_confidence)
            .collect();
        assert_eq!(
            tiers,
            [
                ConfidenceTier::Low,
                ConfidenceTier::Medium,
                ConfidenceTier::Medium,
                ConfidenceTier::High
            ]
        );
    }

    #[test]
    fn out_of_range_scores_still_land_in_a_tier() {
        assert_eq!(ConfidenceTier::from_confidence(f64::NAN), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_confidence(-0.2), ConfidenceTier::Low);
        assert_eq!(ConfidenceTier::from_confidence(1.3), ConfidenceTier::High);
        assert_eq!(confidence_percent(1.3), 100);
        assert_eq!(confidence_percent(0.825), 83);
    }
}
