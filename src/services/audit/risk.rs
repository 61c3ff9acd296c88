// Risk Classifier
// Fixed threshold tables mapping 0-100 scores to ordered risk tiers and labels.
//
// Two scales:
// - marker density, higher is worse
// - voice preservation, higher is better (tiers inverted)

use crate::models::RiskTier;

#[derive(Debug, Clone, Copy)]
pub struct Band {
    /// Inclusive lower bound for ascending-good scales, exclusive upper bound for density.
    pub bound: f64,
    pub tier: RiskTier,
    pub label: &'static str,
}

/// Density score `< bound` → tier; anything above the last bound is Critical.
pub const DENSITY_BANDS: [Band; 3] = [
    Band { bound: 20.0, tier: RiskTier::Low, label: "low" },
    Band { bound: 40.0, tier: RiskTier::Moderate, label: "moderate" },
    Band { bound: 60.0, tier: RiskTier::High, label: "high" },
];

/// Voice score `>= bound` → tier; anything below the last bound is Critical.
pub const VOICE_BANDS: [Band; 3] = [
    Band { bound: 70.0, tier: RiskTier::Low, label: "LOW - Voice Authentic" },
    Band { bound: 50.0, tier: RiskTier::Moderate, label: "MODERATE - Some Voice Loss" },
    Band { bound: 30.0, tier: RiskTier::High, label: "HIGH - Significant Homogenization" },
];

const VOICE_CRITICAL_LABEL: &str = "CRITICAL - Voice Homogenized";

pub fn classify_density(score: f64) -> RiskTier {
    DENSITY_BANDS
        .iter()
        .find(|b| score < b.bound)
        .map(|b| b.tier)
        .unwrap_or(RiskTier::Critical)
}

pub fn classify_voice(score: f64) -> RiskTier {
    VOICE_BANDS
        .iter()
        .find(|b| score >= b.bound)
        .map(|b| b.tier)
        .unwrap_or(RiskTier::Critical)
}

pub fn voice_label(tier: RiskTier) -> &'static str {
    VOICE_BANDS
        .iter()
        .find(|b| b.tier == tier)
        .map(|b| b.label)
        .unwrap_or(VOICE_CRITICAL_LABEL)
}

const INTERPRETATIONS: [(f64, &str); 4] = [
    (80.0, "EXCELLENT: AI was used as a tool while the authentic voice was kept. Original linguistic identity strongly preserved."),
    (60.0, "GOOD: AI editing occurred but the writer's voice is largely intact. Some authentic elements simplified."),
    (40.0, "MODERATE: Significant AI intervention. The writer's voice is present but compromised. Linguistic identity partially homogenized."),
    (20.0, "CONCERNING: Heavy AI presence. Much of the original voice replaced with generic language. Significant homogenization detected."),
];

const CRITICAL_INTERPRETATION: &str = "CRITICAL: Original voice largely erased. Text heavily AI-polished with minimal authentic voice remaining. Severe linguistic homogenization.";

/// Text label for an overall voice-preservation score.
pub fn interpret_score(score: f64) -> &'static str {
    INTERPRETATIONS
        .iter()
        .find(|(floor, _)| score >= *floor)
        .map(|(_, text)| *text)
        .unwrap_or(CRITICAL_INTERPRETATION)
}

const MARKER_EXPLANATIONS: [(f64, &str); 4] = [
    (20.0, "Low AI-ism markers. Text shows natural variation and authentic voice."),
    (40.0, "Some generic academic language detected, but voice remains distinct."),
    (60.0, "Moderate AI-ism detected. Consider replacing generic phrases with authentic voice."),
    (80.0, "High AI-ism. Text heavily relies on formulaic structures typical of AI generation."),
];

/// Explanation for a marker density score.
pub fn marker_explanation(score: f64) -> &'static str {
    MARKER_EXPLANATIONS
        .iter()
        .find(|(ceiling, _)| score < *ceiling)
        .map(|(_, text)| *text)
        .unwrap_or("Critical AI-ism. Text appears heavily AI-polished with minimal authentic voice.")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_density_tiers() {
        assert_eq!(classify_density(0.0), RiskTier::Low);
        assert_eq!(classify_density(19.99), RiskTier::Low);
        assert_eq!(classify_density(20.0), RiskTier::Moderate);
        assert_eq!(classify_density(59.9), RiskTier::High);
        assert_eq!(classify_density(60.0), RiskTier::Critical);
        assert_eq!(classify_density(100.0), RiskTier::Critical);
    }

    #[test]
    fn test_voice_tiers_are_inverted() {
        assert_eq!(classify_voice(100.0), RiskTier::Low);
        assert_eq!(classify_voice(70.0), RiskTier::Low);
        assert_eq!(classify_voice(69.99), RiskTier::Moderate);
        assert_eq!(classify_voice(30.0), RiskTier::High);
        assert_eq!(classify_voice(29.9), RiskTier::Critical);
        assert_eq!(classify_voice(0.0), RiskTier::Critical);
    }

    #[test]
    fn test_voice_labels() {
        assert_eq!(voice_label(classify_voice(100.0)), "LOW - Voice Authentic");
        assert_eq!(voice_label(RiskTier::High), "HIGH - Significant Homogenization");
        assert_eq!(voice_label(RiskTier::Critical), "CRITICAL - Voice Homogenized");
    }

    #[test]
    fn test_voice_tiers_monotonic() {
        let mut last = RiskTier::Low;
        for step in (0..=100).rev() {
            let tier = classify_voice(step as f64);
            assert!(tier >= last);
            last = tier;
        }
    }

    #[test]
    fn test_interpretation_bands() {
        assert!(interpret_score(100.0).starts_with("EXCELLENT"));
        assert!(interpret_score(60.0).starts_with("GOOD"));
        assert!(interpret_score(45.0).starts_with("MODERATE"));
        assert!(interpret_score(20.0).starts_with("CONCERNING"));
        assert!(interpret_score(19.9).starts_with("CRITICAL"));
    }

    #[test]
    fn test_marker_explanation_bands() {
        assert!(marker_explanation(0.0).starts_with("Low"));
        assert!(marker_explanation(79.9).starts_with("High"));
        assert!(marker_explanation(80.0).starts_with("Critical"));
    }
}
