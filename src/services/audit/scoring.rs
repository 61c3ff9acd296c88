// Composite Scorer
// Convex combination of the five identity components into one 0-100 score.

use super::markers::round2;
use super::metrics::{
    AUTHENTICITY_MARKERS, LEXICAL_IDENTITY, STRUCTURAL_IDENTITY, STYLISTIC_IDENTITY,
    VOICE_CONSISTENCY,
};
use super::risk::{classify_voice, interpret_score, voice_label};
use crate::error::{AuditError, AuditResult};
use crate::models::{ComponentScores, CompositeResult, MetricSet};
use tracing::error;

/// Component metric → weight. Weights sum to 1.0.
pub const COMPONENT_WEIGHTS: [(&str, f64); 5] = [
    (LEXICAL_IDENTITY, 0.20),
    (STRUCTURAL_IDENTITY, 0.20),
    (STYLISTIC_IDENTITY, 0.25),
    (VOICE_CONSISTENCY, 0.20),
    (AUTHENTICITY_MARKERS, 0.15),
];

fn violation(message: String) -> AuditError {
    error!(detail = %message, "scorer.contract_violation");
    AuditError::ContractViolation(message)
}

fn component(metrics: &MetricSet, name: &str) -> AuditResult<f64> {
    let value = metrics
        .score(name)
        .ok_or_else(|| violation(format!("missing component metric {}", name)))?;
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(violation(format!("component {} out of range: {}", name, value)));
    }
    Ok(value)
}

/// Weighted overall score, risk tier and interpretation.
///
/// Components must already lie in [0, 100]; anything else is reported as a
/// `ContractViolation` rather than clamped.
pub fn score(metrics: &MetricSet) -> AuditResult<CompositeResult> {
    let mut overall = 0.0;
    for (name, weight) in COMPONENT_WEIGHTS {
        overall += component(metrics, name)? * weight;
    }
    // Guards float drift at the top of the range.
    let overall = round2(overall).min(100.0);

    let component_scores = ComponentScores {
        lexical_identity: round2(component(metrics, LEXICAL_IDENTITY)?),
        structural_identity: round2(component(metrics, STRUCTURAL_IDENTITY)?),
        stylistic_identity: round2(component(metrics, STYLISTIC_IDENTITY)?),
        voice_consistency: round2(component(metrics, VOICE_CONSISTENCY)?),
        authenticity_markers: round2(component(metrics, AUTHENTICITY_MARKERS)?),
    };

    let risk_tier = classify_voice(overall);
    Ok(CompositeResult {
        component_scores,
        overall_score: overall,
        risk_tier,
        risk_level: voice_label(risk_tier).to_string(),
        interpretation: interpret_score(overall).to_string(),
    })
}
