// Audit Module
// Voice preservation audit core organized into specialized submodules:
// - aligner: Minimal-edit alignment of sentence and word sequences
// - change_classifier: Alignment ops to unchanged/added/removed/modified records
// - markers: Lexicon marker hits and formulaic density
// - signals: Per-document style and authenticity measurements
// - metrics: Named metric extractors over texts and change records
// - scoring: Weighted composite of the identity components
// - risk: Threshold tables for risk tiers and interpretations
// - comparison: Change statistics for a draft/revision pair
// - l2_voice: L2 structures, cultural imagery and voice loss
// - engine: Request-level composition with input bounding

pub mod aligner;
pub mod change_classifier;
pub mod markers;
pub mod signals;
pub mod metrics;
pub mod scoring;
pub mod risk;
pub mod comparison;
pub mod l2_voice;
pub mod engine;

pub use aligner::{align, align_bounded, align_tokens};
pub use change_classifier::{classify, validate_ops};
pub use markers::{count_markers, density_score, detect_markers, formulaic_index, raw_density, weighted_density};
pub use metrics::{default_extractors, extract_metrics, extract_with, MetricContext, MetricExtractor};
pub use scoring::{score, COMPONENT_WEIGHTS};
pub use risk::{classify_density, classify_voice, interpret_score, marker_explanation, voice_label};
pub use comparison::{build_change_set, build_report, AlignOptions};
pub use l2_voice::{detect_l2_structures, detect_voice_loss, l2_voice_report};
pub use engine::AuditEngine;
