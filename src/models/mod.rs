// VoiceAudit Data Models
// Records produced by the audit engine. Everything here is per-request and serializable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============ Alignment ============

/// Half-open index range `[start, end)` into a unit sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub struct Span {
    pub start: usize,
    pub end: usize,
}

impl Span {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-length span positioned at `at`.
    pub fn empty_at(at: usize) -> Self {
        Self { start: at, end: at }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpKind {
    Equal,
    Replace,
    Delete,
    Insert,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlignmentOp {
    pub kind: OpKind,
    pub source: Span,
    pub target: Span,
}

impl AlignmentOp {
    pub fn equal(source: Span, target: Span) -> Self {
        Self { kind: OpKind::Equal, source, target }
    }

    pub fn replace(source: Span, target: Span) -> Self {
        Self { kind: OpKind::Replace, source, target }
    }

    pub fn delete(source: Span, target_at: usize) -> Self {
        Self {
            kind: OpKind::Delete,
            source,
            target: Span::empty_at(target_at),
        }
    }

    pub fn insert(source_at: usize, target: Span) -> Self {
        Self {
            kind: OpKind::Insert,
            source: Span::empty_at(source_at),
            target,
        }
    }
}

// ============ Change Records ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChangeKind {
    Unchanged,
    Added,
    Removed,
    Modified,
}

/// One sentence or word, by index into its sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitRef {
    pub index: usize,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeRecord {
    pub kind: ChangeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<UnitRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<UnitRef>,
    /// Source index when a source unit is present, otherwise target index.
    pub position: usize,
}

impl ChangeRecord {
    pub fn source_text(&self) -> Option<&str> {
        self.source.as_ref().map(|u| u.text.as_str())
    }

    pub fn target_text(&self) -> Option<&str> {
        self.target.as_ref().map(|u| u.text.as_str())
    }
}

/// Change records at both granularities for one document pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeSet {
    pub sentences: Vec<ChangeRecord>,
    pub words: Vec<ChangeRecord>,
}

pub fn count_kind(records: &[ChangeRecord], kind: ChangeKind) -> usize {
    records.iter().filter(|r| r.kind == kind).count()
}

// ============ Metrics ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Score(f64),
    Label(String),
}

/// Named metric → value. Ordered so serialized output is stable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricSet(BTreeMap<String, MetricValue>);

impl MetricSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: MetricValue) {
        self.0.insert(name.into(), value);
    }

    pub fn insert_score(&mut self, name: impl Into<String>, value: f64) {
        self.insert(name, MetricValue::Score(value));
    }

    pub fn insert_count(&mut self, name: impl Into<String>, value: u64) {
        self.insert(name, MetricValue::Count(value));
    }

    pub fn get(&self, name: &str) -> Option<&MetricValue> {
        self.0.get(name)
    }

    /// Numeric view of a metric; counts widen to f64.
    pub fn score(&self, name: &str) -> Option<f64> {
        match self.0.get(name)? {
            MetricValue::Score(v) => Some(*v),
            MetricValue::Count(c) => Some(*c as f64),
            MetricValue::Label(_) => None,
        }
    }

    pub fn count(&self, name: &str) -> Option<u64> {
        match self.0.get(name)? {
            MetricValue::Count(c) => Some(*c),
            _ => None,
        }
    }

    pub fn label(&self, name: &str) -> Option<&str> {
        match self.0.get(name)? {
            MetricValue::Label(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &MetricValue)> {
        self.0.iter()
    }
}

impl FromIterator<(String, MetricValue)> for MetricSet {
    fn from_iter<I: IntoIterator<Item = (String, MetricValue)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

// ============ Risk ============

/// Ordered from best to worst.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskTier {
    /// Same text as the serialized form.
    pub fn as_str(self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::Moderate => "moderate",
            RiskTier::High => "high",
            RiskTier::Critical => "critical",
        }
    }
}

// ============ Composite ============

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ComponentScores {
    pub lexical_identity: f64,
    pub structural_identity: f64,
    pub stylistic_identity: f64,
    pub voice_consistency: f64,
    pub authenticity_markers: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompositeResult {
    pub component_scores: ComponentScores,
    pub overall_score: f64,
    pub risk_tier: RiskTier,
    /// Human-readable tier label, e.g. "LOW - Voice Authentic".
    pub risk_level: String,
    pub interpretation: String,
}

// ============ Markers ============

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhraseMatch {
    /// UTF-8 byte offset into the analyzed text.
    pub start: usize,
    pub end: usize,
    pub phrase: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentenceMatch {
    pub sentence_index: usize,
    pub sentence: String,
    pub pattern: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkerReport {
    pub high_frequency_phrases: Vec<PhraseMatch>,
    pub formulaic_structures: Vec<SentenceMatch>,
    pub hedging_qualifiers: Vec<PhraseMatch>,
    pub academic_cliches: Vec<PhraseMatch>,
    pub transition_words: Vec<PhraseMatch>,
    pub generic_openers: Vec<PhraseMatch>,
    pub category_counts: BTreeMap<String, usize>,
    pub raw_density: f64,
    pub word_count: usize,
    pub ai_ism_score: f64,
    pub risk_level: RiskTier,
    pub explanation: String,
    pub formulaic_index: f64,
}

// ============ Comparison ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonSummary {
    pub total_additions: usize,
    pub total_deletions: usize,
    pub total_modifications: usize,
    pub total_sentences_original: usize,
    pub total_sentences_edited: usize,
    pub change_percentage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadabilityImpact {
    pub original_avg_word_length: f64,
    pub edited_avg_word_length: f64,
    pub complexity_change: String,
    pub complexity_magnitude: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonStatistics {
    pub original_word_count: usize,
    pub edited_word_count: usize,
    pub word_count_change: i64,
    pub original_char_count: usize,
    pub edited_char_count: usize,
    pub char_count_change: i64,
    pub added_words: usize,
    pub removed_words: usize,
    pub readability_impact: ReadabilityImpact,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComparisonReport {
    pub summary: ComparisonSummary,
    pub statistics: ComparisonStatistics,
    pub sentence_changes: Vec<ChangeRecord>,
    pub word_changes: Vec<ChangeRecord>,
}

// ============ Voice Preservation ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailedMetrics {
    pub original_word_count: u64,
    pub edited_word_count: u64,
    pub retained_unique_words: u64,
    pub retained_sentence_patterns: u64,
    pub ai_phrase_infiltration: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoicePreservationReport {
    #[serde(flatten)]
    pub composite: CompositeResult,
    pub detailed_metrics: DetailedMetrics,
    pub metrics: MetricSet,
}

// ============ L2 Voice ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StructureKind {
    ObjectVerbOrdering,
    AspectMarking,
    TopicProminent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PreservationValue {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2Structure {
    pub kind: StructureKind,
    pub sentence_index: usize,
    pub sentence: String,
    pub preservation_value: PreservationValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CulturalReference {
    /// Metaphor family from the lexicon, e.g. "family" or "nature".
    pub category: String,
    pub marker: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L1InterferenceMarker {
    pub l1_language: String,
    pub marker: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2VoiceAnalysis {
    pub structures: Vec<L2Structure>,
    pub cultural_references: Vec<CulturalReference>,
    pub l1_interference_markers: Vec<L1InterferenceMarker>,
    pub voice_strength_score: f64,
    pub authenticity_indicators: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceLossInstance {
    pub original: String,
    pub loss_severity: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoiceLossAnalysis {
    pub lost_structures: Vec<String>,
    pub lost_cultural_references: Vec<String>,
    pub lost_l1_markers: Vec<String>,
    pub total_voice_loss: f64,
    pub specific_instances: Vec<VoiceLossInstance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct L2VoiceReport {
    pub structure_analysis: L2VoiceAnalysis,
    pub voice_loss_analysis: VoiceLossAnalysis,
}

// ============ Full Audit ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditSummary {
    pub overall_score: f64,
    pub risk_level: String,
    pub aitism_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditReport {
    pub source_markers: MarkerReport,
    pub target_markers: MarkerReport,
    pub l2_voice: L2VoiceReport,
    pub voice_preservation: VoicePreservationReport,
    pub comparison: ComparisonReport,
    pub summary: AuditSummary,
}
