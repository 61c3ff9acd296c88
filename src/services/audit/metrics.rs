// Metric Extractor
// Named, independent metric groups computed from the two texts, the lexicon and
// the change records. Every extractor is pure; the set of extractors is a table.

use super::markers::{density_score, detect_markers, round2};
use super::signals::{
    authentic_marker_count, capitalization_ratio, contraction_density, l2_preservation_bonus,
    punctuation_richness,
};
use crate::models::{count_kind, ChangeKind, ChangeRecord, ChangeSet, MetricSet, MetricValue};
use crate::services::lexicon::{Lexicon, MarkerCategory};
use crate::services::text_processor::{
    split_sections, split_sentences, split_words, tokenize_words, vocabulary,
};
use std::collections::HashSet;

// ============ Metric names ============

pub const LEXICAL_IDENTITY: &str = "lexical_identity";
pub const STRUCTURAL_IDENTITY: &str = "structural_identity";
pub const STYLISTIC_IDENTITY: &str = "stylistic_identity";
pub const VOICE_CONSISTENCY: &str = "voice_consistency";
pub const AUTHENTICITY_MARKERS: &str = "authenticity_markers";

pub const INJECTED_GENERIC_PHRASES: &str = "injected_generic_phrases";
pub const SOURCE_MEAN_SENTENCE_LENGTH: &str = "source_mean_sentence_length";
pub const TARGET_MEAN_SENTENCE_LENGTH: &str = "target_mean_sentence_length";
pub const PUNCTUATION_IDENTITY: &str = "punctuation_identity";
pub const CAPITALIZATION_IDENTITY: &str = "capitalization_identity";
pub const CONTRACTION_IDENTITY: &str = "contraction_identity";
pub const SECTION_PAIRS: &str = "section_pairs";
pub const SOURCE_AUTHENTIC_MARKERS: &str = "source_authentic_markers";
pub const TARGET_AUTHENTIC_MARKERS: &str = "target_authentic_markers";
pub const L2_PRESERVATION_BONUS: &str = "l2_preservation_bonus";

pub const ORIGINAL_WORD_COUNT: &str = "original_word_count";
pub const EDITED_WORD_COUNT: &str = "edited_word_count";
pub const RETAINED_UNIQUE_WORDS: &str = "retained_unique_words";
pub const RETAINED_SENTENCE_PATTERNS: &str = "retained_sentence_patterns";
pub const AI_PHRASE_INFILTRATION: &str = "ai_phrase_infiltration";

pub const SENTENCES_UNCHANGED: &str = "sentences_unchanged";
pub const SENTENCES_MODIFIED: &str = "sentences_modified";
pub const SENTENCES_ADDED: &str = "sentences_added";
pub const SENTENCES_REMOVED: &str = "sentences_removed";
pub const WORDS_UNCHANGED: &str = "words_unchanged";
pub const WORDS_MODIFIED: &str = "words_modified";
pub const WORDS_ADDED: &str = "words_added";
pub const WORDS_REMOVED: &str = "words_removed";
pub const CHANGE_PERCENTAGE: &str = "change_percentage";

pub const SOURCE_AI_ISM_SCORE: &str = "source_ai_ism_score";
pub const TARGET_AI_ISM_SCORE: &str = "target_ai_ism_score";
pub const TARGET_RAW_DENSITY: &str = "target_raw_density";
pub const TARGET_DENSITY_TIER: &str = "target_density_tier";

const GENERIC_PENALTY_SCALE: f64 = 20.0;
const CONSISTENCY_VARIANCE_DIVISOR: f64 = 10.0;
const NEUTRAL_SCORE: f64 = 50.0;

// ============ Extractor interface ============

/// Inputs shared by every extractor for one audit.
pub struct MetricContext<'a> {
    pub source: &'a str,
    pub target: &'a str,
    pub lexicon: &'a Lexicon,
    pub changes: &'a ChangeSet,
}

pub trait MetricExtractor: Send + Sync {
    fn name(&self) -> &'static str;
    fn extract(&self, ctx: &MetricContext<'_>) -> Vec<(&'static str, MetricValue)>;
}

/// Extractors run by `extract_metrics`, in output-independent order.
pub fn default_extractors() -> Vec<Box<dyn MetricExtractor>> {
    vec![
        Box::new(LexicalIdentity),
        Box::new(StructuralIdentity),
        Box::new(StylisticIdentity),
        Box::new(VoiceConsistency),
        Box::new(AuthenticityMarkers),
        Box::new(RetentionDetail),
        Box::new(ChangeStatistics),
        Box::new(MarkerDensity),
    ]
}

pub fn extract_metrics(
    source: &str,
    target: &str,
    lexicon: &Lexicon,
    changes: &ChangeSet,
) -> MetricSet {
    let ctx = MetricContext { source, target, lexicon, changes };
    extract_with(&default_extractors(), &ctx)
}

pub fn extract_with(extractors: &[Box<dyn MetricExtractor>], ctx: &MetricContext<'_>) -> MetricSet {
    extractors
        .iter()
        .flat_map(|e| e.extract(ctx))
        .map(|(name, value)| (name.to_string(), value))
        .collect()
}

fn score(name: &'static str, value: f64) -> (&'static str, MetricValue) {
    (name, MetricValue::Score(value))
}

fn count(name: &'static str, value: usize) -> (&'static str, MetricValue) {
    (name, MetricValue::Count(value as u64))
}

fn clamp_score(value: f64) -> f64 {
    value.clamp(0.0, 100.0)
}

fn mean_sentence_length(text: &str) -> Option<f64> {
    let sentences = split_sentences(text);
    if sentences.is_empty() {
        return None;
    }
    let words: usize = sentences.iter().map(|s| split_words(&s.text).len()).sum();
    Some(words as f64 / sentences.len() as f64)
}

fn generic_phrase_count(text: &str, lexicon: &Lexicon) -> usize {
    lexicon.count_matches(MarkerCategory::HighFrequency, text)
}

// ============ Identity components ============

/// Stop-word-filtered vocabulary retention, minus a penalty for generic phrases
/// the revision introduced.
pub struct LexicalIdentity;

impl MetricExtractor for LexicalIdentity {
    fn name(&self) -> &'static str {
        "lexical"
    }

    fn extract(&self, ctx: &MetricContext<'_>) -> Vec<(&'static str, MetricValue)> {
        let injected = generic_phrase_count(ctx.target, ctx.lexicon)
            .saturating_sub(generic_phrase_count(ctx.source, ctx.lexicon));
        let source_vocab = vocabulary(ctx.source, true);
        let target_vocab = vocabulary(ctx.target, true);

        let identity = if source_vocab.is_empty() {
            100.0
        } else {
            let retained = source_vocab.intersection(&target_vocab).count();
            let retention = retained as f64 / source_vocab.len() as f64 * 100.0;
            let penalty = injected as f64 / target_vocab.len().max(1) as f64 * GENERIC_PENALTY_SCALE;
            clamp_score(retention - penalty)
        };

        vec![score(LEXICAL_IDENTITY, identity), count(INJECTED_GENERIC_PHRASES, injected)]
    }
}

/// Relative drift of mean sentence length.
pub struct StructuralIdentity;

impl MetricExtractor for StructuralIdentity {
    fn name(&self) -> &'static str {
        "structural"
    }

    fn extract(&self, ctx: &MetricContext<'_>) -> Vec<(&'static str, MetricValue)> {
        let source_mean = mean_sentence_length(ctx.source);
        let target_mean = mean_sentence_length(ctx.target);

        let identity = match (source_mean, target_mean) {
            (None, _) => 100.0,
            (Some(_), None) => 0.0,
            (Some(orig), Some(edited)) => {
                let drift = (edited - orig).abs() / orig.max(1.0);
                clamp_score(100.0 - drift * 100.0)
            }
        };

        vec![
            score(STRUCTURAL_IDENTITY, identity),
            score(SOURCE_MEAN_SENTENCE_LENGTH, round2(source_mean.unwrap_or(0.0))),
            score(TARGET_MEAN_SENTENCE_LENGTH, round2(target_mean.unwrap_or(0.0))),
        ]
    }
}

/// Punctuation, capitalization and contraction style, equal thirds.
pub struct StylisticIdentity;

impl MetricExtractor for StylisticIdentity {
    fn name(&self) -> &'static str {
        "stylistic"
    }

    fn extract(&self, ctx: &MetricContext<'_>) -> Vec<(&'static str, MetricValue)> {
        let axis = |f: fn(&str) -> f64| {
            let delta = (clamp_score(f(ctx.source)) - clamp_score(f(ctx.target))).abs();
            100.0 - delta
        };
        let punctuation = axis(punctuation_richness);
        let capitalization = axis(capitalization_ratio);
        let contraction = axis(contraction_density);
        let identity = clamp_score((punctuation + capitalization + contraction) / 3.0);

        vec![
            score(STYLISTIC_IDENTITY, identity),
            score(PUNCTUATION_IDENTITY, round2(punctuation)),
            score(CAPITALIZATION_IDENTITY, round2(capitalization)),
            score(CONTRACTION_IDENTITY, round2(contraction)),
        ]
    }
}

/// Mean per-section vocabulary overlap, penalized by its spread.
pub struct VoiceConsistency;

fn section_overlap(source: &str, target: &str) -> f64 {
    let source_vocab: HashSet<String> = tokenize_words(source).into_iter().collect();
    let target_vocab: HashSet<String> = tokenize_words(target).into_iter().collect();
    match (source_vocab.is_empty(), target_vocab.is_empty()) {
        (true, true) => 100.0,
        (true, false) => NEUTRAL_SCORE,
        _ => {
            let shared = source_vocab.intersection(&target_vocab).count();
            shared as f64 / source_vocab.len() as f64 * 100.0
        }
    }
}

impl MetricExtractor for VoiceConsistency {
    fn name(&self) -> &'static str {
        "consistency"
    }

    fn extract(&self, ctx: &MetricContext<'_>) -> Vec<(&'static str, MetricValue)> {
        let source_sections = split_sections(ctx.source);
        let target_sections = split_sections(ctx.target);
        let scores: Vec<f64> = source_sections
            .iter()
            .zip(target_sections.iter())
            .map(|(s, t)| section_overlap(&s.text, &t.text))
            .collect();

        let consistency = if scores.is_empty() {
            NEUTRAL_SCORE
        } else {
            let n = scores.len() as f64;
            let mean = scores.iter().sum::<f64>() / n;
            let variance = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
            clamp_score(mean - variance.sqrt() / CONSISTENCY_VARIANCE_DIVISOR)
        };

        vec![score(VOICE_CONSISTENCY, consistency), count(SECTION_PAIRS, scores.len())]
    }
}

/// Retention of personal-voice markers, with a bonus for kept L2 features.
pub struct AuthenticityMarkers;

impl MetricExtractor for AuthenticityMarkers {
    fn name(&self) -> &'static str {
        "authenticity"
    }

    fn extract(&self, ctx: &MetricContext<'_>) -> Vec<(&'static str, MetricValue)> {
        let source_markers = authentic_marker_count(ctx.source);
        let target_markers = authentic_marker_count(ctx.target);
        let bonus = l2_preservation_bonus(ctx.source, ctx.target, ctx.lexicon);

        let authenticity = match (source_markers, target_markers) {
            (0, 0) => 100.0,
            (0, _) => NEUTRAL_SCORE,
            (orig, edited) => clamp_score(edited as f64 / orig as f64 * 100.0 + bonus),
        };

        vec![
            score(AUTHENTICITY_MARKERS, authenticity),
            count(SOURCE_AUTHENTIC_MARKERS, source_markers),
            count(TARGET_AUTHENTIC_MARKERS, target_markers),
            score(L2_PRESERVATION_BONUS, bonus),
        ]
    }
}

// ============ Detail groups ============

/// Raw retention counts reported alongside the composite.
pub struct RetentionDetail;

fn retained_sentence_patterns(source: &str, target: &str) -> usize {
    let target_lower = target.to_lowercase().replace('\u{2019}', "'");
    split_sentences(source)
        .iter()
        .filter(|s| {
            let opening: Vec<String> = tokenize_words(&s.text).into_iter().take(3).collect();
            !opening.is_empty() && target_lower.contains(&opening.join(" "))
        })
        .count()
}

impl MetricExtractor for RetentionDetail {
    fn name(&self) -> &'static str {
        "retention"
    }

    fn extract(&self, ctx: &MetricContext<'_>) -> Vec<(&'static str, MetricValue)> {
        let retained = vocabulary(ctx.source, false)
            .intersection(&vocabulary(ctx.target, false))
            .count();
        let edited_words = split_words(ctx.target).len();
        let infiltration = density_score(
            generic_phrase_count(ctx.target, ctx.lexicon) as f64,
            edited_words,
        );

        vec![
            count(ORIGINAL_WORD_COUNT, split_words(ctx.source).len()),
            count(EDITED_WORD_COUNT, edited_words),
            count(RETAINED_UNIQUE_WORDS, retained),
            count(RETAINED_SENTENCE_PATTERNS, retained_sentence_patterns(ctx.source, ctx.target)),
            score(AI_PHRASE_INFILTRATION, round2(100.0 - infiltration)),
        ]
    }
}

/// Change record tallies at both granularities.
pub struct ChangeStatistics;

/// Share of the two word sequences not covered by unchanged pairs, 0-100.
pub fn change_percentage(word_changes: &[ChangeRecord]) -> f64 {
    let source_units = word_changes.iter().filter(|r| r.source.is_some()).count();
    let target_units = word_changes.iter().filter(|r| r.target.is_some()).count();
    let total = source_units + target_units;
    if total == 0 {
        return 0.0;
    }
    let unchanged = count_kind(word_changes, ChangeKind::Unchanged);
    round2((1.0 - 2.0 * unchanged as f64 / total as f64) * 100.0)
}

impl MetricExtractor for ChangeStatistics {
    fn name(&self) -> &'static str {
        "changes"
    }

    fn extract(&self, ctx: &MetricContext<'_>) -> Vec<(&'static str, MetricValue)> {
        let sentences = &ctx.changes.sentences;
        let words = &ctx.changes.words;
        vec![
            count(SENTENCES_UNCHANGED, count_kind(sentences, ChangeKind::Unchanged)),
            count(SENTENCES_MODIFIED, count_kind(sentences, ChangeKind::Modified)),
            count(SENTENCES_ADDED, count_kind(sentences, ChangeKind::Added)),
            count(SENTENCES_REMOVED, count_kind(sentences, ChangeKind::Removed)),
            count(WORDS_UNCHANGED, count_kind(words, ChangeKind::Unchanged)),
            count(WORDS_MODIFIED, count_kind(words, ChangeKind::Modified)),
            count(WORDS_ADDED, count_kind(words, ChangeKind::Added)),
            count(WORDS_REMOVED, count_kind(words, ChangeKind::Removed)),
            score(CHANGE_PERCENTAGE, change_percentage(words)),
        ]
    }
}

/// Marker density of both texts.
pub struct MarkerDensity;

impl MetricExtractor for MarkerDensity {
    fn name(&self) -> &'static str {
        "markers"
    }

    fn extract(&self, ctx: &MetricContext<'_>) -> Vec<(&'static str, MetricValue)> {
        let source = detect_markers(ctx.source, ctx.lexicon);
        let target = detect_markers(ctx.target, ctx.lexicon);
        vec![
            score(SOURCE_AI_ISM_SCORE, source.ai_ism_score),
            score(TARGET_AI_ISM_SCORE, target.ai_ism_score),
            score(TARGET_RAW_DENSITY, target.raw_density),
            (TARGET_DENSITY_TIER, MetricValue::Label(target.risk_level.as_str().to_string())),
        ]
    }
}
