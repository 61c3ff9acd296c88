// Audit Engine
// Request-level entry points: input checks, size bounding, and composition of
// alignment, classification, metric extraction and scoring.

use super::aligner::align_tokens;
use super::comparison::{build_change_set, build_report, sentence_units, AlignOptions};
use super::l2_voice::l2_voice_report;
use super::markers::detect_markers;
use super::metrics::{
    extract_metrics, AI_PHRASE_INFILTRATION, EDITED_WORD_COUNT, ORIGINAL_WORD_COUNT,
    RETAINED_SENTENCE_PATTERNS, RETAINED_UNIQUE_WORDS,
};
use super::scoring::score;
use crate::error::{AuditError, AuditResult};
use crate::models::{
    AlignmentOp, AuditReport, AuditSummary, ChangeSet, ComparisonReport, DetailedMetrics,
    L2VoiceReport, MarkerReport, MetricSet, VoicePreservationReport,
};
use crate::services::config_store::{AppConfig, AuditConfig, OversizePolicy};
use crate::services::lexicon::Lexicon;
use crate::services::text_processor::{split_words, truncate_to_tokens};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Stateless audit entry point. Cheap to share across threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct AuditEngine {
    lexicon: Arc<Lexicon>,
    config: AuditConfig,
}

impl AuditEngine {
    pub fn new(lexicon: Arc<Lexicon>, config: AuditConfig) -> Self {
        Self { lexicon, config }
    }

    pub fn with_builtin_lexicon(config: AuditConfig) -> Self {
        Self::new(Arc::new(Lexicon::builtin()), config)
    }

    /// Engine for a stored configuration, loading its lexicon file if one is set.
    pub fn from_app_config(app: &AppConfig) -> AuditResult<Self> {
        let lexicon = match app.lexicon_path.as_deref() {
            Some(path) if !path.trim().is_empty() => {
                info!(path, "lexicon.load");
                Lexicon::from_path(Path::new(path))?
            }
            _ => Lexicon::builtin(),
        };
        Ok(Self::new(Arc::new(lexicon), app.audit.clone()))
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn config(&self) -> &AuditConfig {
        &self.config
    }

    fn align_options(&self) -> AlignOptions {
        AlignOptions {
            case_sensitive: self.config.case_sensitive,
            max_cells: self.config.max_alignment_cells,
        }
    }

    // ============ Input checks ============

    fn require<'a>(&self, label: &str, text: &'a str) -> AuditResult<&'a str> {
        if text.trim().is_empty() {
            return Err(AuditError::InvalidInput(format!("{} text is required", label)));
        }
        self.bound(label, text)
    }

    fn bound<'a>(&self, label: &str, text: &'a str) -> AuditResult<&'a str> {
        let tokens = split_words(text).len();
        if tokens <= self.config.max_tokens {
            return Ok(text);
        }
        match self.config.oversize_policy {
            OversizePolicy::Reject => Err(AuditError::InvalidInput(format!(
                "{} text has {} tokens, limit is {}",
                label, tokens, self.config.max_tokens
            ))),
            OversizePolicy::Truncate => {
                warn!(
                    document = label,
                    tokens,
                    max_tokens = self.config.max_tokens,
                    "audit.input_truncated"
                );
                Ok(truncate_to_tokens(text, self.config.max_tokens))
            }
        }
    }

    fn require_pair<'a>(&self, source: &'a str, target: &'a str) -> AuditResult<(&'a str, &'a str)> {
        Ok((self.require("original", source)?, self.require("edited", target)?))
    }

    // ============ Alignment ============

    pub fn align_sentences(&self, source: &str, target: &str) -> AuditResult<Vec<AlignmentOp>> {
        let (source, target) = self.require_pair(source, target)?;
        let opts = self.align_options();
        align_tokens(&sentence_units(source), &sentence_units(target), opts.case_sensitive, opts.max_cells)
    }

    pub fn align_words(&self, source: &str, target: &str) -> AuditResult<Vec<AlignmentOp>> {
        let (source, target) = self.require_pair(source, target)?;
        let opts = self.align_options();
        align_tokens(&split_words(source), &split_words(target), opts.case_sensitive, opts.max_cells)
    }

    pub fn changes(&self, source: &str, target: &str) -> AuditResult<ChangeSet> {
        let (source, target) = self.require_pair(source, target)?;
        build_change_set(source, target, self.align_options())
    }

    // ============ Reports ============

    /// Marker report for a single document.
    pub fn detect_markers(&self, text: &str) -> AuditResult<MarkerReport> {
        let text = self.require("input", text)?;
        let report = detect_markers(text, &self.lexicon);
        debug!(
            words = report.word_count,
            raw_density = report.raw_density,
            score = report.ai_ism_score,
            "audit.markers"
        );
        Ok(report)
    }

    pub fn compare(&self, source: &str, target: &str) -> AuditResult<ComparisonReport> {
        let (source, target) = self.require_pair(source, target)?;
        let changes = build_change_set(source, target, self.align_options())?;
        Ok(build_report(source, target, changes))
    }

    pub fn l2_voice(&self, source: &str, target: &str) -> AuditResult<L2VoiceReport> {
        let (source, target) = self.require_pair(source, target)?;
        Ok(l2_voice_report(source, target, &self.lexicon))
    }

    pub fn voice_preservation(&self, source: &str, target: &str) -> AuditResult<VoicePreservationReport> {
        let (source, target) = self.require_pair(source, target)?;
        let changes = build_change_set(source, target, self.align_options())?;
        let metrics = extract_metrics(source, target, &self.lexicon, &changes);
        voice_preservation_report(metrics)
    }

    /// Markers for both texts, L2 voice, voice preservation and comparison in one pass.
    pub fn full_audit(&self, source: &str, target: &str) -> AuditResult<AuditReport> {
        let started = Instant::now();
        let (source, target) = self.require_pair(source, target)?;
        info!(
            source_bytes = source.len(),
            target_bytes = target.len(),
            "audit.start"
        );

        let changes = build_change_set(source, target, self.align_options())?;
        info!(
            sentence_records = changes.sentences.len(),
            word_records = changes.words.len(),
            "audit.aligned"
        );

        let metrics = extract_metrics(source, target, &self.lexicon, &changes);
        let voice_preservation = voice_preservation_report(metrics)?;
        let source_markers = detect_markers(source, &self.lexicon);
        let target_markers = detect_markers(target, &self.lexicon);
        let l2_voice = l2_voice_report(source, target, &self.lexicon);
        let comparison = build_report(source, target, changes);

        let summary = AuditSummary {
            overall_score: voice_preservation.composite.overall_score,
            risk_level: voice_preservation.composite.risk_level.clone(),
            aitism_score: target_markers.ai_ism_score,
        };

        info!(
            overall_score = summary.overall_score,
            aitism_score = summary.aitism_score,
            risk = %summary.risk_level,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "audit.complete"
        );

        Ok(AuditReport {
            source_markers,
            target_markers,
            l2_voice,
            voice_preservation,
            comparison,
            summary,
        })
    }
}

fn voice_preservation_report(metrics: MetricSet) -> AuditResult<VoicePreservationReport> {
    let composite = score(&metrics)?;
    let detailed_metrics = DetailedMetrics {
        original_word_count: metrics.count(ORIGINAL_WORD_COUNT).unwrap_or(0),
        edited_word_count: metrics.count(EDITED_WORD_COUNT).unwrap_or(0),
        retained_unique_words: metrics.count(RETAINED_UNIQUE_WORDS).unwrap_or(0),
        retained_sentence_patterns: metrics.count(RETAINED_SENTENCE_PATTERNS).unwrap_or(0),
        ai_phrase_infiltration: metrics.score(AI_PHRASE_INFILTRATION).unwrap_or(100.0),
    };
    Ok(VoicePreservationReport {
        composite,
        detailed_metrics,
        metrics,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ChangeKind, OpKind, RiskTier};

    fn engine() -> AuditEngine {
        AuditEngine::with_builtin_lexicon(AuditConfig::default())
    }

    #[test]
    fn test_identical_texts_full_score() {
        let text = "I grew up near the river. My grandmother told stories every night!";
        let report = engine().voice_preservation(text, text).unwrap();
        assert_eq!(report.composite.overall_score, 100.0);
        assert_eq!(report.composite.risk_tier, RiskTier::Low);
        assert_eq!(report.composite.risk_level, "LOW - Voice Authentic");
    }

    #[test]
    fn test_empty_inputs_rejected() {
        let engine = engine();
        assert!(matches!(engine.compare("", "text"), Err(AuditError::InvalidInput(_))));
        assert!(matches!(engine.compare("text", "  \n"), Err(AuditError::InvalidInput(_))));
        assert!(matches!(engine.detect_markers(""), Err(AuditError::InvalidInput(_))));
        assert!(engine.detect_markers("One text is enough.").is_ok());
    }

    #[test]
    fn test_oversize_reject_and_truncate() {
        let long = "word ".repeat(50);
        let strict = AuditEngine::with_builtin_lexicon(AuditConfig {
            max_tokens: 10,
            ..AuditConfig::default()
        });
        assert!(matches!(strict.compare(&long, "word"), Err(AuditError::InvalidInput(_))));

        let lenient = AuditEngine::with_builtin_lexicon(AuditConfig {
            max_tokens: 10,
            oversize_policy: OversizePolicy::Truncate,
            ..AuditConfig::default()
        });
        let report = lenient.compare(&long, "word").unwrap();
        assert_eq!(report.statistics.original_word_count, 10);
    }

    #[test]
    fn test_alignment_cell_budget() {
        let engine = AuditEngine::with_builtin_lexicon(AuditConfig {
            max_alignment_cells: 10,
            ..AuditConfig::default()
        });
        let result = engine.align_words("a b c d e", "v w x y z");
        assert!(matches!(result, Err(AuditError::InvalidInput(_))));
    }

    #[test]
    fn test_align_sentences_scenario() {
        let ops = engine()
            .align_sentences("The cat sat. The dog ran.", "The cat sat. The dog ran quickly.")
            .unwrap();
        let kinds: Vec<OpKind> = ops.iter().map(|op| op.kind).collect();
        assert_eq!(kinds, vec![OpKind::Equal, OpKind::Replace]);
    }

    #[test]
    fn test_full_audit_summary() {
        let source = "Honestly I don't know why we moved. My family is very very close.";
        let target = "It is important to note that the relocation was significant. Moreover, the family remains close.";
        let report = engine().full_audit(source, target).unwrap();
        assert_eq!(report.summary.overall_score, report.voice_preservation.composite.overall_score);
        assert_eq!(report.summary.aitism_score, report.target_markers.ai_ism_score);
        assert!(report.target_markers.ai_ism_score > report.source_markers.ai_ism_score);
        assert_eq!(report.voice_preservation.detailed_metrics.original_word_count, 13);
        assert!(report.comparison.sentence_changes.iter().all(|r| r.kind != ChangeKind::Unchanged));
        assert_eq!(report.l2_voice.voice_loss_analysis.lost_l1_markers, vec!["very very".to_string()]);
    }

    #[test]
    fn test_from_app_config_missing_lexicon() {
        let app = AppConfig {
            lexicon_path: Some("/no/such/lexicon.json".to_string()),
            ..AppConfig::default()
        };
        assert!(matches!(AuditEngine::from_app_config(&app), Err(AuditError::Lexicon(_))));
    }
}
