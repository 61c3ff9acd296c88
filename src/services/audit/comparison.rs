// Draft/Revision Comparison
// Sentence- and word-level change records plus the summary statistics built from them.

use super::aligner::align_tokens;
use super::change_classifier::classify;
use super::markers::round2;
use super::metrics::change_percentage;
use crate::error::AuditResult;
use crate::models::{
    count_kind, ChangeKind, ChangeRecord, ChangeSet, ComparisonReport, ComparisonStatistics,
    ComparisonSummary, ReadabilityImpact,
};
use crate::services::text_processor::{average_word_length, split_sentences, split_words};

/// Alignment options shared by both granularities.
#[derive(Debug, Clone, Copy)]
pub struct AlignOptions {
    pub case_sensitive: bool,
    pub max_cells: u64,
}

pub fn sentence_units(text: &str) -> Vec<String> {
    split_sentences(text).into_iter().map(|s| s.text).collect()
}

pub fn sentence_changes(source: &str, target: &str, opts: AlignOptions) -> AuditResult<Vec<ChangeRecord>> {
    let a = sentence_units(source);
    let b = sentence_units(target);
    let ops = align_tokens(&a, &b, opts.case_sensitive, opts.max_cells)?;
    classify(&ops, &a, &b)
}

pub fn word_changes(source: &str, target: &str, opts: AlignOptions) -> AuditResult<Vec<ChangeRecord>> {
    let a = split_words(source);
    let b = split_words(target);
    let ops = align_tokens(&a, &b, opts.case_sensitive, opts.max_cells)?;
    classify(&ops, &a, &b)
}

pub fn build_change_set(source: &str, target: &str, opts: AlignOptions) -> AuditResult<ChangeSet> {
    Ok(ChangeSet {
        sentences: sentence_changes(source, target, opts)?,
        words: word_changes(source, target, opts)?,
    })
}

fn readability_impact(source: &str, target: &str) -> ReadabilityImpact {
    let original = average_word_length(source);
    let edited = average_word_length(target);
    ReadabilityImpact {
        original_avg_word_length: round2(original),
        edited_avg_word_length: round2(edited),
        complexity_change: if edited > original { "increased" } else { "decreased" }.to_string(),
        complexity_magnitude: round2((edited - original).abs()),
    }
}

/// Summary and statistics over an already computed change set.
pub fn build_report(source: &str, target: &str, changes: ChangeSet) -> ComparisonReport {
    let sentences = &changes.sentences;
    let words = &changes.words;

    let summary = ComparisonSummary {
        total_additions: count_kind(sentences, ChangeKind::Added),
        total_deletions: count_kind(sentences, ChangeKind::Removed),
        total_modifications: count_kind(sentences, ChangeKind::Modified),
        total_sentences_original: sentences.iter().filter(|r| r.source.is_some()).count(),
        total_sentences_edited: sentences.iter().filter(|r| r.target.is_some()).count(),
        change_percentage: change_percentage(words),
    };

    let original_words = words.iter().filter(|r| r.source.is_some()).count();
    let edited_words = words.iter().filter(|r| r.target.is_some()).count();
    let original_chars = source.chars().count();
    let edited_chars = target.chars().count();

    let statistics = ComparisonStatistics {
        original_word_count: original_words,
        edited_word_count: edited_words,
        word_count_change: edited_words as i64 - original_words as i64,
        original_char_count: original_chars,
        edited_char_count: edited_chars,
        char_count_change: edited_chars as i64 - original_chars as i64,
        added_words: words
            .iter()
            .filter(|r| r.kind != ChangeKind::Unchanged && r.target.is_some())
            .count(),
        removed_words: words
            .iter()
            .filter(|r| r.kind != ChangeKind::Unchanged && r.source.is_some())
            .count(),
        readability_impact: readability_impact(source, target),
    };

    ComparisonReport {
        summary,
        statistics,
        sentence_changes: changes.sentences,
        word_changes: changes.words,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AuditError;

    const OPTS: AlignOptions = AlignOptions {
        case_sensitive: true,
        max_cells: 1_000_000,
    };

    #[test]
    fn test_sentence_scenario() {
        let changes =
            build_change_set("The cat sat. The dog ran.", "The cat sat. The dog ran quickly.", OPTS)
                .unwrap();
        let report = build_report("The cat sat. The dog ran.", "The cat sat. The dog ran quickly.", changes);

        assert_eq!(report.summary.total_modifications, 1);
        assert_eq!(report.summary.total_additions, 0);
        assert_eq!(report.summary.total_sentences_original, 2);
        assert_eq!(report.summary.change_percentage, 23.08);
        assert_eq!(report.sentence_changes[0].kind, ChangeKind::Unchanged);
        assert_eq!(report.sentence_changes[1].kind, ChangeKind::Modified);

        let stats = &report.statistics;
        assert_eq!(stats.word_count_change, 1);
        assert_eq!(stats.char_count_change, 8);
        assert_eq!(stats.added_words, 2);
        assert_eq!(stats.removed_words, 1);
        assert_eq!(stats.readability_impact.complexity_change, "increased");
    }

    #[test]
    fn test_case_insensitive_words() {
        let opts = AlignOptions { case_sensitive: false, ..OPTS };
        let words = word_changes("The Cat", "the cat", opts).unwrap();
        assert_eq!(count_kind(&words, ChangeKind::Unchanged), 2);
        // records keep the original spelling
        assert_eq!(words[0].source_text(), Some("The"));
        assert_eq!(words[0].target_text(), Some("the"));
    }

    #[test]
    fn test_alignment_budget_propagates() {
        let opts = AlignOptions { max_cells: 4, ..OPTS };
        let result = word_changes("a b c d", "w x y z", opts);
        assert!(matches!(result, Err(AuditError::InvalidInput(_))));
    }
}
