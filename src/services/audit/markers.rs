// Marker Detection
// Lexicon phrase hits, weighted formulaic density and its length-normalized score.

use super::risk::{classify_density, marker_explanation};
use crate::models::{MarkerReport, PhraseMatch, SentenceMatch};
use crate::services::lexicon::{Lexicon, MarkerCategory};
use crate::services::text_processor::{split_sentences, split_words};
use std::collections::BTreeMap;

pub type CategoryCounts = BTreeMap<MarkerCategory, usize>;

/// Weighted sum over category counts, honoring per-category caps.
pub fn weighted_density(counts: &CategoryCounts) -> f64 {
    counts
        .iter()
        .map(|(category, count)| {
            let rule = category.rule();
            let counted = rule.cap.map_or(*count, |cap| (*count).min(cap));
            counted as f64 * rule.weight
        })
        .sum()
}

/// Per-100-words density scaled to 0-100. Zero words scores 0.
pub fn density_score(raw_density: f64, word_count: usize) -> f64 {
    if word_count == 0 {
        return 0.0;
    }
    (raw_density / (word_count as f64 / 100.0) * 10.0).min(100.0)
}

fn phrase_matches(lexicon: &Lexicon, category: MarkerCategory, text: &str) -> Vec<PhraseMatch> {
    let mut matches: Vec<PhraseMatch> = lexicon
        .patterns(category)
        .iter()
        .flat_map(|p| {
            p.regex().find_iter(text).map(move |m| PhraseMatch {
                start: m.start(),
                end: m.end(),
                phrase: p.text.clone(),
            })
        })
        .collect();
    matches.sort_by_key(|m| (m.start, m.end));
    matches
}

fn formulaic_matches(lexicon: &Lexicon, sentences: &[String]) -> Vec<SentenceMatch> {
    let patterns = lexicon.patterns(MarkerCategory::FormulaicStructures);
    let mut matches = Vec::new();
    for (idx, sentence) in sentences.iter().enumerate() {
        for pattern in patterns {
            if pattern.regex().is_match(sentence) {
                matches.push(SentenceMatch {
                    sentence_index: idx,
                    sentence: sentence.clone(),
                    pattern: pattern.text.clone(),
                });
            }
        }
    }
    matches
}

/// Occurrence count per category, as used by the density score.
pub fn count_markers(text: &str, lexicon: &Lexicon) -> CategoryCounts {
    let sentences: Vec<String> = split_sentences(text).into_iter().map(|s| s.text).collect();
    MarkerCategory::ALL
        .iter()
        .map(|&category| {
            let count = match category {
                MarkerCategory::FormulaicStructures => formulaic_matches(lexicon, &sentences).len(),
                _ => lexicon.count_matches(category, text),
            };
            (category, count)
        })
        .collect()
}

/// Raw weighted density of `text`.
pub fn raw_density(text: &str, lexicon: &Lexicon) -> f64 {
    weighted_density(&count_markers(text, lexicon))
}

/// Percentage of `sentences` opening with any formulaic pattern.
pub fn formulaic_index<S: AsRef<str>>(sentences: &[S], lexicon: &Lexicon) -> f64 {
    if sentences.is_empty() {
        return 0.0;
    }
    let patterns = lexicon.patterns(MarkerCategory::FormulaicStructures);
    let formulaic = sentences
        .iter()
        .filter(|s| patterns.iter().any(|p| p.regex().is_match(s.as_ref())))
        .count();
    formulaic as f64 / sentences.len() as f64 * 100.0
}

/// Full marker report for one text.
pub fn detect_markers(text: &str, lexicon: &Lexicon) -> MarkerReport {
    let sentences: Vec<String> = split_sentences(text).into_iter().map(|s| s.text).collect();
    let word_count = split_words(text).len();

    let high_frequency_phrases = phrase_matches(lexicon, MarkerCategory::HighFrequency, text);
    let formulaic_structures = formulaic_matches(lexicon, &sentences);
    let hedging_qualifiers = phrase_matches(lexicon, MarkerCategory::HedgingQualifiers, text);
    let academic_cliches = phrase_matches(lexicon, MarkerCategory::AcademicCliches, text);
    let transition_words = phrase_matches(lexicon, MarkerCategory::TransitionWords, text);
    let generic_openers = phrase_matches(lexicon, MarkerCategory::GenericOpeners, text);

    let counts: CategoryCounts = [
        (MarkerCategory::HighFrequency, high_frequency_phrases.len()),
        (MarkerCategory::FormulaicStructures, formulaic_structures.len()),
        (MarkerCategory::HedgingQualifiers, hedging_qualifiers.len()),
        (MarkerCategory::AcademicCliches, academic_cliches.len()),
        (MarkerCategory::TransitionWords, transition_words.len()),
        (MarkerCategory::GenericOpeners, generic_openers.len()),
    ]
    .into_iter()
    .collect();

    let raw = weighted_density(&counts);
    let score = round2(density_score(raw, word_count));
    let formulaic_share = round2(formulaic_index(&sentences, lexicon));

    MarkerReport {
        high_frequency_phrases,
        formulaic_structures,
        hedging_qualifiers,
        academic_cliches,
        transition_words,
        generic_openers,
        category_counts: counts
            .iter()
            .map(|(c, n)| (c.key().to_string(), *n))
            .collect(),
        raw_density: raw,
        word_count,
        ai_ism_score: score,
        risk_level: classify_density(score),
        explanation: marker_explanation(score).to_string(),
        formulaic_index: formulaic_share,
    }
}

pub(crate) fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskTier;

    #[test]
    fn test_single_high_frequency_phrase() {
        let lexicon = Lexicon::builtin();
        let report = detect_markers("Honestly, It Is Important To Note That cats sleep a lot.", &lexicon);
        assert_eq!(report.high_frequency_phrases.len(), 1);
        assert_eq!(report.category_counts["high_frequency"], 1);
        assert_eq!(report.raw_density, 2.0);
        assert_eq!(report.high_frequency_phrases[0].start, 10);
        assert_eq!(report.high_frequency_phrases[0].phrase, "it is important to note that");
    }

    #[test]
    fn test_density_score_normalization() {
        assert_eq!(density_score(0.0, 0), 0.0);
        assert_eq!(density_score(5.0, 0), 0.0);
        assert_eq!(density_score(1.0, 100), 10.0);
        assert_eq!(density_score(2.0, 200), 10.0);
        assert_eq!(density_score(50.0, 100), 100.0);
    }

    #[test]
    fn test_transition_cap() {
        let mut counts = CategoryCounts::new();
        counts.insert(MarkerCategory::TransitionWords, 35);
        assert_eq!(weighted_density(&counts), 20.0);
        counts.insert(MarkerCategory::HedgingQualifiers, 3);
        assert_eq!(weighted_density(&counts), 21.5);
    }

    #[test]
    fn test_formulaic_openings_per_sentence() {
        let lexicon = Lexicon::builtin();
        let text = "In conclusion, this works. Cats nap. Overall, we agree.";
        let report = detect_markers(text, &lexicon);
        let indices: Vec<usize> = report.formulaic_structures.iter().map(|m| m.sentence_index).collect();
        assert_eq!(indices, vec![0, 2]);
        assert_eq!(report.formulaic_index, 66.67);
        let sentences = ["Cats nap.", "In conclusion, done.", "Dogs bark.", "Birds sing."];
        assert_eq!(formulaic_index(&sentences, &lexicon), 25.0);
        assert_eq!(formulaic_index::<&str>(&[], &lexicon), 0.0);
    }

    #[test]
    fn test_plain_text_is_low_risk() {
        let lexicon = Lexicon::builtin();
        let report = detect_markers("My grandmother grew rice near the river. We ate together.", &lexicon);
        assert_eq!(report.raw_density, 0.0);
        assert_eq!(report.risk_level, RiskTier::Low);
        assert!(report.explanation.starts_with("Low"));
    }

    #[test]
    fn test_synthetic_lexicon() {
        let lexicon = Lexicon::from_categories([
            (MarkerCategory::GenericOpeners, vec!["once upon a time"]),
            (MarkerCategory::HedgingQualifiers, vec!["maybe"]),
        ])
        .unwrap();
        let counts = count_markers("Once upon a time, maybe. Maybe not, maybes.", &lexicon);
        assert_eq!(counts[&MarkerCategory::GenericOpeners], 1);
        assert_eq!(counts[&MarkerCategory::HedgingQualifiers], 2);
        assert_eq!(raw_density("Once upon a time, maybe. Maybe not, maybes.", &lexicon), 3.0);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    const FILLER: &[&str] = &["river", "rice", "we", "walked", "home", "slowly", "and", "talked"];
    const PHRASES: &[&str] = &[
        "delve into",
        "it is important to note that",
        "moreover",
        "perhaps",
        "food for thought",
        "in today's world",
    ];

    proptest! {
        /// Property: appending one more lexicon phrase never lowers the raw density
        #[test]
        fn density_is_monotonic(
            words in prop::collection::vec(0usize..FILLER.len(), 0..60),
            phrase in 0usize..PHRASES.len(),
        ) {
            let lexicon = Lexicon::builtin();
            let base: Vec<&str> = words.iter().map(|&i| FILLER[i]).collect();
            let base = base.join(" ");
            let extended = format!("{} {}", base, PHRASES[phrase]);
            prop_assert!(raw_density(&extended, &lexicon) >= raw_density(&base, &lexicon));
        }
    }
}
