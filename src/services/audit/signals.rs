// Style Signals
// Per-document style measurements on a 0-100 scale, plus authenticity marker counts.

use crate::services::lexicon::Lexicon;
use crate::services::text_processor::split_words;
use regex::Regex;
use std::sync::OnceLock;

/// Scale value for an empty document on every style axis.
pub const NEUTRAL_STYLE: f64 = 50.0;

const STYLE_CONTRACTIONS: &[&str] = &[
    "don't", "can't", "won't", "it's", "i'm", "that's", "we're", "they're",
];

const AUTHENTIC_CONTRACTIONS: &[&str] = &["don't", "can't", "won't", "it's", "i'm"];

const CULTURAL_KEYWORD_BONUS: f64 = 5.0;
const L1_TRANSFER_BONUS: f64 = 10.0;
const MAX_L2_BONUS: f64 = 20.0;

fn first_person_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"\b(?:i['\s]|(?:my|me|we|our|us)\s)").expect("first person regex")
    })
}

fn l1_transfer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:very\s+very|should\s+must)\b").expect("l1 transfer regex")
    })
}

fn lowered(text: &str) -> String {
    text.to_lowercase().replace('\u{2019}', "'")
}

/// `! ? ; : ...` per 100 characters, times ten, capped at 100.
pub fn punctuation_richness(text: &str) -> f64 {
    let chars = text.chars().count();
    if chars == 0 {
        return NEUTRAL_STYLE;
    }
    let marks = text
        .chars()
        .filter(|c| matches!(c, '!' | '?' | ';' | ':'))
        .count()
        + text.matches("...").count();
    (marks as f64 / (chars as f64 / 100.0) * 10.0).min(100.0)
}

/// Percentage of whitespace tokens starting with an uppercase letter.
pub fn capitalization_ratio(text: &str) -> f64 {
    let words = split_words(text);
    if words.is_empty() {
        return NEUTRAL_STYLE;
    }
    let caps = words
        .iter()
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .count();
    caps as f64 / words.len() as f64 * 100.0
}

/// Informal contractions per 100 words, times ten, capped at 100.
pub fn contraction_density(text: &str) -> f64 {
    let words = split_words(text).len();
    if words == 0 {
        return NEUTRAL_STYLE;
    }
    let lower = lowered(text);
    let count: usize = STYLE_CONTRACTIONS.iter().map(|c| lower.matches(c).count()).sum();
    (count as f64 / (words as f64 / 100.0) * 10.0).min(100.0)
}

/// First-person pronouns, questions, exclamations and informal contractions.
pub fn authentic_marker_count(text: &str) -> usize {
    let lower = lowered(text);
    let pronouns = first_person_re().find_iter(&lower).count();
    let questions = text.matches(['?', '？']).count();
    let exclamations = text.matches(['!', '！']).count();
    let contractions: usize = AUTHENTIC_CONTRACTIONS
        .iter()
        .map(|c| lower.matches(c).count())
        .sum();
    pronouns + questions + exclamations + contractions
}

pub fn has_l1_transfer(text: &str) -> bool {
    l1_transfer_re().is_match(text)
}

/// Bonus points for cultural keywords and L1-transfer idioms kept in both texts.
pub fn l2_preservation_bonus(source: &str, target: &str, lexicon: &Lexicon) -> f64 {
    let (src, tgt) = (lowered(source), lowered(target));
    let mut bonus = lexicon
        .cultural_keywords()
        .iter()
        .filter(|k| src.contains(k.as_str()) && tgt.contains(k.as_str()))
        .count() as f64
        * CULTURAL_KEYWORD_BONUS;
    if has_l1_transfer(source) && has_l1_transfer(target) {
        bonus += L1_TRANSFER_BONUS;
    }
    bonus.min(MAX_L2_BONUS)
}
