// Text Processing Service
// Sentence, word and section segmentation shared by every audit stage.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::OnceLock;

/// Function words ignored when comparing vocabularies.
pub const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of",
];

pub fn is_stop_word(word: &str) -> bool {
    STOP_WORDS.contains(&word)
}

fn nbsp_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\u{3000}\u{00A0}]").expect("nbsp regex"))
}

fn horizontal_ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\x0C\x0B]+").expect("horizontal whitespace regex"))
}

fn excess_blank_lines_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{3,}").expect("blank line regex"))
}

fn section_break_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n\s*\n").expect("section break regex"))
}

fn lexical_token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"[\p{L}\p{N}_]+(?:'[\p{L}\p{N}]+)*").expect("lexical token regex")
    })
}

/// Normalize punctuation and whitespace in extracted document text.
/// Paragraph breaks survive as a single blank line.
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut s = text
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{2014}', "-");

    s = nbsp_re().replace_all(&s, " ").to_string();
    s = s.replace("\r\n", "\n").replace('\r', "\n");
    s = horizontal_ws_re().replace_all(&s, " ").to_string();

    s = s.lines().map(|ln| ln.trim()).collect::<Vec<_>>().join("\n");
    s = excess_blank_lines_re().replace_all(&s, "\n\n").to_string();

    s.trim().to_string()
}

/// Whitespace-delimited tokens, punctuation attached. Used for alignment and raw counts.
pub fn split_words(text: &str) -> Vec<&str> {
    text.split_whitespace().collect()
}

/// Lowercase lexical tokens (letters, digits, inner apostrophes).
pub fn tokenize_words(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase().replace('\u{2019}', "'");
    lexical_token_re()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Unique lexical tokens, optionally without stop words.
pub fn vocabulary(text: &str, drop_stop_words: bool) -> HashSet<String> {
    tokenize_words(text)
        .into_iter()
        .filter(|w| !drop_stop_words || !is_stop_word(w))
        .collect()
}

/// Cut `text` after its first `max_tokens` whitespace tokens.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> &str {
    let mut count = 0usize;
    let mut in_token = false;
    for (idx, ch) in text.char_indices() {
        if ch.is_whitespace() {
            in_token = false;
        } else if !in_token {
            if count == max_tokens {
                return text[..idx].trim_end();
            }
            in_token = true;
            count += 1;
        }
    }
    text
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SentenceOffset {
    pub text: String,
    /// UTF-8 byte offset into the source text.
    pub start: usize,
    pub end: usize,
}

fn is_terminator(ch: char) -> bool {
    matches!(ch, '.' | '!' | '?' | '。' | '！' | '？')
}

fn is_double_quote(ch: char) -> bool {
    matches!(ch, '"' | '\u{201c}' | '\u{201d}')
}

fn is_closer(ch: char) -> bool {
    matches!(ch, ')' | ']' | '\'' | '\u{2019}')
}

/// Split text into sentences with byte offsets.
///
/// A sentence ends at a run of terminators followed by whitespace or end of text.
/// Terminators inside double quotes and decimal points do not split, and a blank
/// line always closes the current sentence.
pub fn split_sentences(text: &str) -> Vec<SentenceOffset> {
    let mut sentences = Vec::new();
    for section in split_sections(text) {
        split_section_sentences(text, section.start, section.end, &mut sentences);
    }
    sentences
}

fn split_section_sentences(text: &str, from: usize, to: usize, out: &mut Vec<SentenceOffset>) {
    let slice = &text[from..to];
    let mut start = 0usize;
    let mut in_quote = false;
    let mut prev: Option<char> = None;
    let mut iter = slice.char_indices().peekable();

    while let Some((idx, ch)) = iter.next() {
        if is_double_quote(ch) {
            in_quote = !in_quote;
        }
        if !is_terminator(ch) || in_quote {
            prev = Some(ch);
            continue;
        }

        if ch == '.' {
            let next = iter.peek().map(|&(_, c)| c);
            if prev.is_some_and(|c| c.is_ascii_digit()) && next.is_some_and(|c| c.is_ascii_digit()) {
                prev = Some(ch);
                continue;
            }
        }

        let mut end = idx + ch.len_utf8();
        while let Some(&(j, c)) = iter.peek() {
            if is_terminator(c) || is_closer(c) {
                end = j + c.len_utf8();
                prev = Some(c);
                iter.next();
            } else {
                break;
            }
        }

        let at_boundary = match iter.peek() {
            None => true,
            Some(&(_, c)) => c.is_whitespace(),
        };
        if at_boundary {
            push_sentence(text, from + start, from + end, out);
            start = end;
        }
        prev = Some(ch);
    }

    if start < slice.len() {
        push_sentence(text, from + start, to, out);
    }
}

fn push_sentence(text: &str, start: usize, end: usize, out: &mut Vec<SentenceOffset>) {
    let raw = &text[start..end];
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return;
    }
    let lead = raw.len() - raw.trim_start().len();
    out.push(SentenceOffset {
        text: trimmed.to_string(),
        start: start + lead,
        end: start + lead + trimmed.len(),
    });
}

/// Blank-line delimited paragraph block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextBlock {
    pub index: usize,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

/// Split text into paragraph sections on blank lines (one or more consecutive empty lines).
pub fn split_sections(text: &str) -> Vec<TextBlock> {
    let mut blocks = Vec::new();
    let mut cursor: usize = 0;

    for para in section_break_re().split(text) {
        let trimmed = para.trim();
        if trimmed.is_empty() {
            continue;
        }

        let start = text[cursor..]
            .find(trimmed)
            .map(|i| cursor + i)
            .unwrap_or(cursor);
        let end = start + trimmed.len();

        blocks.push(TextBlock {
            index: blocks.len(),
            start,
            end,
            text: trimmed.to_string(),
        });

        cursor = end;
    }

    blocks
}

/// Mean characters per whitespace token.
pub fn average_word_length(text: &str) -> f64 {
    let words = split_words(text);
    let total: usize = words.iter().map(|w| w.chars().count()).sum();
    total as f64 / words.len().max(1) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(sentences: &[SentenceOffset]) -> Vec<&str> {
        sentences.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_normalize_punctuation() {
        let input = "Hello\u{201c}World\u{201d}  it\u{2019}s\r\n\r\n\r\nNext";
        let output = normalize_punctuation(input);
        assert_eq!(output, "Hello\"World\" it's\n\nNext");
    }

    #[test]
    fn test_split_sentences_basic() {
        let sentences = split_sentences("The cat sat. The dog ran quickly.");
        assert_eq!(texts(&sentences), vec!["The cat sat.", "The dog ran quickly."]);
        assert_eq!(sentences[1].start, 13);
        assert_eq!(sentences[1].end, 33);
    }

    #[test]
    fn test_split_sentences_keeps_decimals_and_quotes() {
        let text = "Pi is 3.14 roughly. She said \"stop. now\" and left! Why?";
        let sentences = split_sentences(text);
        assert_eq!(
            texts(&sentences),
            vec!["Pi is 3.14 roughly.", "She said \"stop. now\" and left!", "Why?"]
        );
    }

    #[test]
    fn test_split_sentences_contractions_do_not_open_quotes() {
        let sentences = split_sentences("I don't know. It's fine.");
        assert_eq!(texts(&sentences), vec!["I don't know.", "It's fine."]);
    }

    #[test]
    fn test_split_sentences_blank_line_closes_sentence() {
        let sentences = split_sentences("A heading\n\nBody text here. More");
        assert_eq!(texts(&sentences), vec!["A heading", "Body text here.", "More"]);
    }

    #[test]
    fn test_split_sentences_terminator_runs() {
        let sentences = split_sentences("Really?! Yes... (fine.) Done");
        assert_eq!(texts(&sentences), vec!["Really?!", "Yes...", "(fine.)", "Done"]);
    }

    #[test]
    fn test_split_sentences_empty() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n\n  ").is_empty());
    }

    #[test]
    fn test_tokenize_words() {
        let tokens = tokenize_words("I don\u{2019}t think THE results, in 2024, hold.");
        assert_eq!(tokens, vec!["i", "don't", "think", "the", "results", "in", "2024", "hold"]);
    }

    #[test]
    fn test_vocabulary_drops_stop_words() {
        let vocab = vocabulary("The cat and the hat", true);
        assert_eq!(vocab.len(), 2);
        assert!(vocab.contains("cat"));
        assert!(vocab.contains("hat"));
    }

    #[test]
    fn test_split_sections() {
        let text = "First paragraph.\n\n\n  Second paragraph.\nSame block.";
        let blocks = split_sections(text);
        assert_eq!(blocks.len(), 2);
        assert_eq!(blocks[1].text, "Second paragraph.\nSame block.");
        assert_eq!(&text[blocks[1].start..blocks[1].end], blocks[1].text);
    }

    #[test]
    fn test_truncate_to_tokens() {
        assert_eq!(truncate_to_tokens("one two  three four", 2), "one two");
        assert_eq!(truncate_to_tokens("one two", 5), "one two");
        assert_eq!(truncate_to_tokens("one two", 0), "");
    }

    #[test]
    fn test_average_word_length() {
        assert_eq!(average_word_length("ab abcd"), 3.0);
        assert_eq!(average_word_length(""), 0.0);
    }
}
