// L2 Voice Analysis
// Second-language structures, cultural imagery and L1-transfer markers worth
// protecting, and which of them a revision dropped.

use super::markers::round2;
use crate::models::{
    CulturalReference, L1InterferenceMarker, L2Structure, L2VoiceAnalysis, L2VoiceReport,
    PreservationValue, StructureKind, VoiceLossAnalysis, VoiceLossInstance,
};
use crate::services::lexicon::Lexicon;
use crate::services::text_processor::split_sentences;
use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;

const CONTEXT_CHARS: usize = 50;
const MAX_LOSS_INSTANCES: usize = 3;

fn object_verb_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:must|need|require|can|should|will)\b.*(?:complete|solve|done|finished|correct)")
            .expect("object verb regex")
    })
}

fn aspect_marking_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(?:is|are|be)\s+\w+ing\b|\b(?:has|have)\s+been\b|\b(?:used\s+to|would\s+always)\b")
            .expect("aspect marking regex")
    })
}

fn topic_prominent_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)^(?:as\s+for|speaking\s+of|in\s+terms\s+of|regarding|concerning)\b")
            .expect("topic prominent regex")
    })
}

fn sentence_structures(index: usize, sentence: &str) -> Vec<L2Structure> {
    let mut found = Vec::new();
    let mut push = |kind, value, reason: Option<&str>| {
        found.push(L2Structure {
            kind,
            sentence_index: index,
            sentence: sentence.to_string(),
            preservation_value: value,
            reason: reason.map(str::to_string),
        })
    };
    if object_verb_re().is_match(sentence) {
        push(
            StructureKind::ObjectVerbOrdering,
            PreservationValue::High,
            Some("Valid L2 structural pattern showing L1 influence"),
        );
    }
    if aspect_marking_re().is_match(sentence) {
        push(StructureKind::AspectMarking, PreservationValue::High, None);
    }
    if topic_prominent_re().is_match(sentence) {
        push(StructureKind::TopicProminent, PreservationValue::Medium, None);
    }
    found
}

/// Up to `CONTEXT_CHARS` characters either side of `start..end`, within one line.
fn context_window(text: &str, start: usize, end: usize) -> String {
    let before: String = {
        let mut chars: Vec<char> = text[..start]
            .chars()
            .rev()
            .take_while(|c| *c != '\n')
            .take(CONTEXT_CHARS)
            .collect();
        chars.reverse();
        chars.into_iter().collect()
    };
    let after: String = text[end..]
        .chars()
        .take_while(|c| *c != '\n')
        .take(CONTEXT_CHARS)
        .collect();
    format!("{}{}{}", before, &text[start..end], after)
}

fn cultural_references(text: &str, lexicon: &Lexicon) -> Vec<CulturalReference> {
    let mut found = Vec::new();
    for (category, patterns) in lexicon.cultural_metaphors() {
        for pattern in patterns {
            if let Some(m) = pattern.regex().find(text) {
                found.push(CulturalReference {
                    category: category.clone(),
                    marker: pattern.text.clone(),
                    context: context_window(text, m.start(), m.end()),
                });
            }
        }
    }
    found
}

fn l1_interference(text: &str, lexicon: &Lexicon) -> Vec<L1InterferenceMarker> {
    let lower = text.to_lowercase();
    let mut found = Vec::new();
    for (language, markers) in lexicon.l2_interference() {
        for marker in markers {
            if lower.contains(&marker.to_lowercase()) {
                found.push(L1InterferenceMarker {
                    l1_language: language.clone(),
                    marker: marker.clone(),
                });
            }
        }
    }
    found
}

/// `min(100, structures/sentences·60 + min(cultural·10, 40))`; 0 without sentences.
pub fn voice_strength(structures: usize, cultural: usize, sentences: usize) -> f64 {
    if sentences == 0 {
        return 0.0;
    }
    let structure_score = structures as f64 / sentences as f64 * 60.0;
    let cultural_score = (cultural as f64 * 10.0).min(40.0);
    (structure_score + cultural_score).min(100.0)
}

fn authenticity_summary(
    strength: f64,
    cultural: usize,
    l1_markers: usize,
) -> Vec<String> {
    let mut lines = Vec::new();
    lines.push(
        if strength > 70.0 {
            "STRONG L2 VOICE: Multiple authentic linguistic patterns detected"
        } else if strength > 40.0 {
            "MODERATE L2 VOICE: Some authentic patterns present"
        } else {
            "WEAK L2 VOICE: Few distinguishing L2 features detected"
        }
        .to_string(),
    );
    if cultural > 0 {
        lines.push(format!("{} cultural references detected", cultural));
    }
    if l1_markers > 0 {
        lines.push(format!("{} L1 transfer patterns (authentic)", l1_markers));
    }
    lines
}

pub fn detect_l2_structures(text: &str, lexicon: &Lexicon) -> L2VoiceAnalysis {
    let sentences = split_sentences(text);
    let structures: Vec<L2Structure> = sentences
        .iter()
        .enumerate()
        .flat_map(|(i, s)| sentence_structures(i, &s.text))
        .collect();
    let cultural_references = cultural_references(text, lexicon);
    let l1_interference_markers = l1_interference(text, lexicon);

    let strength = round2(voice_strength(
        structures.len(),
        cultural_references.len(),
        sentences.len(),
    ));
    let authenticity_indicators = authenticity_summary(
        strength,
        cultural_references.len(),
        l1_interference_markers.len(),
    );

    L2VoiceAnalysis {
        structures,
        cultural_references,
        l1_interference_markers,
        voice_strength_score: strength,
        authenticity_indicators,
    }
}

/// Items of `original` missing from `edited`, first-seen order, no repeats.
fn lost<'a>(original: impl Iterator<Item = &'a str>, edited: impl Iterator<Item = &'a str>) -> Vec<String> {
    let kept: HashSet<&str> = edited.collect();
    let mut seen = HashSet::new();
    original
        .filter(|item| !kept.contains(item) && seen.insert(*item))
        .map(str::to_string)
        .collect()
}

pub fn detect_voice_loss(
    original: &L2VoiceAnalysis,
    edited: &L2VoiceAnalysis,
) -> VoiceLossAnalysis {
    let lost_structures = lost(
        original.structures.iter().map(|s| s.sentence.as_str()),
        edited.structures.iter().map(|s| s.sentence.as_str()),
    );
    let lost_cultural_references = lost(
        original.cultural_references.iter().map(|c| c.context.as_str()),
        edited.cultural_references.iter().map(|c| c.context.as_str()),
    );
    let lost_l1_markers = lost(
        original.l1_interference_markers.iter().map(|m| m.marker.as_str()),
        edited.l1_interference_markers.iter().map(|m| m.marker.as_str()),
    );

    let specific_instances = lost_structures
        .iter()
        .take(MAX_LOSS_INSTANCES)
        .map(|sentence| VoiceLossInstance {
            original: sentence.clone(),
            loss_severity: "HIGH".to_string(),
            recommendation: "Consider restoring this authentic L2 pattern".to_string(),
        })
        .collect();

    VoiceLossAnalysis {
        lost_structures,
        lost_cultural_references,
        lost_l1_markers,
        total_voice_loss: round2(
            (original.voice_strength_score - edited.voice_strength_score).max(0.0),
        ),
        specific_instances,
    }
}

pub fn l2_voice_report(source: &str, target: &str, lexicon: &Lexicon) -> L2VoiceReport {
    let structure_analysis = detect_l2_structures(source, lexicon);
    let edited = detect_l2_structures(target, lexicon);
    let voice_loss_analysis = detect_voice_loss(&structure_analysis, &edited);
    L2VoiceReport {
        structure_analysis,
        voice_loss_analysis,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_detection() {
        let lexicon = Lexicon::builtin();
        let text = "This problem we must solve together. As for me, I am liking it. She has been here.";
        let analysis = detect_l2_structures(text, &lexicon);
        let kinds: Vec<(usize, StructureKind)> =
            analysis.structures.iter().map(|s| (s.sentence_index, s.kind)).collect();
        assert_eq!(
            kinds,
            vec![
                (0, StructureKind::ObjectVerbOrdering),
                (1, StructureKind::TopicProminent),
                (2, StructureKind::AspectMarking),
            ]
        );
        assert_eq!(analysis.structures[1].preservation_value, PreservationValue::Medium);
    }

    #[test]
    fn test_cultural_reference_context() {
        let lexicon = Lexicon::builtin();
        let analysis = detect_l2_structures("We climbed the mountain at dawn.\nNext line.", &lexicon);
        assert_eq!(analysis.cultural_references.len(), 1);
        let reference = &analysis.cultural_references[0];
        assert_eq!(reference.category, "nature");
        assert_eq!(reference.context, "We climbed the mountain at dawn.");
    }

    #[test]
    fn test_l1_interference_markers() {
        let lexicon = Lexicon::builtin();
        let analysis = detect_l2_structures("Please open the light. It is very very dark.", &lexicon);
        let markers: Vec<&str> = analysis
            .l1_interference_markers
            .iter()
            .map(|m| m.marker.as_str())
            .collect();
        assert_eq!(markers, vec!["very very", "open the light"]);
        assert!(analysis.authenticity_indicators.iter().any(|l| l.contains("L1 transfer")));
    }

    #[test]
    fn test_custom_lexicon_groups() {
        let lexicon = Lexicon::default()
            .with_l2_interference("tagalog", &["open the aircon"])
            .with_cultural_metaphors("food", &["Rice", "tea"])
            .unwrap();
        let analysis = detect_l2_structures("We drink TEA, not steam. Please open the aircon.", &lexicon);
        assert_eq!(analysis.cultural_references.len(), 1);
        assert_eq!(analysis.cultural_references[0].category, "food");
        assert_eq!(analysis.cultural_references[0].marker, "tea");
        assert_eq!(analysis.l1_interference_markers[0].l1_language, "tagalog");
    }

    #[test]
    fn test_voice_strength() {
        assert_eq!(voice_strength(0, 0, 0), 0.0);
        assert_eq!(voice_strength(1, 0, 2), 30.0);
        assert_eq!(voice_strength(4, 9, 2), 100.0);
        assert_eq!(voice_strength(0, 9, 3), 40.0);
    }

    #[test]
    fn test_voice_loss() {
        let lexicon = Lexicon::builtin();
        let report = l2_voice_report(
            "This homework we must complete. My family is very very proud.",
            "We completed the homework. Our relatives are proud.",
            &lexicon,
        );
        let loss = &report.voice_loss_analysis;
        assert_eq!(loss.lost_structures, vec!["This homework we must complete.".to_string()]);
        assert_eq!(loss.lost_l1_markers, vec!["very very".to_string()]);
        assert_eq!(loss.lost_cultural_references.len(), 1);
        assert_eq!(loss.specific_instances.len(), 1);
        assert!(loss.total_voice_loss > 0.0);
    }
}
