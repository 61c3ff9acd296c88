// Marker Lexicon
// Read-only category → phrase lists, compiled once and shared by reference.

use crate::error::{AuditError, AuditResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarkerCategory {
    HighFrequency,
    FormulaicStructures,
    HedgingQualifiers,
    AcademicCliches,
    TransitionWords,
    GenericOpeners,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Literal text anywhere, case-insensitive.
    Substring,
    /// Literal text anchored on word boundaries, case-insensitive.
    WordBoundary,
    /// Entry is a regex matched at the start of each sentence.
    SentenceOpening,
}

#[derive(Debug, Clone, Copy)]
pub struct CategoryRule {
    pub category: MarkerCategory,
    pub mode: MatchMode,
    pub weight: f64,
    /// Occurrences beyond the cap add nothing to the density score.
    pub cap: Option<usize>,
}

pub const CATEGORY_RULES: [CategoryRule; 6] = [
    CategoryRule {
        category: MarkerCategory::HighFrequency,
        mode: MatchMode::Substring,
        weight: 2.0,
        cap: None,
    },
    CategoryRule {
        category: MarkerCategory::FormulaicStructures,
        mode: MatchMode::SentenceOpening,
        weight: 1.5,
        cap: None,
    },
    CategoryRule {
        category: MarkerCategory::HedgingQualifiers,
        mode: MatchMode::WordBoundary,
        weight: 0.5,
        cap: None,
    },
    CategoryRule {
        category: MarkerCategory::AcademicCliches,
        mode: MatchMode::Substring,
        weight: 1.5,
        cap: None,
    },
    CategoryRule {
        category: MarkerCategory::TransitionWords,
        mode: MatchMode::WordBoundary,
        weight: 1.0,
        cap: Some(20),
    },
    CategoryRule {
        category: MarkerCategory::GenericOpeners,
        mode: MatchMode::Substring,
        weight: 2.0,
        cap: None,
    },
];

impl MarkerCategory {
    pub const ALL: [MarkerCategory; 6] = [
        MarkerCategory::HighFrequency,
        MarkerCategory::FormulaicStructures,
        MarkerCategory::HedgingQualifiers,
        MarkerCategory::AcademicCliches,
        MarkerCategory::TransitionWords,
        MarkerCategory::GenericOpeners,
    ];

    pub fn key(self) -> &'static str {
        match self {
            MarkerCategory::HighFrequency => "high_frequency",
            MarkerCategory::FormulaicStructures => "formulaic_structures",
            MarkerCategory::HedgingQualifiers => "hedging_qualifiers",
            MarkerCategory::AcademicCliches => "academic_cliches",
            MarkerCategory::TransitionWords => "transition_words",
            MarkerCategory::GenericOpeners => "generic_openers",
        }
    }

    pub fn rule(self) -> &'static CategoryRule {
        CATEGORY_RULES
            .iter()
            .find(|r| r.category == self)
            .unwrap_or(&CATEGORY_RULES[0])
    }
}

/// One lexicon entry together with its compiled matcher.
#[derive(Debug, Clone)]
pub struct MarkerPattern {
    pub text: String,
    regex: Regex,
}

impl MarkerPattern {
    fn compile(text: &str, mode: MatchMode) -> AuditResult<Self> {
        let source = match mode {
            MatchMode::Substring => format!("(?i){}", regex::escape(text)),
            MatchMode::WordBoundary => format!(r"(?i)\b{}\b", regex::escape(text)),
            MatchMode::SentenceOpening => format!("(?i)^(?:{})", text),
        };
        let regex = Regex::new(&source)
            .map_err(|e| AuditError::Lexicon(format!("bad pattern {:?}: {}", text, e)))?;
        Ok(Self {
            text: text.to_string(),
            regex,
        })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    markers: BTreeMap<MarkerCategory, Vec<MarkerPattern>>,
    l2_interference: BTreeMap<String, Vec<String>>,
    cultural_metaphors: BTreeMap<String, Vec<MarkerPattern>>,
    cultural_keywords: Vec<String>,
}

/// Metaphor keywords match as whole words, case-insensitively.
fn compile_metaphors<I, S>(keywords: I) -> AuditResult<Vec<MarkerPattern>>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keywords
        .into_iter()
        .map(|k| MarkerPattern::compile(&k.as_ref().to_lowercase(), MatchMode::WordBoundary))
        .collect()
}

// ============ On-disk layout ============

#[derive(Debug, Deserialize, Default)]
struct LexiconFile {
    #[serde(default)]
    ai_markers: AiMarkersFile,
    #[serde(default)]
    voice_preservation_markers: VoiceMarkersFile,
}

#[derive(Debug, Deserialize, Default)]
struct AiMarkersFile {
    #[serde(default)]
    high_frequency: Vec<String>,
    #[serde(default)]
    formulaic_structures: Vec<String>,
    #[serde(default)]
    hedging_qualifiers: Vec<String>,
    #[serde(default, alias = "academic_clichés")]
    academic_cliches: Vec<String>,
    #[serde(default, alias = "transition_abuse")]
    transition_words: Vec<String>,
    #[serde(default)]
    generic_openers: Vec<String>,
    #[serde(default)]
    l2_interference_markers: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Deserialize, Default)]
struct VoiceMarkersFile {
    #[serde(default)]
    cultural_metaphors: MetaphorGroups,
    #[serde(default)]
    cultural_keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum MetaphorGroups {
    Grouped(BTreeMap<String, Vec<String>>),
    Flat(Vec<String>),
}

impl Default for MetaphorGroups {
    fn default() -> Self {
        MetaphorGroups::Grouped(BTreeMap::new())
    }
}

impl Lexicon {
    /// Build a lexicon from raw category lists. Formulaic entries must be valid regexes.
    pub fn from_categories<I, S>(entries: I) -> AuditResult<Self>
    where
        I: IntoIterator<Item = (MarkerCategory, Vec<S>)>,
        S: AsRef<str>,
    {
        let mut markers: BTreeMap<MarkerCategory, Vec<MarkerPattern>> = BTreeMap::new();
        for (category, phrases) in entries {
            let mode = category.rule().mode;
            let compiled = markers.entry(category).or_default();
            for phrase in phrases {
                let phrase = phrase.as_ref().trim();
                if phrase.is_empty() {
                    continue;
                }
                compiled.push(MarkerPattern::compile(phrase, mode)?);
            }
        }
        Ok(Self {
            markers,
            ..Self::default()
        })
    }

    pub fn with_l2_interference(mut self, language: &str, markers: &[&str]) -> Self {
        self.l2_interference.insert(
            language.to_string(),
            markers.iter().map(|m| m.to_string()).collect(),
        );
        self
    }

    pub fn with_cultural_metaphors(mut self, group: &str, keywords: &[&str]) -> AuditResult<Self> {
        self.cultural_metaphors
            .insert(group.to_string(), compile_metaphors(keywords)?);
        Ok(self)
    }

    pub fn with_cultural_keywords(mut self, keywords: &[&str]) -> Self {
        self.cultural_keywords = keywords.iter().map(|k| k.to_lowercase()).collect();
        self
    }

    /// Parse the marker database JSON layout (`ai_markers` / `voice_preservation_markers`).
    pub fn from_json_str(json: &str) -> AuditResult<Self> {
        let file: LexiconFile = serde_json::from_str(json)
            .map_err(|e| AuditError::Lexicon(format!("Failed to parse lexicon: {}", e)))?;

        let ai = file.ai_markers;
        let mut lexicon = Self::from_categories([
            (MarkerCategory::HighFrequency, ai.high_frequency),
            (MarkerCategory::FormulaicStructures, ai.formulaic_structures),
            (MarkerCategory::HedgingQualifiers, ai.hedging_qualifiers),
            (MarkerCategory::AcademicCliches, ai.academic_cliches),
            (MarkerCategory::TransitionWords, ai.transition_words),
            (MarkerCategory::GenericOpeners, ai.generic_openers),
        ])?;
        lexicon.l2_interference = ai.l2_interference_markers;

        let voice = file.voice_preservation_markers;
        let groups = match voice.cultural_metaphors {
            MetaphorGroups::Grouped(groups) => groups,
            MetaphorGroups::Flat(list) => BTreeMap::from([("general".to_string(), list)]),
        };
        for (group, keywords) in groups {
            lexicon
                .cultural_metaphors
                .insert(group, compile_metaphors(keywords)?);
        }
        lexicon.cultural_keywords = voice
            .cultural_keywords
            .into_iter()
            .map(|s| s.to_lowercase())
            .collect();

        Ok(lexicon)
    }

    pub fn from_path(path: &Path) -> AuditResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            AuditError::Lexicon(format!("Failed to read lexicon {}: {}", path.display(), e))
        })?;
        Self::from_json_str(&content)
    }

    /// Default English marker set.
    pub fn builtin() -> Self {
        Self::from_json_str(BUILTIN_LEXICON).expect("builtin lexicon")
    }

    pub fn patterns(&self, category: MarkerCategory) -> &[MarkerPattern] {
        self.markers
            .get(&category)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn l2_interference(&self) -> &BTreeMap<String, Vec<String>> {
        &self.l2_interference
    }

    pub fn cultural_metaphors(&self) -> &BTreeMap<String, Vec<MarkerPattern>> {
        &self.cultural_metaphors
    }

    pub fn cultural_keywords(&self) -> &[String] {
        &self.cultural_keywords
    }

    /// Total case-insensitive occurrences of every pattern in `category`.
    pub fn count_matches(&self, category: MarkerCategory, text: &str) -> usize {
        self.patterns(category)
            .iter()
            .map(|p| p.regex().find_iter(text).count())
            .sum()
    }
}

const BUILTIN_LEXICON: &str = r#"{
  "ai_markers": {
    "high_frequency": [
      "delve into", "it is important to note that", "in today's fast-paced world",
      "plays a crucial role", "a testament to", "navigate the complexities", "tapestry",
      "multifaceted", "in the realm of", "pivotal role", "ever-evolving",
      "foster a sense of", "underscores the importance", "shed light on", "a myriad of",
      "seamlessly", "leverage", "holistic approach", "intricate", "paramount"
    ],
    "formulaic_structures": [
      "in (?:conclusion|summary)\\b",
      "it is (?:important|essential|crucial|worth noting) (?:to|that)\\b",
      "this (?:essay|paper|article) (?:will|aims to|seeks to)\\b",
      "(?:overall|ultimately),",
      "not only\\b.+\\bbut also\\b",
      "as (?:we|society) (?:move|navigate)\\b",
      "one of the most\\b"
    ],
    "hedging_qualifiers": [
      "arguably", "potentially", "perhaps", "somewhat", "relatively", "generally",
      "typically", "possibly", "seemingly", "presumably", "apparently", "might"
    ],
    "academic_clichés": [
      "in conclusion", "since the dawn of time", "throughout history", "plays a vital role",
      "double-edged sword", "the fact of the matter", "at the end of the day",
      "food for thought", "in this day and age", "a key factor"
    ],
    "transition_abuse": [
      "furthermore", "moreover", "additionally", "however", "therefore", "consequently",
      "thus", "hence", "nevertheless", "nonetheless", "in addition", "on the other hand",
      "as a result", "subsequently"
    ],
    "generic_openers": [
      "in today's world", "in today's society", "in the modern era",
      "throughout human history", "in recent years", "in an increasingly",
      "as technology continues to", "when it comes to"
    ],
    "l2_interference_markers": {
      "mandarin": ["very very", "more and more", "open the light", "close the light", "people mountain people sea"],
      "spanish": ["make a party", "have reason", "explain me"],
      "korean": ["eye shopping", "skinship"],
      "hindi": ["do the needful", "prepone", "kindly revert"]
    }
  },
  "voice_preservation_markers": {
    "cultural_metaphors": {
      "family": ["family", "parent", "ancestor", "elder", "sibling", "household"],
      "nature": ["mountain", "river", "moon", "wind", "bamboo", "desert", "ocean"]
    },
    "cultural_keywords": ["family", "culture", "home", "tradition"]
  }
}"#;
