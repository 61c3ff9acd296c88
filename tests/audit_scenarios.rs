use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::thread;
use voice_audit_lib::models::{count_kind, AlignmentOp, ChangeKind, ChangeSet, OpKind, RiskTier, Span};
use voice_audit_lib::services::audit::{align, classify, extract_metrics, score};
use voice_audit_lib::services::config_store::AuditConfig;
use voice_audit_lib::services::lexicon::{Lexicon, MarkerCategory};
use voice_audit_lib::services::text_processor::{split_sentences, split_words};
use voice_audit_lib::{AuditEngine, AuditError};

fn sentences(text: &str) -> Vec<String> {
    split_sentences(text).into_iter().map(|s| s.text).collect()
}

fn change_set(source: &str, target: &str) -> ChangeSet {
    let (ss, ts) = (sentences(source), sentences(target));
    let (sw, tw) = (split_words(source), split_words(target));
    ChangeSet {
        sentences: classify(&align(&ss, &ts), &ss, &ts).unwrap(),
        words: classify(&align(&sw, &tw), &sw, &tw).unwrap(),
    }
}

#[test]
fn test_cat_dog_scenario() {
    let source = "The cat sat. The dog ran.";
    let target = "The cat sat. The dog ran quickly.";

    let (ss, ts) = (sentences(source), sentences(target));
    let ops = align(&ss, &ts);
    assert_eq!(
        ops,
        vec![
            AlignmentOp::equal(Span::new(0, 1), Span::new(0, 1)),
            AlignmentOp::replace(Span::new(1, 2), Span::new(1, 2)),
        ]
    );

    let records = classify(&ops, &ss, &ts).unwrap();
    assert_eq!(count_kind(&records, ChangeKind::Unchanged), 1);
    assert_eq!(count_kind(&records, ChangeKind::Modified), 1);

    let engine = AuditEngine::with_builtin_lexicon(AuditConfig::default());
    let report = engine.compare(source, target).unwrap();
    assert!(report.summary.change_percentage > 0.0);
    assert!(report.summary.change_percentage < 100.0);
}

#[test]
fn test_identical_texts_are_fully_preserved() {
    let text = "When I was small, my grandmother said the river remembers everything.\n\n\
                We don't forget either. Isn't that the point?";
    let lexicon = Lexicon::builtin();
    let metrics = extract_metrics(text, text, &lexicon, &change_set(text, text));
    let result = score(&metrics).unwrap();
    assert_eq!(result.overall_score, 100.0);
    assert_eq!(result.risk_tier, RiskTier::Low);
    assert_eq!(result.risk_level, "LOW - Voice Authentic");
}

#[test]
fn test_empty_target_removes_everything() {
    let source = "The cat sat. The dog ran.";
    let changes = change_set(source, "");
    assert!(changes.sentences.iter().all(|r| r.kind == ChangeKind::Removed));
    assert!(changes.words.iter().all(|r| r.kind == ChangeKind::Removed));
    assert_eq!(changes.words.len(), 6);

    let metrics = extract_metrics(source, "", &Lexicon::builtin(), &changes);
    assert_eq!(metrics.score("lexical_identity"), Some(0.0));
    let result = score(&metrics).unwrap();
    assert!((0.0..=100.0).contains(&result.overall_score));
}

#[test]
fn test_high_frequency_phrase_counted_once() {
    let engine = AuditEngine::with_builtin_lexicon(AuditConfig::default());
    let report = engine
        .detect_markers("Well, IT IS IMPORTANT TO NOTE THAT my sister cooks rice every day.")
        .unwrap();
    assert_eq!(report.category_counts["high_frequency"], 1);
    assert_eq!(report.high_frequency_phrases.len(), 1);
    assert_eq!(report.raw_density, 2.0);
}

#[test]
fn test_synthetic_lexicon_drives_scoring() {
    let lexicon = Lexicon::from_categories([
        (MarkerCategory::HighFrequency, vec!["blue sky thinking"]),
        (MarkerCategory::TransitionWords, vec!["anyway"]),
    ])
    .unwrap();
    let engine = AuditEngine::new(Arc::new(lexicon), AuditConfig::default());

    let report = engine
        .detect_markers("Anyway, blue sky thinking wins. Anyway.")
        .unwrap();
    assert_eq!(report.category_counts["high_frequency"], 1);
    assert_eq!(report.category_counts["transition_words"], 2);
    assert_eq!(report.raw_density, 4.0);
}

#[test]
fn test_full_audit_homogenized_revision() {
    let source = "As for my village, the elders have been telling stories by the river. \
                  I don't think anyone forgets them! Family is very very important to us.";
    let target = "It is important to note that the village has a rich tradition of storytelling. \
                  Moreover, these narratives play a crucial role in the community. \
                  In conclusion, heritage is paramount.";

    let engine = AuditEngine::with_builtin_lexicon(AuditConfig::default());
    let report = engine.full_audit(source, target).unwrap();

    assert!(report.summary.overall_score < 70.0, "{}", report.summary.overall_score);
    assert_ne!(report.summary.risk_level, "LOW - Voice Authentic");
    assert!(report.summary.aitism_score > report.source_markers.ai_ism_score);
    assert!(!report.l2_voice.voice_loss_analysis.lost_structures.is_empty());
    assert_eq!(report.comparison.summary.total_sentences_original, 3);

    let json = serde_json::to_value(&report).unwrap();
    assert!(json["voicePreservation"]["overallScore"].is_number());
    assert!(json["voicePreservation"]["componentScores"]["lexicalIdentity"].is_number());
    assert!(json["summary"]["aitismScore"].is_number());
}

#[test]
fn test_comparative_operations_require_both_texts() {
    let engine = AuditEngine::with_builtin_lexicon(AuditConfig::default());
    for result in [
        engine.full_audit("draft", "").map(|_| ()),
        engine.voice_preservation("", "revision").map(|_| ()),
        engine.compare(" ", "revision").map(|_| ()),
    ] {
        assert!(matches!(result, Err(AuditError::InvalidInput(_))));
    }
}

#[test]
fn test_concurrent_audits_are_independent() {
    let engine = Arc::new(AuditEngine::with_builtin_lexicon(AuditConfig::default()));
    let pairs = vec![
        ("The cat sat. The dog ran.", "The cat sat. The dog ran quickly."),
        ("We walked home.", "We walked home."),
        ("I think so? Maybe!", "Perhaps it is so."),
    ];

    let expected: Vec<f64> = pairs
        .iter()
        .map(|(s, t)| engine.voice_preservation(s, t).unwrap().composite.overall_score)
        .collect();

    let handles: Vec<_> = pairs
        .into_iter()
        .map(|(s, t)| {
            let engine = Arc::clone(&engine);
            thread::spawn(move || engine.voice_preservation(s, t).unwrap().composite.overall_score)
        })
        .collect();
    let actual: Vec<f64> = handles.into_iter().map(|h| h.join().unwrap()).collect();

    assert_eq!(actual, expected);
    assert_eq!(actual[1], 100.0);
}

#[test]
fn test_word_alignment_kinds() {
    let engine = AuditEngine::with_builtin_lexicon(AuditConfig::default());
    let ops = engine
        .align_words("my grandmother grew rice", "my grandmother cultivated rice paddies")
        .unwrap();
    let kinds: Vec<OpKind> = ops.iter().map(|op| op.kind).collect();
    assert_eq!(kinds, vec![OpKind::Equal, OpKind::Replace, OpKind::Equal, OpKind::Insert]);
}

#[test]
fn test_long_document_with_early_edit_fits_default_budget() {
    let words: Vec<String> = (0..10_000).map(|i| format!("w{}", i)).collect();
    let source = words.join(" ");
    let mut edited = words.clone();
    edited[0] = "changed".to_string();
    let target = edited.join(" ");

    let engine = AuditEngine::with_builtin_lexicon(AuditConfig::default());
    let report = engine.compare(&source, &target).unwrap();
    assert_eq!(count_kind(&report.word_changes, ChangeKind::Modified), 1);
    assert_eq!(count_kind(&report.word_changes, ChangeKind::Unchanged), 9_999);
}
