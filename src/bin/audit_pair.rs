use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};
use voice_audit_lib::services::config_store::{AppConfig, ConfigStore};
use voice_audit_lib::services::document_reader::read_document;
use voice_audit_lib::AuditEngine;

const USAGE: &str = "Usage:
  audit_pair <original> <edited> [--mode full|markers|compare|voice] [--pair <original> <edited>]...
             [--config <path>] [--lexicon <path>] [--out <json_path>]

Notes:
  - Inputs may be .txt, .docx or .pdf.
  - Every --pair is audited independently and concurrently.
  - `markers` reports the edited document only.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
enum Mode {
    Full,
    Markers,
    Compare,
    Voice,
}

impl Mode {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "full" => Ok(Mode::Full),
            "markers" => Ok(Mode::Markers),
            "compare" => Ok(Mode::Compare),
            "voice" => Ok(Mode::Voice),
            other => bail!("unknown mode {:?}", other),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PairOutcome {
    original: String,
    edited: String,
    elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Envelope {
    request_id: String,
    generated_at: String,
    mode: Mode,
    version: &'static str,
    results: Vec<PairOutcome>,
}

fn parse_arg_value(args: &[String], key: &str) -> Option<String> {
    args.iter()
        .position(|a| a == key)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_pairs(args: &[String]) -> Result<Vec<(PathBuf, PathBuf)>> {
    let mut pairs = Vec::new();

    let positional: Vec<&String> = args
        .iter()
        .skip(1)
        .take_while(|a| !a.starts_with("--"))
        .collect();
    match positional.as_slice() {
        [] => {}
        [original, edited] => pairs.push((PathBuf::from(original), PathBuf::from(edited))),
        _ => bail!("expected <original> <edited>, got {} positional arguments", positional.len()),
    }

    let mut i = 0;
    while i < args.len() {
        if args[i] == "--pair" {
            let (Some(original), Some(edited)) = (args.get(i + 1), args.get(i + 2)) else {
                bail!("--pair needs two paths");
            };
            pairs.push((PathBuf::from(original), PathBuf::from(edited)));
            i += 3;
        } else {
            i += 1;
        }
    }

    Ok(pairs)
}

fn load_config(args: &[String]) -> Result<AppConfig> {
    let mut config = match parse_arg_value(args, "--config") {
        Some(path) => ConfigStore::from_file(PathBuf::from(&path))
            .load()
            .with_context(|| format!("loading config {}", path))?,
        None => match ConfigStore::default_config_dir() {
            Some(dir) => ConfigStore::new(dir).load().context("loading default config")?,
            None => AppConfig::default(),
        },
    };
    if let Some(lexicon) = parse_arg_value(args, "--lexicon") {
        config.lexicon_path = Some(lexicon);
    }
    Ok(config)
}

fn run_pair(engine: &AuditEngine, mode: Mode, original: &Path, edited: &Path) -> Result<serde_json::Value> {
    let source = read_document(original).with_context(|| format!("reading {}", original.display()))?;
    let target = read_document(edited).with_context(|| format!("reading {}", edited.display()))?;

    let report = match mode {
        Mode::Full => serde_json::to_value(engine.full_audit(&source, &target)?)?,
        Mode::Markers => serde_json::to_value(engine.detect_markers(&target)?)?,
        Mode::Compare => serde_json::to_value(engine.compare(&source, &target)?)?,
        Mode::Voice => serde_json::to_value(engine.voice_preservation(&source, &target)?)?,
    };
    Ok(report)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.iter().any(|a| a == "--help" || a == "-h") {
        eprintln!("{}", USAGE);
        return Ok(());
    }

    voice_audit_lib::init_logging();

    let mode = match parse_arg_value(&args, "--mode") {
        Some(value) => Mode::parse(&value)?,
        None => Mode::Full,
    };
    let pairs = parse_pairs(&args)?;
    if pairs.is_empty() {
        bail!("no document pair given\n\n{}", USAGE);
    }
    let out_path = parse_arg_value(&args, "--out");

    let config = load_config(&args)?;
    let engine = Arc::new(AuditEngine::from_app_config(&config)?);
    let request_id = uuid::Uuid::new_v4().to_string();
    info!(request_id = %request_id, pairs = pairs.len(), mode = ?mode, "audit_pair.start");

    let handles: Vec<_> = pairs
        .into_iter()
        .map(|(original, edited)| {
            let engine = Arc::clone(&engine);
            tokio::task::spawn_blocking(move || {
                let t0 = Instant::now();
                let result = run_pair(&engine, mode, &original, &edited);
                (original, edited, t0.elapsed().as_millis() as u64, result)
            })
        })
        .collect();

    let mut results = Vec::with_capacity(handles.len());
    for handle in handles {
        let (original, edited, elapsed_ms, result) = handle.await.context("audit task panicked")?;
        let (report, error) = match result {
            Ok(report) => (Some(report), None),
            Err(e) => {
                warn!(original = %original.display(), edited = %edited.display(), error = %e, "audit_pair.failed");
                (None, Some(format!("{:#}", e)))
            }
        };
        results.push(PairOutcome {
            original: original.display().to_string(),
            edited: edited.display().to_string(),
            elapsed_ms,
            report,
            error,
        });
    }

    let failed = results.iter().filter(|r| r.error.is_some()).count();
    let envelope = Envelope {
        request_id: request_id.clone(),
        generated_at: chrono::Utc::now().to_rfc3339(),
        mode,
        version: env!("CARGO_PKG_VERSION"),
        results,
    };

    let json = serde_json::to_string_pretty(&envelope)?;
    match out_path {
        Some(path) => {
            std::fs::write(&path, &json).with_context(|| format!("writing {}", path))?;
            eprintln!("Wrote JSON: {}", path);
        }
        None => println!("{}", json),
    }

    info!(request_id = %request_id, failed, "audit_pair.complete");
    if failed > 0 {
        bail!("{} of {} audits failed", failed, envelope.results.len());
    }
    Ok(())
}
