// VoiceAudit Core Services

pub mod text_processor;
pub mod config_store;
pub mod lexicon;
pub mod document_reader;
pub mod audit;

pub use text_processor::*;
pub use config_store::*;
pub use lexicon::{Lexicon, MarkerCategory};
pub use document_reader::{extract_text, read_document};

pub use audit::{
    align,
    classify,
    extract_metrics,
    score,
    AuditEngine,
};
