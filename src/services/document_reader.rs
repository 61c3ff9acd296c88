// Document Reader
// Plain text out of .txt / .docx / .pdf inputs for the CLI

use crate::error::{AuditError, AuditResult};
use crate::services::text_processor::normalize_punctuation;
use docx_rs::{read_docx, DocumentChild, Paragraph, ParagraphChild, RunChild};
use std::fs;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Text,
    Docx,
    Pdf,
}

impl DocumentKind {
    /// Unknown extensions are read as plain text.
    pub fn from_file_name(file_name: &str) -> Self {
        let lower = file_name.to_lowercase();
        if lower.ends_with(".docx") {
            DocumentKind::Docx
        } else if lower.ends_with(".pdf") {
            DocumentKind::Pdf
        } else {
            DocumentKind::Text
        }
    }
}

pub fn read_document(path: &Path) -> AuditResult<String> {
    let bytes = fs::read(path)?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    extract_text(&file_name, &bytes)
}

/// Extract normalized text from raw file bytes; the kind is picked from the file name.
pub fn extract_text(file_name: &str, bytes: &[u8]) -> AuditResult<String> {
    let kind = DocumentKind::from_file_name(file_name);
    let raw = match kind {
        DocumentKind::Text => String::from_utf8_lossy(bytes).to_string(),
        DocumentKind::Docx => extract_docx(bytes)?,
        DocumentKind::Pdf => pdf_extract::extract_text_from_mem(bytes)
            .map_err(|e| AuditError::Extraction(format!("{}: {}", file_name, e)))?,
    };
    let text = normalize_punctuation(&raw);
    debug!(file = file_name, kind = ?kind, chars = text.chars().count(), "document.extracted");
    Ok(text)
}

fn extract_docx(bytes: &[u8]) -> AuditResult<String> {
    let docx = read_docx(bytes)
        .map_err(|e| AuditError::Extraction(format!("docx parse error: {:?}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(para) => Some(paragraph_text(para)),
            _ => None,
        })
        .filter(|text| !text.trim().is_empty())
        .collect();

    // Blank line between paragraphs keeps them as separate sections.
    Ok(paragraphs.join("\n\n"))
}

fn paragraph_text(para: &Paragraph) -> String {
    let mut text = String::new();
    for child in &para.children {
        if let ParagraphChild::Run(run) = child {
            for rc in &run.children {
                match rc {
                    RunChild::Text(t) => text.push_str(&t.text),
                    RunChild::Tab(_) => text.push('\t'),
                    RunChild::Break(_) => text.push('\n'),
                    _ => {}
                }
            }
        }
    }
    text
}
