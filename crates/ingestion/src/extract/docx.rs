//! DOCX text extraction

use crate::errors::ExtractionError;
use docx_rs::{DocumentChild, ParagraphChild, RunChild};
use tracing::debug;

/// Join the text of every body paragraph with `\n`, keeping empty ones
pub fn extract_text_from_docx(bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
    let docx = docx_rs::read_docx(bytes).map_err(|e| ExtractionError::Docx {
        filename: filename.to_string(),
        message: format!("Failed to read DOCX: {}", e),
    })?;

    let paragraphs: Vec<String> = docx
        .document
        .children
        .iter()
        .filter_map(|child| match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(&p.children)),
            _ => None,
        })
        .collect();

    debug!(paragraphs = paragraphs.len(), "Extracted DOCX paragraphs");
    Ok(paragraphs.join("\n"))
}

fn paragraph_text(children: &[ParagraphChild]) -> String {
    let mut text = String::new();
    for child in children {
        match child {
            ParagraphChild::Run(run) => {
                for rc in &run.children {
                    match rc {
                        RunChild::Text(t) => text.push_str(&t.text),
                        RunChild::Tab(_) => text.push('\t'),
                        RunChild::Break(_) => text.push('\n'),
                        _ => {}
                    }
                }
            }
            ParagraphChild::Hyperlink(link) => text.push_str(&paragraph_text(&link.children)),
            _ => {}
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{Docx, Paragraph, Run};
    use std::io::Cursor;

    fn sample_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for text in paragraphs {
            let mut paragraph = Paragraph::new();
            if !text.is_empty() {
                paragraph = paragraph.add_run(Run::new().add_text(*text));
            }
            docx = docx.add_paragraph(paragraph);
        }

        let mut cursor = Cursor::new(Vec::new());
        docx.build().pack(&mut cursor).unwrap();
        cursor.into_inner()
    }

    #[test]
    fn test_paragraphs_joined_with_newlines() {
        let bytes = sample_docx(&["First paragraph", "", "Third paragraph"]);
        let text = extract_text_from_docx(&bytes, "memo.docx").unwrap();
        assert_eq!(text, "First paragraph\n\nThird paragraph");
    }

    #[test]
    fn test_runs_and_tabs() {
        let paragraph = Paragraph::new()
            .add_run(Run::new().add_text("Name"))
            .add_run(Run::new().add_tab().add_text("Value"));
        let mut cursor = Cursor::new(Vec::new());
        Docx::new().add_paragraph(paragraph).build().pack(&mut cursor).unwrap();

        let text = extract_text_from_docx(&cursor.into_inner(), "table.docx").unwrap();
        assert_eq!(text, "Name\tValue");
    }
}
