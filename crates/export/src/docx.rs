//! DOCX export

use crate::{ExportError, ExportSource};
use docx_rs::{Docx, Paragraph, Run, Style, StyleType};
use std::io::Cursor;

const HEADING_STYLE: &str = "Heading1";

fn text_paragraph(text: &str) -> Paragraph {
    let paragraph = Paragraph::new();
    if text.is_empty() {
        paragraph
    } else {
        paragraph.add_run(Run::new().add_text(text))
    }
}

pub fn render_docx(source: &ExportSource) -> Result<Vec<u8>, ExportError> {
    let heading_style = Style::new(HEADING_STYLE, StyleType::Paragraph)
        .name("Heading 1")
        .size(32)
        .bold();

    let mut docx = Docx::new()
        .add_style(heading_style)
        .add_paragraph(text_paragraph(source.heading()).style(HEADING_STYLE));

    for segment in source.summary_paragraphs() {
        docx = docx.add_paragraph(text_paragraph(segment));
    }

    if !source.keywords.is_empty() {
        docx = docx
            .add_paragraph(Paragraph::new())
            .add_paragraph(text_paragraph(&format!("Keywords: {}", source.keywords)));
    }

    let mut cursor = Cursor::new(Vec::new());
    docx.build()
        .pack(&mut cursor)
        .map_err(|e| ExportError::Docx(e.to_string()))?;
    Ok(cursor.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{DocumentChild, ParagraphChild, RunChild};

    fn paragraphs(bytes: &[u8]) -> Vec<(Option<String>, String)> {
        let docx = docx_rs::read_docx(bytes).unwrap();
        docx.document
            .children
            .iter()
            .filter_map(|child| match child {
                DocumentChild::Paragraph(p) => {
                    let text: String = p
                        .children
                        .iter()
                        .filter_map(|c| match c {
                            ParagraphChild::Run(run) => Some(
                                run.children
                                    .iter()
                                    .filter_map(|rc| match rc {
                                        RunChild::Text(t) => Some(t.text.clone()),
                                        _ => None,
                                    })
                                    .collect::<String>(),
                            ),
                            _ => None,
                        })
                        .collect();
                    let style = p.property.style.as_ref().map(|s| s.val.clone());
                    Some((style, text))
                }
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_paragraph_layout() {
        let source = ExportSource {
            title: "Title".into(),
            summary: "Line1\nLine2".into(),
            keywords: "a,b".into(),
        };
        let parsed = paragraphs(&render_docx(&source).unwrap());
        let texts: Vec<&str> = parsed.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["Title", "Line1", "Line2", "", "Keywords: a,b"]);
        assert_eq!(parsed[0].0.as_deref(), Some(HEADING_STYLE));
    }

    #[test]
    fn test_heading_fallback_without_keywords() {
        let source = ExportSource { summary: "Only".into(), ..Default::default() };
        let parsed = paragraphs(&render_docx(&source).unwrap());
        let texts: Vec<&str> = parsed.iter().map(|(_, t)| t.as_str()).collect();
        assert_eq!(texts, vec!["Summary", "Only"]);
    }
}
