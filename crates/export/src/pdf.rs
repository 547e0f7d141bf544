//! PDF export
//!
//! Lays out the heading, summary paragraphs and keyword line on US-Letter
//! pages using the two standard Helvetica faces, so no fonts are embedded.
//! Text is encoded as WinAnsi; characters outside it print as `?`.
//!
//! The standard faces only cover Latin-1 and a few typographic marks, so
//! summaries in Chinese, Japanese, Korean, Arabic or Cyrillic come out as
//! runs of `?` in the PDF. Use the TXT or DOCX export for those languages,
//! both of which keep the text as UTF-8.

use crate::{ExportError, ExportSource};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream, StringFormat};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;
const FRAME_WIDTH: f32 = PAGE_WIDTH - 2.0 * MARGIN;

const TITLE_SIZE: f32 = 18.0;
const TITLE_LEADING: f32 = 22.0;
const TITLE_SPACE_AFTER: f32 = 20.0;
const BODY_SIZE: f32 = 12.0;
const BODY_LEADING: f32 = 14.0;
const BODY_SPACE_AFTER: f32 = 12.0;
const SPACER: f32 = 12.0;
const KEYWORDS_SPACE_BEFORE: f32 = 20.0;
const KEYWORDS_GRAY: f32 = 0x55 as f32 / 255.0;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// Helvetica advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Helvetica-Bold advance widths for ASCII 32..=126, in 1/1000 em
const HELVETICA_BOLD_WIDTHS: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

const FALLBACK_WIDTH: u16 = 556;

fn text_width(text: &str, bold: bool, size: f32) -> f32 {
    let table = if bold { &HELVETICA_BOLD_WIDTHS } else { &HELVETICA_WIDTHS };
    let units: u32 = text
        .chars()
        .map(|c| {
            let cp = c as u32;
            if (32..=126).contains(&cp) {
                table[(cp - 32) as usize] as u32
            } else {
                FALLBACK_WIDTH as u32
            }
        })
        .sum();
    units as f32 * size / 1000.0
}

/// Encode a string as WinAnsi bytes
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            0x20..=0x7E | 0xA0..=0xFF => c as u32 as u8,
            _ => match c {
                '€' => 0x80,
                '‚' => 0x82,
                '„' => 0x84,
                '…' => 0x85,
                '•' => 0x95,
                '–' => 0x96,
                '—' => 0x97,
                '™' => 0x99,
                '\u{2018}' => 0x91,
                '\u{2019}' => 0x92,
                '\u{201C}' => 0x93,
                '\u{201D}' => 0x94,
                '\t' => b' ',
                _ => b'?',
            },
        })
        .collect()
}

/// A word with its face
struct Word<'a> {
    text: &'a str,
    bold: bool,
}

/// Greedy line breaking; a word wider than the frame gets a line of its own
fn wrap<'a>(words: Vec<Word<'a>>, size: f32) -> Vec<Vec<Word<'a>>> {
    let space = text_width(" ", false, size);
    let mut lines: Vec<Vec<Word<'a>>> = Vec::new();
    let mut current: Vec<Word<'a>> = Vec::new();
    let mut width = 0.0;

    for word in words {
        let w = text_width(word.text, word.bold, size);
        if !current.is_empty() && width + space + w > FRAME_WIDTH {
            lines.push(std::mem::take(&mut current));
            width = 0.0;
        }
        if !current.is_empty() {
            width += space;
        }
        width += w;
        current.push(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn line_width(line: &[Word<'_>], size: f32) -> f32 {
    let words: f32 = line.iter().map(|w| text_width(w.text, w.bold, size)).sum();
    words + text_width(" ", false, size) * line.len().saturating_sub(1) as f32
}

fn words_of(text: &str, bold: bool) -> Vec<Word<'_>> {
    text.split_whitespace().map(|t| Word { text: t, bold }).collect()
}

enum Align {
    Left,
    Center,
}

/// Accumulates content streams page by page
struct PageWriter {
    pages: Vec<Vec<Operation>>,
    y: f32,
}

impl PageWriter {
    fn new() -> Self {
        Self {
            pages: vec![Vec::new()],
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn space(&mut self, amount: f32) {
        self.y -= amount;
    }

    fn ensure_room(&mut self, leading: f32) {
        if self.y - leading < MARGIN {
            self.pages.push(Vec::new());
            self.y = PAGE_HEIGHT - MARGIN;
        }
    }

    fn paragraph(&mut self, words: Vec<Word<'_>>, size: f32, leading: f32, gray: f32, align: Align) {
        for line in wrap(words, size) {
            self.ensure_room(leading);
            self.y -= leading;

            let x = match align {
                Align::Left => MARGIN,
                Align::Center => MARGIN + (FRAME_WIDTH - line_width(&line, size)) / 2.0,
            };

            let y = self.y;
            let Some(ops) = self.pages.last_mut() else { continue };

            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("rg", vec![gray.into(), gray.into(), gray.into()]));
            ops.push(Operation::new("Td", vec![x.into(), y.into()]));

            let mut face: Option<bool> = None;
            let count = line.len();
            for (i, word) in line.into_iter().enumerate() {
                if face != Some(word.bold) {
                    let font = if word.bold { BOLD } else { REGULAR };
                    ops.push(Operation::new("Tf", vec![font.into(), size.into()]));
                    face = Some(word.bold);
                }
                let mut text = word.text.to_string();
                if i + 1 < count {
                    text.push(' ');
                }
                ops.push(Operation::new(
                    "Tj",
                    vec![Object::String(win_ansi(&text), StringFormat::Literal)],
                ));
            }
            ops.push(Operation::new("ET", vec![]));
        }
    }
}

pub fn render_pdf(source: &ExportSource) -> Result<Vec<u8>, ExportError> {
    let mut writer = PageWriter::new();

    writer.paragraph(words_of(source.heading(), true), TITLE_SIZE, TITLE_LEADING, 0.0, Align::Center);
    writer.space(TITLE_SPACE_AFTER + SPACER);

    for segment in source.summary_paragraphs() {
        writer.paragraph(words_of(segment, false), BODY_SIZE, BODY_LEADING, 0.0, Align::Left);
        writer.space(BODY_SPACE_AFTER);
    }

    if !source.keywords.is_empty() {
        writer.space(SPACER + KEYWORDS_SPACE_BEFORE);
        let mut words = vec![Word { text: "Keywords:", bold: true }];
        words.extend(words_of(&source.keywords, false));
        writer.paragraph(words, BODY_SIZE, BODY_LEADING, KEYWORDS_GRAY, Align::Left);
    }

    build_document(writer.pages)
}

fn build_document(pages: Vec<Vec<Operation>>) -> Result<Vec<u8>, ExportError> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
        "Encoding" => "WinAnsiEncoding",
    });
    let bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
        "Encoding" => "WinAnsiEncoding",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let encoded = content.encode().map_err(|e| ExportError::Pdf(e.to_string()))?;
        let content_id = doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buf = Vec::new();
    doc.save_to(&mut buf).map_err(|e| ExportError::Pdf(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn all_text(bytes: &[u8]) -> (usize, String) {
        let doc = Document::load_mem(bytes).unwrap();
        let pages: Vec<u32> = doc.get_pages().keys().copied().collect();
        let text = doc.extract_text(&pages).unwrap();
        (pages.len(), text)
    }

    #[test]
    fn test_lines_and_keywords() {
        let source = ExportSource {
            title: "Title".into(),
            summary: "Line1\nLine2".into(),
            keywords: "a,b".into(),
        };
        let (pages, text) = all_text(&render_pdf(&source).unwrap());
        assert_eq!(pages, 1);

        let title = text.find("Title").unwrap();
        let line1 = text.find("Line1").unwrap();
        let line2 = text.find("Line2").unwrap();
        let keywords = text.find("Keywords:").unwrap();
        assert!(title < line1 && line1 < line2 && line2 < keywords);
        assert!(text.contains("a,b"));
    }

    #[test]
    fn test_long_summary_paginates() {
        let paragraph = "lorem ipsum dolor sit amet ".repeat(40);
        let summary = vec![paragraph; 12].join("\n");
        let source = ExportSource { title: "Long".into(), summary, keywords: String::new() };

        let (pages, text) = all_text(&render_pdf(&source).unwrap());
        assert!(pages > 1);
        assert!(!text.contains("Keywords:"));
    }

    #[test]
    fn test_wrap_respects_frame() {
        let text = "alpha beta gamma delta ".repeat(30);
        let lines = wrap(words_of(&text, false), BODY_SIZE);
        assert!(lines.len() > 1);
        for line in &lines {
            assert!(line_width(line, BODY_SIZE) <= FRAME_WIDTH);
        }
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(win_ansi("€—\u{4F60}"), vec![0x80, 0x97, b'?']);
    }

    #[test]
    fn test_non_latin_text_degrades_to_question_marks() {
        assert_eq!(win_ansi("你好 мир"), b"?? ???".to_vec());
    }

    #[test]
    fn test_widths() {
        assert_eq!(text_width("a", false, 1000.0), 556.0);
        assert!(text_width("Title", true, 12.0) > text_width("Title", false, 12.0));
    }
}
