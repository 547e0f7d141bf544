//! PDF text extraction module
//!
//! Extracts text content from PDF bytes using lopdf.

use crate::errors::ExtractionError;
use tracing::{debug, warn};

/// Extract text from every page, in page order, joined with single spaces
///
/// A page that fails to decode contributes an empty string.
pub fn extract_text_from_pdf(bytes: &[u8], filename: &str) -> Result<String, ExtractionError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractionError::Pdf {
        filename: filename.to_string(),
        message: format!("Failed to load PDF: {}", e),
    })?;

    let pages = doc.get_pages();
    debug!(page_count = pages.len(), "Extracting text from PDF");

    let texts: Vec<String> = pages
        .keys()
        .map(|&page_num| match doc.extract_text(&[page_num]) {
            Ok(text) => text.trim().to_string(),
            Err(e) => {
                warn!(page = page_num, error = %e, "Failed to extract text from page, skipping");
                String::new()
            }
        })
        .collect();

    Ok(texts.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    fn sample_pdf(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let mut operations = vec![Operation::new("BT", vec![])];
            if !text.is_empty() {
                operations.push(Operation::new("Tf", vec!["F1".into(), 24.into()]));
                operations.push(Operation::new("Td", vec![100.into(), 600.into()]));
                operations.push(Operation::new("Tj", vec![Object::string_literal(*text)]));
            }
            operations.push(Operation::new("ET", vec![]));

            let content = Content { operations };
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
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
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_pages_in_order() {
        let bytes = sample_pdf(&["Hello", "World"]);
        let text = extract_text_from_pdf(&bytes, "two.pdf").unwrap();

        let hello = text.find("Hello").unwrap();
        let world = text.find("World").unwrap();
        assert!(hello < world);
        assert!(!text.contains('\n'));
    }

    #[test]
    fn test_blank_page_contributes_nothing() {
        let bytes = sample_pdf(&["", ""]);
        let text = extract_text_from_pdf(&bytes, "blank.pdf").unwrap();
        assert!(text.trim().is_empty());
    }

    #[test]
    fn test_invalid_pdf() {
        let err = extract_text_from_pdf(b"%PDF-garbage", "bad.pdf").unwrap_err();
        assert!(err.to_string().contains("bad.pdf"));
    }
}
