// PDF text extraction - pure Rust via lopdf
use std::io::Read;

use lopdf::Document;
use tracing::debug;

use super::DocumentError;

/// Extract text page by page in page order.
///
/// Pages that yield no text (scanned images, blank pages) are skipped; the
/// remaining pages are joined with a newline.
pub fn extract_pages<R: Read>(reader: R) -> Result<String, DocumentError> {
    let document = Document::load_from(reader)?;
    let pages = document.get_pages();

    let mut texts = Vec::with_capacity(pages.len());
    for page_number in pages.keys() {
        let text = document.extract_text(&[*page_number])?;
        let text = text.trim();
        if text.is_empty() {
            debug!(page = page_number, "Skipping page without extractable text");
            continue;
        }
        texts.push(text.to_string());
    }

    debug!(pages = pages.len(), kept = texts.len(), "Extracted PDF text");
    Ok(texts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    fn page_content(text: Option<&str>) -> Content {
        let operations = match text {
            Some(text) => vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ],
            None => vec![],
        };
        Content { operations }
    }

    fn build_pdf(pages: &[Option<&str>]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let content = page_content(*text);
            let content_id =
                doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "Parent" => pages_id,
                "Contents" => content_id,
                "Resources" => resources_id,
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
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pages_in_order() {
        let pdf = build_pdf(&[Some("Alpha page"), Some("Beta page")]);
        let text = extract_pages(pdf.as_slice()).unwrap();

        let alpha = text.find("Alpha").expect("first page text");
        let beta = text.find("Beta").expect("second page text");
        assert!(alpha < beta);
    }

    #[test]
    fn test_empty_page_is_skipped() {
        let pdf = build_pdf(&[Some("First"), None, Some("Third")]);
        let text = extract_pages(pdf.as_slice()).unwrap();

        let lines: Vec<&str> = text.lines().map(str::trim).collect();
        assert!(!lines.iter().any(|line| line.is_empty()));
        let first = text.find("First").unwrap();
        let third = text.find("Third").unwrap();
        assert!(first < third);
    }

    #[test]
    fn test_pdf_without_text_is_empty() {
        let pdf = build_pdf(&[None, None]);
        assert_eq!(extract_pages(pdf.as_slice()).unwrap(), "");
    }
}
