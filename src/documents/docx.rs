// DOCX paragraph extraction via docx-rust
use std::io::{Read, Seek};

use docx_rust::document::BodyContent;
use docx_rust::DocxFile;
use tracing::debug;

use super::DocumentError;

/// Concatenate top-level paragraph text in document order, one per line.
///
/// Tables, headers and footers are not visited.
pub fn extract_paragraphs<R: Read + Seek>(reader: R) -> Result<String, DocumentError> {
    let file =
        DocxFile::from_reader(reader).map_err(|e| DocumentError::Docx(format!("{:?}", e)))?;
    let docx = file
        .parse()
        .map_err(|e| DocumentError::Docx(format!("{:?}", e)))?;

    let paragraphs: Vec<String> = docx
        .document
        .body
        .content
        .iter()
        .filter_map(|content| match content {
            BodyContent::Paragraph(paragraph) => Some(
                paragraph
                    .iter_text()
                    .map(|text| text.to_string())
                    .collect::<String>(),
            ),
            _ => None,
        })
        .collect();

    debug!(paragraphs = paragraphs.len(), "Extracted DOCX paragraphs");
    Ok(paragraphs.join("\n"))
}
