use std::io::{Read, Seek};

use super::{docx, pdf, spreadsheet, DocumentError, FileKind};

/// Extract plain text from `reader` according to the declared kind.
///
/// No OCR and no layout preservation: every format is reduced to a linear
/// run of text. The result is *not* sanitized yet.
pub fn extract<R: Read + Seek>(kind: FileKind, reader: R) -> Result<String, DocumentError> {
    match kind {
        FileKind::Csv => spreadsheet::csv_to_text(reader),
        FileKind::Xlsx => spreadsheet::xlsx_to_text(reader),
        FileKind::Xls => spreadsheet::xls_to_text(reader),
        FileKind::Txt => read_utf8(reader),
        FileKind::Pdf => pdf::extract_pages(reader),
        FileKind::Docx => docx::extract_paragraphs(reader),
    }
}

fn read_utf8<R: Read>(mut reader: R) -> Result<String, DocumentError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_txt_is_decoded_verbatim() {
        let text = extract(FileKind::Txt, Cursor::new("namaste\nduniya <p>".as_bytes())).unwrap();
        assert_eq!(text, "namaste\nduniya <p>");
    }

    #[test]
    fn test_txt_rejects_invalid_utf8() {
        let err = extract(FileKind::Txt, Cursor::new(vec![b'o', b'k', 0xc3, 0x28])).unwrap_err();
        assert!(matches!(err, DocumentError::InvalidUtf8(_)));
    }

    #[test]
    fn test_csv_dispatch() {
        let text = extract(FileKind::Csv, Cursor::new("a,b\n1,2\n")).unwrap();
        assert_eq!(text, "a b\n1 2");
    }

    #[test]
    fn test_corrupt_pdf_is_an_extraction_error() {
        let err = extract(FileKind::Pdf, Cursor::new(b"not a pdf at all".to_vec())).unwrap_err();
        assert!(matches!(err, DocumentError::Pdf(_)));
    }

    #[test]
    fn test_corrupt_docx_is_an_extraction_error() {
        let err = extract(FileKind::Docx, Cursor::new(b"PK but not really".to_vec())).unwrap_err();
        assert!(matches!(err, DocumentError::Docx(_)));
    }

    #[test]
    fn test_corrupt_xlsx_is_an_extraction_error() {
        let err = extract(FileKind::Xlsx, Cursor::new(b"garbage".to_vec())).unwrap_err();
        assert!(matches!(err, DocumentError::Spreadsheet(_)));
    }
}
