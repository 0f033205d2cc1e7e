use crate::error::{AnalyzerError, Result};
use lopdf::Document;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::schema::ExtractedText;

/// Extract the text of every page of the PDF at `path`, in page order.
///
/// Pages whose text cannot be decoded count as empty. No OCR is attempted
/// and nothing is cached: every call re-reads the file.
pub fn extract_text(path: &Path) -> Result<ExtractedText> {
    if !path.exists() {
        return Err(AnalyzerError::NotFound(path.to_path_buf()));
    }

    let doc = Document::load(path).map_err(|e| AnalyzerError::Format(e.to_string()))?;

    let pages = doc.get_pages().into_keys().map(|page_number| {
        doc.extract_text(&[page_number]).unwrap_or_else(|e| {
            debug!(page = page_number, error = %e, "No extractable text on page");
            String::new()
        })
    });

    Ok(ExtractedText::from_pages(pages))
}

/// Run [`extract_text`] on the blocking pool.
pub async fn extract(path: PathBuf) -> Result<ExtractedText> {
    tokio::task::spawn_blocking(move || extract_text(&path))
        .await
        .map_err(|e| AnalyzerError::Format(format!("extraction task failed: {e}")))?
}

/// Cut `text` to at most `max_chars` characters.
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(any(test, feature = "test-util"))]
pub mod fixtures {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};
    use std::path::{Path, PathBuf};

    /// Build a PDF with one line of Courier text per page; `""` gives a blank page.
    pub fn pdf_bytes(pages: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
            "Encoding" => "WinAnsiEncoding",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut kids: Vec<Object> = Vec::new();
        for text in pages {
            let operations = if text.is_empty() {
                Vec::new()
            } else {
                vec![
                    Operation::new("BT", vec![]),
                    Operation::new("Tf", vec!["F1".into(), 18.into()]),
                    Operation::new("Td", vec![72.into(), 720.into()]),
                    Operation::new("Tj", vec![Object::string_literal(*text)]),
                    Operation::new("ET", vec![]),
                ]
            };
            let content = Content { operations };
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

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    pub fn write_pdf(dir: &Path, name: &str, pages: &[&str]) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, pdf_bytes(pages)).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::fixtures::write_pdf;
    use super::*;

    #[test]
    fn single_page_text_is_extracted() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_pdf(tmp.path(), "one.pdf", &["Revenue: $10M"]);

        let text = extract_text(&path).unwrap();
        assert_eq!(text.as_str(), "Revenue: $10M");
        assert_eq!(text.page_count(), 1);
    }

    #[test]
    fn pages_are_joined_in_document_order() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_pdf(tmp.path(), "three.pdf", &["Page one", "Page two", "Page three"]);

        let text = extract_text(&path).unwrap();
        assert_eq!(text.as_str(), "Page one\nPage two\nPage three");
    }

    #[test]
    fn blank_pages_count_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_pdf(tmp.path(), "gap.pdf", &["Assets", "", "Liabilities"]);

        let text = extract_text(&path).unwrap();
        assert_eq!(text.pages(), ["Assets", "", "Liabilities"]);
        assert_eq!(text.as_str(), "Assets\n\nLiabilities");
    }

    #[test]
    fn zero_page_document_yields_empty_text() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_pdf(tmp.path(), "empty.pdf", &[]);

        let text = extract_text(&path).unwrap();
        assert!(text.is_empty());
        assert_eq!(text.page_count(), 0);
    }

    #[test]
    fn missing_file_is_not_found() {
        let tmp = tempfile::tempdir().unwrap();
        let err = extract_text(&tmp.path().join("nope.pdf")).unwrap_err();
        assert!(matches!(err, AnalyzerError::NotFound(_)));
        assert!(err.to_string().contains("nope.pdf"));
    }

    #[test]
    fn garbage_bytes_are_a_format_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("junk.pdf");
        std::fs::write(&path, b"this is definitely not a pdf").unwrap();

        let err = extract_text(&path).unwrap_err();
        assert!(matches!(err, AnalyzerError::Format(_)));
    }

    #[test]
    fn extraction_is_repeatable() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_pdf(tmp.path(), "twice.pdf", &["Cash flow", "Outlook"]);

        assert_eq!(extract_text(&path).unwrap(), extract_text(&path).unwrap());
    }

    #[tokio::test]
    async fn async_extract_matches_sync() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_pdf(tmp.path(), "async.pdf", &["Dividend: $0.50"]);

        let text = extract(path.clone()).await.unwrap();
        assert_eq!(text, extract_text(&path).unwrap());
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("short", 100), "short");
        assert_eq!(truncate_chars("", 3), "");
    }
}
