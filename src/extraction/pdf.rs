//! Text-layer and page-count adapter backed by `lopdf`.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use super::types::AdapterError;

/// Black-box access to a PDF's embedded text layer and page count.
///
/// Both operations may be slow on large documents; implementations must not
/// block the async runtime.
#[async_trait]
pub trait PdfAdapter: Send + Sync {
    /// Read the document's embedded text layer. No OCR is performed.
    async fn read_text_layer(&self, path: &Path) -> Result<String, AdapterError>;

    /// Count the document's pages.
    async fn page_count(&self, path: &Path) -> Result<usize, AdapterError>;
}

/// Default adapter parsing documents with `lopdf` on a blocking worker.
pub struct LopdfAdapter;

#[async_trait]
impl PdfAdapter for LopdfAdapter {
    async fn read_text_layer(&self, path: &Path) -> Result<String, AdapterError> {
        let path = path.to_path_buf();
        spawn_parse(move || read_text_blocking(&path)).await
    }

    async fn page_count(&self, path: &Path) -> Result<usize, AdapterError> {
        let path = path.to_path_buf();
        spawn_parse(move || Ok(load_document(&path)?.get_pages().len())).await
    }
}

async fn spawn_parse<T, F>(work: F) -> Result<T, AdapterError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AdapterError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|err| AdapterError::Task(err.to_string()))?
}

fn load_document(path: &PathBuf) -> Result<lopdf::Document, AdapterError> {
    let bytes = std::fs::read(path)?;
    lopdf::Document::load_mem(&bytes).map_err(|err| AdapterError::Parse(err.to_string()))
}

fn read_text_blocking(path: &PathBuf) -> Result<String, AdapterError> {
    let doc = load_document(path)?;

    let mut pages: Vec<u32> = doc.get_pages().keys().copied().collect();
    pages.sort_unstable();

    // A page that fails to decode contributes no text; that is the pipeline's
    // "no text layer" signal, not a hard error.
    let mut full_text = String::new();
    for page in &pages {
        let page_text = doc.extract_text(&[*page]).unwrap_or_default();
        full_text.push_str(&page_text);
        if !page_text.is_empty() && !page_text.ends_with('\n') {
            full_text.push('\n');
        }
    }

    Ok(full_text)
}

#[cfg(test)]
pub(crate) mod pdf_fixtures {
    use lopdf::{Document, Object, Stream, dictionary};

    /// Build a minimal single-page PDF with the given text drawn on the page.
    pub(crate) fn pdf_with_text(text: &str) -> Vec<u8> {
        pdf_with_pages(&[text])
    }

    /// Build a minimal PDF with one page per entry in `page_texts`.
    pub(crate) fn pdf_with_pages(page_texts: &[&str]) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });

        let mut page_ids = Vec::new();
        for text in page_texts {
            let content = format!(
                "BT /F1 12 Tf 100 700 Td ({}) Tj ET",
                text.replace('\\', "\\\\")
                    .replace('(', "\\(")
                    .replace(')', "\\)")
            );
            let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));
            let page_id = doc.add_object(dictionary! {
                "Type" => "Page",
                "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                "Resources" => resources_id,
                "Contents" => content_id,
            });
            page_ids.push(page_id);
        }

        let kids: Vec<Object> = page_ids.iter().map(|&id| id.into()).collect();
        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => Object::Integer(page_texts.len() as i64),
        });
        for page_id in &page_ids {
            if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(*page_id) {
                dict.set("Parent", pages_id);
            }
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).expect("serialize test PDF");
        buffer
    }
}
