use std::path::{Path, PathBuf};

use rfq_logging::rfq_info;
use url::Url;

use crate::api::{ApiClient, ApiError};
use crate::models::DocumentRef;
use crate::persist::{sanitize_filename, AtomicFileWriter};

impl ApiClient {
    /// Preview URL for a stored document: `{base}/documents/{id}/stream`, or
    /// the blob-name route when the document has no id yet.
    pub fn document_stream_url(&self, document: &DocumentRef) -> Option<Url> {
        if let Some(id) = non_empty(&document.document_id) {
            return Some(self.url(&["documents", id, "stream"]));
        }
        let blob_name = non_empty(&document.blob_name)?;
        let mut url = self.url(&["documents", "stream"]);
        url.query_pairs_mut().append_pair("blob_name", blob_name);
        Some(url)
    }

    /// Fetches the document and saves it under `dir`, returning the path.
    pub async fn download_document(
        &self,
        document: &DocumentRef,
        dir: &Path,
    ) -> Result<PathBuf, ApiError> {
        let url = self
            .document_stream_url(document)
            .ok_or_else(|| ApiError::InvalidRequest("document has no id or blob name".into()))?;
        let filename = non_empty(&document.filename)
            .or_else(|| non_empty(&document.blob_name))
            .or_else(|| non_empty(&document.document_id))
            .unwrap_or("document");
        self.download_to(url, dir, &sanitize_filename(filename))
            .await
    }

    pub async fn download_analysis_pdf(
        &self,
        rfq_id: &str,
        dir: &Path,
    ) -> Result<PathBuf, ApiError> {
        let url = self.url(&["ai-analysis", rfq_id, "report", "pdf"]);
        let filename = sanitize_filename(&format!("{rfq_id}_vendor_analysis.pdf"));
        self.download_to(url, dir, &filename).await
    }

    async fn download_to(&self, url: Url, dir: &Path, filename: &str) -> Result<PathBuf, ApiError> {
        let bytes = self.get_bytes(url).await?;
        let writer = AtomicFileWriter::new(dir.to_path_buf());
        let path = writer
            .write(filename, &bytes)
            .map_err(|err| ApiError::Persist(err.to_string()))?;
        rfq_info!("Saved {} bytes to {:?}", bytes.len(), path);
        Ok(path)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
