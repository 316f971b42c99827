use tracing::debug;

use crate::document::DocumentOperation;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// A document batch ready to be posted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRequest {
    pub url: String,
    pub body: String,
    pub headers: Vec<(String, String)>,
}

/// Serialize `operations` as one JSON array for the batch endpoint.
pub fn build_document_request(
    endpoint: &str,
    operations: &[DocumentOperation],
) -> Result<DocumentRequest, serde_json::Error> {
    let body = serde_json::to_string(operations)?;
    debug!(
        url = endpoint,
        operations = operations.len(),
        "Assembled document batch"
    );
    Ok(DocumentRequest {
        url: endpoint.to_owned(),
        body,
        headers: vec![("Content-Type".to_owned(), CONTENT_TYPE_JSON.to_owned())],
    })
}
