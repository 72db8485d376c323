//! Manuscript upload and retrieval

use std::sync::Arc;

use prophy_common::error::{SdkError, SdkResult};
use prophy_domain::constants::MANUSCRIPTS_PATH;
use prophy_domain::{Manuscript, ManuscriptUploadRequest, ManuscriptUploadResponse};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::client::ApiClient;
use crate::http::ManuscriptForm;

#[derive(Debug, Clone)]
pub struct ManuscriptsApi {
    client: Arc<ApiClient>,
}

impl ManuscriptsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Upload a manuscript and receive ranked referee candidates
    ///
    /// # Errors
    /// `InvalidArgument` before any network call when the form is invalid;
    /// classified API errors otherwise.
    #[instrument(skip(self, request, cancel), fields(authors = request.authors.len()))]
    pub async fn upload(
        &self,
        request: &ManuscriptUploadRequest,
        cancel: &CancellationToken,
    ) -> SdkResult<ManuscriptUploadResponse> {
        let form = ManuscriptForm::from_request(request)?;
        let file_bytes = form.file().content.len();
        let response: ManuscriptUploadResponse =
            self.client.post_multipart(MANUSCRIPTS_PATH, form.into_multipart()?, cancel).await?;

        info!(
            manuscript_id = response.manuscript_id,
            candidates = response.candidates.len(),
            file_bytes,
            "manuscript uploaded"
        );
        Ok(response)
    }

    /// Fetch a previously uploaded manuscript
    #[instrument(skip(self, cancel))]
    pub async fn get(&self, manuscript_id: i64, cancel: &CancellationToken) -> SdkResult<Manuscript> {
        require_id("manuscript_id", manuscript_id)?;
        self.client.get(&format!("{MANUSCRIPTS_PATH}{manuscript_id}/"), cancel).await
    }
}

pub(crate) fn require_id(parameter: &str, id: i64) -> SdkResult<()> {
    if id <= 0 {
        return Err(SdkError::invalid_argument(parameter, "must be a positive identifier"));
    }
    Ok(())
}
