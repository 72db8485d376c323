//! Journal recommendations

use std::sync::Arc;

use prophy_common::error::SdkResult;
use prophy_domain::constants::JOURNAL_RECOMMENDATIONS_PATH;
use prophy_domain::JournalRecommendationsResponse;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};

use super::client::ApiClient;
use super::manuscripts::require_id;

#[derive(Debug, Clone)]
pub struct JournalsApi {
    client: Arc<ApiClient>,
}

impl JournalsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    /// Journals ranked for an uploaded manuscript
    #[instrument(skip(self, cancel))]
    pub async fn recommend(
        &self,
        manuscript_id: i64,
        cancel: &CancellationToken,
    ) -> SdkResult<JournalRecommendationsResponse> {
        require_id("manuscript_id", manuscript_id)?;
        let response: JournalRecommendationsResponse = self
            .client
            .get(&format!("{JOURNAL_RECOMMENDATIONS_PATH}{manuscript_id}/"), cancel)
            .await?;
        debug!(journals = response.journals.len(), "journal recommendations received");
        Ok(response)
    }
}
