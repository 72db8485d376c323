//! Author group management
//!
//! Groups live under `external/authors-group/`; members under
//! `external/authors-group/{group_id}/authors/`.

use std::sync::Arc;

use prophy_common::error::{SdkError, SdkResult};
use prophy_domain::constants::AUTHOR_GROUPS_PATH;
use prophy_domain::{
    AuthorGroup, CreateAuthorGroupRequest, GroupAuthor, Page, PageRequest, UpdateAuthorGroupRequest,
};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

use super::client::ApiClient;
use super::manuscripts::require_id;

#[derive(Debug, Clone)]
pub struct AuthorGroupsApi {
    client: Arc<ApiClient>,
}

impl AuthorGroupsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self, request, cancel))]
    pub async fn create(
        &self,
        request: &CreateAuthorGroupRequest,
        cancel: &CancellationToken,
    ) -> SdkResult<AuthorGroup> {
        SdkError::require_non_empty("name", &request.name)?;
        let group: AuthorGroup = self.client.post(AUTHOR_GROUPS_PATH, request, cancel).await?;
        info!(group_id = group.id, "author group created");
        Ok(group)
    }

    #[instrument(skip(self, cancel))]
    pub async fn get(&self, group_id: i64, cancel: &CancellationToken) -> SdkResult<AuthorGroup> {
        require_id("group_id", group_id)?;
        self.client.get(&group_path(group_id), cancel).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(
        &self,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> SdkResult<Page<AuthorGroup>> {
        self.client.get_with_query(AUTHOR_GROUPS_PATH, &page.query(), cancel).await
    }

    /// Partial update
    ///
    /// # Errors
    /// `InvalidArgument` when the update sets nothing.
    #[instrument(skip(self, request, cancel))]
    pub async fn update(
        &self,
        group_id: i64,
        request: &UpdateAuthorGroupRequest,
        cancel: &CancellationToken,
    ) -> SdkResult<AuthorGroup> {
        require_id("group_id", group_id)?;
        if request.is_empty() {
            return Err(SdkError::invalid_argument("request", "no fields to update"));
        }
        if let Some(name) = &request.name {
            SdkError::require_non_empty("name", name)?;
        }
        self.client.patch(&group_path(group_id), request, cancel).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn delete(&self, group_id: i64, cancel: &CancellationToken) -> SdkResult<()> {
        require_id("group_id", group_id)?;
        self.client.delete(&group_path(group_id), cancel).await?;
        info!(group_id, "author group deleted");
        Ok(())
    }

    #[instrument(skip(self, cancel))]
    pub async fn list_authors(
        &self,
        group_id: i64,
        page: PageRequest,
        cancel: &CancellationToken,
    ) -> SdkResult<Page<GroupAuthor>> {
        require_id("group_id", group_id)?;
        self.client.get_with_query(&authors_path(group_id), &page.query(), cancel).await
    }

    #[instrument(skip(self, author, cancel))]
    pub async fn add_author(
        &self,
        group_id: i64,
        author: &GroupAuthor,
        cancel: &CancellationToken,
    ) -> SdkResult<GroupAuthor> {
        require_id("group_id", group_id)?;
        SdkError::require_non_empty("name", &author.name)?;
        self.client.post(&authors_path(group_id), author, cancel).await
    }

    #[instrument(skip(self, cancel))]
    pub async fn remove_author(
        &self,
        group_id: i64,
        author_id: i64,
        cancel: &CancellationToken,
    ) -> SdkResult<()> {
        require_id("group_id", group_id)?;
        require_id("author_id", author_id)?;
        self.client.delete(&format!("{}{author_id}/", authors_path(group_id)), cancel).await
    }
}

fn group_path(group_id: i64) -> String {
    format!("{AUTHOR_GROUPS_PATH}{group_id}/")
}

fn authors_path(group_id: i64) -> String {
    format!("{AUTHOR_GROUPS_PATH}{group_id}/authors/")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn member_paths() {
        assert_eq!(group_path(3), "external/authors-group/3/");
        assert_eq!(authors_path(3), "external/authors-group/3/authors/");
    }
}
