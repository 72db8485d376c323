//! Organization custom field definitions

use std::collections::BTreeMap;
use std::sync::Arc;

use prophy_common::error::{SdkError, SdkResult};
use prophy_domain::constants::CUSTOM_FIELDS_PATH;
use prophy_domain::CustomField;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use super::client::ApiClient;

#[derive(Debug, Clone)]
pub struct CustomFieldsApi {
    client: Arc<ApiClient>,
}

impl CustomFieldsApi {
    pub fn new(client: Arc<ApiClient>) -> Self {
        Self { client }
    }

    #[instrument(skip(self, cancel))]
    pub async fn list(&self, cancel: &CancellationToken) -> SdkResult<Vec<CustomField>> {
        self.client.get(CUSTOM_FIELDS_PATH, cancel).await
    }
}

/// Check upload values against field definitions
///
/// # Errors
/// `InvalidArgument` naming the first unknown code, missing required field
/// or value the field type rejects.
pub fn check_values(definitions: &[CustomField], values: &BTreeMap<String, String>) -> SdkResult<()> {
    for code in values.keys() {
        if !definitions.iter().any(|field| &field.code == code) {
            return Err(SdkError::invalid_argument(format!("custom_fields.{code}"), "unknown field"));
        }
    }
    for field in definitions {
        let parameter = format!("custom_fields.{}", field.code);
        match values.get(&field.code) {
            None if field.required => return Err(SdkError::invalid_argument(parameter, "is required")),
            Some(value) if !field.accepts(value) => {
                return Err(SdkError::invalid_argument(
                    parameter,
                    format!("value not accepted for {} field", field.field_type),
                ));
            }
            _ => {}
        }
    }
    Ok(())
}
