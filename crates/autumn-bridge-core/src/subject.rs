//! Billing subject types.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Display data forwarded to the billing API alongside a subject id.
///
/// Autumn uses this to populate the customer record the first time a
/// subject is seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerData {
    /// Contact email.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl CustomerData {
    /// Create display data from an email and a name.
    #[must_use]
    pub fn new(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: Some(email.into()),
            name: Some(name.into()),
        }
    }
}

/// The entity (user or organization) a billing operation applies to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingSubject {
    /// Customer id as known to the billing provider.
    #[serde(rename = "customer_id")]
    pub subject_id: String,
    /// Display data for the customer record.
    #[serde(rename = "customer_data")]
    pub display_data: CustomerData,
}

impl BillingSubject {
    /// Create a subject, rejecting empty identifiers.
    pub fn new(subject_id: impl Into<String>, display_data: CustomerData) -> Result<Self> {
        let subject_id = subject_id.into();
        if subject_id.trim().is_empty() {
            return Err(CoreError::InvalidSubjectId(subject_id));
        }
        Ok(Self {
            subject_id,
            display_data,
        })
    }

    /// Serialize as the `customer_id` / `customer_data` pair the billing API expects.
    #[must_use]
    pub fn to_customer_fields(&self) -> serde_json::Map<String, serde_json::Value> {
        let mut fields = serde_json::Map::new();
        fields.insert(
            "customer_id".to_string(),
            serde_json::Value::String(self.subject_id.clone()),
        );
        fields.insert(
            "customer_data".to_string(),
            serde_json::to_value(&self.display_data).unwrap_or(serde_json::Value::Null),
        );
        fields
    }
}
