//! SObject describe.
//!
//! Only the parts of the describe payload the code generator needs are
//! modeled; unknown keys are ignored.

use serde::{Deserialize, Serialize};
use tracing::instrument;

use cloudy_sf_client::security::names;
use cloudy_sf_client::{RequestGateway, RequestMethod};

use crate::error::{Error, ErrorKind, Result};

/// SObject describe result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DescribeSObjectResult {
    pub name: String,
    pub label: String,
    #[serde(rename = "labelPlural")]
    pub label_plural: Option<String>,
    #[serde(rename = "keyPrefix")]
    pub key_prefix: Option<String>,
    #[serde(default)]
    pub custom: bool,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(default)]
    pub deletable: bool,
    #[serde(default)]
    pub queryable: bool,
    pub fields: Vec<FieldDescribe>,
}

impl DescribeSObjectResult {
    /// Look up a field by API name.
    pub fn field(&self, name: &str) -> Option<&FieldDescribe> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Field describe result.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FieldDescribe {
    pub name: String,
    #[serde(default)]
    pub label: String,
    #[serde(rename = "type")]
    pub field_type: String,
    pub length: Option<i32>,
    #[serde(default)]
    pub nillable: bool,
    #[serde(default)]
    pub createable: bool,
    #[serde(default)]
    pub updateable: bool,
    #[serde(rename = "externalId", default)]
    pub external_id: bool,
    pub custom: Option<bool>,
    #[serde(rename = "referenceTo", default)]
    pub reference_to: Vec<String>,
    #[serde(rename = "relationshipName")]
    pub relationship_name: Option<String>,
    #[serde(rename = "picklistValues", default)]
    pub picklist_values: Vec<PicklistValue>,
}

impl FieldDescribe {
    /// Values of active picklist entries, in describe order.
    pub fn active_picklist_values(&self) -> impl Iterator<Item = &str> {
        self.picklist_values
            .iter()
            .filter(|v| v.active)
            .map(|v| v.value.as_str())
    }
}

/// Picklist value for picklist fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PicklistValue {
    pub value: String,
    pub label: Option<String>,
    #[serde(default)]
    pub active: bool,
    #[serde(rename = "defaultValue", default)]
    pub default_value: bool,
}

/// Describe one SObject.
#[instrument(skip(gateway))]
pub async fn describe_sobject<G: RequestGateway>(
    gateway: &G,
    sobject: &str,
) -> Result<DescribeSObjectResult> {
    if !names::is_safe_api_name(sobject) {
        return Err(Error::new(ErrorKind::InvalidName(sobject.to_string())));
    }

    let path = gateway.data_path(&format!("sobjects/{sobject}/describe"));
    let value = gateway.send(RequestMethod::Get, &path, None, &[]).await?;
    serde_json::from_value(value).map_err(|e| {
        Error::with_source(
            ErrorKind::UnexpectedResponse(format!("invalid describe for {sobject}: {e}")),
            e,
        )
    })
}
