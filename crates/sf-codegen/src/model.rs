//! Describe payloads reduced to what the renderer needs.

use tracing::warn;

use cloudy_sf_rest::{DescribeSObjectResult, FieldDescribe};

/// Rust type a Salesforce field is mapped to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldType {
    String,
    Float,
    Integer,
    Boolean,
    /// A generated enum carrying the active picklist values.
    Picklist,
    /// Anything without a dedicated mapping.
    Json,
}

impl FieldType {
    /// Map a describe `type` to a Rust type.
    ///
    /// Returns `None` for types without a dedicated mapping.
    pub fn from_salesforce(sf_type: &str) -> Option<Self> {
        let mapped = match sf_type {
            "id" | "reference" | "string" | "textarea" | "phone" | "email" | "url"
            | "encryptedstring" | "combobox" | "multipicklist" | "date" | "datetime" | "time" => {
                FieldType::String
            }
            "double" | "percent" | "currency" => FieldType::Float,
            "int" | "long" => FieldType::Integer,
            "boolean" => FieldType::Boolean,
            "picklist" => FieldType::Picklist,
            _ => return None,
        };
        Some(mapped)
    }
}

/// One field of a generated type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
    /// Salesforce API name.
    pub name: String,
    pub field_type: FieldType,
    /// Active picklist values, only for [`FieldType::Picklist`].
    pub picklist: Option<Vec<String>>,
}

impl FieldSpec {
    pub fn from_describe(object: &str, field: &FieldDescribe) -> Self {
        let field_type = FieldType::from_salesforce(&field.field_type).unwrap_or_else(|| {
            warn!(
                object,
                field = %field.name,
                sf_type = %field.field_type,
                "No type mapping, falling back to serde_json::Value"
            );
            FieldType::Json
        });

        let picklist = (field_type == FieldType::Picklist).then(|| {
            field
                .active_picklist_values()
                .map(str::to_string)
                .collect()
        });

        Self {
            name: field.name.clone(),
            field_type,
            picklist,
        }
    }
}

/// Everything needed to render one SObject type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectSpec {
    /// Salesforce API name of the object.
    pub class_name: String,
    pub fields: Vec<FieldSpec>,
}

impl ObjectSpec {
    pub fn from_describe(describe: &DescribeSObjectResult) -> Self {
        let fields = describe
            .fields
            .iter()
            .map(|f| FieldSpec::from_describe(&describe.name, f))
            .collect();

        Self {
            class_name: describe.name.clone(),
            fields,
        }
    }
}
