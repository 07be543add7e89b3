//! Contact records consumed by the composer.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::variables::VariableMap;

/// A recipient record.
///
/// Only `audience_type` and `email` are required. No identity beyond the
/// email address is assumed unique; the same record may be composed any
/// number of times with different options. The flattened `extra` bag
/// carries any additional JSON keys, which also become substitution
/// variables.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Contact {
    /// Audience classification driving tone and block defaults.
    pub audience_type: String,
    /// Recipient address. Also the key for per-contact batch options.
    pub email: String,
    /// Given name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    /// Job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Organization the contact belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_name: Option<String>,
    /// Kind of organization (fund, startup, corporate, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub organization_type: Option<String>,
    /// Name the email is sent on behalf of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_name: Option<String>,
    /// Sender's job title.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_title: Option<String>,
    /// Per-contact override for the event date variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_date: Option<String>,
    /// Open-ended additional fields, applied last in the variable merge.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Contact {
    /// Minimal contact with only the required fields.
    pub fn new(audience_type: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            audience_type: audience_type.into(),
            email: email.into(),
            ..Self::default()
        }
    }

    /// Named identity, organization, and sender fields as substitution
    /// variables. Absent fields default to the empty string so templates
    /// degrade to blank spots instead of leftover tokens.
    pub fn named_variables(&self) -> VariableMap {
        fn field(value: &Option<String>) -> Value {
            Value::String(value.clone().unwrap_or_default())
        }
        let mut vars = VariableMap::new();
        vars.insert("first_name".to_string(), field(&self.first_name));
        vars.insert("last_name".to_string(), field(&self.last_name));
        vars.insert("title".to_string(), field(&self.title));
        vars.insert("email".to_string(), Value::String(self.email.clone()));
        vars.insert(
            "organization_name".to_string(),
            field(&self.organization_name),
        );
        vars.insert(
            "organization_type".to_string(),
            field(&self.organization_type),
        );
        vars.insert("sender_name".to_string(), field(&self.sender_name));
        vars.insert("sender_title".to_string(), field(&self.sender_title));
        vars
    }
}
