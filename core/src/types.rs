//! Domain types for the PetFriends API.
//!
//! # Design
//! The service returns JSON for most outcomes but plain text or HTML for
//! some error statuses, so every operation yields a `NormalizedResponse`
//! whose body is either `ResponseBody::Json` or `ResponseBody::Text`. Typed
//! views (`Pet`, `PetList`, `Credential`) are opt-in via `decode` rather than
//! baked into each operation.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Session key issued by `get_api_key` and sent as the `auth_key` header.
///
/// Opaque: it is passed to the service exactly as received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub key: String,
}

impl Credential {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Body of a normalized response.
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    /// The payload parsed as JSON.
    Json(Value),
    /// The payload was not valid JSON; this is the raw text.
    Text(String),
}

impl ResponseBody {
    /// Parse `raw` as JSON, keeping the text verbatim when that fails.
    pub fn from_text(raw: String) -> Self {
        match serde_json::from_str::<Value>(&raw) {
            Ok(value) => ResponseBody::Json(value),
            Err(_) => ResponseBody::Text(raw),
        }
    }
}

/// Status code plus body, returned by every client operation regardless of
/// the status.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub status: u16,
    pub body: ResponseBody,
}

impl NormalizedResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn json(&self) -> Option<&Value> {
        match &self.body {
            ResponseBody::Json(value) => Some(value),
            ResponseBody::Text(_) => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match &self.body {
            ResponseBody::Text(text) => Some(text),
            ResponseBody::Json(_) => None,
        }
    }

    /// Top-level field of a JSON object body.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.json().and_then(|v| v.get(name))
    }

    /// Typed view of a JSON body. `None` for text bodies and shape mismatches.
    pub fn decode<T: DeserializeOwned>(&self) -> Option<T> {
        self.json()
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Session key carried by a `get_api_key` response, if any.
    pub fn credential(&self) -> Option<Credential> {
        self.decode()
    }
}

/// A pet record as the service reports it. Age is text, not a number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pet {
    pub id: String,
    pub name: String,
    pub animal_type: String,
    pub age: String,
    #[serde(default)]
    pub pet_photo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body of a `get_list_of_pets` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PetList {
    pub pets: Vec<Pet>,
}

/// Text fields of a create/update request. `None` fields are left out of the
/// form entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetForm {
    pub name: Option<String>,
    pub animal_type: Option<String>,
    pub age: Option<String>,
}

impl PetForm {
    pub fn new(name: &str, animal_type: &str, age: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            animal_type: Some(animal_type.to_string()),
            age: Some(age.to_string()),
        }
    }

    fn get(&self, field: &str) -> Option<&str> {
        match field {
            "name" => self.name.as_deref(),
            "animal_type" => self.animal_type.as_deref(),
            "age" => self.age.as_deref(),
            _ => None,
        }
    }

    /// Present fields, in the order given by `order`.
    pub(crate) fn fields(&self, order: &[&'static str]) -> Vec<(&'static str, &str)> {
        order
            .iter()
            .filter_map(|&k| self.get(k).map(|v| (k, v)))
            .collect()
    }
}
