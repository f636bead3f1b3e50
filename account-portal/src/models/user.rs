use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Account as returned by the API. Fields we don't model are kept so the
/// extension receives the record unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub role: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    pub fn name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.email.split('@').next().unwrap_or("User").to_string()
        } else {
            full.to_string()
        }
    }

    pub fn initials(&self) -> String {
        let from_names: String = [&self.first_name, &self.last_name]
            .iter()
            .filter_map(|part| part.chars().next())
            .collect();

        if !from_names.is_empty() {
            return from_names.to_uppercase();
        }

        match self.name().chars().next() {
            Some(c) => c.to_uppercase().collect(),
            None => "U".to_string(),
        }
    }
}
