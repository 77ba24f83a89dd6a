use serde::{Deserialize, Serialize};

/// Identity returned by the external identity service's `/me` endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Identity {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default, alias = "u_employee_id")]
    pub employee_id: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Principal performing a write, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub employee_id: String,
    pub user_id: Option<i64>,
}

/// Actor recorded for automated expiry.
pub const SYSTEM_ACTOR: &str = "System";

impl Actor {
    /// Employee identifier when the identity carries one, otherwise the user id.
    pub fn from_identity(identity: &Identity) -> Option<Self> {
        let employee_id = identity
            .employee_id
            .clone()
            .filter(|e| !e.trim().is_empty())
            .or_else(|| identity.id.map(|id| id.to_string()))?;
        Some(Self {
            employee_id,
            user_id: identity.id,
        })
    }
}
