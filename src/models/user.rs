use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: String,
    pub provider: String,
    #[serde(default)]
    pub avatar: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields accepted when creating or patching a user. Unset fields are left out
/// of the request body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

/// One page of the user listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPage {
    pub data: Vec<User>,
    pub total: usize,
    pub page: u32,
    pub limit: u32,
}

/// `{"data": {"users": [...]}}` as sent by `GET /users`.
#[derive(Debug, Deserialize)]
pub(crate) struct UserListEnvelope {
    pub data: UserListData,
}

#[derive(Debug, Default, Deserialize)]
pub(crate) struct UserListData {
    #[serde(default)]
    pub users: Option<Vec<User>>,
}

/// `{"data": ...}` as sent by the single-user endpoints.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}
