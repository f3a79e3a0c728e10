use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::RecordId;
use crate::session::UserId;

/// Successful answer of `POST /auth/token`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    pub user_id: UserId,
    #[serde(default)]
    pub is_admin: bool,
}

/// Body of `POST /auth/register`.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub is_admin: bool,
}

/// A row of `GET /admin/users`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdminUser {
    pub id: RecordId,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
