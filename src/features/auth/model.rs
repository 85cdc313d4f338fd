use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Principal extracted from a validated access token
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct AuthenticatedUser {
    /// Subject claim of the token
    pub sub: String,
    /// Display name, when the issuer includes one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default)]
    pub roles: Vec<String>,
}
