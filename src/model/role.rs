use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Dashboard roles stored in a record's `role` field.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Role {
    User,
    Manager,
    Admin,
    Superadmin,
}

impl Role {
    pub fn from_name(name: &str) -> Option<Self> {
        name.trim().parse().ok()
    }
}
