use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A customer that can be attached to a pending sale. Optional on every
/// sale; walk-in checkouts carry no customer at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}
