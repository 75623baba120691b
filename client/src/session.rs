//! The user session record and local time stamping.

use chrono::Local;
use serde::{Deserialize, Serialize};

/// Role of the logged-in operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Staff,
}

/// The persisted user session. Expiry is enforced by the host shell, not
/// by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub name: String,
    pub role: Role,
}

impl User {
    /// Create a fresh staff session for a display name.
    pub fn staff(name: impl Into<String>) -> Self {
        Self {
            id: format!("user-{}", now_millis()),
            name: name.into(),
            role: Role::Staff,
        }
    }
}

/// Current time in milliseconds since the epoch.
pub fn now_millis() -> u64 {
    Local::now().timestamp_millis().max(0) as u64
}

/// The update stamp written into saved records: local time formatted
/// `DD/MM/YYYY HH:MM:SS`, the format the remote sheet expects.
pub fn update_stamp() -> String {
    Local::now().format("%d/%m/%Y %H:%M:%S").to_string()
}
