//! Plan user model.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{PlannerError, Result};

/// User dictionary of a plan, keyed by plan-local user id.
pub type Users = BTreeMap<String, User>;

/// Lightweight per-plan user. The id is the key in [`Users`], not a field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Name shown next to assigned tasks
    pub display_name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
}

impl User {
    /// Creates a user with only a display name.
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            first_name: None,
            last_name: None,
            email: None,
            phone_number: None,
        }
    }

    /// Returns a copy with whitespace trimmed and blank optional fields
    /// dropped, or an error if the display name or email is unusable.
    pub fn normalized(&self) -> Result<User> {
        let display_name = self.display_name.trim();
        if display_name.is_empty() {
            return Err(PlannerError::invalid_input("display_name")
                .with_reason("Display name is required"));
        }

        let email = non_blank(&self.email);
        if let Some(email) = &email {
            if !looks_like_email(email) {
                return Err(PlannerError::invalid_input("email")
                    .with_reason(format!("'{email}' is not a valid email address")));
            }
        }

        Ok(User {
            display_name: display_name.to_string(),
            first_name: non_blank(&self.first_name),
            last_name: non_blank(&self.last_name),
            email,
            phone_number: non_blank(&self.phone_number),
        })
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(String::from)
}

/// Loose `local@domain.tld` shape check without whitespace.
fn looks_like_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .rsplit_once('.')
                    .is_some_and(|(host, tld)| !host.is_empty() && !tld.is_empty())
        }
        None => false,
    }
}
