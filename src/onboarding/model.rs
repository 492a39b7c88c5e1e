//! Submission flattening and the echoed user record.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ApiError;
use crate::session::SessionUser;

/// Message returned for any submission body that is not `{ "steps": [...] }`.
pub const INVALID_BODY_MESSAGE: &str = "Invalid request body format";

/// Fallbacks used when the session carries an empty identity.
pub mod identity_defaults {
    pub const ID: u64 = 1;
    pub const USERNAME: &str = "username";
    pub const EMAIL: &str = "test@test.com";
}

/// Submitted answers flattened into a single field → value map.
///
/// No required-ness or type validation is performed: whatever the client
/// sent is kept, with later duplicates overwriting earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlatSubmission {
    pub values: Map<String, Value>,
}

impl FlatSubmission {
    /// Flatten a raw request body.
    ///
    /// `steps` is flattened one level: an array element contributes its
    /// entries, anything else counts as a single entry. Entries without a
    /// string `name` are skipped.
    pub fn from_body(body: &Value) -> Result<Self, ApiError> {
        let steps = body
            .get("steps")
            .and_then(Value::as_array)
            .ok_or_else(|| ApiError::MalformedInput(INVALID_BODY_MESSAGE.to_string()))?;

        let mut values = Map::new();
        let entries = steps.iter().flat_map(|step| match step {
            Value::Array(fields) => fields.iter().collect::<Vec<_>>(),
            other => vec![other],
        });
        for entry in entries {
            match entry.get("name").and_then(Value::as_str) {
                Some(name) => {
                    let value = entry.get("value").cloned().unwrap_or(Value::Null);
                    values.insert(name.to_string(), value);
                }
                None => debug!(entry = %entry, "Skipping submission entry without a name"),
            }
        }
        Ok(Self { values })
    }

    /// Submitted text, or `""` when missing, empty, or not a string.
    pub fn text(&self, name: &str) -> String {
        self.values
            .get(name)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    }

    /// Submitted flag, or `false` when missing or not a boolean.
    pub fn flag(&self, name: &str) -> bool {
        self.values
            .get(name)
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// User record synthesized from the session and a submission. Never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: u64,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub bio: String,
    pub country: String,
    pub receive_notifications: bool,
    pub receive_updates: bool,
    pub photo_url: String,
    pub completed_onboarding: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl UserRecord {
    pub fn from_submission(
        user: &SessionUser,
        submission: &FlatSubmission,
        photo_url: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let timestamp = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        let or_default = |value: &str, fallback: &str| {
            if value.is_empty() {
                fallback.to_string()
            } else {
                value.to_string()
            }
        };

        Self {
            id: if user.id == 0 { identity_defaults::ID } else { user.id },
            username: or_default(&user.username, identity_defaults::USERNAME),
            email: or_default(&user.email, identity_defaults::EMAIL),
            first_name: submission.text("firstName"),
            last_name: submission.text("lastName"),
            bio: submission.text("bio"),
            country: submission.text("country"),
            receive_notifications: submission.flag("receiveNotifications"),
            receive_updates: submission.flag("receiveUpdates"),
            photo_url: photo_url.to_string(),
            completed_onboarding: true,
            created_at: timestamp.clone(),
            updated_at: timestamp,
        }
    }
}
