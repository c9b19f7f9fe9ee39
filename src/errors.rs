use uuid::Uuid;

/// All error types that can occur when configuring or driving a light group.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// A threshold or default in the group configuration is invalid.
    #[error("invalid configuration for {field}: {reason}")]
    Configuration { field: String, reason: String },

    /// Attempted to handle a [`crate::GroupCommand`] with no attributes set.
    #[error("unroutable command; no attributes set")]
    UnroutableCommand,

    /// A state update referenced a light that is not a member of the group.
    #[error("member {member_id} not found in group {group_id}")]
    MemberNotFound { group_id: Uuid, member_id: String },

    /// The host failed to deliver a command to a member light.
    #[error("dispatch to {member_id} failed: {reason}")]
    Dispatch { member_id: String, reason: String },
}

impl Error {
    /// Create a new configuration error
    pub fn configuration(field: &str, reason: impl Into<String>) -> Self {
        Error::Configuration {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a new member not found error
    pub fn member_not_found(group_id: &Uuid, member_id: &str) -> Self {
        Error::MemberNotFound {
            group_id: *group_id,
            member_id: member_id.to_string(),
        }
    }

    /// Create a new dispatch error
    pub fn dispatch(member_id: &str, reason: impl Into<String>) -> Self {
        Error::Dispatch {
            member_id: member_id.to_string(),
            reason: reason.into(),
        }
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
