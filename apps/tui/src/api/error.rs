use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// 409 from dataset creation: this city/transport pair is already registered.
    #[error("conflict: {0}")]
    Conflict(String),

    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Malformed(String),

    /// Rejected before sending: the id cannot name a single dataset path segment.
    #[error("invalid dataset id `{0}`")]
    InvalidDatasetId(String),
}

impl ApiError {
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Conflict(_) => Some(409),
            Self::Status { status, .. } => Some(*status),
            Self::Transport(_) | Self::Malformed(_) | Self::InvalidDatasetId(_) => None,
        }
    }

    pub const fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Text shown to the user when `operation` fails with this error.
    pub fn user_message(&self, operation: &str) -> String {
        match self {
            Self::Conflict(_) => {
                "A dataset for this city and transport type already exists. \
                 Open it from the dataset list instead."
                    .to_string()
            }
            Self::Status { status, detail } => {
                format!("{operation} failed: {detail} (HTTP {status})")
            }
            Self::Transport(err) => {
                format!("{operation} failed: the analysis service is unreachable ({err})")
            }
            Self::Malformed(reason) => {
                format!("{operation} failed: unexpected response from the service ({reason})")
            }
            Self::InvalidDatasetId(id) => {
                format!("{operation} failed: `{id}` is not a valid dataset id")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conflict_has_its_own_message() {
        let conflict = ApiError::Conflict("Dataset already exists".to_string());
        let generic = ApiError::Status {
            status: 500,
            detail: "Failed to create dataset".to_string(),
        };

        let conflict_text = conflict.user_message("Creating dataset");
        let generic_text = generic.user_message("Creating dataset");

        assert!(conflict_text.contains("already exists"));
        assert!(!conflict_text.contains("HTTP"));
        assert_eq!(
            generic_text,
            "Creating dataset failed: Failed to create dataset (HTTP 500)"
        );
        assert!(conflict.is_conflict());
        assert_eq!(generic.status(), Some(500));
    }
}
