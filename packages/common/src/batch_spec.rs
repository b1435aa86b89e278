use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A declarative description of a code-change campaign.
///
/// Only the identity fields are modelled here. Steps, workspaces and the
/// rest of the campaign definition are owned by the execution side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSpec {
    /// Internal numeric identity. Never exposed over HTTP.
    pub id: i64,
    /// Opaque external identifier.
    pub rand_id: String,
}

/// A file attached to a batch spec and made available to executors.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSpecMount {
    /// Owning [`BatchSpec::id`].
    pub batch_spec_id: i64,
    /// Opaque external identifier, assigned by the store on creation.
    /// Empty until the mount has been persisted.
    pub rand_id: String,
    /// Logical directory of the file. May be empty.
    pub path: String,
    pub file_name: String,
    /// Byte length of `content`.
    pub size: i64,
    #[serde(skip)]
    pub content: Vec<u8>,
    /// Modification time reported by the uploading client.
    pub modified_at: DateTime<Utc>,
}

impl BatchSpecMount {
    /// Build an unsaved mount. `size` is derived from `content`.
    pub fn new(
        batch_spec_id: i64,
        path: impl Into<String>,
        file_name: impl Into<String>,
        content: Vec<u8>,
        modified_at: DateTime<Utc>,
    ) -> Self {
        Self {
            batch_spec_id,
            rand_id: String::new(),
            path: path.into(),
            file_name: file_name.into(),
            size: i64::try_from(content.len()).unwrap_or(i64::MAX),
            content,
            modified_at,
        }
    }

    /// Whether `other` addresses the same logical file (same upsert key).
    pub fn same_key(&self, other: &BatchSpecMount) -> bool {
        self.batch_spec_id == other.batch_spec_id
            && self.path == other.path
            && self.file_name == other.file_name
    }
}

// Content is elided so logging a mount never dumps file bytes.
impl std::fmt::Debug for BatchSpecMount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchSpecMount")
            .field("batch_spec_id", &self.batch_spec_id)
            .field("rand_id", &self.rand_id)
            .field("path", &self.path)
            .field("file_name", &self.file_name)
            .field("size", &self.size)
            .field("modified_at", &self.modified_at)
            .finish_non_exhaustive()
    }
}
