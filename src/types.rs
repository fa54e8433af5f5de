use serde::{Deserialize, Serialize};

/// Top-level GitLab webhook payload. Only the fields the pipeline reads are
/// modeled; everything else in the payload is ignored. Non-MR hooks (push,
/// tag, pipeline) carry no MR-shaped attributes, so both fields stay
/// optional until the event is gated on `object_kind`.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub object_kind: String,
    #[serde(default)]
    pub object_attributes: Option<MergeRequestAttributes>,
    #[serde(default)]
    pub project: Option<Project>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MergeRequestAttributes {
    pub id: u64,
    pub iid: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub action: String,
    #[serde(default)]
    pub diff_refs: Option<DiffRefs>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Project {
    pub id: u64,
    #[serde(default)]
    pub name: String,
}

/// Diff references as they appear in webhook payloads and MR metadata.
/// Any of the three SHAs may be absent in a payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DiffRefs {
    #[serde(default)]
    pub base_sha: Option<String>,
    #[serde(default)]
    pub start_sha: Option<String>,
    #[serde(default)]
    pub head_sha: Option<String>,
}

impl DiffRefs {
    /// True when all three SHAs are present.
    pub fn is_complete(&self) -> bool {
        self.base_sha.is_some() && self.start_sha.is_some() && self.head_sha.is_some()
    }
}

/// MR metadata fetched from the API when the webhook payload lacks diff refs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MergeRequestInfo {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub diff_refs: Option<DiffRefs>,
}

/// One changed file in a merge request, in unified-diff form.
#[derive(Debug, Clone, Deserialize)]
pub struct Diff {
    pub old_path: String,
    pub new_path: String,
    #[serde(default)]
    pub diff: String,
    #[serde(default)]
    pub new_file: bool,
    #[serde(default)]
    pub renamed_file: bool,
    #[serde(default)]
    pub deleted_file: bool,
}

/// Everything about the merge request one review pass needs, resolved once
/// up front. The three SHAs describe the MR snapshot and are shared by every
/// comment the review produces.
#[derive(Debug, Clone)]
pub struct ReviewContext {
    pub title: String,
    pub description: String,
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
}

/// A single (line, comment) remark parsed out of a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub line: i64,
    pub comment: String,
}

/// Coordinates GitLab needs to anchor a comment to a diff line.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CommentPosition {
    pub base_sha: String,
    pub start_sha: String,
    pub head_sha: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_path: Option<String>,
    pub new_path: String,
    pub position_type: String,
    pub new_line: i64,
}

/// A finding enriched with its diff position, ready to post.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ReviewComment {
    pub body: String,
    pub position: CommentPosition,
}
