use crate::error::GitLabError;
use crate::types::{CommentPosition, Diff, MergeRequestInfo};
use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

/// The three merge-request operations the review pipeline needs. A plain
/// request/response proxy: no retries, no caching, errors surface to the
/// caller as-is.
#[async_trait]
pub trait MergeRequestApi: Send + Sync {
    /// All changed files of the MR.
    async fn list_diffs(&self, project_id: u64, mr_iid: u64) -> Result<Vec<Diff>, GitLabError>;

    /// MR metadata, including its diff refs.
    async fn fetch_merge_request(
        &self,
        project_id: u64,
        mr_iid: u64,
    ) -> Result<MergeRequestInfo, GitLabError>;

    /// Create a comment: an inline discussion when positioned, otherwise a
    /// plain note on the MR.
    async fn create_discussion(
        &self,
        project_id: u64,
        mr_iid: u64,
        body: &str,
        position: Option<&CommentPosition>,
    ) -> Result<(), GitLabError>;
}

pub struct GitLabClient {
    client: Client,
    host: String,
    token: SecretString,
}

impl GitLabClient {
    pub fn new(host: String, token: SecretString) -> Self {
        Self {
            client: Client::new(),
            host: host.trim_end_matches('/').to_string(),
            token,
        }
    }

    fn mr_url(&self, project_id: u64, mr_iid: u64) -> String {
        format!(
            "{}/api/v4/projects/{}/merge_requests/{}",
            self.host, project_id, mr_iid
        )
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, GitLabError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(GitLabError::Api {
                status: status.as_u16(),
                body,
            })
        }
    }
}

#[derive(Serialize)]
struct DiscussionRequest<'a> {
    body: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    position: Option<&'a CommentPosition>,
}

#[async_trait]
impl MergeRequestApi for GitLabClient {
    async fn list_diffs(&self, project_id: u64, mr_iid: u64) -> Result<Vec<Diff>, GitLabError> {
        let url = format!("{}/diffs?per_page=100", self.mr_url(project_id, mr_iid));
        let response = self
            .client
            .get(url)
            .header("PRIVATE-TOKEN", self.token.expose_secret())
            .send()
            .await
            .map_err(GitLabError::Network)?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn fetch_merge_request(
        &self,
        project_id: u64,
        mr_iid: u64,
    ) -> Result<MergeRequestInfo, GitLabError> {
        let response = self
            .client
            .get(self.mr_url(project_id, mr_iid))
            .header("PRIVATE-TOKEN", self.token.expose_secret())
            .send()
            .await
            .map_err(GitLabError::Network)?;

        Ok(Self::check(response).await?.json().await?)
    }

    async fn create_discussion(
        &self,
        project_id: u64,
        mr_iid: u64,
        body: &str,
        position: Option<&CommentPosition>,
    ) -> Result<(), GitLabError> {
        let endpoint = if position.is_some() {
            "discussions"
        } else {
            "notes"
        };
        let url = format!("{}/{}", self.mr_url(project_id, mr_iid), endpoint);

        let response = self
            .client
            .post(url)
            .header("PRIVATE-TOKEN", self.token.expose_secret())
            .json(&DiscussionRequest { body, position })
            .send()
            .await
            .map_err(GitLabError::Network)?;

        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> GitLabClient {
        GitLabClient::new(
            "https://gitlab.example.com/".to_string(),
            SecretString::from("token"),
        )
    }

    #[test]
    fn test_mr_url_strips_trailing_slash() {
        assert_eq!(
            client().mr_url(42, 7),
            "https://gitlab.example.com/api/v4/projects/42/merge_requests/7"
        );
    }

    #[test]
    fn test_discussion_request_omits_missing_position() {
        let request = DiscussionRequest {
            body: "looks good",
            position: None,
        };
        let json = serde_json::to_string(&request).unwrap();
        assert_eq!(json, r#"{"body":"looks good"}"#);
    }

    #[test]
    fn test_discussion_request_includes_position() {
        let position = CommentPosition {
            base_sha: "a".into(),
            start_sha: "b".into(),
            head_sha: "c".into(),
            old_path: None,
            new_path: "src/lib.rs".into(),
            position_type: "text".into(),
            new_line: 3,
        };
        let request = DiscussionRequest {
            body: "check this",
            position: Some(&position),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["position"]["new_path"], "src/lib.rs");
        assert_eq!(json["position"]["position_type"], "text");
    }
}
