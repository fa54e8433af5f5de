use crate::error::{LlmError, ReviewError};
use crate::gitlab::MergeRequestApi;
use crate::llm::ModelBackend;
use crate::parser::parse_findings;
use crate::position::position_comment;
use crate::prompt::{build_review_prompt, SYSTEM_PROMPT};
use crate::types::{Diff, MergeRequestAttributes, ReviewComment, ReviewContext};

/// What a completed review did, for the log line at the spawn site.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub files_reviewed: usize,
    pub comments_posted: usize,
}

/// Run one merge-request review end to end: resolve diff refs, fetch the
/// change set, analyze each file, post the resulting comments.
///
/// Failure scope is deliberately uneven. Anything that breaks before the
/// per-file loop (refs, diff list) fails the whole review; inside the loop a
/// failed file or a failed post is logged and skipped, because partial
/// success is the intended behavior, not an anomaly.
pub async fn run_review(
    gitlab: &dyn MergeRequestApi,
    backend: &dyn ModelBackend,
    project_id: u64,
    mr: &MergeRequestAttributes,
) -> Result<ReviewOutcome, ReviewError> {
    tracing::info!(
        project_id,
        mr_iid = mr.iid,
        title = %mr.title,
        "starting review"
    );

    let ctx = resolve_context(gitlab, project_id, mr).await?;

    let diffs = gitlab.list_diffs(project_id, mr.iid).await?;
    if diffs.is_empty() {
        tracing::info!(mr_iid = mr.iid, "no diffs found, nothing to review");
        return Ok(ReviewOutcome::default());
    }
    tracing::info!(mr_iid = mr.iid, files = diffs.len(), "fetched change set");

    let mut outcome = ReviewOutcome::default();

    for diff in &diffs {
        // A removed file has no line to anchor a comment to.
        if diff.deleted_file {
            continue;
        }

        let comments = match analyze_file(backend, diff, &ctx).await {
            Ok(comments) => comments,
            Err(e) => {
                tracing::warn!(
                    mr_iid = mr.iid,
                    file = %diff.new_path,
                    error = %e,
                    "analysis failed, skipping file"
                );
                continue;
            }
        };
        outcome.files_reviewed += 1;

        // Comments for this file are posted before the next file is analyzed.
        for comment in &comments {
            match gitlab
                .create_discussion(project_id, mr.iid, &comment.body, Some(&comment.position))
                .await
            {
                Ok(()) => {
                    tracing::info!(
                        file = %comment.position.new_path,
                        line = comment.position.new_line,
                        "posted comment"
                    );
                    outcome.comments_posted += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        file = %comment.position.new_path,
                        line = comment.position.new_line,
                        error = %e,
                        "failed to post comment"
                    );
                }
            }
        }
    }

    tracing::info!(
        mr_iid = mr.iid,
        files_reviewed = outcome.files_reviewed,
        comments_posted = outcome.comments_posted,
        "completed review"
    );
    Ok(outcome)
}

/// Resolve the three diff SHAs, preferring the webhook payload and fetching
/// MR metadata at most once, only when the payload left a SHA out.
async fn resolve_context(
    gitlab: &dyn MergeRequestApi,
    project_id: u64,
    mr: &MergeRequestAttributes,
) -> Result<ReviewContext, ReviewError> {
    let payload_refs = mr.diff_refs.clone().unwrap_or_default();

    let fetched_refs = if payload_refs.is_complete() {
        Default::default()
    } else {
        gitlab
            .fetch_merge_request(project_id, mr.iid)
            .await?
            .diff_refs
            .unwrap_or_default()
    };

    let missing = |field| ReviewError::MissingDiffRefs {
        iid: mr.iid,
        missing: field,
    };

    Ok(ReviewContext {
        title: mr.title.clone(),
        description: mr.description.clone(),
        base_sha: payload_refs
            .base_sha
            .or(fetched_refs.base_sha)
            .ok_or_else(|| missing("base_sha"))?,
        start_sha: payload_refs
            .start_sha
            .or(fetched_refs.start_sha)
            .ok_or_else(|| missing("start_sha"))?,
        head_sha: payload_refs
            .head_sha
            .or(fetched_refs.head_sha)
            .ok_or_else(|| missing("head_sha"))?,
    })
}

/// One file through the pipeline: prompt, backend call, tolerant parse,
/// positioning. The only fallible step is the backend call; parse failures
/// already degraded to "no findings".
async fn analyze_file(
    backend: &dyn ModelBackend,
    diff: &Diff,
    ctx: &ReviewContext,
) -> Result<Vec<ReviewComment>, LlmError> {
    let prompt = build_review_prompt(diff, &ctx.title, &ctx.description);
    let response = backend.generate(SYSTEM_PROMPT, &prompt).await?;

    let comments = parse_findings(&response)
        .iter()
        .map(|finding| position_comment(finding, diff, ctx))
        .collect();
    Ok(comments)
}
