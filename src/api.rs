use actix_web::{web, Responder};
use std::sync::Arc;

use crate::error::ApiError;
use crate::gitlab::MergeRequestApi;
use crate::llm::ModelBackend;
use crate::orchestrator::run_review;
use crate::types::WebhookEvent;

/// Shared handles behind the two trait seams. One instance for the process
/// lifetime; each review borrows them through the `Arc`s.
#[derive(Clone)]
pub struct AppState {
    pub gitlab: Arc<dyn MergeRequestApi>,
    pub backend: Arc<dyn ModelBackend>,
}

pub async fn health() -> impl Responder {
    web::Json(serde_json::json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// GitLab webhook endpoint. The sender always gets an immediate 200: either
/// an ignore message or an acknowledgment that a review was spawned. Review
/// outcomes are observable only through posted comments and logs.
///
/// The kind gate runs before any MR field is required, so push/tag/pipeline
/// hooks with non-MR payload shapes are acknowledged, not rejected.
pub async fn gitlab_webhook(
    body: web::Json<WebhookEvent>,
    state: web::Data<AppState>,
) -> Result<web::Json<serde_json::Value>, ApiError> {
    let event = body.into_inner();

    if event.object_kind != "merge_request" {
        tracing::info!(object_kind = %event.object_kind, "ignoring event type");
        return Ok(web::Json(serde_json::json!({"message": "Event ignored"})));
    }

    let (Some(project), Some(mr)) = (event.project, event.object_attributes) else {
        return Err(ApiError::MalformedPayload(
            "merge_request event without object_attributes or project".to_string(),
        ));
    };

    // Review only MRs that are open or just updated, not closed/merged ones.
    if mr.state != "opened" && mr.action != "update" {
        tracing::info!(mr_iid = mr.iid, state = %mr.state, "ignoring MR state");
        return Ok(web::Json(serde_json::json!({"message": "MR state ignored"})));
    }

    tracing::info!(mr_iid = mr.iid, title = %mr.title, "processing merge request");

    // Detached task: the HTTP response is long gone by the time the review
    // finishes, so its errors end in the log, never in a response.
    let state = state.into_inner();
    tokio::spawn(async move {
        if let Err(e) =
            run_review(state.gitlab.as_ref(), state.backend.as_ref(), project.id, &mr).await
        {
            tracing::error!(mr_iid = mr.iid, error = %e, "review failed");
        }
    });

    Ok(web::Json(
        serde_json::json!({"message": "Webhook received, processing..."}),
    ))
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        ApiError::MalformedPayload(err.to_string()).into()
    }))
    .route("/health", web::get().to(health))
    .route("/webhook/gitlab", web::post().to(gitlab_webhook));
}
