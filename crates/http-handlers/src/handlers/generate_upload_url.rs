//! POST /todos/{todoId}/attachment

use super::HandlerResult;
use crate::request::ApiGatewayRequestExt;
use crate::response::json_response;
use crate::state::AppState;
use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use infrastructure::{AttachmentStorage, TodoRepository};
use serde::Serialize;
use shared::BusinessMetrics;
use tracing::info;

pub const HANDLER_NAME: &str = "generate-upload-url";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct UploadUrlResponse {
    upload_url: String,
}

/// 添付ファイルのアップロード用署名付き URL を返す
pub async fn handle<R, S>(state: &AppState<R, S>, request: ApiGatewayProxyRequest) -> HandlerResult
where
    R: TodoRepository,
    S: AttachmentStorage,
{
    let user_id = request.user_id()?;
    let todo_id = request.todo_id()?;

    let upload = state
        .service
        .create_attachment_upload_url(&user_id, &todo_id)
        .await?;

    info!(
        "アップロード URL を発行しました: user_id={}, todo_id={}, expires_at={}",
        user_id, todo_id, upload.expires_at
    );
    state.metrics.record(&BusinessMetrics::attachment_url_issued());

    json_response(
        201,
        &UploadUrlResponse {
            upload_url: upload.url,
        },
    )
}
