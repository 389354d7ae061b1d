//! PATCH /todos/{todoId}

use super::HandlerResult;
use crate::request::ApiGatewayRequestExt;
use crate::response::json_response;
use crate::state::AppState;
use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use domain::UpdateTodoRequest;
use infrastructure::{AttachmentStorage, TodoRepository};
use serde_json::json;
use shared::BusinessMetrics;
use tracing::info;

pub const HANDLER_NAME: &str = "update-todo";

/// name / dueDate / done を上書きする。対象がなければ 404
pub async fn handle<R, S>(state: &AppState<R, S>, request: ApiGatewayProxyRequest) -> HandlerResult
where
    R: TodoRepository,
    S: AttachmentStorage,
{
    let user_id = request.user_id()?;
    let todo_id = request.todo_id()?;
    let update = request.json_body::<UpdateTodoRequest>()?.validate()?;

    state
        .service
        .update_todo(&user_id, &todo_id, &update)
        .await?;

    info!("ToDo を更新しました: user_id={}, todo_id={}", user_id, todo_id);
    state.metrics.record(&BusinessMetrics::todo_updated());

    json_response(200, &json!({}))
}
