//! POST /todos

use super::HandlerResult;
use crate::request::ApiGatewayRequestExt;
use crate::response::json_response;
use crate::state::AppState;
use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use domain::{CreateTodoRequest, TodoItem};
use infrastructure::{AttachmentStorage, TodoRepository};
use serde::Serialize;
use shared::BusinessMetrics;
use tracing::info;

pub const HANDLER_NAME: &str = "create-todo";

#[derive(Debug, Serialize)]
struct CreateTodoResponse {
    item: TodoItem,
}

/// ToDo を作成して 201 で返す
pub async fn handle<R, S>(state: &AppState<R, S>, request: ApiGatewayProxyRequest) -> HandlerResult
where
    R: TodoRepository,
    S: AttachmentStorage,
{
    let user_id = request.user_id()?;
    let new_todo = request.json_body::<CreateTodoRequest>()?.validate()?;

    let item = state.service.create_todo(user_id, new_todo).await?;

    info!(
        "ToDo を作成しました: user_id={}, todo_id={}",
        item.user_id, item.todo_id
    );
    state.metrics.record(&BusinessMetrics::todo_created());

    json_response(201, &CreateTodoResponse { item })
}
