//! GET /todos

use super::HandlerResult;
use crate::request::ApiGatewayRequestExt;
use crate::response::json_response;
use crate::state::AppState;
use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use domain::TodoItem;
use infrastructure::{AttachmentStorage, TodoRepository};
use serde::Serialize;
use shared::BusinessMetrics;
use tracing::info;

pub const HANDLER_NAME: &str = "list-todos";

#[derive(Debug, Serialize)]
struct ListTodosResponse {
    items: Vec<TodoItem>,
}

/// 認証済みユーザーの ToDo をすべて返す
pub async fn handle<R, S>(state: &AppState<R, S>, request: ApiGatewayProxyRequest) -> HandlerResult
where
    R: TodoRepository,
    S: AttachmentStorage,
{
    let user_id = request.user_id()?;
    let items = state.service.list_todos(&user_id).await?;

    info!("ToDo 一覧を返します: user_id={}, count={}", user_id, items.len());
    state.metrics.record(&BusinessMetrics::todos_listed(items.len()));

    json_response(200, &ListTodosResponse { items })
}
