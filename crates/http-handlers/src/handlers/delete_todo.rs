//! DELETE /todos/{todoId}

use super::HandlerResult;
use crate::request::ApiGatewayRequestExt;
use crate::response::json_response;
use crate::state::AppState;
use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use infrastructure::{AttachmentStorage, TodoRepository};
use serde_json::json;
use shared::BusinessMetrics;
use tracing::info;

pub const HANDLER_NAME: &str = "delete-todo";

/// ToDo を削除する。対象がなければ 404
pub async fn handle<R, S>(state: &AppState<R, S>, request: ApiGatewayProxyRequest) -> HandlerResult
where
    R: TodoRepository,
    S: AttachmentStorage,
{
    let user_id = request.user_id()?;
    let todo_id = request.todo_id()?;

    state.service.delete_todo(&user_id, &todo_id).await?;

    info!("ToDo を削除しました: user_id={}, todo_id={}", user_id, todo_id);
    state.metrics.record(&BusinessMetrics::todo_deleted());

    json_response(200, &json!({}))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handlers::test_support::{body_text, request, test_state};
    use domain::{NewTodo, TodoId, UserId};

    #[tokio::test]
    async fn test_delete_then_absent() {
        let state = test_state();
        let created = state
            .service
            .create_todo(
                UserId::from_string("U1".to_string()).unwrap(),
                NewTodo {
                    name: "buy milk".to_string(),
                    due_date: "2024-01-01".to_string(),
                },
            )
            .await
            .unwrap();

        let response = handle(&state, request(Some("U1"), Some(created.todo_id.as_str()), None))
            .await
            .unwrap();
        assert_eq!(response.status_code, 200);
        assert_eq!(body_text(&response), "{}");
        assert!(state.service.repository().is_empty().await);

        let error = handle(&state, request(Some("U1"), Some(created.todo_id.as_str()), None))
            .await
            .unwrap_err();
        assert_eq!(error.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_delete_unknown_item() {
        let state = test_state();
        let error = handle(&state, request(Some("U1"), Some(TodoId::new().as_str()), None))
            .await
            .unwrap_err();

        assert_eq!(error.http_status_code(), 404);
    }

    #[tokio::test]
    async fn test_invalid_todo_id() {
        let state = test_state();
        let error = handle(&state, request(Some("U1"), Some("../etc"), None))
            .await
            .unwrap_err();

        assert_eq!(error.http_status_code(), 400);
    }

    #[tokio::test]
    async fn test_padded_todo_id_does_not_reach_stored_item() {
        let state = test_state();
        let created = state
            .service
            .create_todo(
                UserId::from_string("U1".to_string()).unwrap(),
                NewTodo {
                    name: "buy milk".to_string(),
                    due_date: "2024-01-01".to_string(),
                },
            )
            .await
            .unwrap();

        let padded = format!(" {} ", created.todo_id);
        let error = handle(&state, request(Some("U1"), Some(&padded), None))
            .await
            .unwrap_err();
        assert_eq!(error.http_status_code(), 400);
        assert_eq!(state.service.repository().len().await, 1);
    }
}
