//! エンドポイントごとのハンドラー

pub mod create_todo;
pub mod delete_todo;
pub mod generate_upload_url;
pub mod list_todos;
pub mod update_todo;

use crate::response::resolve_request_id;
use crate::state::AppState;
use aws_lambda_events::event::apigw::{ApiGatewayProxyRequest, ApiGatewayProxyResponse};
use lambda_runtime::{Error, LambdaEvent};
use shared::AppError;
use std::future::Future;
use std::time::Instant;
use tracing::info;

pub type HandlerResult = Result<ApiGatewayProxyResponse, AppError>;

/// Lambda イベントを 1 件処理する
///
/// スパンの開始、リクエスト ID の解決、エラーのレスポンス変換をまとめて行う。
/// ハンドラーのエラーはすべて HTTP レスポンスに変換されるため、Lambda としては失敗しない。
pub async fn dispatch<'a, R, S, F, Fut>(
    state: &'a AppState<R, S>,
    handler_name: &'static str,
    event: LambdaEvent<ApiGatewayProxyRequest>,
    handle: F,
) -> Result<ApiGatewayProxyResponse, Error>
where
    F: FnOnce(&'a AppState<R, S>, ApiGatewayProxyRequest) -> Fut,
    Fut: Future<Output = HandlerResult>,
{
    let LambdaEvent {
        payload: request,
        context,
    } = event;
    let request_id = resolve_request_id(&context.request_id);

    shared::trace_lambda_handler!(handler_name, context, async move {
        info!(
            method = %request.http_method,
            path = request.path.as_deref().unwrap_or("-"),
            "リクエストを受信しました"
        );
        let started = Instant::now();
        let result = handle(state, request).await;
        Ok::<_, Error>(state.respond(handler_name, &request_id, started, result))
    })
}
