use aws_lambda_events::encodings::Body;
use aws_lambda_events::event::apigw::ApiGatewayProxyResponse;
use aws_lambda_events::http::header::{
    ACCESS_CONTROL_ALLOW_CREDENTIALS, ACCESS_CONTROL_ALLOW_ORIGIN, CONTENT_TYPE,
};
use aws_lambda_events::http::{HeaderMap, HeaderValue};
use serde::Serialize;
use shared::{AppError, ErrorResponse};
use tracing::error;

/// すべてのレスポンスに付与する CORS ヘッダー
pub fn cors_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));
    headers.insert(
        ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    headers
}

fn text_response(status_code: i64, body: String) -> ApiGatewayProxyResponse {
    ApiGatewayProxyResponse {
        status_code,
        headers: cors_headers(),
        multi_value_headers: HeaderMap::new(),
        body: Some(Body::Text(body)),
        is_base64_encoded: false,
    }
}

/// JSON ボディのレスポンスを作成
pub fn json_response<T: Serialize>(
    status_code: i64,
    body: &T,
) -> Result<ApiGatewayProxyResponse, AppError> {
    let body = serde_json::to_string(body).map_err(|e| AppError::Serialization(e.to_string()))?;
    Ok(text_response(status_code, body))
}

/// エラーレスポンスを作成
pub fn error_response(
    error: &AppError,
    request_id: &str,
    include_details: bool,
) -> ApiGatewayProxyResponse {
    let body = ErrorResponse::from_app_error(error, request_id.to_string(), include_details)
        .to_json()
        .unwrap_or_else(|e| {
            error!("エラーレスポンスのシリアライズに失敗しました: {}", e);
            r#"{"code":"INTERNAL_ERROR","message":"予期しないエラーが発生しました"}"#.to_string()
        });

    text_response(i64::from(error.http_status_code()), body)
}

/// Lambda のリクエスト ID（空ならその場で採番）
pub fn resolve_request_id(lambda_request_id: &str) -> String {
    if lambda_request_id.is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        lambda_request_id.to_string()
    }
}
