use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use domain::{TodoId, UserId};
use serde::de::DeserializeOwned;
use shared::AppError;

/// Lambda Authorizer のコンテキストでユーザー ID を探すキー（先頭を優先）
const USER_ID_AUTHORIZER_KEYS: &[&str] = &["principalId", "userId"];

/// API Gateway プロキシリクエストから ToDo API の入力を取り出す
pub trait ApiGatewayRequestExt {
    /// 認証済みユーザー ID を取り出す（principalId を優先）
    fn user_id(&self) -> Result<UserId, AppError>;

    /// パスパラメータ `todoId` を取り出して検証する
    fn todo_id(&self) -> Result<TodoId, AppError>;

    /// JSON ボディをデシリアライズする
    fn json_body<T: DeserializeOwned>(&self) -> Result<T, AppError>;
}

impl ApiGatewayRequestExt for ApiGatewayProxyRequest {
    fn user_id(&self) -> Result<UserId, AppError> {
        let fields = &self.request_context.authorizer.fields;
        if fields.is_empty() {
            return Err(AppError::Authentication(
                "authorizer がありません".to_string(),
            ));
        }

        let raw = USER_ID_AUTHORIZER_KEYS
            .iter()
            .filter_map(|key| fields.get(*key).and_then(|value| value.as_str()))
            .find(|id| !id.trim().is_empty())
            .ok_or_else(|| AppError::Authentication("ユーザー ID がありません".to_string()))?;

        UserId::from_string(raw.to_string()).map_err(|e| AppError::Authentication(e.to_string()))
    }

    fn todo_id(&self) -> Result<TodoId, AppError> {
        let raw = self
            .path_parameters
            .get("todoId")
            .ok_or_else(|| AppError::Validation("todoId パスパラメータがありません".to_string()))?;

        Ok(TodoId::from_string(raw.clone())?)
    }

    fn json_body<T: DeserializeOwned>(&self) -> Result<T, AppError> {
        // JSON API なのでバイナリメディアタイプとしての受信は受け付けない
        if self.is_base64_encoded {
            return Err(AppError::Deserialization(
                "base64 エンコードされたボディには対応していません".to_string(),
            ));
        }

        let body = self
            .body
            .as_deref()
            .filter(|body| !body.trim().is_empty())
            .ok_or_else(|| AppError::Deserialization("リクエストボディがありません".to_string()))?;

        serde_json::from_str(body).map_err(|e| AppError::Deserialization(e.to_string()))
    }
}
