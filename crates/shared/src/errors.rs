use domain::{DomainError, TodoError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// HTTP 境界で扱うアプリケーション全体のエラー型
#[derive(Debug, Clone, Error)]
pub enum AppError {
    // 入力エラー
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Deserialization error: {0}")]
    Deserialization(String),

    // 認証エラー
    #[error("Authentication failed: {0}")]
    Authentication(String),

    // 前提条件エラー
    #[error("Resource not found: {0}")]
    NotFound(String),

    // 上流サービスエラー
    #[error("DynamoDB error: {0}")]
    DynamoDb(String),

    #[error("S3 error: {0}")]
    Storage(String),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),

    // システムエラー
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// エラーの分類
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    /// クライアントエラー（4xx相当）
    Client,
    /// サーバーエラー（5xx相当）
    Server,
    /// 上流サービスの一時的なエラー（呼び出し側の判断で再試行可能）
    Transient,
}

/// エラーの重要度
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

/// エラーメタデータ
#[derive(Debug, Clone)]
pub struct ErrorMetadata {
    pub code: &'static str,
    pub category: ErrorCategory,
    pub severity: ErrorSeverity,
}

impl ErrorMetadata {
    fn new(code: &'static str, category: ErrorCategory, severity: ErrorSeverity) -> Self {
        Self {
            code,
            category,
            severity,
        }
    }
}

impl AppError {
    /// エラーメタデータを取得
    pub fn metadata(&self) -> ErrorMetadata {
        use ErrorCategory as C;
        use ErrorSeverity as S;

        match self {
            AppError::Validation(_) => ErrorMetadata::new("VALIDATION_ERROR", C::Client, S::Info),
            AppError::Deserialization(_) => {
                ErrorMetadata::new("INVALID_REQUEST_BODY", C::Client, S::Info)
            }
            AppError::Authentication(_) => {
                ErrorMetadata::new("AUTHENTICATION_ERROR", C::Client, S::Warning)
            }
            AppError::NotFound(_) => ErrorMetadata::new("NOT_FOUND", C::Client, S::Info),
            AppError::DynamoDb(_) => ErrorMetadata::new("DYNAMODB_ERROR", C::Server, S::Error),
            AppError::Storage(_) => ErrorMetadata::new("STORAGE_ERROR", C::Server, S::Error),
            AppError::ServiceUnavailable(_) => {
                ErrorMetadata::new("SERVICE_UNAVAILABLE", C::Transient, S::Error)
            }
            AppError::Serialization(_) => {
                ErrorMetadata::new("SERIALIZATION_ERROR", C::Server, S::Error)
            }
            AppError::Internal(_) => ErrorMetadata::new("INTERNAL_ERROR", C::Server, S::Critical),
        }
    }

    /// HTTPステータスコードを取得
    pub fn http_status_code(&self) -> u16 {
        match self.metadata().category {
            ErrorCategory::Client => match self {
                AppError::NotFound(_) => 404,
                AppError::Authentication(_) => 401,
                _ => 400,
            },
            ErrorCategory::Server => 500,
            ErrorCategory::Transient => 503,
        }
    }

    /// ユーザー向けメッセージを取得
    pub fn user_message(&self) -> String {
        match self {
            AppError::NotFound(_) => "ToDo が見つかりません".to_string(),
            AppError::Authentication(_) => "認証に失敗しました".to_string(),
            AppError::Validation(_) | AppError::Deserialization(_) => {
                "入力データが無効です".to_string()
            }
            AppError::ServiceUnavailable(_) => "サービスが一時的に利用できません".to_string(),
            _ => "予期しないエラーが発生しました".to_string(),
        }
    }

    /// 重要度に応じたレベルでエラーをログに記録
    pub fn log(&self, request_id: &str) {
        let metadata = self.metadata();

        match metadata.severity {
            ErrorSeverity::Critical | ErrorSeverity::Error => {
                tracing::error!(
                    error = %self,
                    code = metadata.code,
                    category = ?metadata.category,
                    request_id,
                    "リクエスト処理エラー"
                );
            }
            ErrorSeverity::Warning => {
                tracing::warn!(
                    error = %self,
                    code = metadata.code,
                    request_id,
                    "リクエスト処理エラー"
                );
            }
            ErrorSeverity::Info => {
                tracing::info!(
                    error = %self,
                    code = metadata.code,
                    request_id,
                    "リクエストを拒否しました"
                );
            }
        }
    }
}

impl From<DomainError> for AppError {
    fn from(error: DomainError) -> Self {
        AppError::Validation(error.to_string())
    }
}

impl From<TodoError> for AppError {
    fn from(error: TodoError) -> Self {
        match error {
            TodoError::NotFound(msg) => AppError::NotFound(msg),
            TodoError::DynamoDb(msg) => AppError::DynamoDb(msg),
            TodoError::Storage(msg) => AppError::Storage(msg),
            TodoError::ServiceUnavailable(msg) => AppError::ServiceUnavailable(msg),
            TodoError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// 標準化されたエラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// エラーコード
    pub code: String,
    /// ユーザー向けメッセージ
    pub message: String,
    /// 詳細情報（開発環境のみ）
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    /// リクエストID
    pub request_id: String,
    /// タイムスタンプ
    pub timestamp: String,
}

impl ErrorResponse {
    /// AppErrorからErrorResponseを作成
    ///
    /// クライアントエラーの詳細は常に返す（どのフィールドが不正か分かるように）。
    /// サーバーエラーの詳細は `include_details` が真のときのみ含める。
    pub fn from_app_error(error: &AppError, request_id: String, include_details: bool) -> Self {
        let metadata = error.metadata();
        let details = if include_details || metadata.category == ErrorCategory::Client {
            Some(error.to_string())
        } else {
            None
        };

        Self {
            code: metadata.code.to_string(),
            message: error.user_message(),
            details,
            request_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// JSONレスポンスとして返すためのシリアライズ
    pub fn to_json(&self) -> Result<String, AppError> {
        serde_json::to_string(self).map_err(|e| AppError::Serialization(e.to_string()))
    }
}
