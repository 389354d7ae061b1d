use crate::response::error_response;
use application::TodoService;
use aws_lambda_events::event::apigw::ApiGatewayProxyResponse;
use infrastructure::{DynamoDbClient, DynamoDbTodoRepository, S3AttachmentStorage};
use shared::{AppError, BusinessMetrics, Config, MetricsClient};
use std::time::Instant;
use tracing::info;

/// エラー詳細をレスポンスに含める環境
const DETAILED_ERROR_ENVIRONMENTS: &[&str] = &["dev", "local"];

/// 呼び出しをまたいで共有する依存関係（main で一度だけ構築する）
pub struct AppState<R, S> {
    pub service: TodoService<R, S>,
    pub metrics: MetricsClient,
    pub include_error_details: bool,
}

/// 本番構成（DynamoDB + S3）
pub type LambdaState = AppState<DynamoDbTodoRepository, S3AttachmentStorage>;

impl LambdaState {
    pub async fn from_config(config: &Config) -> Self {
        info!(
            "クライアントを初期化します: table={}, bucket={}, environment={}",
            config.todos_table, config.attachment_bucket, config.environment
        );

        let db = DynamoDbClient::new(config).await;
        let storage = S3AttachmentStorage::new(config).await;
        let metrics = MetricsClient::new(
            config.metrics_namespace.clone(),
            config.environment.clone(),
            config.metrics_enabled,
        );

        Self::new(
            TodoService::new(DynamoDbTodoRepository::new(db), storage),
            metrics,
            DETAILED_ERROR_ENVIRONMENTS.contains(&config.environment.as_str()),
        )
    }
}

impl<R, S> AppState<R, S> {
    pub fn new(service: TodoService<R, S>, metrics: MetricsClient, include_error_details: bool) -> Self {
        Self {
            service,
            metrics,
            include_error_details,
        }
    }

    /// ハンドラーの結果を HTTP レスポンスに変換し、応答時間を記録する
    pub fn respond(
        &self,
        handler_name: &str,
        request_id: &str,
        started: Instant,
        result: Result<ApiGatewayProxyResponse, AppError>,
    ) -> ApiGatewayProxyResponse {
        let response = match result {
            Ok(response) => response,
            Err(error) => {
                error.log(request_id);
                error_response(&error, request_id, self.include_error_details)
            }
        };

        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        info!(
            handler = handler_name,
            status_code = response.status_code,
            duration_ms = elapsed_ms,
            "レスポンスを返します"
        );
        self.metrics.record(&BusinessMetrics::api_response_time(
            handler_name,
            response.status_code,
            elapsed_ms,
        ));

        response
    }
}
