use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::config::Region;
use aws_sdk_dynamodb::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_dynamodb::Client;
use domain::TodoError;
use shared::Config;
use std::error::Error as StdError;
use std::fmt::Debug;
use tracing::{debug, warn};

/// スロットリング・一時障害として 503 に振り分けるエラーコード
const TRANSIENT_ERROR_CODES: &[&str] = &[
    "ThrottlingException",
    "ProvisionedThroughputExceededException",
    "RequestLimitExceeded",
    "InternalServerError",
    "ServiceUnavailable",
];

/// 共通の AWS SDK 設定を読み込む（リージョンは設定値を優先）
pub async fn load_sdk_config(config: &Config) -> aws_config::SdkConfig {
    aws_config::defaults(BehaviorVersion::latest())
        .region(Region::new(config.aws_region.clone()))
        .load()
        .await
}

/// ToDo テーブル用の DynamoDB クライアント
#[derive(Clone, Debug)]
pub struct DynamoDbClient {
    client: Client,
    table_name: String,
}

impl DynamoDbClient {
    pub async fn new(config: &Config) -> Self {
        let sdk_config = load_sdk_config(config).await;
        let mut builder = aws_sdk_dynamodb::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &config.dynamodb_endpoint {
            debug!("DynamoDB エンドポイントを上書きします: {}", endpoint);
            builder = builder.endpoint_url(endpoint);
        }

        Self {
            client: Client::from_conf(builder.build()),
            table_name: config.todos_table.clone(),
        }
    }

    /// 構築済みの SDK クライアントから作成
    pub fn from_client(client: Client, table_name: impl Into<String>) -> Self {
        Self {
            client,
            table_name: table_name.into(),
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// SDK エラーをドメインエラーに変換する
    pub fn convert_error<E, R>(&self, error: SdkError<E, R>, operation: &str) -> TodoError
    where
        E: ProvideErrorMetadata + StdError + Send + Sync + 'static,
        R: Debug + Send + Sync + 'static,
    {
        let code = error.code().map(str::to_string);
        let message = format!(
            "{operation} に失敗しました ({}): {}",
            self.table_name,
            DisplayErrorContext(&error)
        );

        match code.as_deref() {
            Some(code) if TRANSIENT_ERROR_CODES.contains(&code) => {
                warn!(operation, code, "DynamoDB が一時的に利用できません");
                TodoError::ServiceUnavailable(message)
            }
            _ => TodoError::DynamoDb(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_dynamodb::config::{BehaviorVersion, Credentials};
    use aws_sdk_dynamodb::error::ErrorMetadata;
    use aws_sdk_dynamodb::operation::query::QueryError;
    use aws_sdk_dynamodb::operation::update_item::UpdateItemError;

    fn offline_client() -> DynamoDbClient {
        let conf = aws_sdk_dynamodb::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("ap-northeast-1"))
            .credentials_provider(Credentials::new(
                "AKIDEXAMPLE",
                "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
                None,
                None,
                "static",
            ))
            .build();

        DynamoDbClient::from_client(Client::from_conf(conf), "todos-test")
    }

    fn update_error(code: &str) -> SdkError<UpdateItemError, ()> {
        let meta = ErrorMetadata::builder()
            .code(code)
            .message("simulated")
            .build();
        SdkError::service_error(UpdateItemError::generic(meta), ())
    }

    #[test]
    fn test_transient_codes_map_to_service_unavailable() {
        let db = offline_client();

        for code in TRANSIENT_ERROR_CODES {
            let error = db.convert_error(update_error(code), "UpdateItem");
            assert!(
                matches!(error, TodoError::ServiceUnavailable(_)),
                "{code} は 503 に振り分けられるべき: {error:?}"
            );
        }
    }

    #[test]
    fn test_throttled_query_maps_to_service_unavailable() {
        let db = offline_client();
        let meta = ErrorMetadata::builder()
            .code("ProvisionedThroughputExceededException")
            .build();
        let error = db.convert_error(
            SdkError::<QueryError, ()>::service_error(QueryError::generic(meta), ()),
            "Query",
        );

        match error {
            TodoError::ServiceUnavailable(message) => {
                assert!(message.contains("Query"));
                assert!(message.contains("todos-test"));
            }
            other => panic!("ServiceUnavailable を期待しました: {other:?}"),
        }
    }

    #[test]
    fn test_other_codes_map_to_dynamodb_error() {
        let db = offline_client();

        let error = db.convert_error(update_error("ValidationException"), "UpdateItem");
        assert!(matches!(error, TodoError::DynamoDb(_)));

        let error = db.convert_error(update_error("ResourceNotFoundException"), "UpdateItem");
        assert!(matches!(error, TodoError::DynamoDb(_)));
    }

    #[test]
    fn test_error_without_code_maps_to_dynamodb_error() {
        let db = offline_client();
        let error = db.convert_error(
            SdkError::<UpdateItemError, ()>::service_error(
                UpdateItemError::generic(ErrorMetadata::builder().build()),
                (),
            ),
            "UpdateItem",
        );

        assert!(matches!(error, TodoError::DynamoDb(_)));
    }
}
