use crate::dynamodb::load_sdk_config;
use async_trait::async_trait;
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::Client;
use chrono::{DateTime, Utc};
use domain::{TodoError, TodoId};
use shared::Config;
use std::time::Duration;
use tracing::{debug, error, info};

/// 発行したアップロード用 URL
#[derive(Debug, Clone, PartialEq)]
pub struct UploadUrl {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

/// 添付ファイルの保存先
#[async_trait]
pub trait AttachmentStorage: Send + Sync {
    /// `todo_id` をキーとする単一 PUT を許可する署名付き URL を発行
    async fn upload_url(&self, todo_id: &TodoId) -> Result<UploadUrl, TodoError>;

    /// オブジェクトの恒久的な（署名なし）URL
    fn object_url(&self, todo_id: &TodoId) -> String;
}

/// S3 バケットに添付ファイルを置くストレージ
#[derive(Clone, Debug)]
pub struct S3AttachmentStorage {
    client: Client,
    bucket: String,
    expiration: Duration,
    /// オブジェクト URL の接頭辞（末尾の `/` なし）
    object_base_url: String,
}

impl S3AttachmentStorage {
    pub async fn new(config: &Config) -> Self {
        let sdk_config = load_sdk_config(config).await;
        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);

        if let Some(endpoint) = &config.s3_endpoint {
            debug!("S3 エンドポイントを上書きします: {}", endpoint);
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        let storage = Self::from_client(
            Client::from_conf(builder.build()),
            config.attachment_bucket.clone(),
            config.signed_url_expiration,
        );
        match &config.s3_endpoint {
            Some(endpoint) => storage.with_endpoint(endpoint),
            None => storage,
        }
    }

    pub fn from_client(client: Client, bucket: impl Into<String>, expiration: Duration) -> Self {
        let bucket = bucket.into();
        Self {
            client,
            object_base_url: format!("https://{bucket}.s3.amazonaws.com"),
            bucket,
            expiration,
        }
    }

    /// エンドポイント上書き時のオブジェクト URL（パス形式 `{endpoint}/{bucket}/{key}`）
    pub fn with_endpoint(mut self, endpoint: &str) -> Self {
        self.object_base_url = format!("{}/{}", endpoint.trim_end_matches('/'), self.bucket);
        self
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }
}

#[async_trait]
impl AttachmentStorage for S3AttachmentStorage {
    async fn upload_url(&self, todo_id: &TodoId) -> Result<UploadUrl, TodoError> {
        info!(
            "署名付きアップロード URL を発行中: bucket={}, key={}, expires_in={}s",
            self.bucket,
            todo_id,
            self.expiration.as_secs()
        );

        let presigning = PresigningConfig::expires_in(self.expiration).map_err(|e| {
            error!("署名付き URL の有効期間が不正です: {}", e);
            TodoError::Storage(format!("有効期間が不正です: {e}"))
        })?;

        let issued_at = Utc::now();
        let presigned = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(todo_id.as_str())
            .presigned(presigning)
            .await
            .map_err(|e| {
                error!("署名付き URL の発行に失敗しました: {}", DisplayErrorContext(&e));
                TodoError::Storage(format!(
                    "署名付き URL の発行に失敗しました: {}",
                    DisplayErrorContext(&e)
                ))
            })?;

        Ok(UploadUrl {
            url: presigned.uri().to_string(),
            expires_at: issued_at + chrono::Duration::seconds(self.expiration.as_secs() as i64),
        })
    }

    fn object_url(&self, todo_id: &TodoId) -> String {
        format!("{}/{}", self.object_base_url, todo_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    fn offline_storage(expiration: Duration) -> S3AttachmentStorage {
        let conf = aws_sdk_s3::Config::builder()
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

        S3AttachmentStorage::from_client(
            Client::from_conf(conf),
            "todo-attachments-test",
            expiration,
        )
    }

    #[tokio::test]
    async fn test_upload_url_carries_expiry_and_key() {
        let storage = offline_storage(Duration::from_secs(300));
        let todo_id = TodoId::from_string("01ARZ3NDEKTSV4RRFFQ69G5FAV".to_string()).unwrap();

        let before = Utc::now();
        let upload = storage.upload_url(&todo_id).await.unwrap();

        assert!(upload.url.starts_with("https://"));
        assert!(upload.url.contains("todo-attachments-test"));
        assert!(upload.url.contains("/01ARZ3NDEKTSV4RRFFQ69G5FAV?"));
        assert!(upload.url.contains("X-Amz-Expires=300"));
        assert!(upload.url.contains("X-Amz-Signature="));
        assert!(upload.expires_at >= before + chrono::Duration::seconds(300));
    }

    #[tokio::test]
    async fn test_upload_url_uses_configured_expiry() {
        let storage = offline_storage(Duration::from_secs(900));
        let upload = storage.upload_url(&TodoId::new()).await.unwrap();

        assert!(upload.url.contains("X-Amz-Expires=900"));
    }

    #[test]
    fn test_object_url() {
        let storage = offline_storage(Duration::from_secs(300));
        let todo_id = TodoId::from_string("abc123".to_string()).unwrap();

        assert_eq!(storage.bucket(), "todo-attachments-test");
        assert_eq!(
            storage.object_url(&todo_id),
            "https://todo-attachments-test.s3.amazonaws.com/abc123"
        );
    }

    #[test]
    fn test_object_url_follows_endpoint_override() {
        let todo_id = TodoId::from_string("abc123".to_string()).unwrap();

        let storage =
            offline_storage(Duration::from_secs(300)).with_endpoint("http://localhost:4566");
        assert_eq!(
            storage.object_url(&todo_id),
            "http://localhost:4566/todo-attachments-test/abc123"
        );

        let storage =
            offline_storage(Duration::from_secs(300)).with_endpoint("http://localhost:4566/");
        assert_eq!(
            storage.object_url(&todo_id),
            "http://localhost:4566/todo-attachments-test/abc123"
        );
    }

    #[tokio::test]
    async fn test_new_uses_s3_endpoint_from_config() {
        let config = Config::from_lookup(|key| match key {
            "TODOS_TABLE" => Some("todos".to_string()),
            "ATTACHMENT_S3_BUCKET" => Some("attachments-local".to_string()),
            "S3_ENDPOINT" => Some("http://localhost:4566".to_string()),
            _ => None,
        })
        .unwrap();

        let storage = S3AttachmentStorage::new(&config).await;
        let todo_id = TodoId::from_string("abc123".to_string()).unwrap();
        assert_eq!(
            storage.object_url(&todo_id),
            "http://localhost:4566/attachments-local/abc123"
        );
    }
}
