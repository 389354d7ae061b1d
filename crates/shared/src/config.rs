use std::env;
use std::time::Duration;
use thiserror::Error;

/// 署名付き URL の既定の有効期間（秒）
pub const DEFAULT_SIGNED_URL_EXPIRATION_SECS: u64 = 300;

/// SigV4 署名付き URL で許容される最大有効期間（7日）
pub const MAX_SIGNED_URL_EXPIRATION_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} 環境変数が設定されていません")]
    MissingVariable(&'static str),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub todos_table: String,
    pub attachment_bucket: String,
    pub signed_url_expiration: Duration,
    pub environment: String,
    pub aws_region: String,
    /// DynamoDB Local などのエンドポイント上書き
    pub dynamodb_endpoint: Option<String>,
    /// MinIO などのエンドポイント上書き
    pub s3_endpoint: Option<String>,
    pub metrics_enabled: bool,
    pub metrics_namespace: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 任意のキー参照関数から設定を組み立てる
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVariable(key))
        };

        Ok(Config {
            todos_table: required("TODOS_TABLE")?,
            attachment_bucket: required("ATTACHMENT_S3_BUCKET")?,
            signed_url_expiration: parse_signed_url_expiration(
                lookup("SIGNED_URL_EXPIRATION").as_deref(),
            ),
            environment: lookup("ENVIRONMENT").unwrap_or_else(|| "dev".to_string()),
            aws_region: lookup("AWS_REGION").unwrap_or_else(|| "ap-northeast-1".to_string()),
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT").filter(|v| !v.is_empty()),
            s3_endpoint: lookup("S3_ENDPOINT").filter(|v| !v.is_empty()),
            metrics_enabled: lookup("METRICS_ENABLED")
                .map(|v| matches!(v.trim().to_ascii_lowercase().as_str(), "true" | "1"))
                .unwrap_or(false),
            metrics_namespace: lookup("METRICS_NAMESPACE")
                .unwrap_or_else(|| "TodoApp".to_string()),
        })
    }
}

/// 未設定・数値以外・0・上限超過はすべて既定値（300秒）として扱う
pub fn parse_signed_url_expiration(raw: Option<&str>) -> Duration {
    let secs = raw
        .and_then(|v| v.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0 && secs <= MAX_SIGNED_URL_EXPIRATION_SECS)
        .unwrap_or(DEFAULT_SIGNED_URL_EXPIRATION_SECS);
    Duration::from_secs(secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_required_variables() {
        let result = Config::from_lookup(lookup_from(&[("ATTACHMENT_S3_BUCKET", "b")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingVariable("TODOS_TABLE")
        );

        let result = Config::from_lookup(lookup_from(&[("TODOS_TABLE", "t")]));
        assert_eq!(
            result.unwrap_err(),
            ConfigError::MissingVariable("ATTACHMENT_S3_BUCKET")
        );

        let result = Config::from_lookup(lookup_from(&[
            ("TODOS_TABLE", "  "),
            ("ATTACHMENT_S3_BUCKET", "b"),
        ]));
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&[
            ("TODOS_TABLE", "Todos-dev"),
            ("ATTACHMENT_S3_BUCKET", "todo-attachments-dev"),
        ]))
        .unwrap();

        assert_eq!(config.todos_table, "Todos-dev");
        assert_eq!(config.attachment_bucket, "todo-attachments-dev");
        assert_eq!(config.signed_url_expiration, Duration::from_secs(300));
        assert_eq!(config.environment, "dev");
        assert_eq!(config.aws_region, "ap-northeast-1");
        assert!(config.dynamodb_endpoint.is_none());
        assert!(config.s3_endpoint.is_none());
        assert!(!config.metrics_enabled);
        assert_eq!(config.metrics_namespace, "TodoApp");
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_lookup(lookup_from(&[
            ("TODOS_TABLE", "t"),
            ("ATTACHMENT_S3_BUCKET", "b"),
            ("SIGNED_URL_EXPIRATION", "60"),
            ("DYNAMODB_ENDPOINT", "http://localhost:8000"),
            ("METRICS_ENABLED", "TRUE"),
        ]))
        .unwrap();

        assert_eq!(config.signed_url_expiration, Duration::from_secs(60));
        assert_eq!(
            config.dynamodb_endpoint.as_deref(),
            Some("http://localhost:8000")
        );
        assert!(config.metrics_enabled);
    }

    #[test]
    fn test_signed_url_expiration_fallback() {
        let default = Duration::from_secs(DEFAULT_SIGNED_URL_EXPIRATION_SECS);
        assert_eq!(parse_signed_url_expiration(None), default);
        assert_eq!(parse_signed_url_expiration(Some("abc")), default);
        assert_eq!(parse_signed_url_expiration(Some("0")), default);
        assert_eq!(parse_signed_url_expiration(Some("-5")), default);
        assert_eq!(parse_signed_url_expiration(Some("604801")), default);
        assert_eq!(
            parse_signed_url_expiration(Some(" 900 ")),
            Duration::from_secs(900)
        );
    }
}
