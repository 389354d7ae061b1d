//! ビジネスメトリクス
//!
//! メトリクスは CloudWatch Embedded Metric Format (EMF) の JSON 1 行として標準出力に書き出す。
//! Lambda の標準出力は CloudWatch Logs に送られ、EMF の行はそのままメトリクスとして取り込まれる。

use chrono::Utc;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::io::{self, Write};
use tracing::{debug, warn};

/// すべてのメトリクスに付与するディメンション
const ENVIRONMENT_DIMENSION: &str = "Environment";

/// メトリクスの単位
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricUnit {
    Count,
    Milliseconds,
}

impl MetricUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricUnit::Count => "Count",
            MetricUnit::Milliseconds => "Milliseconds",
        }
    }
}

/// カスタムメトリクス定義
#[derive(Debug, Clone, PartialEq)]
pub struct CustomMetric {
    pub name: &'static str,
    pub value: f64,
    pub unit: MetricUnit,
    pub dimensions: BTreeMap<&'static str, String>,
}

impl CustomMetric {
    /// カウンターメトリクスを作成
    pub fn count(name: &'static str, value: f64) -> Self {
        Self {
            name,
            value,
            unit: MetricUnit::Count,
            dimensions: BTreeMap::new(),
        }
    }

    /// 時間メトリクス（ミリ秒）を作成
    pub fn duration_ms(name: &'static str, duration_ms: f64) -> Self {
        Self {
            name,
            value: duration_ms,
            unit: MetricUnit::Milliseconds,
            dimensions: BTreeMap::new(),
        }
    }

    pub fn with_dimension(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.dimensions.insert(key, value.into());
        self
    }
}

/// メトリクスをログに記録するクライアント
#[derive(Debug, Clone)]
pub struct MetricsClient {
    namespace: String,
    environment: String,
    enabled: bool,
}

impl MetricsClient {
    pub fn new(namespace: String, environment: String, enabled: bool) -> Self {
        Self {
            namespace,
            environment,
            enabled,
        }
    }

    /// 記録を行わないクライアント（テスト・ローカル実行用）
    pub fn disabled() -> Self {
        Self::new(String::new(), String::new(), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// EMF ドキュメントを組み立てる
    ///
    /// ディメンションの値とメトリクス値はトップレベルのキーとして置き、
    /// `_aws.CloudWatchMetrics` からキー名で参照する。
    pub fn to_emf(&self, metric: &CustomMetric) -> Value {
        let mut dimension_keys = vec![Value::from(ENVIRONMENT_DIMENSION)];
        dimension_keys.extend(metric.dimensions.keys().map(|key| Value::from(*key)));

        let mut document = Map::new();
        document.insert(
            "_aws".to_string(),
            json!({
                "Timestamp": Utc::now().timestamp_millis(),
                "CloudWatchMetrics": [{
                    "Namespace": self.namespace,
                    "Dimensions": [dimension_keys],
                    "Metrics": [{ "Name": metric.name, "Unit": metric.unit.as_str() }]
                }]
            }),
        );
        document.insert(
            ENVIRONMENT_DIMENSION.to_string(),
            Value::from(self.environment.as_str()),
        );
        for (key, value) in &metric.dimensions {
            document.insert(key.to_string(), Value::from(value.as_str()));
        }
        document.insert(metric.name.to_string(), json!(metric.value));

        Value::Object(document)
    }

    /// EMF ドキュメントを 1 行で書き出す
    pub fn write_to<W: Write>(&self, writer: &mut W, metric: &CustomMetric) -> io::Result<()> {
        let line = serde_json::to_string(&self.to_emf(metric))?;
        writeln!(writer, "{}", line)
    }

    /// メトリクスを記録
    pub fn record(&self, metric: &CustomMetric) {
        if !self.enabled {
            return;
        }

        let stdout = io::stdout();
        let mut handle = stdout.lock();
        match self.write_to(&mut handle, metric) {
            Ok(()) => debug!(metric_name = metric.name, "カスタムメトリクスを記録しました"),
            Err(e) => warn!(
                metric_name = metric.name,
                "カスタムメトリクスの書き出しに失敗しました: {}", e
            ),
        }
    }
}

/// ビジネスメトリクス
pub struct BusinessMetrics;

impl BusinessMetrics {
    fn operation(operation: &str) -> CustomMetric {
        CustomMetric::count("TodoOperations", 1.0).with_dimension("Operation", operation)
    }

    pub fn todos_listed(item_count: usize) -> CustomMetric {
        CustomMetric::count("TodosReturned", item_count as f64)
            .with_dimension("Operation", "ListTodos")
    }

    pub fn todo_created() -> CustomMetric {
        Self::operation("CreateTodo")
    }

    pub fn todo_updated() -> CustomMetric {
        Self::operation("UpdateTodo")
    }

    pub fn todo_deleted() -> CustomMetric {
        Self::operation("DeleteTodo")
    }

    pub fn attachment_url_issued() -> CustomMetric {
        Self::operation("GenerateUploadUrl")
    }

    /// API レスポンス時間
    pub fn api_response_time(handler: &str, status_code: i64, duration_ms: f64) -> CustomMetric {
        CustomMetric::duration_ms("ApiResponseTime", duration_ms)
            .with_dimension("Handler", handler)
            .with_dimension("StatusCode", status_code.to_string())
    }
}
