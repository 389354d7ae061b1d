use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// 既定のログレベル（RUST_LOG 未設定時）
const DEFAULT_LOG_FILTER: &str = "info";

/// JSON 形式の構造化ログを CloudWatch Logs に出力するサブスクライバーを初期化
pub fn init_tracing() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_target(false)
                .with_current_span(true)
                .with_span_list(false)
                .without_time(),
        )
        .with(filter)
        .try_init()?;

    Ok(())
}
