use anyhow::Context as _;
use aws_lambda_events::event::apigw::ApiGatewayProxyRequest;
use http_handlers::handlers::{create_todo, dispatch};
use http_handlers::LambdaState;
use lambda_runtime::{run, service_fn, Error, LambdaEvent};
use shared::{init_tracing, Config};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Error> {
    init_tracing()?;
    info!("ToDo 作成 Lambda を起動します");

    let config = Config::from_env().context("設定の読み込みに失敗しました")?;
    let state = LambdaState::from_config(&config).await;
    let state = &state;

    run(service_fn(
        move |event: LambdaEvent<ApiGatewayProxyRequest>| async move {
            dispatch(state, create_todo::HANDLER_NAME, event, create_todo::handle).await
        },
    ))
    .await
}
