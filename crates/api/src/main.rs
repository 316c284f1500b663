use anyhow::Context;

use postapi_infra::ServerConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    postapi_observability::init();

    let server = ServerConfig::from_env().context("invalid server configuration")?;
    let store = postapi_api::app::services::build_store(&server).await?;
    let app = postapi_api::app::build_app(store);

    let listener = tokio::net::TcpListener::bind(server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", server.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
