use anyhow::Context;

use pantry_api::ApiConfig;
use pantry_infra::InfraConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    pantry_observability::init();

    let api = ApiConfig::from_env();
    let infra = InfraConfig::from_env();

    let app = pantry_api::app::build_app(&infra).await?;

    let listener = tokio::net::TcpListener::bind(&api.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", api.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
