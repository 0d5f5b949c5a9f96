use std::net::SocketAddr;
use std::sync::Arc;

use clap::Parser;
use dotenv::dotenv;
use nutrilens_api::application::http::server::http_server;
use nutrilens_api::args::Args;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Arc::new(Args::parse());

    if args.log.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(args.log.log_filter.clone())
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(args.log.log_filter.clone())
            .init();
    }

    let state = http_server::state(args.clone())?;
    let app = http_server::router(state)?;

    let addr: SocketAddr = format!("{}:{}", args.server.host, args.server.port).parse()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
