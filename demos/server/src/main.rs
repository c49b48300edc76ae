use chart_server_rs::{Server, transport::ByteTransport};
use chart_tools_rs::QuickChartRouter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Logs go to stderr; stdout carries the JSON-RPC stream.
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("info,{}=debug", env!("CARGO_CRATE_NAME")).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let router = match QuickChartRouter::new() {
        Ok(router) => router,
        Err(e) => {
            tracing::error!(error = %e, "failed to build QuickChart router");
            std::process::exit(1);
        }
    };

    let server = Server::new(Box::new(router));
    if let Err(e) = server.run(ByteTransport::stdio()).await {
        tracing::error!(error = %e, "server run error");
        std::process::exit(1);
    }
}
