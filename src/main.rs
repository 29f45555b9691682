use image_migrator::cli::{Args, Runner};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let runner = Runner::new(Args::parse_args());

    let code = match runner.run().await {
        Ok(status) => status.exit_code(),
        Err(e) => {
            runner.output().error(&e.to_string());
            1
        }
    };
    std::process::exit(code);
}
