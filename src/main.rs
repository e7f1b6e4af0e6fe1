use clap::Parser;
use tokio::io::BufReader;

mod api;
mod app;
mod args;
mod config;
mod download;
mod error;
mod manifest;
mod resource;
mod token;

use api::ReqwestTransport;
use app::{App, error_report};
use args::Args;
use config::Config;
use download::TokioProcessRunner;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "motionart=info".into()),
        )
        .with_target(false)
        .init();

    let args = Args::parse();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            eprintln!("Error: {error}");
            std::process::exit(1);
        }
    };

    let transport = ReqwestTransport::new();
    let runner = TokioProcessRunner;
    let app = App::new(config, &transport, &runner);

    let mut stdin = BufReader::new(tokio::io::stdin());
    if let Err(error) = app.run(&args, &mut stdin).await {
        eprintln!("{}", error_report(&error));
        std::process::exit(1);
    }
}
