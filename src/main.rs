//! weblingo 代理服务器入口

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use weblingo::edge::{EdgeOrchestrator, SettingsLoader};
use weblingo::env::{core, documented_variables, EnvVar};
use weblingo::web::{ServerConfig, WebServer};

#[derive(Parser)]
#[command(name = "weblingo")]
#[command(author, version, about = "Translating reverse proxy", long_about = None)]
#[command(after_help = environment_help())]
struct Cli {
    /// Bind address [env: WEBLINGO_BIND_ADDRESS, default: 127.0.0.1]
    #[arg(short, long)]
    bind: Option<String>,

    /// Port number [env: WEBLINGO_PORT, default: 8787]
    #[arg(short, long)]
    port: Option<u16>,

    /// Settings file [env: WEBLINGO_CONFIG]
    #[arg(short, long)]
    config: Option<String>,
}

fn environment_help() -> String {
    let mut help = String::from("ENVIRONMENT:\n");
    for (name, description) in documented_variables() {
        help.push_str(&format!("    {:<24} {}\n", name, description));
    }
    help
}

fn init_logging() {
    let level = core::LogLevel::get_or_default("info".to_string());
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("weblingo={},tower_http={}", level, level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_ansi(!core::NoColor::get_or_default(false)))
        .init();
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let server_config = ServerConfig::from_env()?.with_overrides(cli.bind, cli.port, cli.config);

    let (settings, _) = SettingsLoader::new()
        .with_path(server_config.settings_path.clone())
        .load()?;
    let orchestrator = EdgeOrchestrator::from_settings(&settings)?;

    WebServer::new(server_config, orchestrator).start().await?;
    Ok(())
}
