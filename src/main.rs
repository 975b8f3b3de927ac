use briefing_gateway::frontend::context::FrontendContext;
use briefing_gateway::frontend::start_all;
use briefing_gateway::logging;
use briefing_gateway::shared::config::load_settings;
use clap::Parser;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "briefing_gateway", about = "Read-only briefing endpoint")]
struct Args {
    /// Settings file (defaults to $BRIEFING_CONFIG, then `config`)
    #[arg(long, short)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    let settings = load_settings(args.config.as_deref())?;
    let _log_guard = logging::init(&settings.logging)?;

    info!(target: "briefing::main", "Briefing gateway is starting...");
    let ctx = FrontendContext::from_settings(settings)?;
    start_all(ctx).await
}
