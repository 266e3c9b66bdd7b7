use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Start the workflow adding nodes to an existing cluster
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Asset directory for the workflow
    #[arg(long, env = "ASSET_DIR", default_value = ".")]
    dir: PathBuf,

    /// Kubeconfig of the target cluster
    #[arg(long, env = "KUBECONFIG")]
    kubeconfig: String,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    info!("Starting add-nodes...");

    node_joiner::run_add_nodes(&args.dir, &args.kubeconfig)?;

    info!("Add-nodes workflow started in {}", args.dir.display());
    Ok(())
}
