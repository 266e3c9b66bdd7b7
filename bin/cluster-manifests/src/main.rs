use anyhow::{Context, Result};
use clap::Parser;
use installer_core::topology::SynthesisOptions;
use installer_core::{config, synthesize_with_options, ClusterId, StaticMetadata};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Generate the Cluster API manifests of an AWS cluster
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// install-config.yaml to generate from
    #[arg(long, env = "INSTALL_CONFIG")]
    install_config: PathBuf,

    /// Infrastructure id naming every cluster resource
    #[arg(long, env = "INFRA_ID")]
    infra_id: String,

    /// YAML file with the account's availability zones and subnets
    #[arg(long, env = "AWS_FACTS")]
    facts: PathBuf,

    /// Directory the manifests are written to
    #[arg(long, env = "ASSET_DIR", default_value = "cluster-api")]
    dir: PathBuf,

    /// Do not duplicate the public API ingress rule onto the internal load balancer
    #[arg(long)]
    no_primary_api_ingress: bool,

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

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.log_json);

    info!("Starting cluster-manifests...");

    let install_config = config::load(&args.install_config)
        .with_context(|| format!("loading {}", args.install_config.display()))?;
    let (region, declared_subnets) = install_config
        .aws()
        .map(|aws| (aws.region.clone(), aws.subnets.clone()))
        .unwrap_or_default();

    let metadata = StaticMetadata::from_file(&args.facts, region, declared_subnets)
        .with_context(|| format!("loading {}", args.facts.display()))?;
    let cluster_id = ClusterId::new(args.infra_id)?;
    let options = SynthesisOptions {
        duplicate_api_ingress_on_primary: !args.no_primary_api_ingress,
    };

    let assets = synthesize_with_options(&install_config, &cluster_id, &metadata, &options)
        .await
        .context("generating cluster manifests")?;

    for path in assets.manifests.write_to(&args.dir)? {
        info!("Wrote {}", path.display());
    }

    let reference = &assets.infrastructure_ref;
    info!(
        "Infrastructure reference: {}/{} {}/{}",
        reference.api_version.as_deref().unwrap_or_default(),
        reference.kind.as_deref().unwrap_or_default(),
        reference.namespace.as_deref().unwrap_or_default(),
        reference.name.as_deref().unwrap_or_default()
    );

    Ok(())
}
