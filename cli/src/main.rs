/*!

This is the command line interface for creating a Redshift cluster and opening access to it.

!*/

mod create;
mod describe;
mod open_ingress;
mod wait;

use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Builder;
use log::LevelFilter;
use redshift_provisioner::config::ProvisionerConfig;
use redshift_provisioner::{aws_config, AwsClusterProvisioner, CancellationToken};
use std::path::PathBuf;

/// The command line interface for provisioning a Redshift cluster.
#[derive(Debug, Parser)]
#[clap(author, version, about)]
struct Args {
    /// Set logging verbosity [trace|debug|info|warn|error]. If the environment variable `RUST_LOG`
    /// is present, it overrides the default logging behavior. See https://docs.rs/env_logger/latest
    #[clap(long = "log-level", default_value = "info")]
    log_level: LevelFilter,
    /// Path to a YAML configuration file. Flags take precedence over its values.
    #[clap(long = "config")]
    config: Option<PathBuf>,
    /// The AWS region of the cluster.
    #[clap(long = "region")]
    region: Option<String>,
    /// The identifier of the cluster.
    #[clap(long = "cluster-identifier")]
    cluster_identifier: Option<String>,
    /// A directory containing `access-key-id`, `secret-access-key` and optionally
    /// `session-token` files. The default AWS credentials chain is used otherwise.
    #[clap(long = "aws-secret-dir")]
    aws_secret_dir: Option<PathBuf>,
    /// The ARN of a role to assume.
    #[clap(long = "assume-role")]
    assume_role: Option<String>,
    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Parser)]
enum Command {
    /// Create the cluster and wait for it to become available.
    Create(create::Create),
    /// Print the current properties of the cluster.
    Describe(describe::Describe),
    /// Allow TCP traffic to the cluster's VPC on a port.
    OpenIngress(open_ingress::OpenIngress),
    /// Wait for the cluster to become available.
    Wait(wait::Wait),
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_logger(args.log_level);
    if let Err(e) = run(args).await {
        eprintln!("{:?}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<()> {
    let config = load_config(&args)?;
    let identifier = config
        .cluster_identifier()
        .context("A cluster identifier is required, use '--cluster-identifier'")?;
    let aws_settings = config
        .aws_settings()
        .context("Unable to set up AWS credentials")?;
    let sdk_config = aws_config(&aws_settings).await;
    let provisioner = AwsClusterProvisioner::from_sdk_config(identifier, &sdk_config)
        .with_wait_policy(config.wait_policy());

    match args.command {
        Command::Create(create) => create.run(provisioner, &config).await,
        Command::Describe(describe) => describe.run(provisioner).await,
        Command::OpenIngress(open_ingress) => open_ingress.run(provisioner, &config).await,
        Command::Wait(wait) => wait.run(provisioner).await,
    }
}

/// Read the configuration file, if any, and apply the global flags on top of it.
fn load_config(args: &Args) -> Result<ProvisionerConfig> {
    let mut config = match &args.config {
        Some(path) => ProvisionerConfig::from_path(path)
            .context(format!("Unable to load config from '{}'", path.display()))?,
        None => ProvisionerConfig::default(),
    };
    if let Some(region) = &args.region {
        config.region = Some(region.clone());
    }
    if let Some(identifier) = &args.cluster_identifier {
        config.cluster_identifier = Some(identifier.clone());
    }
    if let Some(dir) = &args.aws_secret_dir {
        config.aws_secret_dir = Some(dir.clone());
    }
    if let Some(role) = &args.assume_role {
        config.assume_role = Some(role.clone());
    }
    Ok(config)
}

/// A token that is cancelled when the process receives Ctrl-C.
pub(crate) fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let child = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            log::warn!("Received Ctrl-C, no longer waiting");
            child.cancel();
        }
    });
    token
}

/// Initialize the logger with the value passed by `--log-level` (or its default) when the
/// `RUST_LOG` environment variable is not present. If present, the `RUST_LOG` environment variable
/// overrides `--log-level`/`level`.
fn init_logger(level: LevelFilter) {
    match std::env::var(env_logger::DEFAULT_FILTER_ENV).ok() {
        Some(_) => {
            // RUST_LOG exists; env_logger will use it.
            Builder::from_default_env().init();
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate and the library.
            Builder::new()
                .filter(Some(env!("CARGO_CRATE_NAME")), level)
                .filter(Some("redshift_provisioner"), level)
                .init();
        }
    }
}
