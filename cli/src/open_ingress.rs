use anyhow::{Context, Result};
use clap::Parser;
use redshift_provisioner::config::ProvisionerConfig;
use redshift_provisioner::{AwsClusterProvisioner, IngressOutcome};

/// Allow TCP traffic from any IPv4 address on a port of the cluster's default security group.
#[derive(Debug, Parser)]
pub(crate) struct OpenIngress {
    /// The port to open. Defaults to `ingressPort` from the config file, or 5439.
    #[clap(long)]
    port: Option<i32>,
}

impl OpenIngress {
    pub(crate) async fn run(
        self,
        provisioner: AwsClusterProvisioner,
        config: &ProvisionerConfig,
    ) -> Result<()> {
        let port = self.port.unwrap_or_else(|| config.ingress_port());
        let outcome = provisioner
            .open_ingress(port)
            .await
            .context(format!("Unable to open port {}", port))?;
        match outcome {
            IngressOutcome::Authorized { group_id, rule } => {
                println!("Added rule '{}' to security group '{}'", rule, group_id)
            }
            IngressOutcome::AlreadyAuthorized { group_id, rule } => println!(
                "The rule '{}' already exists in security group '{}'",
                rule, group_id
            ),
        }
        Ok(())
    }
}
