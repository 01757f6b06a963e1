use anyhow::{Context, Result};
use clap::Parser;
use redshift_provisioner::{json_display, AwsClusterProvisioner};

/// Print the live properties of the cluster as JSON.
#[derive(Debug, Parser)]
pub(crate) struct Describe {
    /// Print only the cluster status.
    #[clap(long)]
    status: bool,
}

impl Describe {
    pub(crate) async fn run(self, provisioner: AwsClusterProvisioner) -> Result<()> {
        let properties = provisioner.cluster_properties().await.context(format!(
            "Unable to describe cluster '{}'",
            provisioner.identifier()
        ))?;
        if self.status {
            println!("{}", properties.status);
        } else {
            println!("{}", json_display(&properties));
        }
        Ok(())
    }
}
