use crate::cancel_on_ctrl_c;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use redshift_provisioner::AwsClusterProvisioner;

/// Block until the cluster reports that it is available.
#[derive(Debug, Parser)]
pub(crate) struct Wait {}

impl Wait {
    pub(crate) async fn run(self, provisioner: AwsClusterProvisioner) -> Result<()> {
        let properties = provisioner
            .wait_until_available(&cancel_on_ctrl_c())
            .await
            .context(format!(
                "Cluster '{}' did not become available",
                provisioner.identifier()
            ))?;
        info!("Cluster '{}' is available", properties.identifier);
        Ok(())
    }
}
