use crate::cancel_on_ctrl_c;
use anyhow::{bail, Context, Result};
use clap::Parser;
use redshift_provisioner::config::ProvisionerConfig;
use redshift_provisioner::model::{ClusterSpec, ClusterType, MasterPassword};
use redshift_provisioner::{json_display, AwsClusterProvisioner, CreateOutcome};

/// Create the cluster and wait for it to become available. Values missing from the flags are
/// taken from the `cluster` section of the config file.
#[derive(Debug, Parser)]
pub(crate) struct Create {
    /// `single-node` or `multi-node`.
    #[clap(long)]
    cluster_type: Option<ClusterType>,

    /// The node type, e.g. `dc2.large`.
    #[clap(long)]
    node_type: Option<String>,

    /// The number of compute nodes. Required for `multi-node` clusters, ignored for `single-node`
    /// clusters.
    #[clap(long)]
    number_of_nodes: Option<i32>,

    /// The name of the first database.
    #[clap(long)]
    db_name: Option<String>,

    #[clap(long)]
    master_username: Option<String>,

    /// The master user password. Prefer the config file so that it does not end up in your shell
    /// history.
    #[clap(long, env = "REDSHIFT_MASTER_USER_PASSWORD", hide_env_values = true)]
    master_user_password: Option<String>,

    /// The IAM role the cluster assumes to read from S3. A name ending in `/` attaches every role
    /// under that path.
    #[clap(long)]
    iam_role_name: Option<String>,
}

impl Create {
    pub(crate) async fn run(
        self,
        provisioner: AwsClusterProvisioner,
        config: &ProvisionerConfig,
    ) -> Result<()> {
        let spec = self.cluster_spec(config.cluster.as_ref())?;
        let outcome = provisioner
            .create_with_cancellation(&spec, &cancel_on_ctrl_c())
            .await
            .context(format!(
                "Unable to create cluster '{}'",
                provisioner.identifier()
            ))?;
        if let CreateOutcome::AlreadyExists(_) = &outcome {
            println!(
                "Cluster '{}' already exists. Keep working or create a new cluster.",
                provisioner.identifier()
            );
        }
        println!("{}", json_display(outcome.properties()));
        Ok(())
    }

    fn cluster_spec(self, base: Option<&ClusterSpec>) -> Result<ClusterSpec> {
        let missing = |flag: &str| format!("'--{}' is required without a config file", flag);
        let cluster_type = self
            .cluster_type
            .or_else(|| base.map(|b| b.cluster_type))
            .unwrap_or_default();
        let number_of_nodes = match self
            .number_of_nodes
            .or_else(|| base.map(|b| b.number_of_nodes))
        {
            Some(number_of_nodes) => number_of_nodes,
            None if cluster_type == ClusterType::SingleNode => 1,
            None => bail!(
                "'--number-of-nodes' is required for a {} cluster without a config file",
                cluster_type
            ),
        };
        Ok(ClusterSpec {
            cluster_type,
            node_type: self
                .node_type
                .or_else(|| base.map(|b| b.node_type.clone()))
                .with_context(|| missing("node-type"))?,
            number_of_nodes,
            db_name: self
                .db_name
                .or_else(|| base.map(|b| b.db_name.clone()))
                .with_context(|| missing("db-name"))?,
            master_username: self
                .master_username
                .or_else(|| base.map(|b| b.master_username.clone()))
                .with_context(|| missing("master-username"))?,
            master_user_password: self
                .master_user_password
                .map(MasterPassword::new)
                .or_else(|| base.map(|b| b.master_user_password.clone()))
                .with_context(|| missing("master-user-password"))?,
            iam_role_name: self
                .iam_role_name
                .or_else(|| base.map(|b| b.iam_role_name.clone()))
                .with_context(|| missing("iam-role-name"))?,
        })
    }
}
