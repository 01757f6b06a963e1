/*!

The YAML configuration file read by the command line interface.

```yaml
region: us-west-2
clusterIdentifier: sparkify
ingressPort: 5439
cluster:
  clusterType: multi-node
  nodeType: dc2.large
  numberOfNodes: 4
  dbName: dev
  masterUsername: awsuser
  masterUserPassword: Passw0rd
  iamRoleName: redshift-s3-read-only
```

!*/

use crate::aws::AwsSettings;
use crate::constants::DEFAULT_REDSHIFT_PORT;
use crate::error::{self, Result};
use crate::model::ClusterSpec;
use crate::provisioner::WaitPolicy;
use crate::secrets::AwsCredentials;
use serde::Deserialize;
use snafu::{OptionExt, ResultExt};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ProvisionerConfig {
    pub region: Option<String>,
    pub cluster_identifier: Option<String>,
    pub cluster: Option<ClusterSpec>,
    pub ingress_port: Option<i32>,
    #[serde(default)]
    pub wait: WaitConfig,
    /// A directory holding `access-key-id`, `secret-access-key` and optionally `session-token`.
    pub aws_secret_dir: Option<PathBuf>,
    pub assume_role: Option<String>,
    pub assume_role_session_duration: Option<u64>,
    pub max_attempts: Option<u32>,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct WaitConfig {
    pub poll_interval_seconds: Option<u64>,
    pub timeout_seconds: Option<u64>,
}

impl From<WaitConfig> for WaitPolicy {
    fn from(config: WaitConfig) -> Self {
        let default = WaitPolicy::default();
        WaitPolicy {
            poll_interval: config
                .poll_interval_seconds
                .map(Duration::from_secs)
                .unwrap_or(default.poll_interval),
            timeout: config
                .timeout_seconds
                .map(Duration::from_secs)
                .unwrap_or(default.timeout),
        }
    }
}

impl ProvisionerConfig {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let s = fs::read_to_string(path).context(error::ReadFileSnafu { path })?;
        Self::from_yaml(&s).context(error::ParseConfigSnafu { path })
    }

    pub fn from_yaml(s: &str) -> std::result::Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(s)
    }

    pub fn cluster_identifier(&self) -> Result<&str> {
        self.cluster_identifier
            .as_deref()
            .context(error::MissingSettingSnafu {
                what: "clusterIdentifier",
            })
    }

    pub fn cluster_spec(&self) -> Result<&ClusterSpec> {
        self.cluster
            .as_ref()
            .context(error::MissingSettingSnafu { what: "cluster" })
    }

    pub fn ingress_port(&self) -> i32 {
        self.ingress_port.unwrap_or(DEFAULT_REDSHIFT_PORT)
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait.into()
    }

    /// Build the settings for the AWS SDK, reading credentials from `awsSecretDir` if it is set.
    pub fn aws_settings(&self) -> Result<AwsSettings> {
        let credentials = match &self.aws_secret_dir {
            Some(dir) => Some(AwsCredentials::from_secret_dir(dir)?),
            None => None,
        };
        Ok(AwsSettings {
            credentials,
            assume_role: self.assume_role.clone(),
            assume_role_session_duration: self.assume_role_session_duration,
            region: self.region.clone(),
            max_attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod test {
    use super::ProvisionerConfig;
    use crate::constants::{DEFAULT_AVAILABILITY_TIMEOUT, DEFAULT_REDSHIFT_PORT};
    use crate::model::{ClusterType, MasterPassword};
    use std::path::PathBuf;
    use std::time::Duration;

    fn samples_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("samples")
    }

    // The sample configuration files must deserialize.
    #[test]
    fn multi_node_sample() {
        let config = ProvisionerConfig::from_path(samples_dir().join("cluster.yaml")).unwrap();
        assert_eq!(config.cluster_identifier().unwrap(), "sparkify-dwh");
        assert_eq!(config.region.as_deref(), Some("us-west-2"));
        assert_eq!(config.ingress_port(), DEFAULT_REDSHIFT_PORT);
        let spec = config.cluster_spec().unwrap();
        assert_eq!(spec.cluster_type, ClusterType::MultiNode);
        assert_eq!(spec.number_of_nodes, 4);
        assert_eq!(spec.master_user_password, MasterPassword::new("Passw0rd"));
        assert_eq!(config.wait_policy().poll_interval, Duration::from_secs(30));
        assert_eq!(config.wait_policy().timeout, DEFAULT_AVAILABILITY_TIMEOUT);
    }

    #[test]
    fn single_node_sample() {
        let config =
            ProvisionerConfig::from_path(samples_dir().join("single-node.yaml")).unwrap();
        let spec = config.cluster_spec().unwrap();
        assert_eq!(spec.cluster_type, ClusterType::SingleNode);
        assert_eq!(config.ingress_port(), 5440);
        assert_eq!(config.assume_role.as_deref(), Some("arn:aws:iam::123456789012:role/provisioner"));
    }

    #[test]
    fn missing_settings() {
        let config = ProvisionerConfig::from_yaml("region: eu-west-1").unwrap();
        assert!(config.cluster_identifier().is_err());
        assert!(config.cluster_spec().is_err());
    }

    #[test]
    fn negative_session_duration_is_rejected() {
        assert!(ProvisionerConfig::from_yaml("assumeRoleSessionDuration: -1").is_err());
        let config = ProvisionerConfig::from_yaml("assumeRoleSessionDuration: 900").unwrap();
        assert_eq!(
            config.aws_settings().unwrap().assume_role_session_duration,
            Some(900)
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(ProvisionerConfig::from_yaml("clusterIdentifer: typo").is_err());
    }
}
