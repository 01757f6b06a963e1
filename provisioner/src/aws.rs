use crate::clients::{Ec2NetworkAccess, IamRoleLookup, RedshiftWarehouse};
use crate::constants::{
    ASSUME_ROLE_SESSION_NAME, DEFAULT_ASSUME_ROLE_SESSION_DURATION, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_REGION,
};
use crate::model::ClusterIdentifier;
use crate::provisioner::ClusterProvisioner;
use crate::secrets::AwsCredentials;
use aws_config::default_provider::credentials::default_provider;
use aws_config::sts::AssumeRoleProvider;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use aws_smithy_types::retry::RetryConfig;
use aws_types::region::Region;
use aws_types::SdkConfig;
use log::info;
use std::time::Duration;

/// A [`ClusterProvisioner`] that talks to AWS.
pub type AwsClusterProvisioner =
    ClusterProvisioner<IamRoleLookup, Ec2NetworkAccess, RedshiftWarehouse>;

/// Everything needed to build an [`SdkConfig`].
#[derive(Clone, Debug, Default)]
pub struct AwsSettings {
    /// Static credentials. The default provider chain is used when this is `None`.
    pub credentials: Option<AwsCredentials>,
    /// A role to assume on top of the base credentials.
    pub assume_role: Option<String>,
    pub assume_role_session_duration: Option<u64>,
    pub region: Option<String>,
    /// How many times the SDK may attempt each request.
    pub max_attempts: Option<u32>,
}

/// Set up the config for aws calls using static credentials if provided and `sts::assume_role`
/// if a role arn is provided.
pub async fn aws_config(settings: &AwsSettings) -> SdkConfig {
    let region = settings
        .region
        .clone()
        .unwrap_or_else(|| DEFAULT_REGION.to_string());
    info!(
        "Creating a custom region provider for '{}' to be used in the aws config.",
        region
    );

    let config_loader = aws_config::from_env().retry_config(
        RetryConfig::standard()
            .with_max_attempts(settings.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)),
    );

    let base_provider = match &settings.credentials {
        Some(credentials) => SharedCredentialsProvider::new(Credentials::new(
            credentials.access_key_id.clone(),
            credentials.secret_access_key.clone(),
            credentials.session_token.clone(),
            None,
            "redshift_provisioner",
        )),
        None => SharedCredentialsProvider::new(default_provider().await),
    };

    let credentials_provider = match &settings.assume_role {
        Some(role_arn) => {
            info!("Assuming role '{}'", role_arn);
            SharedCredentialsProvider::new(
                AssumeRoleProvider::builder(role_arn)
                    .region(Region::new(region.clone()))
                    .session_name(ASSUME_ROLE_SESSION_NAME)
                    .session_length(Duration::from_secs(
                        settings
                            .assume_role_session_duration
                            .unwrap_or(DEFAULT_ASSUME_ROLE_SESSION_DURATION),
                    ))
                    .build(base_provider),
            )
        }
        None => base_provider,
    };

    config_loader
        .credentials_provider(credentials_provider)
        .region(Region::new(region))
        .load()
        .await
}

impl AwsClusterProvisioner {
    /// Create a provisioner whose collaborators share `config`.
    pub fn from_sdk_config<I>(identifier: I, config: &SdkConfig) -> Self
    where
        I: Into<ClusterIdentifier>,
    {
        ClusterProvisioner::new(
            identifier,
            IamRoleLookup::new(config),
            Ec2NetworkAccess::new(config),
            RedshiftWarehouse::new(config),
        )
    }
}
