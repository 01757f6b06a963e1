use crate::clients::ClientError;
use snafu::Snafu;
use std::path::PathBuf;
use std::string::FromUtf8Error;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Failed to create cluster '{}': {}", identifier, source))]
    CreateCluster {
        identifier: String,
        source: ClientError,
    },

    #[snafu(display("Failed to describe cluster '{}': {}", identifier, source))]
    DescribeCluster {
        identifier: String,
        source: ClientError,
    },

    #[snafu(display("No cluster named '{}' was found", identifier))]
    ClusterNotFound { identifier: String },

    #[snafu(display("Cluster '{}' is not in a VPC", identifier))]
    MissingVpc { identifier: String },

    #[snafu(display("Unable to resolve IAM role '{}': {}", role_name, source))]
    ResolveRole {
        role_name: String,
        source: ClientError,
    },

    #[snafu(display("Unable to list security groups of VPC '{}': {}", vpc_id, source))]
    SecurityGroups { vpc_id: String, source: ClientError },

    #[snafu(display("VPC '{}' has no security groups", vpc_id))]
    SecurityGroupNotFound { vpc_id: String },

    #[snafu(display(
        "Failed to authorize ingress on port {} for security group '{}': {}",
        port,
        group_id,
        source
    ))]
    AuthorizeIngress {
        group_id: String,
        port: i32,
        source: ClientError,
    },

    #[snafu(display(
        "Security group '{}' reported the rule '{}' as a duplicate, but the rule is not present",
        group_id,
        rule
    ))]
    IngressNotConfirmed { group_id: String, rule: String },

    #[snafu(display(
        "Timed out after {}s waiting for cluster '{}' to become available",
        timeout_secs,
        identifier
    ))]
    AvailabilityTimeout {
        identifier: String,
        timeout_secs: u64,
    },

    #[snafu(display("Stopped waiting for cluster '{}' to become available", identifier))]
    Cancelled { identifier: String },

    #[snafu(display("Could not convert '{}' secret to string: {}", what, source))]
    Conversion { what: String, source: FromUtf8Error },

    #[snafu(display("Unable to read '{}': {}", path.display(), source))]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[snafu(display("Unable to parse config file '{}': {}", path.display(), source))]
    ParseConfig {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[snafu(display("'{}' is missing from secret directory '{}'", what, directory.display()))]
    SecretMissing { what: String, directory: PathBuf },

    #[snafu(display("Missing required setting '{}'", what))]
    MissingSetting { what: String },
}

impl Error {
    /// The error code reported by the remote control plane, if this error came from a request
    /// that the control plane rejected.
    pub fn remote_code(&self) -> Option<&str> {
        self.client_error().and_then(ClientError::code)
    }

    /// The collaborator error that caused this error, if any.
    pub fn client_error(&self) -> Option<&ClientError> {
        match self {
            Error::CreateCluster { source, .. }
            | Error::DescribeCluster { source, .. }
            | Error::ResolveRole { source, .. }
            | Error::SecurityGroups { source, .. }
            | Error::AuthorizeIngress { source, .. } => Some(source),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
