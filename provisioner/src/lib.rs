/*!

`redshift-provisioner` creates an Amazon Redshift cluster and opens network access to it.

The [`ClusterProvisioner`] drives the workflow: it resolves the IAM role the cluster should
assume, requests the cluster, waits for it to become available and authorizes ingress on the
default security group of the cluster's VPC. It talks to AWS through three narrow traits in
[`clients`] so that each one can be replaced in tests.

!*/

pub mod aws;
pub mod clients;
pub mod config;
pub mod constants;
mod error;
pub mod model;
mod provisioner;
pub mod secrets;

pub use aws::{aws_config, AwsClusterProvisioner, AwsSettings};
pub use error::{Error, Result};
pub use provisioner::{ClusterProvisioner, CreateOutcome, IngressOutcome, WaitPolicy};
pub use tokio_util::sync::CancellationToken;

/// Print a value using `serde_json` `to_string_pretty` for types that implement Serialize.
pub fn json_display<T: serde::Serialize>(object: T) -> String {
    serde_json::to_string_pretty(&object).unwrap_or_else(|e| format!("Serialization failed: {}", e))
}
