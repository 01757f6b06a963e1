/*!

This module provides the clients that the [`ClusterProvisioner`](crate::ClusterProvisioner) uses
to talk to AWS.

Each capability the provisioner needs is a narrow trait so that fakes can be injected for testing.
In practice you will use [`IamRoleLookup`], [`Ec2NetworkAccess`] and [`RedshiftWarehouse`].

!*/

mod error;
mod implementation;

use crate::model::{
    ClusterProperties, CreateClusterRequest, IngressRule, RoleReference, SecurityGroup,
};
pub use error::{ClientError, ClientResult};
pub use implementation::{Ec2NetworkAccess, IamRoleLookup, RedshiftWarehouse};

/// `RoleLookup` resolves an IAM role name into the ARN(s) that get attached to a cluster.
#[async_trait::async_trait]
pub trait RoleLookup: Send + Sync {
    /// Resolve `role_name`, failing if no role can be found.
    async fn role_arns(&self, role_name: &str) -> ClientResult<RoleReference>;
}

/// `NetworkAccess` reads and changes the security groups of the VPC that hosts a cluster.
#[async_trait::async_trait]
pub trait NetworkAccess: Send + Sync {
    /// All security groups that belong to `vpc_id`, in the order the service returns them.
    async fn security_groups(&self, vpc_id: &str) -> ClientResult<Vec<SecurityGroup>>;

    /// Add `rule` to the ingress rules of `group`.
    async fn authorize_ingress(&self, group: &SecurityGroup, rule: &IngressRule)
        -> ClientResult<()>;
}

/// `WarehouseClient` sends requests to the Redshift control plane.
#[async_trait::async_trait]
pub trait WarehouseClient: Send + Sync {
    /// Request a new cluster. This returns as soon as the request is accepted.
    async fn create_cluster(&self, request: &CreateClusterRequest) -> ClientResult<()>;

    /// Describe the clusters matching `identifier`. An unknown identifier yields an empty list.
    async fn describe_clusters(&self, identifier: &str) -> ClientResult<Vec<ClusterProperties>>;
}
