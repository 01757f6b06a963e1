use crate::clients::{NetworkAccess, RoleLookup, WarehouseClient};
use crate::constants::{
    CLUSTER_ALREADY_EXISTS, DEFAULT_AVAILABILITY_TIMEOUT, DEFAULT_POLL_INTERVAL,
    DEFAULT_SECURITY_GROUP_NAME, DUPLICATE_PERMISSION,
};
use crate::error::{self, Result};
use crate::model::{
    ClusterIdentifier, ClusterProperties, ClusterSpec, CreateClusterRequest, IngressRule,
    SecurityGroup,
};
use log::{debug, info, trace};
use snafu::{OptionExt, ResultExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How often to check the cluster status, and for how long, while waiting for it to become
/// available.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct WaitPolicy {
    pub poll_interval: Duration,
    pub timeout: Duration,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            timeout: DEFAULT_AVAILABILITY_TIMEOUT,
        }
    }
}

/// The result of [`ClusterProvisioner::create`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CreateOutcome {
    /// The cluster was created and is now available.
    Created(ClusterProperties),
    /// A cluster with the same identifier already existed. It is available, but it may not match
    /// the requested spec.
    AlreadyExists(ClusterProperties),
}

impl CreateOutcome {
    pub fn properties(&self) -> &ClusterProperties {
        match self {
            CreateOutcome::Created(p) | CreateOutcome::AlreadyExists(p) => p,
        }
    }
}

/// The result of [`ClusterProvisioner::open_ingress`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum IngressOutcome {
    /// The rule was added to the security group.
    Authorized { group_id: String, rule: IngressRule },
    /// The security group already held the rule.
    AlreadyAuthorized { group_id: String, rule: IngressRule },
}

/// Creates a Redshift cluster and opens network access to it.
///
/// The provisioner keeps nothing but the cluster identifier; every read goes back to the control
/// plane. Its three collaborators are injected so that fakes can stand in for AWS.
pub struct ClusterProvisioner<R, N, W> {
    identifier: ClusterIdentifier,
    roles: R,
    network: N,
    warehouse: W,
    wait_policy: WaitPolicy,
}

impl<R, N, W> ClusterProvisioner<R, N, W>
where
    R: RoleLookup,
    N: NetworkAccess,
    W: WarehouseClient,
{
    pub fn new<I>(identifier: I, roles: R, network: N, warehouse: W) -> Self
    where
        I: Into<ClusterIdentifier>,
    {
        Self {
            identifier: identifier.into(),
            roles,
            network,
            warehouse,
            wait_policy: WaitPolicy::default(),
        }
    }

    pub fn with_wait_policy(mut self, wait_policy: WaitPolicy) -> Self {
        self.wait_policy = wait_policy;
        self
    }

    pub fn identifier(&self) -> &ClusterIdentifier {
        &self.identifier
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait_policy
    }

    /// Create the cluster and wait until it is available. See [`Self::create_with_cancellation`].
    pub async fn create(&self, spec: &ClusterSpec) -> Result<CreateOutcome> {
        self.create_with_cancellation(spec, &CancellationToken::new())
            .await
    }

    /// Resolve the cluster's IAM role, request the cluster and wait until it is available.
    ///
    /// If a cluster with this identifier already exists, no create request is sent again; the
    /// existing cluster is waited on instead. Any other error from the control plane is returned
    /// as is.
    pub async fn create_with_cancellation(
        &self,
        spec: &ClusterSpec,
        cancel: &CancellationToken,
    ) -> Result<CreateOutcome> {
        let iam_roles = self
            .roles
            .role_arns(&spec.iam_role_name)
            .await
            .context(error::ResolveRoleSnafu {
                role_name: &spec.iam_role_name,
            })?
            .into_arns();
        debug!(
            "Role '{}' resolved to {:?}",
            spec.iam_role_name, iam_roles
        );

        let request = CreateClusterRequest::new(&self.identifier, spec, iam_roles);
        info!(
            "Creating {} cluster '{}' with {} '{}' node(s)",
            request.cluster_type, self.identifier, request.number_of_nodes, request.node_type
        );
        match self.warehouse.create_cluster(&request).await {
            Ok(()) => {
                let properties = self.wait_until_available(cancel).await?;
                info!("Cluster '{}' is available", self.identifier);
                Ok(CreateOutcome::Created(properties))
            }
            Err(e) if e.is_code(CLUSTER_ALREADY_EXISTS) => {
                info!(
                    "Cluster '{}' already exists, waiting for it to be available",
                    self.identifier
                );
                let properties = self.wait_until_available(cancel).await?;
                Ok(CreateOutcome::AlreadyExists(properties))
            }
            Err(e) => Err(e).context(error::CreateClusterSnafu {
                identifier: self.identifier.as_str(),
            }),
        }
    }

    /// Describe the cluster as it is right now.
    pub async fn cluster_properties(&self) -> Result<ClusterProperties> {
        let clusters = self
            .warehouse
            .describe_clusters(self.identifier.as_str())
            .await
            .context(error::DescribeClusterSnafu {
                identifier: self.identifier.as_str(),
            })?;
        trace!("Described clusters: {:?}", clusters);
        clusters
            .into_iter()
            .next()
            .context(error::ClusterNotFoundSnafu {
                identifier: self.identifier.as_str(),
            })
    }

    /// Poll the cluster status until it is `available`, the wait policy's timeout passes, or
    /// `cancel` is cancelled.
    pub async fn wait_until_available(
        &self,
        cancel: &CancellationToken,
    ) -> Result<ClusterProperties> {
        let timeout = self.wait_policy.timeout;
        tokio::select! {
            result = tokio::time::timeout(timeout, self.poll_until_available()) => match result {
                Ok(result) => result,
                Err(_) => error::AvailabilityTimeoutSnafu {
                    identifier: self.identifier.as_str(),
                    timeout_secs: timeout.as_secs(),
                }
                .fail(),
            },
            _ = cancel.cancelled() => error::CancelledSnafu {
                identifier: self.identifier.as_str(),
            }
            .fail(),
        }
    }

    async fn poll_until_available(&self) -> Result<ClusterProperties> {
        loop {
            let properties = self.cluster_properties().await?;
            if properties.is_available() {
                return Ok(properties);
            }
            info!(
                "Waiting for cluster '{}' to be available, status is '{}'",
                self.identifier, properties.status
            );
            tokio::time::sleep(self.wait_policy.poll_interval).await;
        }
    }

    /// Allow TCP traffic on `port` from any IPv4 address into the cluster's VPC.
    ///
    /// The rule is added to the VPC's default security group. If the group already holds the
    /// rule, the group is read back to confirm it before reporting success.
    pub async fn open_ingress(&self, port: i32) -> Result<IngressOutcome> {
        let properties = self.cluster_properties().await?;
        let vpc_id = properties.vpc_id.context(error::MissingVpcSnafu {
            identifier: self.identifier.as_str(),
        })?;
        let group = self.default_security_group(&vpc_id).await?;
        let rule = IngressRule::tcp_from_anywhere(port);
        info!(
            "Authorizing '{}' on security group '{}' ({})",
            rule, group.group_id, group.group_name
        );

        let result = self.network.authorize_ingress(&group, &rule).await;
        match result {
            Ok(()) => Ok(IngressOutcome::Authorized {
                group_id: group.group_id,
                rule,
            }),
            Err(e) if e.is_code(DUPLICATE_PERMISSION) => {
                info!("The rule '{}' already exists", rule);
                self.confirm_ingress(&vpc_id, &group.group_id, rule).await
            }
            Err(e) => Err(e).context(error::AuthorizeIngressSnafu {
                group_id: &group.group_id,
                port,
            }),
        }
    }

    async fn confirm_ingress(
        &self,
        vpc_id: &str,
        group_id: &str,
        rule: IngressRule,
    ) -> Result<IngressOutcome> {
        let confirmed = self
            .security_groups(vpc_id)
            .await?
            .iter()
            .any(|group| group.group_id == group_id && group.allows(&rule));
        if !confirmed {
            return error::IngressNotConfirmedSnafu {
                group_id,
                rule: rule.to_string(),
            }
            .fail();
        }
        Ok(IngressOutcome::AlreadyAuthorized {
            group_id: group_id.to_string(),
            rule,
        })
    }

    /// The group named `default`, or the first group if none has that name.
    async fn default_security_group(&self, vpc_id: &str) -> Result<SecurityGroup> {
        let mut groups = self.security_groups(vpc_id).await?;
        let index = groups
            .iter()
            .position(|group| group.group_name == DEFAULT_SECURITY_GROUP_NAME)
            .unwrap_or(0);
        if index < groups.len() {
            Ok(groups.swap_remove(index))
        } else {
            error::SecurityGroupNotFoundSnafu { vpc_id }.fail()
        }
    }

    async fn security_groups(&self, vpc_id: &str) -> Result<Vec<SecurityGroup>> {
        self.network
            .security_groups(vpc_id)
            .await
            .context(error::SecurityGroupsSnafu { vpc_id })
    }
}
