use super::error::{self, ClientError, ClientResult};
use super::{NetworkAccess, RoleLookup, WarehouseClient};
use crate::constants::CLUSTER_NOT_FOUND;
use crate::model::{
    ClusterEndpoint, ClusterProperties, ClusterType, CreateClusterRequest, IngressRule,
    RoleReference, SecurityGroup,
};
use aws_sdk_ec2::model::{Filter, IpPermission, IpRange};
use aws_sdk_redshift::model::Cluster;
use aws_smithy_http::result::SdkError;
use aws_smithy_types::retry::ProvideErrorKind;
use aws_types::SdkConfig;
use log::{debug, trace};
use snafu::OptionExt;

/// Convert an SDK error into a [`ClientError`], keeping the service's error code when the service
/// rejected the request.
fn client_error<E, R>(operation: &str, sdk_err: SdkError<E, R>) -> ClientError
where
    E: ProvideErrorKind + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug + Send + Sync + 'static,
{
    match sdk_err {
        SdkError::ServiceError(context) => {
            let err = context.into_err();
            match err.code() {
                Some(code) => ClientError::Service {
                    operation: operation.to_string(),
                    code: code.to_string(),
                    message: err.to_string(),
                },
                None => ClientError::RequestFailed {
                    operation: operation.to_string(),
                    source: Box::new(err),
                },
            }
        }
        other => ClientError::RequestFailed {
            operation: operation.to_string(),
            source: Box::new(other),
        },
    }
}

/// Provides the default [`RoleLookup`] implementation backed by IAM.
///
/// A role name ending in `/` is treated as a path prefix and resolves to every role under that
/// path. Any other name resolves to exactly one role.
#[derive(Clone, Debug)]
pub struct IamRoleLookup {
    client: aws_sdk_iam::Client,
}

impl IamRoleLookup {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_iam::Client::new(config))
    }

    pub fn from_client(client: aws_sdk_iam::Client) -> Self {
        Self { client }
    }

    async fn roles_under_path(&self, path_prefix: &str) -> ClientResult<Vec<String>> {
        let mut arns = Vec::new();
        let mut marker: Option<String> = None;
        loop {
            let output = self
                .client
                .list_roles()
                .path_prefix(path_prefix)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| client_error("ListRoles", e))?;
            arns.extend(
                output
                    .roles()
                    .unwrap_or_default()
                    .iter()
                    .filter_map(|role| role.arn().map(String::from)),
            );
            let truncated: Option<bool> = output.is_truncated().into();
            match (truncated.unwrap_or(false), output.marker()) {
                (true, Some(next)) => marker = Some(next.to_string()),
                _ => break,
            }
        }
        Ok(arns)
    }
}

#[async_trait::async_trait]
impl RoleLookup for IamRoleLookup {
    async fn role_arns(&self, role_name: &str) -> ClientResult<RoleReference> {
        if role_name.ends_with('/') {
            debug!("Listing IAM roles under path '{}'", role_name);
            let arns = self.roles_under_path(role_name).await?;
            if arns.is_empty() {
                return error::MissingDataSnafu {
                    what: format!("roles under path '{}'", role_name),
                    from: "ListRoles",
                }
                .fail();
            }
            return Ok(RoleReference::Many(arns));
        }

        debug!("Getting IAM role '{}'", role_name);
        let output = self
            .client
            .get_role()
            .role_name(role_name)
            .send()
            .await
            .map_err(|e| client_error("GetRole", e))?;
        let arn = output
            .role()
            .and_then(|role| role.arn())
            .context(error::MissingDataSnafu {
                what: format!("arn of role '{}'", role_name),
                from: "GetRole",
            })?;
        Ok(RoleReference::Single(arn.to_string()))
    }
}

/// Provides the default [`NetworkAccess`] implementation backed by EC2.
#[derive(Clone, Debug)]
pub struct Ec2NetworkAccess {
    client: aws_sdk_ec2::Client,
}

impl Ec2NetworkAccess {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_ec2::Client::new(config))
    }

    pub fn from_client(client: aws_sdk_ec2::Client) -> Self {
        Self { client }
    }
}

fn security_group(group: &aws_sdk_ec2::model::SecurityGroup) -> ClientResult<SecurityGroup> {
    let group_id = group.group_id().context(error::MissingDataSnafu {
        what: "group id",
        from: "DescribeSecurityGroups",
    })?;
    let mut ingress_rules = Vec::new();
    for permission in group.ip_permissions().unwrap_or_default() {
        let protocol = permission.ip_protocol().unwrap_or_default();
        let from_port: Option<i32> = permission.from_port().into();
        let to_port: Option<i32> = permission.to_port().into();
        for range in permission.ip_ranges().unwrap_or_default() {
            if let Some(cidr) = range.cidr_ip() {
                ingress_rules.push(IngressRule {
                    protocol: protocol.to_string(),
                    from_port: from_port.unwrap_or(-1),
                    to_port: to_port.unwrap_or(-1),
                    cidr: cidr.to_string(),
                });
            }
        }
    }
    Ok(SecurityGroup {
        group_id: group_id.to_string(),
        group_name: group.group_name().unwrap_or_default().to_string(),
        vpc_id: group.vpc_id().map(String::from),
        ingress_rules,
    })
}

#[async_trait::async_trait]
impl NetworkAccess for Ec2NetworkAccess {
    async fn security_groups(&self, vpc_id: &str) -> ClientResult<Vec<SecurityGroup>> {
        let output = self
            .client
            .describe_security_groups()
            .filters(Filter::builder().name("vpc-id").values(vpc_id).build())
            .send()
            .await
            .map_err(|e| client_error("DescribeSecurityGroups", e))?;
        let groups = output
            .security_groups()
            .unwrap_or_default()
            .iter()
            .map(security_group)
            .collect::<ClientResult<Vec<_>>>()?;
        trace!("Security groups in '{}': {:?}", vpc_id, groups);
        Ok(groups)
    }

    async fn authorize_ingress(
        &self,
        group: &SecurityGroup,
        rule: &IngressRule,
    ) -> ClientResult<()> {
        self.client
            .authorize_security_group_ingress()
            .group_id(&group.group_id)
            .ip_permissions(
                IpPermission::builder()
                    .ip_protocol(&rule.protocol)
                    .from_port(rule.from_port)
                    .to_port(rule.to_port)
                    .ip_ranges(IpRange::builder().cidr_ip(&rule.cidr).build())
                    .build(),
            )
            .send()
            .await
            .map_err(|e| client_error("AuthorizeSecurityGroupIngress", e))?;
        Ok(())
    }
}

/// Provides the default [`WarehouseClient`] implementation backed by Redshift.
#[derive(Clone, Debug)]
pub struct RedshiftWarehouse {
    client: aws_sdk_redshift::Client,
}

impl RedshiftWarehouse {
    pub fn new(config: &SdkConfig) -> Self {
        Self::from_client(aws_sdk_redshift::Client::new(config))
    }

    pub fn from_client(client: aws_sdk_redshift::Client) -> Self {
        Self { client }
    }
}

fn cluster_properties(cluster: &Cluster) -> ClientResult<ClusterProperties> {
    let identifier = cluster
        .cluster_identifier()
        .context(error::MissingDataSnafu {
            what: "cluster identifier",
            from: "DescribeClusters",
        })?;
    // Redshift reports zero for values it does not know yet.
    let number_of_nodes = Some(cluster.number_of_nodes()).filter(|n| *n > 0);
    Ok(ClusterProperties {
        identifier: identifier.to_string(),
        status: cluster.cluster_status().unwrap_or("unknown").into(),
        vpc_id: cluster.vpc_id().map(String::from),
        node_type: cluster.node_type().map(String::from),
        number_of_nodes,
        db_name: cluster.db_name().map(String::from),
        master_username: cluster.master_username().map(String::from),
        endpoint: cluster.endpoint().and_then(|endpoint| {
            endpoint.address().map(|address| ClusterEndpoint {
                address: address.to_string(),
                port: Some(endpoint.port()).filter(|p| *p > 0),
            })
        }),
        iam_roles: cluster
            .iam_roles()
            .unwrap_or_default()
            .iter()
            .filter_map(|role| role.iam_role_arn().map(String::from))
            .collect(),
    })
}

#[async_trait::async_trait]
impl WarehouseClient for RedshiftWarehouse {
    async fn create_cluster(&self, request: &CreateClusterRequest) -> ClientResult<()> {
        let mut create_cluster = self
            .client
            .create_cluster()
            .cluster_identifier(request.identifier.as_str())
            .cluster_type(request.cluster_type.to_string())
            .node_type(&request.node_type)
            .db_name(&request.db_name)
            .master_username(&request.master_username)
            .master_user_password(request.master_user_password.expose())
            .set_iam_roles(Some(request.iam_roles.clone()));
        // Redshift rejects a node count for single-node clusters.
        if request.cluster_type == ClusterType::MultiNode {
            create_cluster = create_cluster.number_of_nodes(request.number_of_nodes);
        }
        let output = create_cluster
            .send()
            .await
            .map_err(|e| client_error("CreateCluster", e))?;
        trace!(
            "Create cluster response status: {:?}",
            output.cluster().and_then(|c| c.cluster_status())
        );
        Ok(())
    }

    async fn describe_clusters(&self, identifier: &str) -> ClientResult<Vec<ClusterProperties>> {
        let output = match self
            .client
            .describe_clusters()
            .cluster_identifier(identifier)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                let e = client_error("DescribeClusters", e);
                if e.is_code(CLUSTER_NOT_FOUND) {
                    debug!("No cluster named '{}' exists", identifier);
                    return Ok(Vec::new());
                }
                return Err(e);
            }
        };
        output
            .clusters()
            .unwrap_or_default()
            .iter()
            .map(cluster_properties)
            .collect()
    }
}
