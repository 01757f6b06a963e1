/*!

This test module provides fake implementations of [`RoleLookup`], [`NetworkAccess`] and
[`WarehouseClient`] that keep the "remote" state in memory so that the provisioner can be tested
without AWS. Each fake is cheap to clone and clones share state, so a test can hand one clone to
the provisioner and inspect the other afterwards.

!*/

use redshift_provisioner::clients::{
    ClientError, ClientResult, NetworkAccess, RoleLookup, WarehouseClient,
};
use redshift_provisioner::model::{
    ClusterProperties, ClusterStatus, CreateClusterRequest, IngressRule, RoleReference,
    SecurityGroup,
};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

pub(crate) const VPC_ID: &str = "vpc-0a1b2c3d";
pub(crate) const DEFAULT_GROUP_ID: &str = "sg-default";

#[derive(Clone, Default)]
pub(crate) struct FakeRoles {
    roles: Arc<Mutex<HashMap<String, RoleReference>>>,
}

impl FakeRoles {
    pub(crate) fn with_role<S: Into<String>>(self, name: S, reference: RoleReference) -> Self {
        self.roles.lock().unwrap().insert(name.into(), reference);
        self
    }
}

#[async_trait::async_trait]
impl RoleLookup for FakeRoles {
    async fn role_arns(&self, role_name: &str) -> ClientResult<RoleReference> {
        self.roles
            .lock()
            .unwrap()
            .get(role_name)
            .cloned()
            .ok_or_else(|| {
                ClientError::service(
                    "GetRole",
                    "NoSuchEntity",
                    format!("The role with name {} cannot be found.", role_name),
                )
            })
    }
}

#[derive(Default)]
struct WarehouseState {
    cluster: Option<ClusterProperties>,
    /// Statuses reported by successive describe calls. The last one repeats.
    statuses: VecDeque<ClusterStatus>,
    create_requests: Vec<CreateClusterRequest>,
    describe_calls: usize,
    create_error_code: Option<String>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeWarehouse {
    state: Arc<Mutex<WarehouseState>>,
}

impl FakeWarehouse {
    /// Statuses the cluster moves through once it exists.
    pub(crate) fn with_statuses<I>(self, statuses: I) -> Self
    where
        I: IntoIterator<Item = &'static str>,
    {
        self.state.lock().unwrap().statuses = statuses.into_iter().map(Into::into).collect();
        self
    }

    /// Pretend a cluster with `identifier` already exists.
    pub(crate) fn with_existing_cluster(self, identifier: &str) -> Self {
        self.state.lock().unwrap().cluster = Some(properties(identifier, Some(VPC_ID)));
        self
    }

    pub(crate) fn with_existing_cluster_outside_vpc(self, identifier: &str) -> Self {
        self.state.lock().unwrap().cluster = Some(properties(identifier, None));
        self
    }

    /// Reject create requests with `code`.
    pub(crate) fn failing_create(self, code: &str) -> Self {
        self.state.lock().unwrap().create_error_code = Some(code.to_string());
        self
    }

    pub(crate) fn create_requests(&self) -> Vec<CreateClusterRequest> {
        self.state.lock().unwrap().create_requests.clone()
    }

    pub(crate) fn describe_calls(&self) -> usize {
        self.state.lock().unwrap().describe_calls
    }
}

fn properties(identifier: &str, vpc_id: Option<&str>) -> ClusterProperties {
    ClusterProperties {
        identifier: identifier.to_string(),
        status: ClusterStatus::Available,
        vpc_id: vpc_id.map(String::from),
        node_type: Some("dc2.large".to_string()),
        number_of_nodes: Some(4),
        db_name: Some("dev".to_string()),
        master_username: Some("awsuser".to_string()),
        endpoint: None,
        iam_roles: Vec::new(),
    }
}

#[async_trait::async_trait]
impl WarehouseClient for FakeWarehouse {
    async fn create_cluster(&self, request: &CreateClusterRequest) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        state.create_requests.push(request.clone());
        if let Some(code) = &state.create_error_code {
            return Err(ClientError::service("CreateCluster", code, "simulated failure"));
        }
        if state.cluster.is_some() {
            return Err(ClientError::service(
                "CreateCluster",
                "ClusterAlreadyExists",
                "Cluster already exists",
            ));
        }
        let mut cluster = properties(request.identifier.as_str(), Some(VPC_ID));
        cluster.status = ClusterStatus::Creating;
        cluster.node_type = Some(request.node_type.clone());
        cluster.number_of_nodes = Some(request.number_of_nodes);
        cluster.iam_roles = request.iam_roles.clone();
        state.cluster = Some(cluster);
        Ok(())
    }

    async fn describe_clusters(&self, identifier: &str) -> ClientResult<Vec<ClusterProperties>> {
        let mut state = self.state.lock().unwrap();
        state.describe_calls += 1;
        let status = if state.statuses.len() > 1 {
            state.statuses.pop_front()
        } else {
            state.statuses.front().cloned()
        };
        match state.cluster.as_mut() {
            Some(cluster) if cluster.identifier == identifier => {
                // Without a script the cluster is available as soon as anyone looks.
                cluster.status = status.unwrap_or(ClusterStatus::Available);
                Ok(vec![cluster.clone()])
            }
            _ => Ok(Vec::new()),
        }
    }
}

#[derive(Default)]
struct NetworkState {
    groups: Vec<SecurityGroup>,
    authorize_calls: Vec<(String, IngressRule)>,
    authorize_error_code: Option<String>,
}

#[derive(Clone, Default)]
pub(crate) struct FakeNetwork {
    state: Arc<Mutex<NetworkState>>,
}

impl FakeNetwork {
    /// A VPC holding a custom group followed by the default group.
    pub(crate) fn with_default_vpc() -> Self {
        let network = Self::default();
        network.state.lock().unwrap().groups = vec![
            SecurityGroup {
                group_id: "sg-custom".to_string(),
                group_name: "bastion".to_string(),
                vpc_id: Some(VPC_ID.to_string()),
                ingress_rules: Vec::new(),
            },
            SecurityGroup {
                group_id: DEFAULT_GROUP_ID.to_string(),
                group_name: "default".to_string(),
                vpc_id: Some(VPC_ID.to_string()),
                ingress_rules: Vec::new(),
            },
        ];
        network
    }

    /// A VPC holding groups with `names`, in order. Each group's id is `sg-<name>`.
    pub(crate) fn with_groups<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let network = Self::default();
        network.state.lock().unwrap().groups = names
            .into_iter()
            .map(|name| SecurityGroup {
                group_id: format!("sg-{}", name),
                group_name: name.to_string(),
                vpc_id: Some(VPC_ID.to_string()),
                ingress_rules: Vec::new(),
            })
            .collect();
        network
    }

    pub(crate) fn with_rule(self, group_id: &str, rule: IngressRule) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let group = state
                .groups
                .iter_mut()
                .find(|g| g.group_id == group_id)
                .unwrap();
            group.ingress_rules.push(rule);
        }
        self
    }

    /// Reject authorize requests with `code`, regardless of the group's rules.
    pub(crate) fn failing_authorize(self, code: &str) -> Self {
        self.state.lock().unwrap().authorize_error_code = Some(code.to_string());
        self
    }

    pub(crate) fn rules(&self, group_id: &str) -> Vec<IngressRule> {
        self.state
            .lock()
            .unwrap()
            .groups
            .iter()
            .find(|g| g.group_id == group_id)
            .map(|g| g.ingress_rules.clone())
            .unwrap_or_default()
    }

    pub(crate) fn authorize_calls(&self) -> Vec<(String, IngressRule)> {
        self.state.lock().unwrap().authorize_calls.clone()
    }
}

#[async_trait::async_trait]
impl NetworkAccess for FakeNetwork {
    async fn security_groups(&self, vpc_id: &str) -> ClientResult<Vec<SecurityGroup>> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .groups
            .iter()
            .filter(|g| g.vpc_id.as_deref() == Some(vpc_id))
            .cloned()
            .collect())
    }

    async fn authorize_ingress(
        &self,
        group: &SecurityGroup,
        rule: &IngressRule,
    ) -> ClientResult<()> {
        let mut state = self.state.lock().unwrap();
        state
            .authorize_calls
            .push((group.group_id.clone(), rule.clone()));
        if let Some(code) = &state.authorize_error_code {
            return Err(ClientError::service(
                "AuthorizeSecurityGroupIngress",
                code,
                "simulated failure",
            ));
        }
        let remote = state
            .groups
            .iter_mut()
            .find(|g| g.group_id == group.group_id)
            .ok_or_else(|| {
                ClientError::service(
                    "AuthorizeSecurityGroupIngress",
                    "InvalidGroup.NotFound",
                    "no such group",
                )
            })?;
        if remote.allows(rule) {
            return Err(ClientError::service(
                "AuthorizeSecurityGroupIngress",
                "InvalidPermission.Duplicate",
                "the specified rule already exists",
            ));
        }
        remote.ingress_rules.push(rule.clone());
        Ok(())
    }
}
