/*!

Plain data types passed between the [`ClusterProvisioner`](crate::ClusterProvisioner) and its
collaborators. None of these are owned locally: each one is either a caller-supplied request or a
snapshot of remote state.

!*/

use crate::constants::ANY_IPV4_CIDR;
use serde::{Deserialize, Serialize};
use serde_plain::{
    derive_deserialize_from_fromstr, derive_display_from_serialize,
    derive_fromstr_from_deserialize, derive_serialize_from_display,
};
use std::convert::Infallible;
use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

/// The user-chosen name of a Redshift cluster.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClusterIdentifier(String);

impl ClusterIdentifier {
    pub fn new<S: Into<String>>(identifier: S) -> Self {
        Self(identifier.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for ClusterIdentifier {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

impl From<&str> for ClusterIdentifier {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for ClusterIdentifier {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Whether the cluster has a single node or a leader with compute nodes.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ClusterType {
    SingleNode,
    MultiNode,
}

impl Default for ClusterType {
    fn default() -> Self {
        Self::MultiNode
    }
}

derive_display_from_serialize!(ClusterType);
derive_fromstr_from_deserialize!(ClusterType);

/// The master user password. It is never printed.
#[derive(Clone, Eq, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct MasterPassword(String);

impl MasterPassword {
    pub fn new<S: Into<String>>(password: S) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl Debug for MasterPassword {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("MasterPassword(***)")
    }
}

/// The shape and identity of a cluster to create.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterSpec {
    #[serde(default)]
    pub cluster_type: ClusterType,
    pub node_type: String,
    pub number_of_nodes: i32,
    pub db_name: String,
    pub master_username: String,
    pub master_user_password: MasterPassword,
    /// The IAM role (or role path prefix) that grants the cluster access to S3.
    pub iam_role_name: String,
}

/// Everything the warehouse client needs to send a create cluster request.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CreateClusterRequest {
    pub identifier: ClusterIdentifier,
    pub cluster_type: ClusterType,
    pub node_type: String,
    pub number_of_nodes: i32,
    pub db_name: String,
    pub master_username: String,
    pub master_user_password: MasterPassword,
    pub iam_roles: Vec<String>,
}

impl CreateClusterRequest {
    pub fn new(identifier: &ClusterIdentifier, spec: &ClusterSpec, iam_roles: Vec<String>) -> Self {
        Self {
            identifier: identifier.clone(),
            cluster_type: spec.cluster_type,
            node_type: spec.node_type.clone(),
            number_of_nodes: spec.number_of_nodes,
            db_name: spec.db_name.clone(),
            master_username: spec.master_username.clone(),
            master_user_password: spec.master_user_password.clone(),
            iam_roles,
        }
    }
}

/// The status Redshift reports for a cluster. Only `available` has meaning to the provisioner;
/// the rest are kept for display.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum ClusterStatus {
    Available,
    Creating,
    Modifying,
    Deleting,
    Other(String),
}

impl ClusterStatus {
    pub fn is_available(&self) -> bool {
        matches!(self, ClusterStatus::Available)
    }
}

impl FromStr for ClusterStatus {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from(s))
    }
}

impl From<&str> for ClusterStatus {
    fn from(s: &str) -> Self {
        match s {
            "available" => ClusterStatus::Available,
            "creating" => ClusterStatus::Creating,
            "modifying" => ClusterStatus::Modifying,
            "deleting" => ClusterStatus::Deleting,
            other => ClusterStatus::Other(other.to_string()),
        }
    }
}

impl Display for ClusterStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterStatus::Available => f.write_str("available"),
            ClusterStatus::Creating => f.write_str("creating"),
            ClusterStatus::Modifying => f.write_str("modifying"),
            ClusterStatus::Deleting => f.write_str("deleting"),
            ClusterStatus::Other(s) => f.write_str(s),
        }
    }
}

derive_serialize_from_display!(ClusterStatus);
derive_deserialize_from_fromstr!(ClusterStatus, "a cluster status");

/// The address clients use to connect to the cluster's database.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterEndpoint {
    pub address: String,
    pub port: Option<i32>,
}

/// A snapshot of a cluster as described by Redshift at the time of the request.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClusterProperties {
    pub identifier: String,
    pub status: ClusterStatus,
    pub vpc_id: Option<String>,
    pub node_type: Option<String>,
    pub number_of_nodes: Option<i32>,
    pub db_name: Option<String>,
    pub master_username: Option<String>,
    pub endpoint: Option<ClusterEndpoint>,
    pub iam_roles: Vec<String>,
}

impl ClusterProperties {
    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }
}

/// What a role lookup resolved to. A name may resolve to one role or, when it is a path
/// prefix, to every role under that path.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RoleReference {
    Single(String),
    Many(Vec<String>),
}

impl RoleReference {
    /// Normalize to the list form that the create cluster request takes.
    pub fn into_arns(self) -> Vec<String> {
        match self {
            RoleReference::Single(arn) => vec![arn],
            RoleReference::Many(arns) => arns,
        }
    }
}

impl From<String> for RoleReference {
    fn from(arn: String) -> Self {
        Self::Single(arn)
    }
}

impl From<Vec<String>> for RoleReference {
    fn from(arns: Vec<String>) -> Self {
        Self::Many(arns)
    }
}

/// An allow rule for inbound traffic.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngressRule {
    pub protocol: String,
    pub from_port: i32,
    pub to_port: i32,
    pub cidr: String,
}

impl IngressRule {
    /// Allow TCP traffic on `port` from any IPv4 address.
    pub fn tcp_from_anywhere(port: i32) -> Self {
        Self {
            protocol: "tcp".to_string(),
            from_port: port,
            to_port: port,
            cidr: ANY_IPV4_CIDR.to_string(),
        }
    }

    /// EC2 accepts the protocol in any case, so `TCP` and `tcp` are the same rule.
    pub fn matches(&self, other: &IngressRule) -> bool {
        self.protocol.eq_ignore_ascii_case(&other.protocol)
            && self.from_port == other.from_port
            && self.to_port == other.to_port
            && self.cidr == other.cidr
    }
}

impl Display for IngressRule {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "peer: {}, {}, from port: {}, to port: {}, ALLOW",
            self.cidr,
            self.protocol.to_uppercase(),
            self.from_port,
            self.to_port
        )
    }
}

/// A snapshot of a security group and the ingress rules it holds.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityGroup {
    pub group_id: String,
    pub group_name: String,
    pub vpc_id: Option<String>,
    pub ingress_rules: Vec<IngressRule>,
}

impl SecurityGroup {
    pub fn allows(&self, rule: &IngressRule) -> bool {
        self.ingress_rules.iter().any(|r| r.matches(rule))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn single_role_becomes_one_element_list() {
        let arn = "arn:aws:iam::123456789012:role/s3-read".to_string();
        assert_eq!(RoleReference::from(arn.clone()).into_arns(), vec![arn]);
    }

    #[test]
    fn role_list_passes_through() {
        let arns = vec![
            "arn:aws:iam::123456789012:role/etl/a".to_string(),
            "arn:aws:iam::123456789012:role/etl/b".to_string(),
        ];
        assert_eq!(RoleReference::from(arns.clone()).into_arns(), arns);
    }

    #[test]
    fn cluster_status_strings() {
        assert_eq!(
            "available".parse::<ClusterStatus>().unwrap(),
            ClusterStatus::Available
        );
        let resizing: ClusterStatus = "resizing".parse().unwrap();
        assert_eq!(resizing, ClusterStatus::Other("resizing".into()));
        assert_eq!(resizing.to_string(), "resizing");
        assert!(!resizing.is_available());
        assert_eq!(
            serde_json::to_string(&ClusterStatus::Creating).unwrap(),
            r#""creating""#
        );
    }

    #[test]
    fn cluster_type_strings() {
        assert_eq!(ClusterType::SingleNode.to_string(), "single-node");
        assert_eq!(
            "multi-node".parse::<ClusterType>().unwrap(),
            ClusterType::MultiNode
        );
    }

    #[test]
    fn ingress_protocol_is_case_insensitive() {
        let mut upper = IngressRule::tcp_from_anywhere(5439);
        upper.protocol = "TCP".into();
        assert!(IngressRule::tcp_from_anywhere(5439).matches(&upper));
        assert!(!IngressRule::tcp_from_anywhere(5440).matches(&upper));
    }

    #[test]
    fn password_is_redacted() {
        let password = MasterPassword::new("Passw0rd");
        assert_eq!(format!("{:?}", password), "MasterPassword(***)");
        assert_eq!(password.expose(), "Passw0rd");
    }
}
