use std::time::Duration;

pub const DEFAULT_REGION: &str = "us-west-2";
pub const DEFAULT_ASSUME_ROLE_SESSION_DURATION: u64 = 3600;
/// Session name used when assuming a role.
pub const ASSUME_ROLE_SESSION_NAME: &str = "redshift-provisioner";
/// The SDK makes a single attempt per request unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 1;

/// How long to wait between cluster status checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);
/// How long to wait for a cluster to become available before giving up.
pub const DEFAULT_AVAILABILITY_TIMEOUT: Duration = Duration::from_secs(45 * 60);

/// The port Redshift listens on unless the cluster was created with another one.
pub const DEFAULT_REDSHIFT_PORT: i32 = 5439;
/// The IPv4 range that matches every source address.
pub const ANY_IPV4_CIDR: &str = "0.0.0.0/0";
/// Name EC2 gives the security group every VPC starts with.
pub const DEFAULT_SECURITY_GROUP_NAME: &str = "default";

/// Redshift error code returned when the cluster identifier is taken.
pub const CLUSTER_ALREADY_EXISTS: &str = "ClusterAlreadyExists";
/// Redshift error code returned when describing an identifier that does not exist.
pub const CLUSTER_NOT_FOUND: &str = "ClusterNotFound";
/// EC2 error code returned when an identical ingress rule is already present.
pub const DUPLICATE_PERMISSION: &str = "InvalidPermission.Duplicate";

/// File names inside an AWS credentials secret directory.
pub const ACCESS_KEY_ID: &str = "access-key-id";
pub const SECRET_ACCESS_KEY: &str = "secret-access-key";
pub const SESSION_TOKEN: &str = "session-token";
