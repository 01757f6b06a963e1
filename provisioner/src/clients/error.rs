use snafu::Snafu;

/// The result type returned by [`RoleLookup`], [`NetworkAccess`] and [`WarehouseClient`]
/// implementations.
pub type ClientResult<T> = std::result::Result<T, ClientError>;

/// The error type returned by the collaborator traits. A remote control plane that rejects a
/// request reports a `Service` error which carries the error code exactly as the service sent it.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ClientError {
    #[snafu(display("{} was rejected with '{}': {}", operation, code, message))]
    Service {
        operation: String,
        code: String,
        message: String,
    },

    #[snafu(display("{} request failed: {}", operation, source))]
    RequestFailed {
        operation: String,
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    #[snafu(display("{} was missing from {}", what, from))]
    MissingData { what: String, from: String },
}

impl ClientError {
    /// Create a `Service` error, mostly useful for fakes that stand in for a control plane.
    pub fn service<S1, S2, S3>(operation: S1, code: S2, message: S3) -> Self
    where
        S1: Into<String>,
        S2: Into<String>,
        S3: Into<String>,
    {
        Self::Service {
            operation: operation.into(),
            code: code.into(),
            message: message.into(),
        }
    }

    /// The error code reported by the remote service, if the service rejected the request.
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Service { code, .. } => Some(code),
            _ => None,
        }
    }

    /// Returns `true` if the remote service rejected the request with `code`.
    pub fn is_code(&self, code: &str) -> bool {
        self.code() == Some(code)
    }
}

#[cfg(test)]
mod test {
    use super::ClientError;

    #[test]
    fn service_errors_expose_their_code() {
        let e = ClientError::service("CreateCluster", "ClusterQuotaExceeded", "too many");
        assert_eq!(e.code(), Some("ClusterQuotaExceeded"));
        assert!(e.is_code("ClusterQuotaExceeded"));
        assert!(!e.is_code("ClusterAlreadyExists"));
        assert_eq!(
            e.to_string(),
            "CreateCluster was rejected with 'ClusterQuotaExceeded': too many"
        );
    }

    #[test]
    fn other_errors_have_no_code() {
        let e = ClientError::MissingData {
            what: "role arn".into(),
            from: "GetRole".into(),
        };
        assert_eq!(e.code(), None);
    }
}
