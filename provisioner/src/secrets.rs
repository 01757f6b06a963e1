/*!

AWS credentials can be provided as a directory of files, one file per key, the way a mounted
Kubernetes opaque secret looks on disk:

```text
<dir>/access-key-id
<dir>/secret-access-key
<dir>/session-token      (optional)
```

!*/

use crate::constants::{ACCESS_KEY_ID, SECRET_ACCESS_KEY, SESSION_TOKEN};
use crate::error::{self, Result};
use snafu::{OptionExt, ResultExt};
use std::collections::BTreeMap;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::{Path, PathBuf};

pub type SecretData = BTreeMap<String, Vec<u8>>;

/// Reads the keys (file names) and values (file contents) of a secret directory.
pub struct SecretsReader {
    dir: PathBuf,
}

impl SecretsReader {
    pub fn new<P: Into<PathBuf>>(dir: P) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Read every regular file in the directory. Subdirectories are ignored.
    pub fn read(&self) -> Result<SecretData> {
        let mut map = SecretData::new();
        let read_dir = fs::read_dir(&self.dir).context(error::ReadFileSnafu { path: &self.dir })?;
        for entry in read_dir {
            let path = entry
                .context(error::ReadFileSnafu { path: &self.dir })?
                .path();
            if !path.is_file() {
                continue;
            }
            let key = match path.file_name().and_then(|name| name.to_str()) {
                Some(key) => key.to_string(),
                None => continue,
            };
            let value = fs::read(&path).context(error::ReadFileSnafu { path: &path })?;
            map.insert(key, value);
        }
        Ok(map)
    }
}

/// Static AWS credentials.
#[derive(Clone, Eq, PartialEq)]
pub struct AwsCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: Option<String>,
}

impl Debug for AwsCredentials {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AwsCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"***")
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "***"),
            )
            .finish()
    }
}

impl AwsCredentials {
    /// Read credentials from a secret directory.
    pub fn from_secret_dir<P: Into<PathBuf>>(dir: P) -> Result<Self> {
        let reader = SecretsReader::new(dir);
        let secret = reader.read()?;
        let value = |key: &str| -> Result<Option<String>> {
            secret
                .get(key)
                .map(|bytes| {
                    String::from_utf8(bytes.to_owned())
                        .map(|s| s.trim().to_string())
                        .context(error::ConversionSnafu { what: key })
                })
                .transpose()
        };
        Ok(Self {
            access_key_id: value(ACCESS_KEY_ID)?.context(error::SecretMissingSnafu {
                what: ACCESS_KEY_ID,
                directory: reader.dir(),
            })?,
            secret_access_key: value(SECRET_ACCESS_KEY)?.context(error::SecretMissingSnafu {
                what: SECRET_ACCESS_KEY,
                directory: reader.dir(),
            })?,
            session_token: value(SESSION_TOKEN)?,
        })
    }
}
