//! Credential sources and parsed credential material
//!
//! Three ways to authenticate:
//! 1. Application Default Credentials (ambient discovery by the client library)
//! 2. Credential JSON content (inline bytes)
//! 3. Credential JSON file (explicit path, read once)
//!
//! The JSON may be a service-account key (`"type": "service_account"`) or a
//! user credential (`"type": "authorized_user"`, as written by
//! `gcloud auth application-default login`). Inline bytes and file contents
//! go through the same parser, so a file and the bytes it contains always
//! yield identical [`Credentials`].

use crate::error::WarehouseError;
use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Where credentials come from
#[derive(Clone, PartialEq, Eq)]
pub enum CredentialSource {
    ApplicationDefault,
    Json(Vec<u8>),
    File(PathBuf),
}

impl CredentialSource {
    /// Load and parse the material this source points at
    pub fn resolve(&self) -> Result<Credentials, WarehouseError> {
        match self {
            Self::ApplicationDefault => Ok(Credentials::ApplicationDefault),
            Self::Json(bytes) => Credentials::from_json(bytes),
            Self::File(path) => Credentials::from_json(&read_credentials(path)?),
        }
    }
}

impl std::fmt::Debug for CredentialSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ApplicationDefault => write!(f, "ApplicationDefault"),
            Self::Json(bytes) => write!(f, "Json(<{} bytes>)", bytes.len()),
            Self::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}

/// Read a credential file in full
///
/// The file handle is dropped on every path out of this function, including
/// a failed read.
pub fn read_credentials(path: &Path) -> Result<Vec<u8>, WarehouseError> {
    let mut file = std::fs::File::open(path).map_err(|e| {
        WarehouseError::Io(format!("cannot open credentials file '{}': {}", path.display(), e))
    })?;

    let mut data = Vec::new();
    file.read_to_end(&mut data).map_err(|e| {
        WarehouseError::Io(format!("cannot read credentials file '{}': {}", path.display(), e))
    })?;

    Ok(data)
}

/// Credentials handed to a connector
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    ApplicationDefault,
    ServiceAccount(ServiceAccountCredentials),
    AuthorizedUser(AuthorizedUserCredentials),
}

impl Credentials {
    /// Parse credential JSON, dispatching on its `type`
    ///
    /// A document without `type` is treated as a service-account key.
    pub fn from_json(bytes: &[u8]) -> Result<Self, WarehouseError> {
        let fields = KeyFields::parse(bytes)?;
        match fields.key_type.as_deref() {
            None | Some(SERVICE_ACCOUNT) => {
                ServiceAccountCredentials::from_fields(bytes, fields).map(Self::ServiceAccount)
            }
            Some(AUTHORIZED_USER) => {
                AuthorizedUserCredentials::from_fields(bytes, fields).map(Self::AuthorizedUser)
            }
            Some(other) => Err(WarehouseError::CredentialParse(format!(
                "unsupported credential type '{}', expected '{}' or '{}'",
                other, SERVICE_ACCOUNT, AUTHORIZED_USER
            ))),
        }
    }

    /// Short label for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ApplicationDefault => "application_default",
            Self::ServiceAccount(_) => SERVICE_ACCOUNT,
            Self::AuthorizedUser(_) => AUTHORIZED_USER,
        }
    }
}

const SERVICE_ACCOUNT: &str = "service_account";
const AUTHORIZED_USER: &str = "authorized_user";

#[derive(Deserialize)]
struct KeyFields {
    #[serde(rename = "type")]
    key_type: Option<String>,
    project_id: Option<String>,
    private_key_id: Option<String>,
    #[serde(default)]
    private_key: String,
    #[serde(default)]
    client_email: String,
    #[serde(default)]
    client_id: String,
    #[serde(default)]
    client_secret: String,
    #[serde(default)]
    refresh_token: String,
    quota_project_id: Option<String>,
}

impl KeyFields {
    fn parse(bytes: &[u8]) -> Result<Self, WarehouseError> {
        serde_json::from_slice(bytes).map_err(|e| {
            WarehouseError::CredentialParse(format!("Failed to parse credentials JSON: {}", e))
        })
    }
}

fn require(value: &str, field: &str, kind: &str) -> Result<(), WarehouseError> {
    if value.trim().is_empty() {
        return Err(WarehouseError::CredentialParse(format!(
            "{} credentials have no {}",
            kind, field
        )));
    }
    Ok(())
}

/// A validated Google service-account key
///
/// Keeps the original JSON so the connector can hand it to the auth library
/// untouched. `Debug` never prints the key.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountCredentials {
    raw: Vec<u8>,
    client_email: String,
    project_id: Option<String>,
    private_key_id: Option<String>,
}

impl ServiceAccountCredentials {
    /// Parse service-account JSON
    ///
    /// Rejects anything that is not JSON, documents whose `type` is present
    /// and not `service_account`, and keys missing `client_email` or
    /// `private_key`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, WarehouseError> {
        let fields = KeyFields::parse(bytes)?;

        if let Some(key_type) = fields.key_type.as_deref() {
            if key_type != SERVICE_ACCOUNT {
                return Err(WarehouseError::CredentialParse(format!(
                    "unsupported credential type '{}', expected '{}'",
                    key_type, SERVICE_ACCOUNT
                )));
            }
        }

        Self::from_fields(bytes, fields)
    }

    fn from_fields(bytes: &[u8], fields: KeyFields) -> Result<Self, WarehouseError> {
        require(&fields.client_email, "client_email", SERVICE_ACCOUNT)?;
        require(&fields.private_key, "private_key", SERVICE_ACCOUNT)?;

        Ok(Self {
            raw: bytes.to_vec(),
            client_email: fields.client_email,
            project_id: fields.project_id,
            private_key_id: fields.private_key_id,
        })
    }

    /// The key document exactly as supplied
    pub fn as_json(&self) -> &[u8] {
        &self.raw
    }

    pub fn client_email(&self) -> &str {
        &self.client_email
    }

    /// Project the key was issued in, which may differ from the billing
    /// project queries run under
    pub fn project_id(&self) -> Option<&str> {
        self.project_id.as_deref()
    }

    pub fn private_key_id(&self) -> Option<&str> {
        self.private_key_id.as_deref()
    }
}

impl std::fmt::Debug for ServiceAccountCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountCredentials")
            .field("client_email", &self.client_email)
            .field("project_id", &self.project_id)
            .field("private_key_id", &self.private_key_id)
            .finish_non_exhaustive()
    }
}

/// A Google user credential holding an OAuth refresh token
///
/// `Debug` never prints the client secret or the refresh token.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizedUserCredentials {
    raw: Vec<u8>,
    client_id: String,
    quota_project_id: Option<String>,
}

impl AuthorizedUserCredentials {
    fn from_fields(bytes: &[u8], fields: KeyFields) -> Result<Self, WarehouseError> {
        require(&fields.client_id, "client_id", AUTHORIZED_USER)?;
        require(&fields.client_secret, "client_secret", AUTHORIZED_USER)?;
        require(&fields.refresh_token, "refresh_token", AUTHORIZED_USER)?;

        Ok(Self {
            raw: bytes.to_vec(),
            client_id: fields.client_id,
            quota_project_id: fields.quota_project_id,
        })
    }

    /// The credential document exactly as supplied
    pub fn as_json(&self) -> &[u8] {
        &self.raw
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn quota_project_id(&self) -> Option<&str> {
        self.quota_project_id.as_deref()
    }
}

impl std::fmt::Debug for AuthorizedUserCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizedUserCredentials")
            .field("client_id", &self.client_id)
            .field("quota_project_id", &self.quota_project_id)
            .finish_non_exhaustive()
    }
}
