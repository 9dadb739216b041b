use crate::error::{Error, Result};
use base64::{Engine as _, engine::general_purpose::STANDARD_NO_PAD};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

/// Body of `POST /api/auth`. Not `Debug`: it carries the password.
#[derive(Serialize, Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub jwt: Option<String>,
}

/// Error body Portainer attaches to non-2xx responses.
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default, deserialize_with = "null_as_default")]
    pub message: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub details: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

// ---------------------------------------------------------------------------
// Swarm configs  (proxied docker API)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DockerConfig {
    #[serde(rename = "ID")]
    pub id: String,
    #[serde(default)]
    pub version: ObjectVersion,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub spec: ConfigSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectVersion {
    #[serde(default)]
    pub index: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ConfigSpec {
    #[serde(default)]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateConfigBody {
    pub name: String,
    pub data: String,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl CreateConfigBody {
    pub fn new(name: &str, content: &[u8], labels: BTreeMap<String, String>) -> Self {
        Self {
            name: name.to_string(),
            data: encode_config_data(content),
            labels,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigCreated {
    #[serde(rename = "ID")]
    pub id: String,
    /// HTTP status of the create call; not part of the body.
    #[serde(skip)]
    pub status: u16,
}

// ---------------------------------------------------------------------------
// Stacks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct DeployNewStackInformation {
    #[serde(rename = "Env")]
    pub env: Vec<EnvVar>,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "StackFileContent")]
    pub stack_file_content: String,
    #[serde(rename = "SwarmID")]
    pub swarm_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateStackInfo {
    #[serde(rename = "Env")]
    pub env: Vec<EnvVar>,
    #[serde(rename = "StackFileContent")]
    pub stack_file_content: String,
    #[serde(rename = "Prune")]
    pub prune: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StackDeployFeedback {
    #[serde(rename = "Id")]
    pub id: i64,
    #[serde(rename = "Name", default)]
    pub name: String,
    #[serde(rename = "Type", default)]
    pub stack_type: i64,
    #[serde(rename = "EndpointId", default)]
    pub endpoint_id: i64,
    #[serde(rename = "SwarmId", default, deserialize_with = "null_as_default")]
    pub swarm_id: String,
    #[serde(rename = "EntryPoint", default, deserialize_with = "null_as_default")]
    pub entry_point: String,
    #[serde(rename = "Env", default, deserialize_with = "null_as_default")]
    pub env: Vec<EnvVar>,
    #[serde(rename = "ProjectPath", default, deserialize_with = "null_as_default")]
    pub project_path: String,
}

/// Everything `stack deploy` needs to either create or update a stack.
#[derive(Debug, Clone)]
pub struct StackDeployRequest {
    pub name: String,
    pub swarm_id: String,
    pub endpoint: String,
    pub compose: String,
    pub env: Vec<EnvVar>,
    pub prune: bool,
}

impl StackDeployRequest {
    pub fn deploy_info(&self) -> DeployNewStackInformation {
        DeployNewStackInformation {
            env: self.env.clone(),
            name: self.name.clone(),
            stack_file_content: self.compose.clone(),
            swarm_id: self.swarm_id.clone(),
        }
    }

    pub fn update_info(&self) -> UpdateStackInfo {
        UpdateStackInfo {
            env: self.env.clone(),
            stack_file_content: self.compose.clone(),
            prune: self.prune,
        }
    }
}

/// Last stack whose name matches exactly; duplicates are not an error.
pub fn find_stack_id(stacks: &[StackDeployFeedback], name: &str) -> Option<i64> {
    stacks.iter().rev().find(|s| s.name == name).map(|s| s.id)
}

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

pub const AUTH_PATH: &str = "/api/auth";
pub const STACKS_PATH: &str = "/api/stacks";

pub fn api_url(base: &str, endpoint: &str) -> Result<String> {
    let base = base.trim().trim_end_matches('/');
    if base.is_empty() {
        return Err(Error::Validation("portainer URL is empty".to_string()));
    }
    let endpoint = endpoint.trim_start_matches('/');
    Ok(format!("{base}/{endpoint}"))
}

pub fn configs_path(endpoint: &str) -> String {
    format!("/api/endpoints/{endpoint}/docker/configs")
}

pub fn config_create_path(endpoint: &str) -> String {
    format!("/api/endpoints/{endpoint}/docker/configs/create")
}

pub fn config_path(endpoint: &str, id: &str) -> String {
    format!("/api/endpoints/{endpoint}/docker/configs/{id}")
}

pub fn deploy_stack_path(endpoint: &str) -> String {
    format!("/api/stacks?endpointId={endpoint}&method=string&type=1")
}

/// Portainer expects `methode` (sic) on this route; the spelling is part of
/// the wire contract.
pub fn update_stack_path(id: i64, endpoint: &str) -> String {
    format!("/api/stacks/{id}?endpointId={endpoint}&methode=string&type=1")
}

// ---------------------------------------------------------------------------
// Input helpers
// ---------------------------------------------------------------------------

/// Raw standard base64, no `=` padding.
pub fn encode_config_data(content: &[u8]) -> String {
    STANDARD_NO_PAD.encode(content)
}

/// Splits `key=value` at the first `=`; the value may contain further `=`.
pub fn parse_key_value(arg: &str, kind: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(Error::Validation(format!(
            "{kind} have to be key=value, got '{arg}'"
        ))),
    }
}

pub fn parse_labels(args: &[String]) -> Result<BTreeMap<String, String>> {
    let mut labels = BTreeMap::new();
    for arg in args {
        let (key, value) = parse_key_value(arg, "labels")?;
        labels.insert(key, value);
    }
    Ok(labels)
}

pub fn parse_env_vars(args: &[String]) -> Result<Vec<EnvVar>> {
    args.iter()
        .map(|arg| {
            parse_key_value(arg, "env vars").map(|(name, value)| EnvVar { name, value })
        })
        .collect()
}

pub fn validate_endpoint_id(endpoint: &str) -> Result<()> {
    if endpoint.is_empty() {
        return Err(Error::Validation("endpoint id cannot be empty".to_string()));
    }
    if !endpoint.bytes().all(|b| b.is_ascii_digit()) {
        return Err(Error::Validation(format!(
            "endpoint id must be numeric, got '{endpoint}'"
        )));
    }
    Ok(())
}

pub fn validate_config_id(id: &str) -> Result<()> {
    if id.trim().is_empty() {
        return Err(Error::Validation("config id cannot be empty".to_string()));
    }
    if id.contains('/') || id.contains('?') || id.contains('#') {
        return Err(Error::Validation(format!("invalid config id '{id}'")));
    }
    Ok(())
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
