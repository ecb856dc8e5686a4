//! Sync configuration
//!
use std::fs;
use std::path::Path;
use std::{collections::HashMap, fmt::Display};

use anyhow::{anyhow, Context, Result};

use serde::{Deserialize, Serialize};
use yaml_peg::serde as yaml;

use crate::logging::debug;

/// The user-defined namespace corresponding to the connector.
#[derive(Clone, Deserialize, Debug, Hash, PartialEq, Eq, Default, PartialOrd, Ord, Serialize)]
pub struct ConnectorNamespace(pub String);

impl Display for ConnectorNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Struct representing the sync_config.yaml file.
#[derive(Deserialize, Serialize, Debug, Default, Clone)]
pub struct SyncConfig {
    version: String,
    name: String,
    /// All connector configs defined.
    pub connectors: HashMap<ConnectorNamespace, ConnectorConfig>,
}

impl SyncConfig {
    /// New === default for this simple constructor.
    pub fn new() -> Self {
        Self {
            version: "0.0.1".to_owned(),
            ..Default::default()
        }
    }

    /// Read and parse the config at `path`.
    pub fn read_from_file<P: AsRef<Path>>(path: P) -> Result<SyncConfig> {
        let config_raw = fs::read_to_string(&path).context("Reading file")?;
        let mut config =
            yaml::from_str::<SyncConfig>(&config_raw).context("Deserializing config")?;

        config
            .pop()
            .ok_or_else(|| anyhow!["config file contained no documents"])
    }

    /// Set the project name.
    pub fn set_name(&mut self, name: String) {
        self.name = name;
    }

    /// Get the name
    pub fn get_name(&self) -> String {
        self.name.to_owned()
    }

    /// Get the config for a connector namespace.
    pub fn connector(&self, namespace: &str) -> Result<&ConnectorConfig> {
        self.connectors
            .get(&ConnectorNamespace(namespace.to_owned()))
            .ok_or_else(|| anyhow!["no connector configured for namespace {namespace}"])
    }

    /// Convert this config to a yaml string.
    pub fn to_yaml(&self) -> Result<String> {
        yaml::to_string(self).map_err(anyhow::Error::from)
    }
}

/// Config for a single connector.
#[derive(Clone, Deserialize, Serialize, Default, Debug)]
pub struct ConnectorConfig {
    /// The connector type
    #[serde(rename = "type")]
    pub connector_type: String,
    /// Additional configuration, specific to the connector
    #[serde(flatten)]
    pub config: HashMap<String, String>,
}

impl ConnectorConfig {
    /// Basic constructor
    pub fn new(connector_type: String, config: HashMap<String, String>) -> Self {
        Self {
            connector_type,
            config,
        }
    }
}

/// Alias for HashMap to hold credentials information.
pub type CredentialsMap = HashMap<String, String>;

/// Fetch the credentials for every connector namespace from `path`.
pub fn fetch_credentials<P: AsRef<Path>>(path: P) -> Result<HashMap<String, CredentialsMap>> {
    debug!("Trying to read credentials from {:?}", path.as_ref());
    let credentials_raw = fs::read_to_string(path).context("Reading credentials file")?;
    let mut config = yaml::from_str::<HashMap<String, CredentialsMap>>(&credentials_raw)
        .context("Deserializing credentials")?;

    config
        .pop()
        .ok_or_else(|| anyhow!["failed to generate credentials"])
}
