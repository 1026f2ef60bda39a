/*
 * SPDX-FileCopyrightText: Copyright (c) 2026 NVIDIA CORPORATION & AFFILIATES. All rights reserved.
 * SPDX-License-Identifier: Apache-2.0
 *
 * Licensed under the Apache License, Version 2.0 (the "License");
 * you may not use this file except in compliance with the License.
 * You may obtain a copy of the License at
 *
 * http://www.apache.org/licenses/LICENSE-2.0
 *
 * Unless required by applicable law or agreed to in writing, software
 * distributed under the License is distributed on an "AS IS" BASIS,
 * WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 * See the License for the specific language governing permissions and
 * limitations under the License.
 */

// src/config/mod.rs
// Binder configuration, loaded from a TOML file with one table per
// collaborator:
//
//   [ufm]
//   endpoint = "https://ufm.example.com"
//   username = "admin"
//   password = "s3cret"
//   verify_ca = "/etc/ssl/ufm-ca.pem"
//
//   [ironic]
//   endpoint = "http://ironic.example.com:6385/"
//   auth_strategy = "noauth"
//
//   [binding]
//   enable_sriov = true
//   default_limited_pkeys = ["0x10", "0x11"]
//   physical_networks = ["*"]
//
// Every option has a default, so an empty file is a valid config.
// Values that need resolving (verify_ca, partition keys, the Ironic
// auth token) are checked when the file is loaded.

pub mod error;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::binding::port::NetworkType;
use crate::config::error::{ConfigError, ConfigResult};
use crate::eligibility::filter::{
    PHYSICAL_NETWORK_ANY, PhysicalNetworks, SUPPORTED_NETWORK_TYPES, SegmentFilter,
};
use crate::ufm::pkey::PartitionKey;

pub const DEFAULT_UFM_ENDPOINT: &str = "http://127.0.0.1";
pub const DEFAULT_UFM_TIMEOUT_SECS: u64 = 10;
pub const DEFAULT_VERIFY_CA: &str = "True";
pub const DEFAULT_IRONIC_ENDPOINT: &str = "http://localhost:6385/";
pub const DEFAULT_IRONIC_API_VERSION: &str = "latest";
pub const DEFAULT_IRONIC_RETRY_INTERVAL_SECS: u64 = 2;
pub const DEFAULT_IRONIC_MAX_RETRIES: u32 = 30;
pub const DEFAULT_IRONIC_TIMEOUT_SECS: u64 = 10;

const TRUE_STRINGS: [&str; 6] = ["1", "t", "true", "on", "y", "yes"];
const FALSE_STRINGS: [&str; 6] = ["0", "f", "false", "off", "n", "no"];

// BinderConfig is the whole configuration file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BinderConfig {
    pub ufm: UfmConfig,
    pub ironic: IronicConfig,
    pub binding: BindingConfig,
}

impl BinderConfig {
    // from_file reads and validates a BinderConfig from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|error| ConfigError::Io {
            path: path.to_path_buf(),
            error,
        })?;
        let config = Self::from_toml(&content)?;
        tracing::info!(path = %path.display(), "Loaded binder configuration");
        Ok(config)
    }

    // from_toml parses and validates a BinderConfig from a TOML string.
    pub fn from_toml(toml_str: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    // validate resolves every option that needs it, so bad values
    // surface at load time instead of on the first port event.
    pub fn validate(&self) -> ConfigResult<()> {
        self.ufm.verify_ca()?;
        self.ironic.auth()?;
        self.binding.limited_pkeys()?;
        self.binding.network_types()?;
        Ok(())
    }
}

// VerifyCa is the resolved TLS verification setting for UFM.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerifyCa {
    // System verifies against the built-in root certificates.
    System,
    // Disabled accepts any certificate.
    Disabled,
    // CaPath verifies against a CA bundle file, or the certificates
    // in a directory.
    CaPath(PathBuf),
}

impl VerifyCa {
    // parse resolves a verify_ca value: an existing path wins,
    // otherwise the value must be a strict boolean string.
    pub fn parse(value: &str) -> ConfigResult<Self> {
        let path = Path::new(value);
        if !value.is_empty() && path.exists() {
            return Ok(VerifyCa::CaPath(path.to_path_buf()));
        }
        match parse_strict_bool(value) {
            Some(true) => Ok(VerifyCa::System),
            Some(false) => Ok(VerifyCa::Disabled),
            None => Err(ConfigError::invalid_value(
                "[ufm]/verify_ca",
                value,
                "The value should be a Boolean or a path to a ca file/directory.",
            )),
        }
    }
}

// parse_strict_bool accepts the usual boolean spellings, ignoring
// case, and nothing else.
pub fn parse_strict_bool(value: &str) -> Option<bool> {
    let lowered = value.trim().to_lowercase();
    if TRUE_STRINGS.contains(&lowered.as_str()) {
        Some(true)
    } else if FALSE_STRINGS.contains(&lowered.as_str()) {
        Some(false)
    } else {
        None
    }
}

fn default_ufm_endpoint() -> String {
    DEFAULT_UFM_ENDPOINT.to_string()
}

fn default_verify_ca() -> String {
    DEFAULT_VERIFY_CA.to_string()
}

fn default_ufm_timeout() -> u64 {
    DEFAULT_UFM_TIMEOUT_SECS
}

// UfmConfig is the [ufm] table.
#[derive(Clone, Serialize, Deserialize)]
pub struct UfmConfig {
    #[serde(default = "default_ufm_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    // verify_ca is kept raw and resolved with verify_ca(), since
    // whether it names a path depends on the filesystem.
    #[serde(default = "default_verify_ca")]
    pub verify_ca: String,
    #[serde(default = "default_ufm_timeout")]
    pub timeout: u64,
}

impl std::fmt::Debug for UfmConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UfmConfig")
            .field("endpoint", &self.endpoint)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("verify_ca", &self.verify_ca)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for UfmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ufm_endpoint(),
            username: None,
            password: None,
            verify_ca: default_verify_ca(),
            timeout: DEFAULT_UFM_TIMEOUT_SECS,
        }
    }
}

impl UfmConfig {
    pub fn verify_ca(&self) -> ConfigResult<VerifyCa> {
        VerifyCa::parse(&self.verify_ca)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

// AuthStrategy is how the binder authenticates to Ironic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthStrategy {
    // Noauth talks to a standalone Ironic without authentication.
    #[default]
    Noauth,
    // Token sends a pre-issued token in X-Auth-Token.
    Token,
}

// IronicAuth is the resolved Ironic authentication.
#[derive(Clone, PartialEq, Eq)]
pub enum IronicAuth {
    Noauth,
    Token(String),
}

impl std::fmt::Debug for IronicAuth {
    // fmt never prints the token itself.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IronicAuth::Noauth => write!(f, "Noauth"),
            IronicAuth::Token(_) => write!(f, "Token(<redacted>)"),
        }
    }
}

fn default_ironic_endpoint() -> String {
    DEFAULT_IRONIC_ENDPOINT.to_string()
}

fn default_ironic_api_version() -> String {
    DEFAULT_IRONIC_API_VERSION.to_string()
}

fn default_retry_interval() -> u64 {
    DEFAULT_IRONIC_RETRY_INTERVAL_SECS
}

fn default_max_retries() -> u32 {
    DEFAULT_IRONIC_MAX_RETRIES
}

fn default_ironic_timeout() -> u64 {
    DEFAULT_IRONIC_TIMEOUT_SECS
}

// IronicConfig is the [ironic] table.
#[derive(Clone, Serialize, Deserialize)]
pub struct IronicConfig {
    #[serde(default = "default_ironic_endpoint")]
    pub endpoint: String,
    #[serde(default)]
    pub auth_strategy: AuthStrategy,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default = "default_ironic_api_version")]
    pub api_version: String,
    // retry_interval is the wait between retries of a request
    // Ironic rejected with 409 Conflict.
    #[serde(default = "default_retry_interval")]
    pub retry_interval: u64,
    // max_retries bounds those retries.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    #[serde(default = "default_ironic_timeout")]
    pub timeout: u64,
}

impl std::fmt::Debug for IronicConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IronicConfig")
            .field("endpoint", &self.endpoint)
            .field("auth_strategy", &self.auth_strategy)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("api_version", &self.api_version)
            .field("retry_interval", &self.retry_interval)
            .field("max_retries", &self.max_retries)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for IronicConfig {
    fn default() -> Self {
        Self {
            endpoint: default_ironic_endpoint(),
            auth_strategy: AuthStrategy::default(),
            token: None,
            api_version: default_ironic_api_version(),
            retry_interval: DEFAULT_IRONIC_RETRY_INTERVAL_SECS,
            max_retries: DEFAULT_IRONIC_MAX_RETRIES,
            timeout: DEFAULT_IRONIC_TIMEOUT_SECS,
        }
    }
}

impl IronicConfig {
    // auth resolves the auth strategy; the token strategy needs a
    // non-empty token.
    pub fn auth(&self) -> ConfigResult<IronicAuth> {
        match self.auth_strategy {
            AuthStrategy::Noauth => Ok(IronicAuth::Noauth),
            AuthStrategy::Token => match self.token.as_deref() {
                Some(token) if !token.is_empty() => Ok(IronicAuth::Token(token.to_string())),
                _ => Err(ConfigError::invalid_value(
                    "[ironic]/token",
                    "",
                    "A token is required when auth_strategy is \"token\".",
                )),
            },
        }
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(self.retry_interval)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

fn default_physical_networks() -> Vec<String> {
    vec![PHYSICAL_NETWORK_ANY.to_string()]
}

fn default_network_types() -> Vec<String> {
    SUPPORTED_NETWORK_TYPES.iter().map(NetworkType::to_string).collect()
}

// BindingConfig is the [binding] table: what the binder manages and
// which limited partition keys every bound port also joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BindingConfig {
    #[serde(default)]
    pub enable_sriov: bool,
    #[serde(default)]
    pub default_limited_pkeys: Vec<String>,
    #[serde(default = "default_physical_networks")]
    pub physical_networks: Vec<String>,
    // network_types is kept raw and resolved with network_types(), so
    // a misspelled type is reported instead of matching nothing.
    #[serde(default = "default_network_types")]
    pub network_types: Vec<String>,
}

impl Default for BindingConfig {
    fn default() -> Self {
        Self {
            enable_sriov: false,
            default_limited_pkeys: Vec::new(),
            physical_networks: default_physical_networks(),
            network_types: default_network_types(),
        }
    }
}

impl BindingConfig {
    // limited_pkeys parses default_limited_pkeys, keeping their order.
    pub fn limited_pkeys(&self) -> ConfigResult<Vec<PartitionKey>> {
        self.default_limited_pkeys
            .iter()
            .map(|raw| {
                raw.parse::<PartitionKey>().map_err(|e| {
                    ConfigError::invalid_value(
                        "[binding]/default_limited_pkeys",
                        raw,
                        e.to_string(),
                    )
                })
            })
            .collect()
    }

    // network_types parses the configured network types. Only the
    // types a partition key can be derived from are accepted, and at
    // least one is required.
    pub fn network_types(&self) -> ConfigResult<Vec<NetworkType>> {
        const OPTION: &str = "[binding]/network_types";
        let supported = SUPPORTED_NETWORK_TYPES
            .iter()
            .map(NetworkType::to_string)
            .collect::<Vec<_>>()
            .join(", ");
        if self.network_types.is_empty() {
            return Err(ConfigError::invalid_value(
                OPTION,
                "[]",
                format!("At least one network type is required. Supported types: {supported}."),
            ));
        }

        self.network_types
            .iter()
            .map(|raw| {
                raw.parse::<NetworkType>()
                    .ok()
                    .filter(|network_type| SUPPORTED_NETWORK_TYPES.contains(network_type))
                    .ok_or_else(|| {
                        ConfigError::invalid_value(
                            OPTION,
                            raw,
                            format!("Supported types: {supported}."),
                        )
                    })
            })
            .collect()
    }

    pub fn segment_filter(&self) -> ConfigResult<SegmentFilter> {
        Ok(SegmentFilter::new(
            self.network_types()?,
            PhysicalNetworks::from(self.physical_networks.clone()),
        ))
    }
}
