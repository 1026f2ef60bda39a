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

// src/inventory/ironic.rs
// InventoryApi is what the binder needs to know about a node's ports,
// and IronicClient answers it from the Ironic v1 REST API. Requests
// Ironic rejects with 409 Conflict (usually a locked node) are retried
// at a fixed interval.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response};
use tryhard::RetryPolicy;
use url::Url;
use uuid::Uuid;

use crate::config::{IronicAuth, IronicConfig};
use crate::inventory::error::{InventoryError, InventoryResult};
use crate::inventory::port::{InventoryPort, PatchOperation, PortCollection};

const API_VERSION_HEADER: &str = "X-OpenStack-Ironic-API-Version";
const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

// InventoryApi resolves the Ironic ports behind a bare-metal node.
#[async_trait]
pub trait InventoryApi: Send + Sync {
    // list_node_ports returns every port of a node.
    async fn list_node_ports(&self, node_id: &str) -> InventoryResult<Vec<InventoryPort>>;

    // find_port_by_mac returns the port with the given address.
    async fn find_port_by_mac(&self, mac: &str) -> InventoryResult<InventoryPort>;

    // update_port_extra applies a JSON patch to a port.
    async fn update_port_extra(
        &self,
        port_id: Uuid,
        patch: Vec<PatchOperation>,
    ) -> InventoryResult<InventoryPort>;
}

// IronicClient is the REST implementation of InventoryApi.
#[derive(Debug, Clone)]
pub struct IronicClient {
    http: reqwest::Client,
    base_url: Url,
    auth: IronicAuth,
    api_version: String,
    max_retries: u32,
    retry_interval: Duration,
}

impl IronicClient {
    pub fn new(
        endpoint: &str,
        auth: IronicAuth,
        api_version: impl Into<String>,
        timeout: Duration,
    ) -> InventoryResult<Self> {
        let setup_error = |error: String| InventoryError::Unavailable {
            url: endpoint.to_string(),
            error,
        };
        let mut base_url =
            Url::parse(endpoint).map_err(|e| setup_error(format!("invalid endpoint: {e}")))?;
        // Url::join replaces the last path segment unless the path
        // ends with a slash.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ib-partition-binder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| setup_error(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            auth,
            api_version: api_version.into(),
            max_retries: 0,
            retry_interval: Duration::ZERO,
        })
    }

    // with_conflict_retries sets how often, and how far apart, a
    // request answered with 409 Conflict is retried.
    pub fn with_conflict_retries(mut self, max_retries: u32, retry_interval: Duration) -> Self {
        self.max_retries = max_retries;
        self.retry_interval = retry_interval;
        self
    }

    // from_config builds a client from the [ironic] table.
    pub fn from_config(config: &IronicConfig) -> InventoryResult<Self> {
        let auth = config.auth().map_err(|e| InventoryError::Unavailable {
            url: config.endpoint.clone(),
            error: e.to_string(),
        })?;
        Ok(Self::new(&config.endpoint, auth, &config.api_version, config.timeout())?
            .with_conflict_retries(config.max_retries, config.retry_interval()))
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> InventoryResult<Url> {
        let mut url = self
            .base_url
            .join(path)
            .map_err(|e| InventoryError::Unavailable {
                url: format!("{}{path}", self.base_url),
                error: e.to_string(),
            })?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }

    // send_once issues a single request and classifies its status.
    async fn send_once(
        &self,
        method: &Method,
        url: &Url,
        patch: Option<&[PatchOperation]>,
    ) -> InventoryResult<Response> {
        let mut request = self
            .http
            .request(method.clone(), url.clone())
            .header(API_VERSION_HEADER, &self.api_version);
        if let IronicAuth::Token(token) = &self.auth {
            request = request.header(AUTH_TOKEN_HEADER, token);
        }
        if let Some(patch) = patch {
            request = request.json(patch);
        }

        let response = request
            .send()
            .await
            .map_err(|e| InventoryError::Unavailable {
                url: url.to_string(),
                error: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(InventoryError::from_status(url.as_str(), status.as_u16(), body));
        }
        Ok(response)
    }

    // send retries send_once while Ironic answers 409 Conflict.
    async fn send(
        &self,
        method: Method,
        url: Url,
        patch: Option<&[PatchOperation]>,
    ) -> InventoryResult<Response> {
        let retry_interval = self.retry_interval;
        tryhard::retry_fn(|| self.send_once(&method, &url, patch))
            .retries(self.max_retries)
            .custom_backoff(|attempt, error: &InventoryError| {
                if error.is_conflict() {
                    tracing::info!(
                        attempt,
                        error = %error,
                        "Ironic request conflicted, retrying in {} seconds",
                        retry_interval.as_secs()
                    );
                    RetryPolicy::Delay(retry_interval)
                } else {
                    RetryPolicy::Break
                }
            })
            .await
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> InventoryResult<T> {
        let url = response.url().to_string();
        response
            .json::<T>()
            .await
            .map_err(|e| InventoryError::InvalidResponse {
                url,
                error: e.to_string(),
            })
    }
}

#[async_trait]
impl InventoryApi for IronicClient {
    async fn list_node_ports(&self, node_id: &str) -> InventoryResult<Vec<InventoryPort>> {
        let url = self.url("v1/ports/detail", &[("node", node_id)])?;
        let response = self.send(Method::GET, url, None).await?;
        let collection: PortCollection = Self::decode(response).await?;
        tracing::debug!(node = %node_id, count = collection.ports.len(), "Listed Ironic node ports");
        Ok(collection.ports)
    }

    async fn find_port_by_mac(&self, mac: &str) -> InventoryResult<InventoryPort> {
        let url = self.url("v1/ports/detail", &[("address", mac)])?;
        let response = self.send(Method::GET, url, None).await?;
        let collection: PortCollection = Self::decode(response).await?;
        collection
            .ports
            .into_iter()
            .next()
            .ok_or_else(|| InventoryError::NotFound(format!("port with address {mac}")))
    }

    async fn update_port_extra(
        &self,
        port_id: Uuid,
        patch: Vec<PatchOperation>,
    ) -> InventoryResult<InventoryPort> {
        let url = self.url(&format!("v1/ports/{port_id}"), &[])?;
        let response = self.send(Method::PATCH, url, Some(&patch)).await?;
        let port = Self::decode(response).await?;
        tracing::info!(port = %port_id, "Updated Ironic port extra");
        Ok(port)
    }
}
