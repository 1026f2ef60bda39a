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

// src/ufm/client.rs
// PartitionApi is the partition key surface the binder needs from a
// fabric manager, and UfmClient implements it over the UFM REST API
// rooted at <endpoint>/ufmRest.

use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Certificate, Method, Response};
use url::Url;

use crate::config::{UfmConfig, VerifyCa};
use crate::identity::guid::Guid;
use crate::ufm::error::{UfmError, UfmResult};
use crate::ufm::pkey::{
    MemberOptions, PKey, PKeyBody, PKeyMembersRequest, PartitionKey, pkeys_from_listing,
};

const UFM_REST_ROOT: &str = "ufmRest";
const PKEYS_PATH: &str = "/resources/pkeys";

// PartitionApi is the set of partition key operations the binder
// uses. UFM creates a key on its first member add and deletes it once
// its last member is removed.
#[async_trait]
pub trait PartitionApi: Send + Sync {
    // list returns every partition key, with members when with_guids
    // is set.
    async fn list(&self, with_guids: bool) -> UfmResult<Vec<PKey>>;

    // get returns a single partition key.
    async fn get(&self, pkey: PartitionKey, with_guids: bool) -> UfmResult<PKey>;

    // add_members adds GUIDs to a partition key, creating it if needed.
    async fn add_members(
        &self,
        pkey: PartitionKey,
        guids: &[Guid],
        options: MemberOptions,
    ) -> UfmResult<()>;

    // remove_members removes GUIDs from a partition key. Fails with
    // UfmError::NotFound when the key or members are already gone.
    async fn remove_members(&self, pkey: PartitionKey, guids: &[Guid]) -> UfmResult<()>;

    // delete removes a partition key outright.
    async fn delete(&self, pkey: PartitionKey) -> UfmResult<()>;

    // replace overwrites a partition key's member list.
    async fn replace(
        &self,
        pkey: PartitionKey,
        guids: &[Guid],
        options: MemberOptions,
    ) -> UfmResult<()>;
}

// UfmClient talks to UFM with basic auth and a fixed per-request
// timeout.
#[derive(Clone)]
pub struct UfmClient {
    http: reqwest::Client,
    base_url: String,
    username: Option<String>,
    password: Option<String>,
}

impl std::fmt::Debug for UfmClient {
    // fmt never prints the password itself.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UfmClient")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl UfmClient {
    // new builds a client for the UFM at endpoint.
    pub fn new(
        endpoint: &str,
        username: Option<String>,
        password: Option<String>,
        verify_ca: &VerifyCa,
        timeout: Duration,
    ) -> UfmResult<Self> {
        let parsed = Url::parse(endpoint)
            .map_err(|e| UfmError::ClientSetup(format!("Invalid UFM endpoint {endpoint}: {e}")))?;
        let base_url = format!("{}/{UFM_REST_ROOT}", parsed.as_str().trim_end_matches('/'));

        let mut builder = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("ib-partition-binder/", env!("CARGO_PKG_VERSION")));
        builder = match verify_ca {
            VerifyCa::System => builder,
            VerifyCa::Disabled => {
                tracing::warn!(endpoint = %endpoint, "UFM certificate verification is disabled");
                builder.danger_accept_invalid_certs(true)
            }
            VerifyCa::CaPath(path) => {
                for cert in load_ca_certificates(path)? {
                    builder = builder.add_root_certificate(cert);
                }
                builder
            }
        };

        let http = builder
            .build()
            .map_err(|e| UfmError::ClientSetup(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url,
            username,
            password,
        })
    }

    // from_config builds a client from the [ufm] table.
    pub fn from_config(config: &UfmConfig) -> UfmResult<Self> {
        let verify_ca = config
            .verify_ca()
            .map_err(|e| UfmError::ClientSetup(e.to_string()))?;
        Self::new(
            &config.endpoint,
            config.username.clone(),
            config.password.clone(),
            &verify_ca,
            config.timeout(),
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    // send issues one request and classifies the response status.
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&PKeyMembersRequest>,
    ) -> UfmResult<Response> {
        let url = self.url(path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_ref());
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        tracing::debug!(method = %method, url = %url, "UFM request");
        let response = request.send().await.map_err(|e| UfmError::ConnectionError {
            url: url.clone(),
            error: e.to_string(),
        })?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(
                method = %method,
                url = %url,
                code = status,
                response = %body,
                "UFM request failed"
            );
            let error = match UfmError::from_response(method.as_str(), &url, status, body) {
                Some(error) => error,
                None => UfmError::HttpError {
                    method: method.to_string(),
                    url,
                    status,
                    body: String::new(),
                },
            };
            return Err(error);
        }

        tracing::debug!(method = %method, url = %url, code = status, "UFM response");
        Ok(response)
    }

    async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> UfmResult<T> {
        let url = response.url().to_string();
        response
            .json::<T>()
            .await
            .map_err(|e| UfmError::InvalidResponse {
                url,
                error: e.to_string(),
            })
    }
}

#[async_trait]
impl PartitionApi for UfmClient {
    async fn list(&self, with_guids: bool) -> UfmResult<Vec<PKey>> {
        let path = format!("{PKEYS_PATH}?guids_data={with_guids}");
        let response = self.send(Method::GET, &path, None).await?;
        let listing: BTreeMap<String, PKeyBody> = Self::decode(response).await?;
        Ok(pkeys_from_listing(listing))
    }

    async fn get(&self, pkey: PartitionKey, with_guids: bool) -> UfmResult<PKey> {
        let path = format!("{PKEYS_PATH}/{pkey}?guids_data={with_guids}");
        let response = self.send(Method::GET, &path, None).await?;
        let body: PKeyBody = Self::decode(response).await?;
        Ok(body.named(pkey.to_string()))
    }

    async fn add_members(
        &self,
        pkey: PartitionKey,
        guids: &[Guid],
        options: MemberOptions,
    ) -> UfmResult<()> {
        let payload = PKeyMembersRequest::new(pkey, guids, options);
        self.send(Method::POST, &format!("{PKEYS_PATH}/"), Some(&payload))
            .await?;
        tracing::info!(
            pkey = %pkey,
            guids = ?guids,
            index0 = options.index0,
            membership = %options.membership,
            "Added GUIDs to partition key"
        );
        Ok(())
    }

    async fn remove_members(&self, pkey: PartitionKey, guids: &[Guid]) -> UfmResult<()> {
        if guids.is_empty() {
            tracing::debug!(pkey = %pkey, "No GUIDs to remove from partition key");
            return Ok(());
        }
        let joined = guids
            .iter()
            .map(Guid::as_str)
            .collect::<Vec<_>>()
            .join(",");
        self.send(Method::DELETE, &format!("{PKEYS_PATH}/{pkey}/guids/{joined}"), None)
            .await?;
        tracing::info!(pkey = %pkey, guids = ?guids, "Removed GUIDs from partition key");
        Ok(())
    }

    async fn delete(&self, pkey: PartitionKey) -> UfmResult<()> {
        self.send(Method::DELETE, &format!("{PKEYS_PATH}/{pkey}"), None)
            .await?;
        tracing::info!(pkey = %pkey, "Deleted partition key");
        Ok(())
    }

    async fn replace(
        &self,
        pkey: PartitionKey,
        guids: &[Guid],
        options: MemberOptions,
    ) -> UfmResult<()> {
        let payload = PKeyMembersRequest::new(pkey, guids, options);
        self.send(Method::PUT, PKEYS_PATH, Some(&payload)).await?;
        tracing::info!(pkey = %pkey, guids = ?guids, "Replaced partition key members");
        Ok(())
    }
}

// load_ca_certificates reads a PEM bundle, or every PEM file in a
// directory.
fn load_ca_certificates(path: &Path) -> UfmResult<Vec<Certificate>> {
    let read_error = |p: &Path, e: &dyn std::fmt::Display| {
        UfmError::ClientSetup(format!("Failed to read CA {}: {e}", p.display()))
    };

    let files = if path.is_dir() {
        let entries = std::fs::read_dir(path).map_err(|e| read_error(path, &e))?;
        let mut files = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| read_error(path, &e))?;
            if entry.path().is_file() {
                files.push(entry.path());
            }
        }
        files.sort();
        files
    } else {
        vec![path.to_path_buf()]
    };

    let mut certs = Vec::new();
    for file in files {
        let pem = std::fs::read(&file).map_err(|e| read_error(&file, &e))?;
        let bundle = Certificate::from_pem_bundle(&pem).map_err(|e| read_error(&file, &e))?;
        tracing::debug!(path = %file.display(), count = bundle.len(), "Loaded UFM CA certificates");
        certs.extend(bundle);
    }
    Ok(certs)
}
