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

// src/inventory/port.rs
// Ironic port models. InfiniBand ports are the ones whose extra
// attributes carry a DHCP client-id.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// CLIENT_ID_EXTRA is the extra attribute holding an InfiniBand
// port's client-id.
pub const CLIENT_ID_EXTRA: &str = "client-id";

// InventoryPort is an Ironic port. The address is kept as a string,
// since InfiniBand port addresses are 20 bytes rather than a MAC.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryPort {
    pub uuid: Uuid,
    pub address: String,
    #[serde(default)]
    pub node_uuid: Option<Uuid>,
    #[serde(default)]
    pub pxe_enabled: Option<bool>,
    #[serde(default)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl InventoryPort {
    // client_id returns the port's non-empty client-id, if it has one.
    pub fn client_id(&self) -> Option<&str> {
        self.extra
            .get(CLIENT_ID_EXTRA)
            .and_then(serde_json::Value::as_str)
            .filter(|client_id| !client_id.is_empty())
    }

    pub fn is_infiniband(&self) -> bool {
        self.client_id().is_some()
    }
}

// PortCollection is the body of an Ironic port listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PortCollection {
    #[serde(default)]
    pub ports: Vec<InventoryPort>,
}

// PatchOp is a JSON patch operation kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PatchOp {
    Add,
    Replace,
    Remove,
}

// PatchOperation is one JSON patch (RFC 6902) entry of an Ironic
// port update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatchOperation {
    pub op: PatchOp,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl PatchOperation {
    pub fn add(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            op: PatchOp::Add,
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn replace(path: impl Into<String>, value: serde_json::Value) -> Self {
        Self {
            op: PatchOp::Replace,
            path: path.into(),
            value: Some(value),
        }
    }

    pub fn remove(path: impl Into<String>) -> Self {
        Self {
            op: PatchOp::Remove,
            path: path.into(),
            value: None,
        }
    }
}
