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

// src/binding/port.rs
// The slice of a port binding event the binder reads: the port itself,
// the network segments on offer, and the binding levels recorded by
// whichever drivers bound it.

use std::fmt::Display;
use std::str::FromStr;

use mac_address::MacAddress;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// VIF_TYPE_UNBOUND is the vif type of a port no driver has bound.
pub const VIF_TYPE_UNBOUND: &str = "unbound";

// VIF_TYPE_BINDING_FAILED is the vif type of a port whose last bind
// attempt failed.
pub const VIF_TYPE_BINDING_FAILED: &str = "binding_failed";

// NetworkType is the segmentation technology of a network segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkType {
    Vlan,
    Vxlan,
    Flat,
    Geneve,
    Gre,
    Local,
    #[serde(other)]
    Other,
}

impl FromStr for NetworkType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "vlan" => Ok(NetworkType::Vlan),
            "vxlan" => Ok(NetworkType::Vxlan),
            "flat" => Ok(NetworkType::Flat),
            "geneve" => Ok(NetworkType::Geneve),
            "gre" => Ok(NetworkType::Gre),
            "local" => Ok(NetworkType::Local),
            _ => Err(format!(
                "Unknown network type '{value}'. Valid types: vlan, vxlan, flat, geneve, gre, local"
            )),
        }
    }
}

impl Display for NetworkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NetworkType::Vlan => "vlan",
            NetworkType::Vxlan => "vxlan",
            NetworkType::Flat => "flat",
            NetworkType::Geneve => "geneve",
            NetworkType::Gre => "gre",
            NetworkType::Local => "local",
            NetworkType::Other => "other",
        };
        write!(f, "{name}")
    }
}

// VnicType is the kind of NIC a port is attached through. Only
// baremetal ports are managed here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VnicType {
    #[default]
    Normal,
    Direct,
    Macvtap,
    Baremetal,
    #[serde(rename = "direct-physical")]
    DirectPhysical,
    #[serde(other)]
    Other,
}

// VifType is the binding result recorded on a port. Anything other
// than the two unbound-class values counts as bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum VifType {
    Unbound,
    BindingFailed,
    Bound(String),
}

impl VifType {
    // is_unbound_class is true for both "unbound" and
    // "binding_failed".
    pub fn is_unbound_class(&self) -> bool {
        matches!(self, VifType::Unbound | VifType::BindingFailed)
    }

    pub fn as_str(&self) -> &str {
        match self {
            VifType::Unbound => VIF_TYPE_UNBOUND,
            VifType::BindingFailed => VIF_TYPE_BINDING_FAILED,
            VifType::Bound(name) => name,
        }
    }
}

impl From<String> for VifType {
    fn from(value: String) -> Self {
        match value.as_str() {
            VIF_TYPE_UNBOUND => VifType::Unbound,
            VIF_TYPE_BINDING_FAILED => VifType::BindingFailed,
            _ => VifType::Bound(value),
        }
    }
}

impl From<&str> for VifType {
    fn from(value: &str) -> Self {
        VifType::from(value.to_string())
    }
}

impl From<VifType> for String {
    fn from(vif_type: VifType) -> Self {
        vif_type.as_str().to_string()
    }
}

impl Display for VifType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// PortStatus is the operational status of a port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PortStatus {
    Active,
    #[default]
    Down,
    Build,
    Error,
    #[serde(other)]
    Unknown,
}

// Segment is one network segment a port may be bound to. The
// segmentation id doubles as the partition key number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub id: Uuid,
    pub network_id: Uuid,
    pub network_type: NetworkType,
    #[serde(default)]
    pub segmentation_id: Option<u32>,
    #[serde(default)]
    pub physical_network: Option<String>,
}

// BindingLevel is one entry of a port's binding hierarchy, naming the
// driver that bound it and the segmentation id it bound to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingLevel {
    pub driver: String,
    #[serde(default)]
    pub segmentation_id: Option<u32>,
    #[serde(default)]
    pub network_type: Option<NetworkType>,
    #[serde(default)]
    pub physical_network: Option<String>,
    #[serde(default)]
    pub level: u32,
}

// Port is the bare-metal port being bound. Its host_id names the
// Ironic node that owns the InfiniBand ports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: Uuid,
    pub mac_address: MacAddress,
    #[serde(default)]
    pub vnic_type: VnicType,
    #[serde(default)]
    pub host_id: Option<String>,
    #[serde(default)]
    pub status: PortStatus,
    #[serde(default)]
    pub binding_levels: Vec<BindingLevel>,
}

// BindRequest asks the binder to bind a port to one of the offered
// segments.
#[derive(Debug, Clone)]
pub struct BindRequest {
    pub port: Port,
    pub segments_to_bind: Vec<Segment>,
}

// PortUpdate is a committed port change: the port before and after,
// the vif types before and after, and the segments of the port's
// network.
#[derive(Debug, Clone)]
pub struct PortUpdate {
    pub current: Port,
    pub original: Port,
    pub vif_type: VifType,
    pub original_vif_type: VifType,
    pub vif_details: Option<serde_json::Value>,
    pub network_segments: Vec<Segment>,
}
