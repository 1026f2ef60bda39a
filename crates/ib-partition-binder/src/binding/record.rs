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

// src/binding/record.rs
// What a bind leaves behind in the port's vif details: the binding
// record on success, or a failure payload tagged with the driver that
// failed.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::identity::guid::Guid;
use crate::ufm::pkey::PartitionKey;

// LimitedPkeyMembers pairs one limited partition key with the GUIDs
// added to it. With SR-IOV on, the GUIDs are the virtual GUIDs at
// this key's offset, one per physical port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LimitedPkeyMembers {
    pub pkey: PartitionKey,
    pub guids: Vec<Guid>,
}

// BindingRecord is the vif details of a successful bind. The limited
// pkey fields are only present when limited pkeys are configured, and
// virtual_guids only when SR-IOV is on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRecord {
    // dynamic_pkey is the segmentation id the port was bound to.
    pub dynamic_pkey: u32,
    pub physical_guids: Vec<Guid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_sriov: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_limited_pkeys: Option<Vec<PartitionKey>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub virtual_guids: Option<Vec<LimitedPkeyMembers>>,
}

impl BindingRecord {
    pub fn new(dynamic_pkey: u32, physical_guids: Vec<Guid>) -> Self {
        Self {
            dynamic_pkey,
            physical_guids,
            enable_sriov: None,
            default_limited_pkeys: None,
            virtual_guids: None,
        }
    }

    // with_limited_pkeys records the limited pkeys and, for SR-IOV,
    // the virtual GUIDs each one received.
    pub fn with_limited_pkeys(
        mut self,
        enable_sriov: bool,
        pkeys: &[PartitionKey],
        virtual_guids: Option<Vec<LimitedPkeyMembers>>,
    ) -> Self {
        self.enable_sriov = Some(enable_sriov);
        self.default_limited_pkeys = Some(pkeys.to_vec());
        self.virtual_guids = virtual_guids;
        self
    }

    pub fn to_vif_details(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}

// BindingFailure is the vif details of a failed bind. The driver tag
// is how a later port update tells whose failure it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingFailure {
    pub guids: Vec<String>,
    pub pkey: String,
    pub driver: String,
    pub reason: String,
}

impl BindingFailure {
    pub fn new(
        guids: &[Guid],
        pkey: impl Display,
        driver: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            guids: guids.iter().map(Guid::to_string).collect(),
            pkey: pkey.to_string(),
            driver: driver.to_string(),
            reason: reason.into(),
        }
    }

    // from_vif_details reads a failure payload back, if the details
    // carry a driver tag. Only the tag is required; a missing or
    // malformed guids, pkey or reason reads as empty so the driver
    // check still sees the failure.
    pub fn from_vif_details(details: &serde_json::Value) -> Option<Self> {
        let driver = details.get("driver")?.as_str()?;
        let text = |key: &str| {
            details
                .get(key)
                .and_then(serde_json::Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        let guids = details
            .get("guids")
            .and_then(serde_json::Value::as_array)
            .map(|guids| {
                guids
                    .iter()
                    .filter_map(serde_json::Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();
        Some(Self {
            guids,
            pkey: text("pkey"),
            driver: driver.to_string(),
            reason: text("reason"),
        })
    }

    pub fn is_from_driver(&self, driver: &str) -> bool {
        self.driver == driver
    }

    pub fn to_vif_details(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }
}
