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

// tests/common/mod.rs
// In-memory fabric, inventory, and provisioning fakes, plus builders
// for the ports and segments the binder sees.

#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use ib_partition_binder::binding::{
    BindingLevel, NetworkType, Port, PortStatus, PortUpdate, Segment, VifType, VnicType,
};
use ib_partition_binder::identity::guid::{Guid, MLNX_IB_CLIENT_ID_PREFIX};
use ib_partition_binder::inventory::{
    InventoryApi, InventoryError, InventoryPort, InventoryResult, PatchOp, PatchOperation,
};
use ib_partition_binder::ufm::{
    MemberOptions, PKey, PKeyMember, PartitionApi, PartitionKey, UfmError, UfmResult,
};
use ib_partition_binder::engine::ProvisioningBlocks;
use mac_address::MacAddress;
use uuid::Uuid;

pub const NODE_ID: &str = "3b0c1c4e-2f51-4d0a-9a55-4c6f5a1e0b11";
pub const GUID_1: &str = "04bd700300374486";
pub const GUID_2: &str = "04bd700300374487";

// client_id builds the client-id Ironic reports for a port GUID.
pub fn client_id(guid: &str) -> String {
    let bytes: Vec<&str> = (0..guid.len())
        .step_by(2)
        .map(|i| &guid[i..i + 2])
        .collect();
    format!("{MLNX_IB_CLIENT_ID_PREFIX}{}", bytes.join(":"))
}

pub fn guid(value: &str) -> Guid {
    value.parse().unwrap()
}

pub fn pkey(value: u16) -> PartitionKey {
    PartitionKey::new(value).unwrap()
}

pub fn ib_port(node: &str, guid: &str) -> InventoryPort {
    let mut extra = serde_json::Map::new();
    extra.insert("client-id".to_string(), client_id(guid).into());
    InventoryPort {
        uuid: Uuid::new_v4(),
        address: guid.to_string(),
        node_uuid: node.parse().ok(),
        pxe_enabled: Some(false),
        extra,
    }
}

pub fn pxe_port(node: &str, mac: &str) -> InventoryPort {
    InventoryPort {
        uuid: Uuid::new_v4(),
        address: mac.to_string(),
        node_uuid: node.parse().ok(),
        pxe_enabled: Some(true),
        extra: serde_json::Map::new(),
    }
}

pub fn vlan_segment(segmentation_id: u32) -> Segment {
    Segment {
        id: Uuid::new_v4(),
        network_id: Uuid::new_v4(),
        network_type: NetworkType::Vlan,
        segmentation_id: Some(segmentation_id),
        physical_network: Some("ibnet".to_string()),
    }
}

pub fn baremetal_port(host_id: Option<&str>) -> Port {
    Port {
        id: Uuid::new_v4(),
        mac_address: MacAddress::new([0x52, 0x54, 0x00, 0x12, 0x34, 0x56]),
        vnic_type: VnicType::Baremetal,
        host_id: host_id.map(str::to_string),
        status: PortStatus::Down,
        binding_levels: Vec::new(),
    }
}

pub fn own_level(segmentation_id: u32) -> BindingLevel {
    BindingLevel {
        driver: "mlnx_ib_bm".to_string(),
        segmentation_id: Some(segmentation_id),
        network_type: Some(NetworkType::Vlan),
        physical_network: Some("ibnet".to_string()),
        level: 0,
    }
}

// port_update builds an update for a port bound by this driver on
// segment, moving from original_vif_type to vif_type.
pub fn port_update(
    port: &Port,
    segment: &Segment,
    original_vif_type: &str,
    vif_type: &str,
) -> PortUpdate {
    let mut current = port.clone();
    if let Some(segmentation_id) = segment.segmentation_id {
        current.binding_levels = vec![own_level(segmentation_id)];
    }
    PortUpdate {
        original: port.clone(),
        current,
        vif_type: VifType::from(vif_type),
        original_vif_type: VifType::from(original_vif_type),
        vif_details: None,
        network_segments: vec![segment.clone()],
    }
}

// FabricCall is one call made against the FakeFabric.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FabricCall {
    Add {
        pkey: PartitionKey,
        guids: Vec<Guid>,
        options: MemberOptions,
    },
    Remove {
        pkey: PartitionKey,
        guids: Vec<Guid>,
    },
    Delete {
        pkey: PartitionKey,
    },
}

// FakeFabric keeps partition key membership in memory, the way UFM
// does: a key exists while it has members.
#[derive(Default)]
pub struct FakeFabric {
    pkeys: Mutex<BTreeMap<PartitionKey, Vec<(Guid, MemberOptions)>>>,
    calls: Mutex<Vec<FabricCall>>,
    fail_add: Mutex<HashSet<PartitionKey>>,
    remove_error: Mutex<Option<UfmError>>,
    unreachable: AtomicBool,
}

impl FakeFabric {
    pub fn calls(&self) -> Vec<FabricCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn members(&self, pkey: PartitionKey) -> Vec<Guid> {
        self.pkeys
            .lock()
            .unwrap()
            .get(&pkey)
            .map(|members| members.iter().map(|(guid, _)| guid.clone()).collect())
            .unwrap_or_default()
    }

    pub fn has_pkey(&self, pkey: PartitionKey) -> bool {
        self.pkeys.lock().unwrap().contains_key(&pkey)
    }

    // fail_add_on makes every add to pkey fail with a server error.
    pub fn fail_add_on(&self, pkey: PartitionKey) {
        self.fail_add.lock().unwrap().insert(pkey);
    }

    // fail_remove_with makes every removal fail with error.
    pub fn fail_remove_with(&self, error: UfmError) {
        *self.remove_error.lock().unwrap() = Some(error);
    }

    // set_unreachable makes every call fail as if UFM was down.
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    fn check_reachable(&self) -> UfmResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(UfmError::ConnectionError {
                url: "https://ufm.test/ufmRest".to_string(),
                error: "connection refused".to_string(),
            });
        }
        Ok(())
    }

    fn not_found(method: &str, pkey: PartitionKey) -> UfmError {
        UfmError::NotFound {
            method: method.to_string(),
            url: format!("https://ufm.test/ufmRest/resources/pkeys/{pkey}"),
        }
    }
}

#[async_trait]
impl PartitionApi for FakeFabric {
    async fn list(&self, _with_guids: bool) -> UfmResult<Vec<PKey>> {
        self.check_reachable()?;
        Ok(self
            .pkeys
            .lock()
            .unwrap()
            .iter()
            .map(|(pkey, members)| PKey {
                pkey: pkey.to_string(),
                partition: None,
                ip_over_ib: true,
                guids: members
                    .iter()
                    .map(|(guid, options)| PKeyMember {
                        guid: guid.to_string(),
                        membership: options.membership,
                        index0: options.index0,
                    })
                    .collect(),
            })
            .collect())
    }

    async fn get(&self, pkey: PartitionKey, with_guids: bool) -> UfmResult<PKey> {
        self.list(with_guids)
            .await?
            .into_iter()
            .find(|entry| entry.pkey == pkey.to_string())
            .ok_or_else(|| Self::not_found("GET", pkey))
    }

    async fn add_members(
        &self,
        pkey: PartitionKey,
        guids: &[Guid],
        options: MemberOptions,
    ) -> UfmResult<()> {
        self.calls.lock().unwrap().push(FabricCall::Add {
            pkey,
            guids: guids.to_vec(),
            options,
        });
        self.check_reachable()?;
        if self.fail_add.lock().unwrap().contains(&pkey) {
            return Err(UfmError::ServerError {
                method: "POST".to_string(),
                url: "https://ufm.test/ufmRest/resources/pkeys/".to_string(),
                status: 500,
                body: "Internal Server Error".to_string(),
            });
        }

        let mut pkeys = self.pkeys.lock().unwrap();
        let members = pkeys.entry(pkey).or_default();
        for guid in guids {
            members.retain(|(existing, _)| existing != guid);
            members.push((guid.clone(), options));
        }
        Ok(())
    }

    async fn remove_members(&self, pkey: PartitionKey, guids: &[Guid]) -> UfmResult<()> {
        self.calls.lock().unwrap().push(FabricCall::Remove {
            pkey,
            guids: guids.to_vec(),
        });
        self.check_reachable()?;
        if let Some(error) = self.remove_error.lock().unwrap().clone() {
            return Err(error);
        }

        let mut pkeys = self.pkeys.lock().unwrap();
        let Some(members) = pkeys.get_mut(&pkey) else {
            return Err(Self::not_found("DELETE", pkey));
        };
        members.retain(|(existing, _)| !guids.contains(existing));
        if members.is_empty() {
            pkeys.remove(&pkey);
        }
        Ok(())
    }

    async fn delete(&self, pkey: PartitionKey) -> UfmResult<()> {
        self.calls.lock().unwrap().push(FabricCall::Delete { pkey });
        self.check_reachable()?;
        match self.pkeys.lock().unwrap().remove(&pkey) {
            Some(_) => Ok(()),
            None => Err(Self::not_found("DELETE", pkey)),
        }
    }

    async fn replace(
        &self,
        pkey: PartitionKey,
        guids: &[Guid],
        options: MemberOptions,
    ) -> UfmResult<()> {
        self.check_reachable()?;
        let members = guids.iter().map(|guid| (guid.clone(), options)).collect();
        self.pkeys.lock().unwrap().insert(pkey, members);
        Ok(())
    }
}

// FakeInventory serves node ports from memory.
#[derive(Default)]
pub struct FakeInventory {
    nodes: Mutex<HashMap<String, Vec<InventoryPort>>>,
    unavailable: AtomicBool,
}

impl FakeInventory {
    pub fn with_node(node: &str, ports: Vec<InventoryPort>) -> Self {
        let inventory = Self::default();
        inventory.nodes.lock().unwrap().insert(node.to_string(), ports);
        inventory
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> InventoryResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(InventoryError::Unavailable {
                url: "http://ironic.test:6385/v1/ports/detail".to_string(),
                error: "HTTP 503: Service Unavailable".to_string(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl InventoryApi for FakeInventory {
    async fn list_node_ports(&self, node_id: &str) -> InventoryResult<Vec<InventoryPort>> {
        self.check_available()?;
        Ok(self
            .nodes
            .lock()
            .unwrap()
            .get(node_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_port_by_mac(&self, mac: &str) -> InventoryResult<InventoryPort> {
        self.check_available()?;
        self.nodes
            .lock()
            .unwrap()
            .values()
            .flatten()
            .find(|port| port.address == mac)
            .cloned()
            .ok_or_else(|| InventoryError::NotFound(format!("port with address {mac}")))
    }

    async fn update_port_extra(
        &self,
        port_id: Uuid,
        patch: Vec<PatchOperation>,
    ) -> InventoryResult<InventoryPort> {
        self.check_available()?;
        let mut nodes = self.nodes.lock().unwrap();
        let port = nodes
            .values_mut()
            .flatten()
            .find(|port| port.uuid == port_id)
            .ok_or_else(|| InventoryError::NotFound(port_id.to_string()))?;
        for operation in patch {
            let key = operation.path.trim_start_matches("/extra/").to_string();
            match (operation.op, operation.value) {
                (PatchOp::Remove, _) => {
                    port.extra.remove(&key);
                }
                (_, Some(value)) => {
                    port.extra.insert(key, value);
                }
                (_, None) => {}
            }
        }
        Ok(port.clone())
    }
}

// ProvisioningEvent is one call made against RecordingProvisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProvisioningEvent {
    Added { port_id: Uuid, entity: String },
    Completed { port_id: Uuid, entity: String },
}

// RecordingProvisioning records provisioning calls.
#[derive(Default)]
pub struct RecordingProvisioning {
    events: Mutex<Vec<ProvisioningEvent>>,
    failing: AtomicBool,
}

impl RecordingProvisioning {
    pub fn events(&self) -> Vec<ProvisioningEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

#[async_trait]
impl ProvisioningBlocks for RecordingProvisioning {
    async fn add_component(&self, port_id: Uuid, entity: &str) -> eyre::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(eyre::eyre!("provisioning blocks unavailable"));
        }
        self.events.lock().unwrap().push(ProvisioningEvent::Added {
            port_id,
            entity: entity.to_string(),
        });
        Ok(())
    }

    async fn complete(&self, port_id: Uuid, entity: &str) -> eyre::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(eyre::eyre!("provisioning blocks unavailable"));
        }
        self.events.lock().unwrap().push(ProvisioningEvent::Completed {
            port_id,
            entity: entity.to_string(),
        });
        Ok(())
    }
}

// spawn_server serves router on an ephemeral local port and returns
// its base URL.
pub async fn spawn_server(router: axum::Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// closed_endpoint returns a local URL nothing listens on.
pub async fn closed_endpoint() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}")
}
