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

// src/engine/binder.rs
// PartitionBinder keeps UFM partition key membership in line with
// port bindings. On bind it adds the node's InfiniBand GUIDs to the
// partition key named by the segment's segmentation id, plus any
// configured limited pkeys; once the port is seen unbound it removes
// them again.
//
// With SR-IOV on, each limited pkey gets its own virtual GUID per
// physical port: limited pkey i receives the virtual GUID at offset i
// of every port, so the pairing survives a re-derivation at unbind
// time.

use std::sync::Arc;

use async_trait::async_trait;

use crate::binding::port::{BindRequest, PortStatus, PortUpdate, Segment, VifType};
use crate::binding::record::{BindingFailure, BindingRecord, LimitedPkeyMembers};
use crate::binding::tracker::BindingState;
use crate::binding::{DRIVER_NAME, MLNX_IB_BAREMETAL_ENTITY};
use crate::config::BindingConfig;
use crate::config::error::ConfigResult;
use crate::eligibility::filter::{SegmentFilter, is_baremetal_port};
use crate::engine::error::{BinderError, BinderResult, PartitionBindingError};
use crate::engine::outcome::{BindOutcome, IgnoredReason, ObservedOutcome};
use crate::engine::provisioning::ProvisioningBlocks;
use crate::identity::guid::Guid;
use crate::identity::virtual_guid::sequential_virtual_guids;
use crate::inventory::ironic::InventoryApi;
use crate::ufm::client::PartitionApi;
use crate::ufm::pkey::{MemberOptions, PartitionKey};

// PortBindingDriver is the set of events a port binding driver reacts
// to.
#[async_trait]
pub trait PortBindingDriver: Send + Sync {
    // on_bind tries to bind a port to one of the offered segments.
    async fn on_bind(&self, request: &BindRequest) -> BinderResult<BindOutcome>;

    // on_binding_observed reacts to a committed port update.
    async fn on_binding_observed(&self, update: &PortUpdate) -> BinderResult<ObservedOutcome>;

    // on_network_deleted cleans up after a deleted network, returning
    // the partition keys it deleted.
    async fn on_network_deleted(&self, segments: &[Segment]) -> BinderResult<Vec<PartitionKey>>;
}

// BindingPolicy is the resolved [binding] configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingPolicy {
    pub enable_sriov: bool,
    pub limited_pkeys: Vec<PartitionKey>,
    pub filter: SegmentFilter,
}

impl BindingPolicy {
    pub fn from_config(config: &BindingConfig) -> ConfigResult<Self> {
        Ok(Self {
            enable_sriov: config.enable_sriov,
            limited_pkeys: config.limited_pkeys()?,
            filter: config.segment_filter()?,
        })
    }

    // limited_member_options are the options limited pkey members are
    // added with. Virtual GUIDs take slot 0 of their own pkey table;
    // physical GUIDs already have the dynamic pkey there.
    fn limited_member_options(&self) -> MemberOptions {
        MemberOptions::limited(self.enable_sriov)
    }
}

// NodeDevices are the InfiniBand ports of one node, as parallel
// client-id and canonical GUID lists.
#[derive(Debug, Clone)]
struct NodeDevices {
    client_ids: Vec<String>,
    guids: Vec<Guid>,
}

// PartitionBinder implements PortBindingDriver against injected
// inventory, fabric, and provisioning collaborators.
#[derive(Clone)]
pub struct PartitionBinder {
    inventory: Arc<dyn InventoryApi>,
    fabric: Arc<dyn PartitionApi>,
    provisioning: Arc<dyn ProvisioningBlocks>,
    policy: BindingPolicy,
}

impl PartitionBinder {
    pub fn new(
        inventory: Arc<dyn InventoryApi>,
        fabric: Arc<dyn PartitionApi>,
        provisioning: Arc<dyn ProvisioningBlocks>,
        policy: BindingPolicy,
    ) -> Self {
        Self {
            inventory,
            fabric,
            provisioning,
            policy,
        }
    }

    pub fn policy(&self) -> &BindingPolicy {
        &self.policy
    }

    // resolve_devices lists a node's ports and keeps the InfiniBand
    // ones whose GUID can be derived. None means there is nothing to
    // act on.
    async fn resolve_devices(&self, node_id: Option<&str>) -> BinderResult<Option<NodeDevices>> {
        let Some(node_id) = node_id.filter(|id| !id.is_empty()) else {
            tracing::warn!("Port has no host id, cannot resolve its Ironic node");
            return Ok(None);
        };

        let ports = self.inventory.list_node_ports(node_id).await?;
        let mut devices = NodeDevices {
            client_ids: Vec::new(),
            guids: Vec::new(),
        };
        for port in &ports {
            let Some(client_id) = port.client_id() else {
                continue;
            };
            match Guid::from_client_id(client_id) {
                Some(guid) => {
                    devices.client_ids.push(client_id.to_string());
                    devices.guids.push(guid);
                }
                None => tracing::warn!(
                    node = %node_id,
                    port = %port.uuid,
                    client_id = %client_id,
                    "Skipping InfiniBand port with malformed client-id"
                ),
            }
        }

        if devices.guids.is_empty() {
            return Ok(None);
        }
        tracing::info!(node = %node_id, guids = ?devices.guids, "Resolved node InfiniBand GUIDs");
        Ok(Some(devices))
    }

    // limited_members groups the GUIDs each limited pkey gets.
    fn limited_members(&self, devices: &NodeDevices) -> BinderResult<Vec<LimitedPkeyMembers>> {
        let pkeys = &self.policy.limited_pkeys;
        if pkeys.is_empty() {
            return Ok(Vec::new());
        }

        if !self.policy.enable_sriov {
            return Ok(pkeys
                .iter()
                .map(|pkey| LimitedPkeyMembers {
                    pkey: *pkey,
                    guids: devices.guids.clone(),
                })
                .collect());
        }

        // per_device[d][i] is the virtual GUID at offset i of device d.
        let per_device = devices
            .client_ids
            .iter()
            .map(|client_id| {
                sequential_virtual_guids(client_id, pkeys.len()).map(|guids| guids.collect::<Vec<_>>())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(pkeys
            .iter()
            .enumerate()
            .map(|(offset, pkey)| LimitedPkeyMembers {
                pkey: *pkey,
                guids: per_device
                    .iter()
                    .map(|virtual_guids| virtual_guids[offset].clone())
                    .collect(),
            })
            .collect())
    }

    // bind_segment adds the node's GUIDs for one eligible segment.
    async fn bind_segment(
        &self,
        request: &BindRequest,
        segment: &Segment,
    ) -> BinderResult<BindOutcome> {
        let port = &request.port;
        let Some(devices) = self.resolve_devices(port.host_id.as_deref()).await? else {
            tracing::warn!(
                port = %port.id,
                node = ?port.host_id,
                "No InfiniBand ports found on the port's node, skipping bind"
            );
            return Ok(BindOutcome::NoDevices);
        };

        // Eligible segments always carry a non-zero segmentation id.
        let segmentation_id = segment.segmentation_id.unwrap_or_default();
        let dynamic_pkey = match PartitionKey::from_segmentation_id(segmentation_id) {
            Ok(pkey) => pkey,
            Err(e) => {
                tracing::error!(
                    port = %port.id,
                    segmentation_id,
                    error = %e,
                    "Segmentation id is not a valid partition key"
                );
                return Ok(BindOutcome::Failed {
                    segment_id: segment.id,
                    failure: BindingFailure::new(
                        &devices.guids,
                        format!("{segmentation_id:#x}"),
                        DRIVER_NAME,
                        e.to_string(),
                    ),
                });
            }
        };

        tracing::debug!(port = %port.id, segment = %segment.id, pkey = %dynamic_pkey, "Binding IB ports");
        self.provisioning
            .add_component(port.id, MLNX_IB_BAREMETAL_ENTITY)
            .await
            .map_err(BinderError::Provisioning)?;

        let failed = |pkey: PartitionKey, guids: &[Guid], reason: String| {
            tracing::error!(
                port = %port.id,
                pkey = %pkey,
                guids = ?guids,
                reason = %reason,
                "Failed to add guids to UFM partition key"
            );
            BindOutcome::Failed {
                segment_id: segment.id,
                failure: BindingFailure::new(guids, pkey, DRIVER_NAME, reason),
            }
        };

        if let Err(e) = self
            .fabric
            .add_members(dynamic_pkey, &devices.guids, MemberOptions::full(true))
            .await
        {
            return Ok(failed(dynamic_pkey, devices.guids.as_slice(), e.to_string()));
        }
        tracing::info!(
            pkey = %dynamic_pkey,
            guids = ?devices.guids,
            "Bound IB physical guids to dynamic partition"
        );

        let mut record = BindingRecord::new(segmentation_id, devices.guids.clone());
        if !self.policy.limited_pkeys.is_empty() {
            let members = self.limited_members(&devices)?;
            let options = self.policy.limited_member_options();
            for group in &members {
                if let Err(e) = self.fabric.add_members(group.pkey, &group.guids, options).await {
                    return Ok(failed(group.pkey, group.guids.as_slice(), e.to_string()));
                }
                tracing::info!(
                    pkey = %group.pkey,
                    guids = ?group.guids,
                    index0 = options.index0,
                    "Bound IB guids to limited partition"
                );
            }
            let virtual_guids = self.policy.enable_sriov.then_some(members);
            record = record.with_limited_pkeys(
                self.policy.enable_sriov,
                &self.policy.limited_pkeys,
                virtual_guids,
            );
        } else {
            tracing::debug!("No default limited pkeys configured");
        }

        tracing::info!(port = %port.id, record = ?record, "InfiniBand port binding record");
        Ok(BindOutcome::Continue {
            segment: segment.clone(),
            record,
        })
    }

    // remove_members removes GUIDs from a pkey, treating an already
    // missing pkey or member as removed.
    async fn remove_members(&self, pkey: PartitionKey, guids: &[Guid]) -> BinderResult<()> {
        match self.fabric.remove_members(pkey, guids).await {
            Ok(()) => Ok(()),
            Err(e) if e.is_not_found() => {
                tracing::info!(pkey = %pkey, guids = ?guids, "Partition key or members already gone");
                Ok(())
            }
            Err(e) => {
                tracing::error!(pkey = %pkey, guids = ?guids, error = %e, "Failed to remove guids from partition key");
                Err(e.into())
            }
        }
    }

    // unbind removes the node's GUIDs from every pkey the bind added
    // them to. The node comes from the original port, since the
    // current one has already lost its host binding.
    async fn unbind(
        &self,
        update: &PortUpdate,
        segmentation_id: u32,
    ) -> BinderResult<ObservedOutcome> {
        let node_id = update.original.host_id.as_deref();
        let Some(devices) = self.resolve_devices(node_id).await? else {
            tracing::error!(
                port = %update.current.id,
                node = ?node_id,
                "Could not find any InfiniBand port on the node, cannot remove guids from partition key"
            );
            return Ok(ObservedOutcome::Ignored(IgnoredReason::NoDevices));
        };

        let pkey = PartitionKey::from_segmentation_id(segmentation_id)?;
        tracing::info!(pkey = %pkey, guids = ?devices.guids, "Unbinding dynamic partition key");
        self.remove_members(pkey, &devices.guids).await?;

        let limited = self.limited_members(&devices)?;
        for group in &limited {
            self.remove_members(group.pkey, &group.guids).await?;
            tracing::info!(pkey = %group.pkey, guids = ?group.guids, "Removed IB guids from limited partition");
        }

        Ok(ObservedOutcome::Unbound {
            pkey,
            guids: devices.guids,
            limited,
        })
    }
}

#[async_trait]
impl PortBindingDriver for PartitionBinder {
    async fn on_bind(&self, request: &BindRequest) -> BinderResult<BindOutcome> {
        if !is_baremetal_port(&request.port) {
            tracing::info!(port = %request.port.id, "Port is not a baremetal port, skip binding");
            return Ok(BindOutcome::NotManaged);
        }

        let Some(segment) = self.policy.filter.first_eligible(&request.segments_to_bind) else {
            tracing::info!(port = %request.port.id, "No segment eligible for partition binding");
            return Ok(BindOutcome::NoEligibleSegment);
        };

        self.bind_segment(request, segment).await
    }

    async fn on_binding_observed(&self, update: &PortUpdate) -> BinderResult<ObservedOutcome> {
        let port = &update.current;
        if !is_baremetal_port(port) {
            tracing::info!(port = %port.id, "Port is not a baremetal port, skip update");
            return Ok(ObservedOutcome::Ignored(IgnoredReason::NotBaremetal));
        }

        let state = BindingState::of(port, &update.network_segments, DRIVER_NAME);
        let Some(level) = state.own_level() else {
            tracing::info!(port = %port.id, "Port is not bound by this driver, skip update");
            return Ok(ObservedOutcome::Ignored(IgnoredReason::NotBoundByDriver));
        };
        tracing::info!(port = %port.id, level = ?level, "Port is bound by this driver");

        if update.vif_type == VifType::Unbound && !update.original_vif_type.is_unbound_class() {
            tracing::info!(port = %port.id, "Port VIF type changed from bound to unbound");
            // The tracker only matches levels that carry a segmentation id.
            let segmentation_id = level.segmentation_id.unwrap_or_default();
            return self.unbind(update, segmentation_id).await;
        }

        if !update.vif_type.is_unbound_class() && update.original_vif_type.is_unbound_class() {
            tracing::info!(port = %port.id, "Port VIF type changed from unbound to bound");
            self.provisioning
                .complete(port.id, MLNX_IB_BAREMETAL_ENTITY)
                .await
                .map_err(BinderError::Provisioning)?;
            return Ok(ObservedOutcome::ProvisioningCompleted);
        }

        if port.status == PortStatus::Error && update.vif_type == VifType::BindingFailed {
            tracing::info!(port = %port.id, vif_details = ?update.vif_details, "Port binding failed");
            let failure = update
                .vif_details
                .as_ref()
                .and_then(BindingFailure::from_vif_details)
                .filter(|failure| failure.is_from_driver(DRIVER_NAME));
            if let Some(failure) = failure {
                tracing::info!(port = %port.id, "Port binding failure is caused by this driver, aborting update");
                return Err(PartitionBindingError::from(failure).into());
            }
        }

        Ok(ObservedOutcome::NoAction)
    }

    async fn on_network_deleted(&self, segments: &[Segment]) -> BinderResult<Vec<PartitionKey>> {
        let mut deleted = Vec::new();
        for segment in segments {
            if !self.policy.filter.is_segment_eligible(segment) {
                continue;
            }
            let pkey = PartitionKey::from_segmentation_id(segment.segmentation_id.unwrap_or_default())?;
            match self.fabric.delete(pkey).await {
                Ok(()) => deleted.push(pkey),
                Err(e) if e.is_not_found() => {
                    tracing::info!(pkey = %pkey, "UFM partition key does not exist, could not be deleted");
                }
                Err(e) => {
                    tracing::error!(pkey = %pkey, reason = %e, "Failed to delete UFM partition key");
                    return Err(e.into());
                }
            }
        }
        Ok(deleted)
    }
}
