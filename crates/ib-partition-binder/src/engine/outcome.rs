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

// src/engine/outcome.rs
// What the binder did with an event, for the host to act on.

use std::fmt::Display;

use uuid::Uuid;

use crate::binding::port::Segment;
use crate::binding::record::{BindingFailure, BindingRecord, LimitedPkeyMembers};
use crate::identity::guid::Guid;
use crate::ufm::pkey::PartitionKey;

// BindOutcome is the result of a bind attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    // NotManaged means the port isn't a bare-metal port.
    NotManaged,
    // NoEligibleSegment means none of the offered segments is one
    // this binder manages.
    NoEligibleSegment,
    // NoDevices means the node has no InfiniBand ports; nothing was
    // changed on the fabric.
    NoDevices,
    // Continue means the GUIDs were added. The host should record the
    // binding record as vif details and continue binding with the same
    // segment, so lower drivers can still bind the port.
    Continue {
        segment: Segment,
        record: BindingRecord,
    },
    // Failed means a fabric call failed. The host should set the
    // binding to binding_failed on this segment, with the failure as
    // vif details and the port status set to ERROR.
    Failed {
        segment_id: Uuid,
        failure: BindingFailure,
    },
}

// IgnoredReason says why a port update was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoredReason {
    NotBaremetal,
    NotBoundByDriver,
    NoDevices,
}

impl Display for IgnoredReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            IgnoredReason::NotBaremetal => "port is not a baremetal port",
            IgnoredReason::NotBoundByDriver => "port is not bound by this driver",
            IgnoredReason::NoDevices => "node has no InfiniBand ports",
        };
        write!(f, "{reason}")
    }
}

// ObservedOutcome is the result of handling a committed port update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObservedOutcome {
    Ignored(IgnoredReason),
    // Unbound means the node's GUIDs were removed from the dynamic
    // partition key and from every limited one.
    Unbound {
        pkey: PartitionKey,
        guids: Vec<Guid>,
        limited: Vec<LimitedPkeyMembers>,
    },
    // ProvisioningCompleted means the provisioning component added at
    // bind time was marked complete.
    ProvisioningCompleted,
    NoAction,
}
