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

// src/eligibility/filter.rs
// Decides which segments and ports the binder manages. A segment is
// eligible when its network type is allowed, it carries a non-zero
// segmentation id, and its physical network is one the binder watches.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::binding::port::{NetworkType, Port, Segment, VnicType};

// PHYSICAL_NETWORK_ANY is the physical network wildcard. It matches any
// physical network, including a segment without one.
pub const PHYSICAL_NETWORK_ANY: &str = "*";

// SUPPORTED_NETWORK_TYPES are the segment types partition keys can be
// derived from when nothing else is configured.
pub const SUPPORTED_NETWORK_TYPES: [NetworkType; 2] = [NetworkType::Vlan, NetworkType::Vxlan];

// PhysicalNetworks is the resolved physical network allow-list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub enum PhysicalNetworks {
    // Any matches every physical network, set by a "*" entry.
    #[default]
    Any,
    // Only matches the listed physical networks.
    Only(Vec<String>),
}

impl PhysicalNetworks {
    // matches reports whether a segment's physical network is allowed.
    pub fn matches(&self, physical_network: Option<&str>) -> bool {
        match self {
            PhysicalNetworks::Any => true,
            PhysicalNetworks::Only(allowed) => physical_network
                .is_some_and(|physnet| allowed.iter().any(|name| name == physnet)),
        }
    }
}

impl From<Vec<String>> for PhysicalNetworks {
    fn from(names: Vec<String>) -> Self {
        if names.iter().any(|name| name == PHYSICAL_NETWORK_ANY) {
            PhysicalNetworks::Any
        } else {
            PhysicalNetworks::Only(names)
        }
    }
}

impl From<PhysicalNetworks> for Vec<String> {
    fn from(networks: PhysicalNetworks) -> Self {
        match networks {
            PhysicalNetworks::Any => vec![PHYSICAL_NETWORK_ANY.to_string()],
            PhysicalNetworks::Only(names) => names,
        }
    }
}

impl Display for PhysicalNetworks {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PhysicalNetworks::Any => write!(f, "{PHYSICAL_NETWORK_ANY}"),
            PhysicalNetworks::Only(names) => write!(f, "{}", names.join(",")),
        }
    }
}

// is_segment_eligible is the single eligibility check for segments.
pub fn is_segment_eligible(
    segment: &Segment,
    allowed_types: &[NetworkType],
    allowed_physical_networks: &PhysicalNetworks,
) -> bool {
    if !allowed_types.contains(&segment.network_type) {
        tracing::debug!(
            network_id = %segment.network_id,
            segment_id = %segment.id,
            network_type = %segment.network_type,
            "Segment network type is not supported"
        );
        return false;
    }

    if segment.segmentation_id.unwrap_or(0) == 0 {
        tracing::debug!(
            network_id = %segment.network_id,
            segment_id = %segment.id,
            "Segment has no segmentation id to derive a partition key from"
        );
        return false;
    }

    if !allowed_physical_networks.matches(segment.physical_network.as_deref()) {
        tracing::debug!(
            network_id = %segment.network_id,
            segment_id = %segment.id,
            physnet = ?segment.physical_network,
            allowed = %allowed_physical_networks,
            "Segment physical network is not watched"
        );
        return false;
    }

    true
}

// is_baremetal_port reports whether a port is attached through a
// bare-metal NIC.
pub fn is_baremetal_port(port: &Port) -> bool {
    port.vnic_type == VnicType::Baremetal
}

// SegmentFilter bundles the configured network types and physical
// networks so callers don't pass them around separately.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentFilter {
    pub network_types: Vec<NetworkType>,
    pub physical_networks: PhysicalNetworks,
}

impl Default for SegmentFilter {
    fn default() -> Self {
        Self {
            network_types: SUPPORTED_NETWORK_TYPES.to_vec(),
            physical_networks: PhysicalNetworks::Any,
        }
    }
}

impl SegmentFilter {
    pub fn new(network_types: Vec<NetworkType>, physical_networks: PhysicalNetworks) -> Self {
        Self {
            network_types,
            physical_networks,
        }
    }

    pub fn is_segment_eligible(&self, segment: &Segment) -> bool {
        is_segment_eligible(segment, &self.network_types, &self.physical_networks)
    }

    // first_eligible returns the first eligible segment of a list.
    pub fn first_eligible<'a>(&self, segments: &'a [Segment]) -> Option<&'a Segment> {
        segments.iter().find(|segment| self.is_segment_eligible(segment))
    }
}

#[cfg(test)]
mod tests {
    use uuid::Uuid;

    use super::*;

    fn segment(network_type: NetworkType, seg_id: Option<u32>, physnet: Option<&str>) -> Segment {
        Segment {
            id: Uuid::new_v4(),
            network_id: Uuid::new_v4(),
            network_type,
            segmentation_id: seg_id,
            physical_network: physnet.map(str::to_string),
        }
    }

    #[test]
    fn test_physical_networks_from_names() {
        let any = PhysicalNetworks::from(vec!["physnet1".to_string(), "*".to_string()]);
        assert_eq!(any, PhysicalNetworks::Any);
        let only = PhysicalNetworks::from(vec!["physnet1".to_string()]);
        assert!(only.matches(Some("physnet1")));
        assert!(!only.matches(Some("physnet2")));
        assert!(!only.matches(None));
    }

    #[test]
    fn test_default_filter() {
        let filter = SegmentFilter::default();
        assert!(filter.is_segment_eligible(&segment(NetworkType::Vxlan, Some(15998), None)));
        assert!(filter.is_segment_eligible(&segment(NetworkType::Vlan, Some(100), Some("ib"))));
        assert!(!filter.is_segment_eligible(&segment(NetworkType::Flat, Some(100), None)));
    }

    #[test]
    fn test_first_eligible() {
        let filter = SegmentFilter::default();
        let segments = vec![
            segment(NetworkType::Flat, Some(1), None),
            segment(NetworkType::Vlan, Some(0), None),
            segment(NetworkType::Vlan, Some(42), None),
        ];
        let found = filter.first_eligible(&segments).unwrap();
        assert_eq!(found.segmentation_id, Some(42));
    }
}
