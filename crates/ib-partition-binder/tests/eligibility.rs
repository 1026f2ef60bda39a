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

use ib_partition_binder::binding::{NetworkType, Segment};
use ib_partition_binder::eligibility::{PhysicalNetworks, SegmentFilter, is_segment_eligible};
use uuid::Uuid;

fn segment(network_type: NetworkType, segmentation_id: Option<u32>, physnet: Option<&str>) -> Segment {
    Segment {
        id: Uuid::new_v4(),
        network_id: Uuid::new_v4(),
        network_type,
        segmentation_id,
        physical_network: physnet.map(str::to_string),
    }
}

fn only(names: &[&str]) -> PhysicalNetworks {
    PhysicalNetworks::from(names.iter().map(|name| name.to_string()).collect::<Vec<_>>())
}

#[test]
fn test_vlan_and_vxlan_are_eligible_by_default() {
    let filter = SegmentFilter::default();
    assert!(filter.is_segment_eligible(&segment(NetworkType::Vlan, Some(100), Some("ibnet"))));
    assert!(filter.is_segment_eligible(&segment(NetworkType::Vxlan, Some(5000), None)));
    assert!(!filter.is_segment_eligible(&segment(NetworkType::Flat, Some(100), Some("ibnet"))));
    assert!(!filter.is_segment_eligible(&segment(NetworkType::Geneve, Some(100), None)));
}

#[test]
fn test_segmentation_id_must_be_set() {
    let filter = SegmentFilter::default();
    assert!(!filter.is_segment_eligible(&segment(NetworkType::Vlan, None, Some("ibnet"))));
    assert!(!filter.is_segment_eligible(&segment(NetworkType::Vlan, Some(0), Some("ibnet"))));
}

#[test]
fn test_physical_network_allow_list() {
    let types = [NetworkType::Vlan];
    let allowed = only(&["ibnet", "ibnet2"]);
    assert!(is_segment_eligible(
        &segment(NetworkType::Vlan, Some(10), Some("ibnet2")),
        &types,
        &allowed
    ));
    assert!(!is_segment_eligible(
        &segment(NetworkType::Vlan, Some(10), Some("datacenter")),
        &types,
        &allowed
    ));
    assert!(!is_segment_eligible(
        &segment(NetworkType::Vlan, Some(10), None),
        &types,
        &allowed
    ));
}

#[test]
fn test_wildcard_matches_segments_without_physnet() {
    let allowed = only(&["ibnet", "*"]);
    assert_eq!(allowed, PhysicalNetworks::Any);
    assert!(is_segment_eligible(
        &segment(NetworkType::Vlan, Some(10), None),
        &[NetworkType::Vlan],
        &allowed
    ));
}

#[test]
fn test_first_eligible_keeps_order() {
    let filter = SegmentFilter::new(vec![NetworkType::Vlan], only(&["ibnet"]));
    let segments = vec![
        segment(NetworkType::Vxlan, Some(7), Some("ibnet")),
        segment(NetworkType::Vlan, Some(8), Some("other")),
        segment(NetworkType::Vlan, Some(9), Some("ibnet")),
        segment(NetworkType::Vlan, Some(10), Some("ibnet")),
    ];
    let first = filter.first_eligible(&segments).unwrap();
    assert_eq!(first.segmentation_id, Some(9));
    assert!(filter.first_eligible(&segments[..2]).is_none());
}
