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

use ib_partition_binder::binding::{
    BindingLevel, BindingState, NetworkType, Port, PortStatus, Segment, VnicType,
    find_own_binding_level,
};
use mac_address::MacAddress;
use uuid::Uuid;

const DRIVER: &str = "mlnx_ib_bm";

fn level(driver: &str, segmentation_id: Option<u32>, level: u32) -> BindingLevel {
    BindingLevel {
        driver: driver.to_string(),
        segmentation_id,
        network_type: Some(NetworkType::Vlan),
        physical_network: None,
        level,
    }
}

fn segments(ids: &[u32]) -> Vec<Segment> {
    ids.iter()
        .map(|id| Segment {
            id: Uuid::new_v4(),
            network_id: Uuid::new_v4(),
            network_type: NetworkType::Vlan,
            segmentation_id: Some(*id),
            physical_network: None,
        })
        .collect()
}

fn port(binding_levels: Vec<BindingLevel>) -> Port {
    Port {
        id: Uuid::new_v4(),
        mac_address: MacAddress::new([0x52, 0x54, 0x00, 0xaa, 0xbb, 0xcc]),
        vnic_type: VnicType::Baremetal,
        host_id: Some("node-1".to_string()),
        status: PortStatus::Active,
        binding_levels,
    }
}

#[test]
fn test_finds_own_level_on_network() {
    let levels = vec![level("ovn", Some(100), 0), level(DRIVER, Some(100), 1)];
    let found = find_own_binding_level(&levels, &segments(&[100]), DRIVER).unwrap();
    assert_eq!(found.level, 1);
}

#[test]
fn test_ignores_own_level_on_other_network() {
    let levels = vec![level(DRIVER, Some(200), 0)];
    assert!(find_own_binding_level(&levels, &segments(&[100]), DRIVER).is_none());
}

#[test]
fn test_ignores_own_level_without_segmentation_id() {
    let levels = vec![level(DRIVER, None, 0)];
    assert!(find_own_binding_level(&levels, &segments(&[100]), DRIVER).is_none());
}

#[test]
fn test_binding_state() {
    let unbound = port(Vec::new());
    assert_eq!(BindingState::of(&unbound, &segments(&[100]), DRIVER), BindingState::Unbound);

    let other = port(vec![level("ovn", Some(100), 0)]);
    let state = BindingState::of(&other, &segments(&[100]), DRIVER);
    assert_eq!(state, BindingState::BoundByOtherDriver);
    assert!(state.own_level().is_none());

    let ours = port(vec![level(DRIVER, Some(100), 0)]);
    let state = BindingState::of(&ours, &segments(&[50, 100]), DRIVER);
    assert_eq!(state.own_level().and_then(|l| l.segmentation_id), Some(100));
}
