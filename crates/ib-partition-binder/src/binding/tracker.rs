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

// src/binding/tracker.rs
// Works out whether this driver bound a port, from the binding levels
// recorded on it. The ports bound here are bare-metal PXE ports; the
// InfiniBand ports they stand for live on the same Ironic node.

use std::collections::HashSet;

use crate::binding::port::{BindingLevel, Port, Segment};

// find_own_binding_level returns the first binding level recorded by
// driver_name whose segmentation id belongs to the port's network.
pub fn find_own_binding_level<'a>(
    levels: &'a [BindingLevel],
    network_segments: &[Segment],
    driver_name: &str,
) -> Option<&'a BindingLevel> {
    let network_segmentation_ids: HashSet<u32> = network_segments
        .iter()
        .filter_map(|segment| segment.segmentation_id)
        .collect();

    levels.iter().find(|level| {
        level.driver == driver_name
            && level
                .segmentation_id
                .is_some_and(|id| network_segmentation_ids.contains(&id))
    })
}

// BindingState is what a port's binding levels say about who bound it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindingState<'a> {
    // BoundByThisDriver carries the level this driver recorded.
    BoundByThisDriver(&'a BindingLevel),
    // BoundByOtherDriver means the port has binding levels, none of
    // them ours on this network.
    BoundByOtherDriver,
    // Unbound means no driver recorded any level.
    Unbound,
}

impl<'a> BindingState<'a> {
    // of classifies a port against its network's segments.
    pub fn of(port: &'a Port, network_segments: &[Segment], driver_name: &str) -> Self {
        if port.binding_levels.is_empty() {
            return BindingState::Unbound;
        }
        match find_own_binding_level(&port.binding_levels, network_segments, driver_name) {
            Some(level) => BindingState::BoundByThisDriver(level),
            None => BindingState::BoundByOtherDriver,
        }
    }

    pub fn own_level(&self) -> Option<&'a BindingLevel> {
        match self {
            BindingState::BoundByThisDriver(level) => Some(level),
            _ => None,
        }
    }
}
