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

pub mod port;
pub mod record;
pub mod tracker;

// DRIVER_NAME identifies this driver in binding levels and failure
// payloads.
pub const DRIVER_NAME: &str = "mlnx_ib_bm";

// MLNX_IB_BAREMETAL_ENTITY is the provisioning component a bind
// registers, and completes once the port is seen bound.
pub const MLNX_IB_BAREMETAL_ENTITY: &str = "MLNX-IB-Baremetal";

pub use port::{
    BindRequest, BindingLevel, NetworkType, Port, PortStatus, PortUpdate, Segment, VifType,
    VnicType,
};
pub use record::{BindingFailure, BindingRecord, LimitedPkeyMembers};
pub use tracker::{BindingState, find_own_binding_level};
