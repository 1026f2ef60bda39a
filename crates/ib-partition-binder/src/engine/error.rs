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

use thiserror::Error;

use crate::binding::record::BindingFailure;
use crate::identity::error::IdentityError;
use crate::inventory::error::InventoryError;
use crate::ufm::error::UfmError;

// PartitionBindingError is raised when a port update shows a bind
// this driver failed, so the update is aborted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Failed to add guids [{}] to UFM partition key {pkey}, reason is {reason}.", .guids.join(", "))]
pub struct PartitionBindingError {
    pub guids: Vec<String>,
    pub pkey: String,
    pub reason: String,
}

impl From<BindingFailure> for PartitionBindingError {
    fn from(failure: BindingFailure) -> Self {
        Self {
            guids: failure.guids,
            pkey: failure.pkey,
            reason: failure.reason,
        }
    }
}

// BinderError is returned by the binder's event handlers.
#[derive(Debug, Error)]
pub enum BinderError {
    // Inventory is returned when Ironic can't list a node's ports.
    #[error("Inventory lookup failed: {0}")]
    Inventory(#[from] InventoryError),

    // Fabric is returned when UFM fails outside of a bind, where
    // failures become a binding failure payload instead.
    #[error("UFM partition key update failed: {0}")]
    Fabric(#[from] UfmError),

    // Identity is returned when virtual GUIDs can't be generated.
    #[error("InfiniBand identity derivation failed: {0}")]
    Identity(#[from] IdentityError),

    // PartitionBinding is returned when a failed bind attributed to
    // this driver is observed.
    #[error(transparent)]
    PartitionBinding(#[from] PartitionBindingError),

    // Provisioning is returned when the host's provisioning hook
    // fails.
    #[error("Provisioning hook failed: {0}")]
    Provisioning(eyre::Report),
}

pub type BinderResult<T> = Result<T, BinderError>;
