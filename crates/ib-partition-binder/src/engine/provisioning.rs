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

// src/engine/provisioning.rs
// ProvisioningBlocks is the host hook a bind uses to hold a port's
// provisioning open until the partition update is seen to land.

use async_trait::async_trait;
use uuid::Uuid;

#[async_trait]
pub trait ProvisioningBlocks: Send + Sync {
    // add_component registers pending work for a port under entity.
    async fn add_component(&self, port_id: Uuid, entity: &str) -> eyre::Result<()>;

    // complete marks that work done.
    async fn complete(&self, port_id: Uuid, entity: &str) -> eyre::Result<()>;
}

// LoggingProvisioning is for hosts without provisioning blocks: it
// only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingProvisioning;

#[async_trait]
impl ProvisioningBlocks for LoggingProvisioning {
    async fn add_component(&self, port_id: Uuid, entity: &str) -> eyre::Result<()> {
        tracing::info!(port = %port_id, entity = %entity, "Provisioning component added");
        Ok(())
    }

    async fn complete(&self, port_id: Uuid, entity: &str) -> eyre::Result<()> {
        tracing::info!(port = %port_id, entity = %entity, "Provisioning component completed");
        Ok(())
    }
}
