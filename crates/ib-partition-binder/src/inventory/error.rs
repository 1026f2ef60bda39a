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

// InventoryError is returned when Ironic can't answer an inventory
// request.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InventoryError {
    // Unavailable is returned for transport failures, rejected
    // credentials, and server side errors.
    #[error("Ironic is unavailable for {url}: {error}")]
    Unavailable { url: String, error: String },

    // NotFound is returned when the requested port doesn't exist.
    #[error("Ironic resource not found: {0}")]
    NotFound(String),

    // Conflict is returned when Ironic kept answering 409, typically
    // because the node stayed locked, after every retry was spent.
    #[error("Ironic request {url} conflicted: {error}")]
    Conflict { url: String, error: String },

    // InvalidResponse is returned when a response body can't be
    // decoded.
    #[error("Invalid Ironic response from {url}: {error}")]
    InvalidResponse { url: String, error: String },
}

impl InventoryError {
    // from_status classifies an Ironic error status.
    pub fn from_status(url: &str, status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            404 => InventoryError::NotFound(url.to_string()),
            409 => InventoryError::Conflict {
                url: url.to_string(),
                error: body,
            },
            _ => InventoryError::Unavailable {
                url: url.to_string(),
                error: format!("HTTP {status}: {body}"),
            },
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, InventoryError::Conflict { .. })
    }
}

pub type InventoryResult<T> = Result<T, InventoryError>;
