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

// IdentityError is returned when an InfiniBand identity can't be
// derived or generated.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdentityError {
    // ZeroCount is returned when a virtual GUID batch of size
    // zero is requested.
    #[error("Virtual GUID count must be greater than zero")]
    ZeroCount,

    // CountExceedsSpace is returned when a random batch asks for more
    // than half of the distinct random values.
    #[error("Cannot generate {count} distinct random virtual GUIDs, at most {max} per batch")]
    CountExceedsSpace { count: usize, max: u64 },

    // InvalidClientId is returned when a client-id is not a 20 byte,
    // colon-separated hex string.
    #[error("Invalid InfiniBand client-id '{0}'")]
    InvalidClientId(String),

    // InvalidGuid is returned when parsing a GUID that isn't 16 to
    // 20 hex characters.
    #[error("Invalid GUID '{0}': expected 16 to 20 hex characters")]
    InvalidGuid(String),
}

pub type IdentityResult<T> = Result<T, IdentityError>;
