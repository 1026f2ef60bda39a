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

// src/identity/guid.rs
// Canonical GUID and MAC derivation from the client-id Ironic reports
// for a Mellanox InfiniBand port.
//
// The client-id is 59 characters: a fixed 12 byte Mellanox prefix
// followed by the 8 byte port GUID, all colon separated.
//
//   client-id - ff:00:00:00:00:00:02:00:00:02:c9:00:04:bd:70:03:00:37:44:86
//   GUID      - 04:bd:70:03:00:37:44:86  (wire form: 04bd700300374486)
//   MAC       - 04:bd:70:37:44:86        (GUID minus the 03:00 filler)

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::identity::error::{IdentityError, IdentityResult};

// MLNX_IB_CLIENT_ID_PREFIX is the Mellanox InfiniBand prefix which
// precedes the port GUID in a client-id.
pub const MLNX_IB_CLIENT_ID_PREFIX: &str = "ff:00:00:00:00:00:02:00:00:02:c9:00:";

// IB_CLIENT_ID_LEN is the length of a complete client-id string.
pub const IB_CLIENT_ID_LEN: usize = 59;

// GUID_SUFFIX_LEN is how many trailing client-id characters hold
// the GUID, including the leading separator.
const GUID_SUFFIX_LEN: usize = 24;

const GUID_MIN_LEN: usize = 16;
const GUID_MAX_LEN: usize = 20;

// has_client_id_len is the only check the tolerant helpers make
// before slicing. ASCII is required so the byte offsets below
// always land on character boundaries.
fn has_client_id_len(client_id: &str) -> bool {
    client_id.len() == IB_CLIENT_ID_LEN && client_id.is_ascii()
}

// canonical_guid strips the separators from the last 24 characters
// of a client-id. Inputs of any other length come back unchanged,
// so callers that need to know whether derivation actually happened
// should use Guid::from_client_id instead.
pub fn canonical_guid(client_id: &str) -> String {
    if has_client_id_len(client_id) {
        return client_id[IB_CLIENT_ID_LEN - GUID_SUFFIX_LEN..].replace(':', "");
    }
    client_id.to_string()
}

// mac_from_client_id builds the MAC-like address of an InfiniBand
// port from the upper three and lower three bytes of its GUID.
// Inputs that aren't client-id length come back unchanged.
pub fn mac_from_client_id(client_id: &str) -> String {
    if has_client_id_len(client_id) {
        let upper = &client_id[IB_CLIENT_ID_LEN - 23..IB_CLIENT_ID_LEN - 15];
        let lower = &client_id[IB_CLIENT_ID_LEN - 9..];
        return format!("{upper}{lower}");
    }
    client_id.to_string()
}

// validate_client_id checks the full client-id shape: 20 hex bytes
// separated by colons.
pub fn validate_client_id(client_id: &str) -> IdentityResult<()> {
    let invalid = || IdentityError::InvalidClientId(client_id.to_string());
    if !has_client_id_len(client_id) {
        return Err(invalid());
    }

    let well_formed = client_id.split(':').all(|byte| {
        byte.len() == 2 && byte.chars().all(|c| c.is_ascii_hexdigit())
    });
    if !well_formed {
        return Err(invalid());
    }
    Ok(())
}

// Guid is the wire-level identity of an InfiniBand port (or virtual
// function) as UFM expects it: lowercase hex, no separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Guid(String);

impl Guid {
    // from_client_id derives the canonical GUID of a client-id,
    // returning None when the client-id isn't well formed.
    pub fn from_client_id(client_id: &str) -> Option<Self> {
        validate_client_id(client_id).ok()?;
        Some(Self(canonical_guid(client_id).to_ascii_lowercase()))
    }

    // from_bytes renders an 8 byte GUID.
    pub fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes.iter().map(|b| format!("{b:02x}")).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for Guid {
    type Err = IdentityError;

    // from_str accepts the 16 to 20 hex character GUIDs UFM takes
    // and normalizes them to lowercase.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let len_ok = (GUID_MIN_LEN..=GUID_MAX_LEN).contains(&value.len());
        if !len_ok || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdentityError::InvalidGuid(value.to_string()));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }
}

impl TryFrom<String> for Guid {
    type Error = IdentityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Guid> for String {
    fn from(guid: Guid) -> Self {
        guid.0
    }
}

impl Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
