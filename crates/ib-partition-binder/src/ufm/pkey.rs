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

// src/ufm/pkey.rs
// Partition key types: the key itself, member options for adding
// GUIDs to it, and the models UFM returns when listing keys.

use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::identity::guid::Guid;
use crate::ufm::error::{UfmError, UfmResult};

// PKEY_MAX is the exclusive upper bound of a partition key. 0x7fff
// itself is the fabric's default partition.
pub const PKEY_MAX: u16 = 0x7fff;

// PartitionKey is an InfiniBand partition key in the open range
// (0x0, 0x7fff). It renders as lowercase hex with a 0x prefix and no
// padding, which is how UFM names the resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartitionKey(u16);

impl PartitionKey {
    pub fn new(value: u16) -> UfmResult<Self> {
        if value == 0 || value >= PKEY_MAX {
            return Err(UfmError::InvalidPartitionKey(format!("{value:#x}")));
        }
        Ok(Self(value))
    }

    // from_segmentation_id names the dynamic partition key of a
    // network segment.
    pub fn from_segmentation_id(segmentation_id: u32) -> UfmResult<Self> {
        let value = u16::try_from(segmentation_id)
            .map_err(|_| UfmError::InvalidPartitionKey(format!("{segmentation_id:#x}")))?;
        Self::new(value)
    }

    pub fn value(&self) -> u16 {
        self.0
    }
}

impl FromStr for PartitionKey {
    type Err = UfmError;

    // from_str parses "0x3e7e" style keys. The prefix is optional.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let parsed = u16::from_str_radix(digits, 16)
            .map_err(|_| UfmError::InvalidPartitionKey(value.to_string()))?;
        Self::new(parsed).map_err(|_| UfmError::InvalidPartitionKey(value.to_string()))
    }
}

impl TryFrom<String> for PartitionKey {
    type Error = UfmError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PartitionKey> for String {
    fn from(pkey: PartitionKey) -> Self {
        pkey.to_string()
    }
}

impl Display for PartitionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

// Membership is how a member takes part in a partition. Full members
// reach every member; limited members only reach full members.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Membership {
    #[default]
    Full,
    Limited,
}

impl Display for Membership {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Membership::Full => write!(f, "full"),
            Membership::Limited => write!(f, "limited"),
        }
    }
}

// MemberOptions are the per-call options of adding members to a
// partition key. index0 stores the key at slot 0 of each member's
// pkey table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemberOptions {
    pub index0: bool,
    pub ip_over_ib: bool,
    pub membership: Membership,
}

impl Default for MemberOptions {
    fn default() -> Self {
        Self {
            index0: true,
            ip_over_ib: true,
            membership: Membership::Full,
        }
    }
}

impl MemberOptions {
    // full is full membership with IPoIB.
    pub fn full(index0: bool) -> Self {
        Self {
            index0,
            ..Self::default()
        }
    }

    // limited is limited membership with IPoIB.
    pub fn limited(index0: bool) -> Self {
        Self {
            index0,
            ip_over_ib: true,
            membership: Membership::Limited,
        }
    }
}

// PKeyMembersRequest is the body UFM takes for both adding and
// replacing partition key members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PKeyMembersRequest {
    pub guids: Vec<Guid>,
    pub ip_over_ib: bool,
    pub index0: bool,
    pub membership: Membership,
    pub pkey: PartitionKey,
}

impl PKeyMembersRequest {
    pub fn new(pkey: PartitionKey, guids: &[Guid], options: MemberOptions) -> Self {
        Self {
            guids: guids.to_vec(),
            ip_over_ib: options.ip_over_ib,
            index0: options.index0,
            membership: options.membership,
            pkey,
        }
    }
}

// PKeyMember is one member GUID of a partition key as UFM reports it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PKeyMember {
    pub guid: String,
    #[serde(default)]
    pub membership: Membership,
    #[serde(default)]
    pub index0: bool,
}

// PKey is a partition key as UFM reports it. The key is kept as UFM
// named it, since listings include keys (like the 0x7fff default
// partition) outside the range this crate creates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PKey {
    pub pkey: String,
    #[serde(default)]
    pub partition: Option<String>,
    #[serde(default)]
    pub ip_over_ib: bool,
    #[serde(default)]
    pub guids: Vec<PKeyMember>,
}

// PKeyBody is a partition key entry without its name, the shape of
// both single-key responses and the values of a listing.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct PKeyBody {
    #[serde(default)]
    pub partition: Option<String>,
    #[serde(default)]
    pub ip_over_ib: bool,
    #[serde(default)]
    pub guids: Vec<PKeyMember>,
}

impl PKeyBody {
    pub(crate) fn named(self, pkey: impl Into<String>) -> PKey {
        PKey {
            pkey: pkey.into(),
            partition: self.partition,
            ip_over_ib: self.ip_over_ib,
            guids: self.guids,
        }
    }
}

// pkeys_from_listing converts the name-keyed map UFM answers a
// listing with into a list ordered by key name.
pub(crate) fn pkeys_from_listing(listing: BTreeMap<String, PKeyBody>) -> Vec<PKey> {
    listing
        .into_iter()
        .map(|(name, body)| body.named(name))
        .collect()
}
