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

// src/identity/virtual_guid.rs
// Virtual GUID generation for SR-IOV virtual functions. A virtual
// GUID is laid out as:
//
//   fe fe | VV | 03 00 | TT TT TT
//
// where VV is the varying byte and TT TT TT is the tail. Sequential
// generation uses VV = offset and the tail of the source port MAC;
// random generation draws both VV and the tail.

use std::collections::HashSet;

use rand::Rng;

use crate::identity::error::{IdentityError, IdentityResult};
use crate::identity::guid::{Guid, mac_from_client_id, validate_client_id};

// VIRTUAL_MAC_OUI_STARTS is the OUI virtual GUIDs start from. The
// last byte is the base the sequential offset is added to.
pub const VIRTUAL_MAC_OUI_STARTS: [u8; 3] = [0xfe, 0xfe, 0x00];

// MLNX_GUID_FIXED_SEGMENT sits in the middle of every Mellanox GUID.
pub const MLNX_GUID_FIXED_SEGMENT: [u8; 2] = [0x03, 0x00];

// RANDOM_GUID_SPACE is the number of distinct values the four random
// bytes of a random virtual GUID can take.
pub const RANDOM_GUID_SPACE: u64 = 1 << 32;

// MAX_RANDOM_GUID_COUNT caps one random batch at half the space.
pub const MAX_RANDOM_GUID_COUNT: u64 = RANDOM_GUID_SPACE / 2;

fn assemble(varying: u8, tail: [u8; 3]) -> Guid {
    Guid::from_bytes([
        VIRTUAL_MAC_OUI_STARTS[0],
        VIRTUAL_MAC_OUI_STARTS[1],
        varying,
        MLNX_GUID_FIXED_SEGMENT[0],
        MLNX_GUID_FIXED_SEGMENT[1],
        tail[0],
        tail[1],
        tail[2],
    ])
}

// SequentialGuids yields `count` virtual GUIDs derived from one
// physical port. Offsets past 255 wrap the varying byte, so batches
// larger than 256 repeat earlier values.
#[derive(Debug, Clone)]
pub struct SequentialGuids {
    tail: [u8; 3],
    count: usize,
    offset: usize,
}

impl SequentialGuids {
    // restart rewinds the sequence to offset zero.
    pub fn restart(&mut self) {
        self.offset = 0;
    }
}

impl Iterator for SequentialGuids {
    type Item = Guid;

    fn next(&mut self) -> Option<Guid> {
        if self.offset >= self.count {
            return None;
        }
        // Truncation to u8 is the 8-bit counter wrap.
        let varying = VIRTUAL_MAC_OUI_STARTS[2].wrapping_add(self.offset as u8);
        self.offset += 1;
        Some(assemble(varying, self.tail))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.offset;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SequentialGuids {}

// sequential_virtual_guids builds the deterministic virtual GUID
// sequence for a physical port's client-id. The Nth GUID is the one
// used for the Nth default limited pkey.
pub fn sequential_virtual_guids(client_id: &str, count: usize) -> IdentityResult<SequentialGuids> {
    if count == 0 {
        return Err(IdentityError::ZeroCount);
    }
    validate_client_id(client_id)?;

    let mac = mac_from_client_id(client_id);
    let mut tail = [0u8; 3];
    for (slot, byte) in tail.iter_mut().zip(mac.split(':').skip(3)) {
        *slot = u8::from_str_radix(byte, 16)
            .map_err(|_| IdentityError::InvalidClientId(client_id.to_string()))?;
    }

    Ok(SequentialGuids {
        tail,
        count,
        offset: 0,
    })
}

// RandomGuids yields `count` random virtual GUIDs. Draws that repeat
// a value already produced in this batch are discarded, so a batch
// never contains duplicates.
#[derive(Debug, Clone)]
pub struct RandomGuids {
    count: usize,
    emitted: HashSet<u32>,
}

impl RandomGuids {
    // restart forgets the current batch; the next pass draws a
    // fresh set of values.
    pub fn restart(&mut self) {
        self.emitted.clear();
    }
}

impl Iterator for RandomGuids {
    type Item = Guid;

    fn next(&mut self) -> Option<Guid> {
        if self.emitted.len() >= self.count {
            return None;
        }
        let mut rng = rand::rng();
        let bits = loop {
            let candidate: u32 = rng.random();
            if self.emitted.insert(candidate) {
                break candidate;
            }
        };
        let [varying, t0, t1, t2] = bits.to_be_bytes();
        Some(assemble(varying, [t0, t1, t2]))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.emitted.len();
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RandomGuids {}

// random_virtual_guids builds a batch of random virtual GUIDs that
// don't depend on any physical port.
pub fn random_virtual_guids(count: usize) -> IdentityResult<RandomGuids> {
    if count == 0 {
        return Err(IdentityError::ZeroCount);
    }
    if count as u64 > MAX_RANDOM_GUID_COUNT {
        return Err(IdentityError::CountExceedsSpace {
            count,
            max: MAX_RANDOM_GUID_COUNT,
        });
    }
    Ok(RandomGuids {
        count,
        emitted: HashSet::with_capacity(count.min(1 << 16)),
    })
}
