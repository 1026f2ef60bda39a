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

//! ib-partition-binder keeps InfiniBand partition key membership on a UFM
//! fabric manager in step with the networks bare-metal nodes are bound to.
//!
//! The [engine::PartitionBinder] receives port binding events, resolves the
//! node's InfiniBand ports from Ironic, and adds or removes their GUIDs from
//! the partition keys the bound segment (and any configured limited pkeys)
//! name.

use std::sync::Once;

use tracing::metadata::LevelFilter;
use tracing_subscriber::filter::EnvFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::util::SubscriberInitExt;

pub mod binding;
pub mod cmd;
pub mod config;
pub mod eligibility;
pub mod engine;
pub mod identity;
pub mod inventory;
pub mod ufm;

static LOG_SETUP: Once = Once::new();

/// Initialize global logging output to STDOUT for hosts embedding the
/// binder. Use `export RUST_LOG=trace|debug|info|warn|error` to change the
/// log level. Calling it more than once is a no-op.
pub fn init_logging() -> eyre::Result<()> {
    let mut result = Ok(());
    LOG_SETUP.call_once(|| {
        result = subscriber()
            .try_init()
            .map_err(|e| eyre::eyre!("tracing_subscriber setup failed: {e}"));
    });
    result
}

// A logging subscriber for use on the current thread.
// Usually you want `init_logging()` instead.
//
// Usage: `let guard = subscriber().set_default()`
// Subscriber is unregistered when guard is dropped.
pub fn subscriber() -> impl SubscriberInitExt {
    let mut env_filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    for directive in ["hyper=warn", "rustls=warn", "reqwest=warn"] {
        if let Ok(directive) = directive.parse() {
            env_filter = env_filter.add_directive(directive);
        }
    }
    tracing_subscriber::registry().with(tracing_subscriber::fmt::layer().with_filter(env_filter))
}
