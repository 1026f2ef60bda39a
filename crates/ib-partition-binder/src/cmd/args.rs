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

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::identity::guid::Guid;
use crate::ufm::pkey::PartitionKey;

#[derive(Debug, Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    #[value(name = "table")]
    AsciiTable,
    #[value(name = "json")]
    Json,
}

#[derive(Debug, Clone, ValueEnum, Default)]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser)]
#[command(name = "ib-partition-ctl")]
#[command(about = "Inspect InfiniBand identities and UFM partition keys")]
#[command(version)]
pub struct Cli {
    // --log-level controls the tracing output level (default: info).
    // Can be overridden by the RUST_LOG environment variable.
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    // --config is the binder TOML configuration, used for the UFM
    // and Ironic connection settings. Defaults apply without it.
    #[arg(short, long, env = "IB_PARTITION_BINDER_CONFIG")]
    pub config: Option<PathBuf>,

    // --output selects table or JSON output.
    #[arg(short, long, default_value = "table")]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // Guid shows the canonical GUID and MAC of a client-id.
    Guid {
        // client_id is the 59 character InfiniBand client-id.
        client_id: String,
    },
    // VirtualGuids generates SR-IOV virtual GUIDs, either derived
    // from a client-id or at random.
    #[command(name = "virtual-guids")]
    VirtualGuids {
        // client_id is the source port's client-id; not used with
        // --random.
        #[arg(required_unless_present = "random")]
        client_id: Option<String>,

        // --count is how many virtual GUIDs to generate.
        #[arg(short = 'n', long, default_value_t = 1)]
        count: usize,

        // --random draws random virtual GUIDs instead.
        #[arg(long)]
        random: bool,
    },
    // Pkey is for UFM partition key operations.
    Pkey {
        #[command(subcommand)]
        action: PkeyAction,
    },
    // Ports lists the Ironic ports of a node.
    Ports {
        // node is the Ironic node UUID or name.
        node: String,

        // --infiniband-only hides ports without a client-id.
        #[arg(long)]
        infiniband_only: bool,
    },
}

#[derive(Subcommand)]
pub enum PkeyAction {
    // List shows every partition key on the fabric.
    List {
        // --guids includes member GUIDs.
        #[arg(long)]
        guids: bool,
    },
    // Get shows one partition key and its members.
    Get { pkey: PartitionKey },
    // Add adds GUIDs to a partition key, creating it if needed.
    Add {
        pkey: PartitionKey,

        #[arg(required = true, num_args = 1..)]
        guids: Vec<Guid>,

        // --limited adds the GUIDs as limited members.
        #[arg(long)]
        limited: bool,

        // --no-index0 leaves slot 0 of the members' pkey tables alone.
        #[arg(long)]
        no_index0: bool,

        // --no-ip-over-ib leaves the pkey out of the IPoIB multicast
        // group.
        #[arg(long)]
        no_ip_over_ib: bool,
    },
    // Remove removes GUIDs from a partition key. A missing key or
    // member is not an error.
    Remove {
        pkey: PartitionKey,

        #[arg(required = true, num_args = 1..)]
        guids: Vec<Guid>,
    },
    // Delete deletes a partition key.
    Delete { pkey: PartitionKey },
}
