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

use eyre::{Context, eyre};
use prettytable::{Cell, Row, Table};
use serde::Serialize;

use crate::cmd::args::{Cli, Commands, OutputFormat, PkeyAction};
use crate::config::BinderConfig;
use crate::identity::guid::{Guid, mac_from_client_id};
use crate::identity::virtual_guid::{random_virtual_guids, sequential_virtual_guids};
use crate::inventory::{InventoryApi, InventoryPort, IronicClient};
use crate::ufm::{MemberOptions, Membership, PKey, PartitionApi, UfmClient};

pub async fn run_cli(cli: Cli) -> eyre::Result<()> {
    let config = match &cli.config {
        Some(path) => BinderConfig::from_file(path)
            .wrap_err_with(|| format!("loading {}", path.display()))?,
        None => BinderConfig::default(),
    };

    match cli.command {
        Commands::Guid { client_id } => cmd_guid(&client_id, &cli.output)?,
        Commands::VirtualGuids {
            client_id,
            count,
            random,
        } => cmd_virtual_guids(client_id.as_deref(), count, random, &cli.output)?,
        Commands::Pkey { action } => {
            let ufm = UfmClient::from_config(&config.ufm)?;
            run_pkey_action(&ufm, action, &cli.output).await?;
        }
        Commands::Ports {
            node,
            infiniband_only,
        } => {
            let ironic = IronicClient::from_config(&config.ironic)?;
            cmd_ports(&ironic, &node, infiniband_only, &cli.output).await?;
        }
    }
    Ok(())
}

// IdentityView is the derived identity of one client-id.
#[derive(Debug, Serialize)]
struct IdentityView {
    client_id: String,
    guid: Guid,
    mac: String,
}

fn cmd_guid(client_id: &str, output: &OutputFormat) -> eyre::Result<()> {
    let guid = Guid::from_client_id(client_id)
        .ok_or_else(|| eyre!("'{client_id}' is not a valid InfiniBand client-id"))?;
    let view = IdentityView {
        client_id: client_id.to_string(),
        guid,
        mac: mac_from_client_id(client_id),
    };

    match output {
        OutputFormat::Json => print_json(&view)?,
        OutputFormat::AsciiTable => {
            let mut table = Table::new();
            table.add_row(Row::new(vec![Cell::new("Field"), Cell::new("Value")]));
            table.add_row(Row::new(vec![Cell::new("Client ID"), Cell::new(&view.client_id)]));
            table.add_row(Row::new(vec![Cell::new("GUID"), Cell::new(view.guid.as_str())]));
            table.add_row(Row::new(vec![Cell::new("MAC"), Cell::new(&view.mac)]));
            table.printstd();
        }
    }
    Ok(())
}

fn cmd_virtual_guids(
    client_id: Option<&str>,
    count: usize,
    random: bool,
    output: &OutputFormat,
) -> eyre::Result<()> {
    let guids: Vec<Guid> = match (random, client_id) {
        (true, _) => random_virtual_guids(count)?.collect(),
        (false, Some(client_id)) => sequential_virtual_guids(client_id, count)?.collect(),
        (false, None) => return Err(eyre!("a client-id is required unless --random is set")),
    };

    match output {
        OutputFormat::Json => print_json(&guids)?,
        OutputFormat::AsciiTable => {
            let mut table = Table::new();
            table.add_row(Row::new(vec![Cell::new("Offset"), Cell::new("Virtual GUID")]));
            for (offset, guid) in guids.iter().enumerate() {
                table.add_row(Row::new(vec![
                    Cell::new(&offset.to_string()),
                    Cell::new(guid.as_str()),
                ]));
            }
            table.printstd();
        }
    }
    Ok(())
}

async fn run_pkey_action(
    ufm: &dyn PartitionApi,
    action: PkeyAction,
    output: &OutputFormat,
) -> eyre::Result<()> {
    match action {
        PkeyAction::List { guids } => {
            let pkeys = ufm.list(guids).await?;
            match output {
                OutputFormat::Json => print_json(&pkeys)?,
                OutputFormat::AsciiTable => print_pkeys_table(&pkeys, guids),
            }
        }
        PkeyAction::Get { pkey } => {
            let pkey = ufm.get(pkey, true).await?;
            match output {
                OutputFormat::Json => print_json(&pkey)?,
                OutputFormat::AsciiTable => print_pkeys_table(std::slice::from_ref(&pkey), true),
            }
        }
        PkeyAction::Add {
            pkey,
            guids,
            limited,
            no_index0,
            no_ip_over_ib,
        } => {
            let options = MemberOptions {
                index0: !no_index0,
                ip_over_ib: !no_ip_over_ib,
                membership: if limited {
                    Membership::Limited
                } else {
                    Membership::Full
                },
            };
            ufm.add_members(pkey, &guids, options).await?;
            println!("Added {} GUID(s) to {pkey} as {} members", guids.len(), options.membership);
        }
        PkeyAction::Remove { pkey, guids } => match ufm.remove_members(pkey, &guids).await {
            Ok(()) => println!("Removed {} GUID(s) from {pkey}", guids.len()),
            Err(e) if e.is_not_found() => println!("{pkey} or its members are already gone"),
            Err(e) => return Err(e.into()),
        },
        PkeyAction::Delete { pkey } => {
            ufm.delete(pkey).await?;
            println!("Deleted {pkey}");
        }
    }
    Ok(())
}

// print_pkeys_table displays partition keys, one row per member when
// members are shown.
fn print_pkeys_table(pkeys: &[PKey], with_guids: bool) {
    let mut table = Table::new();
    let mut header = vec![
        Cell::new("PKey"),
        Cell::new("Partition"),
        Cell::new("IPoIB"),
    ];
    if with_guids {
        header.extend([Cell::new("GUID"), Cell::new("Membership"), Cell::new("Index0")]);
    }
    table.add_row(Row::new(header));

    for pkey in pkeys {
        let partition = pkey.partition.clone().unwrap_or_default();
        let base = [
            pkey.pkey.clone(),
            partition,
            pkey.ip_over_ib.to_string(),
        ];
        if !with_guids || pkey.guids.is_empty() {
            let mut cells: Vec<Cell> = base.iter().map(|v| Cell::new(v)).collect();
            if with_guids {
                cells.extend([Cell::new(""), Cell::new(""), Cell::new("")]);
            }
            table.add_row(Row::new(cells));
            continue;
        }
        for member in &pkey.guids {
            let mut cells: Vec<Cell> = base.iter().map(|v| Cell::new(v)).collect();
            cells.extend([
                Cell::new(&member.guid),
                Cell::new(&member.membership.to_string()),
                Cell::new(&member.index0.to_string()),
            ]);
            table.add_row(Row::new(cells));
        }
    }

    table.printstd();
}

async fn cmd_ports(
    ironic: &dyn InventoryApi,
    node: &str,
    infiniband_only: bool,
    output: &OutputFormat,
) -> eyre::Result<()> {
    let ports: Vec<InventoryPort> = ironic
        .list_node_ports(node)
        .await?
        .into_iter()
        .filter(|port| !infiniband_only || port.is_infiniband())
        .collect();

    match output {
        OutputFormat::Json => print_json(&ports)?,
        OutputFormat::AsciiTable => {
            let mut table = Table::new();
            table.add_row(Row::new(vec![
                Cell::new("UUID"),
                Cell::new("Address"),
                Cell::new("Client ID"),
                Cell::new("GUID"),
            ]));
            for port in &ports {
                let client_id = port.client_id().unwrap_or_default();
                let guid = Guid::from_client_id(client_id)
                    .map(|guid| guid.to_string())
                    .unwrap_or_default();
                table.add_row(Row::new(vec![
                    Cell::new(&port.uuid.to_string()),
                    Cell::new(&port.address),
                    Cell::new(client_id),
                    Cell::new(&guid),
                ]));
            }
            table.printstd();
        }
    }
    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> eyre::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
