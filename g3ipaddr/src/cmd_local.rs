/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use g3_ipaddr::{IpAddress, ResolveMode};

pub(super) const COMMAND: &str = "local";

const COMMAND_ARG_NAME: &str = "name";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Resolve an address to bind to")
        .arg(
            Arg::new(COMMAND_ARG_NAME)
                .help("literal address or local interface name, wildcard address if absent")
                .value_name("NAME")
                .num_args(1),
        )
}

pub(super) fn run(args: &ArgMatches, port: i64, mode: ResolveMode) -> anyhow::Result<IpAddress> {
    let name = args.get_one::<String>(COMMAND_ARG_NAME).map(|s| s.as_str());
    let addr = g3_ipaddr::resolve_local(name, port, mode).map_err(|e| match name {
        Some(name) => anyhow!("failed to resolve local address {name}: {e}"),
        None => anyhow!("failed to get wildcard address: {e}"),
    })?;
    Ok(addr)
}
