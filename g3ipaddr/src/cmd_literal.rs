/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use anyhow::anyhow;
use clap::{Arg, ArgMatches, Command};

use g3_ipaddr::{IpAddress, ResolveMode};

pub(super) const COMMAND: &str = "literal";

const COMMAND_ARG_TEXT: &str = "text";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Parse a numeric IPv4 / IPv6 address")
        .arg(
            Arg::new(COMMAND_ARG_TEXT)
                .value_name("ADDRESS")
                .num_args(1)
                .required(true),
        )
}

pub(super) fn run(args: &ArgMatches, port: i64, mode: ResolveMode) -> anyhow::Result<IpAddress> {
    let text = args
        .get_one::<String>(COMMAND_ARG_TEXT)
        .ok_or_else(|| anyhow!("no address text set"))?;
    let addr = g3_ipaddr::parse_literal(text, port, mode)
        .map_err(|e| anyhow!("failed to parse {text}: {e}"))?;
    Ok(addr)
}
