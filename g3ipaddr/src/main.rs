/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::io;
use std::str::FromStr;

use anyhow::anyhow;
use clap::{Arg, ArgAction, ArgMatches, Command, value_parser};
use clap_complete::Shell;

use g3_ipaddr::{IpAddress, ResolveMode};

mod logger;

mod cmd_literal;
mod cmd_local;
mod cmd_remote;

const GLOBAL_ARG_COMPLETION: &str = "completion";
const GLOBAL_ARG_MODE: &str = "mode";
const GLOBAL_ARG_PORT: &str = "port";
const GLOBAL_ARG_VERBOSE: &str = "verbose";

fn build_cli_args() -> Command {
    Command::new("g3ipaddr")
        .arg(
            Arg::new(GLOBAL_ARG_COMPLETION)
                .num_args(1)
                .value_name("SHELL")
                .long("completion")
                .value_parser(value_parser!(Shell))
                .exclusive(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_MODE)
                .help("address family selection mode")
                .long_help(
                    "address family selection mode, \
                     one of: unspecified, ipv4, ipv6, prefer_ipv4, prefer_ipv6",
                )
                .num_args(1)
                .value_name("MODE")
                .long("mode")
                .short('m')
                .default_value("unspecified")
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_PORT)
                .help("port to set in the resolved address")
                .num_args(1)
                .value_name("PORT")
                .long("port")
                .short('p')
                .value_parser(value_parser!(i64))
                .default_value("0")
                .allow_negative_numbers(true)
                .global(true),
        )
        .arg(
            Arg::new(GLOBAL_ARG_VERBOSE)
                .help("show verbose message")
                .num_args(0)
                .action(ArgAction::Count)
                .short('v')
                .global(true),
        )
        .subcommand(cmd_literal::command())
        .subcommand(cmd_local::command())
        .subcommand(cmd_remote::command())
}

fn get_mode(args: &ArgMatches) -> anyhow::Result<ResolveMode> {
    match args.get_one::<String>(GLOBAL_ARG_MODE) {
        Some(s) => ResolveMode::from_str(s).map_err(|_| anyhow!("invalid resolve mode {s}")),
        None => Ok(ResolveMode::default()),
    }
}

fn get_port(args: &ArgMatches) -> i64 {
    args.get_one::<i64>(GLOBAL_ARG_PORT)
        .copied()
        .unwrap_or_default()
}

fn print_address(addr: &IpAddress) {
    println!("{} {} {}", addr, addr.port(), addr.family());
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = build_cli_args().get_matches();

    if let Some(target) = args.get_one::<Shell>(GLOBAL_ARG_COMPLETION) {
        let mut app = build_cli_args();
        let bin_name = app.get_name().to_string();
        clap_complete::generate(*target, &mut app, bin_name, &mut io::stdout());
        return Ok(());
    }

    let verbose_level = args
        .get_one::<u8>(GLOBAL_ARG_VERBOSE)
        .copied()
        .unwrap_or_default();
    logger::SyncLogger::new(verbose_level)
        .into_global_logger()
        .map_err(|e| anyhow!("failed to set logger: {e}"))?;

    let Some((subcommand, sub_args)) = args.subcommand() else {
        return Err(anyhow!("no subcommand found"));
    };
    let mode = get_mode(sub_args)?;
    let port = get_port(sub_args);

    let addr = match subcommand {
        cmd_literal::COMMAND => cmd_literal::run(sub_args, port, mode)?,
        cmd_local::COMMAND => cmd_local::run(sub_args, port, mode)?,
        cmd_remote::COMMAND => cmd_remote::run(sub_args, port, mode).await?,
        cmd => return Err(anyhow!("invalid subcommand {cmd}")),
    };
    print_address(&addr);
    Ok(())
}
