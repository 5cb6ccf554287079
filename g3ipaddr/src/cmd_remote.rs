/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, anyhow};
use clap::{Arg, ArgMatches, Command, value_parser};
use tokio::time::Instant;
use yaml_rust::YamlLoader;

use g3_ipaddr::{IpAddress, ResolveMode, ResolverContextConfig};

pub(super) const COMMAND: &str = "remote";

const COMMAND_ARG_HOST: &str = "host";
const COMMAND_ARG_TIMEOUT: &str = "timeout";
const COMMAND_ARG_CONFIG: &str = "config";
const COMMAND_ARG_RESOLV_CONF: &str = "resolv-conf";
const COMMAND_ARG_HOSTS: &str = "hosts";
const COMMAND_ARG_SERVER: &str = "server";

pub(super) fn command() -> Command {
    Command::new(COMMAND)
        .about("Resolve an address to connect to")
        .arg(
            Arg::new(COMMAND_ARG_HOST)
                .help("literal address or host name")
                .value_name("HOST")
                .num_args(1)
                .required(true),
        )
        .arg(
            Arg::new(COMMAND_ARG_TIMEOUT)
                .help("timeout for the whole resolution, no timeout if not set")
                .value_name("TIMEOUT DURATION")
                .long(COMMAND_ARG_TIMEOUT)
                .short('t')
                .num_args(1),
        )
        .arg(
            Arg::new(COMMAND_ARG_CONFIG)
                .help("resolver config file in yaml format")
                .value_name("CONFIG FILE")
                .long(COMMAND_ARG_CONFIG)
                .short('c')
                .num_args(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(COMMAND_ARG_RESOLV_CONF)
                .help("path of the resolv.conf file")
                .value_name("FILE PATH")
                .long(COMMAND_ARG_RESOLV_CONF)
                .num_args(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(COMMAND_ARG_HOSTS)
                .help("path of the hosts file")
                .value_name("FILE PATH")
                .long(COMMAND_ARG_HOSTS)
                .num_args(1)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new(COMMAND_ARG_SERVER)
                .help("name server address, override the ones in resolv.conf")
                .value_name("SERVER ADDRESS")
                .long(COMMAND_ARG_SERVER)
                .short('s')
                .num_args(1)
                .action(clap::ArgAction::Append),
        )
}

fn parse_timeout(s: &str) -> anyhow::Result<Duration> {
    if let Ok(secs) = s.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humanize_rs::duration::parse(s).map_err(|e| anyhow!("invalid timeout value {s}: {e}"))
}

fn load_config(args: &ArgMatches) -> anyhow::Result<ResolverContextConfig> {
    let mut config = match args.get_one::<PathBuf>(COMMAND_ARG_CONFIG) {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .context(format!("failed to read config file {}", path.display()))?;
            let docs = YamlLoader::load_from_str(&content)
                .map_err(|e| anyhow!("invalid yaml file {}: {e}", path.display()))?;
            match docs.first() {
                Some(doc) => ResolverContextConfig::parse_yaml(doc)
                    .context(format!("invalid config in file {}", path.display()))?,
                None => ResolverContextConfig::default(),
            }
        }
        None => ResolverContextConfig::default(),
    };

    if let Some(path) = args.get_one::<PathBuf>(COMMAND_ARG_RESOLV_CONF) {
        config.set_resolv_conf_path(path);
    }
    if let Some(path) = args.get_one::<PathBuf>(COMMAND_ARG_HOSTS) {
        config.set_hosts_path(path);
    }
    if let Some(servers) = args.get_many::<String>(COMMAND_ARG_SERVER) {
        for s in servers {
            config.add_server_str(s)?;
        }
    }
    Ok(config)
}

pub(super) async fn run(
    args: &ArgMatches,
    port: i64,
    mode: ResolveMode,
) -> anyhow::Result<IpAddress> {
    let host = args
        .get_one::<String>(COMMAND_ARG_HOST)
        .ok_or_else(|| anyhow!("no host set"))?;
    let deadline = match args.get_one::<String>(COMMAND_ARG_TIMEOUT) {
        Some(s) => Some(Instant::now() + parse_timeout(s)?),
        None => None,
    };

    let ctx = load_config(args)?
        .build()
        .context("failed to load resolver context")?;
    let addr = g3_ipaddr::resolve_remote(&ctx, host, port, mode, deadline)
        .await
        .map_err(|e| anyhow!("failed to resolve {host}: {e}"))?;
    Ok(addr)
}
