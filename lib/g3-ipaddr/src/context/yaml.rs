/*
 * SPDX-License-Identifier: Apache-2.0
 * Copyright 2025 ByteDance and/or its affiliates.
 */

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, anyhow};
use humanize_rs::ParseError;
use yaml_rust::Yaml;

use super::ResolverContextConfig;

fn normalize_key(raw: &str) -> String {
    raw.to_lowercase().replace('-', "_")
}

fn as_string(v: &Yaml) -> anyhow::Result<String> {
    match v {
        Yaml::String(s) => Ok(s.to_string()),
        _ => Err(anyhow!("yaml value type for 'string' should be 'string'")),
    }
}

fn as_usize(v: &Yaml) -> anyhow::Result<usize> {
    match v {
        Yaml::String(s) => Ok(usize::from_str(s)?),
        Yaml::Integer(i) => Ok(usize::try_from(*i)?),
        _ => Err(anyhow!(
            "yaml value type for 'usize' should be 'string' or 'integer'"
        )),
    }
}

fn as_bool(v: &Yaml) -> anyhow::Result<bool> {
    match v {
        Yaml::String(s) => match s.to_lowercase().as_str() {
            "on" | "true" | "yes" | "1" => Ok(true),
            "off" | "false" | "no" | "0" => Ok(false),
            _ => Err(anyhow!("invalid yaml string value for 'bool': {s}")),
        },
        Yaml::Boolean(value) => Ok(*value),
        Yaml::Integer(i) => Ok(*i != 0),
        _ => Err(anyhow!(
            "yaml value type for 'bool' should be 'boolean' / 'string' / 'integer'"
        )),
    }
}

fn as_duration(v: &Yaml) -> anyhow::Result<Duration> {
    match v {
        Yaml::String(value) => match humanize_rs::duration::parse(value) {
            Ok(v) => Ok(v),
            Err(ParseError::MissingUnit) => {
                let u = u64::from_str(value).map_err(|_| anyhow!("invalid duration string"))?;
                Ok(Duration::from_secs(u))
            }
            Err(e) => Err(anyhow!("invalid humanize duration string: {e}")),
        },
        Yaml::Integer(value) => {
            let u = u64::try_from(*value).map_err(|_| anyhow!("negative duration value"))?;
            Ok(Duration::from_secs(u))
        }
        _ => Err(anyhow!(
            "yaml value type for humanize duration should be 'string' or 'integer'"
        )),
    }
}

impl ResolverContextConfig {
    pub fn parse_yaml(v: &Yaml) -> anyhow::Result<Self> {
        let mut config = ResolverContextConfig::default();
        match v {
            Yaml::Hash(map) => {
                for (k, v) in map.iter() {
                    let k = k
                        .as_str()
                        .ok_or_else(|| anyhow!("yaml key should be string"))?;
                    config
                        .set_by_yaml_kv(k, v)
                        .context(format!("failed to parse key {k}"))?;
                }
                Ok(config)
            }
            Yaml::Null => Ok(config),
            _ => Err(anyhow!("yaml value type for resolver context should be 'map'")),
        }
    }

    pub fn set_by_yaml_kv(&mut self, k: &str, v: &Yaml) -> anyhow::Result<()> {
        match normalize_key(k).as_str() {
            "resolv_conf" | "resolv_conf_path" => {
                self.set_resolv_conf_path(as_string(v)?);
                Ok(())
            }
            "hosts" | "hosts_file" | "hosts_path" => {
                self.set_hosts_path(as_string(v)?);
                Ok(())
            }
            "server" | "servers" => match v {
                Yaml::String(addrs) => {
                    for s in addrs.split_whitespace() {
                        self.add_server_str(s)?;
                    }
                    Ok(())
                }
                Yaml::Array(seq) => {
                    for (i, v) in seq.iter().enumerate() {
                        let s = as_string(v).context(format!("invalid value for #{i}"))?;
                        self.add_server_str(&s)?;
                    }
                    Ok(())
                }
                _ => Err(anyhow!("invalid yaml value type, expect string / array")),
            },
            "timeout" | "each_timeout" => {
                self.set_timeout(as_duration(v)?);
                Ok(())
            }
            "attempts" | "each_tries" => {
                self.set_attempts(as_usize(v)?);
                Ok(())
            }
            "ndots" => {
                self.set_ndots(as_usize(v)?);
                Ok(())
            }
            "search" | "domains" => match v {
                Yaml::String(domains) => {
                    for s in domains.split_whitespace() {
                        self.add_search_domain(s)?;
                    }
                    Ok(())
                }
                Yaml::Array(seq) => {
                    for (i, v) in seq.iter().enumerate() {
                        let s = as_string(v).context(format!("invalid value for #{i}"))?;
                        self.add_search_domain(&s)?;
                    }
                    Ok(())
                }
                _ => Err(anyhow!("invalid yaml value type, expect string / array")),
            },
            "rotate" | "round_robin" => {
                self.set_rotate(as_bool(v)?);
                Ok(())
            }
            _ => Err(anyhow!("invalid key {k}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::path::PathBuf;
    use yaml_rust::YamlLoader;

    fn load(s: &str) -> Yaml {
        YamlLoader::load_from_str(s).unwrap().remove(0)
    }

    #[test]
    fn parse_ok() {
        let yaml = load(
            r#"
                resolv-conf: /run/resolv.conf
                hosts_file: /run/hosts
                server: "192.0.2.1 [2001:db8::1]:5353"
                timeout: 1500ms
                attempts: 3
                ndots: 2
                search: corp.example lab.example
                rotate: yes
            "#,
        );
        let config = ResolverContextConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.resolv_conf, Some(PathBuf::from("/run/resolv.conf")));
        assert_eq!(config.hosts, Some(PathBuf::from("/run/hosts")));
        assert_eq!(
            config.servers,
            vec![
                SocketAddr::from_str("192.0.2.1:53").unwrap(),
                SocketAddr::from_str("[2001:db8::1]:5353").unwrap(),
            ]
        );
        assert_eq!(config.timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.attempts, Some(3));
        assert_eq!(config.ndots, Some(2));
        assert_eq!(
            config.search,
            Some(vec!["corp.example".to_string(), "lab.example".to_string()])
        );
        assert!(config.rotate);
    }

    #[test]
    fn server_array() {
        let yaml = load(
            r#"
                servers:
                  - 192.0.2.1
                  - 192.0.2.2:5300
                domains:
                  - example.net
                timeout: 2
            "#,
        );
        let config = ResolverContextConfig::parse_yaml(&yaml).unwrap();
        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.search, Some(vec!["example.net".to_string()]));
        assert!(!config.rotate);
        assert_eq!(config.timeout, Some(Duration::from_secs(2)));
    }

    #[test]
    fn parse_err() {
        let mut config = ResolverContextConfig::default();
        assert!(config.set_by_yaml_kv("unknown", &Yaml::Null).is_err());
        assert!(config.set_by_yaml_kv("server", &Yaml::Integer(1)).is_err());
        assert!(config.set_by_yaml_kv("search", &Yaml::Integer(1)).is_err());
        assert!(
            config
                .set_by_yaml_kv("rotate", &Yaml::String("maybe".to_string()))
                .is_err()
        );
        assert!(
            config
                .set_by_yaml_kv("timeout", &Yaml::String("-1s".to_string()))
                .is_err()
        );
        assert!(
            config
                .set_by_yaml_kv("server", &Yaml::String("ns1.example.net".to_string()))
                .is_err()
        );
    }
}
