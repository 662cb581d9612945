//! HTTP(S) proxy resolution from the job and process environment

use anyhow::{Context, Result};
use reqwest::Url;
use std::collections::HashMap;
use std::env;
use tracing::{debug, error};

/// Environment variables supplied by the job, consulted before the process
/// environment
pub type EnvVars = HashMap<String, String>;

pub const HTTPS_PROXY: &str = "HTTPS_PROXY";
pub const HTTP_PROXY: &str = "HTTP_PROXY";
pub const NO_PROXY: &str = "NO_PROXY";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyCredentials {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProxyDescriptor {
    Direct,
    Http {
        host: String,
        port: u16,
        credentials: Option<ProxyCredentials>,
    },
}

impl ProxyDescriptor {
    pub fn is_direct(&self) -> bool {
        matches!(self, ProxyDescriptor::Direct)
    }

    /// Build a reqwest proxy routing every request through this descriptor
    pub fn to_reqwest(&self) -> Result<Option<reqwest::Proxy>> {
        match self {
            ProxyDescriptor::Direct => Ok(None),
            ProxyDescriptor::Http {
                host,
                port,
                credentials,
            } => {
                let mut proxy = reqwest::Proxy::all(format!("http://{}:{}", host, port))
                    .context("Failed to configure proxy")?;
                if let Some(creds) = credentials {
                    proxy = proxy.basic_auth(&creds.username, &creds.password);
                }
                Ok(Some(proxy))
            }
        }
    }
}

/// Treats the literal `null` as blank, as form layers tend to emit it
pub fn is_blank(value: Option<&str>) -> bool {
    match value {
        None => true,
        Some(v) => v.trim().is_empty() || v == "null",
    }
}

/// Job env exact-case, job env lower-case, process env exact-case, process
/// env lower-case; first non-blank wins
pub fn lookup(key: &str, env_vars: &EnvVars) -> Option<String> {
    let lower = key.to_lowercase();
    let candidates = [
        env_vars.get(key).cloned(),
        env_vars.get(&lower).cloned(),
        env::var(key).ok(),
        env::var(&lower).ok(),
    ];
    candidates
        .into_iter()
        .find(|candidate| !is_blank(candidate.as_deref()))
        .flatten()
}

fn parse_credentials(url: &Url) -> Option<ProxyCredentials> {
    let password = url.password()?;
    if url.username().is_empty() || password.is_empty() || password.contains(':') {
        return None;
    }
    Some(ProxyCredentials {
        username: url.username().to_string(),
        password: password.to_string(),
    })
}

fn parse_proxy(raw: &str) -> Result<ProxyDescriptor> {
    let url = Url::parse(raw.trim()).context(format!("Invalid proxy URL '{}'", raw))?;
    let host = url
        .host_str()
        .filter(|h| !h.is_empty())
        .context(format!("Proxy URL '{}' has no host", raw))?;
    let port = url
        .port_or_known_default()
        .context(format!("Proxy URL '{}' has no port", raw))?;

    Ok(ProxyDescriptor::Http {
        host: host.to_string(),
        port,
        credentials: parse_credentials(&url),
    })
}

fn excluded_by_no_proxy(target_url: &str, env_vars: &EnvVars) -> bool {
    lookup(NO_PROXY, env_vars)
        .map(|list| list.split(',').any(|entry| entry.trim() == target_url))
        .unwrap_or(false)
}

/// Decide how requests to `target_url` should be routed
pub fn resolve_proxy(target_url: &str, env_vars: &EnvVars) -> ProxyDescriptor {
    let configured = lookup(HTTPS_PROXY, env_vars).or_else(|| lookup(HTTP_PROXY, env_vars));

    let Some(raw) = configured else {
        return ProxyDescriptor::Direct;
    };

    if excluded_by_no_proxy(target_url, env_vars) {
        debug!("{} is listed in {}, connecting directly", target_url, NO_PROXY);
        return ProxyDescriptor::Direct;
    }

    match parse_proxy(&raw) {
        Ok(descriptor) => descriptor,
        Err(e) => {
            error!("An exception occurred while getting proxy: {:#}", e);
            ProxyDescriptor::Direct
        }
    }
}
