//! CLI support for the patchstream binary.
//!
//! - Argument parsing
//! - Version display
//! - Resolving the stream target from flags and environment
//!
//! # Usage
//!
//! ```ignore
//! use patchstream::cli::{parse_args, resolve_config, CliCommand};
//!
//! match parse_args(std::env::args())? {
//!     CliCommand::Version => println!("{}", version_line()),
//!     CliCommand::Run(run) => {
//!         let config = resolve_config(&run, |k| std::env::var(k).ok())?;
//!         // ...
//!     }
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, ArgsError, CliCommand, RunArgs, USAGE};
pub use version::{version_line, VERSION};

use crate::config::{ConfigError, StreamConfig};
use crate::proxy_url::{ProxyUrlConfig, ProxyUrlError};

/// Header forwarded by `--json-only`.
pub const JSON_ONLY_HEADER: (&str, &str) = ("Accept", "application/json");

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Args(#[from] ArgsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    ProxyUrl(#[from] ProxyUrlError),

    #[error("No stream target: pass --url, or --api-url with --token")]
    MissingTarget,

    /// `--header`/`--json-only` given for a target that is not built through the proxy.
    #[error("--header and --json-only need a proxied target (--api-url/--token), not a full URL")]
    ForwardingWithoutProxy,
}

/// Build the stream configuration for a run.
///
/// Target precedence: `--url`, then `--api-url`/`--token` (gaps filled from
/// the environment), then `PATCHSTREAM_URL`, then the proxy environment
/// variables. Forwarded headers only exist on proxied targets, so they are
/// rejected when the target is a full URL.
pub fn resolve_config<F>(run: &RunArgs, lookup: F) -> Result<StreamConfig, CliError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = StreamConfig::from_lookup(&lookup)?;
    let forwards_headers = !run.headers.is_empty() || run.json_only;

    if let Some(url) = &run.url {
        if forwards_headers {
            return Err(CliError::ForwardingWithoutProxy);
        }
        config.target_url = url.clone();
        return Ok(config);
    }

    let proxy_from_flags = run.api_url.is_some() || run.token.is_some();
    if !proxy_from_flags && !config.target_url.is_empty() {
        if forwards_headers {
            return Err(CliError::ForwardingWithoutProxy);
        }
        return Ok(config);
    }

    let mut proxy = ProxyUrlConfig::from_lookup(&lookup)
        .unwrap_or_else(|| ProxyUrlConfig::new(String::new(), String::new()));
    if let Some(api_url) = &run.api_url {
        proxy.api_url = api_url.clone();
    }
    if let Some(token) = &run.token {
        proxy.token = token.clone();
    }
    if proxy.api_url.is_empty() && proxy.token.is_empty() {
        return Err(CliError::MissingTarget);
    }

    for (name, value) in &run.headers {
        proxy = proxy.with_header(name.clone(), value.clone());
    }
    if run.json_only {
        proxy = proxy.with_header(JSON_ONLY_HEADER.0, JSON_ONLY_HEADER.1);
    }

    config.target_url = proxy.build()?;
    Ok(config)
}
