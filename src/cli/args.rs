//! Command-line argument parsing for the patchstream binary.

use std::time::Duration;

pub const DEFAULT_DURATION: Duration = Duration::from_secs(30);

pub const USAGE: &str = "\
Usage: patchstream [--url URL | --api-url URL --token TOKEN] [--header NAME:VALUE]...
                   [--duration SECS] [--json-only] [--version]";

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Stream until the duration elapses or the session closes
    Run(RunArgs),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunArgs {
    /// Fully built target; takes precedence over the proxy options
    pub url: Option<String>,
    pub api_url: Option<String>,
    pub token: Option<String>,
    /// Headers forwarded through the proxy, in command-line order
    pub headers: Vec<(String, String)>,
    pub duration: Duration,
    /// Ask the upstream for plain JSON (full documents only)
    pub json_only: bool,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            url: None,
            api_url: None,
            token: None,
            headers: Vec::new(),
            duration: DEFAULT_DURATION,
            json_only: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArgsError {
    #[error("Missing value for {0}")]
    MissingValue(String),

    #[error("Invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },

    #[error("Unknown argument: {0}")]
    UnknownArgument(String),
}

/// Parse command-line arguments, program name first.
///
/// ```
/// use patchstream::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["patchstream".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), Ok(CliCommand::Version));
/// ```
pub fn parse_args<I>(args: I) -> Result<CliCommand, ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut run = RunArgs::default();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => return Ok(CliCommand::Version),
            "--url" => run.url = Some(value_for(&arg, &mut args)?),
            "--api-url" => run.api_url = Some(value_for(&arg, &mut args)?),
            "--token" => run.token = Some(value_for(&arg, &mut args)?),
            "--header" | "-H" => {
                let raw = value_for(&arg, &mut args)?;
                run.headers.push(parse_header(&arg, &raw)?);
            }
            "--duration" => {
                let raw = value_for(&arg, &mut args)?;
                let secs: u64 = raw.parse().map_err(|_| ArgsError::InvalidValue {
                    flag: arg.clone(),
                    value: raw.clone(),
                })?;
                run.duration = Duration::from_secs(secs);
            }
            "--json-only" => run.json_only = true,
            _ => return Err(ArgsError::UnknownArgument(arg)),
        }
    }

    Ok(CliCommand::Run(run))
}

fn value_for<I>(flag: &str, args: &mut I) -> Result<String, ArgsError>
where
    I: Iterator<Item = String>,
{
    args.next()
        .filter(|v| !v.starts_with("--"))
        .ok_or_else(|| ArgsError::MissingValue(flag.to_string()))
}

fn parse_header(flag: &str, raw: &str) -> Result<(String, String), ArgsError> {
    match raw.split_once(':') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(ArgsError::InvalidValue {
            flag: flag.to_string(),
            value: raw.to_string(),
        }),
    }
}
