//! Command-line argument parsing.

use thiserror::Error;

use crate::config::ClientConfig;

/// What the binary should do.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Query the backend health endpoint and exit
    Health,
    /// Ask a single question and exit
    Ask(String),
    /// Read questions from stdin until EOF (default)
    Interactive,
}

/// Flags that override configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CliOptions {
    pub base_url: Option<String>,
    pub top_k: Option<u32>,
}

impl CliOptions {
    /// Layer these overrides on top of `config`.
    pub fn apply(&self, config: ClientConfig) -> ClientConfig {
        let mut config = config;
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.as_str());
        }
        if let Some(top_k) = self.top_k {
            config = config.with_top_k(top_k);
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ArgsError {
    #[error("missing value for {0}")]
    MissingValue(String),
    #[error("invalid value for {flag}: {value}")]
    InvalidValue { flag: String, value: String },
    #[error("unknown option: {0}")]
    UnknownOption(String),
}

pub const USAGE: &str = "\
Usage: ragchat [OPTIONS] [QUESTION...]

Ask a question against the retrieval-augmented chat service. With no
question, reads one question per line from stdin.

Options:
  --url <URL>      Backend base URL (env: RAGCHAT_API_URL)
  --top-k <N>      Documents to retrieve per query (env: RAGCHAT_TOP_K)
  --health         Check backend health and exit
  -V, --version    Print version
  -h, --help       Print this help";

/// Parse command-line arguments (including the program name).
///
/// # Examples
///
/// ```
/// use ragchat::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["ragchat".to_string(), "--version".to_string()];
/// let (command, _) = parse_args(args.into_iter()).unwrap();
/// assert_eq!(command, CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> Result<(CliCommand, CliOptions), ArgsError>
where
    I: Iterator<Item = String>,
{
    let mut options = CliOptions::default();
    let mut command = None;
    let mut words = Vec::new();
    let mut args = args.skip(1);

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => command = command.or(Some(CliCommand::Version)),
            "--help" | "-h" => command = command.or(Some(CliCommand::Help)),
            "--health" => command = command.or(Some(CliCommand::Health)),
            "--url" => {
                let value = args
                    .next()
                    .ok_or_else(|| ArgsError::MissingValue(arg.clone()))?;
                options.base_url = Some(value);
            }
            "--top-k" => {
                let value = args
                    .next()
                    .ok_or_else(|| ArgsError::MissingValue(arg.clone()))?;
                let top_k = value
                    .parse::<u32>()
                    .ok()
                    .filter(|k| *k > 0)
                    .ok_or_else(|| ArgsError::InvalidValue {
                        flag: arg.clone(),
                        value: value.clone(),
                    })?;
                options.top_k = Some(top_k);
            }
            "--" => {
                words.extend(args.by_ref());
            }
            flag if flag.starts_with("--") => {
                return Err(ArgsError::UnknownOption(flag.to_string()));
            }
            _ => words.push(arg),
        }
    }

    let command = command.unwrap_or_else(|| {
        if words.is_empty() {
            CliCommand::Interactive
        } else {
            CliCommand::Ask(words.join(" "))
        }
    });

    Ok((command, options))
}
