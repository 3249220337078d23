//! Command-line argument parsing for the `zhipu-chat` binary.

use crate::models::GLM_LITE;

/// Options for a chat invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatArgs {
    /// Model code, e.g. `chatglm_lite`
    pub model: String,
    /// Use the synchronous endpoint instead of the event stream
    pub stream: bool,
    /// Prompt words joined with single spaces
    pub prompt: String,
}

/// Parsed CLI command to execute.
#[derive(Debug, Clone, PartialEq)]
pub enum CliCommand {
    /// Show version information
    Version,
    /// Show usage
    Help,
    /// Send a prompt to the model
    Chat(ChatArgs),
    /// Arguments could not be parsed
    Invalid(String),
}

/// Usage text printed by `--help` and on invalid input.
pub const USAGE: &str = "\
Usage: zhipu-chat [--model MODEL] [--no-stream] <prompt...>

Options:
  -m, --model MODEL   model code (default: chatglm_lite)
      --no-stream     use the synchronous endpoint
  -V, --version       print version
  -h, --help          print this help

Environment:
  ZHIPU_API_KEY       API key in id.secret form (required)
  ZHIPU_BASE_URL      override the API base URL
  ZHIPU_TIMEOUT_SECS  request timeout in seconds
  RUST_LOG            log filter, e.g. zhipu=debug";

/// Parse command-line arguments and return the appropriate command.
///
/// The first item is the program name and is skipped. `--` ends option
/// parsing; everything after it is prompt text.
///
/// # Examples
///
/// ```
/// use zhipu::cli::args::{parse_args, CliCommand};
///
/// let args = vec!["zhipu-chat".to_string(), "--version".to_string()];
/// assert_eq!(parse_args(args.into_iter()), CliCommand::Version);
/// ```
pub fn parse_args<I>(args: I) -> CliCommand
where
    I: Iterator<Item = String>,
{
    let mut model = GLM_LITE.to_string();
    let mut stream = true;
    let mut words = Vec::new();
    let mut options_done = false;

    let mut args = args.skip(1);
    while let Some(arg) = args.next() {
        if options_done {
            words.push(arg);
            continue;
        }
        match arg.as_str() {
            "--version" | "-V" => return CliCommand::Version,
            "--help" | "-h" => return CliCommand::Help,
            "--no-stream" => stream = false,
            "--model" | "-m" => match args.next() {
                Some(value) if !value.is_empty() => model = value,
                _ => return CliCommand::Invalid(format!("{} requires a value", arg)),
            },
            "--" => options_done = true,
            other if other.starts_with("--model=") => {
                model = other["--model=".len()..].to_string();
                if model.is_empty() {
                    return CliCommand::Invalid("--model requires a value".to_string());
                }
            }
            other if other.starts_with('-') && other.len() > 1 => {
                return CliCommand::Invalid(format!("unknown option: {}", other));
            }
            _ => words.push(arg),
        }
    }

    let prompt = words.join(" ");
    if prompt.trim().is_empty() {
        return CliCommand::Invalid("missing prompt".to_string());
    }

    CliCommand::Chat(ChatArgs {
        model,
        stream,
        prompt,
    })
}
