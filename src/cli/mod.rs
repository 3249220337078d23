//! CLI support for the `zhipu-chat` binary.
//!
//! ```ignore
//! use zhipu::cli::{parse_args, CliCommand};
//!
//! match parse_args(std::env::args()) {
//!     CliCommand::Chat(args) => { /* send args.prompt to args.model */ }
//!     CliCommand::Version => println!("{}", zhipu::cli::version_line()),
//!     CliCommand::Help => println!("{}", zhipu::cli::USAGE),
//!     CliCommand::Invalid(reason) => eprintln!("error: {reason}"),
//! }
//! ```

pub mod args;
pub mod version;

pub use args::{parse_args, ChatArgs, CliCommand, USAGE};
pub use version::{version_line, VERSION};
