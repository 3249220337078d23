use std::io::Write;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tracing_subscriber::EnvFilter;

use zhipu::cli::{parse_args, version_line, ChatArgs, CliCommand, USAGE};
use zhipu::{ChatCompletionRequest, ChatMessage, ClientConfig, StreamError, ZhipuClient};

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

async fn run_chat(args: ChatArgs) -> Result<()> {
    let config = ClientConfig::from_env()?;
    let client = ZhipuClient::new(config)?;
    let request = ChatCompletionRequest::new(&args.model, vec![ChatMessage::user(args.prompt)]);

    if !args.stream {
        let response = client.create_chat_completion(&request).await?;
        println!("{}", response.content());
        tracing::info!(
            total_tokens = response.data.usage.total_tokens,
            "completion finished"
        );
        return Ok(());
    }

    let mut stream = client.create_chat_completion_stream(&request).await?;
    let mut stdout = std::io::stdout();
    loop {
        match stream.recv().await {
            Ok(delta) => {
                write!(stdout, "{}", delta.content())?;
                stdout.flush()?;
                if delta.is_finish() {
                    tracing::info!(
                        total_tokens = delta.meta.usage.total_tokens,
                        "completion finished"
                    );
                }
            }
            Err(StreamError::Exhausted) => break,
            Err(err) => {
                writeln!(stdout)?;
                return Err(err.into());
            }
        }
    }
    writeln!(stdout)?;
    Ok(())
}

fn main() -> Result<()> {
    let args = match parse_args(std::env::args()) {
        CliCommand::Version => {
            println!("{}", version_line());
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        CliCommand::Invalid(reason) => {
            eprintln!("{}\n", USAGE);
            return Err(eyre!(reason));
        }
        CliCommand::Chat(args) => args,
    };

    color_eyre::install()?;
    init_tracing();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run_chat(args))
}
