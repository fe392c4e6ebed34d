use std::io::Write;

use color_eyre::eyre::eyre;
use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

use ragchat::app::{ChatController, RejectReason, SessionEvents, SubmitOutcome};
use ragchat::cli::{parse_args, CliCommand, TerminalRenderer, USAGE, VERSION};
use ragchat::client::RagClient;
use ragchat::config::ClientConfig;
use ragchat::events::SessionEvent;

/// Log to stderr so answers on stdout stay clean. `RUST_LOG` overrides.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let (command, options) = match parse_args(std::env::args()) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("ragchat: {}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    match command {
        CliCommand::Version => {
            println!("ragchat {}", VERSION);
            return Ok(());
        }
        CliCommand::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        _ => {}
    }

    color_eyre::install()?;
    init_tracing();

    let config = options.apply(ClientConfig::from_env());
    tracing::debug!(?config, "Loaded configuration");
    let client = RagClient::from_config(config)?;

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async move {
        match command {
            CliCommand::Health => run_health(client).await,
            CliCommand::Ask(query) => {
                let (mut controller, mut rx) = ChatController::channel(client);
                let mut renderer = TerminalRenderer::new(std::io::stdout());
                let ok = ask(&mut controller, &mut rx, &mut renderer, &query).await?;
                if ok {
                    Ok(())
                } else {
                    std::process::exit(1)
                }
            }
            _ => run_interactive(client).await,
        }
    })
}

async fn run_health(client: RagClient) -> Result<()> {
    let health = client.health_check().await.map_err(|e| eyre!(e.user_message()))?;
    println!("status: {}", health.status);
    println!("index: {}", if health.faiss_index_exists { "present" } else { "missing" });
    println!("metadata: {}", if health.metadata_exists { "present" } else { "missing" });
    if !health.is_ready() {
        std::process::exit(1);
    }
    Ok(())
}

async fn run_interactive(client: RagClient) -> Result<()> {
    let (mut controller, mut rx) = ChatController::channel(client);
    let mut renderer = TerminalRenderer::new(std::io::stdout());
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("> ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            println!();
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }
        ask(&mut controller, &mut rx, &mut renderer, &line).await?;
    }
}

/// Submit one query and render its events until the session ends.
///
/// Returns `false` if the session failed. Ctrl-C cancels the stream.
async fn ask<W: Write>(
    controller: &mut ChatController,
    rx: &mut SessionEvents,
    renderer: &mut TerminalRenderer<W>,
    query: &str,
) -> Result<bool> {
    let id = match controller.submit(query) {
        SubmitOutcome::Started(id) => id,
        SubmitOutcome::Rejected(RejectReason::EmptyQuery) => return Ok(true),
        SubmitOutcome::Rejected(RejectReason::AlreadyStreaming) => {
            return Err(eyre!("a question is already being answered"))
        }
    };

    loop {
        tokio::select! {
            event = rx.recv() => {
                let Some(event) = event else {
                    return Err(eyre!("event channel closed"));
                };
                if event.session_id() != id {
                    continue;
                }
                renderer.handle(&event)?;
                if event.is_terminal() {
                    return Ok(matches!(event, SessionEvent::SessionCompleted { .. }));
                }
            }
            _ = tokio::signal::ctrl_c() => {
                if let Some(cancelled) = controller.cancel() {
                    renderer.cancelled(&cancelled)?;
                }
                return Ok(false);
            }
        }
    }
}
