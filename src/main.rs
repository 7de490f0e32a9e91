use patchstream::cli::{parse_args, resolve_config, version_line, CliCommand, RunArgs, USAGE};
use patchstream::logging::init_tracing;
use patchstream::{CloseOutcome, SessionOutcome, StreamConfig, StreamController};

use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use tracing::{info, warn};

fn main() -> Result<()> {
    color_eyre::install()?;

    let run = match parse_args(std::env::args()) {
        Ok(CliCommand::Version) => {
            println!("{}", version_line());
            return Ok(());
        }
        Ok(CliCommand::Run(run)) => run,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    init_tracing();

    let config = resolve_config(&run, |key| std::env::var(key).ok())
        .wrap_err("could not determine the stream target")?;

    let runtime = tokio::runtime::Runtime::new()?;
    let outcome = runtime.block_on(stream(config, &run))?;

    match outcome.error {
        Some(err) => Err(eyre!("{} [{}]", err.user_message(), err.error_code())),
        None => Ok(()),
    }
}

/// Stream until the duration elapses, Ctrl-C, or the session ends on its own.
async fn stream(config: StreamConfig, run: &RunArgs) -> Result<SessionOutcome> {
    let controller = StreamController::with_reqwest(config)?;
    controller.start()?;
    info!(url = %controller.config().target_url, duration_secs = run.duration.as_secs(), "Streaming");

    tokio::select! {
        _ = tokio::time::sleep(run.duration) => info!("Duration elapsed"),
        _ = tokio::signal::ctrl_c() => info!("Interrupted"),
        outcome = controller.wait_closed() => info!(reason = ?outcome.reason, "Session ended"),
    }

    let outcome = match controller.close().await {
        CloseOutcome::Closed(outcome) => outcome,
        CloseOutcome::TimedOut(outcome) => {
            warn!(events = outcome.events_processed, "Session did not close in time");
            outcome
        }
        other => return Err(eyre!("unexpected close outcome: {:?}", other)),
    };

    match controller.snapshot() {
        Some(doc) => println!(
            "events: {}, document: {} bytes",
            outcome.events_processed,
            doc.to_string().len()
        ),
        None => println!("events: {}, no document received", outcome.events_processed),
    }

    Ok(outcome)
}
