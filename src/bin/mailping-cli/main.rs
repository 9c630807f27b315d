mod args;
mod output;

use std::io::{self, BufRead};
use std::process::ExitCode;

use anyhow::{Context, Result};
use mailping_lib::mx::build_resolver;
use mailping_lib::{
    CancellationToken, MxStatus, ResultCode, Verifier, check_mx, domain_of, is_syntax_valid,
};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::args::{Cli, Commands};
use crate::output::OutputRow;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.debug);

    // codes de sortie : 0 OK, 2 invalids, 1 fatal
    match run(&cli).await {
        Ok(false) => ExitCode::SUCCESS,
        Ok(true) => ExitCode::from(2),
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(1)
        }
    }
}

/// Returns whether any reported address was invalid.
async fn run(cli: &Cli) -> Result<bool> {
    let rows = match &cli.cmd {
        Commands::Syntax { email } => vec![OutputRow::syntax(email, is_syntax_valid(email))],
        Commands::Mx { email } => vec![mx_row(cli, email).await?],
        Commands::Ping { email } => {
            let verifier = build_verifier(cli)?;
            let cancel = cancel_on_ctrl_c();
            let result = verifier.ping_with_cancel(email, &cancel).await?;
            vec![OutputRow::from_ping(result)]
        }
        Commands::Batch { emails, stdin } => {
            let mut emails = emails.clone();
            if *stdin {
                emails.extend(read_stdin()?);
            }
            let verifier = build_verifier(cli)?;
            let cancel = cancel_on_ctrl_c();
            let size = verifier.options().max_batch_size;
            let mut rows = Vec::with_capacity(emails.len());
            for chunk in emails.chunks(size) {
                let results = verifier
                    .ping_batch_with_cancel(chunk, size, &cancel)
                    .await?;
                rows.extend(results.into_iter().map(OutputRow::from_ping));
            }
            rows
        }
    };

    output::write_reports(&rows, cli)?;
    Ok(output::any_invalid(&rows))
}

fn build_verifier(cli: &Cli) -> Result<Verifier> {
    Verifier::builder(cli.options())
        .disposable(cli.disposable_registry()?)
        .build()
        .context("configure verifier")
}

async fn mx_row(cli: &Cli, email: &str) -> Result<OutputRow> {
    let Some(domain) = domain_of(email) else {
        return Ok(OutputRow::syntax(email, false));
    };
    let options = cli.options();
    let resolver = build_resolver(options.timeout()).context("configure DNS resolver")?;
    let row = match check_mx(&resolver, &domain).await {
        Ok(MxStatus::Records(records)) => {
            let code = ResultCode::ValidDomain;
            OutputRow::mx(email, code, code.message().to_string(), records)
        }
        Ok(MxStatus::NoRecords) => {
            let code = ResultCode::NoMxRecords;
            OutputRow::mx(email, code, code.message().to_string(), Vec::new())
        }
        Err(err) => OutputRow::mx(
            email,
            ResultCode::DomainVerificationFailed,
            err.to_string(),
            Vec::new(),
        ),
    };
    Ok(row)
}

fn read_stdin() -> Result<Vec<String>> {
    let mut emails = Vec::new();
    for line in io::stdin().lock().lines() {
        let line = line.context("read stdin")?;
        let email = line.trim();
        if !email.is_empty() {
            emails.push(email.to_string());
        }
    }
    Ok(emails)
}

fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let trigger = token.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, cancelling pending verifications");
            trigger.cancel();
        }
    });
    token
}

fn init_logging(debug: bool) {
    let fallback = if debug { "warn,mailping=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_writer(io::stderr))
        .with(filter)
        .init();
}
