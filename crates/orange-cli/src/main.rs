//! Orange - manage library records from the terminal.
//!
//! Logs in against the library REST service, keeps the session tokens in the
//! configured credential store and runs book, librarian, member and student
//! commands with them.

mod cli;
mod commands;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use orange_core::api::ApiClient;
use orange_core::auth::{CredentialStore, MemoryStore, SessionManager};
use orange_core::config::Config;
use orange_core::models::{Books, Librarians, Members, Students};
use orange_core::navigation::Route;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{BookCommand, Cli, Command, LibrarianCommand, MemberCommand, StudentCommand};

/// Base name of the daily log files written with `--log-dir`
const LOG_FILE_PREFIX: &str = "orange.log";

/// Initialize the tracing subscriber for logging.
///
/// Logs go to stderr unless `log_dir` is given. The returned guard must be
/// kept alive so buffered file output is flushed on exit.
fn init_tracing(log_dir: Option<&Path>) -> Option<WorkerGuard> {
    // Use RUST_LOG env var to control log level (e.g., RUST_LOG=debug)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    match log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, LOG_FILE_PREFIX);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .with(filter)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(io::stderr))
                .with(filter)
                .init();
            None
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let _guard = init_tracing(cli.log_dir.as_deref());
    info!("Orange starting");

    let mut config = Config::load().unwrap_or_else(|e| {
        warn!("Failed to load config, using defaults: {:#}", e);
        Config::default()
    });

    let store: Arc<dyn CredentialStore> = if cli.ephemeral {
        Arc::new(MemoryStore::new())
    } else {
        config.credential_store()?
    };
    let session = Arc::new(SessionManager::new(store));
    let api = ApiClient::with_timeout(config.api_url(), session, config.request_timeout())?
        .with_policy(config.rejection_policy());

    let result = run(cli.command, api, &mut config).await;
    if let Err(e) = &result {
        warn!("Command failed: {:#}", e);
    }
    result
}

async fn run(command: Command, api: ApiClient, config: &mut Config) -> Result<()> {
    match command {
        Command::Login { username, password } => {
            commands::login(api, config, username, password).await
        }
        Command::Logout => commands::logout(&api),
        Command::Status => commands::status(&api, config).await,
        Command::Books(command) => {
            commands::enter(&api, Route::Books).await?;
            match command {
                BookCommand::List => commands::list::<Books>(api, commands::render_book).await,
                BookCommand::Add(args) => commands::add(api, args).await,
                BookCommand::Edit { id, fields } => commands::edit(api, id, fields).await,
                BookCommand::Delete { id } => commands::delete::<Books>(api, id).await,
            }
        }
        Command::Librarians(command) => {
            commands::enter(&api, Route::Librarians).await?;
            match command {
                LibrarianCommand::List => {
                    commands::list::<Librarians>(api, commands::render_librarian).await
                }
                LibrarianCommand::Add(args) => commands::add(api, args).await,
                LibrarianCommand::Edit { id, fields } => commands::edit(api, id, fields).await,
                LibrarianCommand::Delete { id } => commands::delete::<Librarians>(api, id).await,
            }
        }
        Command::Members(command) => {
            commands::enter(&api, Route::Members).await?;
            match command {
                MemberCommand::List => {
                    let config = &*config;
                    commands::list::<Members>(api, |m| commands::render_member(m, config)).await
                }
                MemberCommand::Add(args) => commands::add(api, args).await,
                MemberCommand::Edit { id, fields } => commands::edit(api, id, fields).await,
                MemberCommand::Delete { id } => commands::delete::<Members>(api, id).await,
            }
        }
        Command::Students(command) => match command {
            StudentCommand::List { sort, desc } => {
                commands::enter(&api, Route::StudentRecords).await?;
                commands::list_students(api, config, sort.into(), desc).await
            }
            StudentCommand::Add(args) => {
                commands::enter(&api, Route::RegisterStudent).await?;
                commands::register_student(api, args).await
            }
            StudentCommand::Edit { id, fields } => {
                commands::enter(&api, Route::StudentRecords).await?;
                commands::edit(api, id, fields).await
            }
            StudentCommand::Delete { id } => {
                commands::enter(&api, Route::StudentRecords).await?;
                commands::delete::<Students>(api, id).await
            }
        },
    }
}
