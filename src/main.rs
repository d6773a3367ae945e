//! Command-line front end for the panel library.
//!
//! Thin by design: each subcommand mounts the same components an
//! interactive panel would and prints their state once.

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use botpanel::api::types::BotState;
use botpanel::config::Config;
use botpanel::panel::{ConfirmPrompt, EntryList, GreetingPanel, PollerState, StatusPoller};
use botpanel::{PanelContext, PanelError};

const USAGE: &str = "usage: botpanel <status|entries|delete <name>|greetings>";

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("botpanel=debug,info")),
        )
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = Config::from_env();
    let ctx = PanelContext::new(&config);

    let result = match args.first().map(String::as_str) {
        Some("status") => show_status(&ctx).await,
        Some("entries") => show_entries(&ctx).await,
        Some("delete") => match args.get(1) {
            Some(name) => delete_entry(&ctx, name).await,
            None => {
                eprintln!("usage: botpanel delete <name>");
                return ExitCode::from(2);
            }
        },
        Some("greetings") => show_greetings(&ctx).await,
        _ => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn show_status(ctx: &PanelContext) -> Result<(), PanelError> {
    let poller = StatusPoller::new(ctx.client.clone());
    poller.refresh().await;

    match poller.state() {
        PollerState::Settled(snapshot) => {
            let label = match snapshot.state {
                BotState::NotStarted => "not started",
                BotState::Connecting => "connecting",
                BotState::Joined => "joined",
            };
            match snapshot.since {
                Some(since) => println!("bot: {label} (since {})", since.to_rfc3339()),
                None => println!("bot: {label}"),
            }
            Ok(())
        }
        PollerState::Failed(message) => Err(PanelError::Other(message)),
        other => Err(PanelError::Other(format!("status never settled: {other:?}"))),
    }
}

async fn show_entries(ctx: &PanelContext) -> Result<(), PanelError> {
    let list = EntryList::new(ctx.client.clone(), ctx.bus.clone());
    list.load().await?;

    for entry in list.entries() {
        if entry.key.is_empty() {
            continue;
        }
        println!("{}: {}", entry.key, entry.value);
    }
    Ok(())
}

async fn delete_entry(ctx: &PanelContext, name: &str) -> Result<(), PanelError> {
    let list = EntryList::new(ctx.client.clone(), ctx.bus.clone());
    list.load().await?;

    let Some(entry) = list.entries().into_iter().find(|e| e.key == name) else {
        return Err(PanelError::Other(format!("no command named {name:?}")));
    };

    let mut editor = list.editor_for(&entry);
    if editor.delete(&StdinConfirm).await? {
        println!("deleted {name:?}");
    } else {
        println!("cancelled");
    }
    Ok(())
}

async fn show_greetings(ctx: &PanelContext) -> Result<(), PanelError> {
    let mut panel = GreetingPanel::new(ctx.client.clone());
    panel.load().await?;

    if let Some(templates) = panel.templates() {
        println!("new user:         {}", templates.new_user);
        println!("returning user:   {}", templates.returning_user);
        println!("consecutive user: {}", templates.consecutive_user);
        println!("greet trolls:     {}", templates.greet_trolls);
    }
    Ok(())
}

struct StdinConfirm;

impl ConfirmPrompt for StdinConfirm {
    fn confirm(&self, key: &str) -> bool {
        print!("Are you sure you want to delete the {key} command? [y/N] ");
        let _ = io::stdout().flush();

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim(), "y" | "Y" | "yes")
    }
}
