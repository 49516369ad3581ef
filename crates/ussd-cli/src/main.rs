//! `ussd-sim`: drive a USSD backend from the terminal

mod config;
mod input;
mod logging;
mod presenter;

use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rvoip_ussd_core::{DialogController, KeyInput, UiLifecycleState};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::config::Cli;
use crate::input::{Command, HELP, parse_line};
use crate::presenter::TerminalPresenter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::setup_logging(&cli.log_level)?;
    logging::log_welcome("ussd-sim", env!("CARGO_PKG_VERSION"));

    let config = cli.resolve_config()?;
    info!(
        "Backend {} (timeout {}ms), MSISDN {}",
        config.api_url,
        config.request_timeout.as_millis(),
        config.phone_number
    );

    let presenter = Arc::new(TerminalPresenter::new());
    let controller = Arc::new(DialogController::with_http(config, presenter)?);

    println!("{}", "USSD simulator, type :help for commands".bold());

    if let Some(code) = &cli.dial {
        for key in code.chars() {
            controller.press_key(KeyInput::Char(key), None).await;
        }
        controller.press_key(KeyInput::Enter, None).await;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let dialog_open = controller.state().accepts_replies();
        match parse_line(&line, dialog_open) {
            Command::Keys(keys) => {
                // Keys run in the background so Enter can race an outstanding turn
                let controller = controller.clone();
                tokio::spawn(async move {
                    for key in keys {
                        controller.press_key(key, None).await;
                    }
                });
            }
            Command::Reply(text) => {
                let controller = controller.clone();
                tokio::spawn(async move {
                    controller.press_key(KeyInput::Enter, Some(&text)).await;
                });
            }
            Command::Close => {
                if !controller.close().await {
                    println!("{}", "No dialog open.".dimmed());
                }
            }
            Command::Stats => {
                let stats = controller.stats();
                println!(
                    "state={} session={} buffer={} completed={} failed={} dropped={}",
                    stats.state,
                    controller
                        .session()
                        .map(|s| s.session_id().to_string())
                        .unwrap_or_else(|| "-".to_string()),
                    controller.dial_buffer(),
                    stats.turns_completed,
                    stats.turns_failed,
                    stats.turns_dropped
                );
            }
            Command::Help => println!("{}", HELP),
            Command::Quit => break,
            Command::Unknown(command) => {
                println!("{}", format!("Unknown command :{} (try :help)", command).yellow())
            }
        }
    }

    if controller.state() != UiLifecycleState::Closed {
        debug!("Closing dialog on exit");
        controller.close().await;
    }
    Ok(())
}
