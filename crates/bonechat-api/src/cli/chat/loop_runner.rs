//! Main terminal chat loop.
//!
//! Builds the provider up front so a missing key is reported before the
//! prompt appears, then feeds each line through the orchestrator against a
//! session that lives as long as the loop.

use std::time::{Duration, Instant};

use anyhow::Context;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use bonechat_core::session::store::MapSession;
use bonechat_types::chat::{Role, Turn};

use crate::state::AppState;

use super::banner::print_welcome_banner;
use super::commands::{self, ChatCommand};
use super::input::{ChatInput, InputEvent};

const PREVIEW_CHARS: usize = 100;

fn thinking_spinner() -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(spinner_style) = ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}") {
        spinner.set_style(spinner_style);
    }
    spinner.set_message("thinking...");
    spinner.enable_steady_tick(Duration::from_millis(80));
    spinner
}

/// Single-line preview of a turn, cut at `PREVIEW_CHARS` characters.
fn preview(content: &str) -> String {
    let flat = content.replace('\n', " ");
    if flat.chars().count() > PREVIEW_CHARS {
        let cut: String = flat.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{cut}...")
    } else {
        flat
    }
}

fn print_history(turns: &[Turn]) {
    println!();
    if turns.is_empty() {
        println!("  {}", style("Nothing remembered yet.").dim());
    }
    for turn in turns {
        let label = match turn.role() {
            Role::User => style("You").green().bold(),
            Role::Model => style("Bot").cyan().bold(),
            Role::Unknown => style("?").dim(),
        };
        println!("  {label} {}", preview(turn.content()));
    }
    println!();
}

/// Run the interactive chat loop until Ctrl+D or `/exit`.
pub async fn run_chat_loop(state: &AppState) -> anyhow::Result<()> {
    let provider = state
        .orchestrator
        .provider()
        .init()
        .await
        .context("cannot start chat")?;
    print_welcome_banner(
        provider.name(),
        provider.model(),
        state.orchestrator.turn_store().max_turns(),
    );

    let mut session = MapSession::new();
    let prompt = format!("  {} ", style("You >").green().bold());
    let (mut chat_input, _writer) = ChatInput::new(prompt)
        .map_err(|e| anyhow::anyhow!("Failed to initialize input: {e}"))?;

    loop {
        match chat_input.read_line().await {
            InputEvent::Eof => {
                println!("\n  {}", style("Session ended.").dim());
                break;
            }
            InputEvent::Interrupted => {
                println!("\n  {}", style("Press Ctrl+D to exit, or keep chatting.").dim());
                continue;
            }
            InputEvent::Message(text) => {
                if text.is_empty() {
                    continue;
                }

                if let Some(cmd) = commands::parse(&text) {
                    match cmd {
                        ChatCommand::Help => commands::print_help(),
                        ChatCommand::Clear => chat_input.clear(),
                        ChatCommand::Exit => {
                            println!("\n  {}", style("Session ended.").dim());
                            break;
                        }
                        ChatCommand::Reset => {
                            let confirmation = state.orchestrator.handle_reset(&mut session);
                            println!("\n  {} {}\n", style("*").cyan().bold(), confirmation);
                        }
                        ChatCommand::History => {
                            print_history(&state.orchestrator.history(&session));
                        }
                        ChatCommand::Unknown(name) => {
                            println!(
                                "\n  {} Unknown command: {}. Type /help for available commands.\n",
                                style("?").yellow().bold(),
                                style(name).dim()
                            );
                        }
                    }
                    continue;
                }

                let spinner = thinking_spinner();
                let start = Instant::now();
                let result = state.orchestrator.handle_message(&mut session, &text).await;
                spinner.finish_and_clear();

                match result {
                    Ok(reply) => {
                        println!("\n  {} {}", style("Bot").cyan().bold(), reply.trim());
                        println!(
                            "  {}\n",
                            style(format!("{} ms", start.elapsed().as_millis())).dim()
                        );
                    }
                    Err(e) => {
                        eprintln!("\n  {} {e}", style("!").red().bold());
                        eprintln!("  {}", style("Type a message to retry, /exit to quit.").dim());
                    }
                }
            }
        }
    }

    chat_input.flush();
    info!(
        turns = state.orchestrator.history(&session).len(),
        "Terminal chat ended"
    );
    Ok(())
}
