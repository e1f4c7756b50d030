//! Interactive terminal client for the portfolio chat backend.
//!
//! # Usage
//!
//! ```bash
//! # Talk to the proxy on localhost:8000
//! webhook-chat
//!
//! # Point at another deployment, in English
//! webhook-chat --base-url https://portfolio.example --locale en
//!
//! # Read settings from YAML, then open with a greeting
//! webhook-chat --config chat.yaml --greeting "היי"
//! ```
//!
//! Set `RUST_LOG=webhook_chat=debug` to see every attempt.
//!
//! # Commands
//!
//! - `/attach <path>` - Queue a photo for the next message
//! - `/photos` - List queued photos
//! - `/health` - Check the backend
//! - `/diag` - Show connection diagnostics
//! - `/quit` - Exit the application

use arrrg::CommandLine;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use utf8path::Path;

use webhook_chat::chat::{ChatArgs, ChatCommand, ChatConfig, help_text, parse_command};
use webhook_chat::{Attachment, AttachmentSet, ChatClient, MAX_ATTACHMENTS, TerminalUi};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let (args, _) = ChatArgs::from_command_line_relaxed("webhook-chat [OPTIONS]");
    let config = ChatConfig::load(args)?;
    log::info!("chatting with {}", config.base_url);

    let mut client = ChatClient::from_config(&config)?;
    let mut ui = TerminalUi::with_color(config.use_color);
    let mut rl = DefaultEditor::new()?;
    let mut pending = AttachmentSet::new();

    println!("Chat ({}, session {})", config.base_url, client.session_id());
    println!("Type /help for commands, /quit to exit\n");

    if let Some(greeting) = config.greeting.as_deref() {
        client.greet(&mut ui, greeting).await;
    }

    loop {
        let prompt = if pending.is_empty() {
            "You: ".to_string()
        } else {
            format!("You [{} photo(s)]: ", pending.len())
        };

        match rl.readline(&prompt) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() && pending.is_empty() {
                    continue;
                }
                if !line.is_empty() {
                    let _ = rl.add_history_entry(line);
                }

                if let Some(cmd) = parse_command(line) {
                    match cmd {
                        ChatCommand::Quit => {
                            println!("Goodbye!");
                            break;
                        }
                        ChatCommand::Attach(path) => {
                            if pending.len() >= MAX_ATTACHMENTS {
                                ui.print_error(&format!(
                                    "At most {MAX_ATTACHMENTS} photos per message."
                                ));
                                continue;
                            }
                            match Attachment::from_path(Path::from(path.as_str())).await {
                                Ok(photo) => {
                                    let name = photo.file_name().to_string();
                                    match pending.push(photo) {
                                        Ok(()) => ui.print_info(&format!("Attached {name}")),
                                        Err(err) => ui.print_error(&err.to_string()),
                                    }
                                }
                                Err(err) => ui.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Detach(index) => match pending.remove(index - 1) {
                            Some(photo) => {
                                ui.print_info(&format!("Removed {}", photo.file_name()))
                            }
                            None => ui.print_error(&format!("No photo number {index}")),
                        },
                        ChatCommand::ListPhotos => print_photos(&pending),
                        ChatCommand::ClearPhotos => {
                            pending.clear();
                            ui.print_info("Photos cleared.");
                        }
                        ChatCommand::Health => {
                            if client.test_connection().await {
                                ui.print_info("Backend is healthy.");
                            } else {
                                ui.print_error("Backend did not answer the health check.");
                            }
                        }
                        ChatCommand::Diagnostics => {
                            match serde_json::to_string_pretty(&client.diagnostics()) {
                                Ok(json) => ui.print_info(&json),
                                Err(err) => ui.print_error(&err.to_string()),
                            }
                        }
                        ChatCommand::Session => {
                            ui.print_info(&format!("Session: {}", client.session_id()));
                        }
                        ChatCommand::Help => {
                            for line in help_text().lines() {
                                println!("    {}", line);
                            }
                        }
                        ChatCommand::Invalid(message) => {
                            ui.print_error(&message);
                        }
                    }
                    continue;
                }

                let photos = std::mem::take(&mut pending);
                client.submit(&mut ui, line, photos).await;
            }
            Err(ReadlineError::Interrupted) => {
                println!();
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                ui.print_error(&format!("Input error: {}", err));
                break;
            }
        }
    }

    Ok(())
}

fn print_photos(pending: &AttachmentSet) {
    if pending.is_empty() {
        println!("    Photos: (none)");
        return;
    }
    println!("    Photos:");
    for (i, photo) in pending.iter().enumerate() {
        println!(
            "      {}. {} ({}, {} bytes)",
            i + 1,
            photo.file_name(),
            photo.mime_type(),
            photo.data().len()
        );
    }
}
