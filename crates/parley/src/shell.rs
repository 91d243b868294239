// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley shell` command implementation.
//!
//! Interactive REPL with a colored prompt and readline history. Plain lines
//! are sent as text; slash commands cover images, read receipts and history.
//! Timeline changes (including counterpart replies) are printed as they
//! happen.

use std::sync::{Arc, Mutex, PoisonError};

use colored::Colorize;
use parley_attachment::FileHandle;
use parley_config::ParleyConfig;
use parley_core::{MessageId, ParleyError};
use parley_session::ChatSession;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tracing::debug;

use crate::render::{render_line, ChangeTracker};

/// A parsed line of shell input.
#[derive(Debug, PartialEq, Eq)]
pub enum ShellCommand<'a> {
    Text(&'a str),
    Image(&'a str),
    Seen(MessageId),
    History,
    Help,
    Quit,
    Invalid(String),
}

impl<'a> ShellCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        let Some(rest) = trimmed.strip_prefix('/') else {
            return ShellCommand::Text(line);
        };
        let (name, arg) = match rest.split_once(char::is_whitespace) {
            Some((name, arg)) => (name, arg.trim()),
            None => (rest, ""),
        };
        match name {
            "quit" | "exit" => ShellCommand::Quit,
            "history" => ShellCommand::History,
            "help" => ShellCommand::Help,
            "image" if !arg.is_empty() => ShellCommand::Image(arg),
            "image" => ShellCommand::Invalid("usage: /image <path>".into()),
            "seen" => match arg.parse() {
                Ok(id) => ShellCommand::Seen(id),
                Err(_) => ShellCommand::Invalid("usage: /seen <message number>".into()),
            },
            other => ShellCommand::Invalid(format!("unknown command /{other}, try /help")),
        }
    }
}

/// Runs the `parley shell` interactive REPL until `/quit` or end of input.
pub async fn run_shell(config: ParleyConfig) -> Result<(), ParleyError> {
    let local = config.session.name.clone();
    let remote = config.counterpart.name.clone();
    let session = ChatSession::builder(config).build()?;

    let tracker = Arc::new(Mutex::new(ChangeTracker::new()));
    {
        let tracker = tracker.clone();
        let (local, remote) = (local.clone(), remote.clone());
        session.subscribe(move |snapshot| {
            let mut tracker = tracker.lock().unwrap_or_else(PoisonError::into_inner);
            for message in tracker.changed(snapshot) {
                println!("{}", render_line(message, &local, &remote));
            }
        });
    }

    let mut rl = DefaultEditor::new()
        .map_err(|e| ParleyError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", format!("parley shell: chatting with {remote}").bold().green());
    println!("Type {} for commands, {} to exit.\n", "/help".yellow(), "/quit".yellow());

    let prompt = format!("{}> ", local.green());
    loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                eprintln!("{}: {e}", "error".red());
                break;
            }
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = rl.add_history_entry(&line);

        let result = match ShellCommand::parse(&line) {
            ShellCommand::Quit => break,
            ShellCommand::Text(text) => session.send_text(text).map(|_| ()),
            ShellCommand::Image(path) => session
                .send_image(FileHandle::from_path(path))
                .await
                .map(|_| ()),
            ShellCommand::Seen(id) => session.mark_seen(id),
            ShellCommand::History => {
                for message in session.snapshot() {
                    println!("{}", render_line(&message, &local, &remote));
                }
                Ok(())
            }
            ShellCommand::Help => {
                print_help();
                Ok(())
            }
            ShellCommand::Invalid(msg) => {
                eprintln!("{}", msg.yellow());
                Ok(())
            }
        };

        if let Err(e) = result {
            match &e {
                ParleyError::Attachment(inner) => eprintln!("{}", inner.to_string().yellow()),
                _ => eprintln!("{}: {e}", "error".red()),
            }
        }
    }

    debug!(session_id = %session.session_id(), "shell exiting");
    session.teardown().await;
    println!(
        "{}",
        format!("session closed ({} messages)", session.snapshot().len()).dimmed()
    );
    Ok(())
}

fn print_help() {
    println!("  <text>          send a message");
    println!("  /image <path>   send an image");
    println!("  /seen <n>       mark message n as seen");
    println!("  /history        reprint the conversation");
    println!("  /quit           end the session");
}
