// SPDX-FileCopyrightText: 2026 Parley Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `parley demo` command implementation.
//!
//! Plays a short scripted conversation against the canned counterpart and
//! prints every timeline change as it happens.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::Utc;
use colored::Colorize;
use parley_attachment::FileHandle;
use parley_config::ParleyConfig;
use parley_core::{MessageBody, Origin, ParleyError};
use parley_session::{ChatSession, HistoryEntry};
use tracing::info;

use crate::render::{render_line, ChangeTracker};

/// Smallest valid PNG: a 1x1 transparent pixel.
const PIXEL_PNG: &[u8] = &[
    0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x48, 0x44,
    0x52, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x08, 0x06, 0x00, 0x00, 0x00, 0x1f,
    0x15, 0xc4, 0x89, 0x00, 0x00, 0x00, 0x0d, 0x49, 0x44, 0x41, 0x54, 0x78, 0x9c, 0x63, 0x00,
    0x01, 0x00, 0x00, 0x05, 0x00, 0x01, 0x0d, 0x0a, 0x2d, 0xb4, 0x00, 0x00, 0x00, 0x00, 0x49,
    0x45, 0x4e, 0x44, 0xae, 0x42, 0x60, 0x82,
];

/// Earlier conversation the demo session starts from.
fn seeded_history() -> Vec<HistoryEntry> {
    let now = Utc::now();
    let lines = [
        (
            Origin::Local,
            "Hi! I'm interested in your organic tomatoes.",
        ),
        (
            Origin::Remote,
            "Hello! I harvested them this morning. They're very fresh.",
        ),
        (Origin::Local, "How much for 2kg?"),
        (Origin::Remote, "That would be $5.00 for 2kg."),
    ];
    let count = lines.len() as i64;
    lines
        .into_iter()
        .enumerate()
        .map(|(i, (origin, text))| {
            let minutes_ago = (count - i as i64) * 5;
            HistoryEntry::new(
                origin,
                MessageBody::text(text),
                now - chrono::Duration::minutes(minutes_ago),
            )
        })
        .collect()
}

/// Runs the scripted conversation. With `fast`, delays are shortened tenfold.
pub async fn run_demo(mut config: ParleyConfig, fast: bool) -> Result<(), ParleyError> {
    if fast {
        config.delivery.delivery_delay_ms /= 10;
        config.delivery.reply_delay_ms /= 10;
    }
    let local = config.session.name.clone();
    let remote = config.counterpart.name.clone();
    let settle = Duration::from_millis(
        config.delivery.delivery_delay_ms + config.delivery.reply_delay_ms + 50,
    );
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

    println!("{}", "-- earlier --".dimmed());
    session.import_history(seeded_history())?;

    println!("{}", "-- today --".dimmed());
    session.send_text("Are they still available?")?;
    tokio::time::sleep(settle).await;

    session
        .send_image(FileHandle::from_bytes(
            "basket.png",
            "image/png",
            PIXEL_PNG.to_vec(),
        ))
        .await?;
    // Blank input is ignored.
    session.send_text("   ")?;
    tokio::time::sleep(settle).await;

    if let Some(reply) = session.snapshot().iter().rev().find(|m| !m.is_local()) {
        session.mark_seen(reply.id)?;
    }

    // Teardown right after a send: the last message stays pending.
    session.send_text("See you at the market!")?;
    session.teardown().await;
    tokio::time::sleep(settle).await;

    let snapshot = session.snapshot();
    info!(
        session_id = %session.session_id(),
        messages = snapshot.len(),
        "demo finished"
    );
    println!(
        "{}",
        format!(
            "-- session closed with {} messages, {} attachment slots left --",
            snapshot.len(),
            session.attachments_remaining()
        )
        .dimmed()
    );
    Ok(())
}
