//! Run command implementation.

use clipbeam_core::{AppPhase, Config, ConnectionStatus, EngineEvent, SyncEngine};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::ui::print_banner;

/// Connect with a pairing URL and mirror the clipboard until Ctrl+C.
pub async fn run_sync(device_name: String, url: String) -> anyhow::Result<()> {
    print_banner();

    let config = Config {
        device_name,
        ..Config::default()
    };
    let engine = SyncEngine::new(config);

    println!("\x1b[1mDevice:\x1b[0m   {}", engine.device_name());
    println!("\x1b[1mPlatform:\x1b[0m {}", engine.platform());

    let mut events = engine.start().await?;

    let payload = engine.report_scan(&url).await?;
    println!("\x1b[1mHost:\x1b[0m     {}", payload.host);
    println!("\x1b[1mDevice ID:\x1b[0m {}\n", payload.device_id);
    println!("\x1b[2mType 'bg' or 'fg' + Enter to simulate app backgrounding.\x1b[0m");
    println!("\x1b[2mPress Ctrl+C to stop.\x1b[0m\n");

    // Handle Ctrl+C gracefully
    let (tx, mut shutdown) = tokio::sync::mpsc::channel::<()>(1);
    ctrlc::set_handler(move || {
        let _ = tx.blocking_send(());
    })?;

    let mut stdin = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(event) = events.recv() => {
                render_event(event);
            }
            Ok(Some(line)) = stdin.next_line() => {
                handle_command(&engine, line.trim()).await;
            }
            _ = shutdown.recv() => {
                println!("\n\x1b[1;33mShutting down...\x1b[0m");
                engine.close().await;
                break;
            }
        }
    }

    Ok(())
}

/// Map a typed lifecycle command onto the engine.
async fn handle_command(engine: &SyncEngine, line: &str) {
    match line {
        "bg" => engine.set_phase(AppPhase::Background).await,
        "fg" => engine.set_phase(AppPhase::Foreground).await,
        "" => {}
        other => println!("\x1b[2munknown command '{}'; try 'bg' or 'fg'\x1b[0m", other),
    }
}

/// Render a single engine event to the terminal.
fn render_event(event: EngineEvent) {
    match event {
        EngineEvent::StatusChanged(status) => {
            let label = match status {
                ConnectionStatus::Disconnected => "\x1b[1;31mdisconnected\x1b[0m",
                ConnectionStatus::Connecting => "\x1b[1;33mconnecting\x1b[0m",
                ConnectionStatus::Connected => "\x1b[1;32mconnected\x1b[0m",
            };
            println!("\x1b[1;36m⬤\x1b[0m Status: {}", label);
        }
        EngineEvent::ClipboardReceived { text, source } => {
            let from = source.unwrap_or_else(|| "host".to_string());
            println!(
                "\x1b[1;34m📋\x1b[0m Received from {}: \"{}\"",
                from,
                preview(&text)
            );
        }
        EngineEvent::ClipboardSent { text } => {
            println!("\x1b[1;34m📤\x1b[0m Sent: \"{}\"", preview(&text));
        }
        EngineEvent::PairingRejected { reason } => {
            eprintln!("\x1b[1;31m✗\x1b[0m Pairing rejected: {}", reason);
        }
    }
}

/// Format clipboard content for preview display.
fn preview(text: &str) -> String {
    const MAX_PREVIEW_LEN: usize = 50;

    if text.len() > MAX_PREVIEW_LEN {
        let mut end = MAX_PREVIEW_LEN;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    } else {
        text.to_string()
    }
}
