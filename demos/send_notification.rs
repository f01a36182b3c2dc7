//! Shows a balloon notification.
//!
//! With `--wait`, the process keeps running until the notification icon is clicked.

use clap::Parser;

/// Show a balloon notification in the Windows notification area
#[cfg_attr(not(windows), allow(dead_code))]
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Notification text
    body: String,

    /// Notification title, also used as the icon tooltip
    #[arg(default_value = "Notification")]
    title: String,

    /// Path to an `.ico` file, used if the executable has no icon resource
    icon_path: Option<String>,

    /// Keep running until the notification icon is clicked
    #[arg(long)]
    wait: bool,
}

#[cfg(windows)]
fn main() -> anyhow::Result<()> {
    use balloon_notify::{
        create_sender,
        send_message,
    };
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("balloon_notify=debug,info")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut sender = create_sender();
    send_message(
        &cli.body,
        &cli.title,
        cli.icon_path.as_deref().unwrap_or(""),
        &mut sender,
    )?;
    tracing::info!("Notification sent");
    if cli.wait {
        let exit_code = sender.run_message_loop()?;
        tracing::info!(exit_code, "Message loop finished");
        sender.shutdown()?;
    }
    Ok(())
}

#[cfg(not(windows))]
fn main() {
    let cli = Cli::parse();
    eprintln!(
        "Cannot show {:?}: balloon notifications are only available on Windows",
        cli.body
    );
}
