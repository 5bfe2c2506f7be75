//! Line-driven rendering of the panel on a terminal.

use std::{fmt::Write as _, sync::Arc};

use panel::{ActionOutcome, PanelController, PanelError, PanelEvent, PanelView};
use shared::domain::FavoriteSelector;
use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    sync::broadcast::error::RecvError,
    task::{JoinError, JoinSet},
};
use tracing::{debug, error};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Swap(String),
    Favorite(String),
    Show,
    Help,
    Quit,
}

const HELP: &str = "commands: swap <id> | fav <name|number> | show | help | quit";

pub fn parse_command(line: &str) -> Result<ShellCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };
    match verb {
        "swap" | "s" => Ok(ShellCommand::Swap(rest.to_string())),
        "fav" | "f" if !rest.is_empty() => Ok(ShellCommand::Favorite(rest.to_string())),
        "fav" | "f" => Err("fav needs a favorite name or number".to_string()),
        "show" | "" => Ok(ShellCommand::Show),
        "help" | "?" => Ok(ShellCommand::Help),
        "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
        other => Err(format!("unknown command '{other}'; {HELP}")),
    }
}

/// Looks a favorite up by exact name first, then by its 1-based position.
pub fn resolve_favorite(favorites: &[FavoriteSelector], token: &str) -> Option<FavoriteSelector> {
    if let Some(found) = favorites.iter().find(|fav| fav.as_str() == token) {
        return Some(found.clone());
    }
    let index = token.parse::<usize>().ok()?.checked_sub(1)?;
    favorites.get(index).cloned()
}

pub fn render(view: &PanelView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "devbox [{}]", view.device_input);
    if view.favorites.is_empty() {
        let _ = writeln!(out, "favorites: (none)");
    } else {
        let labels: Vec<String> = view
            .favorites
            .iter()
            .enumerate()
            .map(|(i, fav)| format!("{}) {fav}", i + 1))
            .collect();
        let _ = writeln!(out, "favorites: {}", labels.join("  "));
    }
    if let Some(message) = view.visible_error() {
        let _ = writeln!(out, "! {message}");
    }
    out
}

pub async fn run_shell<R, W>(
    panel: Arc<PanelController>,
    reader: R,
    mut writer: W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut events = panel.subscribe_events();
    match panel.initialize().await {
        Ok(favorites) => debug!(count = favorites.len(), "panel initialized"),
        Err(PanelError::Operation(failure)) => {
            error!(reason = %failure, "failed to load favorites");
        }
        Err(other) => return Err(other.into()),
    }
    writer.write_all(render(&panel.view()).as_bytes()).await?;
    writer.flush().await?;

    // Each action runs as its own task; completions re-render the view.
    let mut actions = JoinSet::new();
    let mut lines = reader.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let reply = match parse_command(&line) {
                    Ok(ShellCommand::Quit) => break,
                    Ok(ShellCommand::Help) => format!("{HELP}\n"),
                    Ok(command) => {
                        spawn_action(&panel, &mut actions, command);
                        render(&panel.view())
                    }
                    Err(message) => format!("{message}\n"),
                };
                writer.write_all(reply.as_bytes()).await?;
                writer.flush().await?;
            }
            Some(done) = actions.join_next(), if !actions.is_empty() => {
                report(done);
                writer.write_all(render(&panel.view()).as_bytes()).await?;
                writer.flush().await?;
            }
            event = events.recv() => match event {
                Ok(PanelEvent::NotificationHidden) => {
                    writer.write_all(render(&panel.view()).as_bytes()).await?;
                    writer.flush().await?;
                }
                Ok(_) | Err(RecvError::Lagged(_)) => {}
                Err(RecvError::Closed) => break,
            },
        }
    }

    if !actions.is_empty() {
        while let Some(done) = actions.join_next().await {
            report(done);
        }
        writer.write_all(render(&panel.view()).as_bytes()).await?;
        writer.flush().await?;
    }

    panel.teardown();
    Ok(())
}

fn spawn_action(
    panel: &Arc<PanelController>,
    actions: &mut JoinSet<ActionOutcome>,
    command: ShellCommand,
) {
    let panel = Arc::clone(panel);
    match command {
        ShellCommand::Swap(text) => {
            panel.set_device_input(text.clone());
            actions.spawn(async move { panel.submit_switch(&text).await });
        }
        ShellCommand::Favorite(token) => {
            let selector = resolve_favorite(&panel.favorites(), &token)
                // Unlisted names are forwarded as typed.
                .unwrap_or_else(|| FavoriteSelector::from(token));
            actions.spawn(async move { panel.activate_favorite(&selector).await });
        }
        ShellCommand::Show | ShellCommand::Help | ShellCommand::Quit => {}
    }
}

fn report(done: Result<ActionOutcome, JoinError>) {
    match done {
        Ok(ActionOutcome::Discarded) => error!("panel is no longer active"),
        Ok(outcome) => debug!(?outcome, "shell action finished"),
        Err(join_error) => error!(%join_error, "shell action did not finish"),
    }
}

#[cfg(test)]
#[path = "tests/shell_tests.rs"]
mod tests;
