//! Interactive console — buttons and slider driven from stdin.
//!
//! DESIGN
//! ======
//! Each input line is one UI event: `+`/`-` are the step buttons, a bare
//! integer is a slider input event, `r` re-fetches, `q` quits. Events are
//! handled one at a time, in order. Snapshot changes (from events or from the
//! poll timer) are printed as they arrive, and the final state is printed on
//! exit.
//!
//! `run_watch` is the read-only variant: it only prints changes until the
//! shutdown future resolves.

use std::future::Future;
use std::io::{self, Write};

use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::watch;

use crate::services::sync::DelaySync;
use crate::state::Snapshot;
use crate::view::render_snapshot;

pub const HELP: &str = "commands: + (slower), - (faster), <ms> (set), r (refresh), q (quit)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleInput {
    Increment,
    Decrement,
    Slider(i64),
    Refresh,
    Help,
    Quit,
    Blank,
    Unknown(String),
}

#[must_use]
pub fn parse_input(line: &str) -> ConsoleInput {
    let line = line.trim();
    match line {
        "" => ConsoleInput::Blank,
        "+" => ConsoleInput::Increment,
        "-" => ConsoleInput::Decrement,
        "r" | "refresh" => ConsoleInput::Refresh,
        "h" | "help" | "?" => ConsoleInput::Help,
        "q" | "quit" | "exit" => ConsoleInput::Quit,
        other => other
            .parse::<i64>()
            .map_or_else(|_| ConsoleInput::Unknown(other.to_string()), ConsoleInput::Slider),
    }
}

/// Drive `sync` from `input` until EOF or `q`. Network failures are already
/// reflected in the snapshot, so they never end the session.
///
/// # Errors
///
/// Returns an error if reading input or writing output fails.
pub async fn run_console<R, W>(sync: &DelaySync, input: R, out: &mut W) -> io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut lines = input.lines();
    let mut rx = sync.subscribe();
    writeln!(out, "{HELP}")?;
    print_current(&mut rx, out)?;

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                match parse_input(&line) {
                    ConsoleInput::Increment => { let _ = sync.increment().await; }
                    ConsoleInput::Decrement => { let _ = sync.decrement().await; }
                    ConsoleInput::Slider(value) => { let _ = sync.slider_input(value).await; }
                    ConsoleInput::Refresh => { let _ = sync.fetch_current_delay().await; }
                    ConsoleInput::Help => writeln!(out, "{HELP}")?,
                    ConsoleInput::Quit => break,
                    ConsoleInput::Blank => {}
                    ConsoleInput::Unknown(raw) => writeln!(out, "unrecognized input {raw:?}; {HELP}")?,
                }
            }
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                print_current(&mut rx, out)?;
            }
        }
    }

    print_current(&mut rx, out)?;
    Ok(())
}

/// Print the current snapshot, then every change, until `shutdown` resolves.
///
/// # Errors
///
/// Returns an error if writing output fails.
pub async fn run_watch<F, W>(sync: &DelaySync, shutdown: F, out: &mut W) -> io::Result<()>
where
    F: Future<Output = ()>,
    W: Write,
{
    let mut rx = sync.subscribe();
    print_current(&mut rx, out)?;
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            biased;
            changed = rx.changed() => {
                if changed.is_err() {
                    break;
                }
                print_current(&mut rx, out)?;
            }
            () = &mut shutdown => break,
        }
    }
    Ok(())
}

fn print_current<W: Write>(rx: &mut watch::Receiver<Snapshot>, out: &mut W) -> io::Result<()> {
    let snapshot = *rx.borrow_and_update();
    writeln!(out, "{}", render_snapshot(&snapshot))?;
    out.flush()
}

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;
