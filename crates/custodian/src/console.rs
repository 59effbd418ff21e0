//! Line-oriented console over an account registry.
//!
//! The console plays the part of the login front end: it turns typed
//! commands into registry calls and remembers at most one authenticated
//! handle, the session.

use std::io::{self, BufRead, Write};

use custodian_core::{AccountError, AccountHandle, AccountRegistry};
use tracing::debug;

use crate::command::{Command, USAGE};

/// Whether the read loop should keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Quit,
}

/// Interactive console state.
pub struct Console<'a> {
    registry: &'a AccountRegistry,
    /// Handle of the logged-in account, if any.
    session: Option<AccountHandle>,
}

impl<'a> Console<'a> {
    /// Create a console over a registry, with nobody logged in.
    #[must_use]
    pub const fn new(registry: &'a AccountRegistry) -> Self {
        Self {
            registry,
            session: None,
        }
    }

    /// The logged-in account's handle.
    #[must_use]
    pub const fn session(&self) -> Option<&AccountHandle> {
        self.session.as_ref()
    }

    /// Read commands from `input` until `quit` or end of input.
    ///
    /// Bad commands and registry failures are reported on `output` and the
    /// loop carries on.
    ///
    /// # Errors
    ///
    /// Returns an error only if reading input or writing output fails.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        writeln!(output, "custodian console, type `help` for commands")?;
        for line in input.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match line.parse::<Command>() {
                Ok(command) => {
                    if self.execute(command, &mut output)? == Flow::Quit {
                        break;
                    }
                }
                Err(e) => writeln!(output, "error: {e}")?,
            }
            output.flush()?;
        }
        Ok(())
    }

    fn execute<W: Write>(&mut self, command: Command, out: &mut W) -> io::Result<Flow> {
        match command {
            Command::Create {
                identifier,
                password,
                confirmation,
            } => match self.registry.create(&identifier, &password, &confirmation) {
                Ok(handle) => {
                    writeln!(out, "created {handle}, logged in")?;
                    self.session = Some(handle);
                }
                Err(e) => report(out, &e)?,
            },
            Command::Login {
                identifier,
                password,
            } => match self.registry.authenticate(&identifier, &password) {
                Ok(handle) => {
                    debug!("Session started for {handle}");
                    writeln!(out, "logged in as {handle}")?;
                    self.session = Some(handle);
                }
                Err(e) => report(out, &e)?,
            },
            Command::Delete => match self.session.take() {
                Some(handle) => {
                    let identifier = handle.identifier().to_string();
                    match self.registry.delete(handle) {
                        Ok(()) => writeln!(out, "deleted {identifier}")?,
                        Err(e) => report(out, &e)?,
                    }
                }
                None => writeln!(out, "error: log in first")?,
            },
            Command::Logout => match self.session.take() {
                Some(handle) => writeln!(out, "logged out {handle}")?,
                None => writeln!(out, "not logged in")?,
            },
            Command::WhoAmI => match &self.session {
                Some(handle) => writeln!(out, "{handle}")?,
                None => writeln!(out, "not logged in")?,
            },
            Command::Status => match &self.session {
                Some(handle) => match self.registry.status(handle) {
                    Ok(status) => writeln!(
                        out,
                        "{}: failed attempts {}, {}, created {}",
                        status.identifier,
                        status.failed_attempts,
                        if status.locked { "locked" } else { "unlocked" },
                        status.created_at.to_rfc3339()
                    )?,
                    Err(e) => report(out, &e)?,
                },
                None => writeln!(out, "not logged in")?,
            },
            Command::Reset { identifier } => match self.registry.reset(&identifier) {
                Ok(()) => writeln!(out, "reset {identifier}")?,
                Err(e) => report(out, &e)?,
            },
            Command::Purge => {
                self.registry.delete_all();
                self.session = None;
                writeln!(out, "deleted all accounts")?;
            }
            Command::Help => {
                writeln!(out, "commands:")?;
                for usage in USAGE {
                    writeln!(out, "  {usage}")?;
                }
            }
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }
}

fn report<W: Write>(out: &mut W, error: &AccountError) -> io::Result<()> {
    if error.is_recoverable() {
        writeln!(out, "error: {error}")
    } else {
        writeln!(out, "error: {error} (contact support)")
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    /// Run a script against a registry and return the console's output lines,
    /// without the banner.
    fn run_script(registry: &AccountRegistry, script: &str) -> Vec<String> {
        let mut output = Vec::new();
        Console::new(registry)
            .run(script.as_bytes(), &mut output)
            .unwrap();
        String::from_utf8(output)
            .unwrap()
            .lines()
            .skip(1)
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn create_logs_in() {
        let registry = AccountRegistry::new();
        let lines = run_script(&registry, "create a@b.com p1 p1\nwhoami\n");
        assert_eq!(lines, ["created a@b.com, logged in", "a@b.com"]);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn create_errors_are_reported() {
        let registry = AccountRegistry::new();
        let lines = run_script(
            &registry,
            "create nope p1 p1\ncreate a@b.com p1 p2\ncreate a@b.com p1 p1\ncreate a@b.com p1 p1\n",
        );
        assert_eq!(
            lines,
            [
                "error: nope is not an email address",
                "error: passwords do not match",
                "created a@b.com, logged in",
                "error: a@b.com already exists",
            ]
        );
    }

    #[test]
    fn lockout_through_console() {
        let registry = AccountRegistry::new();
        registry.create("a@b.com", "p1", "p1").unwrap();
        let script = "login a@b.com x\n".repeat(6);
        let lines = run_script(&registry, &script);

        assert_eq!(lines.len(), 6);
        assert!(lines[..5].iter().all(|l| l == "error: password did not match"));
        assert_eq!(
            lines[5],
            "error: too many failed attempts, account is locked (contact support)"
        );
    }

    #[test]
    fn status_shows_failures() {
        let registry = AccountRegistry::new();
        registry.create("a@b.com", "p1", "p1").unwrap();
        let lines = run_script(&registry, "login a@b.com x\nlogin a@b.com p1\nstatus\n");

        assert_eq!(lines[1], "logged in as a@b.com");
        assert!(lines[2].starts_with("a@b.com: failed attempts 1, unlocked, created "));
    }

    #[test]
    fn delete_requires_session() {
        let registry = AccountRegistry::new();
        registry.create("a@b.com", "p1", "p1").unwrap();
        let lines = run_script(&registry, "delete\nlogin a@b.com p1\ndelete\nwhoami\n");

        assert_eq!(
            lines,
            [
                "error: log in first",
                "logged in as a@b.com",
                "deleted a@b.com",
                "not logged in",
            ]
        );
        assert!(registry.is_empty());
    }

    #[test]
    fn logout_clears_session() {
        let registry = AccountRegistry::new();
        let lines = run_script(&registry, "create a@b.com p1 p1\nlogout\nlogout\nstatus\n");
        assert_eq!(
            lines,
            [
                "created a@b.com, logged in",
                "logged out a@b.com",
                "not logged in",
                "not logged in",
            ]
        );
    }

    #[test]
    fn reset_reports_not_implemented() {
        let registry = AccountRegistry::new();
        let lines = run_script(&registry, "reset a@b.com\n");
        assert_eq!(lines, ["error: reset not implemented (contact support)"]);
    }

    #[test]
    fn purge_drops_everything() {
        let registry = AccountRegistry::new();
        let lines = run_script(
            &registry,
            "create a@b.com p1 p1\npurge\nwhoami\nlogin a@b.com p1\n",
        );
        assert_eq!(
            lines,
            [
                "created a@b.com, logged in",
                "deleted all accounts",
                "not logged in",
                "error: account a@b.com does not exist",
            ]
        );
    }

    #[test]
    fn quit_stops_reading() {
        let registry = AccountRegistry::new();
        let lines = run_script(&registry, "quit\ncreate a@b.com p1 p1\n");
        assert!(lines.is_empty());
        assert!(registry.is_empty());
    }

    #[test]
    fn bad_lines_do_not_stop_the_loop() {
        let registry = AccountRegistry::new();
        let lines = run_script(&registry, "\nfrobnicate\nlogin a@b.com\nwhoami\n");
        assert_eq!(
            lines,
            [
                "error: unknown command `frobnicate`, type `help` for a list",
                "error: usage: login <identifier> <password>",
                "not logged in",
            ]
        );
    }

    #[test]
    fn help_lists_every_command() {
        let registry = AccountRegistry::new();
        let lines = run_script(&registry, "help\n");
        assert_eq!(lines[0], "commands:");
        assert_eq!(lines.len(), USAGE.len() + 1);
    }

    #[test]
    fn session_tracks_last_login() {
        let registry = AccountRegistry::new();
        registry.create("a@b.com", "p1", "p1").unwrap();
        registry.create("c@d.com", "p2", "p2").unwrap();

        let mut console = Console::new(&registry);
        let mut output = Vec::new();
        console
            .run("login a@b.com p1\nlogin c@d.com p2\n".as_bytes(), &mut output)
            .unwrap();

        assert_eq!(console.session().unwrap().identifier(), "c@d.com");
    }
}
