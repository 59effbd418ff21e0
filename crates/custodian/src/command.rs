//! Console command parsing.

use std::str::FromStr;

use thiserror::Error;

/// A console command, one per input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Account lifecycle
    /// Create an account and log in as it.
    Create {
        /// Requested identifier.
        identifier: String,
        /// Chosen password.
        password: String,
        /// Password typed a second time.
        confirmation: String,
    },
    /// Authenticate and log in.
    Login {
        /// Account identifier.
        identifier: String,
        /// Password to check.
        password: String,
    },
    /// Delete the logged-in account.
    Delete,

    // Session
    /// Forget the logged-in account.
    Logout,
    /// Show the logged-in identifier.
    WhoAmI,
    /// Show the logged-in account's failure state.
    Status,

    // Administration
    /// Unlock an account.
    Reset {
        /// Account identifier.
        identifier: String,
    },
    /// Delete every account.
    Purge,

    // Console
    /// List commands.
    Help,
    /// Leave the console.
    Quit,
}

/// Errors from parsing a console line.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The first word is not a known command.
    #[error("unknown command `{0}`, type `help` for a list")]
    Unknown(String),

    /// Known command, wrong number of arguments.
    #[error("usage: {0}")]
    Usage(&'static str),
}

/// One-line usage strings, in the order `help` prints them.
pub const USAGE: &[&str] = &[
    "create <identifier> <password> <confirm>",
    "login <identifier> <password>",
    "logout",
    "whoami",
    "status",
    "delete",
    "reset <identifier>",
    "purge",
    "help",
    "quit",
];

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let Some(name) = words.next() else {
            return Err(CommandError::Usage("help"));
        };
        let args: Vec<&str> = words.collect();

        let command = match (name.to_ascii_lowercase().as_str(), args.as_slice()) {
            ("create", [identifier, password, confirmation]) => Self::Create {
                identifier: (*identifier).to_string(),
                password: (*password).to_string(),
                confirmation: (*confirmation).to_string(),
            },
            ("create", _) => return Err(CommandError::Usage(USAGE[0])),
            ("login", [identifier, password]) => Self::Login {
                identifier: (*identifier).to_string(),
                password: (*password).to_string(),
            },
            ("login", _) => return Err(CommandError::Usage(USAGE[1])),
            ("logout", []) => Self::Logout,
            ("whoami", []) => Self::WhoAmI,
            ("status", []) => Self::Status,
            ("delete", []) => Self::Delete,
            ("reset", [identifier]) => Self::Reset {
                identifier: (*identifier).to_string(),
            },
            ("reset", _) => return Err(CommandError::Usage(USAGE[6])),
            ("purge", []) => Self::Purge,
            ("help", _) => Self::Help,
            ("quit" | "exit", []) => Self::Quit,
            ("logout" | "whoami" | "status" | "delete" | "purge" | "quit" | "exit", _) => {
                return Err(CommandError::Usage("command takes no arguments"));
            }
            _ => return Err(CommandError::Unknown(name.to_string())),
        };
        Ok(command)
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

    #[test]
    fn parse_create() {
        assert_eq!(
            "create a@b.com p1 p2".parse::<Command>().unwrap(),
            Command::Create {
                identifier: "a@b.com".to_string(),
                password: "p1".to_string(),
                confirmation: "p2".to_string(),
            }
        );
    }

    #[test]
    fn parse_login_with_extra_whitespace() {
        assert_eq!(
            "  login   a@b.com\tp1 ".parse::<Command>().unwrap(),
            Command::Login {
                identifier: "a@b.com".to_string(),
                password: "p1".to_string(),
            }
        );
    }

    #[test]
    fn parse_is_case_insensitive_for_command_name_only() {
        assert_eq!(
            "LOGIN A@B.COM Secret".parse::<Command>().unwrap(),
            Command::Login {
                identifier: "A@B.COM".to_string(),
                password: "Secret".to_string(),
            }
        );
    }

    #[test]
    fn parse_bare_commands() {
        assert_eq!("logout".parse::<Command>().unwrap(), Command::Logout);
        assert_eq!("whoami".parse::<Command>().unwrap(), Command::WhoAmI);
        assert_eq!("status".parse::<Command>().unwrap(), Command::Status);
        assert_eq!("delete".parse::<Command>().unwrap(), Command::Delete);
        assert_eq!("purge".parse::<Command>().unwrap(), Command::Purge);
        assert_eq!("help".parse::<Command>().unwrap(), Command::Help);
        assert_eq!("quit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
    }

    #[test]
    fn parse_reset() {
        assert_eq!(
            "reset a@b.com".parse::<Command>().unwrap(),
            Command::Reset {
                identifier: "a@b.com".to_string(),
            }
        );
    }

    #[test]
    fn wrong_arity() {
        assert_eq!(
            "create a@b.com p1".parse::<Command>(),
            Err(CommandError::Usage(USAGE[0]))
        );
        assert_eq!(
            "login a@b.com".parse::<Command>(),
            Err(CommandError::Usage(USAGE[1]))
        );
        assert_eq!(
            "reset".parse::<Command>(),
            Err(CommandError::Usage(USAGE[6]))
        );
        assert!(matches!(
            "delete a@b.com".parse::<Command>(),
            Err(CommandError::Usage(_))
        ));
    }

    #[test]
    fn unknown_command() {
        assert_eq!(
            "unlock a@b.com".parse::<Command>(),
            Err(CommandError::Unknown("unlock".to_string()))
        );
    }

    #[test]
    fn blank_line_is_usage_error() {
        assert!(matches!("   ".parse::<Command>(), Err(CommandError::Usage(_))));
    }
}
