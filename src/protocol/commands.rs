//! Module `commands`
//!
//! Defines the FTP commands the client emits on the control channel and
//! their exact wire form.

use std::fmt;

/// A command sent by the client.
///
/// Commands that carry an argument store it as a `String`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    User(String), // Login name
    Pass(String), // Password for login
    Pasv,         // Ask the server for a passive data address
    Stor(String), // Upload to the remote path
    Retr(String), // Download from the remote path
    Quit,
}

impl Command {
    /// Renders the command exactly as written to the control channel,
    /// terminated by a single newline.
    pub fn to_wire(&self) -> String {
        match self {
            Command::User(login) => format!("USER {}\n", login),
            Command::Pass(password) => format!("PASS {}\n", password),
            Command::Pasv => "PASV\n".to_string(),
            Command::Stor(path) => format!("STOR {}\n", path),
            Command::Retr(path) => format!("RETR {}\n", path),
            Command::Quit => "QUIT\n".to_string(),
        }
    }
}

/// Log form of a command. Never reveals the password.
impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::Pass(_) => write!(f, "PASS ****"),
            other => write!(f, "{}", other.to_wire().trim_end()),
        }
    }
}
