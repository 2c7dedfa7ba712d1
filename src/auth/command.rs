//! Chat command parsing.
//!
//! Commands are a single line: a case-insensitive keyword followed by
//! arguments. Everything that isn't a command flows on to classification.

/// A recognized chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `login <email> <password>` — password keeps any internal whitespace.
    Login { email: String, password: String },
    /// `login` with missing or incomplete credentials.
    LoginBare,
    /// `logout`
    Logout,
    /// `status`
    Status,
    /// `help`
    Help,
}

impl Command {
    /// Parse a message as a command. Returns `None` for ordinary text.
    pub fn parse(text: &str) -> Option<Command> {
        let trimmed = text.trim();
        let keyword = trimmed.split_whitespace().next()?;

        match keyword.to_ascii_lowercase().as_str() {
            "login" => {
                let rest = trimmed[keyword.len()..].trim();
                Some(match split_credentials(rest) {
                    Some((email, password)) => Command::Login { email, password },
                    None => Command::LoginBare,
                })
            }
            "logout" => Some(Command::Logout),
            "status" => Some(Command::Status),
            "help" => Some(Command::Help),
            _ => None,
        }
    }
}

/// Split `"<email> <password...>"` into its two parts.
///
/// The email is the first whitespace-delimited token; the *entire* remainder,
/// trimmed only at the ends, is the password — so passwords containing spaces
/// are preserved. Returns `None` unless both parts are present and the email
/// part is plausibly an email.
pub fn split_credentials(text: &str) -> Option<(String, String)> {
    let trimmed = text.trim();
    let email = trimmed.split_whitespace().next()?;
    let password = trimmed[email.len()..].trim();
    if password.is_empty() || !looks_like_email(email) {
        return None;
    }
    Some((email.to_string(), password.to_string()))
}

/// Cheap shape check — the Auth Service owns real validation.
fn looks_like_email(s: &str) -> bool {
    let Some(at) = s.find('@') else { return false };
    at > 0 && s[at + 1..].contains('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_with_credentials() {
        let cmd = Command::parse("login a@x.com hunter2").unwrap();
        assert_eq!(
            cmd,
            Command::Login {
                email: "a@x.com".into(),
                password: "hunter2".into()
            }
        );
    }

    #[test]
    fn multi_word_password_is_preserved() {
        let cmd = Command::parse("login a@x.com secret phrase").unwrap();
        assert_eq!(
            cmd,
            Command::Login {
                email: "a@x.com".into(),
                password: "secret phrase".into()
            }
        );
    }

    #[test]
    fn password_inner_whitespace_survives_trim() {
        let cmd = Command::parse("  login a@x.com  pass  with   gaps  ").unwrap();
        assert_eq!(
            cmd,
            Command::Login {
                email: "a@x.com".into(),
                password: "pass  with   gaps".into()
            }
        );
    }

    #[test]
    fn keyword_is_case_insensitive_email_case_preserved() {
        let cmd = Command::parse("LOGIN Alice@Example.COM pw").unwrap();
        assert_eq!(
            cmd,
            Command::Login {
                email: "Alice@Example.COM".into(),
                password: "pw".into()
            }
        );
    }

    #[test]
    fn bare_login_and_email_only_are_incomplete() {
        assert_eq!(Command::parse("login"), Some(Command::LoginBare));
        assert_eq!(Command::parse("login a@x.com"), Some(Command::LoginBare));
    }

    #[test]
    fn non_email_first_token_is_incomplete() {
        assert_eq!(Command::parse("login please now"), Some(Command::LoginBare));
    }

    #[test]
    fn other_commands() {
        assert_eq!(Command::parse("logout"), Some(Command::Logout));
        assert_eq!(Command::parse("STATUS"), Some(Command::Status));
        assert_eq!(Command::parse("Help"), Some(Command::Help));
    }

    #[test]
    fn ordinary_text_is_not_a_command() {
        assert_eq!(Command::parse("spent 450 on lunch"), None);
        assert_eq!(Command::parse(""), None);
        assert_eq!(Command::parse("   "), None);
        // Keyword must be the first token.
        assert_eq!(Command::parse("my login is broken"), None);
    }

    #[test]
    fn split_credentials_rejects_malformed() {
        assert!(split_credentials("a@x.com").is_none());
        assert!(split_credentials("notanemail pw").is_none());
        assert!(split_credentials("").is_none());
        assert!(split_credentials("@x.com pw").is_none());
    }
}
