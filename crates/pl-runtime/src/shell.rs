//! Line commands accepted on standard input.

use std::str::FromStr;

use shared_schema::Document;

pub const HELP: &str = "\
commands:
  go <route> [json params]   open a screen, e.g. go flock-details {\"id\": 3}
  back                       previous screen
  login <pin>                unlock the application
  logout                     lock the application
  save                       save the application state now
  quit                       save and exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Go { route: String, params: Document },
    Back,
    Login(String),
    Logout,
    Save,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing {0}")]
    MissingArgument(&'static str),

    #[error("Parameters must be a JSON object: {0}")]
    InvalidParams(String),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word {
            "" => Err(CommandError::Empty),
            "go" => {
                let (route, params) = match rest.split_once(char::is_whitespace) {
                    Some((route, params)) => (route, params.trim()),
                    None => (rest, ""),
                };
                if route.is_empty() {
                    return Err(CommandError::MissingArgument("route"));
                }
                Ok(Command::Go {
                    route: route.to_string(),
                    params: parse_params(params)?,
                })
            }
            "back" => Ok(Command::Back),
            "login" if rest.is_empty() => Err(CommandError::MissingArgument("PIN")),
            "login" => Ok(Command::Login(rest.to_string())),
            "logout" => Ok(Command::Logout),
            "save" => Ok(Command::Save),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

fn parse_params(text: &str) -> Result<Document, CommandError> {
    if text.is_empty() {
        return Ok(Document::new());
    }
    match serde_json::from_str(text) {
        Ok(serde_json::Value::Object(params)) => Ok(params),
        Ok(other) => Err(CommandError::InvalidParams(other.to_string())),
        Err(e) => Err(CommandError::InvalidParams(e.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_go_with_and_without_params() {
        assert_eq!(
            "go finance".parse::<Command>().unwrap(),
            Command::Go {
                route: "finance".into(),
                params: Document::new()
            }
        );

        let Command::Go { route, params } = "  go flock-details {\"id\": 3} "
            .parse::<Command>()
            .unwrap()
        else {
            panic!("expected go");
        };
        assert_eq!(route, "flock-details");
        assert_eq!(params.get("id"), Some(&json!(3)));
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!("back".parse::<Command>().unwrap(), Command::Back);
        assert_eq!(
            "login 1234".parse::<Command>().unwrap(),
            Command::Login("1234".into())
        );
        assert_eq!("exit".parse::<Command>().unwrap(), Command::Quit);
        assert_eq!("?".parse::<Command>().unwrap(), Command::Help);
    }

    #[test]
    fn test_malformed_commands() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!("go".parse::<Command>(), Err(CommandError::MissingArgument("route")));
        assert_eq!("login".parse::<Command>(), Err(CommandError::MissingArgument("PIN")));
        assert_eq!(
            "fly away".parse::<Command>(),
            Err(CommandError::Unknown("fly".into()))
        );
        assert!(matches!(
            "go flocks [1, 2]".parse::<Command>(),
            Err(CommandError::InvalidParams(_))
        ));
        assert!(matches!(
            "go flocks {oops".parse::<Command>(),
            Err(CommandError::InvalidParams(_))
        ));
    }
}
