//! `@name argument` directives that steer a run instead of being sent.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;

use crate::error::MacroError;

static DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^@(?P<name>\w+)(?:\s(?P<argument>.*))?$").expect("valid directive regex")
});

/// Which pass over the script is interpreting directives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// First pass, before the channel is open. Only `@prompt` applies.
    Discovery,

    /// Second pass, while commands are being sent.
    Execution,
}

/// A directive as written in the script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MacroInvocation {
    /// Macro name without the `@`.
    pub name: String,

    /// Everything after the first whitespace following the name, kept
    /// verbatim so `@prompt` patterns can end in a space. Empty when absent.
    pub argument: String,
}

impl MacroInvocation {
    /// Parse `line` as a directive.
    ///
    /// Returns `None` for ordinary command lines and `Some(Err(_))` for a
    /// line that starts with `@` but is not `@name [argument]`.
    pub fn parse(line: &str) -> Option<Result<Self, MacroError>> {
        if !line.starts_with('@') {
            return None;
        }

        Some(
            DIRECTIVE
                .captures(line)
                .map(|caps| Self {
                    name: caps["name"].to_string(),
                    argument: caps
                        .name("argument")
                        .map(|m| m.as_str().to_string())
                        .unwrap_or_default(),
                })
                .ok_or_else(|| MacroError::Malformed(line.to_string())),
        )
    }
}

/// The closed set of supported macros.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Macro {
    /// Add a prompt pattern (discovery pass).
    Prompt(String),

    /// Pause before the next line (execution pass).
    Sleep(Duration),

    /// Stop the run (execution pass).
    Exit,
}

impl Macro {
    /// Name of the `@prompt` macro.
    pub const PROMPT: &'static str = "prompt";
    /// Name of the `@sleep` macro.
    pub const SLEEP: &'static str = "sleep";
    /// Name of the `@exit` macro.
    pub const EXIT: &'static str = "exit";

    /// Resolve an invocation for the given pass.
    ///
    /// `Ok(None)` means the directive does nothing in this pass. Discovery
    /// ignores everything except `@prompt`; execution rejects names it does
    /// not know.
    pub fn interpret(invocation: &MacroInvocation, mode: Mode) -> Result<Option<Self>, MacroError> {
        let name = invocation.name.as_str();
        let argument = invocation.argument.as_str();

        match (mode, name) {
            (Mode::Discovery, Self::PROMPT) => {
                if argument.trim().is_empty() {
                    return Err(invalid(invocation));
                }
                Ok(Some(Self::Prompt(argument.to_string())))
            }
            (Mode::Discovery, _) => Ok(None),

            (Mode::Execution, Self::EXIT) => Ok(Some(Self::Exit)),
            (Mode::Execution, Self::SLEEP) => argument
                .trim()
                .parse::<u64>()
                .map(|secs| Some(Self::Sleep(Duration::from_secs(secs))))
                .map_err(|_| invalid(invocation)),
            // Already applied before the channel was opened.
            (Mode::Execution, Self::PROMPT) => Ok(None),
            (Mode::Execution, _) => Err(MacroError::Unknown(name.to_string())),
        }
    }
}

fn invalid(invocation: &MacroInvocation) -> MacroError {
    MacroError::InvalidArgument {
        name: invocation.name.clone(),
        argument: invocation.argument.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> MacroInvocation {
        MacroInvocation::parse(line).unwrap().unwrap()
    }

    #[test]
    fn test_parse_plain_line() {
        assert!(MacroInvocation::parse("show version").is_none());
        assert!(MacroInvocation::parse("echo @sleep 1").is_none());
    }

    #[test]
    fn test_parse_directive() {
        let inv = parse(r"@prompt \[root@vm1 ~\]#\s");
        assert_eq!(inv.name, "prompt");
        assert_eq!(inv.argument, r"\[root@vm1 ~\]#\s");

        let inv = parse("@exit");
        assert_eq!(inv.name, "exit");
        assert_eq!(inv.argument, "");

        let inv = parse("@sleep   30  ");
        assert_eq!(inv.argument, "  30  ");
    }

    #[test]
    fn test_prompt_argument_keeps_trailing_space() {
        let inv = parse("@prompt fw1> ");
        assert_eq!(inv.argument, "fw1> ");
        assert_eq!(
            Macro::interpret(&inv, Mode::Discovery).unwrap(),
            Some(Macro::Prompt("fw1> ".into()))
        );
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            MacroInvocation::parse("@ sleep 3"),
            Some(Err(MacroError::Malformed(_)))
        ));
        assert!(matches!(
            MacroInvocation::parse("@"),
            Some(Err(MacroError::Malformed(_)))
        ));
    }

    #[test]
    fn test_discovery_mode() {
        assert_eq!(
            Macro::interpret(&parse("@prompt login:\\s"), Mode::Discovery).unwrap(),
            Some(Macro::Prompt("login:\\s".into()))
        );
        assert_eq!(Macro::interpret(&parse("@sleep 5"), Mode::Discovery).unwrap(), None);
        assert_eq!(Macro::interpret(&parse("@exit"), Mode::Discovery).unwrap(), None);
        assert_eq!(Macro::interpret(&parse("@bogus x"), Mode::Discovery).unwrap(), None);
        assert!(Macro::interpret(&parse("@prompt"), Mode::Discovery).is_err());
        assert!(Macro::interpret(&parse("@prompt  "), Mode::Discovery).is_err());
    }

    #[test]
    fn test_execution_mode() {
        assert_eq!(
            Macro::interpret(&parse("@sleep 3"), Mode::Execution).unwrap(),
            Some(Macro::Sleep(Duration::from_secs(3)))
        );
        assert_eq!(
            Macro::interpret(&parse("@sleep   30  "), Mode::Execution).unwrap(),
            Some(Macro::Sleep(Duration::from_secs(30)))
        );
        assert_eq!(
            Macro::interpret(&parse("@exit now"), Mode::Execution).unwrap(),
            Some(Macro::Exit)
        );
        assert_eq!(Macro::interpret(&parse("@prompt x"), Mode::Execution).unwrap(), None);
    }

    #[test]
    fn test_execution_mode_errors() {
        assert_eq!(
            Macro::interpret(&parse("@reboot now"), Mode::Execution),
            Err(MacroError::Unknown("reboot".into()))
        );
        assert_eq!(
            Macro::interpret(&parse("@sleep soon"), Mode::Execution),
            Err(MacroError::InvalidArgument {
                name: "sleep".into(),
                argument: "soon".into()
            })
        );
        assert!(Macro::interpret(&parse("@sleep"), Mode::Execution).is_err());
        assert!(Macro::interpret(&parse("@sleep -1"), Mode::Execution).is_err());
    }
}
