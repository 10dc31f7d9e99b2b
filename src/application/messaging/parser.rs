//! Trigger parser - Splits chat text into a command word and arguments

/// Every chat command starts with this
pub const COMMAND_PREFIX: &str = "!";

/// A command word with its arguments, e.g. `!raid SomeChannel` becomes
/// `{ name: "!raid", args: ["somechannel"] }`.
///
/// Matching is case-insensitive, so everything is lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub name: String,
    pub args: Vec<String>,
}

impl Trigger {
    /// Parse a chat line. Returns `None` unless the text starts with
    /// [`COMMAND_PREFIX`].
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        if !text.starts_with(COMMAND_PREFIX) {
            return None;
        }

        let mut parts = text.split_whitespace().map(|s| s.to_lowercase());
        let name = parts.next()?;
        if name.len() == COMMAND_PREFIX.len() {
            return None;
        }

        Some(Self {
            name,
            args: parts.collect(),
        })
    }

    /// True when this trigger is one of `commands`
    pub fn is_any(&self, commands: &[&str]) -> bool {
        commands.iter().any(|c| c.eq_ignore_ascii_case(&self.name))
    }

    /// True for a command sent on its own, with nothing after it
    pub fn is_bare(&self) -> bool {
        self.args.is_empty()
    }

    /// First argument, if any
    pub fn arg(&self, index: usize) -> Option<&str> {
        self.args.get(index).map(|s| s.as_str())
    }

    /// Arguments joined back with single spaces
    pub fn rest(&self) -> String {
        self.args.join(" ")
    }
}
