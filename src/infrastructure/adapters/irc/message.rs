//! IRC line parsing, including IRCv3 message tags

use std::collections::HashMap;

/// One parsed IRC line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrcMessage {
    pub tags: HashMap<String, String>,
    /// `nick!user@host` or a server name
    pub prefix: Option<String>,
    pub command: String,
    /// Middle params followed by the trailing param, if any
    pub params: Vec<String>,
}

impl IrcMessage {
    pub fn parse(line: &str) -> Option<Self> {
        let mut rest = line.trim_end_matches(['\r', '\n']);

        let mut tags = HashMap::new();
        if let Some(tagged) = rest.strip_prefix('@') {
            let (raw_tags, remainder) = tagged.split_once(' ')?;
            for pair in raw_tags.split(';').filter(|p| !p.is_empty()) {
                let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
                tags.insert(key.to_string(), unescape_tag(value));
            }
            rest = remainder.trim_start();
        }

        let mut prefix = None;
        if let Some(prefixed) = rest.strip_prefix(':') {
            let (p, remainder) = prefixed.split_once(' ')?;
            prefix = Some(p.to_string());
            rest = remainder.trim_start();
        }

        let (middle, trailing) = match rest.split_once(" :") {
            Some((middle, trailing)) => (middle, Some(trailing)),
            None => (rest, None),
        };

        let mut words = middle.split_whitespace();
        let command = words.next()?.to_uppercase();
        let mut params: Vec<String> = words.map(|s| s.to_string()).collect();
        if let Some(trailing) = trailing {
            params.push(trailing.to_string());
        }

        Some(Self {
            tags,
            prefix,
            command,
            params,
        })
    }

    /// Nick part of the prefix
    pub fn nick(&self) -> Option<&str> {
        self.prefix
            .as_deref()
            .and_then(|p| p.split('!').next())
            .filter(|n| !n.is_empty())
    }

    /// A tag value, `None` when missing or empty
    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|v| v.as_str()).filter(|v| !v.is_empty())
    }

    pub fn param(&self, index: usize) -> Option<&str> {
        self.params.get(index).map(|s| s.as_str())
    }
}

fn unescape_tag(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some(':') => out.push(';'),
            Some('s') => out.push(' '),
            Some('r') => out.push('\r'),
            Some('n') => out.push('\n'),
            Some(other) => out.push(other),
            None => {}
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ping() {
        let msg = IrcMessage::parse("PING :tmi.twitch.tv\r\n").unwrap();
        assert_eq!(msg.command, "PING");
        assert_eq!(msg.params, vec!["tmi.twitch.tv"]);
        assert!(msg.prefix.is_none());
    }

    #[test]
    fn test_parse_tagged_privmsg() {
        let line = "@badge-info=;color=#FF0000;display-name=Ann;user-id=7 \
                    :ann!ann@ann.tmi.twitch.tv PRIVMSG #c1 :!hello there";
        let msg = IrcMessage::parse(line).unwrap();
        assert_eq!(msg.command, "PRIVMSG");
        assert_eq!(msg.nick(), Some("ann"));
        assert_eq!(msg.tag("display-name"), Some("Ann"));
        assert_eq!(msg.tag("badge-info"), None);
        assert_eq!(msg.params, vec!["#c1", "!hello there"]);
    }

    #[test]
    fn test_parse_numeric_welcome() {
        let msg = IrcMessage::parse(":tmi.twitch.tv 001 gauntlybot :Welcome, GLHF!").unwrap();
        assert_eq!(msg.command, "001");
        assert_eq!(msg.param(0), Some("gauntlybot"));
        assert_eq!(msg.param(1), Some("Welcome, GLHF!"));
    }

    #[test]
    fn test_tag_escapes() {
        let msg = IrcMessage::parse(r"@system-msg=Hello\sthere\:\\ok :tmi.twitch.tv USERNOTICE #c1").unwrap();
        assert_eq!(msg.tag("system-msg"), Some(r"Hello there;\ok"));
    }

    #[test]
    fn test_empty_line_is_rejected() {
        assert!(IrcMessage::parse("").is_none());
        assert!(IrcMessage::parse("\r\n").is_none());
    }
}
