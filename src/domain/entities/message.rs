/// Strip the IRC `#` sigil and lowercase a channel name.
pub fn normalize_channel(channel: &str) -> String {
    channel.trim().trim_start_matches('#').to_lowercase()
}

/// One chat event being dispatched to the plugins.
///
/// Built once by the bot per "message received" event and handed to every
/// plugin by shared reference. There are no setters: the message cannot
/// change while it is being fanned out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    channel: String,
    sender: String,
    raw_text: String,
}

impl InboundMessage {
    pub fn new(channel: impl AsRef<str>, sender: impl Into<String>, raw_text: impl Into<String>) -> Self {
        Self {
            channel: normalize_channel(channel.as_ref()),
            sender: sender.into(),
            raw_text: raw_text.into(),
        }
    }

    /// Channel the message was posted in, without the `#` sigil.
    pub fn channel(&self) -> &str {
        &self.channel
    }

    /// Display name of the chatter.
    pub fn sender(&self) -> &str {
        &self.sender
    }

    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }
}
