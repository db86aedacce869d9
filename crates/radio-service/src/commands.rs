//! Command parsing
//!
//! Turns the text of a `/command` message into a typed [`Command`]. Parsing
//! never touches state: malformed arguments come back as a [`Usage`] naming
//! the reply to show.

use radio_core::{Capabilities, ChannelId, UserId};

use crate::dto::{BroadcastRequest, NameRequest, VersionAnnouncement};

/// Command word, aliases folded in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Start,
    Help,
    Scan,
    Goto,
    Name,
    ResetName,
    Emoji,
    Version,
    Broadcast,
    Zov,
    Unzov,
    Del,
}

/// Alias spellings that get a notice pointing at the canonical command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alias {
    /// `/channel` for `/goto`
    Channel,
    /// `/tag` for `/name`
    Tag,
}

/// A recognized command word and the raw text after it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Invocation<'a> {
    pub verb: Verb,
    pub alias: Option<Alias>,
    pub args: &'a str,
}

/// Whose record a moderator command acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Id(UserId),
    /// The author of the message the command replies to
    Reply,
}

/// Malformed arguments; each variant has its own usage reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Usage {
    Goto,
    Name,
    ResetName,
    /// `reply` tells the reply form from the id form
    Emoji { reply: bool },
    Version,
    Broadcast,
    Zov,
    Unzov,
    Del,
}

/// Fully parsed command
#[derive(Debug, Clone)]
pub enum Command {
    Start,
    Help,
    Scan,
    Goto(ChannelId),
    Name(NameRequest),
    ResetName(Target),
    Emoji { target: Target, emoji: String },
    Version(VersionAnnouncement),
    Broadcast(BroadcastRequest),
    /// Words after the id, read as `[duration] [reason]`
    Zov { target: UserId, term: Vec<String> },
    Unzov(UserId),
    /// Delete the fan-out of the replied message
    Del,
}

impl Verb {
    /// Recognize a command message. A `@botname` suffix on the command word
    /// is ignored; matching is case-sensitive. Unknown words return `None`.
    pub fn parse(text: &str) -> Option<Invocation<'_>> {
        let body = text.strip_prefix('/')?;
        let (word, args) = match body.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim_start()),
            None => (body, ""),
        };
        let word = word.split_once('@').map_or(word, |(word, _)| word);

        let (verb, alias) = match word {
            "start" => (Self::Start, None),
            "help" => (Self::Help, None),
            "scan" => (Self::Scan, None),
            "goto" => (Self::Goto, None),
            "channel" => (Self::Goto, Some(Alias::Channel)),
            "name" => (Self::Name, None),
            "tag" => (Self::Name, Some(Alias::Tag)),
            "resetname" => (Self::ResetName, None),
            "emoji" => (Self::Emoji, None),
            "version" => (Self::Version, None),
            "broadcast" | "broad" => (Self::Broadcast, None),
            "zov" => (Self::Zov, None),
            "unzov" => (Self::Unzov, None),
            "del" => (Self::Del, None),
            _ => return None,
        };

        Some(Invocation { verb, alias, args })
    }

    /// Capability the caller must hold, checked before arguments are looked at
    pub fn required_capability(&self) -> Capabilities {
        match self {
            Self::Start | Self::Help | Self::Scan | Self::Goto | Self::Name => {
                Capabilities::RELAY
            }
            Self::ResetName
            | Self::Emoji
            | Self::Version
            | Self::Broadcast
            | Self::Zov
            | Self::Unzov
            | Self::Del => Capabilities::MODERATE,
        }
    }
}

impl Invocation<'_> {
    /// Parse the arguments. `is_reply` tells whether the command message
    /// answers another message.
    pub fn into_command(self, is_reply: bool) -> Result<Command, Usage> {
        let words: Vec<&str> = self.args.split_whitespace().collect();

        match self.verb {
            Verb::Start => Ok(Command::Start),
            Verb::Help => Ok(Command::Help),
            Verb::Scan => Ok(Command::Scan),
            Verb::Goto => match words.as_slice() {
                [channel] => channel
                    .parse()
                    .map(Command::Goto)
                    .map_err(|_| Usage::Goto),
                _ => Err(Usage::Goto),
            },
            Verb::Name => {
                if self.args.is_empty() {
                    return Err(Usage::Name);
                }
                Ok(Command::Name(NameRequest {
                    name: self.args.to_string(),
                }))
            }
            Verb::ResetName => {
                if is_reply {
                    return Ok(Command::ResetName(Target::Reply));
                }
                match words.as_slice() {
                    [id] => parse_user(id)
                        .map(|id| Command::ResetName(Target::Id(id)))
                        .ok_or(Usage::ResetName),
                    _ => Err(Usage::ResetName),
                }
            }
            Verb::Emoji => match (is_reply, words.as_slice()) {
                (true, [emoji]) => Ok(Command::Emoji {
                    target: Target::Reply,
                    emoji: (*emoji).to_string(),
                }),
                (true, _) => Err(Usage::Emoji { reply: true }),
                (false, [id, emoji]) => parse_user(id)
                    .map(|id| Command::Emoji {
                        target: Target::Id(id),
                        emoji: (*emoji).to_string(),
                    })
                    .ok_or(Usage::Emoji { reply: false }),
                (false, _) => Err(Usage::Emoji { reply: false }),
            },
            Verb::Version => {
                let (version, notes) = self
                    .args
                    .split_once(char::is_whitespace)
                    .ok_or(Usage::Version)?;
                let notes = notes.trim_start();
                if notes.is_empty() {
                    return Err(Usage::Version);
                }
                Ok(Command::Version(VersionAnnouncement {
                    version: version.to_string(),
                    notes: notes.to_string(),
                }))
            }
            Verb::Broadcast => {
                if self.args.is_empty() {
                    return Err(Usage::Broadcast);
                }
                Ok(Command::Broadcast(BroadcastRequest {
                    text: self.args.to_string(),
                }))
            }
            Verb::Zov => match words.split_first() {
                Some((id, term)) => parse_user(id)
                    .map(|target| Command::Zov {
                        target,
                        term: term.iter().map(|w| (*w).to_string()).collect(),
                    })
                    .ok_or(Usage::Zov),
                None => Err(Usage::Zov),
            },
            Verb::Unzov => match words.as_slice() {
                [id] => parse_user(id).map(Command::Unzov).ok_or(Usage::Unzov),
                _ => Err(Usage::Unzov),
            },
            Verb::Del => {
                if is_reply {
                    Ok(Command::Del)
                } else {
                    Err(Usage::Del)
                }
            }
        }
    }
}

fn parse_user(word: &str) -> Option<UserId> {
    word.parse().ok()
}
