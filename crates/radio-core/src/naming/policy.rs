//! Name policy - validation of user-chosen display names
//!
//! Restricted names are compared after normalization so that look-alike
//! spellings (`Систeма` with a Latin `e`, `4dmin`, small caps) collide with
//! the reserved form.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::value_objects::UserId;

/// Why a proposed name was refused
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NameRejection {
    TooLong { max: usize },
    InvalidChars(Vec<char>),
    Blank,
    Restricted,
}

impl fmt::Display for NameRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooLong { max } => write!(f, "longer than {max} characters"),
            Self::InvalidChars(chars) => {
                let list: String = chars.iter().collect();
                write!(f, "forbidden characters: {list}")
            }
            Self::Blank => f.write_str("blank"),
            Self::Restricted => f.write_str("reserved name"),
        }
    }
}

/// A reserved name and the users still allowed to wear it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestrictedName {
    pub name: String,
    pub allowed: Vec<UserId>,
}

impl RestrictedName {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            allowed: Vec::new(),
        }
    }

    pub fn allow(mut self, user: UserId) -> Self {
        self.allowed.push(user);
        self
    }
}

/// Length, alphabet and reserved-name rules for display names
#[derive(Debug, Clone)]
pub struct NamePolicy {
    pub max_len: usize,
    pub allow_digits: bool,
    restricted: Vec<(String, RestrictedName)>,
}

impl NamePolicy {
    /// Policy used by `/name`: up to 32 characters, digits allowed
    pub fn relaxed(owner: UserId) -> Self {
        Self::new(32, true).with_restricted(default_restricted(owner))
    }

    /// Tighter variant: up to 16 characters, letters and spaces only
    pub fn strict(owner: UserId) -> Self {
        Self::new(16, false).with_restricted(default_restricted(owner))
    }

    pub fn new(max_len: usize, allow_digits: bool) -> Self {
        Self {
            max_len,
            allow_digits,
            restricted: Vec::new(),
        }
    }

    pub fn with_restricted(mut self, names: impl IntoIterator<Item = RestrictedName>) -> Self {
        self.restricted
            .extend(names.into_iter().map(|entry| (normalize(&entry.name), entry)));
        self
    }

    /// Check a proposed name for `user`
    pub fn is_name_allowed(&self, proposed: &str, user: UserId) -> Result<(), NameRejection> {
        if proposed.chars().count() > self.max_len {
            return Err(NameRejection::TooLong { max: self.max_len });
        }

        let mut invalid: Vec<char> = proposed
            .chars()
            .filter(|c| !self.is_allowed_char(*c))
            .collect();
        if !invalid.is_empty() {
            invalid.sort_unstable();
            invalid.dedup();
            return Err(NameRejection::InvalidChars(invalid));
        }

        if proposed.trim().is_empty() {
            return Err(NameRejection::Blank);
        }

        let normalized = normalize(proposed);
        let blocked = self
            .restricted
            .iter()
            .any(|(key, entry)| *key == normalized && !entry.allowed.contains(&user));
        if blocked {
            return Err(NameRejection::Restricted);
        }

        Ok(())
    }

    fn is_allowed_char(&self, c: char) -> bool {
        c.is_ascii_alphabetic()
            || matches!(c, 'а'..='я' | 'А'..='Я' | 'ё' | 'Ё' | ' ')
            || (self.allow_digits && c.is_ascii_digit())
    }
}

/// Lower-case and fold look-alike characters onto Latin letters
pub fn normalize(text: &str) -> String {
    text.to_lowercase().chars().map(fold_confusable).collect()
}

fn fold_confusable(c: char) -> char {
    match c {
        // Cyrillic
        'а' => 'a',
        'в' => 'b',
        'с' => 'c',
        'е' | 'ё' => 'e',
        'і' => 'i',
        'к' => 'k',
        'м' => 'm',
        'н' => 'n',
        'о' => 'o',
        'р' => 'p',
        'ѕ' => 's',
        'т' => 't',
        'у' => 'y',
        'х' => 'x',
        // digits and symbols
        '4' | '@' => 'a',
        '3' => 'e',
        '1' => 'i',
        '0' => 'o',
        '$' => 's',
        '7' => 't',
        // small capitals
        'ᴀ' => 'a',
        'ʙ' => 'b',
        'ᴄ' => 'c',
        'ᴅ' => 'd',
        'ᴇ' => 'e',
        'ɢ' => 'g',
        'ʜ' => 'h',
        'ɪ' => 'i',
        'ᴊ' => 'j',
        'ᴋ' => 'k',
        'ʟ' => 'l',
        'ᴍ' => 'm',
        'ɴ' => 'n',
        'ᴏ' => 'o',
        'ᴘ' => 'p',
        'ǫ' => 'q',
        'ʀ' => 'r',
        'ᴛ' => 't',
        'ᴜ' => 'u',
        'ᴠ' => 'v',
        'ᴡ' => 'w',
        'ʏ' => 'y',
        'ᴢ' => 'z',
        other => other,
    }
}

fn default_restricted(owner: UserId) -> Vec<RestrictedName> {
    const FORBIDDEN: [&str; 10] = [
        "Система",
        "System",
        "Bot",
        "Бот",
        "Support",
        "Поддержка",
        "Модератор",
        "Moderator",
        "СИСТЕМНОЕ СООБЩЕНИЕ",
        "#SYSTEM_MESSAGE",
    ];
    const OWNER_ONLY: [&str; 5] = ["Владелец", "Admin", "Administrator", "Администратор", "Owner"];

    FORBIDDEN
        .into_iter()
        .map(RestrictedName::new)
        .chain(
            OWNER_ONLY
                .into_iter()
                .map(|name| RestrictedName::new(name).allow(owner)),
        )
        .collect()
}
