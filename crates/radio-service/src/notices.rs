//! Texts the engines send on their own initiative
//!
//! All bodies are Telegram HTML; anything user-supplied goes through
//! [`escape_html`].

use radio_core::ChannelId;

/// Badge label of bot announcements
pub const SYSTEM_BADGE: &str = "Система";

/// Badge label of owner mass mailings
pub const OWNER_BADGE: &str = "Владелец";

/// Escape the three characters Telegram HTML treats specially
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

pub fn rotated(channel: ChannelId, display_name: &str) -> String {
    format!(
        "👁 <b>Моргнув</b>, ты оказался на канале <code>{}</code>\n🎭 <b>Твоё имя</b>: <code>{}</code>",
        channel.label(),
        escape_html(display_name)
    )
}

pub fn suspended(prison: ChannelId) -> String {
    format!(
        "😵 <b>Ты потерял сознание</b>...\n\
         <i>После того, как ты очнулся, ты оказался на канале</i> <code>{}</code>...\n\
         💀 <b>Ты не можешь говорить</b>...",
        prison.label()
    )
}

pub fn released(channel: ChannelId) -> String {
    format!(
        "🌟 <b>Ты пришел в себя</b>...\n<i>И оказался на канале</i> <code>{}</code>",
        channel.label()
    )
}

pub fn version_update(version: &str, notes: &str) -> String {
    format!(
        "🌟 <b>Обновление!</b>\n\n📦 Версия: <code>{}</code>\n📝 Что нового:\n{}",
        escape_html(version),
        escape_html(notes)
    )
}

/// Quote block put above a reply for every recipient
pub fn quoted(author: &str, quoted_text: &str, text: &str) -> String {
    format!("╭─ {author}\n╰ {quoted_text}\n\n{text}")
}
