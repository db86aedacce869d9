//! Reply texts for the command surface
//!
//! Every reply is Telegram HTML. User-supplied fragments go through
//! [`escape_html`]; numbers and channel labels are safe as is.

use radio_common::AppError;
use radio_core::{ChannelId, DomainError, NameRejection, Remaining};
use radio_service::commands::{Alias, Usage};
use radio_service::dto::{format_elapsed, Onboarding, SuspendOutcome};
use radio_service::notices::escape_html;
use rand::seq::SliceRandom;
use std::time::Duration;

pub const NO_RIGHTS: &str = "🚫 Ошибка: Недостаточно прав";
pub const USER_NOT_FOUND: &str = "❌ Ошибка: Пользователь не найден";
pub const GENERIC_FAILURE: &str = "❌ Ошибка при выполнении команды";
pub const REGISTER_FIRST: &str = "❌ Ошибка: Сначала используйте /start";
pub const UNREGISTERED_SENDER: &str =
    "❌ Ошибка: Пользователь не найден\nИспользуйте /start для регистрации";
pub const NOT_IMPRISONED: &str = "❌ Ошибка: Пользователь не находится в тюрьме";
pub const NAME_RESET: &str = "✅ Кастомное имя удалено";
pub const RELEASED: &str = "✅ Пользователь освобожден";
pub const SENDING: &str = "📡 Отправляю...";
pub const NOTHING_FOUND: &str = "😔 Не найдено активных каналов...";

const PRISON_REFUSALS: &[&str] = &[
    "🚔 <b>Стены не пропускают сигнал</b>...\n<i>Отсюда так просто не уйти</i>",
    "⛓ <b>Ты дёргаешь ручку двери</b>...\n<i>Заперто</i>",
    "💀 <b>Эфир молчит</b>...\n<i>На этот канал не попасть по своей воле</i>",
];

/// Status of a freshly registered or returning listener
pub fn start(onboarding: &Onboarding) -> String {
    let greeting = if onboarding.created {
        "👋 <b>Привет!</b>\n\n"
    } else {
        ""
    };
    format!(
        "{greeting}📡 <b>Твой канал</b>: <code>{}</code>\n\
         👤 <b>Твоё имя</b>: <code>{}</code>\n\
         👥 <b>Пользователей на канале</b>: <code>{}</code>\n\n\
         📝 <b>Команды</b>:\n/help - справка",
        onboarding.user.channel.label(),
        escape_html(&onboarding.user.display_name()),
        onboarding.population,
    )
}

pub fn help(version: &str, moderator: bool) -> String {
    let mut text = format!(
        "📡 <b>Версия бота</b>: <code>{}</code>\n\n\
         📝 <b>Команды</b>:\n\
         /start - твой канал и имя\n\
         /scan - найти активные каналы\n\
         /goto <code>канал</code> - перейти на канал\n\
         /name <code>ник</code> - сменить имя\n\
         /help - эта справка",
        escape_html(version)
    );
    if moderator {
        text.push_str(
            "\n\n👑 <b>Владелец</b>:\n\
             /resetname <code>user_id</code> - сбросить имя\n\
             /emoji <code>user_id</code> <code>эмодзи</code> - установить эмодзи\n\
             /version <code>номер</code> <code>текст</code> - объявить обновление\n\
             /broadcast <code>текст</code> - рассылка всем\n\
             /zov <code>user_id</code> <code>[время]</code> <code>[причина]</code> - в тюрьму\n\
             /unzov <code>user_id</code> - освободить\n\
             /del - удалить сообщение (ответом)",
        );
    }
    text
}

pub fn scan(channels: &[(ChannelId, u64)]) -> String {
    if channels.is_empty() {
        return NOTHING_FOUND.to_string();
    }
    let entries: Vec<String> = channels
        .iter()
        .map(|(channel, population)| {
            format!(
                "👁 <b>Канал</b>: <code>{}</code>\n👥 <b>Пользователей</b>: <code>{population}</code>\n",
                channel.label()
            )
        })
        .collect();
    format!("🔍 <b>Результаты сканирования</b>:\n\n{}", entries.join("\n"))
}

pub fn alias_notice(alias: Alias) -> &'static str {
    match alias {
        Alias::Channel => {
            "❗️ <b>Ссылка на /goto</b>\nПример команды: <code>/channel канал</code>, <code>/goto канал</code>"
        }
        Alias::Tag => {
            "❗️ <b>Ссылка на команду /name</b>\nПример команды: <code>/tag ник</code>, <code>/name ник</code>"
        }
    }
}

pub fn usage(usage: Usage) -> &'static str {
    match usage {
        Usage::Goto => "❌ Ошибка: Неверный формат команды\nИспользуйте: <code>/goto канал</code>",
        Usage::Name => "❌ Ошибка: Укажите имя\nИспользуйте: <code>/name Новое Имя</code>",
        Usage::ResetName => {
            "❌ Ошибка: Неверный формат команды\nИспользуйте:\n\
             • <code>/resetname user_id</code>\n\
             • Ответом на сообщение: <code>/resetname</code>"
        }
        Usage::Emoji { reply: true } => {
            "❌ Ошибка: Укажите эмодзи\nИспользуйте: <code>/emoji 🌟</code>"
        }
        Usage::Emoji { reply: false } => {
            "❌ Ошибка: Неверный формат команды\nИспользуйте:\n\
             • <code>/emoji user_id emoji</code>\n\
             • Ответом на сообщение: <code>/emoji emoji</code>"
        }
        Usage::Version => {
            "❌ Ошибка: Неверный формат команды\nИспользуйте: <code>/version номер текст</code>"
        }
        Usage::Broadcast => {
            "❌ Ошибка: Укажите сообщение\nИспользуйте: <code>/broadcast текст</code> или <code>/broad текст</code>"
        }
        Usage::Zov => {
            "❌ Ошибка: Неверный формат команды\nИспользуйте:\n\
             • <code>/zov user_id</code>\n\
             • <code>/zov user_id 30m</code>\n\
             • <code>/zov user_id 2h причина</code>\n\
             • <code>/zov user_id причина</code>"
        }
        Usage::Unzov => {
            "❌ Ошибка: Неверный формат команды\nИспользуйте: <code>/unzov user_id</code>"
        }
        Usage::Del => "❌ Ошибка: Ответьте на сообщение, которое хотите удалить",
    }
}

pub fn goto_done(channel: ChannelId) -> String {
    format!(
        "😌 <i>Ты ненадолго закрыл глаза</i>...\n<i>И оказался на канале</i> <code>{}</code>",
        channel.label()
    )
}

/// One of the refusals shown when someone tries to walk into prison
pub fn prison_refusal() -> &'static str {
    PRISON_REFUSALS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(PRISON_REFUSALS[0])
}

pub fn name_set(name: &str) -> String {
    format!("✅ Установлено имя: <code>{}</code>", escape_html(name))
}

pub fn emoji_set(emoji: &str) -> String {
    format!("✅ Установлен эмодзи: {}", escape_html(emoji))
}

pub fn version_sent(count: usize) -> String {
    format!("✅ Обновление отправлено {count} пользователям и в канал")
}

pub fn broadcast_sent(count: usize) -> String {
    format!("✅ Сообщение отправлено <code>{count}</code> пользователям")
}

pub fn suspended(outcome: &SuspendOutcome, remaining: Remaining) -> String {
    let term = match remaining.hours_minutes() {
        Some((hours, minutes)) => format!("{hours}ч {minutes}м"),
        None => "навсегда".to_string(),
    };
    let mut text = format!(
        "✅ Пользователь помещен в тюрьму\n\n\
         👤 Пользователь: <code>{}</code>\n\
         ⏱ Время: <code>{term}</code>",
        escape_html(&outcome.user.display_name())
    );
    if let Some(reason) = &outcome.given_reason {
        text.push_str(&format!("\n📝 Причина: <code>{}</code>", escape_html(reason)));
    }
    text
}

pub fn deleted(count: usize) -> String {
    format!("✅ Удалено сообщений: <code>{count}</code>")
}

pub fn rate_limited(secs: u64) -> String {
    format!("⏳ Подождите еще <code>{secs}</code> сек.")
}

pub fn imprisoned(remaining: Remaining) -> String {
    format!("🚔 Вы в тюрьме еще <code>{remaining}</code> секунд")
}

pub fn empty_channel(channel: ChannelId) -> String {
    format!("📡 На канале <code>{}</code> никого нет...", channel.label())
}

pub fn text_delivered(channel: ChannelId, delivered: usize, elapsed: Duration) -> String {
    format!(
        "📡 Твой сигнал доставлен на канал <code>{}</code>\n\
         👥 Получателей: <code>{delivered}</code>\n\
         ⚡️ Время доставки: <code>{}</code>",
        channel.label(),
        format_elapsed(elapsed)
    )
}

pub fn media_pending(channel: ChannelId, recipients: usize) -> String {
    format!(
        "📡 Отправка сигнала на канал <code>{}</code>\n👥 Получателей: <code>{recipients}</code>",
        channel.label()
    )
}

pub fn media_delivered(
    channel: ChannelId,
    delivered: usize,
    recipients: usize,
    elapsed: Duration,
) -> String {
    format!(
        "📡 Сигнал доставлен на канал <code>{}</code>\n\
         👥 Получателей: <code>{delivered}/{recipients}</code>\n\
         ⚡️ Время доставки: <code>{}</code>",
        channel.label(),
        format_elapsed(elapsed)
    )
}

/// Failure report sent to the owner when `/start` or `/broadcast` breaks
pub fn owner_alert(command: &str, error: &AppError) -> String {
    format!(
        "⚠️ <b>Ошибка в /{command}</b>\n<code>{}</code>: {}",
        error.error_code(),
        escape_html(&error.to_string())
    )
}

/// What the caller sees when a command fails
pub fn for_error(error: &AppError) -> String {
    match error {
        AppError::InsufficientCapabilities => NO_RIGHTS.to_string(),
        AppError::Domain(domain) => for_domain_error(domain),
        AppError::NotFound(_) => USER_NOT_FOUND.to_string(),
        AppError::Validation(msg) | AppError::InvalidInput(msg) => {
            format!("❌ Ошибка: {}", escape_html(msg))
        }
        AppError::Database(_)
        | AppError::Transport(_)
        | AppError::Internal(_)
        | AppError::Config(_) => GENERIC_FAILURE.to_string(),
    }
}

fn for_domain_error(error: &DomainError) -> String {
    match error {
        DomainError::UserNotFound(_) => USER_NOT_FOUND.to_string(),
        DomainError::NotImprisoned(_) => NOT_IMPRISONED.to_string(),
        DomainError::DeliveryNotFound { .. } => {
            "❌ Ошибка: Сообщение не найдено в журнале рассылки".to_string()
        }
        DomainError::InvalidName(rejection) => name_rejection(rejection),
        DomainError::ChannelOutOfRange { min, max, .. } => format!(
            "❌ Ошибка: Недопустимый канал\nДиапазон: от <code>{min}</code> до <code>{max}</code>"
        ),
        DomainError::ReservedChannel(_) | DomainError::Imprisoned => {
            prison_refusal().to_string()
        }
        DomainError::MissingCapability(_) => NO_RIGHTS.to_string(),
        DomainError::ValidationError(msg) => format!("❌ Ошибка: {}", escape_html(msg)),
        DomainError::DatabaseError(_)
        | DomainError::TransportError(_)
        | DomainError::InternalError(_) => GENERIC_FAILURE.to_string(),
    }
}

fn name_rejection(rejection: &NameRejection) -> String {
    match rejection {
        NameRejection::TooLong { max } => {
            format!("❌ Ошибка: Максимальная длина имени - {max} символа")
        }
        NameRejection::InvalidChars(chars) => {
            let list: Vec<String> = chars
                .iter()
                .map(|c| format!("<code>{}</code>", escape_html(&c.to_string())))
                .collect();
            format!("❌ Ошибка: Запрещенные символы в имени: {}", list.join(", "))
        }
        NameRejection::Blank => "❌ Ошибка: Имя не может состоять только из пробелов".to_string(),
        NameRejection::Restricted => "❌ Ошибка: Это имя запрещено к использованию".to_string(),
    }
}
