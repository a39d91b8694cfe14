//! Adapters from Telegram (teloxide) types to dbot_core types.
//! Depends only on teloxide and dbot_core type definitions.

use dbot_core::{
    Chat, Message, MessageDirection, ToCoreMessage, ToCoreUpdate, ToCoreUser, Update, UpdateKind,
    User,
};
use tracing::debug;

/// Wraps a teloxide User for conversion to core [`User`].
pub struct TelegramUserWrapper<'a>(pub &'a teloxide::types::User);

impl<'a> ToCoreUser for TelegramUserWrapper<'a> {
    fn to_core(&self) -> User {
        User {
            id: self.0.id.0 as i64,
            username: self.0.username.clone(),
            first_name: Some(self.0.first_name.clone()),
            last_name: self.0.last_name.clone(),
            is_bot: self.0.is_bot,
        }
    }
}

fn to_core_chat(chat: &teloxide::types::Chat) -> Chat {
    let chat_type = if chat.is_private() {
        "private"
    } else if chat.is_supergroup() {
        "supergroup"
    } else if chat.is_group() {
        "group"
    } else if chat.is_channel() {
        "channel"
    } else {
        "unknown"
    };
    Chat {
        id: chat.id.0,
        chat_type: chat_type.to_string(),
    }
}

/// Kind of content a message carries: `text` for plain text, otherwise the media kind.
fn message_type(msg: &teloxide::types::Message) -> &'static str {
    if msg.text().is_some() {
        "text"
    } else if msg.photo().is_some() {
        "photo"
    } else if msg.document().is_some() {
        "document"
    } else if msg.video().is_some() {
        "video"
    } else if msg.animation().is_some() {
        "animation"
    } else if msg.audio().is_some() {
        "audio"
    } else if msg.voice().is_some() {
        "voice"
    } else if msg.sticker().is_some() {
        "sticker"
    } else {
        "other"
    }
}

/// Wraps a teloxide Message for conversion to core [`Message`].
pub struct TelegramMessageWrapper<'a>(pub &'a teloxide::types::Message);

impl<'a> ToCoreMessage for TelegramMessageWrapper<'a> {
    fn to_core(&self) -> Message {
        let text = self.0.text();
        Message {
            id: self.0.id.0.to_string(),
            user: self
                .0
                .from
                .as_ref()
                .map(|u| TelegramUserWrapper(u).to_core())
                .unwrap_or_else(|| User {
                    id: 0,
                    username: None,
                    first_name: None,
                    last_name: None,
                    is_bot: false,
                }),
            chat: to_core_chat(&self.0.chat),
            content: text.or_else(|| self.0.caption()).unwrap_or("").to_string(),
            message_type: message_type(self.0).to_string(),
            direction: MessageDirection::Incoming,
            created_at: self.0.date,
            reply_to_message_id: self.0.reply_to_message().map(|m| m.id.0.to_string()),
        }
    }
}

/// Event name of a raw update payload: the first key other than `update_id`.
fn event_name(raw: &serde_json::Value) -> String {
    raw.as_object()
        .and_then(|obj| obj.keys().find(|k| k.as_str() != "update_id").cloned())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Wraps a teloxide Update for conversion to core [`Update`]. Kinds the router does not bind to
/// become [`UpdateKind::Other`] named after the platform event.
pub struct TelegramUpdateWrapper<'a>(pub &'a teloxide::types::Update);

impl<'a> ToCoreUpdate for TelegramUpdateWrapper<'a> {
    fn to_core(&self) -> Update {
        use teloxide::types::UpdateKind as Tg;

        let raw = serde_json::to_value(self.0).unwrap_or(serde_json::Value::Null);
        let kind = match &self.0.kind {
            Tg::Message(m) => UpdateKind::Message(TelegramMessageWrapper(m).to_core()),
            Tg::EditedMessage(m) => UpdateKind::EditedMessage(TelegramMessageWrapper(m).to_core()),
            Tg::CallbackQuery(q) => UpdateKind::CallbackQuery {
                user: TelegramUserWrapper(&q.from).to_core(),
                chat: q.message.as_ref().map(|m| to_core_chat(m.chat())),
                data: q.data.clone(),
            },
            _ => UpdateKind::Other(event_name(&raw)),
        };
        Update::new(self.0.id.0 as i64, kind).with_raw(raw)
    }
}

/// Parses a webhook request body. Fails only when the body is not JSON; payloads teloxide cannot
/// type still produce an update ([`UpdateKind::Other`]) so they flow through the pipeline and get
/// dropped there.
///
/// The typed update is read from the body bytes, not from the [`serde_json::Value`]: teloxide's
/// update deserializer does not accept an already-parsed value for real Telegram payloads.
pub fn parse_update(body: &[u8]) -> serde_json::Result<Update> {
    let raw: serde_json::Value = serde_json::from_slice(body)?;
    let update = match serde_json::from_slice::<teloxide::types::Update>(body) {
        Ok(update) => {
            let mut core = TelegramUpdateWrapper(&update).to_core();
            if let UpdateKind::Other(name) = &mut core.kind {
                *name = event_name(&raw);
            }
            core.with_raw(raw)
        }
        Err(e) => {
            debug!(error = %e, "Unrecognized update payload");
            let id = raw.get("update_id").and_then(|v| v.as_i64()).unwrap_or(0);
            let name = event_name(&raw);
            Update::new(id, UpdateKind::Other(name)).with_raw(raw)
        }
    };
    Ok(update)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    /// **Test: TelegramUserWrapper converts teloxide User to core User with correct id, username, first_name, last_name.**
    #[test]
    fn test_telegram_user_wrapper_to_core() {
        let user = teloxide::types::User {
            id: teloxide::types::UserId(123),
            is_bot: false,
            first_name: "Test".to_string(),
            last_name: Some("User".to_string()),
            username: Some("testuser".to_string()),
            language_code: Some("en".to_string()),
            is_premium: false,
            added_to_attachment_menu: false,
        };

        let wrapper = TelegramUserWrapper(&user);
        let core_user = wrapper.to_core();

        assert_eq!(core_user.id, 123);
        assert_eq!(core_user.username, Some("testuser".to_string()));
        assert_eq!(core_user.first_name, Some("Test".to_string()));
        assert_eq!(core_user.last_name, Some("User".to_string()));
        assert!(!core_user.is_bot);
    }

    fn parse(payload: serde_json::Value) -> Update {
        parse_update(payload.to_string().as_bytes()).unwrap()
    }

    fn message_payload(text: &str) -> serde_json::Value {
        json!({
            "update_id": 1001,
            "message": {
                "message_id": 5,
                "date": 1706529600,
                "chat": {"id": 456, "type": "private", "first_name": "Ada"},
                "from": {"id": 123, "is_bot": false, "first_name": "Ada", "username": "ada"},
                "text": text
            }
        })
    }

    /// **Test: A message payload becomes a core message update.**
    #[test]
    fn test_parse_message_update() {
        let update = parse(message_payload("/id"));

        assert_eq!(update.id, 1001);
        assert_eq!(update.event_type(), "message");
        assert_eq!(update.text(), Some("/id"));
        assert_eq!(update.user().map(|u| u.id), Some(123));
        let chat = update.chat().unwrap();
        assert_eq!(chat.id, 456);
        assert_eq!(chat.chat_type, "private");
        assert_eq!(update.message().map(|m| m.id.as_str()), Some("5"));
        assert_eq!(update.raw["update_id"], 1001);
    }

    /// **Test: A payload teloxide cannot parse becomes Other, keeping id and event name.**
    #[test]
    fn test_parse_unknown_update() {
        let update = parse(json!({"update_id": 77, "brand_new_event": {"x": 1}}));

        assert_eq!(update.id, 77);
        assert!(matches!(update.kind, UpdateKind::Other(ref name) if name == "brand_new_event"));
        assert!(update.user().is_none());
    }

    /// **Test: A callback query carries its sender and data.**
    #[test]
    fn test_parse_callback_query() {
        let update = parse(json!({
            "update_id": 9,
            "callback_query": {
                "id": "cb-1",
                "from": {"id": 123, "is_bot": false, "first_name": "Ada"},
                "chat_instance": "ci-1",
                "data": "yes"
            }
        }));

        assert_eq!(update.event_type(), "callback_query");
        assert_eq!(update.text(), Some("yes"));
        assert_eq!(update.user().map(|u| u.id), Some(123));
        assert!(update.chat().is_none());
    }

    /// **Test: Garbage without an update id still yields an Other update.**
    #[test]
    fn test_parse_non_object_payload() {
        let update = parse(json!([1, 2, 3]));

        assert_eq!(update.id, 0);
        assert_eq!(update.event_type(), "unknown");
    }

    /// **Test: A `/start` message as Telegram sends it (entities, language code) keeps text and sender.**
    ///
    /// **Setup:** Payload with `bot_command` entity, `language_code`, `is_premium` and a full private chat.
    /// **Action:** parse_update on the bytes.
    /// **Expected:** Message update with text `/start`, user 123, chat 123.
    #[test]
    fn test_parse_full_command_payload() {
        let update = parse(json!({
            "update_id": 815,
            "message": {
                "message_id": 31,
                "from": {
                    "id": 123, "is_bot": false, "first_name": "Ada", "last_name": "Lovelace",
                    "username": "ada", "language_code": "en", "is_premium": true
                },
                "chat": {
                    "id": 123, "first_name": "Ada", "last_name": "Lovelace",
                    "username": "ada", "type": "private"
                },
                "date": 1706529600,
                "text": "/start",
                "entities": [{"offset": 0, "length": 6, "type": "bot_command"}]
            }
        }));

        assert_eq!(update.event_type(), "message");
        assert_eq!(update.text(), Some("/start"));
        assert_eq!(update.user().map(|u| u.full_name()), Some("Ada Lovelace".to_string()));
        assert_eq!(update.chat().map(|c| c.id), Some(123));
    }

    /// **Test: A mentioned command in a supergroup keeps the mention and the group chat.**
    #[test]
    fn test_parse_supergroup_command_payload() {
        let update = parse(json!({
            "update_id": 816,
            "message": {
                "message_id": 32,
                "message_thread_id": 4,
                "from": {"id": 123, "is_bot": false, "first_name": "Ada", "language_code": "en"},
                "chat": {"id": -1001234567890i64, "title": "Devs", "type": "supergroup", "is_forum": true},
                "date": 1706529600,
                "text": "/id@testbot",
                "entities": [{"offset": 0, "length": 11, "type": "bot_command"}]
            }
        }));

        assert_eq!(update.text(), Some("/id@testbot"));
        let chat = update.chat().unwrap();
        assert_eq!(chat.id, -1001234567890);
        assert_eq!(chat.chat_type, "supergroup");
    }

    /// **Test: A captioned photo is a photo message: the caption is content, not text.**
    ///
    /// **Setup:** Photo payload with caption `ping`.
    /// **Action:** parse_update.
    /// **Expected:** message_type `photo`; content `ping`; `text()` is None; sender present.
    #[test]
    fn test_parse_photo_with_caption() {
        let update = parse(json!({
            "update_id": 817,
            "message": {
                "message_id": 33,
                "from": {"id": 123, "is_bot": false, "first_name": "Ada", "language_code": "en"},
                "chat": {"id": 123, "first_name": "Ada", "type": "private"},
                "date": 1706529600,
                "photo": [
                    {"file_id": "AgACAgIAAxkBAAIB", "file_unique_id": "AQADa", "file_size": 1234, "width": 90, "height": 67},
                    {"file_id": "AgACAgIAAxkBAAIC", "file_unique_id": "AQADb", "file_size": 45678, "width": 800, "height": 600}
                ],
                "caption": "ping"
            }
        }));

        let message = update.message().unwrap();
        assert_eq!(message.message_type, "photo");
        assert_eq!(message.content, "ping");
        assert!(update.text().is_none());
        assert_eq!(update.user().map(|u| u.id), Some(123));
    }

    /// **Test: A sticker message is recognized as a message from its sender.**
    #[test]
    fn test_parse_sticker_payload() {
        let update = parse(json!({
            "update_id": 818,
            "message": {
                "message_id": 34,
                "from": {"id": 123, "is_bot": false, "first_name": "Ada", "language_code": "en"},
                "chat": {"id": 123, "first_name": "Ada", "type": "private"},
                "date": 1706529600,
                "sticker": {
                    "file_id": "CAACAgIAAxkBAAIC", "file_unique_id": "AgADc",
                    "type": "regular", "width": 512, "height": 512,
                    "is_animated": false, "is_video": false, "emoji": "👍",
                    "set_name": "HotCherry", "file_size": 27000
                }
            }
        }));

        assert_eq!(update.event_type(), "message");
        assert_eq!(update.message().map(|m| m.message_type.as_str()), Some("sticker"));
        assert_eq!(update.user().map(|u| u.id), Some(123));
    }

    /// **Test: A body that is not JSON is an error.**
    #[test]
    fn test_parse_rejects_non_json() {
        assert!(parse_update(b"{not json").is_err());
    }
}
