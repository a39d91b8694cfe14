//! String keys for string-keyed backends.
//!
//! [`DefaultKeyBuilder`] renders `prefix[:bot_id]:chat_id:user_id[:destiny]:part`.

use dbot_core::{StorageKey, DEFAULT_DESTINY};

use crate::error::StorageError;

/// Which half of a conversation record a key points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyPart {
    State,
    Data,
}

impl KeyPart {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyPart::State => "state",
            KeyPart::Data => "data",
        }
    }
}

#[derive(Debug, Clone)]
pub struct DefaultKeyBuilder {
    pub prefix: String,
    pub separator: String,
    pub with_bot_id: bool,
    pub with_destiny: bool,
}

impl Default for DefaultKeyBuilder {
    fn default() -> Self {
        Self {
            prefix: "fsm".to_string(),
            separator: ":".to_string(),
            with_bot_id: false,
            with_destiny: true,
        }
    }
}

impl DefaultKeyBuilder {
    /// Builds the key. Without `with_destiny`, only the default destiny can be stored, otherwise
    /// two discriminators would collide on the same key.
    pub fn build(&self, key: &StorageKey, part: KeyPart) -> Result<String, StorageError> {
        let mut parts = vec![self.prefix.clone()];
        if self.with_bot_id {
            parts.push(key.bot_id.to_string());
        }
        parts.push(key.chat_id.to_string());
        parts.push(key.user_id.to_string());
        if self.with_destiny {
            parts.push(key.destiny.clone());
        } else if key.destiny != DEFAULT_DESTINY {
            return Err(StorageError::KeyBuild(format!(
                "destiny '{}' requires a key builder with_destiny",
                key.destiny
            )));
        }
        parts.push(part.as_str().to_string());
        Ok(parts.join(&self.separator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_builder_includes_destiny() {
        let key = StorageKey::new(10, 20, 30);
        let built = DefaultKeyBuilder::default().build(&key, KeyPart::State).unwrap();
        assert_eq!(built, "fsm:20:30:default:state");
    }

    #[test]
    fn test_builder_with_bot_id_and_custom_separator() {
        let builder = DefaultKeyBuilder {
            separator: "/".to_string(),
            with_bot_id: true,
            ..Default::default()
        };
        let key = StorageKey::new(10, 20, 30).with_destiny("quiz");
        assert_eq!(
            builder.build(&key, KeyPart::Data).unwrap(),
            "fsm/10/20/30/quiz/data"
        );
    }

    #[test]
    fn test_builder_without_destiny_rejects_custom_destiny() {
        let builder = DefaultKeyBuilder {
            with_destiny: false,
            ..Default::default()
        };
        let default_key = StorageKey::new(1, 2, 3);
        assert_eq!(builder.build(&default_key, KeyPart::State).unwrap(), "fsm:2:3:state");

        let custom = StorageKey::new(1, 2, 3).with_destiny("other");
        assert!(builder.build(&custom, KeyPart::State).is_err());
    }
}
