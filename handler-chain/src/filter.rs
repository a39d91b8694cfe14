//! Filters: predicates that select an update by shape (command, exact text, event type, closure).
//!
//! Filters compose with [`Filter::and`], [`Filter::or`] and [`Filter::not`].

use std::fmt;
use std::sync::Arc;

use dbot_core::UpdateContext;

/// A parsed bot command, e.g. `/start@my_bot payload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandObject {
    pub prefix: char,
    pub command: String,
    pub mention: Option<String>,
    pub args: Option<String>,
}

impl CommandObject {
    /// Parses `text` as a command. Returns `None` when it does not start with `/` or the command
    /// name is empty.
    pub fn parse(text: &str) -> Option<Self> {
        let rest = text.strip_prefix('/')?;
        let (head, args) = match rest.split_once(char::is_whitespace) {
            Some((head, args)) => {
                let args = args.trim();
                (head, (!args.is_empty()).then(|| args.to_string()))
            }
            None => (rest, None),
        };
        let (command, mention) = match head.split_once('@') {
            Some((command, mention)) => (command, Some(mention.to_string())),
            None => (head, None),
        };
        if command.is_empty() {
            return None;
        }
        Some(Self {
            prefix: '/',
            command: command.to_string(),
            mention,
            args,
        })
    }

    /// True unless the command is addressed to a different bot.
    pub fn is_for(&self, bot_username: Option<&str>) -> bool {
        match (&self.mention, bot_username) {
            (Some(mention), Some(username)) => mention.eq_ignore_ascii_case(username),
            _ => true,
        }
    }
}

type FilterFn = Arc<dyn Fn(&UpdateContext) -> bool + Send + Sync>;

#[derive(Clone)]
pub enum Filter {
    /// Matches every update.
    Any,
    /// One of the given command names (without the `/` prefix).
    Command(Vec<String>),
    /// `/start`, with or without a deep-link payload.
    CommandStart,
    /// Exact message text (or callback data). Media captions never match.
    TextEquals(String),
    /// Platform event name, e.g. `message` or `callback_query`.
    EventType(String),
    Fn(FilterFn),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
    Not(Box<Filter>),
}

impl Filter {
    pub fn command(name: &str) -> Self {
        Self::commands([name])
    }

    pub fn commands<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Filter::Command(
            names
                .into_iter()
                .map(|n| n.as_ref().trim_start_matches('/').to_string())
                .collect(),
        )
    }

    pub fn command_start() -> Self {
        Filter::CommandStart
    }

    pub fn text(text: impl Into<String>) -> Self {
        Filter::TextEquals(text.into())
    }

    pub fn func<F>(f: F) -> Self
    where
        F: Fn(&UpdateContext) -> bool + Send + Sync + 'static,
    {
        Filter::Fn(Arc::new(f))
    }

    pub fn and(self, other: Filter) -> Self {
        Filter::And(Box::new(self), Box::new(other))
    }

    pub fn or(self, other: Filter) -> Self {
        Filter::Or(Box::new(self), Box::new(other))
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Filter::Not(Box::new(self))
    }

    pub fn matches(&self, ctx: &UpdateContext) -> bool {
        match self {
            Filter::Any => true,
            Filter::Command(names) => command_of(ctx)
                .is_some_and(|c| names.iter().any(|n| *n == c.command)),
            Filter::CommandStart => command_of(ctx).is_some_and(|c| c.command == "start"),
            Filter::TextEquals(expected) => ctx.update.text() == Some(expected.as_str()),
            Filter::EventType(name) => ctx.update.event_type() == name,
            Filter::Fn(f) => f(ctx),
            Filter::And(a, b) => a.matches(ctx) && b.matches(ctx),
            Filter::Or(a, b) => a.matches(ctx) || b.matches(ctx),
            Filter::Not(inner) => !inner.matches(ctx),
        }
    }
}

/// Command addressed to this bot in the update's message text.
fn command_of(ctx: &UpdateContext) -> Option<CommandObject> {
    let text = ctx.update.message()?.content.as_str();
    CommandObject::parse(text).filter(|c| c.is_for(ctx.bot_username.as_deref()))
}

impl fmt::Debug for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Any => write!(f, "Any"),
            Filter::Command(names) => write!(f, "Command({:?})", names),
            Filter::CommandStart => write!(f, "CommandStart"),
            Filter::TextEquals(t) => write!(f, "TextEquals({:?})", t),
            Filter::EventType(e) => write!(f, "EventType({:?})", e),
            Filter::Fn(_) => write!(f, "Fn(..)"),
            Filter::And(a, b) => write!(f, "And({:?}, {:?})", a, b),
            Filter::Or(a, b) => write!(f, "Or({:?}, {:?})", a, b),
            Filter::Not(inner) => write!(f, "Not({:?})", inner),
        }
    }
}
