//! Validated text newtypes
//!
//! These newtypes ensure that user-supplied text is valid by construction:
//! - Trimmed of leading/trailing whitespace
//! - Non-empty
//! - Within a per-type character limit

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::DomainError;

/// Maximum length for a thread title
pub const MAX_TITLE_LENGTH: usize = 100;

/// Maximum length for a thread or reply body
pub const MAX_BODY_LENGTH: usize = 5000;

/// Maximum length for nicknames, personas and creature labels
pub const MAX_LABEL_LENGTH: usize = 60;

/// Maximum length for a single tag
pub const MAX_TAG_LENGTH: usize = 30;

/// Number of tags kept on a thread; extras are dropped
pub const MAX_TAGS: usize = 5;

/// Name shown when an identity carries no usable display name.
pub const FALLBACK_DISPLAY_NAME: &str = "Unknown Wizard";

fn bounded(field: &'static str, raw: &str, max: usize) -> Result<String, DomainError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(DomainError::validation(field, "cannot be empty"));
    }
    let length = trimmed.chars().count();
    if length > max {
        return Err(DomainError::validation(
            field,
            format!("cannot exceed {} characters (got {})", max, length),
        ));
    }
    Ok(trimmed.to_string())
}

macro_rules! bounded_text {
    ($(#[$meta:meta])* $name:ident, $field:literal, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn new(value: impl AsRef<str>) -> Result<Self, DomainError> {
                bounded($field, value.as_ref(), $max).map(Self)
            }

            /// Returns the value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl TryFrom<String> for $name {
            type Error = DomainError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::new(s)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                value.0
            }
        }
    };
}

bounded_text!(
    /// A creature's optional nickname (non-empty, <=60 chars, trimmed)
    Nickname,
    "nickname",
    MAX_LABEL_LENGTH
);

bounded_text!(
    /// A descriptive creature label such as species, school or age
    CreatureLabel,
    "label",
    MAX_LABEL_LENGTH
);

bounded_text!(
    /// A thread title (non-empty, <=100 chars, trimmed)
    ThreadTitle,
    "title",
    MAX_TITLE_LENGTH
);

bounded_text!(
    /// Body text of a thread or a reply (non-empty after trim, <=5000 chars)
    PostBody,
    "body",
    MAX_BODY_LENGTH
);

bounded_text!(
    /// A display name shown next to posts; also used for persona overrides
    DisplayName,
    "display_name",
    MAX_LABEL_LENGTH
);

impl DisplayName {
    /// The name used when an account has none of its own.
    pub fn fallback() -> Self {
        Self(FALLBACK_DISPLAY_NAME.to_string())
    }
}

bounded_text!(
    /// A single talent name
    TalentName,
    "talents",
    MAX_LABEL_LENGTH
);

/// Thread tags: at most five, each trimmed and non-empty.
///
/// Blank entries are dropped and anything past the fifth tag is ignored, the
/// same way the board has always truncated tag lists. An over-long tag is an
/// error rather than silently cut.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Tags(Vec<String>);

impl Tags {
    pub fn new<I, S>(raw: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut tags: Vec<String> = Vec::new();
        for tag in raw {
            let tag = tag.as_ref().trim();
            if tag.is_empty() {
                continue;
            }
            if tag.chars().count() > MAX_TAG_LENGTH {
                return Err(DomainError::validation(
                    "tags",
                    format!("tag cannot exceed {} characters", MAX_TAG_LENGTH),
                ));
            }
            if !tags.iter().any(|t| t.eq_ignore_ascii_case(tag)) {
                tags.push(tag.to_string());
            }
            if tags.len() == MAX_TAGS {
                break;
            }
        }
        Ok(Self(tags))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl TryFrom<Vec<String>> for Tags {
    type Error = DomainError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tags> for Vec<String> {
    fn from(tags: Tags) -> Self {
        tags.0
    }
}
