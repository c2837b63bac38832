//! Value objects - immutable, validated-by-construction domain values.

mod account;
mod attributes;
mod category;
mod names;
mod price;
mod talents;

pub use account::{AccountId, Identity};
pub use attributes::{Attribute, AttributeSet};
pub use category::ForumCategory;
pub use names::{
    CreatureLabel, DisplayName, Nickname, PostBody, Tags, TalentName, ThreadTitle,
    FALLBACK_DISPLAY_NAME, MAX_BODY_LENGTH, MAX_LABEL_LENGTH, MAX_TAGS, MAX_TAG_LENGTH,
    MAX_TITLE_LENGTH,
};
pub use price::{ListingPrice, DEFAULT_AMOUNT, DEFAULT_CURRENCY};
pub use talents::{Talents, MAX_TALENTS};
