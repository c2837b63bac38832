//! Discussion board categories.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ForumCategory {
    General,
    #[serde(rename = "PVP")]
    Pvp,
    #[serde(rename = "PVE")]
    Pve,
    #[serde(rename = "Pet Pavilion")]
    PetPavilion,
    Feedback,
}

impl ForumCategory {
    pub const ALL: [ForumCategory; 5] = [
        Self::General,
        Self::Pvp,
        Self::Pve,
        Self::PetPavilion,
        Self::Feedback,
    ];

    /// URL slug, also the stored value.
    pub fn slug(self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Pvp => "pvp",
            Self::Pve => "pve",
            Self::PetPavilion => "pet-pavilion",
            Self::Feedback => "feedback",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::General => "General",
            Self::Pvp => "PVP",
            Self::Pve => "PVE",
            Self::PetPavilion => "Pet Pavilion",
            Self::Feedback => "Feedback",
        }
    }
}

impl fmt::Display for ForumCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Accepts either the slug or the label, case-insensitively.
impl FromStr for ForumCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| c.slug().eq_ignore_ascii_case(wanted) || c.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| DomainError::validation("category", format!("'{}' is not a known category", wanted)))
    }
}
