//! Talent list carried by a creature.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

use super::names::TalentName;

/// Most talents a creature can manifest at once.
pub const MAX_TALENTS: usize = 10;

/// Ordered, duplicate-free list of unlocked talent names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<String>", into = "Vec<String>")]
pub struct Talents(Vec<TalentName>);

impl Talents {
    /// Validates each name and removes repeats, keeping the first occurrence.
    pub fn new<I, S>(raw: I) -> Result<Self, DomainError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut talents: Vec<TalentName> = Vec::new();
        for name in raw {
            let name = TalentName::new(name)?;
            if talents
                .iter()
                .any(|t| t.as_str().eq_ignore_ascii_case(name.as_str()))
            {
                continue;
            }
            talents.push(name);
        }
        if talents.len() > MAX_TALENTS {
            return Err(DomainError::validation(
                "talents",
                format!("a creature has at most {} talents", MAX_TALENTS),
            ));
        }
        Ok(Self(talents))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TalentName> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.0.iter().map(|t| t.as_str().to_string()).collect()
    }
}

impl TryFrom<Vec<String>> for Talents {
    type Error = DomainError;

    fn try_from(value: Vec<String>) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Talents> for Vec<String> {
    fn from(talents: Talents) -> Self {
        talents.0.into_iter().map(String::from).collect()
    }
}
