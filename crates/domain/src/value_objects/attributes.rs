//! Trainable creature attributes.
//!
//! An [`AttributeSet`] holds the five attributes a creature trains. Values are
//! plain integers so that the calculator can be fed out-of-range numbers while
//! a player experiments; persistence goes through [`AttributeSet::validate`].

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

/// One of the five trainable attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Attribute {
    Strength,
    Intellect,
    Agility,
    Will,
    Power,
}

impl Attribute {
    /// All attributes in canonical order (A1..A5).
    pub const ALL: [Attribute; 5] = [
        Self::Strength,
        Self::Intellect,
        Self::Agility,
        Self::Will,
        Self::Power,
    ];

    /// Highest value this attribute can be trained to.
    pub const fn cap(self) -> i32 {
        match self {
            Self::Strength => 255,
            Self::Intellect => 250,
            Self::Agility => 260,
            Self::Will => 260,
            Self::Power => 250,
        }
    }

    /// Lowercase key used on the wire.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "strength",
            Self::Intellect => "intellect",
            Self::Agility => "agility",
            Self::Will => "will",
            Self::Power => "power",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::Strength => "Strength",
            Self::Intellect => "Intellect",
            Self::Agility => "Agility",
            Self::Will => "Will",
            Self::Power => "Power",
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

impl FromStr for Attribute {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strength" | "str" => Ok(Self::Strength),
            "intellect" | "int" => Ok(Self::Intellect),
            "agility" | "agi" => Ok(Self::Agility),
            "will" => Ok(Self::Will),
            "power" | "pow" => Ok(Self::Power),
            other => Err(DomainError::parse(format!("Unknown attribute: {}", other))),
        }
    }
}

/// The five attribute values of a creature.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttributeSet {
    pub strength: i32,
    pub intellect: i32,
    pub agility: i32,
    pub will: i32,
    pub power: i32,
}

impl AttributeSet {
    pub const fn new(strength: i32, intellect: i32, agility: i32, will: i32, power: i32) -> Self {
        Self {
            strength,
            intellect,
            agility,
            will,
            power,
        }
    }

    /// Every attribute at its cap.
    pub const fn at_cap() -> Self {
        Self::new(
            Attribute::Strength.cap(),
            Attribute::Intellect.cap(),
            Attribute::Agility.cap(),
            Attribute::Will.cap(),
            Attribute::Power.cap(),
        )
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Intellect => self.intellect,
            Attribute::Agility => self.agility,
            Attribute::Will => self.will,
            Attribute::Power => self.power,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Intellect => self.intellect = value,
            Attribute::Agility => self.agility = value,
            Attribute::Will => self.will = value,
            Attribute::Power => self.power = value,
        }
    }

    /// Returns a copy with one attribute replaced.
    pub fn with(mut self, attribute: Attribute, value: i32) -> Self {
        self.set(attribute, value);
        self
    }

    /// Sum of all five attributes.
    pub fn total(&self) -> i64 {
        Attribute::ALL
            .iter()
            .map(|a| i64::from(self.get(*a)))
            .sum()
    }

    /// First attribute outside `0..=cap`, if any.
    pub fn first_out_of_range(&self) -> Option<Attribute> {
        Attribute::ALL
            .into_iter()
            .find(|a| !(0..=a.cap()).contains(&self.get(*a)))
    }

    pub fn is_within_caps(&self) -> bool {
        self.first_out_of_range().is_none()
    }

    /// Checks the persistence invariant `0 <= value <= cap` for every attribute.
    ///
    /// `field` names the set being checked (e.g. `"attributes"`).
    pub fn validate(&self, field: &'static str) -> Result<(), DomainError> {
        match self.first_out_of_range() {
            None => Ok(()),
            Some(attribute) => Err(DomainError::validation(
                field,
                format!(
                    "{} must be between 0 and {}, got {}",
                    attribute.as_str(),
                    attribute.cap(),
                    self.get(attribute)
                ),
            )),
        }
    }

    /// Copy with every attribute forced into `0..=cap`.
    pub fn clamped(&self) -> Self {
        let mut out = *self;
        for attribute in Attribute::ALL {
            out.set(attribute, self.get(attribute).clamp(0, attribute.cap()));
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn caps_match_the_trainable_maximums() {
        let caps = AttributeSet::at_cap();
        assert_eq!(caps, AttributeSet::new(255, 250, 260, 260, 250));
        assert!(caps.is_within_caps());
    }

    #[test]
    fn validate_reports_first_offending_attribute() {
        let attrs = AttributeSet::at_cap().with(Attribute::Agility, 261);
        let err = attrs.validate("attributes").unwrap_err();
        assert_eq!(err.field(), Some("attributes"));
        assert!(err.to_string().contains("agility"));
        assert!(err.to_string().contains("261"));
    }

    #[test]
    fn negative_values_are_out_of_range() {
        let attrs = AttributeSet::default().with(Attribute::Power, -1);
        assert_eq!(attrs.first_out_of_range(), Some(Attribute::Power));
    }

    #[test]
    fn clamped_pulls_values_into_range() {
        let attrs = AttributeSet::new(300, -5, 100, 999, 250).clamped();
        assert_eq!(attrs, AttributeSet::new(255, 0, 100, 260, 250));
    }

    #[test]
    fn total_sums_all_attributes() {
        assert_eq!(AttributeSet::at_cap().total(), 1275);
    }

    #[test]
    fn attribute_parses_short_and_long_names() {
        assert_eq!("STR".parse::<Attribute>().unwrap(), Attribute::Strength);
        assert_eq!(" will ".parse::<Attribute>().unwrap(), Attribute::Will);
        assert!("charisma".parse::<Attribute>().is_err());
    }

    #[test]
    fn serializes_with_lowercase_keys() {
        let json = serde_json::to_value(AttributeSet::new(1, 2, 3, 4, 5)).unwrap();
        assert_eq!(json["strength"], 1);
        assert_eq!(json["power"], 5);
    }
}
