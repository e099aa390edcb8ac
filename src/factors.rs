//! Demographic factors and their group values.
//!
//! Each categorical attribute parses leniently from the labels found in the
//! composite dataset; anything unrecognized maps to `NotAvailable` and never
//! enters an error bucket.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Annotated sex of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Sex {
    Male,
    Female,
    NotAvailable,
}

impl Sex {
    pub fn from_label(label: &str) -> Self {
        match label.to_ascii_lowercase().as_str() {
            "male" => Sex::Male,
            "female" => Sex::Female,
            _ => Sex::NotAvailable,
        }
    }

    /// Groups that participate in statistical comparison.
    pub fn groups() -> &'static [Sex] {
        &[Sex::Male, Sex::Female]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Sex::Male => "Male",
            Sex::Female => "Female",
            Sex::NotAvailable => "N/A",
        }
    }
}

/// Annotated age bracket of a person.
///
/// The source datasets use several label vocabularies for the same brackets,
/// so parsing accepts all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Age {
    Senior,
    Adult,
    YoungAdult,
    Child,
    NotAvailable,
}

impl Age {
    pub fn from_label(label: &str) -> Self {
        match label {
            "senior" | "Senior" => Age::Senior,
            "middle_aged" | "Middleage" | "Adult" => Age::Adult,
            "young" | "YoungAdult" => Age::YoungAdult,
            "Child" => Age::Child,
            _ => Age::NotAvailable,
        }
    }

    pub fn groups() -> &'static [Age] {
        &[Age::Senior, Age::Adult, Age::YoungAdult, Age::Child]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Age::Senior => "Seniors",
            Age::Adult => "Adults",
            Age::YoungAdult => "Young adults",
            Age::Child => "Children",
            Age::NotAvailable => "N/A",
        }
    }
}

/// Fitzpatrick skin type of a person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Skintone {
    Type1,
    Type2,
    Type3,
    Type4,
    Type5,
    Type6,
    NotAvailable,
}

impl Skintone {
    pub fn from_label(label: &str) -> Self {
        match label {
            "1" => Skintone::Type1,
            "2" => Skintone::Type2,
            "3" => Skintone::Type3,
            "4" => Skintone::Type4,
            "5" => Skintone::Type5,
            "6" => Skintone::Type6,
            _ => Skintone::NotAvailable,
        }
    }

    pub fn groups() -> &'static [Skintone] {
        &[
            Skintone::Type1,
            Skintone::Type2,
            Skintone::Type3,
            Skintone::Type4,
            Skintone::Type5,
            Skintone::Type6,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Skintone::Type1 => "Type 1",
            Skintone::Type2 => "Type 2",
            Skintone::Type3 => "Type 3",
            Skintone::Type4 => "Type 4",
            Skintone::Type5 => "Type 5",
            Skintone::Type6 => "Type 6",
            Skintone::NotAvailable => "N/A",
        }
    }
}

/// A demographic factor that errors can be bucketed by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Factor {
    Age,
    Sex,
    Skintone,
    Occlusion,
    Lighting,
    Expression,
}

impl Factor {
    /// All factors, in bucketing order.
    pub fn all() -> &'static [Factor] {
        &[
            Factor::Age,
            Factor::Sex,
            Factor::Skintone,
            Factor::Occlusion,
            Factor::Lighting,
            Factor::Expression,
        ]
    }

    /// The comparison groups this factor splits into.
    pub fn groups(&self) -> Vec<GroupKey> {
        match self {
            Factor::Age => Age::groups().iter().copied().map(GroupKey::Age).collect(),
            Factor::Sex => Sex::groups().iter().copied().map(GroupKey::Sex).collect(),
            Factor::Skintone => Skintone::groups()
                .iter()
                .copied()
                .map(GroupKey::Skintone)
                .collect(),
            Factor::Occlusion | Factor::Lighting | Factor::Expression => {
                vec![GroupKey::Flag(true), GroupKey::Flag(false)]
            }
        }
    }

    /// Binary factors compare exactly two groups and support t-tests.
    pub fn is_binary(&self) -> bool {
        matches!(
            self,
            Factor::Occlusion | Factor::Lighting | Factor::Expression
        )
    }

    pub fn name(&self) -> &'static str {
        match self {
            Factor::Age => "age",
            Factor::Sex => "sex",
            Factor::Skintone => "skintone",
            Factor::Occlusion => "occlusion",
            Factor::Lighting => "lighting",
            Factor::Expression => "expression",
        }
    }
}

impl fmt::Display for Factor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Factor {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "age" => Ok(Factor::Age),
            "sex" => Ok(Factor::Sex),
            "skintone" => Ok(Factor::Skintone),
            "occlusion" => Ok(Factor::Occlusion),
            "lighting" => Ok(Factor::Lighting),
            "expression" | "expressions" => Ok(Factor::Expression),
            other => Err(Error::UnknownFactor(other.to_string())),
        }
    }
}

/// A concrete group within a factor: one age bracket, one sex, one skin type,
/// or one side of a binary flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GroupKey {
    Age(Age),
    Sex(Sex),
    Skintone(Skintone),
    Flag(bool),
}

impl GroupKey {
    pub fn label(&self) -> &'static str {
        match self {
            GroupKey::Age(age) => age.label(),
            GroupKey::Sex(sex) => sex.label(),
            GroupKey::Skintone(tone) => tone.label(),
            GroupKey::Flag(true) => "Present",
            GroupKey::Flag(false) => "Absent",
        }
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sex_labels_parse_case_insensitively() {
        assert_eq!(Sex::from_label("Male"), Sex::Male);
        assert_eq!(Sex::from_label("FEMALE"), Sex::Female);
        assert_eq!(Sex::from_label("other"), Sex::NotAvailable);
    }

    #[test]
    fn age_accepts_all_vocabularies() {
        assert_eq!(Age::from_label("middle_aged"), Age::Adult);
        assert_eq!(Age::from_label("Middleage"), Age::Adult);
        assert_eq!(Age::from_label("young"), Age::YoungAdult);
        assert_eq!(Age::from_label("Senior"), Age::Senior);
        assert_eq!(Age::from_label("child"), Age::NotAvailable);
    }

    #[test]
    fn skintone_numeric_labels() {
        assert_eq!(Skintone::from_label("3"), Skintone::Type3);
        assert_eq!(Skintone::from_label("7"), Skintone::NotAvailable);
        assert_eq!(Skintone::from_label(""), Skintone::NotAvailable);
    }

    #[test]
    fn factor_group_counts() {
        assert_eq!(Factor::Age.groups().len(), 4);
        assert_eq!(Factor::Sex.groups().len(), 2);
        assert_eq!(Factor::Skintone.groups().len(), 6);
        assert_eq!(Factor::Occlusion.groups().len(), 2);
    }

    #[test]
    fn factor_round_trips_through_str() {
        for factor in Factor::all() {
            assert_eq!(&factor.name().parse::<Factor>().unwrap(), factor);
        }
        assert!("height".parse::<Factor>().is_err());
    }

    #[test]
    fn binary_factors() {
        assert!(Factor::Lighting.is_binary());
        assert!(!Factor::Age.is_binary());
    }
}
