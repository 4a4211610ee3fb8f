//! Fixed vocabularies shared by the user model and the collection validator.
//!
//! The validator's `enum` lists are rendered from `ALL`, so adding a variant
//! here changes both the stored record type and the server-side rule.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownTerm {
    pub vocabulary: &'static str,
    pub value: String,
}

impl fmt::Display for UnknownTerm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "`{}` is not a valid {}", self.value, self.vocabulary)
    }
}

impl std::error::Error for UnknownTerm {}

macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident, $label:literal { $($variant:ident => $term:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $term),+
                }
            }

            /// Wire terms in declaration order.
            pub fn terms() -> Vec<&'static str> {
                Self::ALL.iter().map(|v| v.as_str()).collect()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownTerm;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($term => Ok($name::$variant),)+
                    other => Err(UnknownTerm {
                        vocabulary: $label,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                raw.parse().map_err(serde::de::Error::custom)
            }
        }
    };
}

vocabulary! {
    /// Role a user holds; a user must hold at least one.
    Role, "role" {
        Student => "student",
        Mentor => "mentor",
        Counselor => "counselor",
        Admin => "admin",
    }
}

vocabulary! {
    /// Safeguarding indicators used for triage.
    RiskFlag, "risk flag" {
        Academic => "academic_risk",
        Behavioral => "behavioral_risk",
        Attendance => "attendance_risk",
        Emotional => "emotional_risk",
        Substance => "substance_risk",
        Family => "family_risk",
        Financial => "financial_risk",
        Health => "health_risk",
        Social => "social_risk",
        Housing => "housing_risk",
    }
}

vocabulary! {
    Language, "language" {
        English => "en",
        Spanish => "es",
        French => "fr",
        German => "de",
        Italian => "it",
        Portuguese => "pt",
        Chinese => "zh",
        Japanese => "ja",
        Korean => "ko",
        Arabic => "ar",
    }
}
