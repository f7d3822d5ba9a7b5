//! Closed value sets offered by the enrollment form.
//!
//! Every choice serializes as its display string (`"10"`, `"State Board"`,
//! `"Half-Yearly"`) so a persisted record reads the same as the form that
//! produced it.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

/// Common surface of the enumerated form fields.
pub trait Choice: Sized + Copy + 'static {
    /// Every accepted value, in display order.
    const ALL: &'static [Self];

    /// Canonical display string.
    fn as_str(&self) -> &'static str;

    /// Parses a display string (or one of its aliases). Surrounding
    /// whitespace is ignored.
    fn parse(s: &str) -> Option<Self>;

    /// Comma separated list of accepted values, used in error messages.
    fn allowed() -> String {
        Self::ALL
            .iter()
            .map(|c| c.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

macro_rules! choice {
    (
        $(#[$meta:meta])*
        pub enum $name:ident ($label:literal) {
            $($variant:ident => $text:literal $(| $alias:literal)*),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Choice for $name {
            const ALL: &'static [Self] = &[$(Self::$variant),+];

            fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }

            fn parse(s: &str) -> Option<Self> {
                match s.trim() {
                    $($text $(| $alias)* => Some(Self::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(
                &self,
                f: &mut fmt::Formatter<'_>,
            ) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(
                &self,
                serializer: S,
            ) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let raw = String::deserialize(deserializer)?;
                Self::parse(&raw).ok_or_else(|| {
                    de::Error::custom(format!(
                        "unknown {} '{}', expected one of: {}",
                        $label,
                        raw,
                        Self::allowed()
                    ))
                })
            }
        }
    };
}

choice! {
    /// School class the student is enrolling into.
    pub enum Grade ("grade") {
        Nine => "9",
        Ten => "10",
        Eleven => "11",
        Twelve => "12",
    }
}

choice! {
    /// Examination board.
    pub enum Board ("board") {
        Cbse => "CBSE",
        Icse => "ICSE",
        StateBoard => "State Board" | "StateBoard",
    }
}

choice! {
    /// Preferred language of instruction.
    pub enum Language ("language") {
        English => "English",
        Hindi => "Hindi",
        Hinglish => "Hinglish",
    }
}

choice! {
    pub enum ExamGoal ("exam goal") {
        BoardExcellence => "Board Excellence",
        ConceptMastery => "Concept Mastery",
        CompetitivePrep => "Competitive Prep",
    }
}

choice! {
    pub enum PaymentPlan ("payment plan") {
        Quarterly => "Quarterly",
        HalfYearly => "Half-Yearly",
        Annual => "Annual",
    }
}

choice! {
    pub enum PaymentMode ("payment mode") {
        Upi => "UPI",
        Card => "Card",
        NetBanking => "NetBanking",
    }
}

impl Grade {
    /// Senior secondary classes (11 and 12) carry a heavier subject load.
    pub fn is_senior(&self) -> bool {
        matches!(self, Self::Eleven | Self::Twelve)
    }

    /// Minimum number of subjects a student in this class must pick.
    pub fn min_subjects(&self) -> usize {
        if self.is_senior() { 3 } else { 2 }
    }

    /// Subjects offered for this class.
    pub fn available_subjects(&self) -> &'static [&'static str] {
        match self {
            Self::Nine | Self::Ten => &["English", "Maths", "Science", "Social Science", "Hindi"],
            Self::Eleven => &[
                "Physics",
                "Chemistry",
                "Maths",
                "Biology",
                "Computer Science",
                "English",
            ],
            Self::Twelve => &[
                "Physics",
                "Chemistry",
                "Maths",
                "Biology",
                "Accountancy",
                "Economics",
            ],
        }
    }
}
