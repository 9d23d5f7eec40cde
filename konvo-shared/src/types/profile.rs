use serde::{Deserialize, Serialize};

/// Profile gender. Stored as text in the database; parsed at the edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Gender {
    Male,
    Female,
}

impl std::fmt::Display for Gender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Gender::Male => write!(f, "Male"),
            Gender::Female => write!(f, "Female"),
        }
    }
}

impl std::str::FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(Gender::Male),
            "Female" => Ok(Gender::Female),
            _ => Err(format!("unknown gender: {s}")),
        }
    }
}

/// Who a profile wants to be shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InterestedIn {
    Male,
    Female,
    Both,
}

impl InterestedIn {
    /// Whether a candidate of the given gender satisfies this preference.
    pub fn accepts(&self, gender: Gender) -> bool {
        match self {
            InterestedIn::Male => gender == Gender::Male,
            InterestedIn::Female => gender == Gender::Female,
            InterestedIn::Both => true,
        }
    }
}

impl std::fmt::Display for InterestedIn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InterestedIn::Male => write!(f, "Male"),
            InterestedIn::Female => write!(f, "Female"),
            InterestedIn::Both => write!(f, "Both"),
        }
    }
}

impl std::str::FromStr for InterestedIn {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Male" => Ok(InterestedIn::Male),
            "Female" => Ok(InterestedIn::Female),
            "Both" => Ok(InterestedIn::Both),
            _ => Err(format!("unknown preference: {s}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_respects_preference() {
        assert!(InterestedIn::Male.accepts(Gender::Male));
        assert!(!InterestedIn::Male.accepts(Gender::Female));
        assert!(InterestedIn::Both.accepts(Gender::Male));
        assert!(InterestedIn::Both.accepts(Gender::Female));
    }

    #[test]
    fn roundtrip_display_parse() {
        for g in ["Male", "Female"] {
            assert_eq!(g.parse::<Gender>().unwrap().to_string(), g);
        }
        for p in ["Male", "Female", "Both"] {
            assert_eq!(p.parse::<InterestedIn>().unwrap().to_string(), p);
        }
        assert!("male".parse::<Gender>().is_err());
    }
}
