use serde::{Deserialize, Serialize};

use crate::error::SimError;

/// Best-of-3 or best-of-5 sets. Serialized as the plain set count.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MatchFormat {
    #[default]
    BestOf3,
    BestOf5,
}

impl MatchFormat {
    pub fn best_of(self) -> u8 {
        match self {
            MatchFormat::BestOf3 => 3,
            MatchFormat::BestOf5 => 5,
        }
    }

    /// `floor(best_of / 2) + 1`
    pub fn sets_to_win(self) -> u8 {
        self.best_of() / 2 + 1
    }
}

impl TryFrom<u8> for MatchFormat {
    type Error = SimError;

    fn try_from(best_of: u8) -> Result<Self, SimError> {
        match best_of {
            3 => Ok(MatchFormat::BestOf3),
            5 => Ok(MatchFormat::BestOf5),
            other => Err(SimError::invalid(format!("best_of must be 3 or 5, got {other}"))),
        }
    }
}

impl From<MatchFormat> for u8 {
    fn from(format: MatchFormat) -> u8 {
        format.best_of()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sets_to_win() {
        assert_eq!(MatchFormat::BestOf3.sets_to_win(), 2);
        assert_eq!(MatchFormat::BestOf5.sets_to_win(), 3);
    }

    #[test]
    fn test_from_best_of() {
        assert_eq!(MatchFormat::try_from(5).unwrap(), MatchFormat::BestOf5);
        assert!(MatchFormat::try_from(4).is_err());
        let format: MatchFormat = serde_json::from_str("3").unwrap();
        assert_eq!(format, MatchFormat::BestOf3);
        assert!(serde_json::from_str::<MatchFormat>("7").is_err());
    }
}
