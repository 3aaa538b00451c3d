use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const SHARE_GROUPS: &[&str] = &["stock_shares", "stock_foreign_shares", "stock_dr"];
const BOND_GROUPS: &[&str] = &["stock_bonds", "stock_eurobond"];
const FUND_GROUPS: &[&str] = &["stock_etf", "stock_ppif"];
const OPTION_GROUPS: &[&str] = &["options", "futures_options"];

/// Search filter over ISS security groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentType {
    Share,
    Bond,
    Fund,
}

impl InstrumentType {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Share => "share",
            Self::Bond => "bond",
            Self::Fund => "fund",
        }
    }

    /// ISS `group` values that belong to this type.
    pub const fn groups(self) -> &'static [&'static str] {
        match self {
            Self::Share => SHARE_GROUPS,
            Self::Bond => BOND_GROUPS,
            Self::Fund => FUND_GROUPS,
        }
    }

    pub fn matches_group(self, group: &str) -> bool {
        self.groups().contains(&group)
    }
}

impl Display for InstrumentType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InstrumentType {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "share" => Ok(Self::Share),
            "bond" => Ok(Self::Bond),
            "fund" => Ok(Self::Fund),
            _ => Err(ValidationError::UnknownInstrumentType {
                value: value.to_owned(),
            }),
        }
    }
}

/// Coarse classification of a search hit by its ISS group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InstrumentKind {
    Share,
    Bond,
    Option,
    Other,
}

impl InstrumentKind {
    pub fn from_group(group: Option<&str>) -> Self {
        match group {
            Some(group) if SHARE_GROUPS.contains(&group) => Self::Share,
            Some(group) if BOND_GROUPS.contains(&group) => Self::Bond,
            Some(group) if OPTION_GROUPS.contains(&group) => Self::Option,
            _ => Self::Other,
        }
    }
}

impl Display for InstrumentKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Share => "Share",
            Self::Bond => "Bond",
            Self::Option => "Option",
            Self::Other => "Instrument",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Share".parse::<InstrumentType>(), Ok(InstrumentType::Share));
        assert_eq!(" bond ".parse::<InstrumentType>(), Ok(InstrumentType::Bond));
        assert_eq!("FUND".parse::<InstrumentType>(), Ok(InstrumentType::Fund));
    }

    #[test]
    fn rejects_unknown_type() {
        let err = "stock".parse::<InstrumentType>().expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::UnknownInstrumentType {
                value: String::from("stock")
            }
        );
    }

    #[test]
    fn groups_drive_kind_and_filter() {
        assert!(InstrumentType::Share.matches_group("stock_dr"));
        assert!(!InstrumentType::Share.matches_group("stock_bonds"));
        assert_eq!(InstrumentKind::from_group(Some("stock_eurobond")), InstrumentKind::Bond);
        assert_eq!(InstrumentKind::from_group(Some("futures_options")), InstrumentKind::Option);
        assert_eq!(InstrumentKind::from_group(Some("stock_etf")), InstrumentKind::Other);
        assert_eq!(InstrumentKind::from_group(None), InstrumentKind::Other);
    }
}
