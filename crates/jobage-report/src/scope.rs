use jobage_error::EngineError;
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// Which records a duration table or drill-down covers.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "center")]
pub enum BandScope {
    /// Every record in the active subset.
    #[default]
    Overall,
    /// Records of one service center.
    Center(String),
    /// Records of any center outside the configured main centers.
    OtherCenters,
}

impl BandScope {
    pub fn center(name: impl Into<String>) -> Self {
        BandScope::Center(name.into())
    }

    /// Heading text: `Overall`, the center name, or `Other Centers`.
    pub fn label(&self) -> &str {
        match self {
            BandScope::Overall => "Overall",
            BandScope::Center(name) => name,
            BandScope::OtherCenters => "Other Centers",
        }
    }

    /// Whether rows drilled from this scope can come from several centers.
    pub fn spans_centers(&self) -> bool {
        !matches!(self, BandScope::Center(_))
    }
}

impl fmt::Display for BandScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for BandScope {
    type Err = Infallible;

    /// `overall` and `other` (any case, also `other-centers`) are keywords;
    /// anything else names a center.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let keyword = trimmed.to_ascii_lowercase().replace(['-', '_'], " ");
        Ok(match keyword.as_str() {
            "" | "overall" | "all" => BandScope::Overall,
            "other" | "others" | "other centers" => BandScope::OtherCenters,
            _ => BandScope::Center(trimmed.to_string()),
        })
    }
}

/// A requested drill-down: records of `scope` that fall in band `band`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BandSelection {
    pub scope: BandScope,
    pub band: String,
}

impl BandSelection {
    pub fn new(scope: BandScope, band: impl Into<String>) -> Self {
        Self {
            scope,
            band: band.into(),
        }
    }

    pub fn overall(band: impl Into<String>) -> Self {
        Self::new(BandScope::Overall, band)
    }
}

impl fmt::Display for BandSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.scope, self.band)
    }
}

impl FromStr for BandSelection {
    type Err = EngineError;

    /// `SCOPE:LABEL`, split on the last colon; a bare `LABEL` is overall.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (scope, band) = match s.rsplit_once(':') {
            Some((scope, band)) => (scope.parse().unwrap_or_default(), band.trim()),
            None => (BandScope::Overall, s.trim()),
        };
        if band.is_empty() {
            return Err(EngineError::UnknownBand(s.to_string()));
        }
        Ok(Self::new(scope, band))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_keywords() {
        assert_eq!("Overall".parse::<BandScope>(), Ok(BandScope::Overall));
        assert_eq!("other-centers".parse::<BandScope>(), Ok(BandScope::OtherCenters));
        assert_eq!("OTHER".parse::<BandScope>(), Ok(BandScope::OtherCenters));
        assert_eq!(
            " MM-1.Care-MSC-MawLaMyine ".parse::<BandScope>(),
            Ok(BandScope::center("MM-1.Care-MSC-MawLaMyine"))
        );
    }

    #[test]
    fn selection_splits_on_last_colon() {
        let sel: BandSelection = "MM-1.Care-MSC-Yangon-Hledan:50+".parse().unwrap();
        assert_eq!(sel.scope, BandScope::center("MM-1.Care-MSC-Yangon-Hledan"));
        assert_eq!(sel.band, "50+");

        let bare: BandSelection = "10-15".parse().unwrap();
        assert_eq!(bare, BandSelection::overall("10-15"));

        let other: BandSelection = "other:0-3".parse().unwrap();
        assert_eq!(other.scope, BandScope::OtherCenters);
        assert_eq!(other.to_string(), "Other Centers:0-3");
    }

    #[test]
    fn selection_without_band_is_rejected() {
        assert!(matches!(
            "overall:".parse::<BandSelection>(),
            Err(EngineError::UnknownBand(_))
        ));
    }

    #[test]
    fn scope_serializes_tagged() {
        let json = serde_json::to_string(&BandScope::center("A")).unwrap();
        assert_eq!(json, r#"{"kind":"center","center":"A"}"#);
        let json = serde_json::to_string(&BandScope::OtherCenters).unwrap();
        assert_eq!(json, r#"{"kind":"other_centers"}"#);
    }
}
