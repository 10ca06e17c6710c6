use jobage_error::EngineError;
use serde::{Deserialize, Serialize};

/// Half-open interval `[lower, upper)` of pending days.
///
/// `upper == None` marks the open-ended last band.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DurationBand {
    pub label: String,
    pub lower: u32,
    #[serde(default)]
    pub upper: Option<u32>,
}

impl DurationBand {
    pub fn new(label: impl Into<String>, lower: u32, upper: Option<u32>) -> Self {
        Self {
            label: label.into(),
            lower,
            upper,
        }
    }

    pub fn contains(&self, days: i64) -> bool {
        days >= i64::from(self.lower) && self.upper.is_none_or(|u| days < i64::from(u))
    }

    /// Label derived from the bounds: `"3-5"` or `"50+"`.
    pub fn default_label(lower: u32, upper: Option<u32>) -> String {
        match upper {
            Some(u) => format!("{lower}-{u}"),
            None => format!("{lower}+"),
        }
    }
}

/// Ordered, validated catalog of duration bands.
///
/// Invariants: at least one band, the first starts at 0, bands are
/// contiguous and strictly increasing, labels are unique, and only the last
/// band is open-ended. Together these make band assignment total over
/// non-negative day counts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<DurationBand>", into = "Vec<DurationBand>")]
pub struct BandCatalog {
    bands: Vec<DurationBand>,
}

impl BandCatalog {
    /// Lower bounds of the standard catalog.
    pub const STANDARD_BOUNDS: [u32; 7] = [0, 3, 5, 10, 15, 30, 50];

    /// `0-3, 3-5, 5-10, 10-15, 15-30, 30-50, 50+`.
    pub fn standard() -> Self {
        let bands = Self::bands_from_bounds(Self::STANDARD_BOUNDS.iter().map(|&b| (None, b)));
        Self { bands }
    }

    pub fn new(bands: Vec<DurationBand>) -> Result<Self, EngineError> {
        validate(&bands)?;
        Ok(Self { bands })
    }

    /// Build a catalog from ascending lower bounds; each band ends where the
    /// next begins. Missing labels are derived from the bounds.
    pub fn from_lower_bounds(
        bounds: impl IntoIterator<Item = (Option<String>, u32)>,
    ) -> Result<Self, EngineError> {
        Self::new(Self::bands_from_bounds(bounds))
    }

    fn bands_from_bounds(bounds: impl IntoIterator<Item = (Option<String>, u32)>) -> Vec<DurationBand> {
        let bounds: Vec<_> = bounds.into_iter().collect();
        bounds
            .iter()
            .enumerate()
            .map(|(i, (label, lower))| {
                let upper = bounds.get(i + 1).map(|(_, next)| *next);
                let label = label
                    .clone()
                    .unwrap_or_else(|| DurationBand::default_label(*lower, upper));
                DurationBand::new(label, *lower, upper)
            })
            .collect()
    }

    pub fn bands(&self) -> &[DurationBand] {
        &self.bands
    }

    pub fn get(&self, index: usize) -> Option<&DurationBand> {
        self.bands.get(index)
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.bands.iter().map(|b| b.label.as_str())
    }

    pub fn index_of(&self, label: &str) -> Result<usize, EngineError> {
        self.bands
            .iter()
            .position(|b| b.label == label)
            .ok_or_else(|| EngineError::UnknownBand(label.to_string()))
    }

    /// Index of the band containing `days`, or `None` for negative input.
    pub fn position(&self, days: i64) -> Option<usize> {
        if days < 0 {
            return None;
        }
        // Bands are contiguous from 0, so the containing band is the last one
        // whose lower bound is <= days.
        let after = self.bands.partition_point(|b| i64::from(b.lower) <= days);
        after.checked_sub(1)
    }
}

impl Default for BandCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<Vec<DurationBand>> for BandCatalog {
    type Error = EngineError;

    fn try_from(bands: Vec<DurationBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<BandCatalog> for Vec<DurationBand> {
    fn from(catalog: BandCatalog) -> Self {
        catalog.bands
    }
}

fn validate(bands: &[DurationBand]) -> Result<(), EngineError> {
    let invalid = |msg: String| Err(EngineError::InvalidBandCatalog(msg));

    let Some(first) = bands.first() else {
        return invalid("catalog has no bands".into());
    };
    if first.lower != 0 {
        return invalid(format!("first band {:?} must start at 0", first.label));
    }
    for (i, band) in bands.iter().enumerate() {
        if band.label.trim().is_empty() {
            return invalid(format!("band {i} has an empty label"));
        }
        if bands[..i].iter().any(|b| b.label == band.label) {
            return invalid(format!("duplicate band label {:?}", band.label));
        }
        match (band.upper, bands.get(i + 1)) {
            (Some(upper), Some(next)) => {
                if upper <= band.lower {
                    return invalid(format!("band {:?} is empty", band.label));
                }
                if upper != next.lower {
                    return invalid(format!(
                        "band {:?} ends at {upper} but {:?} starts at {}",
                        band.label, next.label, next.lower
                    ));
                }
            }
            (None, Some(_)) => {
                return invalid(format!("only the last band may be open-ended, not {:?}", band.label));
            }
            (Some(_), None) => {
                return invalid(format!("last band {:?} must be open-ended", band.label));
            }
            (None, None) => {}
        }
    }
    Ok(())
}
