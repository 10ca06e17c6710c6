use jobage_aggregator::{KeyedCounter, percentage};
use jobage_schema::{RecordField, RecordView};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a center is one of the configured main centers.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CenterKind {
    Main,
    Other,
}

impl fmt::Display for CenterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CenterKind::Main => f.write_str("Main Center"),
            CenterKind::Other => f.write_str("Other Center"),
        }
    }
}

/// Job count of one center (or group of centers) and its share of all jobs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CenterShare {
    pub center: String,
    pub jobs: usize,
    pub percentage: f64,
    pub kind: CenterKind,
}

impl CenterShare {
    pub fn percentage_label(&self) -> String {
        format!("{:.1}%", self.percentage)
    }
}

/// Headline numbers across every loaded record, independent of filters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CenterSummary {
    pub total_jobs: usize,
    /// One entry per configured main center, in configured order, including
    /// centers with no jobs.
    pub main_centers: Vec<CenterShare>,
    /// All non-main centers taken together.
    pub other_centers: CenterShare,
    /// Every observed center, busiest first.
    pub centers: Vec<CenterShare>,
}

impl CenterSummary {
    pub fn compute<T: RecordView>(records: &[T], main_centers: &[String]) -> Self {
        let counter: KeyedCounter<'_> = records
            .iter()
            .map(|r| r.record().category(RecordField::ServiceCenter))
            .collect();
        let total_jobs = records.len();
        let kind_of = |center: &str| {
            if main_centers.iter().any(|m| m == center) {
                CenterKind::Main
            } else {
                CenterKind::Other
            }
        };

        let main: Vec<CenterShare> = main_centers
            .iter()
            .map(|center| {
                let jobs = counter.get(center);
                CenterShare {
                    center: center.clone(),
                    jobs,
                    percentage: percentage(jobs, total_jobs),
                    kind: CenterKind::Main,
                }
            })
            .collect();
        let other_jobs = records
            .iter()
            .filter(|r| kind_of(r.record().category(RecordField::ServiceCenter)) == CenterKind::Other)
            .count();

        let centers = counter
            .ranked()
            .into_iter()
            .map(|(center, jobs)| CenterShare {
                center: center.to_string(),
                jobs,
                percentage: percentage(jobs, total_jobs),
                kind: kind_of(center),
            })
            .collect();

        Self {
            total_jobs,
            main_centers: main,
            other_centers: CenterShare {
                center: "Other Centers".to_string(),
                jobs: other_jobs,
                percentage: percentage(other_jobs, total_jobs),
                kind: CenterKind::Other,
            },
            centers,
        }
    }

    pub fn main_center(&self, center: &str) -> Option<&CenterShare> {
        self.main_centers.iter().find(|c| c.center == center)
    }

    pub fn main_jobs(&self) -> usize {
        self.main_centers.iter().map(|c| c.jobs).sum()
    }
}
