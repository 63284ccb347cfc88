use std::collections::BTreeSet;
use std::fmt;

use crate::basic_types::StorageKey;

/// Index of a [`TimePoint`] within its owning network.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimePointId(pub u32);

impl StorageKey for TimePointId {
    fn index(&self) -> usize {
        self.0 as usize
    }

    fn create_from_index(index: usize) -> Self {
        TimePointId(index as u32)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimePointVariant {
    Qualitative,
    Quantitative,
}

/// A timepoint: either a purely symbolic, labelled point, or a point with
/// an inclusive `[lower, upper]` bound pair.
///
/// A qualitative timepoint can carry aliases; two qualitative timepoints
/// are equal when either one's label occurs among the other's aliases.
/// Within one network all timepoints share the same variant.
#[derive(Debug, Clone, PartialEq)]
pub enum TimePoint {
    Qualitative {
        label: String,
        aliases: BTreeSet<String>,
    },
    Quantitative {
        label: String,
        lower: f64,
        upper: f64,
    },
}

impl TimePoint {
    pub fn qualitative(label: impl Into<String>) -> TimePoint {
        TimePoint::Qualitative {
            label: label.into(),
            aliases: BTreeSet::new(),
        }
    }

    pub fn quantitative(label: impl Into<String>, lower: f64, upper: f64) -> TimePoint {
        TimePoint::Quantitative {
            label: label.into(),
            lower,
            upper,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            TimePoint::Qualitative { label, .. } => label,
            TimePoint::Quantitative { label, .. } => label,
        }
    }

    pub fn variant(&self) -> TimePointVariant {
        match self {
            TimePoint::Qualitative { .. } => TimePointVariant::Qualitative,
            TimePoint::Quantitative { .. } => TimePointVariant::Quantitative,
        }
    }

    /// Registers `alias` as an alternative label. Quantitative timepoints
    /// carry no aliases; the call is ignored for them.
    pub fn add_alias(&mut self, alias: impl Into<String>) {
        if let TimePoint::Qualitative { aliases, .. } = self {
            let _ = aliases.insert(alias.into());
        }
    }

    /// Checks whether `name` is the label or one of the aliases.
    pub fn is_alias(&self, name: &str) -> bool {
        match self {
            TimePoint::Qualitative { label, aliases } => {
                label == name || aliases.contains(name)
            }
            TimePoint::Quantitative { label, .. } => label == name,
        }
    }

    /// Alias-aware equality: qualitative timepoints are the same point when
    /// their alias sets touch.
    pub fn same_point(&self, other: &TimePoint) -> bool {
        match (self, other) {
            (TimePoint::Qualitative { .. }, TimePoint::Qualitative { .. }) => {
                self.is_alias(other.label()) || other.is_alias(self.label())
            }
            (
                TimePoint::Quantitative { label, lower, upper },
                TimePoint::Quantitative {
                    label: other_label,
                    lower: other_lower,
                    upper: other_upper,
                },
            ) => label == other_label && lower == other_lower && upper == other_upper,
            _ => false,
        }
    }

    pub fn bounds(&self) -> Option<(f64, f64)> {
        match self {
            TimePoint::Qualitative { .. } => None,
            TimePoint::Quantitative { lower, upper, .. } => Some((*lower, *upper)),
        }
    }
}

impl fmt::Display for TimePoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimePoint::Qualitative { label, .. } => write!(f, "{label}"),
            TimePoint::Quantitative {
                label,
                lower,
                upper,
            } => write!(f, "{label}[{lower},{upper}]"),
        }
    }
}
