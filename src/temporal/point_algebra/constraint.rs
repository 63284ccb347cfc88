use std::fmt;

use enumset::enum_set;
use enumset::EnumSet;
use enumset::EnumSetType;

/// A primitive relation between two timepoints.
#[derive(EnumSetType, Debug, Hash)]
pub enum PointRelation {
    Less,
    Equal,
    Greater,
}

/// A qualitative constraint between two timepoints: a set of primitive
/// relations, one of the eight values of the point-algebra lattice
/// (`empty`, `<`, `=`, `>`, `<=`, `>=`, `!=`, `universal`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct QualitativeConstraint(EnumSet<PointRelation>);

impl QualitativeConstraint {
    pub const EMPTY: QualitativeConstraint = QualitativeConstraint(enum_set!());
    pub const LESS: QualitativeConstraint =
        QualitativeConstraint(enum_set!(PointRelation::Less));
    pub const EQUAL: QualitativeConstraint =
        QualitativeConstraint(enum_set!(PointRelation::Equal));
    pub const GREATER: QualitativeConstraint =
        QualitativeConstraint(enum_set!(PointRelation::Greater));
    pub const LESS_OR_EQUAL: QualitativeConstraint =
        QualitativeConstraint(enum_set!(PointRelation::Less | PointRelation::Equal));
    pub const GREATER_OR_EQUAL: QualitativeConstraint =
        QualitativeConstraint(enum_set!(PointRelation::Greater | PointRelation::Equal));
    pub const DISTINCT: QualitativeConstraint =
        QualitativeConstraint(enum_set!(PointRelation::Less | PointRelation::Greater));
    pub const UNIVERSAL: QualitativeConstraint = QualitativeConstraint(enum_set!(
        PointRelation::Less | PointRelation::Equal | PointRelation::Greater
    ));

    pub fn relations(&self) -> EnumSet<PointRelation> {
        self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, relation: PointRelation) -> bool {
        self.0.contains(relation)
    }

    /// The converse relation: `a R b` holds iff `b symmetric(R) a` holds.
    pub fn symmetric(&self) -> QualitativeConstraint {
        let mut relations = EnumSet::empty();
        if self.0.contains(PointRelation::Less) {
            relations |= PointRelation::Greater;
        }
        if self.0.contains(PointRelation::Greater) {
            relations |= PointRelation::Less;
        }
        if self.0.contains(PointRelation::Equal) {
            relations |= PointRelation::Equal;
        }
        QualitativeConstraint(relations)
    }

    pub fn intersect(&self, other: QualitativeConstraint) -> QualitativeConstraint {
        QualitativeConstraint(self.0 & other.0)
    }

    /// Relation composition: if `a R b` and `b S c` then `a (R ∘ S) c`.
    ///
    /// Composition of unions is the union of the compositions of the
    /// primitive members.
    pub fn compose(&self, other: QualitativeConstraint) -> QualitativeConstraint {
        let mut result = EnumSet::empty();
        for r in self.0 {
            for s in other.0 {
                result |= compose_primitive(r, s);
            }
        }
        QualitativeConstraint(result)
    }

    /// The path-consistency triangle test: checks whether the direct
    /// relation between `a` and `c` is compatible with going through `b`.
    pub fn is_path_consistent(
        ab: QualitativeConstraint,
        bc: QualitativeConstraint,
        ac: QualitativeConstraint,
    ) -> bool {
        !ac.intersect(ab.compose(bc)).is_empty()
    }
}

fn compose_primitive(r: PointRelation, s: PointRelation) -> EnumSet<PointRelation> {
    use PointRelation::*;
    match (r, s) {
        (Equal, other) => EnumSet::only(other),
        (other, Equal) => EnumSet::only(other),
        (Less, Less) => EnumSet::only(Less),
        (Greater, Greater) => EnumSet::only(Greater),
        // Opposite strict relations compose to no information at all.
        (Less, Greater) | (Greater, Less) => EnumSet::all(),
    }
}

impl Default for QualitativeConstraint {
    fn default() -> Self {
        QualitativeConstraint::UNIVERSAL
    }
}

impl fmt::Display for QualitativeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let txt = if *self == QualitativeConstraint::EMPTY {
            "empty"
        } else if *self == QualitativeConstraint::LESS {
            "<"
        } else if *self == QualitativeConstraint::EQUAL {
            "="
        } else if *self == QualitativeConstraint::GREATER {
            ">"
        } else if *self == QualitativeConstraint::LESS_OR_EQUAL {
            "<="
        } else if *self == QualitativeConstraint::GREATER_OR_EQUAL {
            ">="
        } else if *self == QualitativeConstraint::DISTINCT {
            "!="
        } else {
            "universal"
        };
        write!(f, "{txt}")
    }
}
