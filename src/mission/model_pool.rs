use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// The identifier of an agent model or functionality in the organization
/// model, e.g. `http://www.rock-robotics.org/2014/01/om-schema#Payload`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ModelIri(String);

impl ModelIri {
    pub fn new(iri: impl Into<String>) -> ModelIri {
        ModelIri(iri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The fragment (or last path segment) of the IRI; used for compact
    /// display and role names.
    pub fn fragment(&self) -> &str {
        self.0
            .rsplit_once(['#', '/'])
            .map_or(self.0.as_str(), |(_, fragment)| fragment)
    }
}

impl From<&str> for ModelIri {
    fn from(value: &str) -> Self {
        ModelIri::new(value)
    }
}

impl From<String> for ModelIri {
    fn from(value: String) -> Self {
        ModelIri::new(value)
    }
}

impl fmt::Display for ModelIri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A multiset of agent models: model → count.
///
/// Pools are used both for *availability* (what the mission owns) and for
/// *requirements* (what a spatio-temporal requirement needs). The algebra
/// below is the one the organization-model oracle speaks.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct ModelPool(BTreeMap<ModelIri, usize>);

impl ModelPool {
    pub fn new() -> ModelPool {
        ModelPool::default()
    }

    pub fn set(&mut self, model: ModelIri, count: usize) {
        let _ = self.0.insert(model, count);
    }

    pub fn get(&self, model: &ModelIri) -> usize {
        self.0.get(model).copied().unwrap_or(0)
    }

    pub fn contains(&self, model: &ModelIri) -> bool {
        self.0.contains_key(model)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Total number of agents over all models.
    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    /// The largest per-model count; 0 for an empty pool.
    pub fn max_count(&self) -> usize {
        self.0.values().copied().max().unwrap_or(0)
    }

    pub fn models(&self) -> impl Iterator<Item = &ModelIri> {
        self.0.keys()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, ModelIri, usize> {
        self.0.iter()
    }

    /// Componentwise maximum over the union of the model sets.
    pub fn max_merge(a: &ModelPool, b: &ModelPool) -> ModelPool {
        let mut result = a.clone();
        for (model, &count) in b.iter() {
            let entry = result.0.entry(model.clone()).or_insert(0);
            *entry = (*entry).max(count);
        }
        result
    }

    /// Componentwise minimum over the intersection of the model sets.
    pub fn min_merge(a: &ModelPool, b: &ModelPool) -> ModelPool {
        let mut result = ModelPool::new();
        for (model, &count) in a.iter() {
            if b.contains(model) {
                result.set(model.clone(), count.min(b.get(model)));
            }
        }
        result
    }

    /// Componentwise sum over the union of the model sets.
    pub fn add(a: &ModelPool, b: &ModelPool) -> ModelPool {
        let mut result = a.clone();
        for (model, &count) in b.iter() {
            *result.0.entry(model.clone()).or_insert(0) += count;
        }
        result
    }

    /// What `required` still lacks given `available`: componentwise
    /// `required - available`, clamped at zero.
    pub fn delta(required: &ModelPool, available: &ModelPool) -> ModelPool {
        let mut result = ModelPool::new();
        for (model, &count) in required.iter() {
            result.set(model.clone(), count.saturating_sub(available.get(model)));
        }
        result
    }

    /// The raw signed difference `required - available` over the union of
    /// the model sets; negative components are surplus.
    pub fn signed_delta(
        required: &ModelPool,
        available: &ModelPool,
    ) -> BTreeMap<ModelIri, i64> {
        let mut result = BTreeMap::new();
        for (model, &count) in required.iter() {
            let _ = result.insert(model.clone(), count as i64 - available.get(model) as i64);
        }
        for (model, &count) in available.iter() {
            let _ = result.entry(model.clone()).or_insert(-(count as i64));
        }
        result
    }

    /// Whether every model count of `self` is available in `other`.
    pub fn is_covered_by(&self, other: &ModelPool) -> bool {
        self.iter().all(|(model, &count)| other.get(model) >= count)
    }
}

impl FromIterator<(ModelIri, usize)> for ModelPool {
    fn from_iter<T: IntoIterator<Item = (ModelIri, usize)>>(iter: T) -> Self {
        ModelPool(iter.into_iter().collect())
    }
}

impl fmt::Display for ModelPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, (model, count)) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}: {}", model.fragment(), count)?;
        }
        write!(f, "}}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(entries: &[(&str, usize)]) -> ModelPool {
        entries
            .iter()
            .map(|&(m, c)| (ModelIri::new(m), c))
            .collect()
    }

    #[test]
    fn merge_operations_are_componentwise() {
        let a = pool(&[("Crane", 2), ("Payload", 1)]);
        let b = pool(&[("Crane", 1), ("Scout", 3)]);

        assert_eq!(
            ModelPool::max_merge(&a, &b),
            pool(&[("Crane", 2), ("Payload", 1), ("Scout", 3)])
        );
        assert_eq!(ModelPool::min_merge(&a, &b), pool(&[("Crane", 1)]));
        assert_eq!(
            ModelPool::add(&a, &b),
            pool(&[("Crane", 3), ("Payload", 1), ("Scout", 3)])
        );
    }

    #[test]
    fn delta_clamps_at_zero() {
        let required = pool(&[("Crane", 2), ("Payload", 1)]);
        let available = pool(&[("Crane", 3)]);
        assert_eq!(
            ModelPool::delta(&required, &available),
            pool(&[("Crane", 0), ("Payload", 1)])
        );
    }

    #[test]
    fn signed_delta_keeps_surpluses() {
        let required = pool(&[("Crane", 2), ("Payload", 1)]);
        let available = pool(&[("Crane", 3), ("Scout", 1)]);

        let delta = ModelPool::signed_delta(&required, &available);
        assert_eq!(delta[&ModelIri::new("Crane")], -1);
        assert_eq!(delta[&ModelIri::new("Payload")], 1);
        assert_eq!(delta[&ModelIri::new("Scout")], -1);
    }

    #[test]
    fn coverage_check() {
        let needed = pool(&[("Crane", 1)]);
        assert!(needed.is_covered_by(&pool(&[("Crane", 2), ("Scout", 1)])));
        assert!(!needed.is_covered_by(&pool(&[("Scout", 1)])));
    }

    #[test]
    fn fragment_strips_the_namespace() {
        let iri = ModelIri::new("http://example.org/om-schema#Crane");
        assert_eq!(iri.fragment(), "Crane");
        let plain = ModelIri::new("Crane");
        assert_eq!(plain.fragment(), "Crane");
    }
}
