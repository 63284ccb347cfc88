use std::collections::BTreeSet;
use std::fmt;

use log::debug;
use log::warn;

use crate::basic_types::PlanningError;
use crate::basic_types::PlanningResult;
use crate::mission::Mission;
use crate::mission::ModelIri;
use crate::mission::ModelPool;
use crate::mission::OrganizationOracle;
use crate::symbols::CardinalityRestriction;
use crate::symbols::ObjectVariable;
use crate::symbols::TemporalAssertion;
use crate::temporal::point_algebra::TimePointComparator;
use crate::temporal::Interval;

/// One spatio-temporal resource requirement: a set of requested resources
/// at a location (the fluent) over a time interval, with cardinality
/// bounds per agent model.
///
/// Invariant: `min <= satisficing <= max` componentwise; after
/// [`compact`](Self::compact) at most one requirement exists per
/// `(interval, fluent)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FluentTimeResource {
    interval_idx: usize,
    fluent_idx: usize,
    /// Indices into the mission's requested-resources list.
    resources: BTreeSet<usize>,
    min_cardinalities: ModelPool,
    max_cardinalities: ModelPool,
    satisficing_cardinalities: ModelPool,
}

impl FluentTimeResource {
    /// Translates the mission's persistence conditions on the
    /// `location-cardinality` state variable into requirements, then
    /// compacts them.
    pub fn from_mission(
        mission: &Mission,
        oracle: &dyn OrganizationOracle,
    ) -> PlanningResult<Vec<FluentTimeResource>> {
        let mut requirements: Vec<FluentTimeResource> = Vec::new();

        for condition in mission.persistence_conditions() {
            let TemporalAssertion::PersistenceCondition {
                state_variable,
                value,
                from,
                to,
            } = condition
            else {
                continue;
            };
            if state_variable.function() != crate::symbols::StateVariable::LOCATION_CARDINALITY {
                continue;
            }

            let resource = ModelIri::new(state_variable.resource());
            let resource_idx = mission
                .requested_resources()
                .iter()
                .position(|iri| *iri == resource)
                .ok_or_else(|| {
                    PlanningError::Internal(format!(
                        "requirement references unrequested resource '{resource}'"
                    ))
                })?;
            let interval_idx = mission
                .interval_index(&Interval::new(*from, *to))
                .ok_or_else(|| {
                    PlanningError::Internal(
                        "requirement interval missing from the prepared mission".to_string(),
                    )
                })?;
            let ObjectVariable::LocationCardinality {
                location,
                cardinality,
                restriction,
            } = value;

            let mut ftr = FluentTimeResource {
                interval_idx,
                fluent_idx: location.0 as usize,
                resources: BTreeSet::from([resource_idx]),
                min_cardinalities: ModelPool::new(),
                max_cardinalities: ModelPool::new(),
                satisficing_cardinalities: ModelPool::new(),
            };

            if oracle.is_functionality(&resource) {
                ftr.max_cardinalities = oracle.functional_saturation_bound(&resource)?;
            } else if oracle.is_actor(&resource) {
                match restriction {
                    CardinalityRestriction::Min => {
                        ftr.min_cardinalities.set(resource.clone(), *cardinality as usize);
                    }
                    CardinalityRestriction::Max => {
                        ftr.max_cardinalities.set(resource.clone(), *cardinality as usize);
                    }
                    CardinalityRestriction::Exact => {
                        ftr.min_cardinalities.set(resource.clone(), *cardinality as usize);
                        ftr.max_cardinalities.set(resource.clone(), *cardinality as usize);
                    }
                }
            } else {
                warn!("unsupported requirement resource '{resource}', skipping");
                continue;
            }

            ftr.max_cardinalities =
                ModelPool::max_merge(&ftr.max_cardinalities, &ftr.min_cardinalities);
            requirements.push(ftr);
        }

        Self::compact(&mut requirements, mission, oracle)?;
        for ftr in &mut requirements {
            ftr.update_satisficing_cardinalities(mission, oracle)?;
        }
        debug!("translated mission into {} requirements", requirements.len());
        Ok(requirements)
    }

    /// Merges requirements that refer to the same `(interval, fluent)`
    /// pair: resource sets are unioned, minima are joined componentwise
    /// and the maxima are recomputed from the functional saturation bound
    /// of the combined functionalities.
    pub fn compact(
        requirements: &mut Vec<FluentTimeResource>,
        mission: &Mission,
        oracle: &dyn OrganizationOracle,
    ) -> PlanningResult<()> {
        let mut index = 0;
        while index < requirements.len() {
            let mut other_index = index + 1;
            while other_index < requirements.len() {
                if requirements[index].interval_idx == requirements[other_index].interval_idx
                    && requirements[index].fluent_idx == requirements[other_index].fluent_idx
                {
                    let other = requirements.remove(other_index);
                    let ftr = &mut requirements[index];
                    ftr.resources.extend(other.resources.iter().copied());
                    ftr.min_cardinalities =
                        ModelPool::max_merge(&ftr.min_cardinalities, &other.min_cardinalities);
                    ftr.max_cardinalities =
                        ModelPool::max_merge(&ftr.max_cardinalities, &other.max_cardinalities);

                    let functionalities = ftr.functionalities(mission, oracle);
                    if !functionalities.is_empty() {
                        ftr.max_cardinalities = ModelPool::max_merge(
                            &ftr.max_cardinalities,
                            &oracle.functional_saturation_bound_for(&functionalities)?,
                        );
                    }
                    // Explicit minima may exceed the saturation bound.
                    ftr.max_cardinalities =
                        ModelPool::max_merge(&ftr.max_cardinalities, &ftr.min_cardinalities);
                } else {
                    other_index += 1;
                }
            }
            index += 1;
        }
        Ok(())
    }

    /// The satisficing cardinalities: the functional saturation bound,
    /// clamped between the explicit minima and maxima.
    fn update_satisficing_cardinalities(
        &mut self,
        mission: &Mission,
        oracle: &dyn OrganizationOracle,
    ) -> PlanningResult<()> {
        let functionalities = self.functionalities(mission, oracle);
        let saturation = if functionalities.is_empty() {
            self.min_cardinalities.clone()
        } else {
            oracle.functional_saturation_bound_for(&functionalities)?
        };
        let sat = ModelPool::max_merge(&saturation, &self.min_cardinalities);
        self.satisficing_cardinalities = ModelPool::min_merge(
            &ModelPool::max_merge(&sat, &self.min_cardinalities),
            &ModelPool::max_merge(&self.max_cardinalities, &self.min_cardinalities),
        );
        Ok(())
    }

    /// Groups of requirement indices whose intervals pairwise overlap,
    /// closed transitively. Only groups of two or more are returned.
    pub fn concurrent_groups(
        requirements: &[FluentTimeResource],
        intervals: &[Interval],
        comparator: &TimePointComparator<'_>,
    ) -> PlanningResult<Vec<Vec<usize>>> {
        let mut group_of: Vec<usize> = (0..requirements.len()).collect();

        for a in 0..requirements.len() {
            for b in (a + 1)..requirements.len() {
                let interval_a = intervals[requirements[a].interval_idx];
                let interval_b = intervals[requirements[b].interval_idx];
                if interval_a.overlaps(&interval_b, comparator)? {
                    // Merge the two groups.
                    let (from, to) = (group_of[b], group_of[a]);
                    for entry in group_of.iter_mut() {
                        if *entry == from {
                            *entry = to;
                        }
                    }
                }
            }
        }

        let mut groups: Vec<Vec<usize>> = Vec::new();
        let mut seen: Vec<usize> = Vec::new();
        for index in 0..requirements.len() {
            let root = group_of[index];
            if let Some(position) = seen.iter().position(|&s| s == root) {
                groups[position].push(index);
            } else {
                seen.push(root);
                groups.push(vec![index]);
            }
        }
        groups.retain(|group| group.len() > 1);
        Ok(groups)
    }

    pub fn interval_idx(&self) -> usize {
        self.interval_idx
    }

    pub fn fluent_idx(&self) -> usize {
        self.fluent_idx
    }

    pub fn resources(&self) -> &BTreeSet<usize> {
        &self.resources
    }

    pub fn min_cardinalities(&self) -> &ModelPool {
        &self.min_cardinalities
    }

    pub fn max_cardinalities(&self) -> &ModelPool {
        &self.max_cardinalities
    }

    pub fn satisficing_cardinalities(&self) -> &ModelPool {
        &self.satisficing_cardinalities
    }

    /// The functionality subset of the requested resources.
    pub fn functionalities(
        &self,
        mission: &Mission,
        oracle: &dyn OrganizationOracle,
    ) -> BTreeSet<ModelIri> {
        self.resources
            .iter()
            .map(|&idx| mission.requested_resources()[idx].clone())
            .filter(|iri| oracle.is_functionality(iri))
            .collect()
    }

    /// Adds a functionality to this requirement, raising the maximum
    /// cardinalities to the saturation bound of the extended set.
    pub fn add_functionality(
        &mut self,
        mission: &Mission,
        oracle: &dyn OrganizationOracle,
        resource_idx: usize,
    ) -> PlanningResult<()> {
        let iri = mission.requested_resources()[resource_idx].clone();
        if !oracle.is_functionality(&iri) {
            return Err(PlanningError::InvalidInput(format!(
                "'{iri}' is not a functionality"
            )));
        }
        let _ = self.resources.insert(resource_idx);
        self.max_cardinalities = ModelPool::max_merge(
            &self.max_cardinalities,
            &oracle.functional_saturation_bound(&iri)?,
        );
        self.update_satisficing_cardinalities(mission, oracle)
    }

    /// The extensional domain: the candidate model pools which satisfy
    /// every requested functionality, merged with the explicit minima.
    /// `None` when the requirement carries no functionalities.
    pub fn domain(
        &self,
        mission: &Mission,
        oracle: &dyn OrganizationOracle,
        available: &ModelPool,
    ) -> PlanningResult<Option<Vec<ModelPool>>> {
        let functionalities = self.functionalities(mission, oracle);
        if functionalities.is_empty() {
            return Ok(None);
        }
        let mut pools = Vec::new();
        for pool in oracle.resource_support(&functionalities)? {
            let merged = ModelPool::max_merge(&pool, &self.min_cardinalities);
            if merged.is_covered_by(available) {
                pools.push(merged);
            }
        }
        Ok(Some(pools))
    }
}

impl fmt::Display for FluentTimeResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "requirement(interval {}, fluent {}, min {}, max {})",
            self.interval_idx, self.fluent_idx, self.min_cardinalities, self.max_cardinalities
        )
    }
}
