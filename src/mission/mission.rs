use std::fmt;

use log::debug;

use crate::basic_types::KeyedVec;
use crate::basic_types::PlanningError;
use crate::basic_types::PlanningResult;
use crate::mission::ModelIri;
use crate::mission::ModelPool;
use crate::mission::OrganizationOracle;
use crate::mission::Role;
use crate::symbols::CardinalityRestriction;
use crate::symbols::Location;
use crate::symbols::LocationId;
use crate::symbols::ObjectVariable;
use crate::symbols::StateVariable;
use crate::symbols::TemporalAssertion;
use crate::temporal::point_algebra::QualitativeConstraint;
use crate::temporal::point_algebra::TimePoint;
use crate::temporal::point_algebra::TimePointId;
use crate::temporal::Interval;
use crate::temporal::TemporalConstraintNetwork;

/// A recorded qualitative constraint between two timepoints, kept for the
/// mission writer.
#[derive(Debug, Clone)]
pub struct RecordedConstraint {
    pub lval: TimePointId,
    pub rval: TimePointId,
    pub relation: QualitativeConstraint,
}

/// A mission: the available agent pool, the known constants, and the
/// spatio-temporal requirements expressed as persistence conditions.
///
/// Locations, timepoints and roles are interned here and referenced by
/// index everywhere else. [`prepare`](Self::prepare) must be called once
/// before handing the mission to a solver.
#[derive(Debug, Clone, Default)]
pub struct Mission {
    name: String,
    description: String,
    organization_model: Option<ModelIri>,
    resources: ModelPool,
    locations: KeyedVec<LocationId, Location>,
    tcn: TemporalConstraintNetwork,
    persistence_conditions: Vec<TemporalAssertion>,
    requested_resources: Vec<ModelIri>,
    recorded_constraints: Vec<RecordedConstraint>,
    ordered_timepoints: Vec<TimePointId>,
    intervals: Vec<Interval>,
    prepared: bool,
}

impl Mission {
    pub fn new(name: impl Into<String>) -> Mission {
        Mission {
            name: name.into(),
            ..Mission::default()
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = description.into();
    }

    pub fn organization_model(&self) -> Option<&ModelIri> {
        self.organization_model.as_ref()
    }

    pub fn set_organization_model(&mut self, iri: impl Into<ModelIri>) {
        self.organization_model = Some(iri.into());
    }

    /// Registers `count` available agents of `model`.
    pub fn add_resource(&mut self, model: impl Into<ModelIri>, count: usize) {
        self.resources.set(model.into(), count);
    }

    pub fn resources(&self) -> &ModelPool {
        &self.resources
    }

    /// The models of the available pool, in pool order.
    pub fn models(&self) -> Vec<ModelIri> {
        self.resources.models().cloned().collect()
    }

    /// All roles materialized from the available pool.
    pub fn roles(&self) -> Vec<Role> {
        Role::from_pool(&self.resources)
    }

    /// Interns a location; a location with a known id is returned as-is.
    pub fn add_location(&mut self, location: Location) -> LocationId {
        if let Some(existing) = self.location_by_id(location.id()) {
            return existing;
        }
        self.locations.push(location)
    }

    pub fn location_by_id(&self, id: &str) -> Option<LocationId> {
        self.locations.keys().find(|&l| self.locations[l].id() == id)
    }

    pub fn location(&self, id: LocationId) -> &Location {
        &self.locations[id]
    }

    pub fn locations(&self) -> impl Iterator<Item = (LocationId, &Location)> {
        self.locations.keys().map(|id| (id, &self.locations[id]))
    }

    pub fn location_count(&self) -> usize {
        self.locations.len()
    }

    /// Interns a qualitative timepoint under `label`.
    pub fn get_or_create_timepoint(&mut self, label: &str) -> PlanningResult<TimePointId> {
        self.tcn.add_timepoint(TimePoint::qualitative(label))
    }

    pub fn timepoint_by_label(&self, label: &str) -> Option<TimePointId> {
        self.tcn.timepoint_by_label(label)
    }

    pub fn temporal_constraint_network(&self) -> &TemporalConstraintNetwork {
        &self.tcn
    }

    /// Adds a requirement for `min` (and optionally at most `max`) agents
    /// of `model` at `location` throughout `[from, to]`.
    pub fn add_resource_requirement(
        &mut self,
        location: LocationId,
        from: TimePointId,
        to: TimePointId,
        model: impl Into<ModelIri>,
        min: u32,
        max: Option<u32>,
    ) {
        let model = model.into();
        self.request_resource(&model);
        let state_variable = StateVariable::location_cardinality(model.as_str());
        self.persistence_conditions.push(TemporalAssertion::PersistenceCondition {
            state_variable: state_variable.clone(),
            value: ObjectVariable::location_cardinality(
                location,
                min,
                CardinalityRestriction::Min,
            ),
            from,
            to,
        });
        if let Some(max) = max {
            self.persistence_conditions.push(TemporalAssertion::PersistenceCondition {
                state_variable,
                value: ObjectVariable::location_cardinality(
                    location,
                    max,
                    CardinalityRestriction::Max,
                ),
                from,
                to,
            });
        }
    }

    /// Adds a requirement for the functionality `service` to be available
    /// at `location` throughout `[from, to]`.
    pub fn add_service_requirement(
        &mut self,
        location: LocationId,
        from: TimePointId,
        to: TimePointId,
        service: impl Into<ModelIri>,
    ) {
        let service = service.into();
        self.request_resource(&service);
        self.persistence_conditions.push(TemporalAssertion::PersistenceCondition {
            state_variable: StateVariable::location_cardinality(service.as_str()),
            value: ObjectVariable::location_cardinality(
                location,
                1,
                CardinalityRestriction::Min,
            ),
            from,
            to,
        });
    }

    fn request_resource(&mut self, model: &ModelIri) {
        if !self.requested_resources.contains(model) {
            self.requested_resources.push(model.clone());
        }
    }

    /// The distinct models and functionalities referenced by requirements,
    /// in first-use order.
    pub fn requested_resources(&self) -> &[ModelIri] {
        &self.requested_resources
    }

    pub fn persistence_conditions(&self) -> &[TemporalAssertion] {
        &self.persistence_conditions
    }

    /// Records a qualitative constraint between two timepoints.
    pub fn add_temporal_constraint(
        &mut self,
        lval: TimePointId,
        rval: TimePointId,
        relation: QualitativeConstraint,
    ) {
        self.recorded_constraints.push(RecordedConstraint {
            lval,
            rval,
            relation,
        });
        self.tcn.add_qualitative_constraint(lval, rval, relation);
    }

    pub fn recorded_constraints(&self) -> &[RecordedConstraint] {
        &self.recorded_constraints
    }

    /// Validates the mission and freezes the temporal scaffolding: every
    /// persistence interval is constrained to run forward, the network is
    /// checked for consistency, timepoints are ordered and the distinct
    /// requirement intervals are collected.
    pub fn prepare(&mut self, oracle: &dyn OrganizationOracle) -> PlanningResult<()> {
        if self.resources.is_empty() {
            return Err(PlanningError::InvalidInput(
                "mission has no available resources".to_string(),
            ));
        }
        for model in self.resources.models() {
            if !oracle.is_actor(model) {
                return Err(PlanningError::OracleError(format!(
                    "available resource '{model}' is not a known agent model"
                )));
            }
        }

        for condition in &self.persistence_conditions {
            if let TemporalAssertion::PersistenceCondition { from, to, .. } = condition {
                self.tcn
                    .add_qualitative_constraint(*from, *to, QualitativeConstraint::LESS);
            }
        }

        if !self.tcn.is_consistent() {
            return Err(PlanningError::InconsistentNetwork(format!(
                "mission '{}' carries contradictory temporal constraints",
                self.name
            )));
        }

        self.ordered_timepoints = self.tcn.timepoint_ids().collect();
        self.tcn.sort(&mut self.ordered_timepoints);

        self.intervals.clear();
        for condition in &self.persistence_conditions {
            if let TemporalAssertion::PersistenceCondition { from, to, .. } = condition {
                let interval = Interval::new(*from, *to);
                if !self.intervals.contains(&interval) {
                    self.intervals.push(interval);
                }
            }
        }

        debug!(
            "prepared mission '{}': {} timepoints, {} intervals, {} requirement conditions",
            self.name,
            self.ordered_timepoints.len(),
            self.intervals.len(),
            self.persistence_conditions.len()
        );
        self.prepared = true;
        Ok(())
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Timepoints in temporal order; empty before [`prepare`](Self::prepare).
    pub fn ordered_timepoints(&self) -> &[TimePointId] {
        &self.ordered_timepoints
    }

    /// The distinct requirement intervals; empty before
    /// [`prepare`](Self::prepare).
    pub fn intervals(&self) -> &[Interval] {
        &self.intervals
    }

    pub fn interval_index(&self, interval: &Interval) -> Option<usize> {
        self.intervals.iter().position(|i| i == interval)
    }
}

impl fmt::Display for Mission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Mission: {}", self.name)?;
        writeln!(f, "    resources: {}", self.resources)?;
        writeln!(
            f,
            "    locations: {}",
            self.locations
                .iter()
                .map(Location::id)
                .collect::<Vec<_>>()
                .join(", ")
        )?;
        write!(f, "    requirements: {}", self.persistence_conditions.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::CapabilityRegistry;
    use crate::mission::ModelCapability;

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::new().with(ModelCapability::new("Crane").mobile(1))
    }

    fn two_point_mission() -> Mission {
        let mut mission = Mission::new("test");
        mission.add_resource("Crane", 1);
        let l0 = mission.add_location(Location::new("l0"));
        let t0 = mission.get_or_create_timepoint("t0").unwrap();
        let t1 = mission.get_or_create_timepoint("t1").unwrap();
        mission.add_resource_requirement(l0, t0, t1, "Crane", 1, None);
        mission
    }

    #[test]
    fn prepare_orders_timepoints_and_collects_intervals() {
        let mut mission = two_point_mission();
        mission.prepare(&registry()).unwrap();

        assert!(mission.is_prepared());
        assert_eq!(mission.intervals().len(), 1);
        let t0 = mission.timepoint_by_label("t0").unwrap();
        let t1 = mission.timepoint_by_label("t1").unwrap();
        assert_eq!(mission.ordered_timepoints(), &[t0, t1]);
    }

    #[test]
    fn contradictory_constraints_fail_preparation() {
        let mut mission = two_point_mission();
        let t0 = mission.timepoint_by_label("t0").unwrap();
        let t1 = mission.timepoint_by_label("t1").unwrap();
        // The requirement already forces t0 < t1.
        mission.add_temporal_constraint(t0, t1, QualitativeConstraint::GREATER);

        assert!(matches!(
            mission.prepare(&registry()),
            Err(PlanningError::InconsistentNetwork(_))
        ));
    }

    #[test]
    fn locations_are_interned() {
        let mut mission = Mission::new("test");
        let a = mission.add_location(Location::new("l0"));
        let b = mission.add_location(Location::new("l0"));
        assert_eq!(a, b);
        assert_eq!(mission.location_count(), 1);
    }
}
