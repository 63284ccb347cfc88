use std::collections::BTreeMap;
use std::collections::BTreeSet;

use itertools::Itertools;
use log::debug;

use crate::basic_types::PlanningError;
use crate::basic_types::PlanningResult;
use crate::mission::ModelIri;
use crate::mission::ModelPool;

/// The queries the planner poses to an organization model.
///
/// Implementations must be pure: no interior mutation, safe to share
/// across threads by reference. All pool reasoning is delegated through
/// this trait so that an ontology-backed implementation can be swapped in
/// without touching the solvers.
pub trait OrganizationOracle: Sync {
    /// Transitive subclass check between two IRIs.
    fn is_subclass_of(&self, sub: &ModelIri, sup: &ModelIri) -> bool;

    /// The functionalities a pool of agents can jointly provide.
    fn supported_functionalities(&self, pool: &ModelPool) -> PlanningResult<BTreeSet<ModelIri>>;

    /// The minimal pool that saturates a functionality: adding agents
    /// beyond this bound adds nothing to the functionality.
    fn functional_saturation_bound(&self, functionality: &ModelIri) -> PlanningResult<ModelPool>;

    /// The saturation bound for a set of functionalities: the componentwise
    /// maximum over the member bounds.
    fn functional_saturation_bound_for(
        &self,
        functionalities: &BTreeSet<ModelIri>,
    ) -> PlanningResult<ModelPool> {
        let mut bound = ModelPool::new();
        for functionality in functionalities {
            bound = ModelPool::max_merge(&bound, &self.functional_saturation_bound(functionality)?);
        }
        Ok(bound)
    }

    /// The model pools that satisfy every functionality in the set; the
    /// extensional domain of a requirement. Empty input yields no
    /// restriction (an empty vector).
    fn resource_support(
        &self,
        functionalities: &BTreeSet<ModelIri>,
    ) -> PlanningResult<Vec<ModelPool>>;

    /// Whether agents of this model can move on their own.
    fn is_mobile(&self, model: &ModelIri) -> PlanningResult<bool>;

    /// How many immobile agents one agent of this model can carry.
    fn transport_capacity(&self, model: &ModelIri) -> PlanningResult<u32>;

    fn is_functionality(&self, iri: &ModelIri) -> bool {
        self.is_subclass_of(iri, &vocabulary::functionality())
    }

    fn is_actor(&self, iri: &ModelIri) -> bool {
        self.is_subclass_of(iri, &vocabulary::actor())
    }
}

/// The class vocabulary the planner relies on.
pub mod vocabulary {
    use crate::mission::ModelIri;

    pub fn actor() -> ModelIri {
        ModelIri::new("http://www.rock-robotics.org/2014/01/om-schema#Actor")
    }

    pub fn functionality() -> ModelIri {
        ModelIri::new("http://www.rock-robotics.org/2014/01/om-schema#Functionality")
    }
}

/// What the registry knows about one agent model.
#[derive(Debug, Clone)]
pub struct ModelCapability {
    iri: ModelIri,
    mobile: bool,
    /// Number of immobile agents one unit can carry.
    payload_capacity: u32,
    /// Functionalities this model provides, with the number of units
    /// required to provide (`units`) and to saturate (`saturation`) it.
    provides: Vec<(ModelIri, u32, u32)>,
}

impl ModelCapability {
    pub fn new(iri: impl Into<ModelIri>) -> ModelCapability {
        ModelCapability {
            iri: iri.into(),
            mobile: false,
            payload_capacity: 0,
            provides: Vec::new(),
        }
    }

    pub fn mobile(mut self, payload_capacity: u32) -> ModelCapability {
        self.mobile = true;
        self.payload_capacity = payload_capacity;
        self
    }

    pub fn provides(
        mut self,
        functionality: impl Into<ModelIri>,
        units: u32,
        saturation: u32,
    ) -> ModelCapability {
        self.provides.push((functionality.into(), units, saturation));
        self
    }
}

/// A declarative, table-driven organization-model oracle.
///
/// This stands in for the ontology layer: missions reference it through
/// the `<organization_model>` IRI and tests build it directly. Queries
/// about unknown subjects fail with
/// [`OracleError`](crate::PlanningError::OracleError).
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    models: BTreeMap<ModelIri, ModelCapability>,
}

impl CapabilityRegistry {
    pub fn new() -> CapabilityRegistry {
        CapabilityRegistry::default()
    }

    pub fn register(&mut self, capability: ModelCapability) {
        let _ = self.models.insert(capability.iri.clone(), capability);
    }

    pub fn with(mut self, capability: ModelCapability) -> CapabilityRegistry {
        self.register(capability);
        self
    }

    fn capability(&self, model: &ModelIri) -> PlanningResult<&ModelCapability> {
        self.models.get(model).ok_or_else(|| {
            PlanningError::OracleError(format!("unknown agent model '{model}'"))
        })
    }

    fn functionalities(&self) -> BTreeSet<&ModelIri> {
        self.models
            .values()
            .flat_map(|capability| capability.provides.iter().map(|(iri, _, _)| iri))
            .collect()
    }

    fn providers(&self, functionality: &ModelIri) -> Vec<(&ModelIri, u32, u32)> {
        self.models
            .values()
            .filter_map(|capability| {
                capability
                    .provides
                    .iter()
                    .find(|(iri, _, _)| iri == functionality)
                    .map(|&(_, units, saturation)| (&capability.iri, units, saturation))
            })
            .collect()
    }
}

impl OrganizationOracle for CapabilityRegistry {
    fn is_subclass_of(&self, sub: &ModelIri, sup: &ModelIri) -> bool {
        if sub == sup {
            return true;
        }
        if *sup == vocabulary::actor() {
            return self.models.contains_key(sub);
        }
        if *sup == vocabulary::functionality() {
            return self.functionalities().contains(sub);
        }
        false
    }

    fn supported_functionalities(&self, pool: &ModelPool) -> PlanningResult<BTreeSet<ModelIri>> {
        let mut supported = BTreeSet::new();
        for functionality in self.functionalities() {
            let satisfied = self.providers(functionality).iter().any(|&(model, units, _)| {
                pool.get(model) >= units as usize
            });
            if satisfied {
                let _ = supported.insert(functionality.clone());
            }
        }
        Ok(supported)
    }

    fn functional_saturation_bound(&self, functionality: &ModelIri) -> PlanningResult<ModelPool> {
        let providers = self.providers(functionality);
        if providers.is_empty() {
            return Err(PlanningError::OracleError(format!(
                "no agent model provides '{functionality}'"
            )));
        }
        Ok(providers
            .into_iter()
            .map(|(model, _, saturation)| (model.clone(), saturation as usize))
            .collect())
    }

    fn resource_support(
        &self,
        functionalities: &BTreeSet<ModelIri>,
    ) -> PlanningResult<Vec<ModelPool>> {
        if functionalities.is_empty() {
            return Ok(Vec::new());
        }

        // One candidate pool per choice of provider for each functionality;
        // a model providing several functionalities is counted once at the
        // larger unit requirement.
        let mut per_functionality = Vec::new();
        for functionality in functionalities {
            let providers = self.providers(functionality);
            if providers.is_empty() {
                return Err(PlanningError::OracleError(format!(
                    "no agent model provides '{functionality}'"
                )));
            }
            per_functionality.push(providers);
        }

        let mut pools: Vec<ModelPool> = per_functionality
            .into_iter()
            .multi_cartesian_product()
            .map(|choice| {
                let mut pool = ModelPool::new();
                for (model, units, _) in choice {
                    pool = ModelPool::max_merge(
                        &pool,
                        &[(model.clone(), units as usize)].into_iter().collect(),
                    );
                }
                pool
            })
            .collect();
        pools.sort();
        pools.dedup();
        debug!(
            "resource support for {} functionalities: {} candidate pools",
            functionalities.len(),
            pools.len()
        );
        Ok(pools)
    }

    fn is_mobile(&self, model: &ModelIri) -> PlanningResult<bool> {
        Ok(self.capability(model)?.mobile)
    }

    fn transport_capacity(&self, model: &ModelIri) -> PlanningResult<u32> {
        Ok(self.capability(model)?.payload_capacity)
    }
}
