use std::fmt;

use crate::mission::ModelIri;
use crate::mission::ModelPool;

/// An instantiated agent: the `index`-th unit of its model.
///
/// Roles are materialized from the available model pool once per mission:
/// a model with bound `K` yields the roles `(0, M) … (K-1, M)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Role {
    model: ModelIri,
    index: u32,
}

impl Role {
    pub fn new(model: ModelIri, index: u32) -> Role {
        Role { model, index }
    }

    pub fn model(&self) -> &ModelIri {
        &self.model
    }

    pub fn index(&self) -> u32 {
        self.index
    }

    /// All roles of a pool, model-major in pool order.
    pub fn from_pool(pool: &ModelPool) -> Vec<Role> {
        let mut roles = Vec::with_capacity(pool.total());
        for (model, &count) in pool.iter() {
            for index in 0..count {
                roles.push(Role::new(model.clone(), index as u32));
            }
        }
        roles
    }

    /// The model pool spanned by a set of roles.
    pub fn to_pool<'a>(roles: impl IntoIterator<Item = &'a Role>) -> ModelPool {
        let mut pool = ModelPool::new();
        for role in roles {
            pool.set(role.model.clone(), pool.get(&role.model) + 1);
        }
        pool
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.model.fragment(), self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roles_are_materialized_per_model() {
        let mut pool = ModelPool::new();
        pool.set(ModelIri::new("Crane"), 2);
        pool.set(ModelIri::new("Payload"), 1);

        let roles = Role::from_pool(&pool);
        assert_eq!(roles.len(), 3);
        assert_eq!(roles[0].to_string(), "Crane_0");
        assert_eq!(roles[1].to_string(), "Crane_1");
        assert_eq!(roles[2].to_string(), "Payload_0");

        assert_eq!(Role::to_pool(&roles), pool);
    }
}
