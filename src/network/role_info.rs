use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::fmt;

use crate::mission::Role;

/// The tag under which roles *required* at a tuple are filed.
pub const REQUIRED_TAG: &str = "";

/// The tag under which roles *committed* to a tuple are filed.
pub const ASSIGNED_TAG: &str = "assigned";

/// Role annotations of a space-time tuple or edge: a mapping from a tag
/// to the set of roles filed under it.
///
/// The mapping is monotone: solving only ever adds tags and roles, it
/// never removes them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoleInfo {
    tagged_roles: BTreeMap<String, BTreeSet<Role>>,
}

impl RoleInfo {
    pub fn new() -> RoleInfo {
        RoleInfo::default()
    }

    pub fn add_role(&mut self, role: Role, tag: &str) {
        let _ = self
            .tagged_roles
            .entry(tag.to_string())
            .or_default()
            .insert(role);
    }

    pub fn has_role(&self, role: &Role, tag: &str) -> bool {
        self.tagged_roles
            .get(tag)
            .is_some_and(|roles| roles.contains(role))
    }

    /// The roles filed under `tag`; empty when the tag is unknown.
    pub fn roles(&self, tag: &str) -> BTreeSet<Role> {
        self.tagged_roles.get(tag).cloned().unwrap_or_default()
    }

    /// All roles over all tags.
    pub fn all_roles(&self) -> BTreeSet<Role> {
        self.tagged_roles.values().flatten().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.tagged_roles.values().all(BTreeSet::is_empty)
    }
}

impl fmt::Display for RoleInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (tag, roles) in &self.tagged_roles {
            let label = if tag.is_empty() { "required" } else { tag.as_str() };
            write!(f, " {label}:[")?;
            for (i, role) in roles.iter().enumerate() {
                if i > 0 {
                    write!(f, ",")?;
                }
                write!(f, "{role}")?;
            }
            write!(f, "]")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mission::ModelIri;

    #[test]
    fn tags_partition_the_roles() {
        let crane = Role::new(ModelIri::new("Crane"), 0);
        let payload = Role::new(ModelIri::new("Payload"), 0);

        let mut info = RoleInfo::new();
        info.add_role(crane.clone(), REQUIRED_TAG);
        info.add_role(payload.clone(), ASSIGNED_TAG);

        assert!(info.has_role(&crane, REQUIRED_TAG));
        assert!(!info.has_role(&crane, ASSIGNED_TAG));
        assert_eq!(info.all_roles().len(), 2);
    }
}
