use std::path::Path;

use log::warn;

use crate::basic_types::PlanningResult;
use crate::io::reader::relation_name;
use crate::io::xml;
use crate::io::xml::XmlElement;
use crate::mission::Mission;
use crate::mission::OrganizationOracle;
use crate::symbols::CardinalityRestriction;
use crate::symbols::LocationId;
use crate::symbols::ObjectVariable;
use crate::symbols::Position;
use crate::symbols::TemporalAssertion;
use crate::temporal::point_algebra::TimePointId;

/// Writes a mission back into the XML grammar the
/// [`MissionReader`](crate::io::MissionReader) consumes.
///
/// Reading a written document yields the original mission again, modulo
/// label normalization; this round-trip holds for every mission the
/// reader accepts.
pub struct MissionWriter;

impl MissionWriter {
    pub fn to_file(
        mission: &Mission,
        oracle: &dyn OrganizationOracle,
        path: impl AsRef<Path>,
    ) -> PlanningResult<()> {
        std::fs::write(path, Self::to_xml_string(mission, oracle))?;
        Ok(())
    }

    pub fn to_xml_string(mission: &Mission, oracle: &dyn OrganizationOracle) -> String {
        let mut root = XmlElement::new("mission");
        root.push(XmlElement::with_text("name", mission.name()));
        if !mission.description().is_empty() {
            root.push(XmlElement::with_text("description", mission.description()));
        }
        if let Some(organization_model) = mission.organization_model() {
            root.push(XmlElement::with_text(
                "organization_model",
                organization_model.as_str(),
            ));
        }

        root.push(write_resources(mission));
        root.push(write_constants(mission));
        root.push(write_requirements(mission, oracle));
        root.push(write_constraints(mission));

        xml::write(&root)
    }
}

fn write_resources(mission: &Mission) -> XmlElement {
    let mut resources = XmlElement::new("resources");
    for (model, &count) in mission.resources().iter() {
        let mut resource = XmlElement::new("resource");
        resource.push(XmlElement::with_text("model", model.as_str()));
        resource.push(XmlElement::with_text("maxCardinality", count.to_string()));
        resources.push(resource);
    }
    resources
}

fn write_constants(mission: &Mission) -> XmlElement {
    let mut constants = XmlElement::new("constants");
    for (_, location) in mission.locations() {
        let mut element = XmlElement::new("location");
        element.set_attribute("id", location.id());
        match location.position() {
            Some(Position::Cartesian { x, y, z }) => {
                element.set_attribute("x", x.to_string());
                element.set_attribute("y", y.to_string());
                element.set_attribute("z", z.to_string());
            }
            Some(Position::Geodesic {
                radius,
                latitude,
                longitude,
            }) => {
                element.set_attribute("radius", radius.to_string());
                element.set_attribute("latitude", latitude.to_string());
                element.set_attribute("longitude", longitude.to_string());
            }
            None => {}
        }
        constants.push(element);
    }
    constants
}

/// Requirement conditions grouped back by `(location, from, to)`.
fn write_requirements(mission: &Mission, oracle: &dyn OrganizationOracle) -> XmlElement {
    let mut groups: Vec<(LocationId, TimePointId, TimePointId)> = Vec::new();
    for condition in mission.persistence_conditions() {
        if let TemporalAssertion::PersistenceCondition {
            value, from, to, ..
        } = condition
        {
            let key = (value.location(), *from, *to);
            if !groups.contains(&key) {
                groups.push(key);
            }
        }
    }

    let mut requirements = XmlElement::new("requirements");
    for (index, &(location, from, to)) in groups.iter().enumerate() {
        let mut requirement = XmlElement::new("requirement");
        requirement.set_attribute("id", index.to_string());

        let mut spatial = XmlElement::new("spatial-requirement");
        let mut location_element = XmlElement::new("location");
        location_element.push(XmlElement::with_text(
            "id",
            mission.location(location).id(),
        ));
        spatial.push(location_element);
        requirement.push(spatial);

        let mut temporal = XmlElement::new("temporal-requirement");
        let tcn = mission.temporal_constraint_network();
        temporal.push(XmlElement::with_text("from", tcn.timepoint(from).label()));
        temporal.push(XmlElement::with_text("to", tcn.timepoint(to).label()));
        requirement.push(temporal);

        let mut services = XmlElement::new("service-requirement");
        let mut resources = XmlElement::new("resource-requirement");
        for condition in mission.persistence_conditions() {
            let TemporalAssertion::PersistenceCondition {
                state_variable,
                value,
                from: condition_from,
                to: condition_to,
            } = condition
            else {
                continue;
            };
            if (value.location(), *condition_from, *condition_to) != (location, from, to) {
                continue;
            }

            let iri = state_variable.resource();
            if oracle.is_functionality(&iri.into()) {
                services.push(XmlElement::with_text("service", iri));
            } else {
                let ObjectVariable::LocationCardinality {
                    cardinality,
                    restriction,
                    ..
                } = value;
                let cardinality_element = match restriction {
                    CardinalityRestriction::Min | CardinalityRestriction::Exact => {
                        ("minCardinality", *cardinality)
                    }
                    CardinalityRestriction::Max => ("maxCardinality", *cardinality),
                };
                // Min and max conditions of one model merge into a single
                // resource entry.
                let existing = resources.children.iter_mut().find_map(|node| match node {
                    crate::io::xml::XmlNode::Element(element)
                        if element
                            .child("model")
                            .is_some_and(|model| model.text() == iri) =>
                    {
                        Some(element)
                    }
                    _ => None,
                });
                match existing {
                    Some(element) => element.push(XmlElement::with_text(
                        cardinality_element.0,
                        cardinality_element.1.to_string(),
                    )),
                    None => {
                        let mut resource = XmlElement::new("resource");
                        resource.push(XmlElement::with_text("model", iri));
                        resource.push(XmlElement::with_text(
                            cardinality_element.0,
                            cardinality_element.1.to_string(),
                        ));
                        resources.push(resource);
                    }
                }
            }
        }
        if services.elements().next().is_some() {
            requirement.push(services);
        }
        if resources.elements().next().is_some() {
            requirement.push(resources);
        }
        requirements.push(requirement);
    }
    requirements
}

fn write_constraints(mission: &Mission) -> XmlElement {
    let mut temporal = XmlElement::new("temporal-constraints");
    let tcn = mission.temporal_constraint_network();
    for constraint in mission.recorded_constraints() {
        let Some(name) = relation_name(constraint.relation) else {
            warn!(
                "temporal relation '{}' has no element name, skipping",
                constraint.relation
            );
            continue;
        };
        let mut element = XmlElement::new(name);
        element.set_attribute("lval", tcn.timepoint(constraint.lval).label());
        element.set_attribute("rval", tcn.timepoint(constraint.rval).label());
        temporal.push(element);
    }

    let mut constraints = XmlElement::new("constraints");
    constraints.push(temporal);
    constraints
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::MissionReader;
    use crate::mission::CapabilityRegistry;
    use crate::mission::ModelCapability;
    use crate::symbols::Location;

    fn registry() -> CapabilityRegistry {
        CapabilityRegistry::new()
            .with(ModelCapability::new("Vehicle").mobile(1).provides("ImageProvider", 1, 1))
            .with(ModelCapability::new("Payload"))
    }

    #[test]
    fn written_missions_read_back_identically() {
        let registry = registry();
        let mut mission = Mission::new("roundtrip");
        mission.set_description("write, read, compare");
        mission.set_organization_model("http://example.org/om");
        mission.add_resource("Vehicle", 1);
        mission.add_resource("Payload", 2);
        let base = mission.add_location(Location::with_position(
            "base",
            Position::Cartesian { x: 0.0, y: 1.0, z: 2.0 },
        ));
        let outpost = mission.add_location(Location::new("outpost"));
        let t0 = mission.get_or_create_timepoint("t0").unwrap();
        let t1 = mission.get_or_create_timepoint("t1").unwrap();
        let t2 = mission.get_or_create_timepoint("t2").unwrap();
        let t3 = mission.get_or_create_timepoint("t3").unwrap();
        mission.add_resource_requirement(base, t0, t1, "Payload", 1, Some(2));
        mission.add_service_requirement(outpost, t2, t3, "ImageProvider");
        mission.add_temporal_constraint(
            t1,
            t2,
            crate::temporal::point_algebra::QualitativeConstraint::LESS,
        );

        let document = MissionWriter::to_xml_string(&mission, &registry);
        let reread = MissionReader::from_str(&document).unwrap();

        assert_eq!(reread.name(), mission.name());
        assert_eq!(reread.description(), mission.description());
        assert_eq!(reread.resources(), mission.resources());
        assert_eq!(reread.location_count(), mission.location_count());
        assert_eq!(
            reread.persistence_conditions().len(),
            mission.persistence_conditions().len()
        );
        assert_eq!(
            reread.recorded_constraints().len(),
            mission.recorded_constraints().len()
        );

        // A second round trip is textually stable.
        assert_eq!(
            MissionWriter::to_xml_string(&reread, &registry),
            document
        );
    }
}
