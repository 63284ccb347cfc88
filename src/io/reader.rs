use std::path::Path;

use log::debug;
use log::warn;

use crate::basic_types::PlanningError;
use crate::basic_types::PlanningResult;
use crate::io::xml;
use crate::io::xml::XmlElement;
use crate::mission::Mission;
use crate::symbols::Location;
use crate::symbols::Position;
use crate::temporal::point_algebra::QualitativeConstraint;

/// Reads a mission from its XML representation.
///
/// The grammar is the one [`MissionWriter`](crate::io::MissionWriter)
/// emits: a `<mission>` root with `name`, `description`,
/// `organization_model`, `resources`, `constants`, `requirements` and
/// `constraints` children. Temporal constraints referencing timepoints no
/// requirement uses are dropped with a warning.
pub struct MissionReader;

impl MissionReader {
    pub fn from_file(path: impl AsRef<Path>) -> PlanningResult<Mission> {
        let content = std::fs::read_to_string(&path)?;
        debug!("read mission from '{}'", path.as_ref().display());
        Self::from_str(&content)
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> PlanningResult<Mission> {
        let root = xml::parse(content)
            .map_err(|e| PlanningError::InvalidInput(format!("mission document: {e}")))?;
        if root.name != "mission" {
            return Err(PlanningError::InvalidInput(format!(
                "unexpected root element '{}', expected 'mission'",
                root.name
            )));
        }

        let name = root.child("name").map(XmlElement::text).unwrap_or_default();
        let mut mission = Mission::new(name);
        if let Some(description) = root.child("description") {
            mission.set_description(description.text());
        }
        if let Some(organization_model) = root.child("organization_model") {
            mission.set_organization_model(organization_model.text());
        }

        if let Some(resources) = root.child("resources") {
            parse_resources(&mut mission, resources)?;
        }
        if let Some(constants) = root.child("constants") {
            parse_constants(&mut mission, constants)?;
        }
        if let Some(requirements) = root.child("requirements") {
            parse_requirements(&mut mission, requirements)?;
        }
        if let Some(constraints) = root.child("constraints") {
            if let Some(temporal) = constraints.child("temporal-constraints") {
                parse_temporal_constraints(&mut mission, temporal)?;
            }
        }

        Ok(mission)
    }
}

fn child_text(element: &XmlElement, name: &str) -> PlanningResult<String> {
    element
        .child(name)
        .map(XmlElement::text)
        .ok_or_else(|| {
            PlanningError::InvalidInput(format!(
                "element '{}' is missing its '{name}' child",
                element.name
            ))
        })
}

fn parse_number<T: std::str::FromStr>(text: &str, what: &str) -> PlanningResult<T> {
    text.trim()
        .parse::<T>()
        .map_err(|_| PlanningError::InvalidInput(format!("unparsable {what} '{text}'")))
}

fn parse_resources(mission: &mut Mission, resources: &XmlElement) -> PlanningResult<()> {
    for resource in resources.elements_named("resource") {
        let model = child_text(resource, "model")?;
        let cardinality: usize =
            parse_number(&child_text(resource, "maxCardinality")?, "cardinality")?;
        if mission.resources().contains(&model.as_str().into()) {
            return Err(PlanningError::InvalidInput(format!(
                "resource '{model}' is listed twice"
            )));
        }
        mission.add_resource(model, cardinality);
    }
    Ok(())
}

fn parse_constants(mission: &mut Mission, constants: &XmlElement) -> PlanningResult<()> {
    for location in constants.elements_named("location") {
        let id = location
            .attribute("id")
            .ok_or_else(|| {
                PlanningError::InvalidInput("location constant without an id".to_string())
            })?
            .to_string();

        let position = if location.attribute("x").is_some() {
            Some(Position::Cartesian {
                x: parse_number(location.attribute("x").unwrap_or("0"), "coordinate")?,
                y: parse_number(location.attribute("y").unwrap_or("0"), "coordinate")?,
                z: parse_number(location.attribute("z").unwrap_or("0"), "coordinate")?,
            })
        } else if location.attribute("radius").is_some() {
            Some(Position::Geodesic {
                radius: parse_number(location.attribute("radius").unwrap_or("0"), "radius")?,
                latitude: parse_number(
                    location.attribute("latitude").unwrap_or("0"),
                    "latitude",
                )?,
                longitude: parse_number(
                    location.attribute("longitude").unwrap_or("0"),
                    "longitude",
                )?,
            })
        } else {
            None
        };

        let location = match position {
            Some(position) => Location::with_position(id, position),
            None => Location::new(id),
        };
        let _ = mission.add_location(location);
    }
    Ok(())
}

fn parse_requirements(mission: &mut Mission, requirements: &XmlElement) -> PlanningResult<()> {
    for requirement in requirements.elements_named("requirement") {
        let spatial = requirement.child("spatial-requirement").ok_or_else(|| {
            PlanningError::InvalidInput("requirement without a spatial-requirement".to_string())
        })?;
        let location_id = spatial
            .child("location")
            .map(|location| child_text(location, "id"))
            .transpose()?
            .ok_or_else(|| {
                PlanningError::InvalidInput("spatial-requirement without a location".to_string())
            })?;
        let location = mission.location_by_id(&location_id).ok_or_else(|| {
            PlanningError::InvalidInput(format!("unknown location '{location_id}'"))
        })?;

        let temporal = requirement.child("temporal-requirement").ok_or_else(|| {
            PlanningError::InvalidInput("requirement without a temporal-requirement".to_string())
        })?;
        let from = mission.get_or_create_timepoint(&child_text(temporal, "from")?)?;
        let to = mission.get_or_create_timepoint(&child_text(temporal, "to")?)?;

        if let Some(services) = requirement.child("service-requirement") {
            for service in services.elements_named("service") {
                mission.add_service_requirement(location, from, to, service.text());
            }
        }

        if let Some(resources) = requirement.child("resource-requirement") {
            for resource in resources.elements_named("resource") {
                let model = child_text(resource, "model")?;
                let min: u32 =
                    parse_number(&child_text(resource, "minCardinality")?, "cardinality")?;
                let max = resource
                    .child("maxCardinality")
                    .map(|max| parse_number::<u32>(&max.text(), "cardinality"))
                    .transpose()?;
                mission.add_resource_requirement(location, from, to, model, min, max);
            }
        }
    }
    Ok(())
}

fn parse_temporal_constraints(
    mission: &mut Mission,
    constraints: &XmlElement,
) -> PlanningResult<()> {
    for constraint in constraints.elements() {
        let relation = relation_by_name(&constraint.name)?;
        let lval = constraint.attribute("lval").ok_or_else(|| {
            PlanningError::InvalidInput(format!(
                "temporal constraint '{}' without lval",
                constraint.name
            ))
        })?;
        let rval = constraint.attribute("rval").ok_or_else(|| {
            PlanningError::InvalidInput(format!(
                "temporal constraint '{}' without rval",
                constraint.name
            ))
        })?;

        match (
            mission.timepoint_by_label(lval),
            mission.timepoint_by_label(rval),
        ) {
            (Some(left), Some(right)) => {
                mission.add_temporal_constraint(left, right, relation);
            }
            _ => {
                warn!(
                    "temporal constraint over unused timepoints '{lval}', '{rval}' -- ignoring"
                );
            }
        }
    }
    Ok(())
}

pub(crate) fn relation_by_name(name: &str) -> PlanningResult<QualitativeConstraint> {
    match name {
        "greaterThan" => Ok(QualitativeConstraint::GREATER),
        "lessThan" => Ok(QualitativeConstraint::LESS),
        "equals" => Ok(QualitativeConstraint::EQUAL),
        "distinct" => Ok(QualitativeConstraint::DISTINCT),
        "greaterOrEqual" => Ok(QualitativeConstraint::GREATER_OR_EQUAL),
        "lessOrEqual" => Ok(QualitativeConstraint::LESS_OR_EQUAL),
        _ => Err(PlanningError::InvalidInput(format!(
            "unknown temporal constraint type '{name}'"
        ))),
    }
}

pub(crate) fn relation_name(relation: QualitativeConstraint) -> Option<&'static str> {
    if relation == QualitativeConstraint::GREATER {
        Some("greaterThan")
    } else if relation == QualitativeConstraint::LESS {
        Some("lessThan")
    } else if relation == QualitativeConstraint::EQUAL {
        Some("equals")
    } else if relation == QualitativeConstraint::DISTINCT {
        Some("distinct")
    } else if relation == QualitativeConstraint::GREATER_OR_EQUAL {
        Some("greaterOrEqual")
    } else if relation == QualitativeConstraint::LESS_OR_EQUAL {
        Some("lessOrEqual")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MISSION: &str = r#"<?xml version="1.0"?>
<mission>
    <name>supply-run</name>
    <description>bring the payload to the outpost</description>
    <organization_model>http://example.org/om</organization_model>
    <resources>
        <resource><model>Vehicle</model><maxCardinality>1</maxCardinality></resource>
        <resource><model>Payload</model><maxCardinality>2</maxCardinality></resource>
    </resources>
    <constants>
        <location id="base" x="0" y="0" z="0"/>
        <location id="outpost" radius="6371000" latitude="52.1" longitude="8.6"/>
    </constants>
    <requirements>
        <requirement id="0">
            <spatial-requirement><location><id>base</id></location></spatial-requirement>
            <temporal-requirement><from>t0</from><to>t1</to></temporal-requirement>
            <resource-requirement>
                <resource><model>Payload</model><minCardinality>1</minCardinality><maxCardinality>2</maxCardinality></resource>
            </resource-requirement>
        </requirement>
        <requirement id="1">
            <spatial-requirement><location><id>outpost</id></location></spatial-requirement>
            <temporal-requirement><from>t2</from><to>t3</to></temporal-requirement>
            <service-requirement><service>ImageProvider</service></service-requirement>
        </requirement>
    </requirements>
    <constraints>
        <temporal-constraints>
            <lessThan lval="t1" rval="t2"/>
            <lessThan lval="tX" rval="t2"/>
        </temporal-constraints>
    </constraints>
</mission>"#;

    #[test]
    fn a_full_mission_is_parsed() {
        let mission = MissionReader::from_str(MISSION).unwrap();
        assert_eq!(mission.name(), "supply-run");
        assert_eq!(mission.resources().get(&"Payload".into()), 2);
        assert_eq!(mission.location_count(), 2);
        assert_eq!(mission.persistence_conditions().len(), 3);
        // The well-formed constraint is recorded, the unknown-label one
        // is dropped.
        assert_eq!(mission.recorded_constraints().len(), 1);
    }

    #[test]
    fn unknown_constraint_elements_are_rejected() {
        let document = r#"<mission>
            <constraints><temporal-constraints>
                <before lval="t0" rval="t1"/>
            </temporal-constraints></constraints>
        </mission>"#;
        assert!(matches!(
            MissionReader::from_str(document),
            Err(PlanningError::InvalidInput(_))
        ));
    }

    #[test]
    fn duplicate_resources_are_rejected() {
        let document = r#"<mission>
            <resources>
                <resource><model>Vehicle</model><maxCardinality>1</maxCardinality></resource>
                <resource><model>Vehicle</model><maxCardinality>2</maxCardinality></resource>
            </resources>
        </mission>"#;
        assert!(matches!(
            MissionReader::from_str(document),
            Err(PlanningError::InvalidInput(_))
        ));
    }

    #[test]
    fn unknown_locations_are_rejected() {
        let document = r#"<mission>
            <requirements>
                <requirement id="0">
                    <spatial-requirement><location><id>nowhere</id></location></spatial-requirement>
                    <temporal-requirement><from>t0</from><to>t1</to></temporal-requirement>
                </requirement>
            </requirements>
        </mission>"#;
        assert!(matches!(
            MissionReader::from_str(document),
            Err(PlanningError::InvalidInput(_))
        ));
    }
}
