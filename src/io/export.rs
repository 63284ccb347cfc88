use std::fmt::Write as _;

use petgraph::visit::EdgeRef;
use petgraph::visit::IntoEdgeReferences;

use crate::io::xml;
use crate::io::xml::XmlElement;
use crate::network::ASSIGNED_TAG;
use crate::solvers::Solution;

/// Renders the solved space-time network as a Graphviz document, laid out
/// on the `{location, timepoint}` grid.
pub fn write_dot(solution: &Solution) -> String {
    let network = solution.network();
    let mut out = String::from("digraph transport_network {\n");
    out.push_str("    rankdir=TB;\n    node [shape=box];\n");

    for node in network.graph().node_indices() {
        let tuple = &network.graph()[node];
        let label = format!(
            "{}-{}",
            solution.location_name(tuple.location),
            solution.timepoint_label(tuple.timepoint)
        );
        let roles = tuple
            .info
            .roles(ASSIGNED_TAG)
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\\n");
        let column = network.column(node) as f64 * 3.0;
        let row = network.row(node) as f64 * 2.0;
        let _ = writeln!(
            out,
            "    n{} [label=\"{label}\\n{roles}\" pos=\"{column},{row}!\"];",
            node.index()
        );
    }

    for edge in network.graph().edge_references() {
        let style = if network.graph()[edge.id()].is_local_transition() {
            "dotted"
        } else {
            "solid"
        };
        let _ = writeln!(
            out,
            "    n{} -> n{} [style={style}];",
            edge.source().index(),
            edge.target().index()
        );
    }

    out.push_str("}\n");
    out
}

/// Renders the solved space-time network as a GEXF 1.2 document.
pub fn write_gexf(solution: &Solution) -> String {
    let network = solution.network();

    let mut gexf = XmlElement::new("gexf");
    gexf.set_attribute("xmlns", "http://www.gexf.net/1.2draft");
    gexf.set_attribute("version", "1.2");

    let mut graph = XmlElement::new("graph");
    graph.set_attribute("defaultedgetype", "directed");

    let mut nodes = XmlElement::new("nodes");
    for node in network.graph().node_indices() {
        let tuple = &network.graph()[node];
        let mut element = XmlElement::new("node");
        element.set_attribute("id", node.index().to_string());
        let roles = tuple
            .info
            .all_roles()
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        element.set_attribute(
            "label",
            format!(
                "{}-{} [{roles}]",
                solution.location_name(tuple.location),
                solution.timepoint_label(tuple.timepoint)
            ),
        );
        nodes.push(element);
    }
    graph.push(nodes);

    let mut edges = XmlElement::new("edges");
    for (index, edge) in network.graph().edge_references().enumerate() {
        let mut element = XmlElement::new("edge");
        element.set_attribute("id", index.to_string());
        element.set_attribute("source", edge.source().index().to_string());
        element.set_attribute("target", edge.target().index().to_string());
        edges.push(element);
    }
    graph.push(edges);

    gexf.push(graph);
    xml::write(&gexf)
}

/// Renders the assignments of a solution as an XML document.
pub fn write_solution_xml(solution: &Solution) -> String {
    let mut root = XmlElement::new("solution");

    let mut requirements = XmlElement::new("assignments");
    for (index, (pool, roles)) in solution
        .model_distribution()
        .iter()
        .zip(solution.role_distribution())
        .enumerate()
    {
        let mut requirement = XmlElement::new("requirement");
        requirement.set_attribute("id", index.to_string());
        for (model, count) in pool.iter() {
            let mut element = XmlElement::new("model");
            element.set_attribute("iri", model.as_str());
            element.set_attribute("count", count.to_string());
            requirement.push(element);
        }
        for role in roles {
            requirement.push(XmlElement::with_text("role", role.to_string()));
        }
        requirements.push(requirement);
    }
    root.push(requirements);

    let mut timelines = XmlElement::new("timelines");
    for timeline in solution.timelines() {
        let mut element = XmlElement::new("timeline");
        element.set_attribute("role", timeline.role().to_string());
        for &(location, timepoint) in timeline.waypoints() {
            let mut waypoint = XmlElement::new("waypoint");
            waypoint.set_attribute("location", solution.location_name(location));
            waypoint.set_attribute("timepoint", solution.timepoint_label(timepoint));
            element.push(waypoint);
        }
        timelines.push(element);
    }
    root.push(timelines);

    let mut flaws = XmlElement::new("flaws");
    for flaw in solution.flaws() {
        flaws.push(XmlElement::with_text("flaw", flaw.to_string()));
    }
    root.push(flaws);

    xml::write(&root)
}
