use petgraph::visit::EdgeRef;
use std::collections::BTreeMap;
use std::fmt::Write;

use super::DependencyGraph;

/// Quote-safe form of an id for use inside a DOT string
fn escape(id: &str) -> String {
    id.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Render the graph as Graphviz DOT, one cluster per namespace
pub fn to_dot(graph: &DependencyGraph) -> String {
    let mut output = String::new();
    output.push_str("digraph ArtifactDependencies {\n");
    output.push_str("  rankdir=LR;\n");
    output.push_str("  nodesep=0.8;\n");
    output.push_str("  ranksep=1.2;\n");
    output.push_str("  node [shape=box, style=\"rounded\", fontname=\"Arial\"];\n");
    output.push_str("  edge [fontname=\"Arial\"];\n");
    output.push('\n');

    // Group by namespace
    let internal_graph = graph.graph();
    let mut namespaces: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    let mut loose = Vec::new();

    for node_idx in internal_graph.node_indices() {
        let id = internal_graph[node_idx].as_str();
        match id.split_once('/') {
            Some((namespace, _)) => namespaces.entry(namespace).or_default().push(id),
            None => loose.push(id),
        }
    }

    for (namespace, mut ids) in namespaces {
        ids.sort();
        let namespace = escape(namespace);
        let _ = writeln!(output, "  subgraph \"cluster_{namespace}\" {{");
        let _ = writeln!(output, "    label=\"{namespace}\";");
        output.push_str("    style=\"rounded\";\n");

        for id in ids {
            let short_name = id.split_once('/').map_or(id, |(_, name)| name);
            let _ = writeln!(
                output,
                "    \"{}\" [label=\"{}\"];",
                escape(id),
                escape(short_name)
            );
        }

        output.push_str("  }\n\n");
    }

    loose.sort();
    for id in loose {
        let _ = writeln!(output, "  \"{}\";", escape(id));
    }

    // Add edges
    let mut edges: Vec<(&str, &str)> = internal_graph
        .edge_references()
        .map(|edge| {
            (
                internal_graph[edge.source()].as_str(),
                internal_graph[edge.target()].as_str(),
            )
        })
        .collect();
    edges.sort();
    for (source, target) in edges {
        let _ = writeln!(output, "  \"{}\" -> \"{}\";", escape(source), escape(target));
    }

    output.push_str("}\n");
    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_groups_by_namespace() {
        let mut graph = DependencyGraph::new();
        graph.add_artifact("com.example/app", &["app".to_string()]);
        graph.add_dependency("com.example/app", "com.example/lib");
        graph.add_dependency("com.example/app", "standalone");

        let dot = to_dot(&graph);
        assert!(dot.starts_with("digraph ArtifactDependencies {"));
        assert!(dot.contains("subgraph \"cluster_com.example\""));
        assert!(dot.contains("\"com.example/app\" [label=\"app\"];"));
        assert!(dot.contains("  \"standalone\";"));
        assert!(dot.contains("\"com.example/app\" -> \"com.example/lib\";"));
        assert!(dot.ends_with("}\n"));
    }

    #[test]
    fn test_dot_escapes_quotes_and_backslashes() {
        let mut graph = DependencyGraph::new();
        graph.add_artifact("app", &[]);
        graph.add_dependency("app", "we\"ird\\name");

        let dot = to_dot(&graph);
        assert!(dot.contains(r#"  "we\"ird\\name";"#));
        assert!(dot.contains(r#"  "app" -> "we\"ird\\name";"#));
        assert!(!dot.contains(r#""we"ird"#));
    }
}
