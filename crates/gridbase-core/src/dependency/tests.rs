use crate::{
    dependency::{CycleDetected, DependencyGraph, ProposedEdge, execution_order},
    model::{ComputedSpec, Field, FieldMap, FieldType},
};
use proptest::prelude::*;
use std::collections::BTreeSet;

// a = b + 1, b = c * 2
fn chain() -> DependencyGraph {
    let mut graph = DependencyGraph::new();
    graph.insert("a", ["b"]);
    graph.insert("b", ["c"]);
    graph
}

fn set(columns: &[&str]) -> BTreeSet<String> {
    columns.iter().map(|column| (*column).to_string()).collect()
}

#[test]
fn transitive_dependents_follow_reverse_edges() {
    let graph = chain();

    assert_eq!(graph.transitive_dependents(["c"]), set(&["a", "b"]));
    assert_eq!(graph.transitive_dependents(["b"]), set(&["a"]));
    assert!(graph.transitive_dependents(["a"]).is_empty());
    assert!(graph.transitive_dependents(["unrelated"]).is_empty());
}

#[test]
fn transitive_dependents_terminate_on_cycles() {
    let mut graph = DependencyGraph::new();
    graph.insert("x", ["y"]);
    graph.insert("y", ["x"]);

    assert_eq!(graph.transitive_dependents(["x"]), set(&["x", "y"]));
}

#[test]
fn execution_order_preserves_global_order() {
    let global = vec!["b".to_string(), "d".to_string(), "a".to_string()];

    assert_eq!(execution_order(&global, &set(&["a", "b"])), vec!["b", "a"]);
    assert!(execution_order(&global, &BTreeSet::new()).is_empty());
}

#[test]
fn execution_order_appends_columns_missing_from_global_order() {
    let global = vec!["b".to_string()];

    assert_eq!(
        execution_order(&global, &set(&["z", "b", "m"])),
        vec!["b", "m", "z"]
    );
}

#[test]
fn topological_order_is_deterministic_and_respects_edges() {
    let mut graph = chain();
    graph.insert("d", ["c"]);
    graph.insert("e", ["a", "d"]);

    let order = graph.topological_order().expect("acyclic graph should order");
    assert_eq!(order, vec!["b", "a", "d", "e"]);
}

#[test]
fn topological_order_reports_cycle_members() {
    let mut graph = chain();
    graph.insert("c", ["a"]);
    graph.insert("free", ["input"]);

    let err = graph
        .topological_order()
        .expect_err("cyclic graph should not order");
    assert_eq!(
        err,
        CycleDetected {
            columns: vec!["a".into(), "b".into(), "c".into()],
        }
    );
}

#[test]
fn would_introduce_cycle_detects_transitive_loops() {
    let graph = chain();

    // c -> a closes c <- b <- a
    assert!(graph.would_introduce_cycle(&ProposedEdge::new("c", "a")));
    assert!(graph.would_introduce_cycle(&ProposedEdge::new("b", "a")));
    assert!(graph.would_introduce_cycle(&ProposedEdge::new("a", "a")));
    assert!(!graph.would_introduce_cycle(&ProposedEdge::new("a", "c")));
    assert!(!graph.would_introduce_cycle(&ProposedEdge::new("d", "a")));
}

#[test]
fn validate_edge_reports_the_loop_path() {
    let graph = chain();

    let err = graph
        .validate_edge(&ProposedEdge::new("c", "a"))
        .expect_err("edge closing a loop should be rejected");
    assert_eq!(err.from, "c");
    assert_eq!(err.to, "a");
    assert_eq!(err.path, vec!["c", "a", "b", "c"]);
    assert!(err.to_string().contains("c -> a -> b -> c"));
}

#[test]
fn validate_upstreams_checks_every_proposed_edge() {
    let graph = chain();

    assert!(graph.validate_upstreams("c", ["input", "other"]).is_ok());
    let err = graph
        .validate_upstreams("c", ["input", "a"])
        .expect_err("one looping upstream should reject the set");
    assert_eq!(err.to, "a");
}

#[test]
fn from_fields_uses_computed_upstreams_only() {
    let fields: FieldMap = [
        Field::new("fldC", "c", FieldType::Number),
        Field::new("fldB", "b", FieldType::Formula)
            .with_computed(ComputedSpec::new("{fldC} * 2", ["c"])),
        Field::new("fldA", "a", FieldType::Formula)
            .with_computed(ComputedSpec::new("{fldB} + 1", ["b"])),
    ]
    .into_iter()
    .collect();

    let graph = DependencyGraph::from_fields(&fields);
    assert_eq!(graph, chain());
    assert_eq!(graph.upstreams("a"), Some(&set(&["b"])));
    assert_eq!(graph.upstreams("c"), None);
}

// Random DAG: column i may only read columns with a smaller index.
fn dag_strategy() -> impl Strategy<Value = DependencyGraph> {
    prop::collection::vec(prop::collection::btree_set(0usize..12, 0..4), 1..12).prop_map(
        |rows| {
            let mut graph = DependencyGraph::new();
            for (index, reads) in rows.into_iter().enumerate() {
                let upstreams: Vec<String> = reads
                    .into_iter()
                    .filter(|read| *read < index)
                    .map(|read| format!("c{read:02}"))
                    .collect();
                graph.insert(format!("c{index:02}"), upstreams);
            }
            graph
        },
    )
}

proptest! {
    #[test]
    fn topological_order_places_upstreams_first(graph in dag_strategy()) {
        let order = graph.topological_order().expect("generated graph is acyclic");
        prop_assert_eq!(order.len(), graph.len());

        let position = |column: &str| order.iter().position(|c| c == column);
        for (column, upstreams) in graph.iter() {
            for upstream in upstreams {
                prop_assert!(position(upstream.as_str()) < position(column.as_str()));
            }
        }
    }

    #[test]
    fn accepted_edges_never_create_cycles(graph in dag_strategy(), from in 0usize..12, to in 0usize..12) {
        let from = format!("c{from:02}");
        let to = format!("c{to:02}");
        let edge = ProposedEdge::new(from.clone(), to.clone());

        if !graph.would_introduce_cycle(&edge) {
            let mut extended = graph.clone();
            let mut upstreams: Vec<String> =
                extended.upstreams(&from).into_iter().flatten().cloned().collect();
            upstreams.push(to);
            extended.insert(from, upstreams);

            prop_assert!(extended.topological_order().is_ok());
        }
    }
}
