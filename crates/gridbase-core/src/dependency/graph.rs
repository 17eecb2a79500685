use crate::{
    dependency::{CycleDetected, CycleRejected},
    model::FieldMap,
    obs::sink::{self, MetricsEvent},
};
use derive_more::Deref;
use std::collections::{BTreeMap, BTreeSet};

///
/// ProposedEdge
///
/// `from` would start reading `to`.
///

#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ProposedEdge {
    pub from: String,
    pub to: String,
}

impl ProposedEdge {
    #[must_use]
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

///
/// DependencyGraph
///
/// `computed column -> direct upstream columns`, keyed by physical column
/// name. Engines borrow a snapshot; the field-definition subsystem owns it.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct DependencyGraph(BTreeMap<String, BTreeSet<String>>);

impl DependencyGraph {
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Build the graph from every computed field's declared upstreams.
    #[must_use]
    pub fn from_fields(fields: &FieldMap) -> Self {
        fields
            .computed_fields()
            .map(|(field, computed)| {
                let upstreams = computed.upstream_columns.iter().cloned().collect();

                (field.db_column_name.clone(), upstreams)
            })
            .collect()
    }

    /// Replace the upstream set of one computed column.
    pub fn insert<I, S>(&mut self, column: impl Into<String>, upstreams: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.0
            .insert(column.into(), upstreams.into_iter().map(Into::into).collect());
    }

    #[must_use]
    pub fn upstreams(&self, column: &str) -> Option<&BTreeSet<String>> {
        self.0.get(column)
    }

    /// Every computed column that (transitively) reads any changed column.
    ///
    /// Reverse-edge depth-first walk; each column is expanded at most once,
    /// so cyclic input terminates.
    #[must_use]
    pub fn transitive_dependents<I, S>(&self, changed: I) -> BTreeSet<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let reverse = self.reverse_edges();
        let mut found = BTreeSet::new();
        let mut expanded = BTreeSet::new();
        let mut stack: Vec<String> = changed
            .into_iter()
            .map(|column| column.as_ref().to_string())
            .collect();

        while let Some(column) = stack.pop() {
            if !expanded.insert(column.clone()) {
                continue;
            }

            for dependent in reverse.get(column.as_str()).into_iter().flatten() {
                if found.insert((*dependent).to_string()) {
                    stack.push((*dependent).to_string());
                }
            }
        }

        found
    }

    /// Deterministic global execution order over the computed columns.
    ///
    /// Kahn's algorithm with a lexicographic ready set; upstreams that are
    /// not themselves computed are treated as sources.
    pub fn topological_order(&self) -> Result<Vec<String>, CycleDetected> {
        let reverse = self.reverse_edges();
        let mut pending: BTreeMap<&str, usize> = self
            .0
            .iter()
            .map(|(column, upstreams)| {
                let computed = upstreams
                    .iter()
                    .filter(|upstream| self.0.contains_key(upstream.as_str()))
                    .count();
                (column.as_str(), computed)
            })
            .collect();

        let mut ready: BTreeSet<&str> = pending
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(column, _)| *column)
            .collect();
        let mut order = Vec::with_capacity(self.0.len());

        while let Some(column) = ready.pop_first() {
            pending.remove(column);
            order.push(column.to_string());

            for dependent in reverse.get(column).into_iter().flatten() {
                if let Some(count) = pending.get_mut(dependent) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*dependent);
                    }
                }
            }
        }

        if pending.is_empty() {
            Ok(order)
        } else {
            Err(CycleDetected {
                columns: pending.keys().map(|column| (*column).to_string()).collect(),
            })
        }
    }

    /// Whether adding `edge` would close a loop: true when `edge.to`
    /// already reaches `edge.from` through existing upstream edges.
    #[must_use]
    pub fn would_introduce_cycle(&self, edge: &ProposedEdge) -> bool {
        self.path_between(&edge.to, &edge.from).is_some()
    }

    /// Validating form of [`Self::would_introduce_cycle`].
    pub fn validate_edge(&self, edge: &ProposedEdge) -> Result<(), CycleRejected> {
        let Some(loop_back) = self.path_between(&edge.to, &edge.from) else {
            return Ok(());
        };

        let mut path = Vec::with_capacity(loop_back.len() + 1);
        path.push(edge.from.clone());
        path.extend(loop_back);

        sink::record(MetricsEvent::CycleRejected);
        tracing::debug!(from = %edge.from, to = %edge.to, "dependency edge rejected");

        Err(CycleRejected {
            from: edge.from.clone(),
            to: edge.to.clone(),
            path,
        })
    }

    /// Validate a whole proposed upstream set for `column`. Edges are
    /// checked in lexicographic order; the first loop found is reported.
    pub fn validate_upstreams<I, S>(&self, column: &str, upstreams: I) -> Result<(), CycleRejected>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let targets: BTreeSet<String> = upstreams
            .into_iter()
            .map(|upstream| upstream.as_ref().to_string())
            .collect();

        for target in targets {
            self.validate_edge(&ProposedEdge::new(column, target))?;
        }

        Ok(())
    }

    // upstream -> computed columns reading it
    fn reverse_edges(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut reverse: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for (column, upstreams) in &self.0 {
            for upstream in upstreams {
                reverse
                    .entry(upstream.as_str())
                    .or_default()
                    .insert(column.as_str());
            }
        }

        reverse
    }

    // Upstream-direction path `start -> .. -> goal`, inclusive of both ends.
    fn path_between(&self, start: &str, goal: &str) -> Option<Vec<String>> {
        let mut parents: BTreeMap<&str, &str> = BTreeMap::new();
        let mut visited: BTreeSet<&str> = BTreeSet::from([start]);
        let mut stack = vec![start];

        while let Some(column) = stack.pop() {
            if column == goal {
                let mut path = vec![column.to_string()];
                let mut cursor = column;
                while let Some(parent) = parents.get(cursor) {
                    path.push((*parent).to_string());
                    cursor = *parent;
                }
                path.reverse();

                return Some(path);
            }

            for upstream in self.0.get(column).into_iter().flatten() {
                if visited.insert(upstream.as_str()) {
                    parents.insert(upstream.as_str(), column);
                    stack.push(upstream.as_str());
                }
            }
        }

        None
    }
}

impl FromIterator<(String, BTreeSet<String>)> for DependencyGraph {
    fn from_iter<I: IntoIterator<Item = (String, BTreeSet<String>)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
