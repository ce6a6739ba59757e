// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use crate::{
    error::ReportError,
    incumbent::{RecordKind, Schedule},
    tree::{Branch, SearchTree},
};
use std::{fmt::Write as _, path::Path};

/// Renders the search tree as a Graphviz DOT digraph.
///
/// Each node shows its key, its true noncoverage and its estimate. Assign
/// edges are solid and labelled `S<k> @ P<i>`, forbid edges dashed and
/// labelled `S<k> !@ P<i>`.
/// Infeasible nodes are red, bound-pruned and dead-end nodes grey, and
/// record nodes green (`Optimal`) or gold (`Feasible`).
pub fn render_dot(tree: &SearchTree, schedule: &Schedule) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_graph(&mut out, tree, schedule);
    out
}

fn write_graph(out: &mut String, tree: &SearchTree, schedule: &Schedule) -> std::fmt::Result {
    writeln!(out, "digraph search_tree {{")?;
    writeln!(out, "    node [shape=box, fontname=\"monospace\"];")?;

    for node in tree.nodes() {
        let key = node.key();
        let fill = if schedule.infeasible_keys().contains(&key) {
            Some("salmon")
        } else {
            match schedule.record_for(key).map(|r| r.kind) {
                Some(RecordKind::Optimal) => Some("palegreen"),
                Some(RecordKind::Feasible) => Some("gold"),
                None if node.is_closed() => Some("lightgrey"),
                None => None,
            }
        };

        write!(
            out,
            "    n{} [label=\"{}\\nnoncoverage {:.3}\\nestimate {:.3}\"",
            key.get(),
            key,
            node.noncoverage().total(),
            node.estimate()
        )?;
        if let Some(color) = fill {
            write!(out, ", style=filled, fillcolor={}", color)?;
        }
        writeln!(out, "];")?;

        if let (Some(parent), Some(decision)) = (node.parent(), node.decision()) {
            let style = match decision.branch {
                Branch::Assign => "solid",
                Branch::Forbid => "dashed",
            };
            writeln!(
                out,
                "    n{} -> n{} [label=\"{}\", style={}];",
                parent.get(),
                key.get(),
                decision,
                style
            )?;
        }
    }

    writeln!(out, "}}")
}

/// Writes `render_dot` output to `path`.
pub fn write_dot<P>(tree: &SearchTree, schedule: &Schedule, path: P) -> Result<(), ReportError>
where
    P: AsRef<Path>,
{
    let path = path.as_ref();
    std::fs::write(path, render_dot(tree, schedule)).map_err(|source| ReportError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::info!(path = %path.display(), nodes = tree.len(), "search tree written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{bnb::BnbSolver, bound::trivial::TrivialBound, config::SearchConfig, monitor::no_op::NoOpMonitor};
    use tandem_model::{index::StationIndex, model::ModelBuilder};

    #[test]
    fn test_dot_marks_records_and_edges() {
        let mut builder = ModelBuilder::new(2, 1);
        builder
            .set_placement_coordinates(&[0.0, 10.0])
            .set_gateways(-5.0, 15.0)
            .set_uniform_link_range(20.0)
            .set_station_coverage(StationIndex::new(0), 5.0);
        let model = builder.build().expect("model should be valid");
        let outcome = BnbSolver::new()
            .solve(&model, &SearchConfig::default(), &mut TrivialBound::new(), NoOpMonitor::new())
            .expect("search should start");

        let dot = render_dot(outcome.tree(), outcome.schedule());
        assert!(dot.starts_with("digraph search_tree {"));
        assert!(dot.trim_end().ends_with('}'));
        assert!(dot.contains("n0 -> n1 [label=\"S1 @ P1\", style=solid]"));
        assert!(dot.contains("n0 -> n2 [label=\"S1 !@ P1\", style=dashed]"));
        assert!(dot.contains("fillcolor=palegreen"));
        assert_eq!(dot.matches("->").count(), outcome.tree().len() - 1);
    }
}
