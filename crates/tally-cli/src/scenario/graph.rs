//! Dependency graph over scenario actions, used to reject cycles before a
//! run starts. A cyclic scenario would otherwise just sit until the timeout.
//!
//! Design:
//! - Forward edges: action -> actions it starts after
//! - Three-colour DFS: a grey node reached again closes a cycle, black nodes
//!   are finished and never revisited (diamonds are not cycles)

use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Default)]
pub struct DependencyGraph<'a> {
    edges: BTreeMap<&'a str, BTreeSet<&'a str>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    Grey,
    Black,
}

impl<'a> DependencyGraph<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// `action` starts after `depends_on`.
    pub fn add_dependency(&mut self, action: &'a str, depends_on: &'a str) {
        self.edges.entry(action).or_default().insert(depends_on);
        self.edges.entry(depends_on).or_default();
    }

    pub fn dependencies(&self, action: &str) -> impl Iterator<Item = &'a str> + '_ {
        self.edges
            .get(action)
            .into_iter()
            .flat_map(|deps| deps.iter().copied())
    }

    /// First cycle found, as a path that starts and ends on the same action.
    pub fn detect_cycle(&self) -> Option<Vec<&'a str>> {
        let mut colors = HashMap::new();
        let mut path = Vec::new();
        for &start in self.edges.keys() {
            if !colors.contains_key(start)
                && let Some(cycle) = self.visit(start, &mut colors, &mut path)
            {
                return Some(cycle);
            }
        }
        None
    }

    fn visit(
        &self,
        node: &'a str,
        colors: &mut HashMap<&'a str, Color>,
        path: &mut Vec<&'a str>,
    ) -> Option<Vec<&'a str>> {
        colors.insert(node, Color::Grey);
        path.push(node);

        for dep in self.dependencies(node) {
            match colors.get(dep) {
                Some(Color::Grey) => {
                    let from = path.iter().position(|n| *n == dep).unwrap_or(0);
                    let mut cycle = path[from..].to_vec();
                    cycle.push(dep);
                    return Some(cycle);
                }
                Some(Color::Black) => {}
                None => {
                    if let Some(cycle) = self.visit(dep, colors, path) {
                        return Some(cycle);
                    }
                }
            }
        }

        path.pop();
        colors.insert(node, Color::Black);
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_has_no_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("pear", "banana");
        graph.add_dependency("apple", "pear");

        assert!(graph.detect_cycle().is_none());
        assert_eq!(graph.dependencies("pear").collect::<Vec<_>>(), vec!["banana"]);
    }

    #[test]
    fn simple_cycle_is_reported_as_closed_path() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "b");
        graph.add_dependency("b", "a");

        let cycle = graph.detect_cycle().unwrap();
        assert_eq!(cycle.first(), cycle.last());
        assert_eq!(cycle.len(), 3);
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut graph = DependencyGraph::new();
        graph.add_dependency("a", "a");

        assert_eq!(graph.detect_cycle(), Some(vec!["a", "a"]));
    }

    #[test]
    fn longer_cycle_excludes_entry_path() {
        let mut graph = DependencyGraph::new();
        // a -> b -> c -> d -> b
        graph.add_dependency("a", "b");
        graph.add_dependency("b", "c");
        graph.add_dependency("c", "d");
        graph.add_dependency("d", "b");

        let cycle = graph.detect_cycle().unwrap();
        assert_eq!(cycle, vec!["b", "c", "d", "b"]);
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let mut graph = DependencyGraph::new();
        //     a
        //    / \
        //   b   c
        //    \ /
        //     d
        graph.add_dependency("b", "a");
        graph.add_dependency("c", "a");
        graph.add_dependency("d", "b");
        graph.add_dependency("d", "c");

        assert!(graph.detect_cycle().is_none());
    }
}
