use crate::utils::*;

/// Which processes each process is blocked by.
///
/// > ***ATTENTION:*** this is a *single-holder heuristic*. An edge
/// > `i → j` means that even if process `j` alone released everything
/// > it holds, process `i`'s remaining need would still not fit for at
/// > least one resource type. It says nothing about what several holders
/// > releasing *together* would achieve, so it is neither a proof of
/// > circular wait nor a complete picture of one.
///
/// Every process has an entry, possibly empty. Entries and their
/// contents are kept in ascending process order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WaitForGraph(IndexMap<ProcessId, IndexSet<ProcessId>>);

impl WaitForGraph {
    /// Processes that `p` is blocked by. `None` if `p` is unknown.
    pub fn blocked_by(&self, p: ProcessId) -> Option<&IndexSet<ProcessId>> {
        self.0.get(&p)
    }

    #[inline]
    pub fn has_edge(&self, from: ProcessId, to: ProcessId) -> bool {
        self.0.get(&from)
            .map_or(false, |s| s.contains(&to))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn edge_count(&self) -> usize {
        self.0.values()
            .map(|s| s.len())
            .sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ProcessId, &IndexSet<ProcessId>)> {
        self.0.iter()
    }

    /// Looks for one cycle, depth-first, trying start nodes in ascending
    /// order. Returns the processes on it in edge order, the first one
    /// not repeated at the end.
    ///
    /// Runs over the heuristic edges, so it inherits their limitation:
    /// a returned cycle is suggestive, and the absence of one proves
    /// nothing.
    pub fn find_cycle(&self) -> Option<Vec<ProcessId>> {
        let mut visited: IndexSet<ProcessId> = IndexSet::new();
        for &start in self.0.keys() {
            if visited.contains(&start) { continue; }
            let mut path = vec![];
            if let Some(c) = self.dfs(start, &mut visited, &mut path) {
                return Some(c);
            }
        }

        None
    }

    fn dfs(
        &self,
        node:       ProcessId,
        visited:    &mut IndexSet<ProcessId>,
        path:       &mut Vec<ProcessId>,
    ) -> Option<Vec<ProcessId>> {
        visited.insert(node);
        path.push(node);
        if let Some(next) = self.0.get(&node) {
            for &n in next {
                if let Some(pos) = path.iter().position(|&x| x == n) {
                    return Some(path[pos..].to_vec());
                }
                if !visited.contains(&n) {
                    if let Some(c) = self.dfs(n, visited, path) {
                        return Some(c);
                    }
                }
            }
        }
        path.pop();

        None
    }
}

impl Snapshot {
    /// Draws `i → j` for every ordered pair `i ≠ j` unless
    /// `Need[i][k] ≤ Available[k] + Allocation[j][k]` holds for every
    /// resource `k`. See [WaitForGraph] for what this does *not* mean.
    pub fn wait_for_graph(&self) -> WaitForGraph {
        let (need, alloc, avail) = (self.need(), self.allocation(), self.available());
        let graph = (0..self.processes())
            .map(|i| {
                let blockers: IndexSet<ProcessId> = (0..self.processes())
                    .filter(|&j| j != i)
                    .filter(|&j| {
                        !need[i].iter()
                            .zip(avail.iter().zip(alloc[j].iter()))
                            .all(|(n, (a, h))| *n <= a.saturating_add(*h))
                    })
                    .collect();
                (i, blockers)
            })
            .collect::<IndexMap<_, _>>();
        let res = WaitForGraph(graph);
        debug!(processes = res.len(), edges = res.edge_count(), "wait-for graph built");

        res
    }
}
