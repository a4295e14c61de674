//! Shortest-path search over the lane graph.

use std::collections::BTreeSet;
use std::sync::Arc;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::address::{
    Direction, LaneAddress, LaneKind, LocationAddress, SiteLaneAddress, WordLaneAddress,
};
use crate::arch::ArchSpec;

/// One lane traversal within a [`Path`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathSegment {
    /// The lane being travelled.
    pub lane: LaneAddress,
    /// Where the atom starts.
    pub src: LocationAddress,
    /// Where the atom ends up.
    pub dst: LocationAddress,
}

/// A sequence of lanes leading from one site to another.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Path {
    /// Where the path starts.
    pub start: LocationAddress,
    /// The lanes in traversal order.
    pub segments: Vec<PathSegment>,
}

impl Path {
    /// A path that does not move.
    pub fn empty(start: LocationAddress) -> Self {
        Self {
            start,
            segments: Vec::new(),
        }
    }

    /// The starting site.
    #[inline]
    pub fn src(&self) -> LocationAddress {
        self.start
    }

    /// The final site.
    pub fn dst(&self) -> LocationAddress {
        self.segments.last().map_or(self.start, |seg| seg.dst)
    }

    /// Number of lanes.
    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Check if the path has no lanes.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Lanes in traversal order.
    pub fn lanes(&self) -> Vec<LaneAddress> {
        self.segments.iter().map(|seg| seg.lane).collect()
    }

    /// Visited sites, starting with [`src`](Self::src).
    pub fn locations(&self) -> Vec<LocationAddress> {
        std::iter::once(self.start)
            .chain(self.segments.iter().map(|seg| seg.dst))
            .collect()
    }
}

/// Scores candidate paths; the lowest score wins.
pub trait PathHeuristic {
    /// Score a path given its visited sites and its lanes.
    fn score(&self, locations: &[LocationAddress], lanes: &[LaneAddress]) -> f64;

    /// Record the lanes of a path that was accepted.
    ///
    /// Stateful heuristics use this to steer later queries of the same
    /// layer. The default ignores it.
    fn commit(&mut self, _lanes: &[LaneAddress]) {}
}

impl<F> PathHeuristic for F
where
    F: Fn(&[LocationAddress], &[LaneAddress]) -> f64,
{
    fn score(&self, locations: &[LocationAddress], lanes: &[LaneAddress]) -> f64 {
        self(locations, lanes)
    }
}

/// Scores every path as zero, so the first enumerated path wins.
#[derive(Debug, Clone, Copy, Default)]
pub struct ZeroHeuristic;

impl PathHeuristic for ZeroHeuristic {
    fn score(&self, _locations: &[LocationAddress], _lanes: &[LaneAddress]) -> f64 {
        0.0
    }
}

/// Prefers lanes on a bus and direction that are already in use.
///
/// Lanes sharing `(kind, bus, direction)` can run in the same step, so
/// reusing a committed signature tends to produce fewer move layers.
#[derive(Debug, Clone, Default)]
pub struct BusReuseHeuristic {
    committed: BTreeSet<(LaneKind, u32, Direction)>,
}

impl BusReuseHeuristic {
    /// Create a heuristic with nothing committed.
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget all committed signatures.
    pub fn clear(&mut self) {
        self.committed.clear();
    }
}

impl PathHeuristic for BusReuseHeuristic {
    #[allow(clippy::cast_precision_loss)]
    fn score(&self, _locations: &[LocationAddress], lanes: &[LaneAddress]) -> f64 {
        lanes
            .iter()
            .filter(|lane| !self.committed.contains(&lane.signature()))
            .count() as f64
    }

    fn commit(&mut self, lanes: &[LaneAddress]) {
        self.committed.extend(lanes.iter().map(LaneAddress::signature));
    }
}

/// Graph of sites connected by lanes, with shortest-path queries.
///
/// Built once per architecture and shared behind an [`Arc`].
#[derive(Debug, Clone)]
pub struct PathFinder {
    arch: Arc<ArchSpec>,
    graph: DiGraph<LocationAddress, LaneAddress>,
    nodes: FxHashMap<LocationAddress, NodeIndex>,
    lanes: FxHashMap<LaneAddress, EdgeIndex>,
}

impl PathFinder {
    /// Build the lane graph of an architecture.
    pub fn new(arch: Arc<ArchSpec>) -> Self {
        let mut graph = DiGraph::new();
        let mut nodes = FxHashMap::default();
        for location in arch.locations() {
            nodes.insert(location, graph.add_node(location));
        }

        let mut lanes = FxHashMap::default();
        let mut add_lane = |lane: LaneAddress, src: LocationAddress, dst: LocationAddress| {
            if let (Some(&a), Some(&b)) = (nodes.get(&src), nodes.get(&dst)) {
                lanes.insert(lane, graph.add_edge(a, b, lane));
                lanes.insert(lane.reverse(), graph.add_edge(b, a, lane.reverse()));
            }
        };

        for word_id in arch.site_bus_words() {
            for (bus_id, bus) in (0u32..).zip(arch.site_buses()) {
                for (src, dst) in bus.pairs() {
                    let lane = SiteLaneAddress::new(word_id, src, bus_id, Direction::Forward);
                    add_lane(
                        lane.into(),
                        LocationAddress::new(word_id, src),
                        LocationAddress::new(word_id, dst),
                    );
                }
            }
        }
        for (bus_id, bus) in (0u32..).zip(arch.word_buses()) {
            for (src, dst) in bus.pairs() {
                for site_id in arch.word_bus_sites() {
                    let lane = WordLaneAddress::new(src, site_id, bus_id, Direction::Forward);
                    add_lane(
                        lane.into(),
                        LocationAddress::new(src, site_id),
                        LocationAddress::new(dst, site_id),
                    );
                }
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built lane graph"
        );

        Self {
            arch,
            graph,
            nodes,
            lanes,
        }
    }

    /// The architecture this graph was built from.
    pub fn arch(&self) -> &Arc<ArchSpec> {
        &self.arch
    }

    /// Number of directed lanes in the graph.
    pub fn num_lanes(&self) -> usize {
        self.graph.edge_count()
    }

    /// Start and end site of a lane, or `None` if the lane does not exist.
    pub fn lane_endpoints(&self, lane: &LaneAddress) -> Option<(LocationAddress, LocationAddress)> {
        let edge = *self.lanes.get(lane)?;
        let (a, b) = self.graph.edge_endpoints(edge)?;
        Some((self.graph[a], self.graph[b]))
    }

    /// Outgoing lanes of a node, in insertion order.
    fn outgoing(&self, node: NodeIndex) -> Vec<(EdgeIndex, NodeIndex)> {
        let mut edges: Vec<_> = self
            .graph
            .edges(node)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        edges.sort_unstable_by_key(|&(id, _)| id);
        edges
    }

    /// Every path from `start` to `end` with the fewest lanes.
    ///
    /// Sites in `occupied` cannot be entered. Paths are returned in a
    /// deterministic order derived from lane insertion order.
    pub fn all_shortest_paths(
        &self,
        start: LocationAddress,
        end: LocationAddress,
        occupied: &BTreeSet<LocationAddress>,
    ) -> Vec<Path> {
        if occupied.contains(&start) || occupied.contains(&end) {
            return Vec::new();
        }
        let (Some(&source), Some(&target)) = (self.nodes.get(&start), self.nodes.get(&end)) else {
            return Vec::new();
        };
        if source == target {
            return vec![Path::empty(start)];
        }

        let mut depth: FxHashMap<NodeIndex, usize> = FxHashMap::default();
        let mut preds: FxHashMap<NodeIndex, Vec<EdgeIndex>> = FxHashMap::default();
        depth.insert(source, 0);
        let mut frontier = vec![source];
        let mut level = 0;

        while !frontier.is_empty() && !depth.contains_key(&target) {
            level += 1;
            let mut next = Vec::new();
            for &node in &frontier {
                for (edge, succ) in self.outgoing(node) {
                    if occupied.contains(&self.graph[succ]) {
                        continue;
                    }
                    match depth.get(&succ) {
                        None => {
                            depth.insert(succ, level);
                            preds.entry(succ).or_default().push(edge);
                            next.push(succ);
                        }
                        Some(&d) if d == level => {
                            preds.entry(succ).or_default().push(edge);
                        }
                        Some(_) => {}
                    }
                }
            }
            frontier = next;
        }

        if !depth.contains_key(&target) {
            return Vec::new();
        }

        self.enumerate(source, target, &preds)
            .into_iter()
            .map(|edges| self.to_path(start, &edges))
            .collect()
    }

    fn enumerate(
        &self,
        source: NodeIndex,
        node: NodeIndex,
        preds: &FxHashMap<NodeIndex, Vec<EdgeIndex>>,
    ) -> Vec<Vec<EdgeIndex>> {
        if node == source {
            return vec![Vec::new()];
        }
        let Some(incoming) = preds.get(&node) else {
            return Vec::new();
        };
        let mut paths = Vec::new();
        for &edge in incoming {
            let Some((prev, _)) = self.graph.edge_endpoints(edge) else {
                continue;
            };
            for mut prefix in self.enumerate(source, prev, preds) {
                prefix.push(edge);
                paths.push(prefix);
            }
        }
        paths
    }

    fn to_path(&self, start: LocationAddress, edges: &[EdgeIndex]) -> Path {
        let segments = edges
            .iter()
            .filter_map(|&edge| {
                let (a, b) = self.graph.edge_endpoints(edge)?;
                Some(PathSegment {
                    lane: self.graph[edge],
                    src: self.graph[a],
                    dst: self.graph[b],
                })
            })
            .collect();
        Path { start, segments }
    }

    /// The best shortest path from `start` to `end` avoiding `occupied`.
    ///
    /// Among all shortest paths the one with the lowest heuristic score is
    /// returned; ties keep the earliest enumerated path.
    pub fn find_path(
        &self,
        start: LocationAddress,
        end: LocationAddress,
        occupied: &BTreeSet<LocationAddress>,
        heuristic: &dyn PathHeuristic,
    ) -> Option<Path> {
        let candidates = self.all_shortest_paths(start, end, occupied);
        let mut best: Option<(f64, Path)> = None;
        for path in candidates {
            let score = heuristic.score(&path.locations(), &path.lanes());
            if best.as_ref().is_none_or(|(s, _)| score < *s) {
                best = Some((score, path));
            }
        }
        debug!(
            %start,
            %end,
            found = best.is_some(),
            lanes = best.as_ref().map_or(0, |(_, p)| p.len()),
            "Path query"
        );
        best.map(|(_, path)| path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::presets;

    fn finder() -> PathFinder {
        PathFinder::new(Arc::new(presets::logical().unwrap()))
    }

    #[test]
    fn test_graph_has_both_directions() {
        let pf = finder();
        // 2 words * 5 buses * 5 pairs + 1 word bus * 5 sites, each both ways
        assert_eq!(pf.num_lanes(), 2 * (2 * 5 * 5 + 5));

        let lane: LaneAddress = SiteLaneAddress::new(0, 0, 0, Direction::Forward).into();
        assert_eq!(
            pf.lane_endpoints(&lane.reverse()),
            Some((LocationAddress::new(0, 5), LocationAddress::new(0, 0)))
        );
    }

    #[test]
    fn test_single_hop() {
        let pf = finder();
        let path = pf
            .find_path(
                LocationAddress::new(0, 0),
                LocationAddress::new(0, 5),
                &BTreeSet::new(),
                &ZeroHeuristic,
            )
            .unwrap();
        assert_eq!(path.len(), 1);
        assert_eq!(path.dst(), LocationAddress::new(0, 5));
    }

    #[test]
    fn test_start_equals_end() {
        let pf = finder();
        let loc = LocationAddress::new(1, 3);
        let path = pf
            .find_path(loc, loc, &BTreeSet::new(), &ZeroHeuristic)
            .unwrap();
        assert!(path.is_empty());
        assert_eq!(path.dst(), loc);
    }

    #[test]
    fn test_occupied_endpoint_has_no_path() {
        let pf = finder();
        let start = LocationAddress::new(0, 0);
        let end = LocationAddress::new(0, 5);
        let occupied = BTreeSet::from([end]);
        assert!(pf.find_path(start, end, &occupied, &ZeroHeuristic).is_none());
    }

    #[test]
    fn test_blocked_route_has_no_path() {
        let pf = finder();
        // Word lanes exist only on right-hand sites, so (0, 0) -> (1, 0)
        // must pass through some right-hand site of word 0 and word 1.
        let occupied: BTreeSet<_> = (5..10)
            .map(|s| LocationAddress::new(0, s))
            .collect();
        assert!(
            pf.find_path(
                LocationAddress::new(0, 0),
                LocationAddress::new(1, 0),
                &occupied,
                &ZeroHeuristic
            )
            .is_none()
        );
    }

    #[test]
    fn test_all_shortest_paths_have_equal_length() {
        let pf = finder();
        let paths = pf.all_shortest_paths(
            LocationAddress::new(0, 0),
            LocationAddress::new(1, 0),
            &BTreeSet::new(),
        );
        assert_eq!(paths.len(), 5);
        assert!(paths.iter().all(|p| p.len() == 3));
    }

    #[test]
    fn test_heuristic_breaks_ties() {
        let pf = finder();
        let start = LocationAddress::new(0, 0);
        let end = LocationAddress::new(1, 0);

        let first = pf
            .find_path(start, end, &BTreeSet::new(), &ZeroHeuristic)
            .unwrap();
        let avoid_bus_zero = |_: &[LocationAddress], lanes: &[LaneAddress]| -> f64 {
            if lanes.iter().any(|l| l.kind() == LaneKind::Site && l.bus_id() == 0) {
                1.0
            } else {
                0.0
            }
        };
        let other = pf
            .find_path(start, end, &BTreeSet::new(), &avoid_bus_zero)
            .unwrap();

        assert_eq!(first.lanes()[0].bus_id(), 0);
        assert_ne!(other.lanes()[0].bus_id(), 0);
        assert_eq!(other.len(), first.len());
    }

    #[test]
    fn test_bus_reuse_prefers_committed() {
        let pf = finder();
        let mut heuristic = BusReuseHeuristic::new();
        let committed: LaneAddress = SiteLaneAddress::new(0, 1, 3, Direction::Forward).into();
        heuristic.commit(&[committed]);

        let path = pf
            .find_path(
                LocationAddress::new(0, 0),
                LocationAddress::new(1, 0),
                &BTreeSet::new(),
                &heuristic,
            )
            .unwrap();
        assert_eq!(path.lanes()[0].signature(), committed.signature());
    }
}
