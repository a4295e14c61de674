//! Routing single atoms over the lane graph.
//!
//! A [`Router`] wraps a [`PathFinder`] with the sites already taken in the
//! current transition and one tie-break heuristic. Every accepted route is
//! committed back to the router, so later queries avoid its sites and the
//! heuristic can favour the buses it used.

use std::collections::{BTreeMap, BTreeSet};

use lanes_arch::{
    ArchSpec, LaneAddress, LaneKind, LocationAddress, Path, PathFinder, PathHeuristic,
    PathSegment,
};
use lanes_ir::QubitId;

use crate::error::{CompileError, CompileResult};
use crate::synthesis::LaneSignature;

/// Builds a fresh tie-break heuristic for every transition.
pub trait HeuristicFactory: Send + Sync {
    /// A heuristic with nothing committed.
    fn layer_heuristic(&self) -> Box<dyn PathHeuristic>;
}

impl<F> HeuristicFactory for F
where
    F: Fn() -> Box<dyn PathHeuristic> + Send + Sync,
{
    fn layer_heuristic(&self) -> Box<dyn PathHeuristic> {
        self()
    }
}

/// How one atom travels from its old site to its new one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    /// Starting site.
    pub start: LocationAddress,
    /// Site-bus hops in the starting word.
    pub align: Vec<PathSegment>,
    /// The word-bus hop, for inter-word moves.
    pub cross: Option<PathSegment>,
    /// Site-bus hops in the destination word.
    pub settle: Vec<PathSegment>,
}

impl Route {
    /// A route that does not move.
    pub fn stay(start: LocationAddress) -> Self {
        Self {
            start,
            align: Vec::new(),
            cross: None,
            settle: Vec::new(),
        }
    }

    /// Split a path at its word-bus hop.
    ///
    /// Returns `None` if the path uses more than one word lane.
    pub fn from_path(path: &Path) -> Option<Self> {
        let mut route = Route::stay(path.start);
        for seg in &path.segments {
            match (seg.lane.kind(), route.cross) {
                (LaneKind::Word, Some(_)) => return None,
                (LaneKind::Word, None) => route.cross = Some(*seg),
                (LaneKind::Site, Some(_)) => route.settle.push(*seg),
                (LaneKind::Site, None) => route.align.push(*seg),
            }
        }
        Some(route)
    }

    /// All hops in order.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.align.iter().chain(&self.cross).chain(&self.settle)
    }

    /// Lanes in traversal order.
    pub fn lanes(&self) -> Vec<LaneAddress> {
        self.segments().map(|seg| seg.lane).collect()
    }

    /// Number of lanes travelled.
    pub fn len(&self) -> usize {
        self.segments().count()
    }

    /// Check if the route does not move.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The final site.
    pub fn dst(&self) -> LocationAddress {
        self.segments().last().map_or(self.start, |seg| seg.dst)
    }

    /// Every site visited after the start.
    pub fn visited(&self) -> impl Iterator<Item = LocationAddress> + '_ {
        self.segments().map(|seg| seg.dst)
    }

    /// `(src_word, dst_word)` of the inter-word hop.
    pub fn word_pair(&self) -> Option<(u32, u32)> {
        self.cross.map(|seg| (seg.src.word_id, seg.dst.word_id))
    }

    /// Bus signatures of the hops in order.
    pub fn signature(&self) -> Vec<LaneSignature> {
        self.segments().map(|seg| seg.lane.signature()).collect()
    }

    /// The route as a plain path.
    pub fn to_path(&self) -> Path {
        Path {
            start: self.start,
            segments: self.segments().copied().collect(),
        }
    }
}

/// Plan the route of a single atom from `src` to `dst`.
///
/// The route is the best shortest path that avoids `occupied`, split at
/// its word-bus hop.
pub fn plan_route(
    finder: &PathFinder,
    src: LocationAddress,
    dst: LocationAddress,
    occupied: &BTreeSet<LocationAddress>,
    heuristic: &dyn PathHeuristic,
) -> CompileResult<Route> {
    let arch = finder.arch();
    arch.validate_location(src)?;
    arch.validate_location(dst)?;
    finder
        .find_path(src, dst, occupied, heuristic)
        .as_ref()
        .and_then(Route::from_path)
        .ok_or(CompileError::UnsupportedMove { src, dst })
}

/// Routes the atoms of one transition against a shared occupancy.
pub struct Router<'a> {
    finder: &'a PathFinder,
    heuristic: Box<dyn PathHeuristic>,
    claimed: BTreeSet<LocationAddress>,
    pending: BTreeSet<LocationAddress>,
    routes: BTreeMap<QubitId, Route>,
}

impl<'a> Router<'a> {
    /// Create a router; `claimed` holds every site that may not be entered.
    pub fn new(
        finder: &'a PathFinder,
        heuristic: Box<dyn PathHeuristic>,
        claimed: BTreeSet<LocationAddress>,
    ) -> Self {
        Self {
            finder,
            heuristic,
            claimed,
            pending: BTreeSet::new(),
            routes: BTreeMap::new(),
        }
    }

    /// The architecture being routed on.
    pub fn arch(&self) -> &'a ArchSpec {
        self.finder.arch()
    }

    /// Hold destinations of atoms that are not routed yet.
    ///
    /// Pending sites are avoided by every route except one ending there.
    pub fn reserve(&mut self, sites: impl IntoIterator<Item = LocationAddress>) {
        self.pending.extend(sites);
    }

    /// Check if a site is taken by the layout or a committed route.
    pub fn is_claimed(&self, location: LocationAddress) -> bool {
        self.claimed.contains(&location)
    }

    /// The best route from `src` to `dst` under the current occupancy.
    ///
    /// `src` is the mover's own site and may be claimed.
    pub fn route(&self, src: LocationAddress, dst: LocationAddress) -> Option<Route> {
        if src == dst {
            return Some(Route::stay(src));
        }
        let mut occupied: BTreeSet<_> = self.claimed.union(&self.pending).copied().collect();
        occupied.remove(&src);
        if !self.claimed.contains(&dst) {
            occupied.remove(&dst);
        }
        let path = self
            .finder
            .find_path(src, dst, &occupied, self.heuristic.as_ref())?;
        Route::from_path(&path)
    }

    /// Accept a route for `qubit`.
    pub fn commit(&mut self, qubit: QubitId, route: Route) {
        self.claimed.extend(route.visited());
        self.pending.remove(&route.dst());
        self.heuristic.commit(&route.lanes());
        self.routes.insert(qubit, route);
    }

    /// Routes committed so far.
    pub fn routes(&self) -> &BTreeMap<QubitId, Route> {
        &self.routes
    }

    /// Take the committed routes.
    pub fn into_routes(self) -> BTreeMap<QubitId, Route> {
        self.routes
    }

    /// Take the committed routes as plain paths.
    pub fn into_paths(self) -> BTreeMap<QubitId, Path> {
        self.routes
            .into_iter()
            .filter(|(_, route)| !route.is_empty())
            .map(|(qubit, route)| (qubit, route.to_path()))
            .collect()
    }
}
