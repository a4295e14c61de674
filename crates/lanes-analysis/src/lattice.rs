//! Lattice abstractions shared by the dataflow analyses.

/// A partially ordered set with joins and meets.
pub trait Lattice: Clone + PartialEq {
    /// `self ⊑ other`.
    fn is_subseteq(&self, other: &Self) -> bool;

    /// Least upper bound.
    #[must_use]
    fn join(&self, other: &Self) -> Self;

    /// Greatest lower bound.
    #[must_use]
    fn meet(&self, other: &Self) -> Self;

    /// Check `self ⊑ other` and `other ⊑ self`.
    fn is_equal(&self, other: &Self) -> bool {
        self.is_subseteq(other) && other.is_subseteq(self)
    }
}

/// A lattice with distinguished top and bottom elements.
pub trait FiniteLattice: Lattice {
    /// The least element.
    fn bottom() -> Self;

    /// The greatest element.
    fn top() -> Self;

    /// Check if this is the bottom element.
    fn is_bottom(&self) -> bool {
        *self == Self::bottom()
    }

    /// Check if this is the top element.
    fn is_top(&self) -> bool {
        *self == Self::top()
    }
}
