//! Strongly-typed identifiers.

use std::fmt;

/// Identifies an elementary reaction within a discrete network.
///
/// Reactions are assigned sequential IDs in declaration order.
/// `ReactionId(n)` corresponds to the n-th reaction added to the network,
/// which is also the order used when selecting the next reaction to fire.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ReactionId(pub u32);

impl ReactionId {
    /// The ID as a vector index.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ReactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for ReactionId {
    fn from(v: u32) -> Self {
        Self(v)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaction_id_orders_by_declaration() {
        assert!(ReactionId(0) < ReactionId(1));
        assert_eq!(ReactionId::from(7).index(), 7);
        assert_eq!(ReactionId(3).to_string(), "3");
    }
}
