use gamehub::PlayerShuffler;

// ============================================================================
// Deterministic shufflers
// ============================================================================

/// Leaves the roster in join order
pub struct RosterOrderShuffler;

impl PlayerShuffler for RosterOrderShuffler {
    fn shuffle(&self, _players: &mut [i64]) {}
}

/// Reverses the roster, so the first player to join is the last one paired
pub struct ReverseShuffler;

impl PlayerShuffler for ReverseShuffler {
    fn shuffle(&self, players: &mut [i64]) {
        players.reverse();
    }
}
