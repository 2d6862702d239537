
use crate::model::Pattern;

/// Side channel for monitoring a mining run.
///
/// All hooks default to no-ops, so implementors override only what they
/// need. Notifications arrive from whichever thread made the discovery: the
/// frequent-item scan runs data parallel, the later phases are single
/// threaded. Handlers must not retain references into the mining state and
/// cannot influence the run.
pub trait MiningObserver {
    /// A mining phase begins
    fn on_phase_start( &mut self, _phase: u8, _description: &str ) {}

    /// A mining phase finished after the given wall time
    fn on_phase_complete( &mut self, _phase: u8, _millis: u128 ) {}

    /// A closed pattern was accepted into the top-k heap
    fn on_pattern_found( &mut self, _pattern: &Pattern ) {}

    /// A candidate was discarded without full evaluation
    fn on_candidate_pruned( &mut self, _reason: &str ) {}
}
