//! Suppression flag between inbound (route -> state) and outbound
//! (state -> route) synchronization.

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
enum GateState {
    #[default]
    Open,
    Suppressed,
}

/// Single on/off gate for outbound sync plus the one pending outbound pass it
/// may be holding.
///
/// Query writes recorded while suppressed are dropped, never replayed once
/// the gate reopens.
#[derive(Debug, Clone, Default)]
pub struct SyncGate {
    state: GateState,
    pending_outbound: bool,
}

impl SyncGate {
    pub fn suppress(&mut self) {
        self.state = GateState::Suppressed;
    }

    pub fn resume(&mut self) {
        self.state = GateState::Open;
    }

    pub fn is_open(&self) -> bool {
        self.state == GateState::Open
    }

    /// Records a QueryState change.
    pub fn note_query_write(&mut self) {
        if self.is_open() {
            self.pending_outbound = true;
        }
    }

    /// Consumes the pending outbound pass, if the gate is open.
    pub fn take_pending(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        std::mem::take(&mut self.pending_outbound)
    }
}
