use std::collections::BTreeMap;

use crate::session::AuthSession;

pub type TabId = u64;

/// Monotonic counter distinguishing scoring runs for the same tab. A late
/// result stamped with an old generation is discarded instead of delivered.
pub type Generation = u64;

/// Observable suspension points of a scoring run. Panel opening and URL
/// validation complete synchronously inside a single `update` call and are
/// never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Waiting for the in-page selection read to come back.
    AwaitingSelection,
    /// Waiting for the scoring service response.
    Requesting,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunState {
    pub generation: Generation,
    pub phase: RunPhase,
}

/// Process-scoped coordinator state: which panels are ready, which scoring
/// runs are in flight, and the cached signed-in identity. Lost on host
/// restart; panels re-announce on mount and the session is restored from its
/// durable mirror.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CoordinatorState {
    ready: BTreeMap<TabId, bool>,
    runs: BTreeMap<TabId, RunState>,
    next_generation: Generation,
    session: Option<AuthSession>,
}

impl CoordinatorState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mark_ready(&mut self, tab_id: TabId) {
        self.ready.insert(tab_id, true);
    }

    pub fn is_ready(&self, tab_id: TabId) -> bool {
        self.ready.get(&tab_id).copied().unwrap_or(false)
    }

    /// Forget a prior mount's readiness announcement so a stale flag never
    /// satisfies a new run.
    pub fn reset_ready(&mut self, tab_id: TabId) {
        self.ready.remove(&tab_id);
    }

    /// Starts a new scoring run for a tab, superseding any in-flight run.
    pub fn begin_run(&mut self, tab_id: TabId) -> Generation {
        self.reset_ready(tab_id);
        self.next_generation += 1;
        let generation = self.next_generation;
        self.runs.insert(
            tab_id,
            RunState {
                generation,
                phase: RunPhase::AwaitingSelection,
            },
        );
        generation
    }

    pub fn run(&self, tab_id: TabId) -> Option<RunState> {
        self.runs.get(&tab_id).copied()
    }

    /// True when `generation` still names the live run for the tab and that
    /// run sits in `phase`.
    pub fn is_current(&self, tab_id: TabId, generation: Generation, phase: RunPhase) -> bool {
        self.runs
            .get(&tab_id)
            .is_some_and(|run| run.generation == generation && run.phase == phase)
    }

    pub(crate) fn advance_to_requesting(&mut self, tab_id: TabId) {
        if let Some(run) = self.runs.get_mut(&tab_id) {
            run.phase = RunPhase::Requesting;
        }
    }

    pub(crate) fn finish_run(&mut self, tab_id: TabId) {
        self.runs.remove(&tab_id);
    }

    pub fn session(&self) -> Option<&AuthSession> {
        self.session.as_ref()
    }

    /// Seeds the cache from the durable mirror after a host restart. Not a
    /// session change: nothing is persisted or broadcast.
    pub fn restore_session(&mut self, session: AuthSession) {
        self.session = Some(session);
    }

    pub(crate) fn set_session(&mut self, session: Option<AuthSession>) {
        self.session = session;
    }
}
