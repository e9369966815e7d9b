use crate::{EventBus, Reveal, Session, SessionError, Stage, Timing};

/// Identity of a scheduled step. Only the most recently issued token can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StepToken(u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingStep {
    pub token: StepToken,
    pub due_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoStep {
    Spawned,
    Broken { cards: usize },
    Revealed(Reveal),
}

/// Cooperative auto-play driver over a millisecond clock owned by the caller.
///
/// At most one step is pending at a time. Scheduling a new step replaces the
/// pending one, and stopping drops it; the replaced token goes stale and
/// [`AutoPlayer::fire`] ignores it.
#[derive(Debug, Clone)]
pub struct AutoPlayer {
    timing: Timing,
    running: bool,
    pending: Option<PendingStep>,
    next_token: u64,
    pack_limit: Option<u64>,
    packs_finished: u64,
}

impl AutoPlayer {
    pub fn new(timing: Timing) -> Self {
        Self {
            timing,
            running: false,
            pending: None,
            next_token: 0,
            pack_limit: None,
            packs_finished: 0,
        }
    }

    /// Stops on its own after `limit` finished packs.
    pub fn with_pack_limit(mut self, limit: u64) -> Self {
        self.pack_limit = Some(limit);
        self
    }

    pub fn set_pack_limit(&mut self, limit: Option<u64>) {
        self.pack_limit = limit;
    }

    pub fn timing(&self) -> Timing {
        self.timing
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pending(&self) -> Option<PendingStep> {
        self.pending
    }

    pub fn next_due(&self) -> Option<u64> {
        self.pending.map(|step| step.due_ms)
    }

    pub fn packs_finished(&self) -> u64 {
        self.packs_finished
    }

    pub fn start(&mut self, now_ms: u64) {
        if self.running {
            return;
        }
        self.running = true;
        self.packs_finished = 0;
        log::debug!("auto-play started at {now_ms}ms");
        self.schedule(now_ms, self.timing.auto_step_ms);
    }

    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        self.pending = None;
        log::debug!("auto-play stopped after {} packs", self.packs_finished);
    }

    pub fn toggle(&mut self, now_ms: u64) {
        if self.running {
            self.stop();
        } else {
            self.start(now_ms);
        }
    }

    /// Replaces any pending step with one due `delay_ms` from `now_ms`.
    pub fn schedule(&mut self, now_ms: u64, delay_ms: u64) -> Option<StepToken> {
        if !self.running {
            return None;
        }
        let token = StepToken(self.next_token);
        self.next_token += 1;
        self.pending = Some(PendingStep {
            token,
            due_ms: now_ms.saturating_add(delay_ms),
        });
        Some(token)
    }

    pub fn is_current(&self, token: StepToken) -> bool {
        self.running && self.pending.map(|step| step.token) == Some(token)
    }

    /// Fires the pending step if it is due.
    pub fn poll(
        &mut self,
        now_ms: u64,
        session: &mut Session,
        events: &mut EventBus,
    ) -> Result<Option<AutoStep>, SessionError> {
        let Some(pending) = self.pending else {
            return Ok(None);
        };
        if now_ms < pending.due_ms {
            return Ok(None);
        }
        self.fire(pending.token, now_ms, session, events)
    }

    /// Runs the step identified by `token`; stale tokens do nothing.
    pub fn fire(
        &mut self,
        token: StepToken,
        now_ms: u64,
        session: &mut Session,
        events: &mut EventBus,
    ) -> Result<Option<AutoStep>, SessionError> {
        if !self.is_current(token) {
            return Ok(None);
        }
        self.pending = None;
        match self.advance(now_ms, session, events) {
            Ok(step) => Ok(Some(step)),
            Err(err) => {
                self.stop();
                Err(err)
            }
        }
    }

    fn advance(
        &mut self,
        now_ms: u64,
        session: &mut Session,
        events: &mut EventBus,
    ) -> Result<AutoStep, SessionError> {
        match session.stage() {
            Stage::Idle | Stage::SummaryShown => {
                session.spawn_box(events)?;
                self.schedule(now_ms, self.timing.auto_step_ms);
                Ok(AutoStep::Spawned)
            }
            Stage::BoxSpawned => {
                let cards = session.break_box(events)?;
                if session.stage() == Stage::SummaryShown {
                    self.pack_done(now_ms);
                } else {
                    self.schedule(now_ms, self.timing.wait_after_break_ms);
                }
                Ok(AutoStep::Broken { cards })
            }
            Stage::Revealing => {
                let reveal = session.reveal_next(events)?;
                if reveal.finished {
                    self.pack_done(now_ms);
                } else {
                    self.schedule(now_ms, self.timing.card_reveal_ms);
                }
                Ok(AutoStep::Revealed(reveal))
            }
        }
    }

    fn pack_done(&mut self, now_ms: u64) {
        self.packs_finished += 1;
        if self
            .pack_limit
            .is_some_and(|limit| self.packs_finished >= limit)
        {
            self.stop();
        } else {
            self.schedule(now_ms, self.timing.auto_step_ms);
        }
    }
}

impl Default for AutoPlayer {
    fn default() -> Self {
        Self::new(Timing::default())
    }
}
