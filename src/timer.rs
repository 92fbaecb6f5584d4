use crate::mode::Mode;

/// Milliseconds on the engine clock (0 = engine construction).
pub type Millis = u64;

/// Handle for every timer the engine can arm. Starting a handle that is
/// already pending replaces the earlier firing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerId {
    /// Foreground-window poll (periodic).
    SupervisorPoll,
    /// Hides the supervisor caption and returns to idle.
    CaptionHide,
    /// Pause before the first walk after entering Wanderer mode.
    Settle,
    /// Movement step while walking or returning to an edge (periodic).
    MoveTick,
    /// End of a corner pose.
    Pose,
    /// End of the ear-touch after returning to an edge.
    EarTouch,
    /// Completion of slap / eat / satisfied / pet.
    ActionDone,
    /// Float phase alternation.
    FloatCycle,
    /// Hides the "back on the ground" caption.
    UnfloatCaption,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    Every(Millis),
}

/// A timer that came due.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fired {
    pub id: TimerId,
    /// Mode that armed the timer.
    pub owner: Mode,
    pub at: Millis,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    id: TimerId,
    due: Millis,
    repeat: Repeat,
    owner: Mode,
    /// Insertion order; breaks ties between timers due at the same instant.
    seq: u64,
}

/// Single-shot and periodic delayed callbacks over a virtual clock.
///
/// Nothing runs on its own: the owner drains due timers one at a time with
/// `pop_due`, so each callback completes before the next is looked at and
/// may cancel or re-arm anything still pending.
pub struct TimerScheduler {
    now: Millis,
    pending: Vec<Pending>,
    next_seq: u64,
}

impl TimerScheduler {
    pub fn new() -> Self {
        Self {
            now: 0,
            pending: Vec::with_capacity(8),
            next_seq: 0,
        }
    }

    pub fn now(&self) -> Millis {
        self.now
    }

    /// Arm `id` to fire once `delay` ms from now.
    pub fn start_once(&mut self, id: TimerId, delay: Millis, owner: Mode) {
        self.start(id, delay, Repeat::Once, owner);
    }

    /// Arm `id` to fire every `interval` ms, first firing one interval from now.
    pub fn start_periodic(&mut self, id: TimerId, interval: Millis, owner: Mode) {
        let interval = interval.max(1);
        self.start(id, interval, Repeat::Every(interval), owner);
    }

    pub fn start(&mut self, id: TimerId, delay: Millis, repeat: Repeat, owner: Mode) {
        self.cancel(id);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Pending {
            id,
            due: self.now.saturating_add(delay),
            repeat,
            owner,
            seq,
        });
    }

    /// Returns true if something was actually pending.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.id != id);
        before != self.pending.len()
    }

    /// Cancel every timer armed by `owner`. Returns how many were dropped.
    pub fn cancel_owned_by(&mut self, owner: Mode) -> usize {
        let before = self.pending.len();
        self.pending.retain(|p| p.owner != owner);
        before - self.pending.len()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.iter().any(|p| p.id == id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Earliest deadline, if anything is armed.
    pub fn next_due(&self) -> Option<Millis> {
        self.pending.iter().map(|p| p.due).min()
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock to its deadline.
    ///
    /// Periodic timers are re-armed on their own cadence, but never at or
    /// before `until`: intervals missed during a long gap collapse into the
    /// one firing returned here.
    pub fn pop_due(&mut self, until: Millis) -> Option<Fired> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due <= until)
            .min_by_key(|(_, p)| (p.due, p.seq))
            .map(|(i, _)| i)?;

        let entry = self.pending[idx];
        self.now = self.now.max(entry.due);

        match entry.repeat {
            Repeat::Once => {
                self.pending.swap_remove(idx);
            }
            Repeat::Every(interval) => {
                let seq = self.next_seq;
                self.next_seq += 1;
                let mut next = entry.due + interval;
                if next <= until {
                    let missed = (until - entry.due) / interval;
                    log::debug!("{:?}: skipping {} missed firings", entry.id, missed);
                    next = entry.due + (missed + 1) * interval;
                }
                let slot = &mut self.pending[idx];
                slot.due = next;
                slot.seq = seq;
            }
        }

        Some(Fired {
            id: entry.id,
            owner: entry.owner,
            at: entry.due,
        })
    }

    /// Move the clock forward without firing anything. Never goes backwards.
    pub fn advance_clock(&mut self, to: Millis) {
        self.now = self.now.max(to);
    }
}
