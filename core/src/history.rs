use alloc::rc::Rc;
use alloc::vec::Vec;

use log::{debug, trace};

use crate::Snapshot;

/// Handle for one autoplay run; ticks from older runs are ignored.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AutoplayTicket {
    pub generation: u64,
    pub interval_ms: u32,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum HistoryState {
    Empty,
    /// Showing the latest snapshot.
    Live,
    Browsing,
    Autoplaying,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum NavOutcome {
    NoChange,
    Moved,
}

impl NavOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::NoChange => false,
            Self::Moved => true,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TickOutcome {
    /// The ticket no longer matches the running autoplay.
    Stale,
    Stepped,
    /// Stepped onto the last snapshot, autoplay is over.
    Finished,
}

impl TickOutcome {
    pub const fn has_update(self) -> bool {
        match self {
            Self::Stale => false,
            Self::Stepped => true,
            Self::Finished => true,
        }
    }

    /// The timer driving this run can go. Stale ticks never end anything.
    pub const fn ends_autoplay(self) -> bool {
        matches!(self, Self::Finished)
    }
}

/// Append-only snapshot sequence with a cursor.
#[derive(Clone, Debug)]
pub struct History<T = Snapshot> {
    entries: Vec<Rc<T>>,
    cursor: Option<usize>,
    autoplay: Option<AutoplayTicket>,
    generation: u64,
}

impl<T> Default for History<T> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            cursor: None,
            autoplay: None,
            generation: 0,
        }
    }
}

impl<T> History<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    pub fn current(&self) -> Option<&Rc<T>> {
        self.entries.get(self.cursor?)
    }

    pub fn get(&self, index: usize) -> Option<&Rc<T>> {
        self.entries.get(index)
    }

    pub fn autoplay(&self) -> Option<AutoplayTicket> {
        self.autoplay
    }

    pub fn state(&self) -> HistoryState {
        match self.cursor {
            _ if self.autoplay.is_some() => HistoryState::Autoplaying,
            None => HistoryState::Empty,
            Some(cursor) if cursor + 1 == self.entries.len() => HistoryState::Live,
            Some(_) => HistoryState::Browsing,
        }
    }

    /// Adds `item` and snaps the cursor to it. Returns the autoplay it cancelled.
    pub fn append(&mut self, item: T) -> Option<AutoplayTicket> {
        let cancelled = self.autoplay.take();
        self.entries.push(Rc::new(item));
        self.cursor = Some(self.entries.len() - 1);
        debug!("Appended snapshot {}", self.entries.len());
        cancelled
    }

    pub fn step_forward(&mut self) -> NavOutcome {
        self.stop_autoplay();
        match self.cursor {
            Some(cursor) if cursor + 1 < self.entries.len() => self.move_to(cursor + 1),
            _ => NavOutcome::NoChange,
        }
    }

    pub fn step_back(&mut self) -> NavOutcome {
        self.stop_autoplay();
        match self.cursor {
            Some(cursor) if cursor > 0 => self.move_to(cursor - 1),
            _ => NavOutcome::NoChange,
        }
    }

    pub fn jump_to_end(&mut self) -> NavOutcome {
        self.stop_autoplay();
        match self.entries.len() {
            0 => NavOutcome::NoChange,
            len => self.move_to(len - 1),
        }
    }

    pub fn reset(&mut self) -> NavOutcome {
        self.stop_autoplay();
        if self.entries.is_empty() {
            return NavOutcome::NoChange;
        }
        self.move_to(0)
    }

    /// Starts stepping forward on a timer, replacing any running autoplay.
    ///
    /// Returns `None` when there is nothing left to play.
    pub fn start_autoplay(&mut self, interval_ms: u32) -> Option<AutoplayTicket> {
        self.stop_autoplay();
        let cursor = self.cursor?;
        if cursor + 1 >= self.entries.len() {
            return None;
        }

        self.generation += 1;
        let ticket = AutoplayTicket {
            generation: self.generation,
            interval_ms,
        };
        debug!("Autoplay {} from {cursor} every {interval_ms}ms", ticket.generation);
        self.autoplay = Some(ticket);
        Some(ticket)
    }

    pub fn stop_autoplay(&mut self) -> Option<AutoplayTicket> {
        let stopped = self.autoplay.take();
        if let Some(ticket) = stopped {
            debug!("Autoplay {} stopped", ticket.generation);
        }
        stopped
    }

    pub fn tick(&mut self, generation: u64) -> TickOutcome {
        let (Some(ticket), Some(cursor)) = (self.autoplay, self.cursor) else {
            return TickOutcome::Stale;
        };
        if ticket.generation != generation {
            trace!("Ignoring tick for autoplay {generation}");
            return TickOutcome::Stale;
        }

        let next = cursor + 1;
        if next >= self.entries.len() {
            self.autoplay = None;
            return TickOutcome::Finished;
        }
        self.cursor = Some(next);
        trace!("Autoplay {generation} at {next}");

        if next + 1 == self.entries.len() {
            self.autoplay = None;
            debug!("Autoplay {generation} reached the end");
            TickOutcome::Finished
        } else {
            TickOutcome::Stepped
        }
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.stop_autoplay();
        self.entries.clear();
        self.cursor = None;
    }

    fn move_to(&mut self, index: usize) -> NavOutcome {
        if self.cursor == Some(index) {
            return NavOutcome::NoChange;
        }
        trace!("Cursor {:?} -> {index}", self.cursor);
        self.cursor = Some(index);
        NavOutcome::Moved
    }
}
