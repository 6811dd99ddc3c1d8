use std::collections::VecDeque;

/// A single player intent, already decoupled from physical keys.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Intent {
    Up,
    Down,
    Left,
    Right,
    Action,
}

/// Immutable per-tick view of the intents raised since the previous
/// tick. Games read this during a step; it is never mutated mid-step.
#[derive(Clone, Copy, Default, Debug)]
pub struct InputSnapshot {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    pub action: bool,
}

/// Collects raw intents between ticks. `take` hands the accumulated set
/// to the simulation and clears it, so each press is seen exactly once.
#[derive(Default, Debug)]
pub struct IntentBuffer {
    pending: InputSnapshot,
}

impl IntentBuffer {
    pub fn press(&mut self, intent: Intent) {
        match intent {
            Intent::Up => self.pending.up = true,
            Intent::Down => self.pending.down = true,
            Intent::Left => self.pending.left = true,
            Intent::Right => self.pending.right = true,
            Intent::Action => self.pending.action = true,
        }
    }

    pub fn take(&mut self) -> InputSnapshot {
        std::mem::take(&mut self.pending)
    }

    pub fn clear(&mut self) {
        self.pending = InputSnapshot::default();
    }
}

/// A grid heading.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Dir {
    Up,
    Down,
    Left,
    Right,
}

impl Dir {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Dir::Up => (0, -1),
            Dir::Down => (0, 1),
            Dir::Left => (-1, 0),
            Dir::Right => (1, 0),
        }
    }

    pub fn opposite(self) -> Dir {
        match self {
            Dir::Up => Dir::Down,
            Dir::Down => Dir::Up,
            Dir::Left => Dir::Right,
            Dir::Right => Dir::Left,
        }
    }

    pub fn from_intent(intent: Intent) -> Option<Dir> {
        match intent {
            Intent::Up => Some(Dir::Up),
            Intent::Down => Some(Dir::Down),
            Intent::Left => Some(Dir::Left),
            Intent::Right => Some(Dir::Right),
            Intent::Action => None,
        }
    }
}

/// Buffered direction changes for grid games: presses queue up and are
/// consumed one per step, so a fast Up-then-Left between two steps turns
/// the corner instead of losing the second press. A queued heading that
/// would reverse straight into the current one is discarded at pop time.
#[derive(Debug, Default)]
pub struct DirQueue {
    queue: VecDeque<Dir>,
}

const DIR_QUEUE_CAP: usize = 2;

impl DirQueue {
    pub fn push(&mut self, dir: Dir) {
        if self.queue.back() == Some(&dir) {
            return;
        }
        if self.queue.len() == DIR_QUEUE_CAP {
            self.queue.pop_front();
        }
        self.queue.push_back(dir);
    }

    /// Pop the first queued heading that does not reverse `current`.
    /// Reversing entries are dropped, not deferred.
    pub fn pop_valid(&mut self, current: Dir) -> Option<Dir> {
        while let Some(dir) = self.queue.pop_front() {
            if dir != current.opposite() {
                return Some(dir);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_clears_pending() {
        let mut buf = IntentBuffer::default();
        buf.press(Intent::Left);
        buf.press(Intent::Action);
        let snap = buf.take();
        assert!(snap.left && snap.action && !snap.right);
        let snap = buf.take();
        assert!(!snap.left && !snap.action);
    }

    #[test]
    fn reversal_is_dropped() {
        let mut queue = DirQueue::default();
        queue.push(Dir::Down);
        assert_eq!(queue.pop_valid(Dir::Up), None);
    }

    #[test]
    fn corner_turn_keeps_both_presses() {
        let mut queue = DirQueue::default();
        queue.push(Dir::Left);
        queue.push(Dir::Down);
        assert_eq!(queue.pop_valid(Dir::Up), Some(Dir::Left));
        assert_eq!(queue.pop_valid(Dir::Left), Some(Dir::Down));
    }

    #[test]
    fn queue_is_bounded() {
        let mut queue = DirQueue::default();
        queue.push(Dir::Left);
        queue.push(Dir::Down);
        queue.push(Dir::Right);
        // Oldest entry was evicted.
        assert_eq!(queue.pop_valid(Dir::Up), Some(Dir::Down));
        assert_eq!(queue.pop_valid(Dir::Down), Some(Dir::Right));
    }
}
