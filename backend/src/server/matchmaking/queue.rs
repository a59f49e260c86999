/// Queue store: one FIFO per queue class behind a single lock.
///
/// `enqueue`, `try_match`, `withdraw` and `snapshot` each take the lock once and
/// never perform channel I/O while holding it.

use std::collections::VecDeque;

use log::{debug, info};
use parking_lot::Mutex;
use serde::{Serialize, Deserialize};

use super::types::{Participant, ParticipantId, QueueClass, Status};

/// Two participants popped from the same queue. `white` arrived first and moves first.
#[derive(Debug)]
pub struct Pairing {
    pub white: Participant,
    pub black: Participant,
    pub class: QueueClass,
}

/// Number of waiting participants per queue class.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueSnapshot {
    pub quickplay: usize,
    pub normal: usize,
}

#[derive(Default)]
struct Queues {
    quickplay: VecDeque<Participant>,
    normal: VecDeque<Participant>,
}

impl Queues {
    fn get(&self, class: QueueClass) -> &VecDeque<Participant> {
        match class {
            QueueClass::Quickplay => &self.quickplay,
            QueueClass::Normal => &self.normal,
        }
    }

    fn get_mut(&mut self, class: QueueClass) -> &mut VecDeque<Participant> {
        match class {
            QueueClass::Quickplay => &mut self.quickplay,
            QueueClass::Normal => &mut self.normal,
        }
    }
}

#[derive(Default)]
pub struct QueueStore {
    queues: Mutex<Queues>,
}

impl QueueStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a participant to the tail of `class`.
    pub fn enqueue(&self, class: QueueClass, mut participant: Participant) {
        participant.status = Status::Waiting;
        let id = participant.id;
        let mut queues = self.queues.lock();
        let queue = queues.get_mut(class);
        queue.push_back(participant);
        debug!("[Matchmaking] Player {} queued in {} (position {})", id, class, queue.len());
    }

    /// Put a participant whose match fell through back at the head of `class`,
    /// ahead of everyone who arrived after them.
    pub fn requeue(&self, class: QueueClass, mut participant: Participant) {
        participant.status = Status::Waiting;
        let id = participant.id;
        self.queues.lock().get_mut(class).push_front(participant);
        debug!("[Matchmaking] Player {} back at the head of {}", id, class);
    }

    /// Pop the two oldest participants of the first class (in priority order)
    /// holding at least two, and mark them `Playing`.
    pub fn try_match(&self) -> Option<Pairing> {
        let mut queues = self.queues.lock();
        let class = QueueClass::PRIORITY
            .into_iter()
            .find(|class| queues.get(*class).len() >= 2)?;
        let queue = queues.get_mut(class);
        let (mut white, mut black) = match (queue.pop_front(), queue.pop_front()) {
            (Some(white), Some(black)) => (white, black),
            _ => return None,
        };
        white.status = Status::Playing;
        black.status = Status::Playing;
        info!(
            "[Matchmaking] Match found in {} queue! White is {} and Black is {}",
            class, white.id, black.id
        );
        Some(Pairing { white, black, class })
    }

    /// Remove a waiting participant, e.g. because their socket went away.
    ///
    /// The participant is closed and marked `Done`. Returns `None` if `id` is
    /// not queued (never was, or already matched).
    pub fn withdraw(&self, id: ParticipantId) -> Option<(QueueClass, Participant)> {
        let mut queues = self.queues.lock();
        for class in QueueClass::PRIORITY {
            let queue = queues.get_mut(class);
            if let Some(pos) = queue.iter().position(|p| p.id == id) {
                let mut participant = queue.remove(pos)?;
                participant.finish(None);
                debug!("[Matchmaking] Player {} left {} queue", id, class);
                return Some((class, participant));
            }
        }
        None
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let queues = self.queues.lock();
        QueueSnapshot {
            quickplay: queues.quickplay.len(),
            normal: queues.normal.len(),
        }
    }
}
