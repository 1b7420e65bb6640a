//! Last-request-wins bookkeeping for page regions.
//!
//! Every load that targets a region of a board takes a ticket. When a newer
//! load for the same region starts, older tickets stop being current and
//! their results are dropped on arrival.

use std::{
    num::NonZeroUsize,
    sync::{Mutex, MutexGuard, PoisonError},
};

use lru::LruCache;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    FaultList,
    Report,
}

impl Region {
    pub fn as_str(self) -> &'static str {
        match self {
            Region::FaultList => "fault-list",
            Region::Report => "report",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestTicket {
    board: Uuid,
    region: Region,
    generation: u64,
}

impl RequestTicket {
    pub fn region(&self) -> Region {
        self.region
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

struct Inner {
    issued: u64,
    latest: LruCache<(Uuid, Region), u64>,
}

pub struct RequestGenerations {
    inner: Mutex<Inner>,
}

impl RequestGenerations {
    /// `capacity` bounds how many (board, region) pairs are remembered.
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                issued: 0,
                latest: LruCache::new(capacity),
            }),
        }
    }

    pub fn begin(&self, board: Uuid, region: Region) -> RequestTicket {
        let mut inner = self.lock();
        inner.issued += 1;
        let generation = inner.issued;
        inner.latest.put((board, region), generation);
        RequestTicket {
            board,
            region,
            generation,
        }
    }

    /// A ticket whose entry was evicted has no known successor and stays current.
    pub fn is_current(&self, ticket: &RequestTicket) -> bool {
        let mut inner = self.lock();
        match inner.latest.get(&(ticket.board, ticket.region)) {
            Some(latest) => *latest == ticket.generation,
            None => true,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker(capacity: usize) -> RequestGenerations {
        RequestGenerations::new(NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn newer_request_supersedes_older() {
        let generations = tracker(8);
        let board = Uuid::new_v4();

        let first = generations.begin(board, Region::FaultList);
        let second = generations.begin(board, Region::FaultList);

        assert!(!generations.is_current(&first));
        assert!(generations.is_current(&second));
    }

    #[test]
    fn regions_and_boards_are_independent() {
        let generations = tracker(8);
        let board = Uuid::new_v4();
        let other = Uuid::new_v4();

        let list = generations.begin(board, Region::FaultList);
        let report = generations.begin(board, Region::Report);
        let other_list = generations.begin(other, Region::FaultList);

        assert!(generations.is_current(&list));
        assert!(generations.is_current(&report));
        assert!(generations.is_current(&other_list));
    }

    #[test]
    fn evicted_entries_do_not_block_results() {
        let generations = tracker(1);
        let board = Uuid::new_v4();

        let ticket = generations.begin(board, Region::Report);
        generations.begin(Uuid::new_v4(), Region::Report);

        assert!(generations.is_current(&ticket));
    }
}
