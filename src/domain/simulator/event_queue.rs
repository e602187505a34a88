use std::cmp::Ordering;
use std::collections::BinaryHeap;

use crate::domain::network_model::utils::id::RequestId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// A committed request leaves the network.
    Departure(RequestId),
    /// The request at this index of the request list arrives.
    Arrival(usize),
}

impl EventKind {
    // Departures free resources before arrivals at the same instant try to use them.
    fn rank(&self) -> u8 {
        match self {
            EventKind::Departure(_) => 0,
            EventKind::Arrival(_) => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimEvent {
    pub time: f64,
    pub kind: EventKind,
    sequence: u64,
}

impl Eq for SimEvent {}

impl Ord for SimEvent {
    // Reversed for the max-heap: earliest time first, then departures, then insertion order.
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .time
            .total_cmp(&self.time)
            .then_with(|| other.kind.rank().cmp(&self.kind.rank()))
            .then_with(|| other.sequence.cmp(&self.sequence))
    }
}

impl PartialOrd for SimEvent {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Pending simulation events in processing order.
#[derive(Debug, Default)]
pub struct EventQueue {
    heap: BinaryHeap<SimEvent>,
    next_sequence: u64,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: f64, kind: EventKind) {
        self.heap.push(SimEvent { time, kind, sequence: self.next_sequence });
        self.next_sequence += 1;
    }

    pub fn pop(&mut self) -> Option<SimEvent> {
        self.heap.pop()
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn departures_win_ties() {
        let mut queue = EventQueue::new();
        queue.push(2.0, EventKind::Arrival(1));
        queue.push(1.0, EventKind::Arrival(0));
        queue.push(2.0, EventKind::Departure(RequestId(1)));
        queue.push(2.0, EventKind::Arrival(2));

        let order: Vec<EventKind> = std::iter::from_fn(|| queue.pop()).map(|e| e.kind).collect();
        assert_eq!(order, vec![EventKind::Arrival(0), EventKind::Departure(RequestId(1)), EventKind::Arrival(1), EventKind::Arrival(2)]);
    }
}
