// Copyright 2026 the Strata Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Internal queue of undelivered host acknowledgments.

use std::collections::VecDeque;

use strata_core::ack::Acknowledgement;

/// FIFO of acknowledgments tagged with what they confirm.
///
/// Delivery pops the entry first and resolves it afterwards, so callers can
/// release their own borrows before waiters are woken.
#[derive(Debug)]
pub(crate) struct AckQueue<T> {
    items: VecDeque<(T, Acknowledgement)>,
    delivered: u64,
}

impl<T> Default for AckQueue<T> {
    fn default() -> Self {
        Self {
            items: VecDeque::new(),
            delivered: 0,
        }
    }
}

impl<T> AckQueue<T> {
    pub(crate) fn push(&mut self, tag: T, ack: Acknowledgement) {
        self.items.push_back((tag, ack));
    }

    pub(crate) fn pop(&mut self) -> Option<(T, Acknowledgement)> {
        let item = self.items.pop_front()?;
        self.delivered += 1;
        Some(item)
    }

    pub(crate) fn drain(&mut self) -> Vec<(T, Acknowledgement)> {
        self.delivered += self.items.len() as u64;
        self.items.drain(..).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.items.len()
    }

    pub(crate) fn delivered(&self) -> u64 {
        self.delivered
    }
}

#[cfg(test)]
mod tests {
    use super::AckQueue;
    use strata_core::ack::Acknowledgement;

    #[test]
    fn pops_in_push_order() {
        let mut queue = AckQueue::default();
        queue.push(1_u32, Acknowledgement::new());
        queue.push(2_u32, Acknowledgement::new());

        assert_eq!(queue.pop().map(|(tag, _)| tag), Some(1));
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.delivered(), 1);
    }

    #[test]
    fn drain_empties_and_counts() {
        let mut queue = AckQueue::default();
        queue.push('a', Acknowledgement::new());
        queue.push('b', Acknowledgement::new());

        let tags: Vec<char> = queue.drain().into_iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, vec!['a', 'b']);
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.delivered(), 2);
        assert!(queue.pop().is_none());
    }
}
