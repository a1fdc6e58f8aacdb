//! Approximate time synchronization of two message streams.
//!
//! Pairs e.g. camera frames with the detection arrays computed from them when
//! both carry capture timestamps but arrive independently.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::trace;

/// A message with its capture timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimestampedMessage<T> {
    pub stamp: Duration,
    pub payload: T,
}

impl<T> TimestampedMessage<T> {
    pub fn new(stamp: Duration, payload: T) -> Self {
        Self { stamp, payload }
    }
}

/// Pairs messages from two streams whose stamps differ by at most `slop`.
///
/// Each stream keeps at most `queue_size` unmatched messages; the oldest is
/// dropped on overflow. Emitting a pair discards every pending message that is
/// not newer than the paired ones.
#[derive(Debug, Clone)]
pub struct ApproximateSynchronizer<A, B> {
    left: VecDeque<TimestampedMessage<A>>,
    right: VecDeque<TimestampedMessage<B>>,
    queue_size: usize,
    slop: Duration,
}

impl<A, B> Default for ApproximateSynchronizer<A, B> {
    fn default() -> Self {
        Self::new(10, Duration::from_millis(500))
    }
}

impl<A, B> ApproximateSynchronizer<A, B> {
    pub fn new(queue_size: usize, slop: Duration) -> Self {
        let queue_size = queue_size.max(1);
        Self {
            left: VecDeque::with_capacity(queue_size),
            right: VecDeque::with_capacity(queue_size),
            queue_size,
            slop,
        }
    }

    pub fn pending(&self) -> (usize, usize) {
        (self.left.len(), self.right.len())
    }

    pub fn push_left(
        &mut self,
        msg: TimestampedMessage<A>,
    ) -> Option<(TimestampedMessage<A>, TimestampedMessage<B>)> {
        let Some(j) = closest(&self.right, msg.stamp, self.slop) else {
            enqueue(&mut self.left, msg, self.queue_size);
            return None;
        };
        let other = self.right.remove(j)?;
        drop_through(&mut self.right, other.stamp);
        drop_through(&mut self.left, msg.stamp);
        Some((msg, other))
    }

    pub fn push_right(
        &mut self,
        msg: TimestampedMessage<B>,
    ) -> Option<(TimestampedMessage<A>, TimestampedMessage<B>)> {
        let Some(i) = closest(&self.left, msg.stamp, self.slop) else {
            enqueue(&mut self.right, msg, self.queue_size);
            return None;
        };
        let other = self.left.remove(i)?;
        drop_through(&mut self.left, other.stamp);
        drop_through(&mut self.right, msg.stamp);
        Some((other, msg))
    }
}

/// Index of the pending message closest to `stamp`, earliest on ties.
fn closest<T>(
    queue: &VecDeque<TimestampedMessage<T>>,
    stamp: Duration,
    slop: Duration,
) -> Option<usize> {
    queue
        .iter()
        .enumerate()
        .map(|(i, m)| (i, m.stamp.abs_diff(stamp)))
        .filter(|&(_, diff)| diff <= slop)
        .min_by_key(|&(i, diff)| (diff, i))
        .map(|(i, _)| i)
}

fn enqueue<T>(
    queue: &mut VecDeque<TimestampedMessage<T>>,
    msg: TimestampedMessage<T>,
    queue_size: usize,
) {
    queue.push_back(msg);
    while queue.len() > queue_size {
        if let Some(dropped) = queue.pop_front() {
            trace!(stamp = ?dropped.stamp, "dropping unsynchronized message");
        }
    }
}

fn drop_through<T>(queue: &mut VecDeque<TimestampedMessage<T>>, stamp: Duration) {
    queue.retain(|m| m.stamp > stamp);
}
