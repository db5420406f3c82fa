//! Lock-free hand-off of gate readings from interrupt context to the loop

use heapless::spsc::{Consumer, Producer};
use crate::types::Reading;

/// Producer side of the reading queue, owned by the gate interrupt.
///
/// A full queue drops the new reading and counts the drop; the interrupt
/// never waits on the consumer.
pub struct TelemetryLink<'q, const N: usize> {
    producer: Producer<'q, Reading, N>,
    dropped: u32,
}

impl<'q, const N: usize> TelemetryLink<'q, N> {
    pub fn new(producer: Producer<'q, Reading, N>) -> Self {
        Self { producer, dropped: 0 }
    }

    /// Queue a reading; returns false if it was dropped
    pub fn report(&mut self, reading: Reading) -> bool {
        match self.producer.enqueue(reading) {
            Ok(()) => true,
            Err(_) => {
                self.dropped = self.dropped.saturating_add(1);
                false
            }
        }
    }

    /// Readings lost to a full queue since start-up
    pub fn dropped(&self) -> u32 {
        self.dropped
    }
}

/// Hand every queued reading to `f`; returns how many were drained
pub fn drain<const N: usize, F>(consumer: &mut Consumer<'_, Reading, N>, mut f: F) -> usize
where
    F: FnMut(Reading),
{
    let mut drained = 0;
    while let Some(reading) = consumer.dequeue() {
        f(reading);
        drained += 1;
    }
    drained
}
