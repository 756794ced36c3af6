//! Crossbeam-backed channel carrying [`Event`]s out of the batch workers.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Producer half, cloned into every rayon worker
#[derive(Clone)]
pub struct EventSender {
    inner: Sender<Event>,
}

impl EventSender {
    /// Publish an event; a disconnected receiver drops it.
    pub fn send(&self, event: Event) {
        let _ = self.inner.send(event);
    }
}

/// Consumer half, held by the UI layer
pub struct EventReceiver {
    inner: Receiver<Event>,
}

impl EventReceiver {
    /// Drain events until every sender is dropped
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.inner.iter()
    }
}

/// Constructors for sender/receiver pairs
pub struct EventChannel;

impl EventChannel {
    /// Unbounded channel; progress events are tiny.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (EventSender, EventReceiver) {
        let (sender, receiver) = unbounded();
        (EventSender { inner: sender }, EventReceiver { inner: receiver })
    }
}

/// Sender whose receiver is already dropped; every event is discarded.
pub fn null_sender() -> EventSender {
    let (sender, _receiver) = EventChannel::new();
    sender
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{BatchEvent, BatchProgress};
    use std::thread;

    #[test]
    fn events_can_be_sent_across_threads() {
        let (sender, receiver) = EventChannel::new();

        let handle = thread::spawn(move || {
            sender.send(Event::Batch(BatchEvent::Progress(BatchProgress {
                completed: 3,
                total: 5,
                current_name: "dress".to_string(),
            })));
        });

        handle.join().unwrap();

        match receiver.iter().next().unwrap() {
            Event::Batch(BatchEvent::Progress(p)) => {
                assert_eq!(p.completed, 3);
                assert_eq!(p.current_name, "dress");
            }
            _ => panic!("Wrong event type"),
        };
    }

    #[test]
    fn null_sender_does_not_panic() {
        let sender = null_sender();
        sender.send(Event::Batch(BatchEvent::Started { total_candidates: 1 }));
    }

    #[test]
    fn iteration_ends_when_senders_drop() {
        let (sender, receiver) = EventChannel::new();
        sender.send(Event::Batch(BatchEvent::Started { total_candidates: 2 }));
        drop(sender);

        assert_eq!(receiver.iter().count(), 1);
        assert!(receiver.iter().next().is_none());
    }
}
