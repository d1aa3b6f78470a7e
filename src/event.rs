// Event bus - append-only log plus per-kind subscriber lists

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Log,
    Action,
    StateChange,
    Error,
    Warning,
}

/// One entry in the run's event stream.
///
/// `tick` is the VM's instruction count at emission time. `timestamp`
/// is wall-clock milliseconds; nothing downstream depends on it.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub kind: EventKind,
    pub data: serde_json::Value,
    pub tick: usize,
    pub timestamp: u128,
}

type Callback = Box<dyn FnMut(&Event)>;

/// Dispatches events to subscribers in subscription order and keeps the
/// append-only log the analyzer reads afterwards.
#[derive(Default)]
pub struct EventBus {
    subscribers: HashMap<EventKind, Vec<Callback>>,
    log: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on<F>(&mut self, kind: EventKind, callback: F)
    where
        F: FnMut(&Event) + 'static,
    {
        self.subscribers
            .entry(kind)
            .or_default()
            .push(Box::new(callback));
    }

    pub fn emit(&mut self, kind: EventKind, data: serde_json::Value, tick: usize) {
        let event = Event {
            kind,
            data,
            tick,
            timestamp: SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_millis())
                .unwrap_or(0),
        };
        self.log.push(event.clone());
        if let Some(callbacks) = self.subscribers.get_mut(&kind) {
            for callback in callbacks.iter_mut() {
                callback(&event);
            }
        }
    }

    pub fn events(&self) -> &[Event] {
        &self.log
    }

    pub fn clear(&mut self) {
        self.log.clear();
    }
}
