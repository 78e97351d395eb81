//! Event emitter for heapviz.
//!
//! Listeners subscribe either to one event name or to every event. Events
//! name themselves through [`Event::name`], so emitting needs no key.

use std::collections::HashMap;
use std::fmt;

/// An event that can be dispatched by name.
pub trait Event {
    fn name(&self) -> &'static str;
}

type Listener<T> = Box<dyn FnMut(&T) + Send>;

/// A simple event emitter that allows subscribing to and emitting events.
pub struct Emitter<T> {
    listeners: HashMap<&'static str, Vec<Listener<T>>>,
    wildcard: Vec<Listener<T>>,
}

impl<T: Event> Emitter<T> {
    pub fn new() -> Self {
        Self {
            listeners: HashMap::new(),
            wildcard: Vec::new(),
        }
    }

    /// Subscribe to an event with a callback
    pub fn on<F>(&mut self, event: &'static str, callback: F)
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.listeners
            .entry(event)
            .or_default()
            .push(Box::new(callback));
    }

    /// Subscribe to every event
    pub fn on_any<F>(&mut self, callback: F)
    where
        F: FnMut(&T) + Send + 'static,
    {
        self.wildcard.push(Box::new(callback));
    }

    /// Emit an event to its subscribers, then to wildcard subscribers
    pub fn emit(&mut self, event: &T) {
        if let Some(listeners) = self.listeners.get_mut(event.name()) {
            for listener in listeners {
                listener(event);
            }
        }
        for listener in &mut self.wildcard {
            listener(event);
        }
    }

    /// Whether emitting `event` would reach anyone, wildcards included
    pub fn has_listeners(&self, event: &str) -> bool {
        !self.wildcard.is_empty()
            || self
                .listeners
                .get(event)
                .map(|l| !l.is_empty())
                .unwrap_or(false)
    }
}

impl<T: Event> Default for Emitter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Emitter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.listeners.keys().collect();
        names.sort();
        f.debug_struct("Emitter")
            .field("events", &names)
            .field("wildcard", &self.wildcard.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Ping {
        A(i32),
        B(i32),
    }

    impl Event for Ping {
        fn name(&self) -> &'static str {
            match self {
                Ping::A(_) => "a",
                Ping::B(_) => "b",
            }
        }
    }

    #[test]
    fn test_emitter_dispatches_by_name() {
        let mut emitter: Emitter<Ping> = Emitter::new();
        let event_a = Arc::new(Mutex::new(Vec::new()));
        let event_b = Arc::new(Mutex::new(Vec::new()));

        {
            let event_a = event_a.clone();
            emitter.on("a", move |v| event_a.lock().unwrap().push(v.clone()));
        }
        {
            let event_b = event_b.clone();
            emitter.on("b", move |v| event_b.lock().unwrap().push(v.clone()));
        }

        emitter.emit(&Ping::A(1));
        emitter.emit(&Ping::B(2));
        emitter.emit(&Ping::A(3));

        assert_eq!(*event_a.lock().unwrap(), vec![Ping::A(1), Ping::A(3)]);
        assert_eq!(*event_b.lock().unwrap(), vec![Ping::B(2)]);
    }

    #[test]
    fn test_emitter_wildcard_sees_everything() {
        let mut emitter: Emitter<Ping> = Emitter::new();
        let count = Arc::new(Mutex::new(0));
        {
            let count = count.clone();
            emitter.on_any(move |_| *count.lock().unwrap() += 1);
        }
        emitter.emit(&Ping::A(1));
        emitter.emit(&Ping::B(1));
        assert_eq!(*count.lock().unwrap(), 2);
    }

    #[test]
    fn test_emitter_has_listeners() {
        let mut emitter: Emitter<Ping> = Emitter::new();
        assert!(!emitter.has_listeners("a"));

        emitter.on("a", |_v| {});
        assert!(emitter.has_listeners("a"));
        assert!(!emitter.has_listeners("b"));

        emitter.on_any(|_v| {});
        assert!(emitter.has_listeners("b"));
    }
}
