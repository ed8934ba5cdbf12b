// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Event-like members: multicast callbacks whose subscriber list is what
//! gets monitored.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Read access to an event's invocation list.
pub trait EventSource: Send + Sync {
    /// Number of entries in the invocation list, internal handlers included.
    fn invocation_count(&self) -> usize;

    /// Handlers installed by the event itself rather than by subscribers.
    fn internal_handler_count(&self) -> usize {
        0
    }

    fn for_each_subscriber(&self, visit: &mut dyn FnMut(&str));
}

/// How a subscriber count is derived from an invocation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriberCountPolicy {
    /// Report the invocation list length as is.
    Raw,
    /// Subtract handlers the event installs itself.
    #[default]
    ExcludeInternal,
}

impl SubscriberCountPolicy {
    pub fn count(self, source: &dyn EventSource) -> usize {
        match self {
            SubscriberCountPolicy::Raw => source.invocation_count(),
            SubscriberCountPolicy::ExcludeInternal => source
                .invocation_count()
                .saturating_sub(source.internal_handler_count()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Handler<A> = Arc<dyn Fn(&A) + Send + Sync>;

struct Subscriber<A> {
    id: SubscriptionId,
    name: String,
    internal: bool,
    handler: Handler<A>,
}

/// A monitorable multicast event.
pub struct MonitoredEvent<A> {
    subscribers: RwLock<Vec<Subscriber<A>>>,
    next_id: AtomicU64,
}

impl<A> Default for MonitoredEvent<A> {
    fn default() -> Self {
        Self {
            subscribers: RwLock::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl<A> MonitoredEvent<A> {
    pub fn new() -> Self {
        Self::default()
    }

    /// An event that always carries one no-op internal handler, so invoking
    /// it never needs an emptiness check.
    pub fn with_default_handler() -> Self {
        let event = Self::new();
        event.push("<default>", true, Arc::new(|_: &A| {}));
        event
    }

    pub fn subscribe<F>(&self, name: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&A) + Send + Sync + 'static,
    {
        self.push(name, false, Arc::new(handler))
    }

    fn push(&self, name: impl Into<String>, internal: bool, handler: Handler<A>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.write().push(Subscriber {
            id,
            name: name.into(),
            internal,
            handler,
        });
        id
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscribers = self.subscribers.write();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// Call every handler. Handlers run outside the lock so they may
    /// subscribe or unsubscribe.
    pub fn invoke(&self, args: &A) {
        let handlers: Vec<Handler<A>> = self
            .subscribers
            .read()
            .iter()
            .map(|s| s.handler.clone())
            .collect();
        for handler in handlers {
            handler(args);
        }
    }
}

impl<A: 'static> EventSource for MonitoredEvent<A> {
    fn invocation_count(&self) -> usize {
        self.subscribers.read().len()
    }

    fn internal_handler_count(&self) -> usize {
        self.subscribers.read().iter().filter(|s| s.internal).count()
    }

    fn for_each_subscriber(&self, visit: &mut dyn FnMut(&str)) {
        for subscriber in self.subscribers.read().iter().filter(|s| !s.internal) {
            visit(&subscriber.name);
        }
    }
}

impl<A> fmt::Debug for MonitoredEvent<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MonitoredEvent")
            .field("handlers", &self.subscribers.read().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_invoke_reaches_every_subscriber() {
        let event = MonitoredEvent::<u32>::new();
        let total = Arc::new(AtomicUsize::new(0));
        for name in ["a", "b"] {
            let total = total.clone();
            event.subscribe(name, move |v: &u32| {
                total.fetch_add(*v as usize, Ordering::SeqCst);
            });
        }
        event.invoke(&5);
        assert_eq!(total.load(Ordering::SeqCst), 10);
    }

    #[test]
    fn test_unsubscribe_removes_handler() {
        let event = MonitoredEvent::<()>::new();
        let id = event.subscribe("hud", |_| {});
        assert_eq!(event.invocation_count(), 1);
        assert!(event.unsubscribe(id));
        assert!(!event.unsubscribe(id));
        assert_eq!(event.invocation_count(), 0);
    }

    #[test]
    fn test_count_policy_handles_internal_handler() {
        let event = MonitoredEvent::<()>::with_default_handler();
        event.subscribe("logger", |_| {});

        assert_eq!(SubscriberCountPolicy::Raw.count(&event), 2);
        assert_eq!(SubscriberCountPolicy::ExcludeInternal.count(&event), 1);

        let mut names = Vec::new();
        event.for_each_subscriber(&mut |n| names.push(n.to_string()));
        assert_eq!(names, vec!["logger"]);
    }
}
