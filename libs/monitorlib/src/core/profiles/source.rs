// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Target-agnostic accessors. The holder instance is passed at call time,
//! so one source serves every unit of a profile.

use crate::core::values::EventSource;
use std::any::Any;

/// Read access to a monitored value.
pub trait ValueSource<V>: Send + Sync {
    /// Hand the current value (or `None` when there is none) to `visit`.
    /// Instance sources expect `holder` to be the declaring instance.
    fn read(&self, holder: Option<&dyn Any>, visit: &mut dyn FnMut(Option<&V>));
}

/// Write access for writable members.
pub trait ValueSink<V>: Send + Sync {
    /// `false` when `holder` is not the expected instance.
    fn write(&self, holder: Option<&dyn Any>, value: V) -> bool;
}

/// How an instance member's value is reached from its holder `D`.
pub enum InstanceAccess<D, V> {
    /// Borrow a field.
    Borrow(fn(&D) -> &V),
    /// Borrow an optional field.
    Optional(fn(&D) -> Option<&V>),
    /// Lend the value to a visitor, for values behind a lock.
    Visit(fn(&D, &mut dyn FnMut(Option<&V>))),
    /// Compute a value (properties).
    Compute(fn(&D) -> V),
}

impl<D: Any + Send + Sync, V: Send + Sync + 'static> ValueSource<V> for InstanceAccess<D, V> {
    fn read(&self, holder: Option<&dyn Any>, visit: &mut dyn FnMut(Option<&V>)) {
        let Some(holder) = holder.and_then(|h| h.downcast_ref::<D>()) else {
            visit(None);
            return;
        };
        match self {
            InstanceAccess::Borrow(get) => visit(Some(get(holder))),
            InstanceAccess::Optional(get) => visit(get(holder)),
            InstanceAccess::Visit(lend) => lend(holder, visit),
            InstanceAccess::Compute(get) => {
                let value = get(holder);
                visit(Some(&value));
            }
        }
    }
}

/// How a static member's value is reached.
pub enum StaticAccess<V: 'static> {
    Borrow(fn() -> &'static V),
    Visit(fn(&mut dyn FnMut(Option<&V>))),
    Compute(fn() -> V),
}

impl<V: Send + Sync + 'static> ValueSource<V> for StaticAccess<V> {
    fn read(&self, _holder: Option<&dyn Any>, visit: &mut dyn FnMut(Option<&V>)) {
        match self {
            StaticAccess::Borrow(get) => visit(Some(get())),
            StaticAccess::Visit(lend) => lend(visit),
            StaticAccess::Compute(get) => {
                let value = get();
                visit(Some(&value));
            }
        }
    }
}

/// Instance method called with arguments fixed by the marker.
pub struct MethodSource<D, A, V> {
    pub call: fn(&D, &A) -> V,
    pub args: A,
}

impl<D, A, V> ValueSource<V> for MethodSource<D, A, V>
where
    D: Any + Send + Sync,
    A: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn read(&self, holder: Option<&dyn Any>, visit: &mut dyn FnMut(Option<&V>)) {
        match holder.and_then(|h| h.downcast_ref::<D>()) {
            Some(holder) => {
                let value = (self.call)(holder, &self.args);
                visit(Some(&value));
            }
            None => visit(None),
        }
    }
}

/// Static method called with arguments fixed by the marker.
pub struct StaticMethodSource<A, V> {
    pub call: fn(&A) -> V,
    pub args: A,
}

impl<A, V> ValueSource<V> for StaticMethodSource<A, V>
where
    A: Send + Sync + 'static,
    V: Send + Sync + 'static,
{
    fn read(&self, _holder: Option<&dyn Any>, visit: &mut dyn FnMut(Option<&V>)) {
        let value = (self.call)(&self.args);
        visit(Some(&value));
    }
}

/// Setter on an instance. Takes `&D`: monitored state that can be written
/// from outside lives behind interior mutability.
pub struct InstanceSink<D, V>(pub fn(&D, V));

impl<D: Any + Send + Sync, V: 'static> ValueSink<V> for InstanceSink<D, V> {
    fn write(&self, holder: Option<&dyn Any>, value: V) -> bool {
        match holder.and_then(|h| h.downcast_ref::<D>()) {
            Some(holder) => {
                (self.0)(holder, value);
                true
            }
            None => false,
        }
    }
}

pub struct StaticSink<V>(pub fn(V));

impl<V: 'static> ValueSink<V> for StaticSink<V> {
    fn write(&self, _holder: Option<&dyn Any>, value: V) -> bool {
        (self.0)(value);
        true
    }
}

/// Read access to an event member.
pub trait EventAccess: Send + Sync {
    fn with_source(&self, holder: Option<&dyn Any>, visit: &mut dyn FnMut(Option<&dyn EventSource>));
}

pub struct InstanceEvent<D, E>(pub fn(&D) -> &E);

impl<D: Any + Send + Sync, E: EventSource + 'static> EventAccess for InstanceEvent<D, E> {
    fn with_source(&self, holder: Option<&dyn Any>, visit: &mut dyn FnMut(Option<&dyn EventSource>)) {
        match holder.and_then(|h| h.downcast_ref::<D>()) {
            Some(holder) => visit(Some((self.0)(holder))),
            None => visit(None),
        }
    }
}

pub struct StaticEvent<E: 'static>(pub fn() -> &'static E);

impl<E: EventSource + 'static> EventAccess for StaticEvent<E> {
    fn with_source(&self, _holder: Option<&dyn Any>, visit: &mut dyn FnMut(Option<&dyn EventSource>)) {
        visit(Some((self.0)()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    struct Player {
        hp: u32,
        name: Option<String>,
        log: Mutex<Vec<u32>>,
    }

    fn player() -> Player {
        Player {
            hp: 10,
            name: None,
            log: Mutex::new(vec![1, 2]),
        }
    }

    fn read<V: Clone>(source: &dyn ValueSource<V>, holder: Option<&dyn Any>) -> Option<V> {
        let mut out = None;
        source.read(holder, &mut |v| out = v.cloned());
        out
    }

    #[test]
    fn test_instance_access_variants() {
        let p = player();
        let holder = Some(&p as &dyn Any);
        let hp = InstanceAccess::<Player, u32>::Borrow(|p| &p.hp);
        let name = InstanceAccess::<Player, String>::Optional(|p| p.name.as_ref());
        let double = InstanceAccess::<Player, u32>::Compute(|p| p.hp * 2);
        let log = InstanceAccess::<Player, Vec<u32>>::Visit(|p, visit| visit(Some(&*p.log.lock())));

        assert_eq!(read::<u32>(&hp, holder), Some(10));
        assert_eq!(read::<String>(&name, holder), None);
        assert_eq!(read::<u32>(&double, holder), Some(20));
        assert_eq!(read::<Vec<u32>>(&log, holder), Some(vec![1, 2]));
    }

    #[test]
    fn test_wrong_holder_reads_none() {
        let hp = InstanceAccess::<Player, u32>::Borrow(|p| &p.hp);
        assert_eq!(read::<u32>(&hp, Some(&5u8 as &dyn Any)), None);
        assert_eq!(read::<u32>(&hp, None), None);
    }

    #[test]
    fn test_method_source_uses_fixed_args() {
        let p = player();
        let source = MethodSource::<Player, (u32,), u32> {
            call: |p, args| p.hp + args.0,
            args: (5,),
        };
        assert_eq!(read::<u32>(&source, Some(&p as &dyn Any)), Some(15));
    }

    #[test]
    fn test_instance_sink_writes_through_interior_mutability() {
        let p = player();
        let sink = InstanceSink::<Player, u32>(|p, v| p.log.lock().push(v));
        assert!(sink.write(Some(&p as &dyn Any), 3));
        assert!(!sink.write(Some(&1u8 as &dyn Any), 4));
        assert_eq!(*p.log.lock(), vec![1, 2, 3]);
    }
}
