// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Values held behind a lock.
//!
//! `#[monitor(guarded)]` fields are read by lending the guarded value to the
//! profile for the duration of one read. A poisoned std lock reads as null
//! and ignores writes.

use parking_lot::{Mutex, RwLock};

pub trait Guarded: Send + Sync {
    type Value;

    fn visit(&self, visit: &mut dyn FnMut(Option<&Self::Value>));

    fn replace(&self, value: Self::Value);
}

impl<V: Send> Guarded for Mutex<V> {
    type Value = V;

    fn visit(&self, visit: &mut dyn FnMut(Option<&V>)) {
        visit(Some(&*self.lock()));
    }

    fn replace(&self, value: V) {
        *self.lock() = value;
    }
}

impl<V: Send + Sync> Guarded for RwLock<V> {
    type Value = V;

    fn visit(&self, visit: &mut dyn FnMut(Option<&V>)) {
        visit(Some(&*self.read()));
    }

    fn replace(&self, value: V) {
        *self.write() = value;
    }
}

impl<V: Send> Guarded for std::sync::Mutex<V> {
    type Value = V;

    fn visit(&self, visit: &mut dyn FnMut(Option<&V>)) {
        match self.lock() {
            Ok(guard) => visit(Some(&*guard)),
            Err(_) => visit(None),
        }
    }

    fn replace(&self, value: V) {
        if let Ok(mut guard) = self.lock() {
            *guard = value;
        }
    }
}

impl<V: Send + Sync> Guarded for std::sync::RwLock<V> {
    type Value = V;

    fn visit(&self, visit: &mut dyn FnMut(Option<&V>)) {
        match self.read() {
            Ok(guard) => visit(Some(&*guard)),
            Err(_) => visit(None),
        }
    }

    fn replace(&self, value: V) {
        if let Ok(mut guard) = self.write() {
            *guard = value;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn read<G: Guarded>(guarded: &G) -> Option<G::Value>
    where
        G::Value: Clone,
    {
        let mut out = None;
        guarded.visit(&mut |v| out = v.cloned());
        out
    }

    #[test]
    fn test_parking_lot_locks_lend_and_replace() {
        let mutex = Mutex::new(3_i32);
        mutex.replace(7);
        assert_eq!(read(&mutex), Some(7));

        let rw = RwLock::new(String::from("a"));
        rw.replace("b".into());
        assert_eq!(read(&rw).as_deref(), Some("b"));
    }

    #[test]
    fn test_poisoned_std_mutex_reads_null() {
        let mutex = Arc::new(std::sync::Mutex::new(1_u8));
        let poisoner = mutex.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.lock();
            panic!("poison");
        })
        .join();

        assert!(mutex.is_poisoned());
        assert_eq!(read(&*mutex), None);
        mutex.replace(9);
        assert_eq!(read(&*mutex), None);
    }
}
