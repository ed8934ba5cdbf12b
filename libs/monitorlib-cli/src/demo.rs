// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Built-in sample types, registered as module `arena`.

use monitorlib::{monitor_members, Monitored, MonitoredEvent};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

static ROSTER: AtomicU32 = AtomicU32::new(0);

#[derive(Monitored)]
pub struct Actor {
    #[monitor(label = "Name")]
    pub name: String,
}

#[derive(Monitored)]
#[monitor(members, tags = ["unit"])]
pub struct Soldier {
    #[monitor(base)]
    pub actor: Actor,

    #[monitor(label = "HP", show_if = Positive)]
    pub hp: i32,

    #[monitor(guarded, writable, element_prefix = "-")]
    pub orders: Mutex<Vec<String>>,

    #[monitor(event)]
    pub on_hit: MonitoredEvent<i32>,
}

#[monitor_members]
impl Soldier {
    #[monitor(format = "F1", show_if = method("is_alive"))]
    fn speed(&self) -> f32 {
        if self.hp > 50 { 4.5 } else { 2.0 }
    }

    #[monitor(args = [3])]
    fn damage_at(&self, level: i64) -> i64 {
        level * 10
    }

    #[monitor(label = "Roster")]
    fn roster() -> u32 {
        ROSTER.load(Ordering::Relaxed)
    }

    #[monitor(predicate)]
    fn is_alive(&self) -> bool {
        self.hp > 0
    }
}

impl Soldier {
    pub fn new(name: &str, hp: i32) -> Self {
        ROSTER.fetch_add(1, Ordering::Relaxed);
        Self {
            actor: Actor { name: name.to_string() },
            hp,
            orders: Mutex::new(Vec::new()),
            on_hit: MonitoredEvent::new(),
        }
    }
}

/// Generic container; its monitored member is declared on the open
/// definition and resolved for every closed instantiation.
#[derive(Monitored)]
pub struct Supply<T> {
    #[monitor(label = "Contents")]
    pub contents: T,
}

#[derive(Monitored)]
pub struct AmmoCrate {
    #[monitor(base)]
    pub supply: Supply<u32>,

    #[monitor]
    pub caliber: String,
}

monitorlib::register_monitor_module! {
    name = "arena",
    types = [Actor, Soldier, AmmoCrate],
    generic_definitions = [Supply<u32>],
}
