// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use crate::demo::{AmmoCrate, Soldier, Supply};
use anyhow::Result;
use monitorlib::{MonitorSettings, MonitorUnit, Target};
use std::sync::Arc;

pub fn run(settings: MonitorSettings, ticks: u32) -> Result<()> {
    let outcome = super::profile(settings)?;
    let registry = outcome.registry;

    let soldier = Arc::new(Soldier::new("Vasquez", 80));
    let ammo = Arc::new(AmmoCrate {
        supply: Supply { contents: 120 },
        caliber: "9mm".to_string(),
    });
    let soldier_target: Target = soldier.clone();
    let ammo_target: Target = ammo;

    let mut statics = registry.create_static_units();
    let mut soldier_units = registry.units_for(&soldier_target)?;
    let mut ammo_units = registry.units_for(&ammo_target)?;

    for tick in 0..ticks {
        println!("-- tick {tick}");
        print_units("statics", &mut statics);
        print_units("Soldier", &mut soldier_units);
        print_units("AmmoCrate", &mut ammo_units);

        soldier.orders.lock().push(format!("hold position {tick}"));
        soldier.on_hit.subscribe(format!("medic {tick}"), |_| {});
        for unit in soldier_units.iter_mut().filter(|u| u.info().writable) {
            if let Err(e) = unit.write(vec![format!("regroup {tick}")]) {
                tracing::warn!(member = %unit.info().member_name, "Write failed: {}", e);
            }
        }
    }

    drop(soldier_target);
    drop(soldier);
    let alive = soldier_units.iter().filter(|u| u.is_target_alive()).count();
    println!("-- after drop: {alive} soldier unit(s) still bound");
    Ok(())
}

fn print_units(title: &str, units: &mut [Box<dyn MonitorUnit>]) {
    println!("{title}:");
    for unit in units.iter_mut() {
        if !unit.is_enabled() || !unit.is_visible() {
            continue;
        }
        for line in unit.refresh().lines() {
            println!("  {line}");
        }
    }
}
