// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Modules registered at link time, profiled through a session whose result
//! is pumped back on the test thread.

use monitorlib::{
    monitor_members, register_monitor_module, MainThreadQueue, MetadataError, MonitorSettings, Monitored,
    ProfilingOutcome, ProfilingSession, Profiler, ScanIssueKind, Target, TypeUniverse,
};
use parking_lot::Mutex;
use serial_test::serial;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

static BEACONS: AtomicU32 = AtomicU32::new(0);

#[derive(Monitored)]
#[monitor(members)]
struct Outpost {
    #[monitor(label = "Sector")]
    sector: String,
}

#[monitor_members]
impl Outpost {
    #[monitor(label = "Beacons")]
    fn beacons() -> u32 {
        BEACONS.load(Ordering::Relaxed)
    }
}

#[derive(Monitored)]
struct Relay {
    #[monitor]
    channel: u8,
}

#[derive(Monitored)]
struct Signal<T> {
    #[monitor]
    strength: T,
}

#[derive(Monitored)]
struct Antenna {
    #[monitor(base)]
    signal: Signal<f64>,
}

register_monitor_module! {
    name = "frontier",
    types = [Outpost, Antenna],
    generic_definitions = [Signal<f64>],
}

register_monitor_module! {
    name = "backwater",
    exclude = true,
    types = [Relay],
}

// `Relay` is not generic, so building this module fails.
register_monitor_module! {
    name = "wasteland",
    generic_definitions = [Relay],
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new("monitorlib=debug"))
        .with_test_writer()
        .try_init();
}

fn profile_loaded(async_profiling: bool) -> ProfilingOutcome {
    let queue = MainThreadQueue::new();
    let slot = Arc::new(Mutex::new(None));
    let sink = slot.clone();
    let settings = MonitorSettings {
        async_profiling,
        ..MonitorSettings::default()
    };

    let mut session = ProfilingSession::start(
        Arc::new(Profiler::new(settings)),
        TypeUniverse::loaded(),
        queue.clone(),
        move |result| *sink.lock() = Some(result),
    )
    .unwrap();

    let deadline = Instant::now() + Duration::from_secs(10);
    while !session.is_finished() {
        assert!(Instant::now() < deadline, "profiling session did not finish");
        queue.pump().unwrap();
        std::thread::sleep(Duration::from_millis(1));
    }
    session.join().unwrap();

    let result = slot.lock().take().unwrap();
    result.unwrap()
}

#[test]
fn test_loaded_modules_are_sorted_by_name() {
    let universe = TypeUniverse::loaded();
    let names: Vec<&str> = universe.module_names().collect();
    assert_eq!(names, vec!["backwater", "frontier", "wasteland"]);

    let failures: Vec<_> = universe
        .modules()
        .filter_map(|(name, module)| module.err().map(|e| (name.to_string(), e)))
        .collect();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "wasteland");
    assert!(matches!(failures[0].1, MetadataError::NotGeneric { .. }));
}

#[test]
#[serial]
fn test_worker_session_profiles_registered_modules() {
    init_tracing();
    let outcome = profile_loaded(true);

    let stats = outcome.report.stats();
    assert_eq!(stats.modules_scanned, 1);
    assert_eq!(stats.modules_skipped, 2);
    assert_eq!(stats.resolved, 1);
    assert_eq!(outcome.report.count_kind(ScanIssueKind::ModuleIntrospection), 1);

    let antenna: Target = Arc::new(Antenna {
        signal: Signal { strength: 0.75 },
    });
    let mut units = outcome.registry.units_for(&antenna).unwrap();
    assert_eq!(units.len(), 1);
    assert_eq!(units[0].refresh(), "strength: 0.75");

    let outpost: Target = Arc::new(Outpost {
        sector: "north".to_string(),
    });
    let mut units = outcome.registry.units_for(&outpost).unwrap();
    assert_eq!(units[0].refresh(), "Sector: north");
}

#[test]
#[serial]
fn test_static_units_read_live_values() {
    let outcome = profile_loaded(false);
    let mut statics = outcome.registry.create_static_units();
    assert_eq!(statics.len(), 1);

    BEACONS.store(2, Ordering::Relaxed);
    assert_eq!(statics[0].refresh(), "Beacons: 2");
    BEACONS.fetch_add(1, Ordering::Relaxed);
    assert_eq!(statics[0].refresh(), "Beacons: 3");
}

#[test]
#[serial]
fn test_sync_and_async_sessions_agree() {
    let worker = profile_loaded(true);
    let inline = profile_loaded(false);
    assert_eq!(worker.registry.summary(), inline.registry.summary());
    assert_eq!(worker.report.stats(), inline.report.stats());
}
