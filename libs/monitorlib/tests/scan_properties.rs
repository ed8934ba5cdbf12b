// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Whole-run properties of the profiler: every marked member compiled once,
//! stable output across runs, and module-level failures contained.

use monitorlib::{
    CancellationToken, MetadataError, ModuleDescriptor, MonitorSettings, Monitored, ProfilingOutcome, Profiler,
    ScanIssueKind, Severity, Target, TypeUniverse,
};
use std::sync::Arc;

#[derive(Monitored)]
struct Tower {
    #[monitor]
    height: f32,

    #[monitor]
    floors: Vec<u16>,

    #[monitor(label = "Keeper")]
    keeper: Option<String>,

    #[allow(dead_code)]
    unmarked: u8,
}

#[derive(Monitored)]
struct Lamp {
    #[monitor]
    lit: bool,
}

#[derive(Monitored)]
#[monitor(exclude)]
struct Scaffold {
    #[monitor]
    beams: u32,
}

#[derive(Monitored)]
struct Crate<T> {
    #[monitor]
    stock: T,
}

#[derive(Monitored)]
struct Bunker {
    #[monitor(base)]
    store: Crate<i32>,
}

/// Reaches `Crate<i32>` through its base chain and again as an interface.
#[derive(Monitored)]
struct Depot {
    #[monitor(base)]
    bunker: Bunker,

    #[monitor(interface)]
    spare: Crate<i32>,
}

fn tower() -> Tower {
    Tower {
        height: 12.5,
        floors: Vec::new(),
        keeper: None,
        unmarked: 0,
    }
}

fn citadel() -> ModuleDescriptor {
    ModuleDescriptor::new("citadel")
        .with_type(Tower::type_descriptor())
        .unwrap()
        .with_type(Scaffold::type_descriptor())
        .unwrap()
        .with_type(Bunker::type_descriptor())
        .unwrap()
        .with_type(Depot::type_descriptor())
        .unwrap()
        .with_type(Crate::<i32>::generic_definition().unwrap())
        .unwrap()
}

fn run(universe: &TypeUniverse, settings: MonitorSettings) -> ProfilingOutcome {
    Profiler::new(settings)
        .run(universe, &CancellationToken::new())
        .unwrap()
}

#[test]
fn test_every_marked_member_is_profiled_once() {
    let outcome = run(&TypeUniverse::from_modules([citadel()]), MonitorSettings::default());
    let summary = outcome.registry.summary();

    let names: Vec<(&str, &str)> = summary
        .types
        .iter()
        .flat_map(|t| t.profiles.iter().map(move |p| (t.type_name.as_str(), p.member_name.as_str())))
        .collect();
    assert_eq!(
        names,
        vec![
            ("Tower", "height"),
            ("Tower", "floors"),
            ("Tower", "keeper"),
            ("Bunker", "stock"),
            ("Depot", "stock"),
        ]
    );
    assert_eq!(outcome.report.stats().candidates, 4);
    assert_eq!(outcome.report.stats().resolved, 2);
    assert!(outcome.report.issues().is_empty());
}

#[test]
fn test_member_reached_through_two_paths_binds_once() {
    let outcome = run(&TypeUniverse::from_modules([citadel()]), MonitorSettings::default());
    let depot: Target = Arc::new(Depot {
        bunker: Bunker {
            store: Crate { stock: 1 },
        },
        spare: Crate { stock: 2 },
    });

    let mut units = outcome.registry.units_for(&depot).unwrap();
    assert_eq!(units.len(), 1);
    // Base chain first.
    assert_eq!(units[0].refresh(), "stock: 1");
}

#[test]
fn test_null_and_empty_values_render_as_text() {
    let outcome = run(&TypeUniverse::from_modules([citadel()]), MonitorSettings::default());
    let target: Target = Arc::new(tower());

    let texts: Vec<String> = outcome
        .registry
        .units_for(&target)
        .unwrap()
        .iter_mut()
        .map(|u| u.refresh().to_string())
        .collect();
    assert_eq!(texts, vec!["height: 12.5", "floors:", "Keeper: null"]);
}

#[test]
fn test_repeated_runs_produce_identical_registries() {
    let universe = TypeUniverse::from_modules([citadel()]);
    let first = run(&universe, MonitorSettings::default());
    let second = run(&universe, MonitorSettings::default());

    assert_eq!(first.registry.summary(), second.registry.summary());
    assert_eq!(first.report.stats(), second.report.stats());

    let target: Target = Arc::new(tower());
    let render = |outcome: &ProfilingOutcome| -> Vec<String> {
        outcome
            .registry
            .units_for(&target)
            .unwrap()
            .iter_mut()
            .map(|u| u.refresh().to_string())
            .collect()
    };
    assert_eq!(render(&first), render(&second));
}

#[test]
fn test_builtin_and_configured_module_bans() {
    let universe = TypeUniverse::from_modules([
        ModuleDescriptor::new("tokio_bridge")
            .with_type(Tower::type_descriptor())
            .unwrap(),
        ModuleDescriptor::new("tokionic")
            .with_type(Lamp::type_descriptor())
            .unwrap(),
        ModuleDescriptor::new("vendor.lights")
            .with_type(Bunker::type_descriptor())
            .unwrap(),
        ModuleDescriptor::new("scratch").excluded(),
    ]);
    let settings = MonitorSettings {
        banned_module_prefixes: vec!["vendor".into()],
        ..MonitorSettings::default()
    };
    let outcome = run(&universe, settings);

    let stats = outcome.report.stats();
    assert_eq!(stats.modules_scanned, 1);
    assert_eq!(stats.modules_skipped, 3);
    assert_eq!(outcome.registry.len(), 1);
    assert_eq!(outcome.registry.summary().types[0].type_name, "Lamp");
}

#[test]
fn test_broken_module_is_reported_and_skipped() {
    let universe = TypeUniverse::from_modules([citadel()]).with_broken_module(
        "quarry",
        MetadataError::Corrupt {
            module: "quarry".into(),
            reason: "truncated type table".into(),
        },
    );
    let outcome = run(&universe, MonitorSettings::default());

    assert_eq!(outcome.report.count_kind(ScanIssueKind::ModuleIntrospection), 1);
    assert_eq!(outcome.report.count(Severity::Error), 1);
    let issue = &outcome.report.issues()[0];
    assert_eq!(issue.module.as_deref(), Some("quarry"));
    assert!(issue.message.contains("truncated type table"));

    // The rest of the universe still compiles.
    assert_eq!(outcome.registry.len(), 5);
}

#[test]
fn test_unregistered_generic_definition_is_reported() {
    let universe = TypeUniverse::from_modules([ModuleDescriptor::new("outskirts")
        .with_type(Bunker::type_descriptor())
        .unwrap()]);
    let outcome = run(&universe, MonitorSettings::default());

    assert!(outcome.registry.is_empty());
    assert_eq!(outcome.report.stats().resolved, 0);
    assert_eq!(outcome.report.count_kind(ScanIssueKind::GenericResolution), 1);
    let issue = &outcome.report.issues()[0];
    assert_eq!(issue.severity, Severity::Warning);
    assert_eq!(issue.type_name.as_deref(), Some("Bunker"));
    assert!(issue.message.contains("Crate<i32>"));
}
