// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end tests for `#[derive(Monitored)]` and `#[monitor_members]`:
//! derived descriptors are scanned, compiled and bound to live instances.

use monitorlib::{
    monitor_members, CancellationToken, MemberKind, ModuleDescriptor, MonitorSettings, MonitorUnit, Monitored,
    MonitoredEvent, ProfileError, ProfilingOutcome, Profiler, ScanIssueKind, Severity, Target, TypeUniverse,
};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

static ROSTER: AtomicU32 = AtomicU32::new(7);

#[derive(Monitored)]
struct Actor {
    #[monitor(label = "Name")]
    name: String,
}

#[derive(Monitored)]
#[monitor(members, tags = ["unit"])]
struct Soldier {
    #[monitor(base)]
    actor: Actor,

    #[monitor(label = "HP", show_if = Positive, processor = "fmt_hp")]
    hp: i32,

    #[monitor(guarded, writable)]
    orders: Mutex<Vec<String>>,

    #[monitor(event)]
    on_hit: MonitoredEvent<i32>,

    #[monitor(tags = ["gear"])]
    ammo: Option<u32>,
}

#[monitor_members]
impl Soldier {
    #[monitor(show_if = method("is_alive"))]
    fn rank(&self) -> u8 {
        3
    }

    #[monitor(args = [3])]
    fn damage_at(&self, level: i64) -> i64 {
        level * 10
    }

    #[monitor(label = "Roster")]
    fn roster() -> u32 {
        ROSTER.load(Ordering::Relaxed)
    }

    #[monitor]
    fn reset(&self) {}

    #[monitor(predicate)]
    fn is_alive(&self) -> bool {
        self.hp > 0
    }

    #[monitor(processor)]
    fn fmt_hp(hp: &i32) -> String {
        format!("{hp} hp")
    }
}

impl Soldier {
    fn new(name: &str, hp: i32) -> Self {
        Self {
            actor: Actor { name: name.to_string() },
            hp,
            orders: Mutex::new(Vec::new()),
            on_hit: MonitoredEvent::new(),
            ammo: None,
        }
    }
}

#[derive(Monitored)]
struct Boxed<T> {
    #[monitor(label = "Value")]
    value: T,
}

#[derive(Monitored)]
struct IntBox {
    #[monitor(base)]
    inner: Boxed<i32>,
}

#[derive(Monitored)]
struct TextBox {
    #[monitor(base)]
    inner: Boxed<String>,
}

fn universe() -> TypeUniverse {
    let module = ModuleDescriptor::new("garrison")
        .with_type(Actor::type_descriptor())
        .unwrap()
        .with_type(Soldier::type_descriptor())
        .unwrap()
        .with_type(IntBox::type_descriptor())
        .unwrap()
        .with_type(TextBox::type_descriptor())
        .unwrap()
        .with_type(Boxed::<i32>::generic_definition().unwrap())
        .unwrap();
    TypeUniverse::from_modules([module])
}

fn profile() -> ProfilingOutcome {
    Profiler::new(MonitorSettings::default())
        .run(&universe(), &CancellationToken::new())
        .unwrap()
}

fn refresh_all(units: &mut [Box<dyn MonitorUnit>]) -> Vec<String> {
    units.iter_mut().map(|u| u.refresh().to_string()).collect()
}

#[test]
fn test_soldier_units_render_own_then_inherited_members() {
    let outcome = profile();
    let soldier: Target = Arc::new(Soldier::new("Vasquez", 80));
    let mut units = outcome.registry.units_for(&soldier).unwrap();

    assert_eq!(
        refresh_all(&mut units),
        vec![
            "HP: 80 hp",
            "orders:",
            "ammo: null",
            "rank: 3",
            "on_hit: 0",
            "damage_at: 30",
            "Name: Vasquez",
        ]
    );
}

#[test]
fn test_static_property_renders_without_target() {
    let outcome = profile();
    let mut statics = outcome.registry.create_static_units();
    assert_eq!(statics.len(), 1);
    assert_eq!(statics[0].info().member_kind, MemberKind::Property);

    ROSTER.store(9, Ordering::Relaxed);
    assert_eq!(statics[0].refresh(), "Roster: 9");
}

#[test]
fn test_void_method_is_reported_and_skipped() {
    let outcome = profile();
    let skipped: Vec<_> = outcome
        .report
        .issues()
        .iter()
        .filter(|i| i.kind == ScanIssueKind::MemberInspection)
        .collect();
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].severity, Severity::Warning);
    assert_eq!(skipped[0].member.as_deref(), Some("reset"));
    assert!(!outcome.report.has_errors());
}

#[test]
fn test_type_tags_merge_into_member_tags() {
    let outcome = profile();
    let summary = outcome.registry.summary();
    let soldier = summary
        .types
        .iter()
        .find(|t| t.type_name == "Soldier")
        .unwrap();

    let ammo = soldier.profiles.iter().find(|p| p.member_name == "ammo").unwrap();
    assert!(ammo.has_tag("unit"));
    assert!(ammo.has_tag("gear"));
    assert!(soldier.profiles.iter().all(|p| p.has_tag("unit")));
}

#[test]
fn test_show_if_gates_follow_the_instance() {
    let outcome = profile();
    let downed: Target = Arc::new(Soldier::new("Hicks", 0));
    let units = outcome.registry.units_for(&downed).unwrap();

    let visible: Vec<&str> = units
        .iter()
        .filter(|u| u.is_visible())
        .map(|u| u.info().member_name.as_str())
        .collect();
    assert!(!visible.contains(&"hp"));
    assert!(!visible.contains(&"rank"));
    assert!(visible.contains(&"orders"));
    assert!(visible.contains(&"name"));
}

#[test]
fn test_guarded_field_reads_and_writes_through_the_lock() {
    let outcome = profile();
    let soldier = Arc::new(Soldier::new("Apone", 50));
    let target: Target = soldier.clone();
    let mut units = outcome.registry.units_for(&target).unwrap();
    let orders = units
        .iter_mut()
        .find(|u| u.info().member_name == "orders")
        .unwrap();
    assert!(orders.info().writable);

    soldier.orders.lock().push("advance".to_string());
    assert_eq!(orders.refresh(), "orders:\n  [0]: advance");

    orders.write(vec!["hold".to_string(), "regroup".to_string()]).unwrap();
    assert_eq!(*soldier.orders.lock(), vec!["hold", "regroup"]);
    assert_eq!(orders.refresh(), "orders:\n  [0]: hold\n  [1]: regroup");

    let err = orders.write(42_u8).unwrap_err();
    assert!(matches!(err, ProfileError::ValueType { .. }));
}

#[test]
fn test_event_unit_counts_subscribers() {
    let outcome = profile();
    let soldier = Arc::new(Soldier::new("Drake", 60));
    let target: Target = soldier.clone();
    let mut units = outcome.registry.units_for(&target).unwrap();
    let on_hit = units
        .iter_mut()
        .find(|u| u.info().member_kind == MemberKind::Event)
        .unwrap();

    let medic = soldier.on_hit.subscribe("medic", |_| {});
    soldier.on_hit.subscribe("log", |_| {});
    assert_eq!(on_hit.refresh(), "on_hit: 2");

    assert!(soldier.on_hit.unsubscribe(medic));
    assert_eq!(on_hit.refresh(), "on_hit: 1");
    assert!(on_hit.write(1_usize).is_err());
}

#[test]
fn test_units_outlive_their_target() {
    let outcome = profile();
    let target: Target = Arc::new(Soldier::new("Frost", 40));
    let mut units = outcome.registry.units_for(&target).unwrap();
    drop(target);

    for unit in units.iter_mut() {
        assert!(!unit.is_target_alive());
        assert!(!unit.is_visible());
    }
    let name = units.iter_mut().find(|u| u.info().member_name == "name").unwrap();
    assert_eq!(name.refresh(), "Name: null");
}

#[test]
fn test_generic_member_resolves_for_every_closed_type() {
    let outcome = profile();
    assert_eq!(outcome.report.stats().resolved, 2);
    assert_eq!(outcome.report.count_kind(ScanIssueKind::GenericResolution), 0);

    let int_box: Target = Arc::new(IntBox {
        inner: Boxed { value: 12 },
    });
    let text_box: Target = Arc::new(TextBox {
        inner: Boxed {
            value: "flares".to_string(),
        },
    });
    let mut int_units = outcome.registry.units_for(&int_box).unwrap();
    let mut text_units = outcome.registry.units_for(&text_box).unwrap();
    assert_eq!(refresh_all(&mut int_units), vec!["Value: 12"]);
    assert_eq!(refresh_all(&mut text_units), vec!["Value: flares"]);

    let definition = Boxed::<i32>::generic_definition().unwrap();
    let info = int_units[0].info();
    assert_eq!(info.origin, *definition.key());
    assert_eq!(info.declaring_type_name, "IntBox");
    assert_eq!(info.holder_type, "Boxed<i32>");
}

#[test]
fn test_non_generic_types_have_no_definition() {
    assert!(Soldier::generic_definition().is_none());
    let closed = Boxed::<u8>::type_descriptor();
    assert_eq!(closed.name(), "Boxed<u8>");
    assert!(closed.shape().definition().is_some());
}
