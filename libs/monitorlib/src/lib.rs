// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Runtime observation profiles compiled from marked members.
//!
//! Types describe themselves through [`Monitored`] (usually derived) and
//! register per module with [`register_monitor_module!`]. A [`Profiler`]
//! scans that universe once, compiles every marked field, property, event
//! and method into a reusable profile, and freezes the result into a
//! [`ProfileRegistry`]. Profiles are instantiated into [`MonitorUnit`]s bound
//! to a target instance, or to nothing for statics.
//!
//! ```ignore
//! use monitorlib::{Monitored, MonitorSettings, Profiler, TypeUniverse, CancellationToken};
//!
//! #[derive(Monitored)]
//! struct Player {
//!     #[monitor(label = "HP", show_if = Positive)]
//!     hp: i32,
//! }
//!
//! monitorlib::register_monitor_module! { name = "game", types = [Player] }
//!
//! let outcome = Profiler::new(MonitorSettings::default())
//!     .run(&TypeUniverse::loaded(), &CancellationToken::new())?;
//! ```

#![allow(clippy::type_complexity)] // Accessor fn-pointer types are clear in context
#![allow(clippy::too_many_arguments)] // Context constructors carry the whole request

// Allow `::monitorlib::` paths to work inside this crate (for proc macro generated code)
extern crate self as monitorlib;

// Re-exported for `register_monitor_module!`
pub use inventory;

pub mod core;

pub use monitorlib_macros::{monitor_members, Monitored};

pub use core::profiles::bind;
pub use core::{
    CancellationToken, ColorScheme, Comparison, CompletionHandle, Condition, DisplayList, EventSettings,
    EventSource, FormatOptions, FormatterFactory, FormattingSettings, FromArgs, FromLiteral, GenericShape,
    Guarded, InlineDispatcher, Literal, MainThreadQueue, MemberDescriptor, MemberKind, MetadataError, ModuleDescriptor,
    ModuleRegistration, MonitorError, MonitorMarker, MonitorProfile, MonitorSettings, MonitorUnit,
    MonitorValue, Monitored, MonitoredEvent, MonitoredMembers, NamedProcessor, ProfileError, ProfileInfo,
    ProfileRegistry, ProfileRegistryBuilder, Profiler, ProfilingOutcome, ProfilingSession, Quat, RegistrySummary,
    Result, Rgb, Rgba, ScanIssue, ScanIssueKind, ScanReport, Severity, ShowIf, SubscriberCountPolicy, Target,
    Task, TaskDispatcher, TypeDescriptor, TypeKey, TypeMarker, TypeSummary, TypeUniverse, Upcast, ValueFormatter,
    Vec2, Vec3, Vec4,
};
pub use core::types::{MethodShape, NamedMethod};
