// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod cancel;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod formatting;
pub mod marker;
pub mod profiles;
pub mod registry;
pub mod scan;
pub mod types;
pub mod validation;
pub mod values;

pub use cancel::CancellationToken;
pub use config::{EventSettings, FormattingSettings, MonitorSettings};
pub use dispatch::{CompletionHandle, InlineDispatcher, MainThreadQueue, Task, TaskDispatcher};
pub use error::*;
pub use formatting::{ColorScheme, DisplayList, FormatOptions, FormatterFactory, NamedProcessor, Rgb, ValueFormatter};
pub use marker::{Comparison, Condition, MonitorMarker, ShowIf, TypeMarker};
pub use profiles::{MonitorProfile, MonitorUnit, ProfileInfo, Target};
pub use registry::{ProfileRegistry, ProfileRegistryBuilder, RegistrySummary, TypeSummary};
pub use scan::{Profiler, ProfilingOutcome, ProfilingSession, ScanIssue, ScanIssueKind, ScanReport, Severity};
pub use types::{
    GenericShape, MemberDescriptor, MemberKind, ModuleDescriptor, ModuleRegistration, Monitored,
    MonitoredMembers, TypeDescriptor, TypeKey, TypeUniverse, Upcast,
};
pub use values::{
    EventSource, FromArgs, FromLiteral, Guarded, Literal, MonitorValue, MonitoredEvent, Quat, Rgba,
    SubscriberCountPolicy, Vec2, Vec3, Vec4,
};
