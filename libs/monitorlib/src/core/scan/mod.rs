// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! The profiling run: type scan, member sweeps, generic resolution.

mod deferred;
mod generic_resolver;
mod member_inspector;
mod pipeline;
mod report;
mod session;
mod type_scanner;

pub use deferred::{DeferredMember, DeferredQueue};
pub use generic_resolver::GenericResolver;
pub use member_inspector::{InspectedMember, MemberInspector};
pub use pipeline::{Profiler, ProfilingOutcome};
pub use report::{ScanIssue, ScanIssueKind, ScanReport, ScanStats, Severity};
pub use session::ProfilingSession;
pub use type_scanner::{ModuleFilter, TypeScanner, BUILTIN_BANNED_PREFIXES};
