// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Compiled profiles and the units instantiated from them.

mod binding;
mod context;
mod event_profile;
mod factory;
mod info;
mod source;
mod unit;
mod value_profile;

pub use binding::{bind, EventBinding, MemberBinding, ValueBinding};
pub use context::ProfileContext;
pub use event_profile::EventProfile;
pub use factory::{BuildOutcome, BuildRequest, ProfileFactory};
pub use info::{MemberIdentity, ProfileInfo};
pub use source::{
    EventAccess, InstanceAccess, InstanceEvent, InstanceSink, MethodSource, StaticAccess,
    StaticEvent, StaticMethodSource, StaticSink, ValueSink, ValueSource,
};
pub use unit::{MonitorProfile, MonitorUnit, Target};
pub use value_profile::ValueProfile;
