// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod event;
pub mod guarded;
pub mod literal;
pub mod numeric_format;
pub mod shapes;
pub mod vectors;

pub use event::{EventSource, MonitoredEvent, SubscriberCountPolicy, SubscriptionId};
pub use guarded::Guarded;
pub use literal::{describe_args, FromArgs, FromLiteral, Literal};
pub use numeric_format::{format_float, format_integer, FormatSpec};
pub use shapes::{Components, MonitorValue, Probe, ValueCategory, ValueShape};
pub use vectors::{Quat, Rgba, Vec2, Vec3, Vec4};
