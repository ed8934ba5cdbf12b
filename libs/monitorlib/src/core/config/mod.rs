// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Engine configuration.

mod settings;

pub use settings::{EventSettings, FormattingSettings, MonitorSettings};
