// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

pub mod sample;
pub mod scan;

use anyhow::{anyhow, Result};
use monitorlib::{
    MainThreadQueue, MonitorSettings, Profiler, ProfilingOutcome, ProfilingSession,
    TypeUniverse,
};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

pub fn load_settings(dir: Option<&Path>) -> MonitorSettings {
    match dir {
        Some(dir) => MonitorSettings::load_or_default(dir),
        None => {
            let mut settings = MonitorSettings::default();
            settings.apply_env_overrides();
            settings
        }
    }
}

/// Run a profiling session over every linked module and pump its result
/// back onto this thread.
pub fn profile(settings: MonitorSettings) -> Result<ProfilingOutcome> {
    let queue = MainThreadQueue::new();
    let slot: Arc<Mutex<Option<monitorlib::Result<ProfilingOutcome>>>> = Arc::new(Mutex::new(None));
    let sink = slot.clone();

    let mut session = ProfilingSession::start(
        Arc::new(Profiler::new(settings)),
        TypeUniverse::loaded(),
        queue.clone(),
        move |result| *sink.lock() = Some(result),
    )?;

    while !session.is_finished() {
        queue.pump()?;
        std::thread::sleep(Duration::from_millis(1));
    }
    session.join()?;

    let result = slot
        .lock()
        .take()
        .ok_or_else(|| anyhow!("profiling finished without a result"))?;
    Ok(result?)
}
