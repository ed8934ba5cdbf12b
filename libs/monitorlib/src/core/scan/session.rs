// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

use super::pipeline::{Profiler, ProfilingOutcome};
use crate::core::cancel::CancellationToken;
use crate::core::dispatch::TaskDispatcher;
use crate::core::types::TypeUniverse;
use crate::core::{MonitorError, Result};
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

const WORKER_THREAD_NAME: &str = "monitorlib-profiler";

/// One profiling run, on a worker thread or inline depending on
/// [`MonitorSettings::async_profiling`](crate::core::config::MonitorSettings::async_profiling).
///
/// The completion callback always goes through the dispatcher, so with a
/// [`MainThreadQueue`](crate::core::dispatch::MainThreadQueue) it runs on
/// the host thread at its next `pump()`.
pub struct ProfilingSession {
    token: CancellationToken,
    worker: Option<JoinHandle<()>>,
    finished: Arc<AtomicBool>,
}

impl ProfilingSession {
    pub fn start<F>(
        profiler: Arc<Profiler>,
        universe: TypeUniverse,
        dispatcher: Arc<dyn TaskDispatcher>,
        on_complete: F,
    ) -> Result<Self>
    where
        F: FnOnce(Result<ProfilingOutcome>) + Send + 'static,
    {
        Self::start_with_token(profiler, universe, dispatcher, CancellationToken::new(), on_complete)
    }

    /// Start with a caller-owned token.
    pub fn start_with_token<F>(
        profiler: Arc<Profiler>,
        universe: TypeUniverse,
        dispatcher: Arc<dyn TaskDispatcher>,
        token: CancellationToken,
        on_complete: F,
    ) -> Result<Self>
    where
        F: FnOnce(Result<ProfilingOutcome>) + Send + 'static,
    {
        let finished = Arc::new(AtomicBool::new(false));
        let asynchronous = profiler.settings().async_profiling;

        let job = {
            let token = token.clone();
            let finished = finished.clone();
            move || {
                let result = run_guarded(&profiler, &universe, &token);
                deliver(dispatcher.as_ref(), result, on_complete, finished);
            }
        };

        let worker = if asynchronous {
            let handle = thread::Builder::new()
                .name(WORKER_THREAD_NAME.to_string())
                .spawn(job)?;
            tracing::debug!("Profiling started on worker thread '{}'", WORKER_THREAD_NAME);
            Some(handle)
        } else {
            job();
            None
        };

        Ok(Self {
            token,
            worker,
            finished,
        })
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// Ask the run to stop at its next stage boundary. The callback then
    /// receives [`MonitorError::Cancelled`].
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether the completion callback has run.
    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::SeqCst)
    }

    /// Wait for the worker thread. The callback may still be queued on the
    /// dispatcher afterwards.
    pub fn join(&mut self) -> Result<()> {
        match self.worker.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| MonitorError::Worker("profiling thread panicked".into())),
            None => Ok(()),
        }
    }
}

fn run_guarded(profiler: &Profiler, universe: &TypeUniverse, token: &CancellationToken) -> Result<ProfilingOutcome> {
    let result = panic::catch_unwind(AssertUnwindSafe(|| profiler.run(universe, token)))
        .unwrap_or_else(|payload| Err(MonitorError::Worker(panic_message(payload.as_ref()))));
    match &result {
        Ok(_) => {}
        Err(MonitorError::Cancelled) => tracing::info!("Profiling cancelled, partial results dropped"),
        Err(e) => tracing::error!(error = %e, "Profiling failed"),
    }
    result
}

fn deliver<F>(dispatcher: &dyn TaskDispatcher, result: Result<ProfilingOutcome>, on_complete: F, finished: Arc<AtomicBool>)
where
    F: FnOnce(Result<ProfilingOutcome>) + Send + 'static,
{
    let task = Box::new(move || {
        on_complete(result);
        finished.store(true, Ordering::SeqCst);
    });
    if let Err(e) = dispatcher.invoke_async(task) {
        tracing::error!(error = %e, "Failed to deliver profiling result");
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("profiling panicked: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("profiling panicked: {s}")
    } else {
        "profiling panicked".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::MonitorSettings;
    use crate::core::dispatch::{InlineDispatcher, MainThreadQueue};
    use crate::core::formatting::{FormatOptions, FormatterFactory, ValueFormatter};
    use crate::core::marker::MonitorMarker;
    use crate::core::profiles::bind;
    use crate::core::types::{MemberDescriptor, MemberKind, ModuleDescriptor, TypeDescriptor, TypeKey, Upcast};
    use crate::core::values::{MonitorValue, ValueCategory, ValueShape};
    use parking_lot::Mutex;
    use std::cell::RefCell;
    use std::time::Duration;

    thread_local! {
        static TRIPPED_BY_BUILD: RefCell<Option<CancellationToken>> = const { RefCell::new(None) };
    }

    /// Cancels the token armed on this thread when its formatter is built,
    /// which happens during the instance sweep.
    struct Tripwire(u8);

    impl MonitorValue for Tripwire {
        const SHAPE: ValueShape = ValueShape::value(ValueCategory::Value);

        fn write_display(&self, out: &mut String) {
            out.push_str(&self.0.to_string());
        }

        fn create_formatter(factory: &FormatterFactory, options: &FormatOptions) -> Box<dyn ValueFormatter<Self>> {
            TRIPPED_BY_BUILD.with(|armed| {
                if let Some(token) = armed.borrow().as_ref() {
                    token.cancel();
                }
            });
            factory.dispatch::<Self>(options)
        }
    }

    struct Minefield {
        wire: Tripwire,
    }

    struct Crate<T> {
        cargo: T,
    }

    struct Hold {
        cargo: Crate<u8>,
    }

    /// One instance member that cancels while compiling, plus a generic
    /// member that is left for resolution.
    fn tripping_universe() -> TypeUniverse {
        let definition = TypeDescriptor::definition("harbor::Crate", "Crate<T>")
            .member(MemberDescriptor::unbound(MemberKind::Field, false, "cargo", "T").with_marker(MonitorMarker::new()))
            .build();
        let closed = TypeDescriptor::builder::<Crate<u8>>("Crate<u8>")
            .closing(definition.key().clone(), vec![TypeKey::of::<u8>()])
            .member(MemberDescriptor::bound("cargo", bind::field::<Crate<u8>, u8>(|c| &c.cargo)))
            .build();
        let hold = TypeDescriptor::builder::<Hold>("Hold")
            .base(closed, Upcast::field::<Hold, Crate<u8>>(|h| &h.cargo))
            .build();
        let minefield = TypeDescriptor::builder::<Minefield>("Minefield")
            .member(
                MemberDescriptor::bound("wire", bind::field::<Minefield, Tripwire>(|m| &m.wire))
                    .with_marker(MonitorMarker::new()),
            )
            .build();
        let module = ModuleDescriptor::new("harbor")
            .with_type(definition)
            .unwrap()
            .with_type(hold)
            .unwrap()
            .with_type(minefield)
            .unwrap();
        TypeUniverse::new().with_module(module)
    }

    struct Buoy {
        depth: u16,
    }

    fn universe() -> TypeUniverse {
        let buoy = TypeDescriptor::builder::<Buoy>("Buoy")
            .member(
                MemberDescriptor::bound("depth", bind::field::<Buoy, u16>(|b| &b.depth))
                    .with_marker(MonitorMarker::new()),
            )
            .build();
        TypeUniverse::new().with_module(ModuleDescriptor::new("sonar").with_type(buoy).unwrap())
    }

    fn profiler(async_profiling: bool) -> Arc<Profiler> {
        Arc::new(Profiler::new(MonitorSettings {
            async_profiling,
            ..MonitorSettings::default()
        }))
    }

    #[test]
    fn test_inline_session_completes_before_returning() {
        let got = Arc::new(Mutex::new(None));
        let sink = got.clone();
        let session = ProfilingSession::start(
            profiler(false),
            universe(),
            Arc::new(InlineDispatcher),
            move |result| *sink.lock() = Some(result.map(|o| o.registry.len())),
        )
        .unwrap();

        assert!(session.is_finished());
        assert!(matches!(*got.lock(), Some(Ok(1))));
    }

    #[test]
    fn test_worker_result_arrives_on_the_owner_thread() {
        let queue = MainThreadQueue::new();
        let owner = thread::current().id();
        let ran_on = Arc::new(Mutex::new(None));
        let sink = ran_on.clone();

        let mut session = ProfilingSession::start(profiler(true), universe(), queue.clone(), move |result| {
            assert!(result.is_ok());
            *sink.lock() = Some(thread::current().id());
        })
        .unwrap();

        session.join().unwrap();
        assert!(!session.is_finished());
        while !session.is_finished() {
            queue.pump().unwrap();
            thread::sleep(Duration::from_millis(1));
        }
        assert_eq!(*ran_on.lock(), Some(owner));
    }

    #[test]
    fn test_cancelled_token_reports_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let got = Arc::new(Mutex::new(None));
        let sink = got.clone();

        let mut session = ProfilingSession::start_with_token(
            profiler(true),
            universe(),
            Arc::new(InlineDispatcher),
            token,
            move |result| *sink.lock() = Some(matches!(result, Err(MonitorError::Cancelled))),
        )
        .unwrap();
        session.join().unwrap();

        assert!(session.is_finished());
        assert_eq!(*got.lock(), Some(true));
    }

    #[test]
    fn test_cancel_during_instance_sweep_skips_resolution() {
        let token = CancellationToken::new();
        TRIPPED_BY_BUILD.with(|armed| *armed.borrow_mut() = Some(token.clone()));
        let got = Arc::new(Mutex::new(None));
        let sink = got.clone();

        let mut session = ProfilingSession::start_with_token(
            profiler(false),
            tripping_universe(),
            Arc::new(InlineDispatcher),
            token.clone(),
            move |result| *sink.lock() = Some(result.map(|outcome| outcome.registry)),
        )
        .unwrap();
        session.join().unwrap();
        TRIPPED_BY_BUILD.with(|armed| armed.borrow_mut().take());

        assert!(token.is_cancelled());
        assert!(session.is_finished());
        let delivered = got.lock().take().unwrap();
        assert!(matches!(delivered, Err(MonitorError::Cancelled)));
    }

    #[test]
    fn test_tripping_universe_completes_without_cancellation() {
        let outcome = profiler(false)
            .run(&tripping_universe(), &CancellationToken::new())
            .unwrap();
        assert_eq!(outcome.registry.len(), 2);
        assert_eq!(outcome.report.stats().resolved, 1);
    }
}
