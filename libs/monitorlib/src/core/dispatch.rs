// Copyright (c) 2025 Jonathan Fontanez
// SPDX-License-Identifier: BUSL-1.1

//! Marshaling work onto the host's main thread.
//!
//! Profiling may finish on a worker thread, but hosts usually want the
//! completion callback on their own loop. A [`TaskDispatcher`] is that seam.

use crate::core::{MonitorError, Result};
use crossbeam_channel::{Receiver, Sender, bounded, unbounded};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, ThreadId};
use std::time::Duration;

pub type Task = Box<dyn FnOnce() + Send + 'static>;

pub trait TaskDispatcher: Send + Sync {
    /// Run `task` on the dispatcher's thread and wait for it.
    fn invoke(&self, task: Task) -> Result<()>;

    /// Queue `task` on the dispatcher's thread without waiting.
    fn invoke_async(&self, task: Task) -> Result<CompletionHandle>;
}

/// Completion of a task queued with [`TaskDispatcher::invoke_async`].
#[derive(Debug, Clone)]
pub struct CompletionHandle {
    done: Arc<AtomicBool>,
    signal: Receiver<()>,
}

impl CompletionHandle {
    fn pending() -> (Self, CompletionSignal) {
        let (tx, rx) = bounded(1);
        let done = Arc::new(AtomicBool::new(false));
        (
            Self {
                done: done.clone(),
                signal: rx,
            },
            CompletionSignal { done, signal: tx },
        )
    }

    fn completed() -> Self {
        let (handle, signal) = Self::pending();
        signal.fire();
        handle
    }

    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::SeqCst)
    }

    /// Block until the task has run. Errors if the task was dropped unrun.
    pub fn wait(&self) -> Result<()> {
        if self.is_complete() {
            return Ok(());
        }
        self.signal
            .recv()
            .map_err(|_| MonitorError::Dispatch("task dropped before it ran".into()))
    }

    /// `Ok(false)` when the timeout elapsed first.
    pub fn wait_timeout(&self, timeout: Duration) -> Result<bool> {
        if self.is_complete() {
            return Ok(true);
        }
        match self.signal.recv_timeout(timeout) {
            Ok(()) => Ok(true),
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => Ok(false),
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                Err(MonitorError::Dispatch("task dropped before it ran".into()))
            }
        }
    }
}

struct CompletionSignal {
    done: Arc<AtomicBool>,
    signal: Sender<()>,
}

impl CompletionSignal {
    fn fire(self) {
        self.done.store(true, Ordering::SeqCst);
        let _ = self.signal.try_send(());
    }
}

/// Runs every task immediately on the calling thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineDispatcher;

impl TaskDispatcher for InlineDispatcher {
    fn invoke(&self, task: Task) -> Result<()> {
        task();
        Ok(())
    }

    fn invoke_async(&self, task: Task) -> Result<CompletionHandle> {
        task();
        Ok(CompletionHandle::completed())
    }
}

struct QueuedTask {
    task: Task,
    signal: CompletionSignal,
}

/// Queue drained by the thread that created it.
///
/// Tasks from other threads wait in the queue until the owner calls
/// [`pump`](Self::pump). Tasks invoked from the owner thread run in place.
pub struct MainThreadQueue {
    owner: ThreadId,
    tx: Sender<QueuedTask>,
    rx: Receiver<QueuedTask>,
}

impl MainThreadQueue {
    /// A queue owned by the calling thread.
    pub fn new() -> Arc<Self> {
        let (tx, rx) = unbounded();
        Arc::new(Self {
            owner: thread::current().id(),
            tx,
            rx,
        })
    }

    pub fn is_owner_thread(&self) -> bool {
        thread::current().id() == self.owner
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }

    /// Run every queued task. Returns how many ran.
    pub fn pump(&self) -> Result<usize> {
        if !self.is_owner_thread() {
            return Err(MonitorError::Dispatch(
                "pump called off the owner thread".into(),
            ));
        }
        let mut ran = 0;
        while let Ok(queued) = self.rx.try_recv() {
            (queued.task)();
            queued.signal.fire();
            ran += 1;
        }
        if ran > 0 {
            tracing::trace!("Pumped {} main-thread task(s)", ran);
        }
        Ok(ran)
    }

    fn enqueue(&self, task: Task) -> Result<CompletionHandle> {
        let (handle, signal) = CompletionHandle::pending();
        self.tx
            .send(QueuedTask { task, signal })
            .map_err(|_| MonitorError::Dispatch("main-thread queue closed".into()))?;
        Ok(handle)
    }
}

impl TaskDispatcher for MainThreadQueue {
    fn invoke(&self, task: Task) -> Result<()> {
        if self.is_owner_thread() {
            task();
            return Ok(());
        }
        self.enqueue(task)?.wait()
    }

    fn invoke_async(&self, task: Task) -> Result<CompletionHandle> {
        self.enqueue(task)
    }
}
