// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Arbor-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Arbor and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::io;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Condvar, Mutex};

use crate::gateway::{GatewayError, PersistenceGateway};
use crate::model::FileTree;

use super::console::ConsoleLine;

#[derive(Debug, Default)]
struct SaveState {
    // Only the newest snapshot matters; older pending ones are replaced.
    pending: Option<FileTree>,
    in_flight: bool,
    shutdown: bool,
}

#[derive(Debug)]
struct SaveInner {
    state: Mutex<SaveState>,
    cv: Condvar,
}

/// Fire-and-forget tree saves on a background worker.
///
/// Scheduled saves never block the caller. Failures are reported to the console once and never
/// retried; the next scheduled save carries the newer tree anyway.
pub struct SaveQueue {
    inner: Arc<SaveInner>,
    gateway: Arc<dyn PersistenceGateway>,
}

impl SaveQueue {
    pub fn new(
        gateway: Arc<dyn PersistenceGateway>,
        console: Sender<ConsoleLine>,
    ) -> io::Result<Self> {
        let inner =
            Arc::new(SaveInner { state: Mutex::new(SaveState::default()), cv: Condvar::new() });

        std::thread::Builder::new().name("arbor-save".to_owned()).spawn({
            let inner = inner.clone();
            let gateway = gateway.clone();
            move || Self::run_worker(inner, gateway, console)
        })?;

        Ok(Self { inner, gateway })
    }

    pub fn schedule(&self, tree: FileTree) {
        let mut state = self.inner.state.lock().expect("save queue lock poisoned");
        state.pending = Some(tree);
        self.inner.cv.notify_all();
    }

    /// Blocks until every scheduled snapshot has been handed to the gateway.
    pub fn flush(&self) {
        let mut state = self.inner.state.lock().expect("save queue lock poisoned");
        while state.in_flight || state.pending.is_some() {
            state = self.inner.cv.wait(state).expect("save queue cv poisoned");
        }
    }

    /// Saves `tree` on the caller's thread and returns the gateway's answer.
    ///
    /// Anything still pending is dropped and an in-flight save is waited for first, so no older
    /// snapshot can reach the gateway after this one.
    pub fn save_now(&self, tree: &FileTree) -> Result<(), GatewayError> {
        {
            let mut state = self.claim();
            state.in_flight = true;
        }
        let result = self.gateway.save(tree);

        let mut state = self.inner.state.lock().expect("save queue lock poisoned");
        state.in_flight = false;
        self.inner.cv.notify_all();
        result
    }

    /// Drops the pending snapshot and waits for an in-flight save to finish.
    pub fn discard_pending(&self) {
        drop(self.claim());
    }

    fn claim(&self) -> std::sync::MutexGuard<'_, SaveState> {
        let mut state = self.inner.state.lock().expect("save queue lock poisoned");
        if state.pending.take().is_some() {
            tracing::debug!("pending save superseded");
        }
        while state.in_flight {
            state = self.inner.cv.wait(state).expect("save queue cv poisoned");
        }
        state
    }

    pub fn is_idle(&self) -> bool {
        let state = self.inner.state.lock().expect("save queue lock poisoned");
        !state.in_flight && state.pending.is_none()
    }

    fn run_worker(
        inner: Arc<SaveInner>,
        gateway: Arc<dyn PersistenceGateway>,
        console: Sender<ConsoleLine>,
    ) {
        loop {
            let tree = {
                let mut state = inner.state.lock().expect("save queue lock poisoned");
                loop {
                    if !state.in_flight {
                        if let Some(tree) = state.pending.take() {
                            state.in_flight = true;
                            break tree;
                        }
                    }
                    if state.shutdown {
                        return;
                    }
                    state = inner.cv.wait(state).expect("save queue cv poisoned");
                }
            };

            match gateway.save(&tree) {
                Ok(()) => tracing::debug!(entries = tree.entry_count(), "background save done"),
                Err(err) => {
                    tracing::error!(error = %err, "background save failed");
                    let _ = console.send(ConsoleLine::error(format!("Save failed: {err}")));
                }
            }

            let mut state = inner.state.lock().expect("save queue lock poisoned");
            state.in_flight = false;
            inner.cv.notify_all();
        }
    }
}

impl Drop for SaveQueue {
    /// The worker finishes whatever is still pending, then exits on its own.
    fn drop(&mut self) {
        if let Ok(mut state) = self.inner.state.lock() {
            state.shutdown = true;
            self.inner.cv.notify_all();
        }
    }
}
