// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow};
use rowscope_app::{IndexReply, IndexRequest};
use rowscope_index::{IndexEngine, IndexWorker};
use tracing::warn;

/// Connects the UI to the index worker thread. Without a worker the UI
/// still browses the identity ordering; submissions fail so the controller
/// can report search and sort as unavailable.
pub struct WorkerRuntime {
    worker: Option<IndexWorker>,
}

impl WorkerRuntime {
    pub fn spawn(engine: IndexEngine) -> Result<Self> {
        Ok(Self {
            worker: Some(IndexWorker::spawn(engine)?),
        })
    }

    pub const fn disabled() -> Self {
        Self { worker: None }
    }

    pub const fn is_running(&self) -> bool {
        self.worker.is_some()
    }
}

impl rowscope_tui::IndexRuntime for WorkerRuntime {
    fn submit(&mut self, request: IndexRequest) -> Result<()> {
        let worker = self
            .worker
            .as_ref()
            .ok_or_else(|| anyhow!("index worker is not running"))?;
        if let Err(error) = worker.submit(request) {
            self.worker = None;
            return Err(error);
        }
        Ok(())
    }

    fn drain_replies(&mut self) -> Result<Vec<IndexReply>> {
        let Some(worker) = &self.worker else {
            return Ok(Vec::new());
        };
        match worker.drain() {
            Ok(replies) => Ok(replies),
            Err(error) => {
                warn!(error = %format!("{error:#}"), "index worker disconnected");
                self.worker = None;
                Err(error)
            }
        }
    }
}
