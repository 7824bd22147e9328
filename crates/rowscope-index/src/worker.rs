// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! The index engine on its own thread.
//!
//! Requests and replies cross the thread boundary only through channels; the
//! worker keeps no state between messages. Dropping an [`IndexWorker`]
//! raises a stop flag, closes the request channel and joins the thread.
//! Requests still queued at that point are discarded, so teardown waits for
//! at most the one request already running.

use anyhow::{Context, Result, anyhow};
use rowscope_app::{IndexReply, IndexRequest};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use tracing::{debug, info, warn};

use crate::IndexEngine;

const THREAD_NAME: &str = "rowscope-index";

pub struct IndexWorker {
    requests: Option<Sender<IndexRequest>>,
    replies: Receiver<IndexReply>,
    stop: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl IndexWorker {
    pub fn spawn(engine: IndexEngine) -> Result<Self> {
        let (request_tx, request_rx) = mpsc::channel::<IndexRequest>();
        let (reply_tx, reply_rx) = mpsc::channel::<IndexReply>();
        let stop = Arc::new(AtomicBool::new(false));

        let worker_stop = Arc::clone(&stop);
        let handle = thread::Builder::new()
            .name(THREAD_NAME.to_owned())
            .spawn(move || serve(engine, request_rx, reply_tx, &worker_stop))
            .context("spawn index worker thread")?;

        Ok(Self {
            requests: Some(request_tx),
            replies: reply_rx,
            stop,
            handle: Some(handle),
        })
    }

    pub fn submit(&self, request: IndexRequest) -> Result<()> {
        let sender = self
            .requests
            .as_ref()
            .ok_or_else(|| anyhow!("index worker already shut down"))?;
        sender
            .send(request)
            .map_err(|_| anyhow!("index worker stopped; restart to re-enable search and sort"))
    }

    /// Next finished reply, if any. Never blocks.
    pub fn try_recv(&self) -> Result<Option<IndexReply>> {
        match self.replies.try_recv() {
            Ok(reply) => Ok(Some(reply)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(anyhow!("index worker exited unexpectedly")),
        }
    }

    pub fn drain(&self) -> Result<Vec<IndexReply>> {
        let mut replies = Vec::new();
        while let Some(reply) = self.try_recv()? {
            replies.push(reply);
        }
        Ok(replies)
    }

    /// Blocks until the next reply arrives. For tests and headless callers.
    pub fn recv(&self) -> Result<IndexReply> {
        self.replies
            .recv()
            .map_err(|_| anyhow!("index worker exited before replying"))
    }

    pub fn shutdown(&mut self) {
        self.stop.store(true, Ordering::Release);
        self.requests.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            warn!("index worker panicked before shutdown");
        }
    }
}

impl Drop for IndexWorker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn serve(
    engine: IndexEngine,
    requests: Receiver<IndexRequest>,
    replies: Sender<IndexReply>,
    stop: &AtomicBool,
) {
    info!(
        universe_size = engine.universe_size(),
        match_cap = engine.match_cap(),
        "index worker started"
    );
    for request in requests.iter() {
        if stop.load(Ordering::Acquire) {
            let discarded = 1 + requests.try_iter().count();
            debug!(discarded, "index worker stopping with requests queued");
            break;
        }
        if replies.send(engine.handle(&request)).is_err() {
            break;
        }
    }
    info!("index worker stopped");
}
