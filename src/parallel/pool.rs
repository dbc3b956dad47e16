use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use crossbeam::channel::{bounded, Receiver, Sender, TrySendError};
use parking_lot::{Condvar, Mutex};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use crate::core::config::PoolConfig;
use crate::core::error::{Error, ErrorKind, Result};
use crate::core::stats::PoolStats;

pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// What `submit` does when the queue is full
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Backpressure {
    /// Wait for a free queue slot
    #[default]
    Block,
    /// Fail with `ErrorKind::Rejected`
    Reject,
}

/// Fixed set of named threads draining a bounded job queue
pub struct WorkerPool {
    name: String,
    sender: Option<Sender<Job>>,
    workers: Vec<JoinHandle<()>>,
    pending: Arc<Pending>,
    backpressure: Backpressure,
}

/// Jobs submitted but not yet finished
struct Pending {
    count: Mutex<usize>,
    idle: Condvar,
}

impl Pending {
    fn start(&self) {
        *self.count.lock() += 1;
    }

    fn finish(&self) {
        let mut count = self.count.lock();
        *count -= 1;
        if *count == 0 {
            self.idle.notify_all();
        }
    }
}

impl WorkerPool {
    pub fn new(name: &str, config: PoolConfig) -> Result<Self> {
        if config.workers == 0 || config.queue_capacity == 0 {
            return Err(Error::invalid_config(format!(
                "pool {} needs at least one worker and one queue slot",
                name
            )));
        }

        let (sender, receiver) = bounded::<Job>(config.queue_capacity);
        let pending = Arc::new(Pending {
            count: Mutex::new(0),
            idle: Condvar::new(),
        });

        let mut workers = Vec::with_capacity(config.workers);
        for id in 0..config.workers {
            let receiver = receiver.clone();
            let pending = pending.clone();
            let pool_name = name.to_string();

            let handle = thread::Builder::new()
                .name(format!("{}.{}", name, id))
                .spawn(move || Self::work(&pool_name, receiver, pending))
                .map_err(|e| {
                    Error::new(ErrorKind::Internal, format!("spawning {} worker: {}", name, e))
                })?;
            workers.push(handle);
        }

        debug!(
            pool = %name,
            workers = config.workers,
            capacity = config.queue_capacity,
            "worker pool started"
        );

        Ok(WorkerPool {
            name: name.to_string(),
            sender: Some(sender),
            workers,
            pending,
            backpressure: config.backpressure,
        })
    }

    fn work(name: &str, receiver: Receiver<Job>, pending: Arc<Pending>) {
        while let Ok(job) = receiver.recv() {
            if panic::catch_unwind(AssertUnwindSafe(job)).is_err() {
                error!(pool = %name, "background job panicked");
            }
            pending.finish();
        }
    }

    /// Queue a job; never waits for it to run
    pub fn submit<F>(&self, job: F) -> Result<()>
    where
        F: FnOnce() + Send + 'static,
    {
        let sender = self.sender.as_ref().ok_or_else(|| self.shut_down())?;

        self.pending.start();
        let job: Job = Box::new(job);

        let sent = match self.backpressure {
            Backpressure::Block => sender.send(job).map_err(|_| self.shut_down()),
            Backpressure::Reject => sender.try_send(job).map_err(|err| match err {
                TrySendError::Full(_) => Error::new(
                    ErrorKind::Rejected,
                    format!("pool {} queue is full", self.name),
                ),
                TrySendError::Disconnected(_) => self.shut_down(),
            }),
        };

        if sent.is_err() {
            self.pending.finish();
        }
        sent
    }

    fn shut_down(&self) -> Error {
        Error::new(ErrorKind::ShutDown, format!("pool {} is shut down", self.name))
    }

    /// Block until every submitted job has finished
    pub fn wait_idle(&self) {
        let mut count = self.pending.count.lock();
        while *count > 0 {
            self.pending.idle.wait(&mut count);
        }
    }

    pub fn pending(&self) -> usize {
        *self.pending.count.lock()
    }

    /// Jobs waiting in the queue, not yet picked up by a worker
    pub fn queued(&self) -> usize {
        self.sender.as_ref().map_or(0, Sender::len)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn stats(&self) -> PoolStats {
        PoolStats {
            name: self.name.clone(),
            workers: self.workers.len(),
            pending: self.pending(),
            queued: self.queued(),
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        // closing the channel lets workers finish the queue and exit
        self.sender.take();

        let current = thread::current().id();
        for handle in self.workers.drain(..) {
            if handle.thread().id() != current {
                let _ = handle.join();
            }
        }
    }
}
