//! A background worker that drains enqueued lines to the error stream in
//! FIFO order, off the hot path. Built on a blocking `mpsc` channel rather
//! than a polling loop, so the worker sleeps until a line is enqueued.

use std::io::{self, Write};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

pub struct AsyncLogger {
    sender: Option<Sender<String>>,
    worker: Option<JoinHandle<()>>,
}

impl AsyncLogger {
    /// Spawn the background worker, writing to `stderr`.
    pub fn start() -> Self {
        Self::start_writing_to(io::stderr())
    }

    /// Spawn the background worker writing to an arbitrary sink. Exposed
    /// for tests that want to observe emitted lines without capturing
    /// process stderr.
    pub fn start_writing_to<W>(mut sink: W) -> Self
    where
        W: Write + Send + 'static,
    {
        let (sender, receiver): (Sender<String>, Receiver<String>) = mpsc::channel();
        let worker = thread::spawn(move || {
            while let Ok(line) = receiver.recv() {
                let _ = sink.write_all(line.as_bytes());
            }
            let _ = sink.flush();
        });
        AsyncLogger {
            sender: Some(sender),
            worker: Some(worker),
        }
    }

    /// Enqueue `line` for emission; returns immediately.
    pub fn print(&self, line: impl Into<String>) {
        if let Some(sender) = &self.sender {
            // A send error means the worker already exited (only possible
            // after `stop()`); there is nothing further to enqueue to.
            let _ = sender.send(line.into());
        }
    }

    /// Signal the worker to drain and exit, then join it. Idempotent.
    pub fn stop(&mut self) {
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for AsyncLogger {
    fn drop(&mut self) {
        self.stop();
    }
}
