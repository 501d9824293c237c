use std::io;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender};

use crate::error::Error;
use crate::stats::{Accumulator, Report};

/// One line of input, shared read-only between every accumulator.
pub type Line = Arc<str>;

/// Default queue depth between the broadcaster and each accumulator. Zero makes every send a
/// rendezvous, so the slowest accumulator paces the reader.
pub const DEFAULT_QUEUE_CAPACITY: usize = 0;

enum Message {
    Line(Line),
    End,
}

/// An accumulator running on its own thread, plus the queue that feeds it.
struct StatWorker {
    name: &'static str,
    /// `None` once the worker has hung up; it receives nothing further.
    sender: Option<Sender<Message>>,
    handle: thread::JoinHandle<Option<Report>>,
}

/// Fans a stream of lines out to a set of accumulators, each running on its own thread.
pub struct Broadcaster {
    capacity: usize,
    workers: Vec<StatWorker>,
}

/// Drains `receiver` into `stat`. Returns `None` if the queue is closed without an explicit end
/// of stream, which means the run was aborted and nothing should be reported.
fn run_stat<A: Accumulator>(mut stat: A, receiver: Receiver<Message>) -> Option<Report> {
    while let Ok(message) = receiver.recv() {
        match message {
            Message::Line(line) => stat.consume(&line),
            Message::End => {
                let report = stat.finalize();
                log::debug!("{} finished: {}", A::NAME, report);
                return Some(report);
            }
        }
    }
    log::debug!("{} aborted before end of stream", A::NAME);
    None
}

impl Broadcaster {
    pub fn new() -> Broadcaster {
        Broadcaster::with_capacity(DEFAULT_QUEUE_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Broadcaster {
        Broadcaster {
            capacity,
            workers: Vec::new(),
        }
    }

    /// Starts `stat` on a dedicated thread. It sees every line passed to `run`, in order.
    pub fn register<A>(&mut self, stat: A) -> Result<(), Error>
    where
        A: Accumulator + Send + 'static,
    {
        let (sender, receiver) = crossbeam_channel::bounded(self.capacity);
        let handle = thread::Builder::new()
            .name(A::NAME.to_string())
            .spawn(move || run_stat(stat, receiver))
            .map_err(|err| Error::Spawn(A::NAME, err))?;
        log::debug!("Started {} accumulator", A::NAME);
        self.workers.push(StatWorker {
            name: A::NAME,
            sender: Some(sender),
            handle,
        });
        Ok(())
    }

    /// Feeds every line to every registered accumulator, signals end of stream, then waits for
    /// all of them to finish. Results come back in registration order.
    ///
    /// A read error aborts the whole run: accumulators are shut down without finalizing and the
    /// error is returned, so no statistic is ever computed from a truncated stream.
    pub fn run<I>(mut self, lines: I) -> Result<Vec<Result<Report, Error>>, Error>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        if self.workers.is_empty() {
            return Err(Error::NoStats);
        }
        if let Err(err) = self.dispatch(lines) {
            log::debug!("Aborting run: {}", err);
            let panicked = self.abort();
            if !panicked.is_empty() {
                log::debug!("{} accumulators had already failed", panicked.len());
            }
            return Err(err);
        }
        self.stop();
        Ok(self.wait())
    }

    fn dispatch<I>(&mut self, lines: I) -> Result<(), Error>
    where
        I: IntoIterator<Item = io::Result<String>>,
    {
        let mut dispatched = 0usize;
        for line in lines {
            let line: Line = Arc::from(line?);
            for worker in self.workers.iter_mut() {
                deliver(worker, Message::Line(Arc::clone(&line)));
            }
            dispatched += 1;
        }
        log::info!(
            "Dispatched {} lines to {} accumulators",
            dispatched,
            self.workers.len()
        );
        Ok(())
    }

    fn stop(&mut self) {
        for worker in self.workers.iter_mut() {
            deliver(worker, Message::End);
            worker.sender = None;
        }
    }

    /// Hangs up on every worker and joins them. Returns the accumulators that had already
    /// panicked, each logged on its own.
    fn abort(self) -> Vec<&'static str> {
        let mut panicked = Vec::new();
        for worker in self.workers {
            drop(worker.sender);
            if worker.handle.join().is_err() {
                log::error!("The {} accumulator panicked", worker.name);
                panicked.push(worker.name);
            }
        }
        panicked
    }

    fn wait(self) -> Vec<Result<Report, Error>> {
        self.workers
            .into_iter()
            .map(|worker| match worker.handle.join() {
                Ok(Some(report)) => Ok(report),
                // only a worker that died before End returns without a report
                Ok(None) | Err(_) => {
                    log::error!("The {} accumulator panicked", worker.name);
                    Err(Error::StatPanicked(worker.name))
                }
            })
            .collect()
    }
}

impl Default for Broadcaster {
    fn default() -> Self {
        Broadcaster::new()
    }
}

fn deliver(worker: &mut StatWorker, message: Message) {
    let Some(sender) = worker.sender.as_ref() else {
        return;
    };
    if sender.send(message).is_err() {
        log::warn!("{} hung up; no longer feeding it", worker.name);
        worker.sender = None;
    }
}
