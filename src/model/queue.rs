//! Per-path ordering of disk operations
//!
//! Operations are dispatched concurrently, but two operations whose paths overlap
//! (equal, or one inside the other) must reach the disk in the order the user issued
//! them: creating `a/` and then `a/b.txt` cannot race. Each dispatched operation
//! registers its paths synchronously and receives a [`Ticket`]; the ticket's
//! [`ready`](Ticket::ready) future resolves once every earlier overlapping ticket has
//! been dropped.

use std::path::{Path, PathBuf};
use tokio::sync::watch;

fn overlaps(a: &Path, b: &Path) -> bool {
    a.starts_with(b) || b.starts_with(a)
}

#[derive(Debug)]
struct Registration {
    paths: Vec<PathBuf>,
    finished: watch::Receiver<()>,
}

impl Registration {
    /// The ticket's sender is gone once the operation is finished
    fn is_finished(&self) -> bool {
        self.finished.has_changed().is_err()
    }
}

/// Registry of in-flight operations by path
#[derive(Debug, Default)]
pub struct PathQueue {
    active: Vec<Registration>,
}

impl PathQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an operation touching `paths`
    ///
    /// Must be called in issue order; the returned ticket waits on every earlier
    /// registration that overlaps and is still in flight.
    pub fn register(&mut self, paths: Vec<PathBuf>) -> Ticket {
        self.active.retain(|reg| !reg.is_finished());

        let waits = self
            .active
            .iter()
            .filter(|reg| {
                reg.paths
                    .iter()
                    .any(|held| paths.iter().any(|wanted| overlaps(held, wanted)))
            })
            .map(|reg| reg.finished.clone())
            .collect();

        let (done, finished) = watch::channel(());
        self.active.push(Registration { paths, finished });
        Ticket { waits, _done: done }
    }

    /// Operations registered and not yet finished
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.active.iter().filter(|reg| !reg.is_finished()).count()
    }
}

/// Permission to run one operation; dropping it releases later overlapping tickets
#[derive(Debug)]
pub struct Ticket {
    waits: Vec<watch::Receiver<()>>,
    _done: watch::Sender<()>,
}

impl Ticket {
    /// Wait until every earlier overlapping operation has finished
    pub async fn ready(&mut self) {
        // Pop only after each wait completes so a cancelled call loses nothing
        while let Some(earlier) = self.waits.last_mut() {
            // Err means the sender was dropped, which is the only signal used
            let _ = earlier.changed().await;
            self.waits.pop();
        }
    }
}
