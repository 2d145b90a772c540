//! Priority classes: the scheduling token handed to producers.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

use crate::core::ResourceTicket;

/// A deferred unit of work queued against a priority class.
///
/// The action is invoked synchronously by the dispatch loop. Its result is
/// logged and discarded: a failing action never aborts dispatch and never
/// alters the queue's bookkeeping, so correctness of the underlying request
/// is entirely the action's job.
pub type Action = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// A pending `(action, ticket)` pair buffered inside a priority class.
pub(crate) struct PendingRequest {
    pub(crate) action: Action,
    pub(crate) ticket: ResourceTicket,
}

/// A priority class registered against a [`FairQueue`](crate::core::FairQueue).
///
/// Producers receive a shared handle when registering a class. The only public
/// surface is [`shares`](Self::shares) and [`update_shares`](Self::update_shares);
/// all queueing state (accumulated cost, pending buffer, heap membership) is
/// private to the queue, so an external holder cannot corrupt scheduling
/// invariants. The handle's sole purpose beyond share management is to be
/// passed back to the queue to identify the class.
pub struct PriorityClass {
    id: u64,
    shares: Cell<u32>,
    /// Normalized cost consumed so far, divided by shares at charge time.
    /// Rescaled downward by the queue's decay pass.
    pub(crate) accumulated: Cell<f64>,
    pub(crate) pending: RefCell<VecDeque<PendingRequest>>,
    /// True iff the class currently has an entry in the queue's heap.
    pub(crate) queued: Cell<bool>,
}

/// Shared handle to a priority class.
///
/// Held jointly by the caller and the queue's registry. The scheduler is
/// single-threaded, so plain reference counting suffices.
pub type PriorityClassHandle = Rc<PriorityClass>;

impl PriorityClass {
    /// Shares are clamped to a minimum of 1 so a class can never be starved
    /// out entirely and the per-dispatch charge never divides by zero.
    pub(crate) fn new(id: u64, shares: u32) -> Self {
        Self {
            id,
            shares: Cell::new(shares.max(1)),
            accumulated: Cell::new(0.0),
            pending: RefCell::new(VecDeque::new()),
            queued: Cell::new(false),
        }
    }

    /// Registry identity of this class within its owning queue.
    pub(crate) fn id(&self) -> u64 {
        self.id
    }

    /// The current amount of shares for this priority class.
    #[must_use]
    pub fn shares(&self) -> u32 {
        self.shares.get()
    }

    /// Update the share count, clamped to a minimum of 1.
    ///
    /// Takes effect on the next dispatch charge; already-accumulated cost is
    /// not rewritten.
    pub fn update_shares(&self, shares: u32) {
        self.shares.set(shares.max(1));
    }
}

impl fmt::Debug for PriorityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriorityClass")
            .field("id", &self.id)
            .field("shares", &self.shares.get())
            .field("accumulated", &self.accumulated.get())
            .field("pending", &self.pending.borrow().len())
            .field("queued", &self.queued.get())
            .finish()
    }
}
