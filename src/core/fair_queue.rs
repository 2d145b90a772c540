//! The fair queue: capacity-bounded, share-proportional dispatch.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

use crate::config::FairQueueConfig;
use crate::core::{Action, PendingRequest, PriorityClass, PriorityClassHandle, ResourceTicket};
use crate::util::clock::{MonotonicClock, SystemClock};

/// Min-heap adapter: orders class handles by ascending accumulated cost, so
/// the class that has consumed the least normalized resource pops first.
///
/// `accumulated` is mutated in place only by the uniform decay rescale while
/// entries sit in the heap. A uniform positive scale preserves relative order,
/// so the heap property survives; every other mutation happens between pop
/// and re-push.
struct ClassByOwed(PriorityClassHandle);

impl PartialEq for ClassByOwed {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ClassByOwed {}

impl PartialOrd for ClassByOwed {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ClassByOwed {
    fn cmp(&self, other: &Self) -> Ordering {
        // Inverted so that BinaryHeap's max-heap pops the smallest accumulated.
        other
            .0
            .accumulated
            .get()
            .total_cmp(&self.0.accumulated.get())
    }
}

/// Exponential decay factor for accumulated cost after `elapsed` idle time.
///
/// Pure function of elapsed time and the decay window `tau`, applied uniformly
/// to all classes in a pre-dispatch pass. A class idle for several multiples
/// of `tau` has its historical debt effectively forgiven.
pub(crate) fn decay_factor(elapsed: Duration, tau: Duration) -> f64 {
    (-elapsed.as_secs_f64() / tau.as_secs_f64()).exp()
}

/// Fair queueing scheduler.
///
/// Multiple producers register [`PriorityClass`]es and queue deferred actions
/// against them; requests are then served proportionally to the classes'
/// shares. Each request carries a [`ResourceTicket`] describing its
/// two-dimensional cost, and in-flight work is bounded by the configured
/// request-count and byte capacity.
///
/// Requests pertaining to a class can go through even if the class is over
/// its proportional allotment, provided the other classes have empty buffers.
/// When lagging classes start seeing requests again, the queue serves them
/// first until balance is restored, within a time window that obeys an
/// exponential decay.
///
/// The queue is a passive core: it never blocks and never self-reschedules.
/// A driver must call [`dispatch_requests`](Self::dispatch_requests) to make
/// progress, typically after every [`queue`](Self::queue) or
/// [`notify_requests_finished`](Self::notify_requests_finished) call.
pub struct FairQueue {
    config: FairQueueConfig,
    maximum_capacity: ResourceTicket,
    resources_executing: ResourceTicket,
    resources_queued: ResourceTicket,
    requests_executing: u32,
    requests_queued: u32,
    decay_base: Instant,
    handles: BinaryHeap<ClassByOwed>,
    registry: HashMap<u64, PriorityClassHandle>,
    next_class_id: u64,
    clock: Rc<dyn MonotonicClock>,
}

impl std::fmt::Debug for FairQueue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FairQueue")
            .field("config", &self.config)
            .field("maximum_capacity", &self.maximum_capacity)
            .field("resources_executing", &self.resources_executing)
            .field("resources_queued", &self.resources_queued)
            .field("requests_executing", &self.requests_executing)
            .field("requests_queued", &self.requests_queued)
            .field("decay_base", &self.decay_base)
            .field("next_class_id", &self.next_class_id)
            .finish_non_exhaustive()
    }
}

impl FairQueue {
    /// Construct a fair queue from `config`, using the system monotonic clock.
    #[must_use]
    pub fn new(config: FairQueueConfig) -> Self {
        Self::with_clock(config, Rc::new(SystemClock))
    }

    /// Construct a fair queue with an explicit clock, for deterministic decay
    /// in tests.
    #[must_use]
    pub fn with_clock(config: FairQueueConfig, clock: Rc<dyn MonotonicClock>) -> Self {
        let maximum_capacity = ResourceTicket::new(config.max_req_count, config.max_bytes_count);
        let decay_base = clock.now();
        Self {
            config,
            maximum_capacity,
            resources_executing: ResourceTicket::default(),
            resources_queued: ResourceTicket::default(),
            requests_executing: 0,
            requests_queued: 0,
            decay_base,
            handles: BinaryHeap::new(),
            registry: HashMap::new(),
            next_class_id: 0,
            clock,
        }
    }

    /// Register a new priority class with the given `shares` (clamped to a
    /// minimum of 1) and return a shared handle to it.
    pub fn register_priority_class(&mut self, shares: u32) -> PriorityClassHandle {
        let id = self.next_class_id;
        self.next_class_id += 1;
        let handle = Rc::new(PriorityClass::new(id, shares));
        self.registry.insert(id, Rc::clone(&handle));
        tracing::debug!(class = id, shares = handle.shares(), "registered priority class");
        handle
    }

    /// Unregister a priority class.
    ///
    /// # Panics
    ///
    /// Panics if the class still has pending requests or is still queued for
    /// dispatch, or if it was not registered with this queue. These are
    /// caller bugs: live queue entries reference class state, so silently
    /// dropping them would corrupt the scheduler.
    pub fn unregister_priority_class(&mut self, class: &PriorityClassHandle) {
        assert!(
            class.pending.borrow().is_empty(),
            "cannot unregister priority class {} with pending requests",
            class.id()
        );
        assert!(
            !class.queued.get(),
            "cannot unregister priority class {} while queued for dispatch",
            class.id()
        );
        assert!(
            self.registry.remove(&class.id()).is_some(),
            "priority class {} is not registered with this queue",
            class.id()
        );
        tracing::debug!(class = class.id(), "unregistered priority class");
    }

    /// Queue the deferred `action` against `class`, with cost `ticket`.
    ///
    /// No admission check is performed here; backpressure policy belongs to
    /// the caller. The caller must invoke
    /// [`notify_requests_finished`](Self::notify_requests_finished) exactly
    /// once when the underlying request finishes, regardless of success or
    /// failure.
    ///
    /// # Panics
    ///
    /// Panics if `class` is not registered with this queue.
    pub fn queue(&mut self, class: &PriorityClassHandle, ticket: ResourceTicket, action: Action) {
        assert!(
            self.registry.contains_key(&class.id()),
            "queue on priority class {} that is not registered with this queue",
            class.id()
        );
        self.resources_queued += ticket;
        self.requests_queued += 1;
        class
            .pending
            .borrow_mut()
            .push_back(PendingRequest { action, ticket });
        if !class.queued.get() {
            class.queued.set(true);
            self.handles.push(ClassByOwed(Rc::clone(class)));
        }
    }

    /// Notify that `nr` requests with combined cost `ticket` finished.
    ///
    /// This is the only path by which capacity returns to the pool. Call it
    /// exactly once per dispatched request (or batch them, passing the summed
    /// ticket), regardless of the request's outcome.
    pub fn notify_requests_finished(&mut self, ticket: ResourceTicket, nr: u32) {
        self.resources_executing -= ticket;
        self.requests_executing -= nr;
    }

    /// The resources (weight, size) currently queued across all classes.
    #[must_use]
    pub const fn resources_currently_waiting(&self) -> ResourceTicket {
        self.resources_queued
    }

    /// The resources (weight, size) currently executing.
    #[must_use]
    pub const fn resources_currently_executing(&self) -> ResourceTicket {
        self.resources_executing
    }

    /// The number of requests currently queued across all classes.
    #[must_use]
    pub const fn requests_currently_waiting(&self) -> u32 {
        self.requests_queued
    }

    /// The number of requests currently executing.
    #[must_use]
    pub const fn requests_currently_executing(&self) -> u32 {
        self.requests_executing
    }

    /// Admission test for a single candidate ticket.
    ///
    /// Tickets are only partially ordered, so this is evaluated per candidate
    /// rather than as one scalar comparison.
    fn can_admit(&self, ticket: ResourceTicket) -> bool {
        self.requests_executing < self.config.max_req_count
            && (self.resources_executing + ticket).fits_within(self.maximum_capacity)
    }

    /// Rescale every class's accumulated cost by the decay factor for the
    /// time elapsed since the last dispatch, then advance the decay base.
    fn normalize_stats(&mut self) {
        let now = self.clock.now();
        let elapsed = now.duration_since(self.decay_base);
        self.decay_base = now;
        let factor = decay_factor(elapsed, self.config.tau());
        for class in self.registry.values() {
            class.accumulated.set(class.accumulated.get() * factor);
        }
    }

    /// Dispatch queued requests while capacity allows.
    ///
    /// Repeatedly serves the class with the smallest accumulated cost (the
    /// most "owed" class), charging it the ticket's normalized cost divided
    /// by its shares. If the head request of the most-owed class does not fit
    /// in the remaining capacity, dispatch stops entirely rather than skip to
    /// a smaller request of a less-owed class: capacity may idle briefly, but
    /// the most-owed class is always served next.
    ///
    /// Non-blocking; returns after `O(k log n)` work for `k` dispatched
    /// requests and `n` registered classes. Does not self-reschedule.
    pub fn dispatch_requests(&mut self) {
        self.normalize_stats();
        while self.requests_executing < self.config.max_req_count {
            let Some(ClassByOwed(class)) = self.handles.pop() else {
                break;
            };
            let Some(request) = class.pending.borrow_mut().pop_front() else {
                // Nothing to serve for this class right now.
                class.queued.set(false);
                continue;
            };
            if !self.can_admit(request.ticket) {
                // Head-of-line blocking: put everything back and stop.
                class.pending.borrow_mut().push_front(request);
                self.handles.push(ClassByOwed(class));
                tracing::debug!("head-of-line request exceeds remaining capacity; idling");
                break;
            }

            self.resources_queued -= request.ticket;
            self.requests_queued -= 1;
            self.resources_executing += request.ticket;
            self.requests_executing += 1;

            if let Err(err) = (request.action)() {
                tracing::warn!(
                    class = class.id(),
                    error = %err,
                    "queued action failed; discarding"
                );
            }

            let cost =
                request.ticket.normalize(self.maximum_capacity) / f64::from(class.shares());
            class.accumulated.set(class.accumulated.get() + cost);

            if class.pending.borrow().is_empty() {
                class.queued.set(false);
            } else {
                self.handles.push(ClassByOwed(class));
            }
        }
    }
}
