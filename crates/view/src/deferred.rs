/// FIFO queue of operations deferred until some readiness signal.
///
/// Contract:
/// - Operations run in registration order.
/// - Each operation runs exactly once.
/// - `clear` discards queued operations without running them.
///
/// Vec-backed on purpose: the queue holds a handful of closures between view
/// construction and the surface's load signal, nothing more.
pub struct DeferredQueue<Ctx> {
    pending: Vec<Box<dyn FnOnce(&mut Ctx)>>,
}

impl<Ctx> Default for DeferredQueue<Ctx> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
        }
    }
}

impl<Ctx> DeferredQueue<Ctx> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn defer(&mut self, op: impl FnOnce(&mut Ctx) + 'static) {
        self.pending.push(Box::new(op));
    }

    /// Runs every queued operation against `ctx`, consuming the queue.
    ///
    /// The owning context typically holds the queue as a field; taking the
    /// queue out (`std::mem::take`) before running keeps the borrows disjoint.
    pub fn run_all(self, ctx: &mut Ctx) {
        for op in self.pending {
            op(ctx);
        }
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::DeferredQueue;

    #[test]
    fn runs_in_registration_order_exactly_once() {
        let mut q: DeferredQueue<Vec<u32>> = DeferredQueue::new();
        q.defer(|log| log.push(1));
        q.defer(|log| log.push(2));
        q.defer(|log| log.push(3));
        assert_eq!(q.len(), 3);

        let mut log = Vec::new();
        q.run_all(&mut log);
        assert_eq!(log, vec![1, 2, 3]);
    }

    #[test]
    fn duplicate_registrations_each_run_once() {
        let mut q: DeferredQueue<u32> = DeferredQueue::new();
        q.defer(|n| *n += 1);
        q.defer(|n| *n += 1);

        let mut count = 0;
        q.run_all(&mut count);
        assert_eq!(count, 2);
    }

    #[test]
    fn clear_discards_without_running() {
        let mut q: DeferredQueue<u32> = DeferredQueue::new();
        q.defer(|n| *n += 1);
        q.clear();
        assert!(q.is_empty());

        let mut count = 0;
        q.run_all(&mut count);
        assert_eq!(count, 0);
    }
}
