/// Watches a block's step pass one event at a time.
///
/// A hyperbolic block hands its observer one event per node it solves during
/// `step_observed`, carrying the node index, its `(s, t)` point, the solved
/// value and how it was obtained. Returning `Some(action)` steers the pass:
/// the hyperbolic block stops early on `StopEarly` and reports the time of
/// the last solved node as its frontier. `None` lets the pass continue.
///
/// Closures implement `Observer`, and `()` observes nothing.
pub trait Observer<E, A> {
    /// Called once per event, in the order the block produces them.
    fn observe(&mut self, event: &E) -> Option<A>;
}

impl<E, A, F> Observer<E, A> for F
where
    F: FnMut(&E) -> Option<A>,
{
    fn observe(&mut self, event: &E) -> Option<A> {
        self(event)
    }
}

impl<E, A> Observer<E, A> for () {
    fn observe(&mut self, _event: &E) -> Option<A> {
        None
    }
}
