//! Events.

use core::fmt;
use parking_lot::Mutex;
use std::sync::Arc;

/// A shared event callback.
///
/// Clones refer to the same closure, so a handler attached to several elements keeps one state.
pub struct EventHandler<Event>(Arc<Mutex<dyn FnMut(&Event) + Send>>);

impl<E> Clone for EventHandler<E> {
    fn clone(&self) -> Self {
        EventHandler(Arc::clone(&self.0))
    }
}

impl<E> EventHandler<E> {
    pub fn new<F: 'static + FnMut(&E) + Send>(handler: F) -> Self {
        EventHandler(Arc::new(Mutex::new(handler)))
    }

    /// Invokes the handler.
    ///
    /// # Panics
    /// Deadlocks if called re-entrantly from inside the same handler.
    pub fn call(&self, event: &E) {
        let mut handler = self.0.lock();
        (&mut *handler)(event)
    }

    /// Whether both handles refer to the same closure.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl<E> fmt::Debug for EventHandler<E> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "EventHandler(..)")
    }
}

#[test]
fn test_handler_shares_state() {
    use std::sync::atomic::{AtomicUsize, Ordering};

    let count = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&count);
    let handler = EventHandler::new(move |by: &usize| {
        counter.fetch_add(*by, Ordering::SeqCst);
    });
    let other = handler.clone();

    handler.call(&1);
    other.call(&2);

    assert_eq!(count.load(Ordering::SeqCst), 3);
    assert!(handler.ptr_eq(&other));
    assert!(!handler.ptr_eq(&EventHandler::new(|_: &usize| {})));
    assert_eq!(format!("{:?}", handler), "EventHandler(..)");
}
