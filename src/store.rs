//! Observable state container
//!
//! A [`StateStore`] owns one reducer state. Writes go through
//! [`StateStore::dispatch`], which applies the action inside a single
//! `send_modify` call, so each transition is atomic with respect to other
//! dispatches and every subscriber sees the state after the full action.

use ottica_storefront_core::Reducer;
use tokio::sync::watch;

pub struct StateStore<S> {
    sender: watch::Sender<S>,
}

impl<S: Reducer> StateStore<S> {
    pub fn new(initial: S) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    pub fn dispatch(&self, action: S::Action) {
        self.sender.send_modify(|state| state.reduce(action));
    }

    /// Run `f` against the current state without cloning it.
    pub fn read<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        f(&self.sender.borrow())
    }

    /// Receiver notified after every dispatch
    pub fn subscribe(&self) -> watch::Receiver<S> {
        self.sender.subscribe()
    }
}

impl<S: Reducer + Clone> StateStore<S> {
    pub fn snapshot(&self) -> S {
        self.sender.borrow().clone()
    }
}

impl<S: Reducer + Default> Default for StateStore<S> {
    fn default() -> Self {
        Self::new(S::default())
    }
}

impl<S: std::fmt::Debug> std::fmt::Debug for StateStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StateStore")
            .field("state", &*self.sender.borrow())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Counter(i64);

    impl Reducer for Counter {
        type Action = i64;

        fn reduce(&mut self, action: i64) {
            self.0 += action;
        }
    }

    #[test]
    fn test_dispatch_notifies_subscribers() {
        tokio_test::block_on(async {
            let store = StateStore::new(Counter::default());
            let mut rx = store.subscribe();

            store.dispatch(5);
            rx.changed().await.unwrap();
            assert_eq!(*rx.borrow(), Counter(5));

            store.dispatch(-2);
            assert_eq!(store.snapshot(), Counter(3));
            assert_eq!(store.read(|c| c.0 * 2), 6);
        });
    }
}
