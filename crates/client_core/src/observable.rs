use futures::Stream;
use tokio::{runtime::Handle, sync::watch, task::JoinHandle};

#[derive(Debug)]
pub struct Observable<T> {
    tx: watch::Sender<T>,
}

impl<T> Observable<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(initial: T) -> Self {
        let (tx, _) = watch::channel(initial);
        Self { tx }
    }

    pub fn get(&self) -> T {
        self.tx.borrow().clone()
    }

    /// Replaces the value and notifies subscribers, even when the new value
    /// equals the old one.
    pub fn set(&self, value: T) {
        self.tx.send_replace(value);
    }

    /// Replaces the value only if it differs. Returns whether subscribers
    /// were notified.
    pub fn set_if_changed(&self, value: T) -> bool
    where
        T: PartialEq,
    {
        self.tx.send_if_modified(|current| {
            if *current == value {
                false
            } else {
                *current = value;
                true
            }
        })
    }

    pub fn read_only(&self) -> ObservableRef<T> {
        ObservableRef {
            rx: self.tx.subscribe(),
        }
    }

    pub fn subscribe(&self) -> Subscription<T> {
        Subscription {
            rx: self.tx.subscribe(),
        }
    }
}

/// Read-only view of an [`Observable`].
#[derive(Debug, Clone)]
pub struct ObservableRef<T> {
    rx: watch::Receiver<T>,
}

impl<T> ObservableRef<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn get(&self) -> T {
        self.rx.borrow().clone()
    }

    pub fn subscribe(&self) -> Subscription<T> {
        let mut rx = self.rx.clone();
        rx.borrow_and_update();
        Subscription { rx }
    }

    /// Spawns a passive observer that receives the current value and every
    /// later change until the returned handle is dropped or the owner goes
    /// away.
    pub fn observe<F>(&self, runtime: &Handle, mut callback: F) -> ObserverHandle
    where
        F: FnMut(&T) + Send + 'static,
    {
        let mut rx = self.rx.clone();
        let task = runtime.spawn(async move {
            let initial = rx.borrow_and_update().clone();
            callback(&initial);
            while rx.changed().await.is_ok() {
                // Clone before calling out so the callback never runs under
                // the channel's read lock.
                let value = rx.borrow_and_update().clone();
                callback(&value);
            }
        });
        ObserverHandle { task }
    }
}

/// Pull-based subscription. Dropping it unsubscribes.
#[derive(Debug)]
pub struct Subscription<T> {
    rx: watch::Receiver<T>,
}

impl<T> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn current(&self) -> T {
        self.rx.borrow().clone()
    }

    /// Waits for the next change. Returns `None` once the owning
    /// [`Observable`] has been dropped.
    pub async fn changed(&mut self) -> Option<T> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Waits until the value satisfies `predicate`, checking the current
    /// value first.
    pub async fn wait_for<P>(&mut self, mut predicate: P) -> Option<T>
    where
        P: FnMut(&T) -> bool,
    {
        self.rx
            .wait_for(|value| predicate(value))
            .await
            .ok()
            .map(|value| T::clone(&value))
    }

    pub fn into_stream(self) -> impl Stream<Item = T> {
        futures::stream::unfold(self, |mut subscription| async move {
            let value = subscription.changed().await?;
            Some((value, subscription))
        })
    }
}

/// Handle for an observer spawned by [`ObservableRef::observe`]. Dropping
/// it stops the observer.
#[derive(Debug)]
pub struct ObserverHandle {
    task: JoinHandle<()>,
}

impl ObserverHandle {
    /// Stops the observer. Same as dropping the handle.
    pub fn unsubscribe(self) {
        drop(self);
    }

    pub fn is_active(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for ObserverHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
#[path = "tests/observable_tests.rs"]
mod tests;
