use std::sync::{Arc, Mutex, PoisonError};

use shared::{
    domain::{ApiStatus, ListingFilter},
    protocol::Listing,
};
use tokio::{runtime::Handle, task::JoinHandle};
use tracing::{debug, info, instrument::WithSubscriber, warn};

use crate::{
    cancel::CancelSource,
    observable::{Observable, ObservableRef},
    source::{FetchError, ListingSource},
};

/// Values the overview publishes. Only the view model and its fetch tasks
/// hold this; consumers get [`ObservableRef`]s.
#[derive(Debug)]
struct OverviewState {
    status: Observable<Option<ApiStatus>>,
    listings: Observable<Vec<Listing>>,
    selection: Observable<Option<Listing>>,
    // Held across commits so teardown cannot interleave with a publish.
    torn_down: Mutex<bool>,
}

impl OverviewState {
    fn new() -> Self {
        Self {
            status: Observable::new(None),
            listings: Observable::new(Vec::new()),
            selection: Observable::new(None),
            torn_down: Mutex::new(false),
        }
    }

    fn shut_down(&self) {
        *self.torn_down.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    // The list is written before status leaves LOADING. Nothing is written
    // once the state has been shut down.
    fn commit(&self, filter: ListingFilter, result: Result<Vec<Listing>, FetchError>) {
        let torn_down = self.torn_down.lock().unwrap_or_else(PoisonError::into_inner);
        if *torn_down {
            warn!(%filter, "dropping listings response that arrived after teardown");
            return;
        }
        match result {
            Ok(listings) => {
                info!(%filter, count = listings.len(), "listings fetched");
                self.listings.set(listings);
                self.status.set(Some(ApiStatus::Done));
            }
            Err(err) => {
                warn!(%filter, error = %err, "listings fetch failed");
                self.listings.set(Vec::new());
                self.status.set(Some(ApiStatus::Error));
            }
        }
    }
}

pub struct OverviewViewModel {
    source: Arc<dyn ListingSource>,
    runtime: Handle,
    state: Arc<OverviewState>,
    cancel: CancelSource,
    tasks: Vec<JoinHandle<()>>,
}

impl OverviewViewModel {
    pub fn new(source: Arc<dyn ListingSource>, runtime: Handle) -> Self {
        Self {
            source,
            runtime,
            state: Arc::new(OverviewState::new()),
            cancel: CancelSource::new(),
            tasks: Vec::new(),
        }
    }

    /// Builds the view model and starts loading every listing right away.
    pub fn open(source: Arc<dyn ListingSource>, runtime: Handle) -> Self {
        let mut view_model = Self::new(source, runtime);
        view_model.fetch(ListingFilter::All);
        view_model
    }

    /// Marks status LOADING and starts one request for `filter`.
    ///
    /// Calls are not coalesced: a fetch issued while another is in flight
    /// runs independently, and whichever finishes last wins.
    pub fn fetch(&mut self, filter: ListingFilter) {
        if self.cancel.is_cancelled() {
            warn!(%filter, "fetch requested after teardown; ignoring");
            return;
        }

        self.state.status.set(Some(ApiStatus::Loading));
        debug!(%filter, "starting listings fetch");

        self.tasks.retain(|task| !task.is_finished());

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let token = self.cancel.token();
        let task = self.runtime.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => {
                    debug!(%filter, "listings fetch cancelled");
                    return;
                }
                result = source.fetch_listings(filter) => result,
            };

            debug!(%filter, "listings response received");
            state.commit(filter, result);
        }
        .with_current_subscriber());
        self.tasks.push(task);
    }

    pub fn select(&self, listing: Listing) {
        debug!(id = %listing.id(), "listing selected");
        self.state.selection.set(Some(listing));
    }

    /// Clears the selection after navigation has been handled. Clearing an
    /// empty selection publishes nothing.
    pub fn consume_selection(&self) {
        self.state.selection.set_if_changed(None);
    }

    pub fn status(&self) -> ObservableRef<Option<ApiStatus>> {
        self.state.status.read_only()
    }

    pub fn listings(&self) -> ObservableRef<Vec<Listing>> {
        self.state.listings.read_only()
    }

    pub fn selection(&self) -> ObservableRef<Option<Listing>> {
        self.state.selection.read_only()
    }

    pub fn in_flight(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }

    /// Cancels outstanding work. Safe to call repeatedly or with nothing in
    /// flight. Once this returns, no fetch touches the published state, even
    /// one that was already committing on another thread.
    pub fn teardown(&mut self) {
        if !self.cancel.is_cancelled() {
            debug!(in_flight = self.in_flight(), "tearing down overview");
        }
        self.state.shut_down();
        self.cancel.cancel();
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }

    pub fn is_torn_down(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl Drop for OverviewViewModel {
    fn drop(&mut self) {
        self.teardown();
    }
}
