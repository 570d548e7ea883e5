pub mod cancel;
pub mod observable;
mod overview;
pub mod source;

pub use cancel::{CancelSource, CancelToken};
pub use observable::{Observable, ObservableRef, ObserverHandle, Subscription};
pub use overview::OverviewViewModel;
pub use source::{FetchError, HttpListingSource, ListingSource, DEFAULT_BASE_URL};

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
