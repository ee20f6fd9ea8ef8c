//! Document browser for a Typesense collection.
//!
//! [`BrowserState`] is the state machine: user actions mutate it and hand
//! back a ticket describing the request to run. Results are fed back in with
//! the ticket's sequence number, and only the newest ticket is applied, so
//! a slow response can never overwrite a newer one.
//!
//! [`DocumentBrowser`] drives a `BrowserState` against a
//! [`SearchService`](client::SearchService), and [`Session`] owns the
//! connection-level pieces (collection list, deletes) around it.

mod driver;
mod error;
pub mod session;
mod state;

pub use driver::DocumentBrowser;
pub use error::BrowserError;
pub use session::Session;
pub use state::{BrowserState, LoadTicket, Phase, SearchTicket};

pub use query::{FilterValue, Filters, NumericRange, PageWindow, SortOrder, SortState};
