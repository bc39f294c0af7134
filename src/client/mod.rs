//! Backend clients
//!
//! `NetworkSource` and `SessionBackend` are the seams; `HttpBackend`
//! implements both over reqwest.

mod cancel;
mod http;
mod loader;
mod traits;

pub use cancel::{FetchCoordinator, RequestToken};
pub use http::HttpBackend;
pub use loader::{load_dataset, load_vocabularies};
pub use traits::{ClientError, ClientResult, NetworkQuery, NetworkSource, SessionBackend};
