mod auth;
mod data;
mod stats;
mod store;
mod util;

use std::sync::Arc;

pub use auth::*;
pub use data::*;
pub use stats::*;
pub use store::*;
pub use util::random_string;

/// The reveal party itself: where votes and settings live, and who may change them.
pub struct Reveal {
    pub storage: Arc<dyn Storage>,
    pub auth: Auth,
}

impl Reveal {
    pub fn new<S>(storage: S, auth: Auth) -> Self
    where
        S: Storage + 'static,
    {
        Self {
            storage: Arc::new(storage),
            auth,
        }
    }
}
