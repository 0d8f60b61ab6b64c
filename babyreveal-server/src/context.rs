use std::sync::Arc;

use axum::extract::FromRef;
use babyreveal_core::Reveal;

#[derive(Clone, FromRef)]
pub struct ServerContext {
    pub reveal: Arc<Reveal>,
}

impl ServerContext {
    pub fn new(reveal: Reveal) -> Self {
        Self {
            reveal: Arc::new(reveal),
        }
    }
}
