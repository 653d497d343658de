use std::sync::Arc;

use nutrilens_core::application::{NutrilensService, NutrilensSession};

use crate::args::Args;

#[derive(Clone)]
pub struct AppState {
    pub args: Arc<Args>,
    pub service: NutrilensService,
    pub session: Arc<NutrilensSession>,
}

impl AppState {
    pub fn new(args: Arc<Args>, service: NutrilensService, session: NutrilensSession) -> Self {
        Self {
            args,
            service,
            session: Arc::new(session),
        }
    }
}
