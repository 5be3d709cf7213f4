use std::sync::Arc;

use crate::{config::Config, db::DbPool, workflow::WorkflowEngine};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub engine: Arc<WorkflowEngine>,
}

impl AppState {
    pub fn new(db: DbPool, config: Config, engine: Arc<WorkflowEngine>) -> Self {
        Self { db, config, engine }
    }
}
