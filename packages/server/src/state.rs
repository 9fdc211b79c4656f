use std::sync::Arc;

use common::Clock;
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::services::{CustomerService, ImageService};

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn customers(&self) -> CustomerService<'_, DatabaseConnection> {
        CustomerService::new(&self.db, self.clock.as_ref())
    }

    pub fn images(&self) -> ImageService<'_, DatabaseConnection> {
        ImageService::new(&self.db, self.clock.as_ref())
    }
}
