// src/lib.rs

use sea_orm::DatabaseConnection;
use services::groq::GroqService;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub groq: GroqService,
}

pub mod entities {
    pub mod prelude;
    pub mod snapshot;
}

pub mod services {
    pub mod coingecko;
    pub mod groq;
}

pub mod models;
pub mod handlers;
pub mod jobs;
