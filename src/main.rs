mod db;
mod error;
mod handlers;
mod models;
mod voting;

use std::env;

use log::{error, info};

use db::Database;

const DATABASE_PROMPT: &str =
    "Enter the DATABASE_URL value or leave empty to load from .env file: ";

const DEFAULT_DATABASE_URL: &str = "sqlite:pollbooth.db";

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::init();

    let db_url = match handlers::prompt(DATABASE_PROMPT) {
        Ok(input) if !input.is_empty() => input,
        Ok(_) => {
            env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string())
        }
        Err(why) => {
            error!("Failed to read database URL: {}", why);
            return;
        }
    };

    // Initialize database
    let database = match Database::new(&db_url).await {
        Ok(db) => db,
        Err(why) => {
            error!("Failed to initialize database: {}", why);
            return;
        }
    };
    info!("connected to {}", db_url);

    if let Err(why) = handlers::run_menu(&database).await {
        error!("session error: {}", why);
    }
}
