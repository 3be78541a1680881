use actix_web::{App, HttpServer, web};
use dotenvy::dotenv;
use log::info;

use utxo_ledger::api::{self, AppState};
use utxo_ledger::config::Config;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let _ = dotenv();
    env_logger::init();

    let config = Config::from_env();

    println!(
        "⛓️ Starting ledger API at http://{}:{}",
        config.host, config.port
    );
    info!(
        "difficulty={} peers={} genesis_allocation={}",
        config.difficulty,
        config.peers.len(),
        config.genesis.is_some()
    );

    let state = web::Data::new(AppState::from_config(&config));

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .configure(api::init_routes)
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
