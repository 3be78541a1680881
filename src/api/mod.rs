mod balance;
mod chain;
mod health;
mod mining;
pub mod models;
mod peers;
mod tx;

use actix_web::web::{self, ServiceConfig};

pub use models::AppState;

pub fn init_routes(cfg: &mut ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(health::health_check)
            .service(chain::get_chain)
            .service(chain::get_genesis_block)
            .service(chain::get_last_block)
            .service(chain::get_blocks_since)
            .service(chain::get_block)
            .service(chain::validate_chain)
            .service(chain::get_difficulty)
            .service(chain::reset_chain)
            .service(mining::mine_block)
            .service(tx::post_transaction)
            .service(tx::get_mempool)
            .service(balance::get_balance)
            .service(peers::receive_block)
            .service(peers::get_peers),
    );
}
