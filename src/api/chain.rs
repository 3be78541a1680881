use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info};
use std::sync::atomic::Ordering;

use super::models::{AppState, ChainResponse, DifficultyResponse, ErrorResponse, ValidateResponse};
use crate::blockchain::BlockPayload;

/// Get the full blockchain.
#[get("/chain/")]
pub async fn get_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.read().expect("lock poisoned");
    HttpResponse::Ok().json(ChainResponse {
        length: ledger.len(),
        difficulty: ledger.difficulty(),
        chain: ledger.chain().iter().map(BlockPayload::from).collect(),
    })
}

#[get("/chain/genesis/")]
pub async fn get_genesis_block(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.read().expect("lock poisoned");
    HttpResponse::Ok().json(BlockPayload::from(ledger.genesis_block()))
}

#[get("/chain/last/")]
pub async fn get_last_block(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.read().expect("lock poisoned");
    HttpResponse::Ok().json(BlockPayload::from(ledger.last_block()))
}

/// Blocks from `height` to the tip, so a peer can catch up.
#[get("/chain/since/{height}/")]
pub async fn get_blocks_since(
    state: web::Data<AppState>,
    path: web::Path<(usize,)>,
) -> impl Responder {
    let height = path.into_inner().0;
    let ledger = state.ledger.read().expect("lock poisoned");
    let blocks: Vec<BlockPayload> = ledger
        .blocks_from_height(height)
        .iter()
        .map(BlockPayload::from)
        .collect();
    debug!("GET /chain/since/{height}/ - {} block(s)", blocks.len());
    HttpResponse::Ok().json(blocks)
}

#[get("/block/{hash}/")]
pub async fn get_block(state: web::Data<AppState>, path: web::Path<(String,)>) -> impl Responder {
    let hash = path.into_inner().0;
    let ledger = state.ledger.read().expect("lock poisoned");
    match ledger.block_by_hash(&hash) {
        Some(block) => HttpResponse::Ok().json(BlockPayload::from(block)),
        None => HttpResponse::NotFound().json(ErrorResponse {
            error: "Block not found".into(),
        }),
    }
}

/// Validate the whole chain.
#[get("/validate/")]
pub async fn validate_chain(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.read().expect("lock poisoned");
    HttpResponse::Ok().json(ValidateResponse {
        valid: ledger.is_valid_chain(),
        length: ledger.len(),
        difficulty: ledger.difficulty(),
    })
}

/// Get current PoW difficulty.
#[get("/difficulty/")]
pub async fn get_difficulty(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.read().expect("lock poisoned");
    HttpResponse::Ok().json(DifficultyResponse {
        difficulty: ledger.difficulty(),
    })
}

/// Drop the chain and both pools, keeping only a fresh genesis block.
#[post("/chain/reset/")]
pub async fn reset_chain(state: web::Data<AppState>) -> impl Responder {
    let genesis = {
        let mut ledger = state.ledger.write().expect("lock poisoned");
        state.tip_generation.fetch_add(1, Ordering::SeqCst);
        BlockPayload::from(ledger.create_genesis_block())
    };
    info!("chain reset to genesis {}", genesis.hash);
    HttpResponse::Ok().json(genesis)
}
