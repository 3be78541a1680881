use actix_web::{HttpResponse, Responder, get, post, web};
use log::{info, warn};
use std::sync::atomic::Ordering;

use super::models::{AppState, IngestResponse, PeersResponse};
use crate::blockchain::BlockPayload;

/// Accept a block proposed by a peer. Accepted blocks abort local mining
/// on the old tip; they are not forwarded again.
#[post("/blocks/")]
pub async fn receive_block(
    state: web::Data<AppState>,
    body: web::Json<BlockPayload>,
) -> impl Responder {
    let payload = body.into_inner();
    let hash = payload.hash.clone();

    let (result, length) = {
        let mut ledger = state.ledger.write().expect("lock poisoned");
        let result = ledger.try_add_block_from_payload(payload).map(|_| ());
        if result.is_ok() {
            state.tip_generation.fetch_add(1, Ordering::SeqCst);
        }
        (result, ledger.len())
    };

    match result {
        Ok(()) => {
            info!("PEER - accepted block {hash} (length={length})");
            HttpResponse::Ok().json(IngestResponse {
                accepted: true,
                length,
                reason: None,
            })
        }
        Err(e) => {
            warn!("PEER - rejected block {hash}: {e}");
            HttpResponse::BadRequest().json(IngestResponse {
                accepted: false,
                length,
                reason: Some(e.to_string()),
            })
        }
    }
}

#[get("/peers/")]
pub async fn get_peers(state: web::Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(PeersResponse {
        peers: state.peers.clone(),
    })
}
