use actix_web::{HttpResponse, Responder, post, web};
use log::{debug, error, info, warn};
use std::sync::atomic::Ordering;
use std::time::Instant;

use super::models::{AppState, ErrorResponse, MineResponse};
use crate::blockchain::BlockPayload;
use crate::node::broadcast_to_peers;

/// Mine the pending transactions into a new block:
/// - Snapshot a candidate block under the read lock
/// - Search the nonce on the blocking pool, aborting if the tip moves
/// - Commit under the write lock, unless the tip generation moved since the
///   snapshot (re-checks linkage against the tip)
/// - Hand the sealed block to the replication hook
#[post("/mine/")]
pub async fn mine_block(state: web::Data<AppState>) -> impl Responder {
    let t0 = Instant::now();

    let (mut candidate, difficulty, generation) = {
        let ledger = state.ledger.read().expect("lock poisoned");
        (
            ledger.candidate_block(),
            ledger.difficulty(),
            state.tip_generation.load(Ordering::SeqCst),
        )
    };
    debug!(
        "MINER - candidate over {} txs at difficulty {}",
        candidate.transactions.len(),
        difficulty
    );

    let watcher = state.clone();
    let mined = web::block(move || {
        let finished = candidate.mine_until(difficulty, || {
            watcher.tip_generation.load(Ordering::Relaxed) != generation
        });
        finished.then_some(candidate)
    })
    .await;

    let block = match mined {
        Ok(Some(block)) => block,
        Ok(None) => {
            info!("MINER - aborted: chain tip moved while mining");
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "chain tip moved while mining".into(),
            });
        }
        Err(e) => {
            error!("MINER - mining task failed: {e}");
            return HttpResponse::InternalServerError().json(ErrorResponse {
                error: "mining task failed".into(),
            });
        }
    };

    let (payload, mined_index) = {
        let mut ledger = state.ledger.write().expect("lock poisoned");
        if state.tip_generation.load(Ordering::SeqCst) != generation {
            info!("MINER - discarded: chain tip moved before commit");
            return HttpResponse::Conflict().json(ErrorResponse {
                error: "chain tip moved while mining".into(),
            });
        }
        let committed = ledger.commit_mined_block(block).map(BlockPayload::from);
        match committed {
            Ok(payload) => {
                state.tip_generation.fetch_add(1, Ordering::SeqCst);
                (payload, ledger.len() - 1)
            }
            Err(e) => {
                warn!("MINER - mined block discarded: {e}");
                return HttpResponse::Conflict().json(ErrorResponse {
                    error: e.to_string(),
                });
            }
        }
    };

    let resp = MineResponse {
        mined_index,
        hash: payload.hash.clone(),
        nonce: payload.nonce,
        difficulty,
        transactions: payload.transactions.len(),
        elapsed_ms: t0.elapsed().as_millis(),
    };
    info!(
        "MINER - sealed block #{} (hash={}, nonce={}, {} ms)",
        resp.mined_index, resp.hash, resp.nonce, resp.elapsed_ms
    );

    broadcast_to_peers(&state.peers, &state.http, payload);

    HttpResponse::Ok().json(resp)
}
