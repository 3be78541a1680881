use actix_web::{HttpResponse, Responder, get, post, web};
use log::{debug, info, warn};
use std::time::Instant;

use super::models::{AppState, ErrorResponse, MempoolResponse, NewTxRequest, NewTxResponse};
use crate::blockchain::TransactionPayload;
use crate::transaction::{Input, Output, Transaction};

fn bad_request(msg: impl Into<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse { error: msg.into() })
}

/// Build a transaction from output ids, validate it against the ledger
/// and queue it. Validation and admission share one write lock.
#[post("/tx/")]
pub async fn post_transaction(
    state: web::Data<AppState>,
    body: web::Json<NewTxRequest>,
) -> impl Responder {
    let t0 = Instant::now();
    let body = body.into_inner();
    debug!(
        "POST /tx/ - received: inputs={}, outputs={}",
        body.inputs.len(),
        body.outputs.len()
    );

    if body.outputs.iter().any(|o| o.address.trim().is_empty()) {
        warn!("POST /tx/ - rejected: empty output address");
        return bad_request("output address required");
    }

    let mut ledger = state.ledger.write().expect("lock poisoned");

    let mut inputs = Vec::with_capacity(body.inputs.len());
    for req in &body.inputs {
        let Some(output) = ledger.transaction_output(&req.output_id) else {
            warn!("POST /tx/ - rejected: unknown output {}", req.output_id);
            return bad_request(format!("referenced output {} not found", req.output_id));
        };
        let mut input = Input::new(output.clone());
        if let Some(sig) = &req.signature {
            input.set_signature(sig.clone());
        }
        inputs.push(input);
    }

    let outputs = body
        .outputs
        .iter()
        .map(|o| Output::new(o.address.trim(), o.amount))
        .collect();
    let mut tx = Transaction::new(inputs, outputs);

    let fee = tx.fee();
    if let Some(address) = body.fee_address.as_deref().map(str::trim) {
        if !address.is_empty() && fee > 0 {
            tx.add_fee_output(address);
        }
    }
    if let Some(fee_output) = tx.fee_output() {
        debug!("POST /tx/ - fee output {} for {}", fee_output.id(), fee_output.address());
    }

    if let Err(e) = tx.validate(&*ledger) {
        warn!("POST /tx/ - validation failed for id={}: {}", tx.id(), e);
        return bad_request(e.to_string());
    }

    let payload = TransactionPayload::from(&tx);
    ledger.add_transaction(tx);
    let pending = ledger.pending_transactions().len();
    drop(ledger);

    info!(
        "POST /tx/ - id={} OK, pending={} ({} ms)",
        payload.id,
        pending,
        t0.elapsed().as_millis()
    );

    HttpResponse::Ok().json(NewTxResponse {
        transaction: payload,
        fee,
    })
}

/// List pending transactions (just ids to keep it compact).
#[get("/mempool/")]
pub async fn get_mempool(state: web::Data<AppState>) -> impl Responder {
    let ledger = state.ledger.read().expect("lock poisoned");
    let pending = ledger.pending_transactions();
    HttpResponse::Ok().json(MempoolResponse {
        size: pending.len(),
        utxo_pool_size: ledger.transaction_output_pool().len(),
        transactions: pending.iter().map(|t| t.id().to_string()).collect(),
    })
}
