//! The boundary-exchange protocol itself (spec.md §4.8): post receives,
//! pack, send, wait, contact-gate, quantise.

use pert_core::{QuantizationMode, Rank};
use pert_partition::ExchangePlan;

use crate::contact_map::ContactMap;
use crate::error::ExchangeResult;
use crate::transport::Transport;

/// True iff any contact time falls in the half-open interval `[lower,
/// upper)`; `Some(count)` is returned alongside so callers can quantise
/// without a second pass.
fn intersecting_count(times: &[f64], lower: f64, upper: f64) -> usize {
    times.iter().filter(|&&t| t >= lower && t < upper).count()
}

/// The multiplier applied to a delivered scalar, or `None` if the wire pair
/// gates closed for this outer tick (spec.md §4.8 steps 4–5).
fn gate_multiplier(times: &[f64], lower: f64, upper: f64, mode: QuantizationMode) -> Option<f64> {
    let count = intersecting_count(times, lower, upper);
    if count == 0 {
        return None;
    }
    match mode {
        QuantizationMode::Single => Some(1.0),
        QuantizationMode::Multiple => Some(count as f64),
    }
}

/// Run one worker's side of one outer tick's boundary exchange.
///
/// `pack` reads a local agent's current `outputAugmented[voutName]`; `deliver`
/// writes a gated, quantised value into a local agent's
/// `inputAugmented[vinName]`. Both operate purely on virtual-node names —
/// this function has no notion of which `Computation` owns which name.
pub fn exchange_boundary<T: Transport>(
    own_rank: Rank,
    num_ranks: usize,
    outer: u32,
    delta_t: f64,
    plan: &ExchangePlan,
    contacts: &ContactMap,
    quantization: QuantizationMode,
    transport: &mut T,
    mut pack: impl FnMut(&str) -> f64,
    mut deliver: impl FnMut(&str, f64),
) -> ExchangeResult<()> {
    let lower = outer as f64 * delta_t;
    let upper = (outer as f64 + 1.0) * delta_t;

    // Step 1: post receives from every peer that has something for us.
    let mut recv_peers = Vec::new();
    for r in 0..num_ranks {
        let src = Rank(r as u16);
        if src == own_rank {
            continue;
        }
        let pairs = plan.by_rank_pair(src, own_rank);
        if !pairs.is_empty() {
            transport.post_recv(src, pairs.len())?;
            recv_peers.push(src);
        }
    }

    // Step 2-3: pack and send to every peer we owe something to.
    for r in 0..num_ranks {
        let dst = Rank(r as u16);
        if dst == own_rank {
            continue;
        }
        let pairs = plan.by_rank_pair(own_rank, dst);
        if pairs.is_empty() {
            continue;
        }
        let buffer: Vec<f64> = pairs.iter().map(|(vout_name, _)| pack(vout_name)).collect();
        transport.send(dst, buffer)?;
    }

    // Step 4-5: wait, contact-gate, quantise, deliver.
    for src in recv_peers {
        let data = transport.wait(src)?;
        let pairs = plan.by_rank_pair(src, own_rank);
        for ((vout_name, vin_name), value) in pairs.iter().zip(data) {
            let times = contacts.contact_times(vout_name, vin_name);
            if let Some(multiplier) = gate_multiplier(times, lower, upper, quantization) {
                deliver(vin_name, value * multiplier);
            }
        }
    }

    Ok(())
}
