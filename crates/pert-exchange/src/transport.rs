//! The transport abstraction boundary-exchange runs over (spec.md §9's "thin
//! transport abstraction `post_recv`/`send`/`wait`"), plus
//! [`ChannelTransport`], an in-process implementation suitable for
//! single-process runs and tests.

use std::collections::HashSet;
use std::sync::mpsc::{self, Receiver, Sender};

use rustc_hash::FxHashMap;

use pert_core::Rank;

use crate::error::{ExchangeError, ExchangeResult};

/// Non-blocking-receive / send / blocking-wait, scoped to one worker's view
/// of its peers. A real cluster deployment would implement this over MPI or
/// a TCP mesh; [`ChannelTransport`] implements it over in-process channels.
pub trait Transport {
    /// Register intent to receive `expected_len` values from `from`. Must
    /// be called for every peer before any `send` to preserve
    /// deadlock-freedom (spec.md §4.8 step 1).
    fn post_recv(&mut self, from: Rank, expected_len: usize) -> ExchangeResult<()>;

    /// Send `data` to `to`.
    fn send(&mut self, to: Rank, data: Vec<f64>) -> ExchangeResult<()>;

    /// Block until the buffer posted for `from` has arrived, and return it.
    fn wait(&mut self, from: Rank) -> ExchangeResult<Vec<f64>>;
}

/// One worker's endpoint in a full mesh of in-process `mpsc` channels —
/// one unbounded channel pair per ordered `(sender, receiver)` rank pair.
/// Unbounded channels mean `send` never blocks, so the post-recv-before-send
/// ordering this models is about protocol fidelity with a real transport
/// rather than a load-bearing deadlock-avoidance mechanism here.
pub struct ChannelTransport {
    own_rank: Rank,
    senders: FxHashMap<Rank, Sender<Vec<f64>>>,
    receivers: FxHashMap<Rank, Receiver<Vec<f64>>>,
    posted: HashSet<Rank>,
    expected_lens: FxHashMap<Rank, usize>,
}

impl ChannelTransport {
    /// Build one [`ChannelTransport`] per rank in `0..num_ranks`, wired as a
    /// full mesh (every ordered pair gets its own channel, including
    /// same-rank pairs for simplicity — those are simply never used).
    pub fn fleet(num_ranks: usize) -> Vec<Self> {
        let mut senders: Vec<FxHashMap<Rank, Sender<Vec<f64>>>> = (0..num_ranks).map(|_| FxHashMap::default()).collect();
        let mut receivers: Vec<FxHashMap<Rank, Receiver<Vec<f64>>>> = (0..num_ranks).map(|_| FxHashMap::default()).collect();

        for i in 0..num_ranks {
            for j in 0..num_ranks {
                if i == j {
                    continue;
                }
                let (tx, rx) = mpsc::channel();
                senders[i].insert(Rank(j as u16), tx);
                receivers[j].insert(Rank(i as u16), rx);
            }
        }

        (0..num_ranks)
            .map(|r| ChannelTransport {
                own_rank: Rank(r as u16),
                senders: std::mem::take(&mut senders[r]),
                receivers: std::mem::take(&mut receivers[r]),
                posted: HashSet::new(),
                expected_lens: FxHashMap::default(),
            })
            .collect()
    }

    pub fn own_rank(&self) -> Rank {
        self.own_rank
    }
}

impl Transport for ChannelTransport {
    fn post_recv(&mut self, from: Rank, expected_len: usize) -> ExchangeResult<()> {
        if !self.receivers.contains_key(&from) {
            return Err(ExchangeError::UnknownPeer(from));
        }
        self.posted.insert(from);
        self.expected_lens.insert(from, expected_len);
        Ok(())
    }

    fn send(&mut self, to: Rank, data: Vec<f64>) -> ExchangeResult<()> {
        let sender = self.senders.get(&to).ok_or(ExchangeError::UnknownPeer(to))?;
        sender.send(data).map_err(|_| ExchangeError::ChannelClosed(to))
    }

    fn wait(&mut self, from: Rank) -> ExchangeResult<Vec<f64>> {
        if !self.posted.remove(&from) {
            return Err(ExchangeError::RecvNotPosted(from));
        }
        let expected = self.expected_lens.remove(&from).unwrap_or(0);
        let receiver = self.receivers.get(&from).ok_or(ExchangeError::UnknownPeer(from))?;
        let data = receiver.recv().map_err(|_| ExchangeError::ChannelClosed(from))?;
        if data.len() != expected {
            return Err(ExchangeError::LengthMismatch { from, got: data.len(), expected });
        }
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn send_then_recv_round_trips() {
        let mut fleet = ChannelTransport::fleet(2);
        let mut t1 = fleet.pop().unwrap();
        let mut t0 = fleet.pop().unwrap();

        t1.post_recv(Rank(0), 3).unwrap();
        t0.send(Rank(1), vec![1.0, 2.0, 3.0]).unwrap();
        let data = t1.wait(Rank(0)).unwrap();
        assert_eq!(data, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn wait_without_post_recv_errors() {
        let mut fleet = ChannelTransport::fleet(2);
        let mut t1 = fleet.pop().unwrap();
        assert!(t1.wait(Rank(0)).is_err());
    }

    #[test]
    fn length_mismatch_is_reported() {
        let mut fleet = ChannelTransport::fleet(2);
        let mut t1 = fleet.pop().unwrap();
        let mut t0 = fleet.pop().unwrap();
        t1.post_recv(Rank(0), 5).unwrap();
        t0.send(Rank(1), vec![1.0]).unwrap();
        assert!(t1.wait(Rank(0)).is_err());
    }

    #[test]
    fn unknown_peer_rejected() {
        let mut fleet = ChannelTransport::fleet(2);
        let mut t0 = fleet.pop().unwrap();
        assert!(t0.send(Rank(9), vec![1.0]).is_err());
    }
}
