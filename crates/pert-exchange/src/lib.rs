//! `pert-exchange` — the boundary exchange engine: a transport abstraction,
//! the post-recv/pack/send/wait protocol, the contact-gate test, and
//! quantisation (spec.md component H, §4.8).

pub mod contact_map;
pub mod error;
pub mod exchange;
pub mod transport;

pub use contact_map::ContactMap;
pub use error::{ExchangeError, ExchangeResult};
pub use exchange::exchange_boundary;
pub use transport::{ChannelTransport, Transport};
