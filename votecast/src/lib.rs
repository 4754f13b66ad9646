#[macro_use]
extern crate serde;

mod allow_list;
mod config;
mod confirmation;
mod consistency;
mod correction;
mod dispute_input;
mod dispute_resolver;
mod error;
mod extraction;
mod group;
mod hash;
mod ids;
mod lvcc;
mod node;
mod resolved_vote;
mod serde_hex;
mod service;
mod signed;
mod state;
mod verification;

pub use allow_list::*;
pub use config::*;
pub use confirmation::*;
pub use consistency::*;
pub use correction::*;
pub use dispute_input::*;
pub use dispute_resolver::*;
pub use error::*;
pub use extraction::*;
pub use group::*;
pub use hash::*;
pub use ids::*;
pub use lvcc::*;
pub use node::*;
pub use resolved_vote::*;
pub use serde_hex::*;
pub use service::*;
pub use signed::*;
pub use state::*;
pub use verification::*;
