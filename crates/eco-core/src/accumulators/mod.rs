//! Shared Accumulators
//!
//! Capability traits for the currency ledger, dissatisfaction and ecology
//! accumulators, plus the in-memory implementations a session shares between
//! its factories.
//!
//! Implementations mutate through `Cell`, so handles are `Rc`-shared and the
//! whole model stays on one thread.

pub mod dissatisfaction;
pub mod ecology;
pub mod ledger;

pub use dissatisfaction::{Dissatisfaction, DissatisfactionSink};
pub use ecology::{Ecology, EcologySink};
pub use ledger::{CurrencyLedger, Money};
