
pub mod database;
pub mod error;
pub mod io;
pub mod miner;
pub mod model;
pub mod observe;
pub mod support;

pub use database::{DatabaseBuilder, UncertainDatabase, Vocabulary};
pub use error::{MineError, MineErrorKind};
pub use miner::{MiningConfig, TopKMiner};
pub use model::{Itemset, Pattern, TidProb, Tidset};
pub use observe::MiningObserver;
pub use support::{CalculatorKind, SupportCalculator};

/// Dense integer identifier of an item, assigned by the vocabulary
pub type Item = usize;

/// Identifier of a transaction as given by the input data
pub type Tid = usize;

/// Smallest probability kept after multiplying per-transaction probabilities.
/// Joint probabilities are clamped up to this value to avoid underflow to zero.
pub const MIN_PROB: f64 = 1e-300;

/// Tolerance absorbing floating point drift when comparing frequentness against tau
pub const EPSILON: f64 = 1e-9;
