
mod itemset;
mod tidset;

pub use itemset::Itemset;
pub use tidset::{TidProb, Tidset};

/// A mined itemset together with its probabilistic support and the
/// frequentness at that support. Immutable once produced.
#[derive( Debug, Clone )]
pub struct Pattern {
    pub itemset: Itemset,
    pub support: usize,
    pub probability: f64,
}

impl Pattern {
    pub fn new( itemset: Itemset, support: usize, probability: f64 ) -> Pattern {
	Pattern { itemset, support, probability }
    }
}
