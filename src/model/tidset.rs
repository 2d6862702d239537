
use crate::error::MineError;
use crate::{Tid, MIN_PROB};

/// A transaction id paired with the probability that the owning itemset
/// occurs in that transaction.
#[derive( Debug, Clone, Copy, PartialEq )]
pub struct TidProb {
    pub tid: Tid,
    pub prob: f64,
}

/// Sparse vertical representation of the transactions containing an itemset.
/// Entries are strictly ascending by tid; probabilities are finite values in
/// [MIN_PROB treated as floor after intersection, 1].
#[derive( Debug, Clone, Default, PartialEq )]
pub struct Tidset {
    entries: Vec<TidProb>,
}

impl Tidset {
    pub fn new() -> Tidset {
	Tidset { entries: Vec::new() }
    }

    /// Builds a tidset from unordered entries. Entries are sorted by tid;
    /// duplicate tids and invalid probabilities are rejected.
    pub fn from_entries( mut entries: Vec<TidProb> ) -> Result<Tidset, MineError> {
	for entry in &entries {
	    check_probability( entry.prob )?;
	}
	entries.sort_by_key( |entry| entry.tid );
	for pair in entries.windows( 2 ) {
	    if pair[0].tid == pair[1].tid {
		return Err( MineError::invalid_tid( format!( "duplicate transaction id {}", pair[0].tid )));
	    }
	}
	Ok( Tidset { entries } )
    }

    /// Appends an entry. The tid must be strictly greater than the last one.
    pub fn push( &mut self, tid: Tid, prob: f64 ) -> Result<(), MineError> {
	check_probability( prob )?;
	if let Some( last ) = self.entries.last() {
	    if tid <= last.tid {
		return Err( MineError::invalid_tid( format!( "transaction id {tid} breaks the ascending order after {}", last.tid )));
	    }
	}
	self.entries.push( TidProb { tid, prob } );
	Ok( () )
    }

    pub fn len( &self ) -> usize {
	self.entries.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.entries.is_empty()
    }

    pub fn iter( &self ) -> std::slice::Iter<'_, TidProb> {
	self.entries.iter()
    }

    /// Merge-join intersection with probability product under independence.
    /// Products that underflow are clamped up to MIN_PROB. Linear in the
    /// lengths of both inputs; the output stays strictly ascending.
    pub fn intersect( &self, other: &Tidset ) -> Tidset {
	let mut entries = Vec::with_capacity( self.len().min( other.len() ));
	let (mut i, mut j) = (0, 0);
	while i < self.entries.len() && j < other.entries.len() {
	    let left = self.entries[ i ];
	    let right = other.entries[ j ];
	    if left.tid == right.tid {
		let mut prob = left.prob * right.prob;
		if prob < MIN_PROB {
		    prob = MIN_PROB;
		}
		entries.push( TidProb { tid: left.tid, prob } );
		i += 1;
		j += 1;
	    } else if left.tid < right.tid {
		i += 1;
	    } else {
		j += 1;
	    }
	}
	Tidset { entries }
    }

    /// Expands to a dense probability vector indexed by tid.
    /// Entries with tids outside [0, total) are dropped.
    pub fn to_dense( &self, total: usize ) -> Vec<f64> {
	let mut probs = vec![0.0; total];
	for entry in &self.entries {
	    if entry.tid < total {
		probs[ entry.tid ] = entry.prob;
	    }
	}
	probs
    }
}

fn check_probability( prob: f64 ) -> Result<(), MineError> {
    if !prob.is_finite() || !(0.0 ..= 1.0).contains( &prob ) {
	return Err( MineError::invalid_probability( prob ));
    }
    Ok( () )
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::MineErrorKind;

    fn tidset( entries: &[(Tid, f64)] ) -> Tidset {
	let entries = entries.iter().map( |&(tid, prob)| TidProb { tid, prob } ).collect();
	Tidset::from_entries( entries ).expect( "test entries are valid" )
    }

    #[test]
    fn test_from_entries_sorts_by_tid() {
	let set = tidset( &[(4, 0.5), (1, 0.9), (2, 0.3)] );
	let tids: Vec<Tid> = set.iter().map( |entry| entry.tid ).collect();
	assert_eq!( tids, vec!( 1, 2, 4 ));
    }

    #[test]
    fn test_duplicate_tid_rejected() {
	let entries = vec!( TidProb { tid: 3, prob: 0.5 }, TidProb { tid: 3, prob: 0.6 } );
	let error = Tidset::from_entries( entries ).unwrap_err();
	assert_eq!( error.kind(), MineErrorKind::InvalidTid );
    }

    #[test]
    fn test_invalid_probability_rejected() {
	for bad in [-0.1, 1.1, f64::NAN, f64::INFINITY] {
	    let error = Tidset::new().push( 0, bad ).unwrap_err();
	    assert_eq!( error.kind(), MineErrorKind::InvalidProbability );
	}
    }

    #[test]
    fn test_push_enforces_ascending_order() {
	let mut set = Tidset::new();
	set.push( 1, 0.5 ).unwrap();
	set.push( 4, 0.5 ).unwrap();
	assert_eq!( set.push( 4, 0.2 ).unwrap_err().kind(), MineErrorKind::InvalidTid );
	assert_eq!( set.push( 2, 0.2 ).unwrap_err().kind(), MineErrorKind::InvalidTid );
    }

    #[test]
    fn test_intersect_merges_common_tids() {
	let left = tidset( &[(1, 0.8), (2, 0.9), (4, 0.7)] );
	let right = tidset( &[(2, 0.6), (3, 0.5), (4, 0.8)] );
	let common = left.intersect( &right );

	let entries: Vec<(Tid, f64)> = common.iter().map( |entry| (entry.tid, entry.prob) ).collect();
	assert_eq!( entries.len(), 2 );
	assert_eq!( entries[0].0, 2 );
	assert!( (entries[0].1 - 0.54).abs() < 1e-12 );
	assert_eq!( entries[1].0, 4 );
	assert!( (entries[1].1 - 0.56).abs() < 1e-12 );
    }

    #[test]
    fn test_intersect_is_commutative() {
	let left = tidset( &[(0, 0.3), (2, 0.7), (5, 0.2), (9, 1.0)] );
	let right = tidset( &[(2, 0.4), (5, 0.8), (7, 0.5)] );
	assert_eq!( left.intersect( &right ), right.intersect( &left ));
    }

    #[test]
    fn test_intersect_empty_overlap() {
	let left = tidset( &[(0, 0.5), (2, 0.5)] );
	let right = tidset( &[(1, 0.5), (3, 0.5)] );
	assert!( left.intersect( &right ).is_empty() );
	assert!( left.intersect( &Tidset::new() ).is_empty() );
    }

    #[test]
    fn test_intersect_clamps_underflow() {
	let left = tidset( &[(0, 1e-200)] );
	let right = tidset( &[(0, 1e-200)] );
	let product = left.intersect( &right );
	assert_eq!( product.iter().next().unwrap().prob, MIN_PROB );
    }

    #[test]
    fn test_intersect_output_sorted() {
	let left = tidset( &[(0, 0.9), (3, 0.9), (5, 0.9), (8, 0.9)] );
	let right = tidset( &[(0, 0.9), (5, 0.9), (8, 0.9), (9, 0.9)] );
	let common = left.intersect( &right );
	let tids: Vec<Tid> = common.iter().map( |entry| entry.tid ).collect();
	let mut sorted = tids.clone();
	sorted.sort();
	sorted.dedup();
	assert_eq!( tids, sorted );
    }

    #[test]
    fn test_to_dense_pads_missing_tids() {
	let set = tidset( &[(1, 0.8), (3, 0.6)] );
	assert_eq!( set.to_dense( 5 ), vec!( 0.0, 0.8, 0.0, 0.6, 0.0 ));
    }
}
