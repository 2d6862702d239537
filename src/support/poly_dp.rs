
use crate::error::MineError;
use crate::model::Tidset;
use crate::MIN_PROB;

use super::{check_tau, frequentness, probabilistic_support, SupportCalculator};

/// Default support implementation: multiplies the per-transaction
/// polynomials (1-p) + p*x into a single coefficient vector by in-place
/// dynamic programming. O(n^2) time, O(n) space.
#[derive( Debug, Clone )]
pub struct PolyDpCalculator {
    tau: f64,
}

impl PolyDpCalculator {
    pub fn new( tau: f64 ) -> Result<PolyDpCalculator, MineError> {
	Ok( PolyDpCalculator { tau: check_tau( tau )? } )
    }

    /// Coefficient vector of the generating function: result[s] = P(support = s).
    /// Probabilities below MIN_PROB are skipped, they only contribute a
    /// factor of about 1 to the constant coefficient.
    pub(crate) fn distribution( &self, probs: &[f64] ) -> Vec<f64> {
	distribution_of( probs.iter().copied(), probs.len() )
    }
}

fn distribution_of<I>( probs: I, capacity: usize ) -> Vec<f64> where
    I: Iterator<Item = f64>,
{
    let mut coeffs = vec![0.0; capacity + 1];
    coeffs[0] = 1.0;
    let mut degree = 0;

    for p in probs {
	if p < MIN_PROB {
	    continue;
	}
	// multiply by (1-p) + p*x in place; the backward sweep reads
	// coeffs[i - 1] before it is overwritten
	for i in (1 ..= degree + 1).rev() {
	    coeffs[ i ] = coeffs[ i ] * (1.0 - p) + coeffs[ i - 1 ] * p;
	}
	coeffs[0] *= 1.0 - p;
	degree += 1;
    }

    coeffs.truncate( degree + 1 );
    coeffs
}

impl SupportCalculator for PolyDpCalculator {
    fn support_and_probability( &self, probs: &[f64] ) -> (usize, f64) {
	let freq = frequentness( &self.distribution( probs ));
	probabilistic_support( &freq, self.tau )
    }

    /// Runs the same DP over the tidset entries only, so the coefficient
    /// vector has length |tidset| + 1 instead of one slot per transaction.
    fn support_and_probability_sparse( &self, tidset: &Tidset, _total_transactions: usize ) -> (usize, f64) {
	let dist = distribution_of( tidset.iter().map( |entry| entry.prob ), tidset.len() );
	let freq = frequentness( &dist );
	probabilistic_support( &freq, self.tau )
    }

    fn name( &self ) -> &'static str {
	"poly-dp"
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::model::TidProb;

    macro_rules! assert_approx {
	($real:expr, $expected:expr, $delta:expr) => {
	    if $real < $expected - $delta || $real > $expected + $delta {
		panic!( "Violate {:.9} == {:.9} (+-{:.9})", $real, $expected, $delta );
	    }
	}
    }

    #[test]
    fn test_distribution_of_three_transactions() {
	let calculator = PolyDpCalculator::new( 0.7 ).unwrap();
	let dist = calculator.distribution( &[0.6, 0.8, 0.5] );
	let expected = [0.04, 0.28, 0.44, 0.24];
	assert_eq!( dist.len(), expected.len() );
	for (real, expect) in dist.iter().zip( expected ) {
	    assert_approx!( *real, expect, 1e-9 );
	}
    }

    #[test]
    fn test_support_and_probability() {
	let calculator = PolyDpCalculator::new( 0.7 ).unwrap();
	let (support, probability) = calculator.support_and_probability( &[0.6, 0.8, 0.5] );
	assert_eq!( support, 2 );
	assert_approx!( probability, 0.68, 1e-9 );
    }

    #[test]
    fn test_near_zero_probabilities_are_skipped() {
	let calculator = PolyDpCalculator::new( 0.5 ).unwrap();
	let with_zeros = calculator.distribution( &[0.6, 0.0, 1e-310, 0.8] );
	let without = calculator.distribution( &[0.6, 0.8] );
	assert_eq!( with_zeros, without );
    }

    #[test]
    fn test_sparse_skips_padding() {
	let calculator = PolyDpCalculator::new( 0.7 ).unwrap();
	let entries = vec!( TidProb { tid: 2, prob: 0.6 }, TidProb { tid: 5, prob: 0.8 }, TidProb { tid: 9, prob: 0.5 } );
	let tidset = Tidset::from_entries( entries ).unwrap();
	let sparse = calculator.support_and_probability_sparse( &tidset, 1000 );
	let dense = calculator.support_and_probability( &[0.6, 0.8, 0.5] );
	assert_eq!( sparse.0, dense.0 );
	assert_approx!( sparse.1, dense.1, 1e-12 );
    }

    #[test]
    fn test_certain_transactions() {
	let calculator = PolyDpCalculator::new( 0.9 ).unwrap();
	let (support, probability) = calculator.support_and_probability( &[1.0, 1.0, 1.0] );
	assert_eq!( support, 3 );
	assert_approx!( probability, 1.0, 1e-12 );
    }
}
