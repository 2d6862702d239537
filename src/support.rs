
mod divide;
mod fft;
mod poly_dp;

use std::fmt;
use std::str::FromStr;

pub use divide::{FftDcCalculator, NaiveDcCalculator};
pub use fft::{multiply_polynomials, Complex};
pub use poly_dp::PolyDpCalculator;

use crate::error::MineError;
use crate::model::Tidset;
use crate::EPSILON;

/// Computes the probabilistic support of an itemset from the per-transaction
/// probabilities of its joint occurrence.
///
/// The support count is a Poisson binomial variable; implementations differ
/// only in how they obtain its distribution. All of them share the
/// frequentness tail: the complementary CDF followed by a binary search for
/// the largest support with frequentness at least tau.
pub trait SupportCalculator: Send + Sync {
    /// Returns (support, probability) for a dense probability vector
    fn support_and_probability( &self, probs: &[f64] ) -> (usize, f64);

    /// Equivalent to the dense call on the zero-padded expansion of the
    /// tidset, without allocating one slot per transaction.
    fn support_and_probability_sparse( &self, tidset: &Tidset, total_transactions: usize ) -> (usize, f64) {
	self.support_and_probability( &tidset.to_dense( total_transactions ))
    }

    fn name( &self ) -> &'static str;
}

/// Selects one of the interchangeable support implementations.
#[derive( Debug, Clone, Copy, PartialEq, Eq )]
pub enum CalculatorKind {
    /// In-place polynomial DP over the generating function (default)
    PolyDp,
    /// Divide and conquer with FFT merges
    FftDc,
    /// Divide and conquer with direct convolution merges
    NaiveDc,
}

impl CalculatorKind {
    pub fn build( self, tau: f64 ) -> Result<Box<dyn SupportCalculator>, MineError> {
	match self {
	    CalculatorKind::PolyDp => Ok( Box::new( PolyDpCalculator::new( tau )? )),
	    CalculatorKind::FftDc => Ok( Box::new( FftDcCalculator::new( tau )? )),
	    CalculatorKind::NaiveDc => Ok( Box::new( NaiveDcCalculator::new( tau )? )),
	}
    }
}

impl fmt::Display for CalculatorKind {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
	let name = match self {
	    CalculatorKind::PolyDp => "poly-dp",
	    CalculatorKind::FftDc => "fft-dc",
	    CalculatorKind::NaiveDc => "naive-dc",
	};
	write!( f, "{name}" )
    }
}

impl FromStr for CalculatorKind {
    type Err = MineError;

    fn from_str( name: &str ) -> Result<CalculatorKind, MineError> {
	match name {
	    "poly-dp" => Ok( CalculatorKind::PolyDp ),
	    "fft-dc" => Ok( CalculatorKind::FftDc ),
	    "naive-dc" => Ok( CalculatorKind::NaiveDc ),
	    other => Err( MineError::invalid_config( format!( "unknown calculator {other}, expected poly-dp, fft-dc or naive-dc" ))),
	}
    }
}

/// Validates the probability threshold shared by all calculators
pub(crate) fn check_tau( tau: f64 ) -> Result<f64, MineError> {
    if !tau.is_finite() || tau <= 0.0 || tau > 1.0 {
	return Err( MineError::invalid_config( format!( "tau must be in (0, 1], got {tau}" )));
    }
    Ok( tau )
}

/// Complementary CDF of the support distribution: freq[s] = P(support >= s),
/// obtained as a reverse prefix sum. Monotonically non-increasing in s.
pub(crate) fn frequentness( distribution: &[f64] ) -> Vec<f64> {
    let mut freq = vec![0.0; distribution.len()];
    let last = distribution.len() - 1;
    freq[ last ] = distribution[ last ];
    for i in (0 .. last).rev() {
	freq[ i ] = freq[ i + 1 ] + distribution[ i ];
    }
    freq
}

/// Largest s with freq[s] >= tau - EPSILON, together with freq[s].
/// Binary search over the non-increasing frequentness vector.
pub(crate) fn probabilistic_support( frequentness: &[f64], tau: f64 ) -> (usize, f64) {
    let mut support = 0;
    let (mut low, mut high) = (0_i64, frequentness.len() as i64 - 1);
    while low <= high {
	let mid = (low + (high - low) / 2) as usize;
	if frequentness[ mid ] >= tau - EPSILON {
	    support = mid;
	    low = mid as i64 + 1;
	} else {
	    high = mid as i64 - 1;
	}
    }
    (support, frequentness[ support ])
}
