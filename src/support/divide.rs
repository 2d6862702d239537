
use crate::error::MineError;
use crate::model::Tidset;
use crate::MIN_PROB;

use super::{check_tau, fft, frequentness, probabilistic_support, SupportCalculator};

/// Divide and conquer support calculator with FFT merges: each transaction
/// becomes the polynomial [1-p, p], halves are multiplied recursively and
/// merged through the frequency domain. O(n log^2 n).
#[derive( Debug, Clone )]
pub struct FftDcCalculator {
    tau: f64,
}

/// Same recursion tree as the FFT variant, but merges by direct O(|a|*|b|)
/// convolution. O(n^2 log n); kept for correctness cross-checks.
#[derive( Debug, Clone )]
pub struct NaiveDcCalculator {
    tau: f64,
}

impl FftDcCalculator {
    pub fn new( tau: f64 ) -> Result<FftDcCalculator, MineError> {
	Ok( FftDcCalculator { tau: check_tau( tau )? } )
    }
}

impl NaiveDcCalculator {
    pub fn new( tau: f64 ) -> Result<NaiveDcCalculator, MineError> {
	Ok( NaiveDcCalculator { tau: check_tau( tau )? } )
    }
}

impl SupportCalculator for FftDcCalculator {
    fn support_and_probability( &self, probs: &[f64] ) -> (usize, f64) {
	let freq = frequentness( &distribution( probs, fft::multiply_polynomials ));
	probabilistic_support( &freq, self.tau )
    }

    fn support_and_probability_sparse( &self, tidset: &Tidset, _total_transactions: usize ) -> (usize, f64) {
	let probs: Vec<f64> = tidset.iter().map( |entry| entry.prob ).collect();
	self.support_and_probability( &probs )
    }

    fn name( &self ) -> &'static str {
	"fft-dc"
    }
}

impl SupportCalculator for NaiveDcCalculator {
    fn support_and_probability( &self, probs: &[f64] ) -> (usize, f64) {
	let freq = frequentness( &distribution( probs, convolve ));
	probabilistic_support( &freq, self.tau )
    }

    fn support_and_probability_sparse( &self, tidset: &Tidset, _total_transactions: usize ) -> (usize, f64) {
	let probs: Vec<f64> = tidset.iter().map( |entry| entry.prob ).collect();
	self.support_and_probability( &probs )
    }

    fn name( &self ) -> &'static str {
	"naive-dc"
    }
}

/// Support distribution via the divide and conquer tree over the filtered
/// probabilities. The merge function multiplies two partial distributions.
fn distribution( probs: &[f64], merge: fn( &[f64], &[f64] ) -> Vec<f64> ) -> Vec<f64> {
    let filtered: Vec<f64> = probs.iter().copied()
	.filter( |&p| p >= MIN_PROB && p <= 1.0 )
	.collect();
    if filtered.is_empty() {
	return vec![ 1.0 ];
    }
    multiply_range( &filtered, merge )
}

fn multiply_range( probs: &[f64], merge: fn( &[f64], &[f64] ) -> Vec<f64> ) -> Vec<f64> {
    if probs.len() == 1 {
	let p = probs[0];
	return vec![ 1.0 - p, p ];
    }
    let mid = probs.len() / 2;
    let left = multiply_range( &probs[.. mid], merge );
    let right = multiply_range( &probs[mid ..], merge );
    merge( &left, &right )
}

/// Direct convolution: result[s] = sum over i of a[i] * b[s - i]
fn convolve( a: &[f64], b: &[f64] ) -> Vec<f64> {
    let mut result = vec![0.0; a.len() + b.len() - 1];
    for (i, &left) in a.iter().enumerate() {
	for (j, &right) in b.iter().enumerate() {
	    result[ i + j ] += left * right;
	}
    }
    result
}
