
use std::f64::consts::PI;
use std::ops::{Add, Mul, Sub};

/// Coefficients this close to zero after the inverse transform are numerical
/// noise and flushed to exactly zero.
const NOISE_FLOOR: f64 = 1e-10;

/// Complex number for the Fourier transforms
#[derive( Debug, Clone, Copy, Default, PartialEq )]
pub struct Complex {
    pub re: f64,
    pub im: f64,
}

impl Complex {
    pub fn new( re: f64, im: f64 ) -> Complex {
	Complex { re, im }
    }

    pub fn from_real( re: f64 ) -> Complex {
	Complex { re, im: 0.0 }
    }

    pub fn conjugate( self ) -> Complex {
	Complex { re: self.re, im: -self.im }
    }

    pub fn scale( self, factor: f64 ) -> Complex {
	Complex { re: self.re * factor, im: self.im * factor }
    }
}

impl Add for Complex {
    type Output = Complex;

    fn add( self, other: Complex ) -> Complex {
	Complex { re: self.re + other.re, im: self.im + other.im }
    }
}

impl Sub for Complex {
    type Output = Complex;

    fn sub( self, other: Complex ) -> Complex {
	Complex { re: self.re - other.re, im: self.im - other.im }
    }
}

impl Mul for Complex {
    type Output = Complex;

    fn mul( self, other: Complex ) -> Complex {
	Complex {
	    re: self.re * other.re - self.im * other.im,
	    im: self.re * other.im + self.im * other.re,
	}
    }
}

/// Radix-2 Cooley-Tukey forward transform with twiddle factors
/// exp(-2 pi i k / n).
/// Pre: the input length is a power of two.
pub fn fft( input: &[Complex] ) -> Vec<Complex> {
    let n = input.len();
    if n == 1 {
	return vec![ input[0] ];
    }
    debug_assert!( n.is_power_of_two(), "fft length must be a power of two" );

    let even: Vec<Complex> = input.iter().copied().step_by( 2 ).collect();
    let odd: Vec<Complex> = input.iter().copied().skip( 1 ).step_by( 2 ).collect();
    let even = fft( &even );
    let odd = fft( &odd );

    let mut output = vec![Complex::default(); n];
    for k in 0 .. n / 2 {
	let angle = -2.0 * PI * k as f64 / n as f64;
	let twiddle = Complex::new( angle.cos(), angle.sin() );
	let term = twiddle * odd[ k ];
	output[ k ] = even[ k ] + term;
	output[ k + n / 2 ] = even[ k ] - term;
    }
    output
}

/// Inverse transform via the conjugate trick:
/// ifft(x) = conjugate(fft(conjugate(x))) / n
pub fn inverse_fft( input: &[Complex] ) -> Vec<Complex> {
    let n = input.len();
    let conjugated: Vec<Complex> = input.iter().map( |value| value.conjugate() ).collect();
    fft( &conjugated ).into_iter()
	.map( |value| value.conjugate().scale( 1.0 / n as f64 ))
	.collect()
}

/// Product of two real polynomials via pointwise multiplication in the
/// frequency domain. Both operands are padded to the next power of two at
/// least |a| + |b| - 1; the result has exactly |a| + |b| - 1 coefficients
/// with sub-noise magnitudes flushed to zero.
pub fn multiply_polynomials( a: &[f64], b: &[f64] ) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
	return Vec::new();
    }

    let result_len = a.len() + b.len() - 1;
    let size = result_len.next_power_of_two();

    let mut a_padded = vec![Complex::default(); size];
    let mut b_padded = vec![Complex::default(); size];
    for (slot, &coefficient) in a_padded.iter_mut().zip( a ) {
	*slot = Complex::from_real( coefficient );
    }
    for (slot, &coefficient) in b_padded.iter_mut().zip( b ) {
	*slot = Complex::from_real( coefficient );
    }

    let a_freq = fft( &a_padded );
    let b_freq = fft( &b_padded );
    let product: Vec<Complex> = a_freq.iter().zip( &b_freq )
	.map( |(&left, &right)| left * right )
	.collect();

    inverse_fft( &product ).iter()
	.take( result_len )
	.map( |value| if value.re.abs() < NOISE_FLOOR { 0.0 } else { value.re } )
	.collect()
}
