
use std::fmt;

/// Kinds of errors surfaced by construction and ingestion.
#[derive( Debug, Clone, Copy, PartialEq, Eq, Hash )]
pub enum MineErrorKind {
    /// A mining parameter is out of range (minsup, tau or k)
    InvalidConfig,
    /// A probability outside [0, 1], NaN or infinite
    InvalidProbability,
    /// A duplicate or otherwise unusable transaction id
    InvalidTid,
    /// The input file could not be read or written
    Io,
}

impl MineErrorKind {
    pub const fn as_str( self ) -> &'static str {
	match self {
	    MineErrorKind::InvalidConfig => "InvalidConfig",
	    MineErrorKind::InvalidProbability => "InvalidProbability",
	    MineErrorKind::InvalidTid => "InvalidTid",
	    MineErrorKind::Io => "Io",
	}
    }
}

impl fmt::Display for MineErrorKind {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
	write!( f, "{}", self.as_str() )
    }
}

/// Error returned by all fallible operations of this crate.
#[derive( Debug )]
pub struct MineError {
    kind: MineErrorKind,
    message: String,
}

impl MineError {
    pub fn new( kind: MineErrorKind, message: impl Into<String> ) -> MineError {
	MineError { kind, message: message.into() }
    }

    pub fn kind( &self ) -> MineErrorKind {
	self.kind
    }

    pub fn message( &self ) -> &str {
	self.message.as_str()
    }

    pub(crate) fn invalid_config( message: impl Into<String> ) -> MineError {
	MineError::new( MineErrorKind::InvalidConfig, message )
    }

    pub(crate) fn invalid_probability( value: f64 ) -> MineError {
	MineError::new( MineErrorKind::InvalidProbability, format!( "probability must be a finite value in [0, 1], got {value}" ))
    }

    pub(crate) fn invalid_tid( message: impl Into<String> ) -> MineError {
	MineError::new( MineErrorKind::InvalidTid, message )
    }

    pub(crate) fn io( message: impl fmt::Display ) -> MineError {
	MineError::new( MineErrorKind::Io, message.to_string() )
    }
}

impl fmt::Display for MineError {
    fn fmt( &self, f: &mut fmt::Formatter<'_> ) -> fmt::Result {
	write!( f, "{}", self.kind )?;
	if !self.message.is_empty() {
	    write!( f, ": {}", self.message )?;
	}
	Ok( () )
    }
}

impl std::error::Error for MineError {}
