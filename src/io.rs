
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Serialize;

use crate::database::{DatabaseBuilder, UncertainDatabase, Vocabulary};
use crate::error::MineError;
use crate::model::{Itemset, Pattern};
use crate::{Item, Tid};

/// Reads an uncertain transaction database from a file.
/// See `parse_database` for the accepted grammar.
pub fn read_database( path: &str ) -> Result<UncertainDatabase, MineError> {
    let text = fs::read_to_string( Path::new( path )).map_err( |err| MineError::io( err ))?;
    parse_database( &text )
}

/// Parses the line oriented text form: an optional header line of exactly
/// two integers, then one transaction per line as
/// `<tid> <item>:<prob> <item>:<prob> ...`.
/// Lines that do not parse are skipped silently, as are empty lines.
/// Probabilities that parse but fall outside [0, 1] abort the load.
pub fn parse_database( text: &str ) -> Result<UncertainDatabase, MineError> {
    let mut builder = DatabaseBuilder::new();
    let mut first = true;
    for line in text.lines() {
	let line = line.trim();
	if line.is_empty() {
	    continue;
	}
	if first && is_header( line ) {
	    first = false;
	    continue;
	}
	first = false;
	parse_line( line, &mut builder )?;
    }
    builder.build()
}

fn is_header( line: &str ) -> bool {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    tokens.len() == 2 && tokens.iter().all( |token| token.parse::<usize>().is_ok() )
}

fn parse_line( line: &str, builder: &mut DatabaseBuilder ) -> Result<(), MineError> {
    let mut tokens = line.split_whitespace();
    let tid: Tid = match tokens.next().and_then( |token| token.parse().ok() ) {
	Some( tid ) => tid,
	None => return Ok( () ), // not a transaction line
    };

    let mut items: Vec<(Item, f64)> = Vec::new();
    for token in tokens {
	let (name, prob) = match token.split_once( ':' ) {
	    Some( pair ) => pair,
	    None => continue,
	};
	let prob: f64 = match prob.parse() {
	    Ok( prob ) => prob,
	    Err( _ ) => continue,
	};
	items.push( (builder.intern( name ), prob) );
    }
    if items.is_empty() {
	return Ok( () );
    }
    builder.add_transaction( tid, items )
}

/// Canonical text form of a sealed database: transactions ascending by tid,
/// items ascending by id, probabilities in their shortest round-tripping
/// notation. Parsing the output reproduces the same tidsets.
pub fn format_database( database: &UncertainDatabase ) -> String {
    let mut transactions: BTreeMap<Tid, Vec<(Item, f64)>> = BTreeMap::new();
    for (item, tidset) in database.item_tidsets() {
	for entry in tidset.iter() {
	    transactions.entry( entry.tid ).or_default().push( (item, entry.prob) );
	}
    }

    let vocab = database.vocabulary();
    let mut output = String::new();
    for (tid, mut items) in transactions {
	items.sort_by_key( |&(item, _)| item );
	output.push_str( &tid.to_string() );
	for (item, prob) in items {
	    output.push( ' ' );
	    output.push_str( vocab.name( item ));
	    output.push( ':' );
	    output.push_str( &prob.to_string() );
	}
	output.push( '\n' );
    }
    output
}

/// Renders an itemset with its item names, ascending by id
pub fn format_itemset( itemset: &Itemset, vocab: &Vocabulary ) -> String {
    let mut output = String::from( "{" );
    for (position, item) in itemset.iter().enumerate() {
	if position > 0 {
	    output.push_str( ", " );
	}
	output.push_str( vocab.name( item ));
    }
    output.push( '}' );
    output
}

/// Serializable view of a mined pattern with resolved item names
#[derive( Debug, Serialize )]
pub struct PatternRecord {
    pub items: Vec<String>,
    pub support: usize,
    pub probability: f64,
}

pub fn pattern_records( database: &UncertainDatabase, patterns: &[Pattern] ) -> Vec<PatternRecord> {
    let vocab = database.vocabulary();
    patterns.iter()
	.map( |pattern| PatternRecord {
	    items: pattern.itemset.iter().map( |item| vocab.name( item ).to_string() ).collect(),
	    support: pattern.support,
	    probability: pattern.probability,
	})
	.collect()
}

/// Writes the mined patterns to a file as JSON
pub fn write_patterns( database: &UncertainDatabase, patterns: &[Pattern], path: &str ) -> Result<(), MineError> {
    let records = pattern_records( database, patterns );
    let contents = serde_json::to_string_pretty( &records ).map_err( |err| MineError::io( err ))?;
    fs::write( Path::new( path ), contents ).map_err( |err| MineError::io( err ))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::MineErrorKind;

    #[test]
    fn test_parse_basic_file() {
	let text = "1 Bread:0.9 Milk:0.7\n2 Bread:0.6 Cheese:0.8\n3 Milk:0.9 Cheese:0.7\n";
	let database = parse_database( text ).unwrap();
	assert_eq!( database.size(), 3 );
	assert_eq!( database.vocabulary().len(), 3 );

	let bread = database.vocabulary().get( "Bread" ).unwrap();
	let tidset = database.tidset_for_item( bread );
	let entries: Vec<(usize, f64)> = tidset.iter().map( |e| (e.tid, e.prob) ).collect();
	assert_eq!( entries, vec!( (1, 0.9), (2, 0.6) ));
    }

    #[test]
    fn test_header_line_is_skipped() {
	let text = "3 2\n1 A:0.5\n2 B:0.5\n";
	let database = parse_database( text ).unwrap();
	assert_eq!( database.size(), 2 );
	assert_eq!( database.vocabulary().len(), 2 );
    }

    #[test]
    fn test_unparseable_lines_are_skipped() {
	let text = "garbage line\n1 A:0.5\n\n   \nnot-a-tid B:0.5\n2 A:notaprob\n3 A:0.25\n";
	let database = parse_database( text ).unwrap();
	// only tids 1 and 3 carry parseable items
	assert_eq!( database.size(), 2 );
	let a = database.vocabulary().get( "A" ).unwrap();
	assert_eq!( database.tidset_for_item( a ).len(), 2 );
    }

    #[test]
    fn test_out_of_range_probability_aborts() {
	let error = parse_database( "1 A:1.5\n" ).unwrap_err();
	assert_eq!( error.kind(), MineErrorKind::InvalidProbability );
    }

    #[test]
    fn test_round_trip_reproduces_tidsets() {
	let text = "1 Bread:0.9 Milk:0.7 Butter:0.5\n2 Bread:0.6 Cheese:0.8\n3 Milk:0.9 Cheese:0.7\n5 Butter:0.125\n";
	let original = parse_database( text ).unwrap();
	let formatted = format_database( &original );
	let restored = parse_database( &formatted ).unwrap();

	assert_eq!( original.size(), restored.size() );
	assert_eq!( original.vocabulary().len(), restored.vocabulary().len() );
	for (item, tidset) in original.item_tidsets() {
	    let name = original.vocabulary().name( item );
	    let restored_item = restored.vocabulary().get( name ).unwrap();
	    assert_eq!( tidset, restored.tidset_for_item( restored_item ),
			"tidset of {name} changed in the round trip" );
	}
    }

    #[test]
    fn test_format_itemset_uses_names() {
	let mut builder = DatabaseBuilder::new();
	let a = builder.intern( "Bread" );
	let b = builder.intern( "Milk" );
	builder.add_transaction( 0, [(a, 0.5), (b, 0.5)] ).unwrap();
	let database = builder.build().unwrap();

	let itemset: Itemset = [a, b].into_iter().collect();
	assert_eq!( format_itemset( &itemset, database.vocabulary() ), "{Bread, Milk}" );
	assert_eq!( format_itemset( &Itemset::new(), database.vocabulary() ), "{}" );
    }

    #[test]
    fn test_pattern_records_resolve_names() {
	let mut builder = DatabaseBuilder::new();
	let a = builder.intern( "Bread" );
	builder.add_transaction( 0, [(a, 0.9)] ).unwrap();
	let database = builder.build().unwrap();

	let patterns = vec!( Pattern::new( Itemset::singleton( a ), 1, 0.9 ));
	let records = pattern_records( &database, &patterns );
	assert_eq!( records.len(), 1 );
	assert_eq!( records[0].items, vec!( "Bread".to_string() ));
	assert_eq!( records[0].support, 1 );
    }
}
