
use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::MineError;
use crate::model::{Itemset, TidProb, Tidset};
use crate::{Item, Tid};

/// Bidirectional mapping between item names and dense integer ids.
/// Grows monotonically while the data is loaded, read-only afterwards.
#[derive( Debug, Clone, Default )]
pub struct Vocabulary {
    index: HashMap<String, Item>,
    names: Vec<String>,
}

impl Vocabulary {
    pub fn new() -> Vocabulary {
	Vocabulary { index: HashMap::new(), names: Vec::new() }
    }

    /// Returns the id of the item, assigning the next free id on first sight
    pub fn intern( &mut self, name: &str ) -> Item {
	if let Some( &item ) = self.index.get( name ) {
	    return item;
	}
	let item = self.names.len();
	self.index.insert( name.to_string(), item );
	self.names.push( name.to_string() );
	item
    }

    /// Name of an assigned item id.
    /// Pre: the id was assigned by this vocabulary.
    pub fn name( &self, item: Item ) -> &str {
	self.names[ item ].as_str()
    }

    pub fn get( &self, name: &str ) -> Option<Item> {
	self.index.get( name ).copied()
    }

    pub fn len( &self ) -> usize {
	self.names.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.names.is_empty()
    }
}

/// Mutable collect stage of the uncertain database.
/// Transactions accumulate in horizontal form; `build` seals them into the
/// vertical store. Consuming the builder makes mutation after sealing and
/// lookups before sealing unrepresentable.
#[derive( Debug, Default )]
pub struct DatabaseBuilder {
    vocab: Vocabulary,
    transactions: BTreeMap<Tid, HashMap<Item, f64>>,
}

impl DatabaseBuilder {
    pub fn new() -> DatabaseBuilder {
	DatabaseBuilder { vocab: Vocabulary::new(), transactions: BTreeMap::new() }
    }

    pub fn intern( &mut self, name: &str ) -> Item {
	self.vocab.intern( name )
    }

    pub fn vocabulary( &self ) -> &Vocabulary {
	&self.vocab
    }

    /// Records the items of one transaction with their existence
    /// probabilities. A repeated item within the same transaction keeps the
    /// last probability; a repeated tid extends the earlier transaction.
    /// Pre: item ids were assigned by this builder's vocabulary.
    pub fn add_transaction<I>( &mut self, tid: Tid, items: I ) -> Result<(), MineError> where
	I: IntoIterator<Item = (Item, f64)>,
    {
	let transaction = self.transactions.entry( tid ).or_default();
	for (item, prob) in items {
	    if !prob.is_finite() || !(0.0 ..= 1.0).contains( &prob ) {
		return Err( MineError::invalid_probability( prob ));
	    }
	    transaction.insert( item, prob );
	}
	Ok( () )
    }

    /// Seals the database: turns the horizontal transactions into one sorted
    /// tidset per item. The builder is consumed, so no further adds are
    /// possible.
    pub fn build( self ) -> Result<UncertainDatabase, MineError> {
	let size = self.transactions.len();
	let mut buckets: Vec<Vec<TidProb>> = vec![Vec::new(); self.vocab.len()];
	for (tid, transaction) in &self.transactions {
	    for (&item, &prob) in transaction {
		buckets[ item ].push( TidProb { tid: *tid, prob } );
	    }
	}

	let mut items = Vec::with_capacity( buckets.len() );
	for bucket in buckets {
	    items.push( Tidset::from_entries( bucket )? );
	}
	debug!( transactions = size, items = items.len(), "sealed vertical store" );

	Ok( UncertainDatabase { vocab: self.vocab, items, size, empty: Tidset::new() } )
    }
}

/// Sealed uncertain database in vertical form: one tidset per item.
/// Shared read-only once mining starts.
#[derive( Debug )]
pub struct UncertainDatabase {
    vocab: Vocabulary,
    items: Vec<Tidset>,
    size: usize,
    empty: Tidset,
}

impl UncertainDatabase {
    /// Number of transactions in the database
    pub fn size( &self ) -> usize {
	self.size
    }

    pub fn vocabulary( &self ) -> &Vocabulary {
	&self.vocab
    }

    /// Tidset of a single item; empty for items without occurrences
    pub fn tidset_for_item( &self, item: Item ) -> &Tidset {
	self.items.get( item ).unwrap_or( &self.empty )
    }

    /// Tidset of an itemset, via merge-join intersection of the member
    /// tidsets. Items are processed smallest tidset first, which keeps the
    /// intermediate results small, and the fold stops early once empty.
    pub fn tidset_for( &self, itemset: &Itemset ) -> Tidset {
	let mut members: Vec<Item> = itemset.iter().collect();
	match members.len() {
	    0 => Tidset::new(),
	    1 => self.tidset_for_item( members[0] ).clone(),
	    _ => {
		members.sort_by_key( |&item| self.tidset_for_item( item ).len() );
		let mut result = self.tidset_for_item( members[0] ).clone();
		for &item in &members[1 ..] {
		    result = result.intersect( self.tidset_for_item( item ));
		    if result.is_empty() {
			break;
		    }
		}
		result
	    }
	}
    }

    /// Iterates all item ids with their tidsets
    pub fn item_tidsets( &self ) -> impl Iterator<Item = (Item, &Tidset)> {
	self.items.iter().enumerate()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn pair_database() -> UncertainDatabase {
	// transactions: 1 A:0.8 B:0.6 | 2 A:0.5 | 3 B:0.4
	let mut builder = DatabaseBuilder::new();
	let a = builder.intern( "A" );
	let b = builder.intern( "B" );
	builder.add_transaction( 1, [(a, 0.8), (b, 0.6)] ).unwrap();
	builder.add_transaction( 2, [(a, 0.5)] ).unwrap();
	builder.add_transaction( 3, [(b, 0.4)] ).unwrap();
	builder.build().unwrap()
    }

    #[test]
    fn test_vocabulary_interning_is_stable() {
	let mut vocab = Vocabulary::new();
	assert_eq!( vocab.intern( "bread" ), 0 );
	assert_eq!( vocab.intern( "milk" ), 1 );
	assert_eq!( vocab.intern( "bread" ), 0 );
	assert_eq!( vocab.name( 1 ), "milk" );
	assert_eq!( vocab.get( "cheese" ), None );
	assert_eq!( vocab.len(), 2 );
    }

    #[test]
    fn test_build_produces_sorted_tidsets() {
	let database = pair_database();
	assert_eq!( database.size(), 3 );

	let a = database.tidset_for_item( 0 );
	let entries: Vec<(usize, f64)> = a.iter().map( |e| (e.tid, e.prob) ).collect();
	assert_eq!( entries, vec!( (1, 0.8), (2, 0.5) ));

	let b = database.tidset_for_item( 1 );
	let entries: Vec<(usize, f64)> = b.iter().map( |e| (e.tid, e.prob) ).collect();
	assert_eq!( entries, vec!( (1, 0.6), (3, 0.4) ));
    }

    #[test]
    fn test_tidset_for_itemset_intersects() {
	let database = pair_database();
	let both: Itemset = [0, 1].into_iter().collect();
	let tidset = database.tidset_for( &both );
	assert_eq!( tidset.len(), 1 );
	let entry = tidset.iter().next().unwrap();
	assert_eq!( entry.tid, 1 );
	assert!( (entry.prob - 0.48).abs() < 1e-12 );
    }

    #[test]
    fn test_tidset_for_edge_cases() {
	let database = pair_database();
	assert!( database.tidset_for( &Itemset::new() ).is_empty() );
	// unknown item id resolves to the empty tidset
	assert!( database.tidset_for_item( 17 ).is_empty() );
	let with_unknown: Itemset = [0, 17].into_iter().collect();
	assert!( database.tidset_for( &with_unknown ).is_empty() );
    }

    #[test]
    fn test_invalid_probability_aborts_ingest() {
	let mut builder = DatabaseBuilder::new();
	let a = builder.intern( "A" );
	let error = builder.add_transaction( 0, [(a, 1.5)] ).unwrap_err();
	assert_eq!( error.kind(), crate::MineErrorKind::InvalidProbability );
    }

    #[test]
    fn test_repeated_tid_extends_transaction() {
	let mut builder = DatabaseBuilder::new();
	let a = builder.intern( "A" );
	let b = builder.intern( "B" );
	builder.add_transaction( 0, [(a, 0.5)] ).unwrap();
	builder.add_transaction( 0, [(b, 0.7)] ).unwrap();
	let database = builder.build().unwrap();
	assert_eq!( database.size(), 1 );
	assert_eq!( database.tidset_for_item( a ).len(), 1 );
	assert_eq!( database.tidset_for_item( b ).len(), 1 );
    }
}
