
use std::hash::{Hash, Hasher};

use bit_set::BitSet;

use crate::Item;

/// Set of item identifiers backed by a dense bitset.
/// Equality and hashing follow set semantics regardless of the capacity
/// of the underlying bit vector.
#[derive( Debug, Clone, Default )]
pub struct Itemset {
    items: BitSet,
}

impl Itemset {
    pub fn new() -> Itemset {
	Itemset { items: BitSet::new() }
    }

    pub fn singleton( item: Item ) -> Itemset {
	let mut itemset = Itemset::new();
	itemset.insert( item );
	itemset
    }

    pub fn insert( &mut self, item: Item ) {
	self.items.insert( item );
    }

    pub fn contains( &self, item: Item ) -> bool {
	self.items.contains( item )
    }

    pub fn len( &self ) -> usize {
	self.items.len()
    }

    pub fn is_empty( &self ) -> bool {
	self.items.is_empty()
    }

    /// Iterates the contained items in ascending id order
    pub fn iter( &self ) -> impl Iterator<Item = Item> + '_ {
	self.items.iter()
    }

    /// Returns the largest contained item id, if any
    pub fn max_item( &self ) -> Option<Item> {
	self.items.iter().last()
    }

    /// Returns a new itemset holding the items of both inputs
    pub fn union( &self, other: &Itemset ) -> Itemset {
	let mut items = self.items.clone();
	items.union_with( &other.items );
	Itemset { items }
    }
}

impl PartialEq for Itemset {
    fn eq( &self, other: &Itemset ) -> bool {
	self.items.iter().eq( other.items.iter() )
    }
}

impl Eq for Itemset {}

impl Hash for Itemset {
    fn hash<H: Hasher>( &self, state: &mut H ) {
	for item in self.items.iter() {
	    item.hash( state );
	}
    }
}

impl FromIterator<Item> for Itemset {
    fn from_iter<I: IntoIterator<Item = Item>>( items: I ) -> Itemset {
	let mut itemset = Itemset::new();
	for item in items {
	    itemset.insert( item );
	}
	itemset
    }
}
