
mod heap;

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Mutex;
use std::time::Instant;

use rayon::prelude::*;
use tracing::{debug, info};

pub use heap::TopKHeap;

use crate::database::UncertainDatabase;
use crate::error::MineError;
use crate::model::{Itemset, Pattern, Tidset};
use crate::observe::MiningObserver;
use crate::support::{check_tau, CalculatorKind, SupportCalculator};
use crate::Item;

/// Parameters of one mining run
#[derive( Debug, Clone )]
pub struct MiningConfig {
    /// Hard floor on accepted support, at least 1
    pub minsup: usize,
    /// Probability threshold in (0, 1]
    pub tau: f64,
    /// Number of patterns to return, at least 1
    pub k: usize,
    /// Support implementation to use
    pub calculator: CalculatorKind,
}

impl Default for MiningConfig {
    fn default() -> MiningConfig {
	MiningConfig { minsup: 2, tau: 0.7, k: 5, calculator: CalculatorKind::PolyDp }
    }
}

impl MiningConfig {
    pub fn new( minsup: usize, tau: f64, k: usize ) -> Result<MiningConfig, MineError> {
	let config = MiningConfig { minsup, tau, k, ..MiningConfig::default() };
	config.validate()?;
	Ok( config )
    }

    pub fn with_calculator( mut self, calculator: CalculatorKind ) -> MiningConfig {
	self.calculator = calculator;
	self
    }

    pub fn validate( &self ) -> Result<(), MineError> {
	if self.minsup < 1 {
	    return Err( MineError::invalid_config( "minsup must be at least 1" ));
	}
	check_tau( self.tau )?;
	if self.k < 1 {
	    return Err( MineError::invalid_config( "k must be at least 1" ));
	}
	Ok( () )
    }
}

/// Queued itemset awaiting processing. Ordered for the max-heap candidate
/// queue: higher support first, then higher probability, then fewer items.
struct Candidate {
    itemset: Itemset,
    support: usize,
    probability: f64,
}

impl PartialEq for Candidate {
    fn eq( &self, other: &Candidate ) -> bool {
	self.cmp( other ) == Ordering::Equal
    }
}

impl Eq for Candidate {}

impl PartialOrd for Candidate {
    fn partial_cmp( &self, other: &Candidate ) -> Option<Ordering> {
	Some( self.cmp( other ))
    }
}

impl Ord for Candidate {
    fn cmp( &self, other: &Candidate ) -> Ordering {
	self.support.cmp( &other.support )
	    .then( self.probability.total_cmp( &other.probability ))
	    .then( other.itemset.len().cmp( &self.itemset.len() ))
    }
}

/// Memoized result for one itemset, created on first computation
struct CacheEntry {
    support: usize,
    probability: f64,
    tidset: Tidset,
}

/// Per-run mutable state of the enumeration
struct MineState {
    cache: HashMap<Itemset, CacheEntry>,
    heap: TopKHeap,
    queue: BinaryHeap<Candidate>,
    /// item ids that passed the 1-itemset frequency test, support descending
    frequent_items: Vec<Item>,
    /// shared singleton itemset per vocabulary id
    singletons: Vec<Itemset>,
}

/// Top-k closed frequent itemset miner over a sealed uncertain database.
///
/// Mining runs in three phases: a data-parallel scan for frequent
/// 1-itemsets, structure setup, and a best-first closure-aware enumeration
/// driven by a candidate priority queue. Only closed patterns enter the
/// bounded result heap, whose minimum provides the dynamic pruning
/// threshold.
pub struct TopKMiner<'a> {
    database: &'a UncertainDatabase,
    config: MiningConfig,
    calculator: Box<dyn SupportCalculator>,
    observers: Mutex<Vec<Box<dyn MiningObserver + Send>>>,
}

impl <'a> TopKMiner<'a> {
    pub fn new( database: &'a UncertainDatabase, config: MiningConfig ) -> Result<TopKMiner<'a>, MineError> {
	config.validate()?;
	let calculator = config.calculator.build( config.tau )?;
	Ok( TopKMiner { database, config, calculator, observers: Mutex::new( Vec::new() ) } )
    }

    pub fn add_observer( &mut self, observer: Box<dyn MiningObserver + Send> ) {
	self.observers.lock().expect( "observer list lock" ).push( observer );
    }

    /// Runs the full mining pipeline and returns the top-k closed patterns
    /// sorted by support desc, probability desc, then lexicographic itemset
    /// order for reproducibility.
    pub fn mine( &self ) -> Vec<Pattern> {
	info!( minsup = self.config.minsup, tau = self.config.tau, k = self.config.k,
	       calculator = self.calculator.name(), "start mining" );

	let timer = Instant::now();
	self.notify( |observer| observer.on_phase_start( 1, "frequent 1-itemsets" ));
	let singles = self.scan_frequent_items();
	self.notify( |observer| observer.on_phase_complete( 1, timer.elapsed().as_millis() ));

	let timer = Instant::now();
	self.notify( |observer| observer.on_phase_start( 2, "initialize structures" ));
	let mut state = self.initialize( singles );
	self.notify( |observer| observer.on_phase_complete( 2, timer.elapsed().as_millis() ));

	let timer = Instant::now();
	self.notify( |observer| observer.on_phase_start( 3, "closure-aware enumeration" ));
	self.enumerate( &mut state );
	self.notify( |observer| observer.on_phase_complete( 3, timer.elapsed().as_millis() ));

	let results = self.collect_results( &state );
	info!( patterns = results.len(), cached = state.cache.len(), "mining finished" );
	results
    }

    /// Phase 1: support of every single item, computed data parallel over
    /// the vocabulary. Items below minsup or without occurrences are
    /// dropped; the survivors are sorted by support desc, probability desc.
    fn scan_frequent_items( &self ) -> Vec<(Item, usize, f64, Tidset)> {
	let vocab_size = self.database.vocabulary().len();
	let mut singles: Vec<(Item, usize, f64, Tidset)> = (0 .. vocab_size)
	    .into_par_iter()
	    .filter_map( |item| {
		let tidset = self.database.tidset_for_item( item );
		if tidset.is_empty() {
		    return None;
		}
		let (support, probability) = self.calculator
		    .support_and_probability_sparse( tidset, self.database.size() );
		if support < self.config.minsup {
		    return None;
		}
		Some( (item, support, probability, tidset.clone()) )
	    })
	    .collect();

	// the parallel scan finishes in arbitrary order, sorting restores determinism
	singles.sort_unstable_by( |left, right| {
	    right.1.cmp( &left.1 )
		.then( right.2.total_cmp( &left.2 ))
		.then( left.0.cmp( &right.0 ))
	});
	debug!( frequent = singles.len(), vocabulary = vocab_size, "phase 1 done" );
	singles
    }

    /// Phase 2: allocate heap and queue, replay the scan results into the
    /// cache so every frequent singleton has its tidset, and seed the queue
    /// with the frequent 1-itemsets.
    fn initialize( &self, singles: Vec<(Item, usize, f64, Tidset)> ) -> MineState {
	let vocab_size = self.database.vocabulary().len();
	let mut state = MineState {
	    cache: HashMap::with_capacity( singles.len() * 2 ),
	    heap: TopKHeap::new( self.config.k ),
	    queue: BinaryHeap::with_capacity( singles.len() ),
	    frequent_items: Vec::with_capacity( singles.len() ),
	    singletons: (0 .. vocab_size).map( Itemset::singleton ).collect(),
	};

	for (item, support, probability, tidset) in singles {
	    let singleton = state.singletons[ item ].clone();
	    state.cache.insert( singleton.clone(), CacheEntry { support, probability, tidset } );
	    state.frequent_items.push( item );
	    state.queue.push( Candidate { itemset: singleton, support, probability } );
	}
	state
    }

    /// Phase 3: best-first processing of the candidate queue. The queue is
    /// a max-heap by support and the threshold never decreases, so the loop
    /// stops as soon as a popped candidate falls below it.
    fn enumerate( &self, state: &mut MineState ) {
	while let Some( candidate ) = state.queue.pop() {
	    if state.heap.is_full() && candidate.support < self.threshold( state ) {
		debug!( support = candidate.support, threshold = self.threshold( state ),
			"remaining candidates below dynamic threshold" );
		self.notify( |observer| observer.on_candidate_pruned( "below dynamic threshold" ));
		break;
	    }

	    let (is_closed, extensions) = self.check_closure_and_extend( state, &candidate );

	    if is_closed && state.heap.insert( candidate.itemset.clone(), candidate.support, candidate.probability ) {
		let pattern = Pattern::new( candidate.itemset, candidate.support, candidate.probability );
		self.notify( |observer| observer.on_pattern_found( &pattern ));
	    }

	    let threshold = self.threshold( state );
	    for extension in extensions {
		if extension.support >= threshold || !state.heap.is_full() {
		    state.queue.push( extension );
		}
	    }
	}
    }

    /// Checks whether the candidate is closed and gathers its canonical
    /// extensions in one pass over the frequent items.
    ///
    /// Closure only needs checking against items whose support reaches the
    /// candidate's; once the support-descending iteration drops below that,
    /// antimonotonicity rules out further violations. Extensions are only
    /// formed for items beyond the candidate's maximum id, so every itemset
    /// is reachable through exactly one parent. Upper bounds from cached
    /// subsets and the tidset length avoid support computations that cannot
    /// matter.
    fn check_closure_and_extend( &self, state: &mut MineState, candidate: &Candidate ) -> (bool, Vec<Candidate>) {
	let sup_x = candidate.support;
	let threshold = self.threshold( state );
	let heap_full = state.heap.is_full();
	let max_in_x = candidate.itemset.max_item();

	let mut is_closed = true;
	let mut closure_done = false;
	let mut extensions = Vec::new();

	for index in 0 .. state.frequent_items.len() {
	    let item = state.frequent_items[ index ];
	    if candidate.itemset.contains( item ) {
		continue;
	    }

	    let item_support = self.singleton_support( state, item );
	    if !closure_done && item_support < sup_x {
		// every later item has even lower support
		closure_done = true;
	    }
	    let mut need_closure = !closure_done && is_closed;
	    let need_extension = max_in_x.map_or( true, |max_item| item > max_item );

	    let mut upper_bound = sup_x.min( item_support );
	    if heap_full && need_extension && candidate.itemset.len() >= 3 {
		// tighten with cached 2-subset supports
		for member in candidate.itemset.iter() {
		    let mut pair = Itemset::singleton( member );
		    pair.insert( item );
		    if let Some( entry ) = state.cache.get( &pair ) {
			upper_bound = upper_bound.min( entry.support );
			if upper_bound < threshold {
			    break;
			}
		    }
		}
	    }

	    let can_enter = upper_bound >= threshold || !heap_full;
	    if !need_closure && !(need_extension && can_enter) {
		self.notify( |observer| observer.on_candidate_pruned( "upper bound" ));
		continue;
	    }

	    let extended = candidate.itemset.union( &state.singletons[ item ] );
	    let known = state.cache.get( &extended ).map( |entry| (entry.support, entry.probability) );
	    let (sup_ext, prob_ext) = match known {
		Some( known ) => known,
		None => {
		    let tidset = match (state.cache.get( &candidate.itemset ), state.cache.get( &state.singletons[ item ] )) {
			(Some( left ), Some( right )) => left.tidset.intersect( &right.tidset ),
			_ => self.database.tidset_for( &extended ),
		    };

		    // the tidset length bounds the support from above
		    if heap_full && tidset.len() < threshold && !need_closure {
			state.cache.insert( extended, CacheEntry { support: 0, probability: 0.0, tidset } );
			self.notify( |observer| observer.on_candidate_pruned( "tidset size" ));
			continue;
		    }
		    if need_closure && tidset.len() < sup_x {
			// cannot violate closure any more
			if !need_extension {
			    state.cache.insert( extended, CacheEntry { support: 0, probability: 0.0, tidset } );
			    self.notify( |observer| observer.on_candidate_pruned( "tidset size" ));
			    continue;
			}
			need_closure = false;
		    }

		    let (support, probability) = self.calculator
			.support_and_probability_sparse( &tidset, self.database.size() );
		    state.cache.insert( extended.clone(), CacheEntry { support, probability, tidset } );
		    (support, probability)
		},
	    };

	    if need_closure && sup_ext == sup_x {
		is_closed = false;
	    }
	    if need_extension && sup_ext >= self.config.minsup {
		extensions.push( Candidate { itemset: extended, support: sup_ext, probability: prob_ext } );
	    }
	}

	(is_closed, extensions)
    }

    /// Support of a single frequent item from the cache. A missing entry is
    /// recomputed from the sealed store once and re-cached.
    fn singleton_support( &self, state: &mut MineState, item: Item ) -> usize {
	if let Some( entry ) = state.cache.get( &state.singletons[ item ] ) {
	    return entry.support;
	}
	let tidset = self.database.tidset_for_item( item ).clone();
	let (support, probability) = self.calculator
	    .support_and_probability_sparse( &tidset, self.database.size() );
	state.cache.insert( state.singletons[ item ].clone(), CacheEntry { support, probability, tidset } );
	support
    }

    /// Dynamic pruning threshold: minsup until the heap fills, then the
    /// weakest accepted support if that is higher
    fn threshold( &self, state: &MineState ) -> usize {
	self.config.minsup.max( state.heap.min_support() )
    }

    fn collect_results( &self, state: &MineState ) -> Vec<Pattern> {
	let mut results = state.heap.snapshot();
	results.sort_by( |left, right| {
	    right.support.cmp( &left.support )
		.then( right.probability.total_cmp( &left.probability ))
		.then_with( || left.itemset.iter().cmp( right.itemset.iter() ))
	});
	results
    }

    /// Runs an action over all registered observers under the list lock.
    /// A panicking handler is swallowed so it cannot affect the run.
    fn notify<F>( &self, mut action: F ) where
	F: FnMut( &mut dyn MiningObserver ),
    {
	let mut observers = self.observers.lock().expect( "observer list lock" );
	for observer in observers.iter_mut() {
	    let _ = catch_unwind( AssertUnwindSafe( || action( observer.as_mut() )));
	}
    }
}
