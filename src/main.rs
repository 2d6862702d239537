use clap::{self, Parser};

use probmine::{io, miner, CalculatorKind, MiningConfig};

#[derive(Parser)]
struct Arguments {
    /// uncertain transaction database to mine
    #[arg()]
    data_path: String,
    /// minimum support, hard floor on accepted patterns
    #[arg( long, default_value_t = 2 )]
    minsup: usize,
    /// probability threshold in (0, 1]
    #[arg( long, default_value_t = 0.7 )]
    tau: f64,
    /// number of patterns to mine
    #[arg( long, default_value_t = 5 )]
    k: usize,
    /// support implementation: poly-dp, fft-dc or naive-dc
    #[arg( long, default_value = "poly-dp" )]
    calculator: String,
    /// Run with debug logging
    #[arg( long, default_value_t = false )]
    debug: bool,
    /// optional path to write the mined patterns to as JSON
    #[arg()]
    out_path: Option<String>,
}

fn setup_logging( args: &Arguments ) -> Result<(), String> {
    let tracer = tracing_subscriber::fmt::fmt();
    let tracer = if args.debug {
	tracer.with_max_level( tracing_subscriber::filter::LevelFilter::DEBUG )
    } else {
	tracer.with_max_level( tracing_subscriber::filter::LevelFilter::INFO )
    };
    let tracer = tracer.finish();
    tracing::subscriber::set_global_default( tracer ).map_err( |err| err.to_string() )
}

fn build_config( args: &Arguments ) -> Result<MiningConfig, String> {
    let calculator: CalculatorKind = args.calculator.parse().map_err( |err: probmine::MineError| err.to_string() )?;
    let config = MiningConfig::new( args.minsup, args.tau, args.k ).map_err( |err| err.to_string() )?;
    Ok( config.with_calculator( calculator ))
}

fn main() -> Result<(), String> {
    let args = Arguments::parse();
    setup_logging( &args )?;

    let config = build_config( &args )?;
    let database = io::read_database( &args.data_path ).map_err( |err| err.to_string() )?;

    let miner = miner::TopKMiner::new( &database, config ).map_err( |err| err.to_string() )?;
    let patterns = miner.mine();

    for pattern in &patterns {
	println!( "{}  support={} probability={:.4}",
		  io::format_itemset( &pattern.itemset, database.vocabulary() ),
		  pattern.support, pattern.probability );
    }

    if let Some( path ) = &args.out_path {
	io::write_patterns( &database, &patterns, path.as_str() ).map_err( |err| err.to_string() )?;
    }
    Result::Ok( () )
}
