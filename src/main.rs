//! # lsimpute: Li-Stephens Genotype Imputation
//!
//! ## Usage
//! ```bash
//! # Impute every haplotype of data/03 against the panel in data/02
//! lsimpute -g 0.1 -t 1.0 data/02 data/03 --out calls.tsv
//!
//! # One haplotype, scalar engine, with profiling output
//! lsimpute -s -g 0.1 -t 1.0 data/02 data/03 --id 03_03_1 --profile
//! ```

use std::time::Instant;

use lsimpute::config::Config;
use lsimpute::pipelines::ImputationPipeline;
use lsimpute::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber. `RUST_LOG` overrides the default `info`
/// filter; profiling adds span close events with timings.
fn init_tracing(profile: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let span_events = if profile { FmtSpan::CLOSE } else { FmtSpan::NONE };

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(span_events)
                .with_target(false)
                .with_timer(fmt::time::uptime()),
        )
        .init();
}

fn run() -> Result<()> {
    let start = Instant::now();

    // Parse and validate configuration
    let config = Config::parse_and_validate()?;
    init_tracing(config.profile);
    if config.profile {
        eprintln!("=== Profiling enabled ===\n");
    }

    eprintln!("lsimpute v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("Threads: {}", config.nthreads());
    eprintln!("Engine: {:?}", config.engine());
    eprintln!("Reference: {:?}", config.ref_prefix);
    eprintln!("Sample: {:?}", config.sample_prefix);

    let mut pipeline = ImputationPipeline::new(config)?;
    pipeline.run()?;

    let elapsed = start.elapsed();
    eprintln!("\nCompleted in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}

#[cfg(test)]
mod tests {
    use lsimpute::{config, data, error, io, model, pipelines, utils};

    #[test]
    fn test_module_imports() {
        // Verify all modules are accessible
        let _ = config::Config::parse_and_validate;
        let _ = error::LsError::config("test");
        let _ = data::marker::SnpIdx::new;
        let _ = io::plink::read_genome;
        let _ = model::parameters::ModelParams::new;
        let _ = pipelines::ImputationPipeline::new;
        let _ = utils::build_thread_pool;
    }
}
