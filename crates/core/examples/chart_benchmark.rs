//! Lightweight chart/forest benchmark on `a^n b^n c^n` for local baselines.
//!
//! Run from repository root:
//! `cargo run -p ctxforest_core --example chart_benchmark --release [-- N...]`

use std::path::PathBuf;
use std::time::Instant;

use ctxforest_core::{ForestConfig, Grammar, emit_dot, load_grammar, parse_text, read_source};

fn load_sample() -> Result<Grammar, String> {
    let mut candidates: Vec<PathBuf> = vec![
        PathBuf::from("samples/anbncn.cfg"),
        PathBuf::from("../../samples/anbncn.cfg"),
    ];
    if let Ok(from_env) = std::env::var("CTXFOREST_BENCH_GRAMMAR") {
        candidates.insert(0, PathBuf::from(from_env));
    }
    for path in candidates {
        if !path.exists() {
            continue;
        }
        let src = read_source(&path).map_err(|e| e.to_string())?;
        let (grammar, _) =
            load_grammar(&src).map_err(|e| format!("'{}': {e}", path.display()))?;
        return Ok(grammar);
    }
    Err("unable to locate samples/anbncn.cfg; set CTXFOREST_BENCH_GRAMMAR".to_string())
}

fn run_benchmark(grammar: &Grammar, n: usize, iterations: usize) -> Result<(), String> {
    let input = format!("{}{}{}", "a".repeat(n), "b".repeat(n), "c".repeat(n));

    let parse_start = Instant::now();
    for _ in 0..iterations {
        parse_text(grammar, &input).map_err(|e| e.to_string())?;
    }
    let parse_elapsed = parse_start.elapsed();

    let table = parse_text(grammar, &input).map_err(|e| e.to_string())?;
    let config = ForestConfig::default();
    let emit_start = Instant::now();
    let mut bytes = 0;
    for _ in 0..iterations {
        bytes = emit_dot(&table, &config).len();
    }
    let emit_elapsed = emit_start.elapsed();

    println!("Benchmark: a^{n} b^{n} c^{n}");
    println!("  input_len: {}, entries: {}, dot_bytes: {bytes}", input.len(), table.len());
    println!(
        "  parse: total={:?}, per_iter={:.3} ms",
        parse_elapsed,
        parse_elapsed.as_secs_f64() * 1000.0 / iterations as f64
    );
    println!(
        "  emit:  total={:?}, per_iter={:.3} ms",
        emit_elapsed,
        emit_elapsed.as_secs_f64() * 1000.0 / iterations as f64
    );
    Ok(())
}

fn main() -> Result<(), String> {
    let grammar = load_sample()?;
    let sizes: Vec<usize> = std::env::args()
        .skip(1)
        .map(|a| a.parse().map_err(|e| format!("bad size {a:?}: {e}")))
        .collect::<Result<_, _>>()?;
    let sizes = if sizes.is_empty() { vec![4, 16, 48] } else { sizes };
    for n in sizes {
        run_benchmark(&grammar, n, 10)?;
    }
    Ok(())
}
