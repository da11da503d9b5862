//! Saturation harness for arbiter-core benchmarking.
//!
//! Measures tick throughput using production arbitration patterns.
//!
//! ## Usage
//!
//! ```sh
//! cargo run -p arbiter-core --example saturation_harness
//! ```
//!
//! ## Metrics
//!
//! - Ticks per second
//! - Grants per second
//! - Switch-equivalents at 1 MHz (how many switch instances could be driven
//!   at a 1 MHz tick rate based on measured throughput)
//!
//! ## Production Context
//!
//! The production target is 256 modelled switch instances at a 1 MHz tick
//! rate, so the aggregate requirement is 256,000,000 ticks/second across
//! worker threads. The benchmark runs on multiple threads to reflect real
//! fleet-simulation usage.

#![allow(clippy::pedantic)]

use arbiter_core::{tick_one, ArbiterConfig, ArbiterState, TickInputs, TickOutcome};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

const TARGET_TICK_RATE_HZ: u64 = 1_000_000;
const TARGET_SWITCH_INSTANCES: f64 = 256.0;
const NUM_THREADS: usize = 4;

#[derive(Debug, Clone, Copy)]
struct BenchmarkResult {
    name: &'static str,
    ticks_per_second: f64,
    grants_per_second: f64,
    switch_equivalents_1mhz: f64,
}

/// Every port drives a distinct non-self resource and every grant is acked,
/// so all eight lanes grant and all eight pointers rotate on each tick.
fn saturated_grid_stimulus() -> Vec<TickInputs> {
    let mut inputs = TickInputs::idle();
    for port in 0..8 {
        inputs.request[port] = ((port as u8 + 1) % 8) + 1;
    }
    inputs.ack = [true; 8];
    vec![inputs]
}

/// Seven ports fight over one resource with continuous acknowledgement.
fn single_hotspot_stimulus() -> Vec<TickInputs> {
    let mut inputs = TickInputs::idle();
    inputs.request = [8; 8];
    inputs.ack[7] = true;
    vec![inputs]
}

/// Pseudo-random in-range traffic with sparse acks.
fn mixed_traffic_stimulus() -> Vec<TickInputs> {
    let mut seed: u64 = 0x5EED_CAFE_F00D_1234;
    let mut next = |range: u64| {
        seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
        (seed >> 33) % range
    };

    let mut pattern = Vec::with_capacity(64);
    for _ in 0..64 {
        let mut inputs = TickInputs::idle();
        for lane in &mut inputs.request {
            *lane = next(9) as u8;
        }
        for lane in &mut inputs.ack {
            *lane = next(4) == 0;
        }
        pattern.push(inputs);
    }
    pattern
}

/// All lanes idle, measuring pure pipeline overhead.
fn idle_baseline_stimulus() -> Vec<TickInputs> {
    vec![TickInputs::idle()]
}

fn run_benchmark(
    name: &'static str,
    duration: Duration,
    make_stimulus: fn() -> Vec<TickInputs>,
) -> BenchmarkResult {
    let (tx, rx) = mpsc::channel();

    let handles: Vec<_> = (0..NUM_THREADS)
        .map(|_| {
            let tx = tx.clone();
            thread::spawn(move || {
                let config = ArbiterConfig::default();
                let stimulus = make_stimulus();
                let mut state = ArbiterState::new();

                let mut total_ticks = 0u64;
                let mut total_grants = 0u64;
                let start = Instant::now();

                while start.elapsed() < duration {
                    for inputs in &stimulus {
                        let outcome = tick_one(&mut state, inputs, &config)
                            .expect("benchmark stimulus is in range");
                        total_ticks += 1;
                        if let TickOutcome::Advanced { grants_issued, .. } = outcome {
                            total_grants += u64::from(grants_issued);
                        }
                    }
                }

                tx.send((total_ticks, total_grants)).ok();
            })
        })
        .collect();

    for h in handles {
        h.join().ok();
    }

    drop(tx);

    let mut total_ticks = 0u64;
    let mut total_grants = 0u64;
    for (ticks, grants) in rx {
        total_ticks += ticks;
        total_grants += grants;
    }

    let elapsed_secs = duration.as_secs_f64();
    let ticks_per_second = total_ticks as f64 / elapsed_secs;
    let grants_per_second = total_grants as f64 / elapsed_secs;

    BenchmarkResult {
        name,
        ticks_per_second,
        grants_per_second,
        switch_equivalents_1mhz: ticks_per_second / TARGET_TICK_RATE_HZ as f64,
    }
}

fn format_number(n: f64) -> String {
    if n >= 1_000_000.0 {
        format!("{:.2}M", n / 1_000_000.0)
    } else if n >= 1_000.0 {
        format!("{:.2}K", n / 1_000.0)
    } else {
        format!("{:.2}", n)
    }
}

fn print_results(results: &[BenchmarkResult]) {
    println!("\n╔═══════════════════════════════════════════════════════════════╗");
    println!("║              ARBITER-CORE SATURATION HARNESS                  ║");
    println!("╠═══════════════════════════════════════════════════════════════╣");
    println!("║ Configuration:                                                ║");
    println!(
        "║   Threads:      {:>5}                                         ║",
        NUM_THREADS
    );
    println!(
        "║   Target rate:  {:>9} ticks/sec per instance              ║",
        TARGET_TICK_RATE_HZ
    );
    println!("║   Target fleet: 256 switch instances                          ║");
    println!("╠═══════════════════════════════════════════════════════════════╣");
    println!(
        "║ {:14} │ {:>13} │ {:>13} │ {:>11} ║",
        "Benchmark", "Ticks/sec", "Grants/sec", "Fleet@1MHz"
    );
    println!("╟────────────────┼───────────────┼───────────────┼─────────────╢");

    for result in results {
        println!(
            "║ {:14} │ {:>13} │ {:>13} │ {:>11} ║",
            result.name,
            format_number(result.ticks_per_second),
            format_number(result.grants_per_second),
            format_number(result.switch_equivalents_1mhz)
        );
    }

    println!("╚═══════════════════════════════════════════════════════════════╝");

    println!("\nProduction Requirements:");
    for result in results {
        let status = if result.switch_equivalents_1mhz >= TARGET_SWITCH_INSTANCES {
            "✓ PASS"
        } else if result.switch_equivalents_1mhz >= TARGET_SWITCH_INSTANCES / 2.0 {
            "~ MARGINAL"
        } else {
            "✗ FAIL"
        };
        println!(
            "  {} {}: {} instances (target: 256)",
            status,
            result.name,
            format_number(result.switch_equivalents_1mhz)
        );
    }
}

fn main() {
    let warmup = Duration::from_millis(500);
    let benchmark_duration = Duration::from_secs(3);

    println!("Running warmup for {:?}...", warmup);
    let _ = run_benchmark("warmup", warmup, saturated_grid_stimulus);

    println!("Running benchmarks for {:?} each...\n", benchmark_duration);

    let results = [
        run_benchmark("saturated_grid", benchmark_duration, saturated_grid_stimulus),
        run_benchmark("single_hotspot", benchmark_duration, single_hotspot_stimulus),
        run_benchmark("mixed_traffic", benchmark_duration, mixed_traffic_stimulus),
        run_benchmark("idle_baseline", benchmark_duration, idle_baseline_stimulus),
    ];

    print_results(&results);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturated_grid_benchmark_runs() {
        let result = run_benchmark(
            "saturated_grid",
            Duration::from_millis(100),
            saturated_grid_stimulus,
        );
        assert!(result.ticks_per_second > 0.0);
        assert!(result.grants_per_second > 0.0);
        assert!(result.switch_equivalents_1mhz > 0.0);
    }

    #[test]
    fn test_single_hotspot_benchmark_runs() {
        let result = run_benchmark(
            "single_hotspot",
            Duration::from_millis(100),
            single_hotspot_stimulus,
        );
        assert!(result.ticks_per_second > 0.0);
    }

    #[test]
    fn test_mixed_traffic_benchmark_runs() {
        let result = run_benchmark(
            "mixed_traffic",
            Duration::from_millis(100),
            mixed_traffic_stimulus,
        );
        assert!(result.ticks_per_second > 0.0);
    }

    #[test]
    fn test_idle_baseline_has_no_grants() {
        let result = run_benchmark(
            "idle_baseline",
            Duration::from_millis(100),
            idle_baseline_stimulus,
        );
        assert!(result.ticks_per_second > 0.0);
        assert!(result.grants_per_second == 0.0);
    }
}
