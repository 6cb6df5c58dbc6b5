//! Moonveil Benchmark Runner
//!
//! Times the lexer and the full obfuscation pipeline over synthetic Luau
//! scripts and writes a JSON report alongside the human-readable table. The
//! criterion benches under `benches/` are the statistically careful ones;
//! this runner is the quick regression check.

use std::collections::BTreeMap;
use std::fs;
use std::time::Instant;

use anyhow::Result;
use serde::{Deserialize, Serialize};

mod benchmarks;

/// One timed benchmark, aggregated over its iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Measurement {
    pub suite: String,
    pub name: String,
    pub iterations: u32,
    pub mean_ms: f64,
    pub median_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    /// Present when the benchmark declared how many bytes one iteration
    /// processes.
    pub mb_per_s: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: String,
    pub version: String,
    pub host: Host,
    pub measurements: Vec<Measurement>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Host {
    pub os: String,
    pub arch: String,
}

/// A named suite with a fixed iteration count. Every measurement runs one
/// untimed warmup iteration first.
pub struct Bench {
    suite: &'static str,
    iterations: u32,
}

impl Bench {
    pub fn new(suite: &'static str, iterations: u32) -> Self {
        Self { suite, iterations }
    }

    pub fn measure<F: FnMut()>(&self, name: &str, f: F) -> Measurement {
        self.build(name, None, f)
    }

    /// Like [`Bench::measure`], tagging the result with MB/s derived from
    /// the median iteration.
    pub fn measure_bytes<F: FnMut()>(&self, name: &str, bytes: u64, f: F) -> Measurement {
        self.build(name, Some(bytes), f)
    }

    fn build<F: FnMut()>(&self, name: &str, bytes: Option<u64>, mut f: F) -> Measurement {
        f();
        let mut times_ms = Vec::with_capacity(self.iterations as usize);
        for _ in 0..self.iterations {
            let start = Instant::now();
            f();
            times_ms.push(start.elapsed().as_secs_f64() * 1000.0);
        }
        times_ms.sort_by(f64::total_cmp);
        let n = times_ms.len();
        let mean_ms = times_ms.iter().sum::<f64>() / n as f64;
        let median_ms = if n % 2 == 0 {
            (times_ms[n / 2 - 1] + times_ms[n / 2]) / 2.0
        } else {
            times_ms[n / 2]
        };
        let mb_per_s = bytes.map(|b| b as f64 / (1024.0 * 1024.0) / (median_ms / 1000.0));
        Measurement {
            suite: self.suite.to_string(),
            name: name.to_string(),
            iterations: self.iterations,
            mean_ms,
            median_ms,
            min_ms: times_ms[0],
            max_ms: times_ms[n - 1],
            mb_per_s,
        }
    }
}

fn print_report(report: &Report) {
    println!();
    println!(
        "Moonveil benchmarks v{} on {}/{} at {}",
        report.version, report.host.os, report.host.arch, report.generated_at
    );
    let mut suite: &str = "";
    for m in &report.measurements {
        if m.suite != suite {
            suite = &m.suite;
            println!("\n[{suite}]");
        }
        let rate = m
            .mb_per_s
            .map(|v| format!("  {v:>7.1} MB/s"))
            .unwrap_or_default();
        println!(
            "  {:<44} median {:>8.3}ms  mean {:>8.3}ms  ({:.3}..{:.3}){rate}",
            m.name, m.median_ms, m.mean_ms, m.min_ms, m.max_ms
        );
    }

    let mut totals: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for m in &report.measurements {
        let slot = totals.entry(&m.suite).or_insert((0, 0.0));
        slot.0 += 1;
        slot.1 += m.mean_ms * f64::from(m.iterations);
    }
    println!();
    for (suite, (count, spent_ms)) in &totals {
        println!("{suite}: {count} benchmarks, {spent_ms:.0}ms measured");
    }
}

fn main() -> Result<()> {
    let json_only = std::env::args().any(|a| a == "--json-only");

    if !json_only {
        println!("Running Moonveil benchmarks (lexer, pipeline)...");
    }
    let mut measurements = benchmarks::lexer::run_all();
    measurements.extend(benchmarks::pipeline::run_all());

    let report = Report {
        generated_at: chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        host: Host {
            os: std::env::consts::OS.to_string(),
            arch: std::env::consts::ARCH.to_string(),
        },
        measurements,
    };

    if json_only {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_report(&report);
    fs::create_dir_all("benchmarks/results")?;
    let path = format!(
        "benchmarks/results/moonveil-bench-{}.json",
        chrono::Utc::now().format("%Y%m%d_%H%M%S")
    );
    fs::write(&path, serde_json::to_string_pretty(&report)?)?;
    println!("\nReport written to {path}");
    Ok(())
}
