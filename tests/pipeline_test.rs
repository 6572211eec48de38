use approx::assert_relative_eq;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

use rainflow_fatigue::app_logic::run_config;
use rainflow_fatigue::config::Config;
use rainflow_fatigue::{count_cycles, extract_cycles, reversals, Binning, Cycle};

fn random_walk(seed: u64, len: usize) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut x = 0.0;
    (0..len)
        .map(|_| {
            // integer steps so plateaus and exact ties actually occur
            x += rng.gen_range(-3..=3) as f64;
            x
        })
        .collect()
}

#[test]
fn test_cycle_table_is_written() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("cycles.csv");
    let yaml = format!(
        "input: {{path: tests/signal.csv, column: force, sampling_rate: 10.0}}\n\
         output: {{cycles_csv: '{}'}}\n",
        out.display()
    );
    let config: Config = serde_yaml::from_str(&yaml).unwrap();
    config.validate().unwrap();

    let report = run_config(&config).unwrap();
    assert_eq!(report.cycles, 7);
    assert!(report.matrix.is_none());
    assert!(report.start_stop.is_none());

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(String::from).collect();
    assert_eq!(
        headers,
        vec!["range", "mean", "count", "start_index", "end_index", "start_time", "end_time"]
    );
    let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 7);
    // the closed loop between samples 4 and 5
    assert_eq!(rows[2][2].parse::<f64>().unwrap(), 1.0);
    assert_eq!(rows[2][5].parse::<f64>().unwrap(), 0.4);
    assert_eq!(rows[2][6].parse::<f64>().unwrap(), 0.5);
}

#[test]
fn test_report_serializes_to_json() {
    let config: Config = serde_yaml::from_str(
        "input: {path: tests/signal_semicolon.csv, column: 1, header: false, delimiter: ';'}\n\
         binning: {ndigits: 0}\n\
         matrix: {range_bins: 3, mean_bins: 3}\n",
    )
    .unwrap();
    let report = run_config(&config).unwrap();
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["samples"], 5);
    assert_eq!(json["histogram"].as_array().unwrap().len(), 1);
    assert_eq!(json["histogram"][0]["key"], 10.0);
    assert_eq!(json["matrix"]["counts"].as_array().unwrap().len(), 3);
}

#[test]
fn test_engine_invariants_on_random_signals() {
    for seed in 0..20 {
        let signal = random_walk(seed, 2_000);
        let cycles: Vec<Cycle> = extract_cycles(&signal).collect();
        let points: Vec<_> = reversals(&signal).collect();

        assert_eq!(points.first().map(|p| p.index), Some(0));
        assert_eq!(points.last().map(|p| p.index), Some(signal.len() - 1));
        for w in points.windows(2) {
            assert!(w[0].index < w[1].index);
            assert_ne!(w[0].value, w[1].value);
        }

        let (lo, hi) = signal
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), &x| (lo.min(x), hi.max(x)));
        for c in &cycles {
            assert!(c.count == 0.5 || c.count == 1.0);
            assert!(c.range >= 0.0 && c.range <= hi - lo);
            assert!(c.start_index < c.end_index);
        }

        // every reversal but the last residual point opens a half cycle, and a closed
        // loop consumes two of them
        let halves = cycles.iter().filter(|c| c.count == 0.5).count();
        let fulls = cycles.iter().filter(|c| c.count == 1.0).count();
        assert_eq!(halves + 2 * fulls, points.len() - 1);

        let table = count_cycles(&signal, Binning::NoBinning).unwrap();
        let total: f64 = table.iter().map(|e| e.count).sum();
        assert_relative_eq!(total, cycles.iter().map(|c| c.count).sum::<f64>(), epsilon = 1e-9);

        let dense = count_cycles(&signal, Binning::FixedBinSize(1.5)).unwrap();
        for (i, entry) in dense.iter().filter(|e| e.key > 0.0).enumerate() {
            assert_relative_eq!(entry.key, (i + 1) as f64 * 1.5);
        }

        assert_eq!(cycles, extract_cycles(&signal).collect::<Vec<_>>());
    }
}
