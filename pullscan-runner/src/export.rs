//! Export — JSON and CSV renderings of a scan.
//!
//! - **JSON**: the full `ScanReport`, candles included, for dashboards and replay
//! - **CSV**: one row per signal in rank order; setup columns are empty for
//!   invalid signals

use std::path::Path;

use anyhow::{Context, Result};
use pullscan_core::domain::Signal;

use crate::scanner::ScanReport;

// ─── JSON export ────────────────────────────────────────────────────

/// Serialize a `ScanReport` to pretty JSON.
pub fn export_json(report: &ScanReport) -> Result<String> {
    serde_json::to_string_pretty(report).context("failed to serialize ScanReport to JSON")
}

/// Deserialize a `ScanReport` previously written by `export_json`.
pub fn import_json(json: &str) -> Result<ScanReport> {
    serde_json::from_str(json).context("failed to deserialize ScanReport from JSON")
}

// ─── CSV export ─────────────────────────────────────────────────────

const CSV_HEADER: [&str; 19] = [
    "rank",
    "id",
    "symbol",
    "name",
    "asset_class",
    "trend",
    "trend_strength",
    "pullback",
    "pullback_quality",
    "confidence",
    "valid",
    "direction",
    "execution",
    "entry",
    "stop_loss",
    "tp1",
    "tp2",
    "tp3",
    "rr_ratio",
];

/// Export signals as CSV, one row per signal, in the given order.
pub fn export_csv(signals: &[Signal]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(CSV_HEADER)?;

    for (i, s) in signals.iter().enumerate() {
        let mut row = vec![
            (i + 1).to_string(),
            s.id.to_string(),
            s.instrument.symbol.clone(),
            s.instrument.name.clone(),
            s.instrument.asset_class.to_string(),
            s.trend_direction.to_string(),
            s.trend_strength.to_string(),
            s.pullback_type.to_string(),
            s.pullback_quality.to_string(),
            s.confidence.to_string(),
            s.is_valid().to_string(),
        ];
        match &s.setup {
            Some(t) => row.extend([
                t.direction.to_string(),
                t.execution_type.to_string(),
                format!("{:.6}", t.entry),
                format!("{:.6}", t.stop_loss),
                format!("{:.6}", t.tp1),
                format!("{:.6}", t.tp2),
                format!("{:.6}", t.tp3),
                format!("{:.2}", t.rr_ratio),
            ]),
            None => row.extend(std::iter::repeat(String::new()).take(8)),
        }
        wtr.write_record(&row)?;
    }

    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

// ─── File output ────────────────────────────────────────────────────

pub fn write_json(report: &ScanReport, path: &Path) -> Result<()> {
    let json = export_json(report)?;
    std::fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

pub fn write_csv(signals: &[Signal], path: &Path) -> Result<()> {
    let csv = export_csv(signals)?;
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::scanner::Scanner;
    use chrono::{TimeZone, Utc};
    use pullscan_core::domain::{AssetClass, Instrument};
    use pullscan_core::RngHierarchy;

    fn report() -> ScanReport {
        let instruments = vec![
            Instrument::new("EUR/USD", "Euro / US Dollar", AssetClass::Forex),
            Instrument::new("ETH/USDT", "Ethereum", AssetClass::Crypto),
            Instrument::new("NVDA", "NVIDIA Corp.", AssetClass::Stock),
        ];
        let at = Utc.with_ymd_and_hms(2024, 2, 12, 16, 0, 0).unwrap();
        Scanner::new(&ScanConfig::default()).scan_at(&instruments, &RngHierarchy::new(8), at)
    }

    #[test]
    fn json_roundtrip_preserves_report() {
        let original = report();
        let json = export_json(&original).unwrap();
        assert!(json.contains("\"candles\""));
        let back = import_json(&json).unwrap();
        assert_eq!(back.summary.total, original.summary.total);
        assert_eq!(back.summary.valid, original.summary.valid);
        assert_eq!(back.summary.master_seed, 8);
        assert_eq!(back.signals.len(), original.signals.len());
        for (a, b) in back.signals.iter().zip(&original.signals) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.setup.is_some(), b.setup.is_some());
            assert_eq!(a.candles.len(), b.candles.len());
        }
    }

    #[test]
    fn json_signals_state_validity() {
        let r = report();
        let value: serde_json::Value = serde_json::from_str(&export_json(&r).unwrap()).unwrap();
        let signals = value["signals"].as_array().unwrap();
        assert_eq!(signals.len(), r.signals.len());
        for (json, signal) in signals.iter().zip(&r.signals) {
            assert_eq!(json["is_valid"].as_bool(), Some(signal.is_valid()));
        }
    }

    #[test]
    fn import_rejects_garbage() {
        assert!(import_json("{ not json").is_err());
    }

    #[test]
    fn csv_has_one_row_per_signal() {
        let r = report();
        let csv = export_csv(&r.signals).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 1 + r.signals.len());
        assert!(lines[0].starts_with("rank,id,symbol,name"));
        assert!(lines[1].starts_with("1,"));
    }

    #[test]
    fn csv_leaves_setup_columns_empty_for_invalid() {
        let mut filtered = report();
        filtered.signals.retain(|s| !s.is_valid());
        let csv = export_csv(&filtered.signals).unwrap();
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        for record in rdr.records() {
            let record = record.unwrap();
            assert_eq!(record.len(), CSV_HEADER.len());
            assert_eq!(&record[10], "false");
            assert!((11..CSV_HEADER.len()).all(|i| record[i].is_empty()));
        }
    }

    #[test]
    fn csv_quotes_names_with_commas() {
        let mut r = report();
        r.signals[0].instrument.name = "Odd, Name".to_string();
        let csv = export_csv(&r.signals).unwrap();
        assert!(csv.contains("\"Odd, Name\""));
    }

    #[test]
    fn writes_files() {
        let dir = tempfile::tempdir().unwrap();
        let r = report();
        let json_path = dir.path().join("scan.json");
        let csv_path = dir.path().join("scan.csv");
        write_json(&r, &json_path).unwrap();
        write_csv(&r.signals, &csv_path).unwrap();
        assert!(std::fs::read_to_string(&json_path).unwrap().contains("master_seed"));
        assert!(std::fs::read_to_string(&csv_path).unwrap().starts_with("rank,"));
    }

    #[test]
    fn write_to_missing_dir_has_context() {
        let err = write_csv(&[], Path::new("/nonexistent/dir/scan.csv")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/dir/scan.csv"));
    }
}
