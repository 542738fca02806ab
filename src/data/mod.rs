//! Launch dataset: records, CSV loading and the values derived once at startup.
//!
//! The dataset is an explicitly constructed, immutable context. Everything that
//! reads launch records takes a `&Dataset` (or a record slice) by parameter.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{BufRead, BufReader, Read};
use std::path::{Path, PathBuf};

pub const COL_SITE: &str = "Launch Site";
pub const COL_PAYLOAD: &str = "Payload Mass (kg)";
pub const COL_CLASS: &str = "class";
pub const COL_BOOSTER: &str = "Booster Version";

pub const REQUIRED_COLUMNS: [&str; 4] = [COL_SITE, COL_PAYLOAD, COL_CLASS, COL_BOOSTER];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    /// Parse the binary `class` column.
    pub fn from_class(raw: &str) -> Result<Self, String> {
        match raw.trim() {
            "1" | "1.0" => Ok(Outcome::Success),
            "0" | "0.0" => Ok(Outcome::Failure),
            other => Err(format!("bad class: {:?}", other)),
        }
    }

    /// Y coordinate on the scatter chart.
    pub fn class_value(&self) -> u8 {
        match self {
            Outcome::Success => 1,
            Outcome::Failure => 0,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Success => "Success",
            Outcome::Failure => "Failure",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaunchRecord {
    pub site: String,
    pub payload_mass_kg: f64,
    pub outcome: Outcome,
    pub booster_version: String,
}

impl LaunchRecord {
    pub fn new(site: &str, payload_mass_kg: f64, outcome: Outcome, booster_version: &str) -> Self {
        Self {
            site: site.to_string(),
            payload_mass_kg,
            outcome,
            booster_version: booster_version.to_string(),
        }
    }
}

/// Observed payload extent. Invariant: `min <= max`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PayloadRange {
    pub min: f64,
    pub max: f64,
}

impl PayloadRange {
    pub fn of(records: &[LaunchRecord]) -> Option<Self> {
        let mut iter = records.iter().map(|r| r.payload_mass_kg);
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), v| (lo.min(v), hi.max(v)));
        Some(Self { min, max })
    }
}

/// Figures shown on the four stat cards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetStats {
    pub total: usize,
    pub successes: usize,
    pub failures: usize,
    pub success_rate_pct: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoadReport {
    pub source: String,
    pub hash_sha256: Option<String>,
    pub rows: u64,
    pub bad_rows: u64,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaReport {
    pub columns: Vec<String>,
    pub missing: Vec<String>,
    pub ok: bool,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct Dataset {
    records: Vec<LaunchRecord>,
    payload_range: Option<PayloadRange>,
    report: LoadReport,
}

impl Dataset {
    pub fn new(records: Vec<LaunchRecord>) -> Self {
        let report = LoadReport {
            source: "memory".to_string(),
            rows: records.len() as u64,
            ..Default::default()
        };
        Self::with_report(records, report)
    }

    fn with_report(records: Vec<LaunchRecord>, report: LoadReport) -> Self {
        let payload_range = PayloadRange::of(&records);
        Self {
            records,
            payload_range,
            report,
        }
    }

    /// Built-in demonstration table used when no dataset file is configured.
    pub fn sample() -> Self {
        const SITES: [&str; 4] = ["CCAFS LC-40", "KSC LC-39A", "VAFB SLC-4E", "CCAFS SLC-40"];
        const PAYLOADS: [f64; 8] = [5000.0, 6000.0, 4500.0, 7000.0, 3000.0, 8000.0, 2500.0, 9000.0];
        const PAYLOAD_TAIL: [f64; 4] = [5500.0, 6500.0, 4000.0, 7500.0];
        const CLASSES: [u8; 8] = [1, 1, 0, 1, 0, 1, 0, 1];
        const CLASS_TAIL: [u8; 4] = [1, 0, 1, 1];
        const BOOSTERS: [&str; 3] = ["Falcon 9 v1.1", "Falcon 9 v1.2", "Falcon Heavy"];

        let sites = SITES.iter().cycle().take(100);
        let payloads = PAYLOADS.iter().cycle().take(96).chain(PAYLOAD_TAIL.iter());
        let classes = CLASSES.iter().cycle().take(96).chain(CLASS_TAIL.iter());
        let boosters = BOOSTERS
            .iter()
            .cycle()
            .take(99)
            .chain(std::iter::once(&"Falcon 9 v1.2"));

        let records = sites
            .zip(payloads)
            .zip(classes)
            .zip(boosters)
            .map(|(((site, payload), class), booster)| {
                let outcome = if *class == 1 {
                    Outcome::Success
                } else {
                    Outcome::Failure
                };
                LaunchRecord::new(site, *payload, outcome, booster)
            })
            .collect::<Vec<_>>();

        let report = LoadReport {
            source: "builtin:sample".to_string(),
            rows: records.len() as u64,
            ..Default::default()
        };
        Self::with_report(records, report)
    }

    /// Load launch records from a CSV file. Rows that fail to parse are
    /// skipped and recorded in the load report.
    pub fn load_csv(path: &Path) -> Result<Self> {
        let hash = file_sha256(path).map_err(anyhow::Error::msg)?;
        let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
        let reader = BufReader::new(file);

        let mut columns: Option<ColumnIndex> = None;
        let mut records = Vec::new();
        let mut report = LoadReport {
            source: path.display().to_string(),
            hash_sha256: Some(hash),
            ..Default::default()
        };

        for (lineno, line) in reader.lines().enumerate() {
            let line = line.with_context(|| format!("read {}", path.display()))?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let Some(idx) = &columns else {
                let header = split_row(trimmed);
                match ColumnIndex::from_header(&header) {
                    Ok(idx) => columns = Some(idx),
                    Err(missing) => bail!(
                        "{}: missing required columns {:?}",
                        path.display(),
                        missing
                    ),
                }
                continue;
            };
            match idx.parse_row(trimmed) {
                Ok(record) => {
                    report.rows += 1;
                    records.push(record);
                }
                Err(err) => {
                    report.bad_rows += 1;
                    report.warnings.push(format!("line {}: {}", lineno + 1, err));
                }
            }
        }

        if columns.is_none() {
            bail!("{}: missing header", path.display());
        }

        Ok(Self::with_report(records, report))
    }

    pub fn records(&self) -> &[LaunchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn payload_range(&self) -> Option<PayloadRange> {
        self.payload_range
    }

    pub fn report(&self) -> &LoadReport {
        &self.report
    }

    /// Distinct launch sites in order of first appearance.
    pub fn sites(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for r in &self.records {
            if !out.contains(&r.site.as_str()) {
                out.push(&r.site);
            }
        }
        out
    }

    pub fn stats(&self) -> DatasetStats {
        let total = self.records.len();
        let successes = self
            .records
            .iter()
            .filter(|r| r.outcome == Outcome::Success)
            .count();
        let success_rate_pct = if total == 0 {
            0.0
        } else {
            (successes as f64 / total as f64 * 1000.0).round() / 10.0
        };
        DatasetStats {
            total,
            successes,
            failures: total - successes,
            success_rate_pct,
        }
    }
}

struct ColumnIndex {
    site: usize,
    payload: usize,
    class: usize,
    booster: usize,
    width: usize,
}

impl ColumnIndex {
    fn from_header(header: &[String]) -> Result<Self, Vec<String>> {
        let find = |name: &str| header.iter().position(|h| h == name);
        match (
            find(COL_SITE),
            find(COL_PAYLOAD),
            find(COL_CLASS),
            find(COL_BOOSTER),
        ) {
            (Some(site), Some(payload), Some(class), Some(booster)) => Ok(Self {
                site,
                payload,
                class,
                booster,
                width: site.max(payload).max(class).max(booster) + 1,
            }),
            _ => Err(missing_columns(header)),
        }
    }

    fn parse_row(&self, line: &str) -> Result<LaunchRecord, String> {
        let parts = split_row(line);
        if parts.len() < self.width {
            return Err(format!(
                "expected {}+ columns, got {}",
                self.width,
                parts.len()
            ));
        }
        let site = &parts[self.site];
        if site.is_empty() {
            return Err("empty launch site".to_string());
        }
        let payload_mass_kg = parts[self.payload]
            .parse::<f64>()
            .map_err(|e| format!("bad payload: {}", e))?;
        if !payload_mass_kg.is_finite() {
            return Err(format!("bad payload: {}", payload_mass_kg));
        }
        let outcome = Outcome::from_class(&parts[self.class])?;
        Ok(LaunchRecord::new(
            site,
            payload_mass_kg,
            outcome,
            &parts[self.booster],
        ))
    }
}

fn missing_columns(header: &[String]) -> Vec<String> {
    REQUIRED_COLUMNS
        .iter()
        .filter(|c| !header.iter().any(|h| h == *c))
        .map(|c| c.to_string())
        .collect()
}

/// Split one CSV line, honouring double-quoted fields.
fn split_row(line: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut field = String::new();
    let mut quoted = false;
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '"' if quoted && chars.peek() == Some(&'"') => {
                field.push('"');
                chars.next();
            }
            '"' => quoted = !quoted,
            ',' if !quoted => out.push(std::mem::take(&mut field).trim().to_string()),
            _ => field.push(c),
        }
    }
    out.push(field.trim().to_string());
    out
}

pub fn validate_schema(path: &Path) -> Result<SchemaReport, String> {
    let header = read_header(path)?;
    let missing = missing_columns(&header);
    let ok = missing.is_empty();
    let message = if ok {
        "schema ok".to_string()
    } else {
        format!("schema mismatch: missing {:?}", missing)
    };
    Ok(SchemaReport {
        columns: header,
        missing,
        ok,
        message,
    })
}

pub fn read_header(path: &Path) -> Result<Vec<String>, String> {
    let file = File::open(path).map_err(|e| e.to_string())?;
    let reader = BufReader::new(file);
    for line in reader.lines().map_while(Result::ok) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        return Ok(split_row(trimmed));
    }
    Ok(Vec::new())
}

pub fn file_sha256(path: &Path) -> Result<String, String> {
    let mut file = File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let mut hasher = Sha256::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = file.read(&mut buf).map_err(|e| e.to_string())?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hex::encode(hasher.finalize()))
}

pub fn default_manifest_path(path: &Path) -> PathBuf {
    let mut out = path.to_path_buf();
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "dataset".to_string());
    out.set_file_name(format!("{}.manifest.json", name));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_matches_demo_table() {
        let ds = Dataset::sample();
        assert_eq!(ds.len(), 100);
        assert_eq!(ds.sites().len(), 4);
        assert_eq!(ds.records()[0].site, "CCAFS LC-40");
        assert_eq!(ds.records()[99].booster_version, "Falcon 9 v1.2");
        assert_eq!(ds.records()[96].payload_mass_kg, 5500.0);
        let range = ds.payload_range().unwrap();
        assert_eq!(range.min, 2500.0);
        assert_eq!(range.max, 9000.0);
    }

    #[test]
    fn sample_stats() {
        let stats = Dataset::sample().stats();
        // 12 * 5 successes in the cycled block, 3 in the tail
        assert_eq!(stats.successes, 63);
        assert_eq!(stats.failures, 37);
        assert_eq!(stats.success_rate_pct, 63.0);
    }

    #[test]
    fn empty_dataset_has_no_range_and_zero_rate() {
        let ds = Dataset::new(Vec::new());
        assert!(ds.payload_range().is_none());
        assert_eq!(ds.stats().success_rate_pct, 0.0);
    }

    #[test]
    fn success_rate_rounds_to_one_decimal() {
        let ds = Dataset::new(vec![
            LaunchRecord::new("A", 1.0, Outcome::Success, "v1"),
            LaunchRecord::new("A", 1.0, Outcome::Failure, "v1"),
            LaunchRecord::new("A", 1.0, Outcome::Failure, "v1"),
        ]);
        assert_eq!(ds.stats().success_rate_pct, 33.3);
    }

    #[test]
    fn class_parsing() {
        assert_eq!(Outcome::from_class("1").unwrap(), Outcome::Success);
        assert_eq!(Outcome::from_class(" 0.0 ").unwrap(), Outcome::Failure);
        assert!(Outcome::from_class("2").is_err());
    }

    #[test]
    fn split_row_handles_quotes() {
        let row = split_row(r#"1,"Falcon 9, Block 5",x"#);
        assert_eq!(row, vec!["1", "Falcon 9, Block 5", "x"]);
    }

    #[test]
    fn sites_keep_first_appearance_order() {
        let ds = Dataset::new(vec![
            LaunchRecord::new("B", 1.0, Outcome::Success, "v1"),
            LaunchRecord::new("A", 1.0, Outcome::Success, "v1"),
            LaunchRecord::new("B", 1.0, Outcome::Failure, "v1"),
        ]);
        assert_eq!(ds.sites(), vec!["B", "A"]);
    }
}
