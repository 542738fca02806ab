use launchdash::data::{default_manifest_path, validate_schema, Dataset, REQUIRED_COLUMNS};
use launchdash::logging::ts_now;
use serde_json::json;
use std::env;
use std::fs;
use std::path::PathBuf;

fn main() {
    let path = PathBuf::from(
        env::args()
            .nth(1)
            .unwrap_or_else(|| "data/spacex_launch_dash.csv".to_string()),
    );

    let schema = match validate_schema(&path) {
        Ok(s) => s,
        Err(err) => {
            eprintln!("schema check failed: {}", err);
            std::process::exit(1);
        }
    };

    if !schema.ok {
        eprintln!("{}", schema.message);
        eprintln!("required columns: {:?}", REQUIRED_COLUMNS);
        std::process::exit(2);
    }

    let dataset = match Dataset::load_csv(&path) {
        Ok(d) => d,
        Err(err) => {
            eprintln!("load failed: {:#}", err);
            std::process::exit(3);
        }
    };

    let out_path = default_manifest_path(&path);
    let payload = json!({
        "generated_at": ts_now(),
        "schema": schema,
        "report": dataset.report(),
        "payload_range": dataset.payload_range(),
        "sites": dataset.sites(),
        "stats": dataset.stats(),
    });
    let body = match serde_json::to_string_pretty(&payload) {
        Ok(b) => b,
        Err(err) => {
            eprintln!("serialize failed: {}", err);
            std::process::exit(4);
        }
    };
    if let Err(err) = fs::write(&out_path, body) {
        eprintln!("failed to write {}: {}", out_path.display(), err);
        std::process::exit(4);
    }
    println!("wrote manifest {}", out_path.display());
}
