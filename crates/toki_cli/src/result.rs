use std::time::Instant;

use serde::Serialize;
use toki_analysis::Scan;
use toki_analysis::scan::Text;

use crate::app::AppError;
use crate::cmd_args::Config;

/// Outcome of a lint/generate run, printable as a coloured structured log
/// or as a JSON envelope.
pub struct RunResult {
    pub config: Option<Config>,
    pub started: Instant,
    pub scan: Option<Scan>,
    pub new_texts: Vec<Text>,
    pub removed_ids: Vec<String>,
    pub error: Option<AppError>,
}

impl RunResult {
    pub fn new() -> Self {
        Self {
            config: None,
            started: Instant::now(),
            scan: None,
            new_texts: Vec::new(),
            removed_ids: Vec::new(),
            error: None,
        }
    }

    pub fn print(&self) {
        let Some(config) = &self.config else {
            if let Some(error) = &self.error {
                log::error!("{error}");
            }
            return;
        };
        if config.json {
            self.print_json();
            return;
        }

        if let Some(scan) = &self.scan {
            scan.source_errors.access(|errors| {
                if !errors.is_empty() {
                    log::error!("source errors: {}", errors.len());
                    for error in errors.iter() {
                        log::error!("source {}: {}", error.position, error.message);
                    }
                }
            });

            let elapsed = self.started.elapsed();
            log::info!(
                "finished: tiks.total={} tiks.unique={} tiks.new={} tiks.removed={} \
                 scan.files={} scan.duration={elapsed:?} catalogs={}",
                scan.texts.len(),
                scan.text_index_by_id.len(),
                self.new_texts.len(),
                self.removed_ids.len(),
                scan.statistics.files_traversed(),
                scan.catalogs.len(),
            );
            scan.catalogs.access(|catalogs| {
                for catalog in catalogs.iter() {
                    log::info!(
                        "catalog_{}.arb completeness={:.2}%",
                        catalog.arb.locale,
                        catalog.completeness() * 100.0
                    );
                }
            });
        }
        if let Some(error) = &self.error {
            log::error!("{error}");
        }
    }

    fn print_json(&self) {
        let mut envelope = JsonEnvelope {
            error: self.error.as_ref().map(|e| e.to_string()),
            time_ms: self.started.elapsed().as_millis(),
            ..JsonEnvelope::default()
        };
        if let Some(scan) = &self.scan {
            envelope.string_calls = scan.statistics.string_calls();
            envelope.write_calls = scan.statistics.write_calls();
            envelope.tiks = scan.texts.len();
            envelope.tiks_unique = scan.text_index_by_id.len();
            envelope.tiks_new = self.new_texts.len();
            envelope.files_traversed = scan.statistics.files_traversed();
            scan.source_errors.access(|errors| {
                envelope.source_errors = errors
                    .iter()
                    .map(|e| JsonSourceError {
                        error: e.message.clone(),
                        file: e.position.file.clone(),
                        line: e.position.line,
                        col: e.position.column,
                    })
                    .collect();
            });
            scan.catalogs.access(|catalogs| {
                envelope.catalogs = catalogs
                    .iter()
                    .map(|c| JsonCatalog {
                        locale: c.arb.locale.to_string(),
                        completeness: c.completeness(),
                    })
                    .collect();
            });
        }
        match serde_json::to_string_pretty(&envelope) {
            Ok(json) => eprintln!("{json}"),
            Err(e) => log::error!("encoding JSON result: {e}"),
        }
    }
}

impl Default for RunResult {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Default, Serialize)]
struct JsonEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(rename = "string-calls")]
    string_calls: i64,
    #[serde(rename = "write-calls")]
    write_calls: i64,
    tiks: usize,
    #[serde(rename = "tiks-unique")]
    tiks_unique: usize,
    #[serde(rename = "tiks-new")]
    tiks_new: usize,
    #[serde(rename = "files-traversed")]
    files_traversed: i64,
    #[serde(rename = "source-errors", skip_serializing_if = "Vec::is_empty")]
    source_errors: Vec<JsonSourceError>,
    #[serde(rename = "time-ms")]
    time_ms: u128,
    catalogs: Vec<JsonCatalog>,
}

#[derive(Debug, Serialize)]
struct JsonSourceError {
    error: String,
    file: String,
    line: usize,
    col: usize,
}

#[derive(Debug, Serialize)]
struct JsonCatalog {
    locale: String,
    completeness: f64,
}
