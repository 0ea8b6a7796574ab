use std::collections::HashMap;
use std::fs;
use std::io::{BufRead, Write};
use std::path::Path;

use time::OffsetDateTime;
use unic_langid::LanguageIdentifier;

use toki_analysis::analyzer::{
    CollectArbError, SourceAnalyzer, default_select_policy,
};
use toki_analysis::reconcile::{ReconcileError, Reconciler, set_arb_metadata};
use toki_analysis::syntree::{self, LoadError, Project};
use toki_analysis::{Scan, arb, icumsg};
use toki_genrust::{
    BundleSpec, EmitMessage, GENERATED_HEADER, MAIN_BUNDLE_FILE, MOD_FILE, Writer,
    catalog_file_name,
};

use crate::cmd_args::{Command, Config, ConfigError, GenerateArgs};
use crate::logger;
use crate::result::RunResult;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("invalid arguments: {0}")]
    InvalidCliArgs(#[from] ConfigError),
    #[error("analyzing sources: {0}")]
    AnalyzingSource(#[from] LoadError),
    #[error("source code contains errors")]
    SourceErrors,
    #[error(
        "please provide a valid non-und BCP 47 locale for the default language \
         of your original code base using the 'l' parameter"
    )]
    MissingLocaleParam,
    #[error(
        "parameter -l ({argument}) must either match DEFAULT_LOCALE ({bundle}) \
         in the bundle or not be set at all"
    )]
    DefaultLocaleMismatch { argument: String, bundle: String },
    #[error("invalid DEFAULT_LOCALE value {0:?} in bundle")]
    InvalidBundleLocale(String),
    #[error("searching .arb files: {0}")]
    CollectArb(#[from] CollectArbError),
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),
    #[error("bundle contains incomplete catalogs")]
    BundleIncomplete,
    #[error("{context}: {source}")]
    Io {
        context: String,
        source: std::io::Error,
    },
}

fn io_context(context: &str) -> impl FnOnce(std::io::Error) -> AppError + '_ {
    move |source| AppError::Io {
        context: context.to_owned(),
        source,
    }
}

/// Runs a CLI command. Returns the result and the process exit code:
/// 0 success, 1 runtime error, 2 argument error.
pub fn run(command: Command, now: OffsetDateTime) -> (RunResult, i32) {
    match command {
        Command::Version => {
            println!("Toki v{VERSION}");
            (RunResult::new(), 0)
        }
        Command::Lint(args) => run_generate(args, true, now),
        Command::Generate(args) => run_generate(args, false, now),
    }
}

fn run_generate(args: GenerateArgs, lint_only: bool, now: OffsetDateTime) -> (RunResult, i32) {
    let mut result = RunResult::new();
    let config = match args.into_config() {
        Ok(config) => config,
        Err(e) => {
            result.error = Some(e.into());
            return (result, 2);
        }
    };
    logger::setup(config.quiet, config.verbose, config.json);
    result.config = Some(config.clone());

    match generate(&config, lint_only, now, &mut result) {
        Ok(()) => (result, 0),
        Err(error) => {
            result.error = Some(error);
            (result, 1)
        }
    }
}

fn generate(
    config: &Config,
    lint_only: bool,
    now: OffsetDateTime,
    result: &mut RunResult,
) -> Result<(), AppError> {
    if lint_only {
        log::info!("linting mode");
    }
    let bundle_dir = config.module_path.join(&config.bundle_path);

    if !lint_only {
        if !bundle_dir.exists() {
            log::debug!("create new bundle module at {}", bundle_dir.display());
        }
        fs::create_dir_all(&bundle_dir).map_err(io_context("mkdir: bundle module path"))?;
    }

    let head = read_or_create_head_txt(&bundle_dir, !lint_only)?;

    if !lint_only && !bundle_dir.join(MAIN_BUNDLE_FILE).exists() {
        // First run: a locale parameter is required and an empty bundle is
        // materialised so that the next source analysis sees the receiver
        // type.
        let Some(locale) = &config.locale else {
            return Err(AppError::MissingLocaleParam);
        };
        let spec = BundleSpec {
            version: VERSION.to_owned(),
            default_locale: locale.clone(),
            locales: Vec::new(),
        };
        let writer = Writer::new(&head);
        write_file(&bundle_dir.join(MOD_FILE), &writer.mod_source(&spec))?;
        write_file(
            &bundle_dir.join(MAIN_BUNDLE_FILE),
            &writer.bundle_source(&spec),
        )?;
    }

    let project = syntree::load_project(&config.module_path, &config.bundle_path)?;
    let mut scan = Scan::new(LanguageIdentifier::default(), "");
    if let Some(bundle) = &project.bundle {
        log::debug!("bundle detected in {}", bundle.dir.display());
        scan.toki_version = bundle.toki_version.clone();
        if !bundle.default_locale.is_empty() {
            scan.default_locale = bundle.default_locale.parse().map_err(|_| {
                AppError::InvalidBundleLocale(bundle.default_locale.clone())
            })?;
        }
    }

    let outcome = analyze_and_emit(config, lint_only, now, &project, &mut scan, &head, &bundle_dir);
    result.scan = Some(scan);
    let outcome = outcome?;
    result.new_texts = outcome.0;
    result.removed_ids = outcome.1;
    Ok(())
}

type Reconciled = (Vec<toki_analysis::scan::Text>, Vec<String>);

fn analyze_and_emit(
    config: &Config,
    lint_only: bool,
    now: OffsetDateTime,
    project: &Project,
    scan: &mut Scan,
    head: &[String],
    bundle_dir: &Path,
) -> Result<Reconciled, AppError> {
    let analyzer = SourceAnalyzer::new(config.trimpath);
    analyzer.collect_arb_files(bundle_dir, scan)?;
    analyzer.analyze_project(project, scan);
    if !scan.source_errors.is_empty() {
        return Err(AppError::SourceErrors);
    }

    match &config.locale {
        Some(locale) => {
            if !is_und(&scan.default_locale) && *locale != scan.default_locale {
                // The bundle already exists but the locale parameter
                // doesn't match its default locale.
                return Err(AppError::DefaultLocaleMismatch {
                    argument: locale.to_string(),
                    bundle: scan.default_locale.to_string(),
                });
            }
            scan.default_locale = locale.clone();
        }
        None => {
            if is_und(&scan.default_locale) {
                return Err(AppError::MissingLocaleParam);
            }
        }
    }

    let reconciler = Reconciler {
        version: VERSION,
        now,
    };
    let outcome = reconciler.reconcile(scan, bundle_dir, &config.translations)?;

    if !lint_only {
        write_arb_files(scan)?;
        if scan.toki_version != VERSION {
            // Clear generated files on version mismatch.
            purge_generated_files(bundle_dir)
                .map_err(io_context("removing sources of existing bundle"))?;
        }
        write_bundle_files(scan, bundle_dir, head)?;
    }

    if config.verbose {
        report_incomplete_messages(scan);
    }

    if config.require_complete {
        let incomplete =
            scan.catalogs.access(|catalogs| catalogs.iter().any(|c| c.incomplete() > 0));
        if incomplete {
            return Err(AppError::BundleIncomplete);
        }
    }

    Ok((outcome.new_texts, outcome.removed_ids))
}

fn is_und(locale: &LanguageIdentifier) -> bool {
    locale.language.as_str() == "und"
}

/// Reads `head.txt`, creating it empty on generate runs when missing.
/// Its lines are prepended as comments to every generated file.
fn read_or_create_head_txt(
    bundle_dir: &Path,
    create_if_missing: bool,
) -> Result<Vec<String>, AppError> {
    let path = bundle_dir.join("head.txt");
    match fs::read_to_string(&path) {
        Ok(content) => {
            if content.is_empty() {
                return Ok(Vec::new());
            }
            Ok(content.lines().map(str::to_owned).collect())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            if !create_if_missing {
                log::warn!("head.txt not found");
                return Ok(Vec::new());
            }
            log::warn!("head.txt not found, creating a new one");
            fs::File::create(&path).map_err(io_context("creating head.txt file"))?;
            Ok(Vec::new())
        }
        Err(e) => Err(io_context("reading head.txt")(e)),
    }
}

/// Writes every catalog to its ARB file, stamping the generator metadata.
fn write_arb_files(scan: &Scan) -> Result<(), AppError> {
    scan.catalogs.access(|catalogs| {
        for catalog in catalogs.iter_mut() {
            set_arb_metadata(&mut catalog.arb, VERSION);
            let file = fs::File::create(&catalog.path)
                .map_err(io_context("opening .arb catalog"))?;
            let mut writer = std::io::BufWriter::new(file);
            arb::encode(&mut writer, &catalog.arb, "\t")
                .map_err(io_context("encoding .arb catalog"))?;
            writer.flush().map_err(io_context("closing .arb catalog"))?;
        }
        Ok(())
    })
}

/// Deletes every file in the bundle directory whose first line marks it as
/// generated. Handwritten files (`head.txt`, the `.arb` catalogs) remain.
fn purge_generated_files(bundle_dir: &Path) -> std::io::Result<()> {
    let mut stack = vec![bundle_dir.to_path_buf()];
    while let Some(dir) = stack.pop() {
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.is_dir() {
                stack.push(path);
                continue;
            }
            let Ok(file) = fs::File::open(&path) else {
                continue;
            };
            let mut first_line = String::new();
            let mut reader = std::io::BufReader::new(file);
            if reader.read_line(&mut first_line).is_ok()
                && first_line.trim_end().starts_with(GENERATED_HEADER)
            {
                fs::remove_file(&path)?;
            }
        }
    }
    Ok(())
}

/// Emits the bundle façade, the module wiring and one dispatch file per
/// catalog.
fn write_bundle_files(scan: &Scan, bundle_dir: &Path, head: &[String]) -> Result<(), AppError> {
    let mut locales: Vec<LanguageIdentifier> =
        scan.catalogs.access(|catalogs| catalogs.iter().map(|c| c.arb.locale.clone()).collect());
    locales.sort_by_key(|l| l.to_string());

    let spec = BundleSpec {
        version: VERSION.to_owned(),
        default_locale: scan.default_locale.clone(),
        locales,
    };
    let writer = Writer::new(head);
    write_file(&bundle_dir.join(MOD_FILE), &writer.mod_source(&spec))?;
    write_file(
        &bundle_dir.join(MAIN_BUNDLE_FILE),
        &writer.bundle_source(&spec),
    )?;

    // The dispatch key is the raw TIK of each message.
    let tik_by_id: HashMap<String, String> = scan.text_index_by_id.access(|index| {
        index
            .iter()
            .map(|(id, at)| (id.clone(), scan.texts.at(*at).tik.raw))
            .collect()
    });

    scan.catalogs.access(|catalogs| {
        for catalog in catalogs.iter() {
            let messages: Vec<EmitMessage> = catalog
                .arb
                .messages
                .values()
                .filter(|m| !m.icu_message.is_empty())
                .filter_map(|m| {
                    tik_by_id.get(&m.id).map(|tik| EmitMessage {
                        id: m.id.clone(),
                        tik: tik.clone(),
                        icu_message: m.icu_message.clone(),
                        icu_tokens: m.icu_tokens.clone(),
                    })
                })
                .collect();
            let source = writer.catalog_source(&catalog.arb.locale, &messages);
            write_file(&bundle_dir.join(catalog_file_name(&catalog.arb.locale)), &source)?;
        }
        Ok(())
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), AppError> {
    fs::write(path, content).map_err(io_context("writing generated file"))
}

/// Logs everything keeping each catalog message incomplete.
fn report_incomplete_messages(scan: &Scan) {
    scan.catalogs.access(|catalogs| {
        for catalog in catalogs.iter() {
            for message in catalog.arb.messages.values() {
                let report = icumsg::analysis_report(
                    &catalog.arb.locale,
                    &message.icu_message,
                    &message.icu_tokens,
                    &default_select_policy,
                );
                for line in report {
                    log::warn!("{line} (id={})", message.id);
                }
            }
        }
    });
}
