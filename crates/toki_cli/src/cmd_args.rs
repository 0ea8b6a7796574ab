use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use unic_langid::LanguageIdentifier;

#[derive(Debug, Parser)]
#[command(name = "toki", disable_version_flag = true)]
/// Build-time i18n toolchain: scans sources for TIK call-sites,
/// reconciles ARB catalogs and regenerates the translation bundle.
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print version information.
    Version,
    /// Analyze sources and catalogs, report diagnostics, write nothing.
    Lint(GenerateArgs),
    /// Analyze sources, reconcile catalogs and regenerate the bundle.
    Generate(GenerateArgs),
}

#[derive(Debug, Clone, Args)]
pub struct GenerateArgs {
    /// Default locale of the original source code texts in BCP 47.
    #[arg(short = 'l')]
    pub locale: Option<String>,

    /// Translation locale in BCP 47 (repeatable, duplicates are ignored).
    /// Creates new catalogs for locales without one.
    #[arg(short = 't')]
    pub translations: Vec<String>,

    /// Path to the host module root.
    #[arg(short = 'm', default_value = ".")]
    pub module_path: PathBuf,

    /// Path to the generated bundle module relative to the module root.
    #[arg(short = 'b', default_value = "src/tokibundle")]
    pub bundle_path: PathBuf,

    /// Enable source code path trimming.
    #[arg(long = "trimpath", default_value_t = true, action = clap::ArgAction::Set)]
    pub trimpath: bool,

    /// Enable JSON output.
    #[arg(long)]
    pub json: bool,

    /// Disable all console logging.
    #[arg(short = 'q', conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable verbose console logging.
    #[arg(short = 'v')]
    pub verbose: bool,

    /// Fail when any catalog contains incomplete messages.
    #[arg(long = "require-complete")]
    pub require_complete: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("argument {flag}={value:?}: must be a valid BCP 47 locale")]
    LocaleNotBcp47 { flag: char, value: String },
}

/// Validated configuration of a lint/generate run.
#[derive(Debug, Clone)]
pub struct Config {
    pub locale: Option<LanguageIdentifier>,
    pub translations: Vec<LanguageIdentifier>,
    pub module_path: PathBuf,
    pub bundle_path: PathBuf,
    pub trimpath: bool,
    pub json: bool,
    pub quiet: bool,
    pub verbose: bool,
    pub require_complete: bool,
}

fn parse_locale(flag: char, value: &str) -> Result<LanguageIdentifier, ConfigError> {
    let parsed: LanguageIdentifier =
        value.parse().map_err(|_| ConfigError::LocaleNotBcp47 {
            flag,
            value: value.to_owned(),
        })?;
    if parsed.language.as_str() == "und" {
        return Err(ConfigError::LocaleNotBcp47 {
            flag,
            value: value.to_owned(),
        });
    }
    Ok(parsed)
}

impl GenerateArgs {
    pub fn into_config(self) -> Result<Config, ConfigError> {
        let locale = match &self.locale {
            Some(value) => Some(parse_locale('l', value)?),
            None => None,
        };

        let mut raw_translations = self.translations.clone();
        raw_translations.sort();
        raw_translations.dedup();
        let mut translations = Vec::with_capacity(raw_translations.len());
        for value in &raw_translations {
            translations.push(parse_locale('t', value)?);
        }

        Ok(Config {
            locale,
            translations,
            module_path: self.module_path,
            bundle_path: self.bundle_path,
            trimpath: self.trimpath,
            json: self.json,
            quiet: self.quiet,
            verbose: self.verbose,
            require_complete: self.require_complete,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::parse_from(["toki", "generate", "-l", "en"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let config = args.into_config().unwrap();
        assert_eq!(Some("en".parse().unwrap()), config.locale);
        assert!(config.trimpath);
        assert!(!config.json);
        assert_eq!(PathBuf::from("."), config.module_path);
        assert_eq!(PathBuf::from("src/tokibundle"), config.bundle_path);
    }

    #[test]
    fn test_translations_deduped() {
        let cli = Cli::parse_from(["toki", "generate", "-t", "de", "-t", "uk", "-t", "de"]);
        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let config = args.into_config().unwrap();
        assert_eq!(
            vec![
                "de".parse::<LanguageIdentifier>().unwrap(),
                "uk".parse().unwrap()
            ],
            config.translations
        );
    }

    #[test]
    fn test_invalid_locale() {
        let cli = Cli::parse_from(["toki", "lint", "-l", "not a tag"]);
        let Command::Lint(args) = cli.command else {
            panic!("expected lint");
        };
        assert!(args.into_config().is_err());
    }

    #[test]
    fn test_und_locale_rejected() {
        let cli = Cli::parse_from(["toki", "lint", "-l", "und"]);
        let Command::Lint(args) = cli.command else {
            panic!("expected lint");
        };
        assert!(args.into_config().is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(Cli::try_parse_from(["toki", "lint", "-q", "-v"]).is_err());
    }
}
