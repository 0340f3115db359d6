// crates/captions-cli/src/main.rs
// ============================================================================
// Module: Captions CLI Entry Point
// Description: Command dispatcher for locale activation and caption lookup.
// Purpose: Drive the captions runtime from the shell with localized output.
// Dependencies: captions-cli, captions-config, captions-core, clap, serde, tokio
// ============================================================================

//! ## Overview
//! The `captions` binary assembles a locale state container from
//! `captions.toml`, runs one operation against it, and prints the outcome.
//! Cache contents and the preferred locale live in the configured SQLite
//! store, so they carry over between invocations. CLI messages go through
//! the i18n catalog; resolved captions are printed verbatim.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use captions_cli::i18n::Locale;
use captions_cli::i18n::set_locale;
use captions_cli::logging::LOG_FILTER_ENV;
use captions_cli::logging::LoggingError;
use captions_cli::logging::init_logging;
use captions_cli::logging::resolve_filter;
use captions_cli::setup::SetupError;
use captions_cli::setup::SetupOptions;
use captions_cli::setup::build_container;
use captions_cli::t;
use captions_config::CaptionsConfig;
use captions_config::config_toml_example;
use captions_core::CaptionArg;
use captions_core::InitStatus;
use captions_core::LoaderDiagnostics;
use captions_core::LocaleCode;
use captions_core::LocaleStateContainer;
use captions_core::SectionLoad;
use captions_core::SectionName;
use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Environment variable selecting the CLI output language.
const LANG_ENV: &str = "CAPTIONS_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "captions", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `CAPTIONS_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Config file path (defaults to captions.toml or `CAPTIONS_CONFIG`).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Read locale documents from this directory instead of the configured origin.
    #[arg(long, value_name = "DIR", global = true)]
    content_dir: Option<PathBuf>,
    /// Skip device language detection when choosing the starting locale.
    #[arg(long, action = ArgAction::SetTrue, global = true)]
    no_detect: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve caption keys for the active locale.
    Resolve(ResolveCommand),
    /// Activate a locale and store it as the preferred locale.
    Activate(ActivateCommand),
    /// Load one content section for the active locale.
    LoadSection(LoadSectionCommand),
    /// Show the locale, cache, and loader state.
    Status(StatusCommand),
    /// Content cache maintenance.
    Cache {
        /// Selected cache subcommand.
        #[command(subcommand)]
        command: CacheCommand,
    },
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Cache subcommands.
#[derive(Subcommand, Debug)]
enum CacheCommand {
    /// Remove the cached content document.
    Clear,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a captions configuration file.
    Validate,
    /// Print an example configuration.
    Example,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Spanish.
    Es,
}

/// Arguments for caption resolution.
#[derive(Args, Debug)]
struct ResolveCommand {
    /// Caption keys to resolve (for example `common.save`).
    #[arg(required = true, value_name = "KEY")]
    keys: Vec<String>,
    /// Locale to activate before resolving (defaults to the starting locale).
    #[arg(long, value_name = "LOCALE")]
    locale: Option<String>,
    /// Extra section to load before resolving.
    #[arg(long, value_name = "SECTION")]
    section: Option<String>,
    /// Text used when a key is missing from all content.
    #[arg(long, value_name = "TEXT")]
    fallback: Option<String>,
    /// Interpolation parameter (repeatable).
    #[arg(long = "param", value_name = "NAME=VALUE")]
    params: Vec<String>,
    /// Emit a JSON object instead of text lines.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

/// Arguments for locale activation.
#[derive(Args, Debug)]
struct ActivateCommand {
    /// Locale to activate.
    #[arg(value_name = "LOCALE")]
    locale: String,
    /// Section to keep alongside the baseline sections.
    #[arg(long, value_name = "SECTION")]
    section: Option<String>,
}

/// Arguments for incremental section loading.
#[derive(Args, Debug)]
struct LoadSectionCommand {
    /// Section to load.
    #[arg(value_name = "SECTION")]
    section: String,
    /// Locale to activate first (defaults to the starting locale).
    #[arg(long, value_name = "LOCALE")]
    locale: Option<String>,
}

/// Arguments for the status report.
#[derive(Args, Debug)]
struct StatusCommand {
    /// Emit JSON instead of text lines.
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };
    let config_path = cli.config;
    let options = SetupOptions {
        content_dir: cli.content_dir,
        skip_device_probe: cli.no_detect,
    };

    match command {
        Commands::Config {
            command,
        } => command_config(&command, config_path.as_deref()),
        Commands::Resolve(command) => {
            let container = open_container(config_path.as_deref(), &options)?;
            command_resolve(&container, &command).await
        }
        Commands::Activate(command) => {
            let container = open_container(config_path.as_deref(), &options)?;
            command_activate(&container, &command).await
        }
        Commands::LoadSection(command) => {
            let container = open_container(config_path.as_deref(), &options)?;
            command_load_section(&container, &command).await
        }
        Commands::Status(command) => {
            let container = open_container(config_path.as_deref(), &options)?;
            command_status(&container, &command).await
        }
        Commands::Cache {
            command: CacheCommand::Clear,
        } => {
            let container = open_container(config_path.as_deref(), &options)?;
            command_cache_clear(&container).await
        }
    }
}

/// Prints CLI help.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Runtime Setup
// ============================================================================

/// Loads config, installs logging, and assembles the container.
fn open_container(
    config_path: Option<&Path>,
    options: &SetupOptions,
) -> CliResult<LocaleStateContainer> {
    let config = load_config(config_path)?;
    let env_filter = std::env::var(LOG_FILTER_ENV).ok();
    let directives = resolve_filter(env_filter.as_deref(), &config.logging);
    init_logging(&directives, config.logging.format)
        .map_err(|err| CliError::new(logging_error_message(&err)))?;
    build_container(&config, options).map_err(|err| CliError::new(setup_error_message(&err)))
}

/// Loads and validates the configuration.
fn load_config(config_path: Option<&Path>) -> CliResult<CaptionsConfig> {
    CaptionsConfig::load(config_path)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))
}

/// Renders a logging bootstrap failure through the message catalog.
fn logging_error_message(error: &LoggingError) -> String {
    match error {
        LoggingError::Filter {
            filter,
            error,
        } => t!("logging.filter_invalid", filter = filter, error = error),
        LoggingError::Init(error) => t!("logging.init_failed", error = error),
    }
}

/// Renders a setup failure through the message catalog.
fn setup_error_message(error: &SetupError) -> String {
    match error {
        SetupError::Locales(error) => t!("setup.locales_invalid", error = error),
        SetupError::Source(error) => t!("setup.source_invalid", error = error),
        SetupError::NoSource => t!("setup.no_source"),
        SetupError::Store {
            path,
            error,
        } => t!("setup.store_failed", path = path.display(), error = error),
        SetupError::DefaultsRead {
            path,
            error,
        } => t!("setup.defaults.read_failed", path = path, error = error),
        SetupError::DefaultsTooLarge {
            path,
            size,
            limit,
        } => t!("setup.defaults.too_large", path = path, size = size, limit = limit),
        SetupError::DefaultsParse {
            path,
            error,
        } => t!("setup.defaults.parse_failed", path = path, error = error),
    }
}

/// Brings the container to a usable state.
///
/// With an explicit locale the container activates it (keeping `section`);
/// otherwise it initializes from the preference, device, or default locale
/// and then loads `section` incrementally.
async fn prepare(
    container: &LocaleStateContainer,
    locale: Option<&LocaleCode>,
    section: Option<&SectionName>,
) -> CliResult<()> {
    if let Some(locale) = locale {
        let report = container.activate(locale, section).await;
        if let Some(failure) = report.origin.failure() {
            write_stderr_line(&t!("init.failed", locale = report.locale, failure = failure))
                .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        }
        return Ok(());
    }
    let status = container.initialize().await;
    if let InitStatus::Failed {
        locale,
        failure,
        ..
    } = &status
    {
        write_stderr_line(&t!("init.failed", locale = locale, failure = failure))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    if let Some(section) = section {
        container.load_section(section).await;
    }
    Ok(())
}

// ============================================================================
// SECTION: Resolve Command
// ============================================================================

/// Executes the `resolve` command.
async fn command_resolve(
    container: &LocaleStateContainer,
    command: &ResolveCommand,
) -> CliResult<ExitCode> {
    let locale = command.locale.as_deref().map(parse_locale_arg).transpose()?;
    let section = command.section.as_deref().map(parse_section_arg).transpose()?;
    let params = command
        .params
        .iter()
        .map(String::as_str)
        .map(parse_param)
        .collect::<CliResult<Vec<_>>>()?;
    prepare(container, locale.as_ref(), section.as_ref()).await?;

    let resolver = container.resolver();
    let resolved: BTreeMap<String, String> = command
        .keys
        .iter()
        .map(|key| (key.clone(), resolver.resolve(key, command.fallback.as_deref(), &params)))
        .collect();
    if command.json {
        write_json(&resolved)?;
        return Ok(ExitCode::SUCCESS);
    }
    for key in &command.keys {
        let value = resolved.get(key).map_or("", String::as_str);
        write_stdout_line(&t!("resolve.entry", key = key, value = value))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Activate Command
// ============================================================================

/// Executes the `activate` command.
async fn command_activate(
    container: &LocaleStateContainer,
    command: &ActivateCommand,
) -> CliResult<ExitCode> {
    let locale = parse_locale_arg(&command.locale)?;
    let section = command.section.as_deref().map(parse_section_arg).transpose()?;
    let report = container.activate(&locale, section.as_ref()).await;

    if report.coerced() {
        write_stderr_line(&t!(
            "activate.coerced",
            requested = report.requested,
            locale = report.locale
        ))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    if report.superseded {
        write_stderr_line(&t!("activate.superseded", locale = report.locale))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::FAILURE);
    }
    if report.origin.failure().is_some() {
        write_stderr_line(&t!("activate.failed", locale = report.locale, origin = report.origin))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::FAILURE);
    }
    if !report.preference_saved {
        write_stderr_line(&t!("activate.preference_unsaved"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }
    write_stdout_line(&t!("activate.ok", locale = report.locale, origin = report.origin))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line(&t!("activate.sections", sections = join_or_none(&report.sections)))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Load Section Command
// ============================================================================

/// Executes the `load-section` command.
async fn command_load_section(
    container: &LocaleStateContainer,
    command: &LoadSectionCommand,
) -> CliResult<ExitCode> {
    let section = parse_section_arg(&command.section)?;
    let locale = command.locale.as_deref().map(parse_locale_arg).transpose()?;
    prepare(container, locale.as_ref(), None).await?;

    let active = container.active_locale();
    let (message, loaded) = match container.load_section(&section).await {
        SectionLoad::Merged {
            origin,
        } => (t!("section.merged", section = section, locale = active, origin = origin), true),
        SectionLoad::Skipped => (t!("section.skipped", section = section, locale = active), true),
        SectionLoad::Missing {
            origin,
        } => (t!("section.missing", section = section, locale = active, origin = origin), false),
        SectionLoad::Superseded => (t!("section.superseded", section = section), false),
    };
    if !loaded {
        write_stderr_line(&message).map_err(|err| CliError::new(output_error("stderr", &err)))?;
        return Ok(ExitCode::FAILURE);
    }
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Status Command
// ============================================================================

/// Machine-readable status report.
#[derive(Debug, Serialize)]
struct StatusReport {
    /// Active locale.
    active_locale: String,
    /// How the starting locale was chosen.
    #[serde(skip_serializing_if = "Option::is_none")]
    init_source: Option<String>,
    /// Absorbed load failure during initialization.
    #[serde(skip_serializing_if = "Option::is_none")]
    init_failure: Option<String>,
    /// Supported locales; the first is the default.
    supported_locales: Vec<String>,
    /// Locale marker of the cached document.
    cached_locale: Option<String>,
    /// Cache read failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    cache_error: Option<String>,
    /// Sections currently loaded.
    loaded_sections: Vec<String>,
    /// Loader counters.
    loader: LoaderDiagnostics,
}

/// Executes the `status` command.
async fn command_status(
    container: &LocaleStateContainer,
    command: &StatusCommand,
) -> CliResult<ExitCode> {
    let init = container.initialize().await;
    let (init_source, init_failure) = match &init {
        InitStatus::Pending => (None, None),
        InitStatus::Ready {
            source,
            ..
        } => (Some(source.to_string()), None),
        InitStatus::Failed {
            source,
            failure,
            ..
        } => (Some(source.to_string()), Some(failure.to_string())),
    };
    let (cached_locale, cache_error) = match container.cached_locale().await {
        Ok(locale) => (locale.map(String::from), None),
        Err(err) => (None, Some(err.to_string())),
    };
    let report = StatusReport {
        active_locale: container.active_locale().to_string(),
        init_source,
        init_failure,
        supported_locales: container.supported_locales().iter().map(ToString::to_string).collect(),
        cached_locale,
        cache_error,
        loaded_sections: container.loaded_sections(),
        loader: container.loader_diagnostics(),
    };
    if command.json {
        write_json(&report)?;
        return Ok(ExitCode::SUCCESS);
    }
    write_status_text(&report)?;
    Ok(ExitCode::SUCCESS)
}

/// Writes the status report as text lines.
fn write_status_text(report: &StatusReport) -> CliResult<()> {
    let none = t!("status.none");
    let init_line = match (&report.init_source, &report.init_failure) {
        (Some(source), Some(failure)) => {
            t!("status.init.failed", source = source, failure = failure)
        }
        (Some(source), None) => t!("status.init.ready", source = source),
        (None, _) => t!("status.init.pending"),
    };
    let cached_line = match (&report.cached_locale, &report.cache_error) {
        (_, Some(error)) => t!("status.cached.failed", error = error),
        (Some(locale), None) => t!("status.cached", locale = locale),
        (None, None) => t!("status.cached", locale = none),
    };
    let loader = &report.loader;
    let lines = [
        t!("status.locale", locale = report.active_locale),
        init_line,
        t!("status.supported", locales = report.supported_locales.join(", ")),
        cached_line,
        t!("status.sections", sections = join_or_none(&report.loaded_sections)),
        t!(
            "status.loader",
            bundled = loader.bundled,
            cache_hits = loader.cache_hits,
            cache_misses = loader.cache_misses,
            network_fetches = loader.network_fetches,
            network_failures = loader.network_failures,
            malformed_documents = loader.malformed_documents,
            storage_failures = loader.storage_failures
        ),
    ];
    for line in lines {
        write_stdout_line(&line).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    }
    Ok(())
}

// ============================================================================
// SECTION: Cache Commands
// ============================================================================

/// Executes the `cache clear` command.
async fn command_cache_clear(container: &LocaleStateContainer) -> CliResult<ExitCode> {
    container
        .clear_cache()
        .await
        .map_err(|err| CliError::new(t!("cache.clear.failed", error = err)))?;
    write_stdout_line(&t!("cache.clear.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Dispatches config subcommands.
fn command_config(command: &ConfigCommand, config_path: Option<&Path>) -> CliResult<ExitCode> {
    match command {
        ConfigCommand::Validate => command_config_validate(config_path),
        ConfigCommand::Example => {
            write_stdout_line(config_toml_example().trim_end())
                .map_err(|err| CliError::new(output_error("stdout", &err)))?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Executes the config validation command.
fn command_config_validate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let _config = load_config(config_path)?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Argument Helpers
// ============================================================================

/// Resolves the CLI locale from flags or environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

/// Parses a content locale argument.
fn parse_locale_arg(value: &str) -> CliResult<LocaleCode> {
    LocaleCode::parse(value)
        .map_err(|err| CliError::new(t!("args.locale_invalid", value = value, error = err)))
}

/// Parses a section name argument.
fn parse_section_arg(value: &str) -> CliResult<SectionName> {
    SectionName::parse(value)
        .map_err(|err| CliError::new(t!("args.section_invalid", value = value, error = err)))
}

/// Parses a `NAME=VALUE` interpolation parameter.
///
/// The value may be empty or contain `=`; the name must be non-empty and
/// free of braces.
fn parse_param(raw: &str) -> CliResult<CaptionArg> {
    let invalid = || CliError::new(t!("args.param_invalid", value = raw));
    let (name, value) = raw.split_once('=').ok_or_else(invalid)?;
    let name = name.trim();
    if name.is_empty() || name.contains(['{', '}']) {
        return Err(invalid());
    }
    Ok(CaptionArg::new(name, value))
}

/// Converts CLI language selections into catalog locales.
impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Es => Self::Es,
        }
    }
}

/// Joins names with commas, or the localized "none".
fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        return t!("status.none");
    }
    items.join(", ")
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes pretty JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(t!("output.json_failed", error = err)))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
