use log::LevelFilter;

/// Installs the process-wide logger: coloured structured lines on stderr,
/// or one JSON object per record in JSON output mode. Safe to call more
/// than once; later calls only adjust the level filter.
pub fn setup(quiet: bool, verbose: bool, json: bool) {
    let level = if quiet {
        LevelFilter::Off
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let logger = fern::Dispatch::new()
        .format(move |out, message, record| {
            if json {
                out.finish(format_args!(
                    "{}",
                    serde_json::json!({
                        "level": record.level().to_string().to_lowercase(),
                        "message": message.to_string(),
                    })
                ));
                return;
            }
            let (color, reset) = match record.level() {
                log::Level::Error => ("\x1b[31m", "\x1b[0m"), // Red
                log::Level::Warn => ("\x1b[33m", "\x1b[0m"),  // Yellow
                log::Level::Info | log::Level::Debug | log::Level::Trace => ("", ""),
            };
            out.finish(format_args!(
                "{}{}: {}{}",
                color,
                record.level().to_string().to_lowercase(),
                message,
                reset
            ))
        })
        .level(level)
        .chain(std::io::stderr());

    // The global logger can only be installed once per process; repeated
    // runs still get the requested verbosity via the max-level filter.
    let _ = logger.apply();
    log::set_max_level(level);
}
