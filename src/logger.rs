use std::io::Write;

/// Initializes the diagnostic logger on stderr.
///
/// Progress and cache transitions log at `info`; `verbose` also shows `debug` output.
pub fn init_logger(verbose: bool) {
    env_logger::Builder::new()
        .filter_level(if verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .format(|buf, record| match record.level() {
            log::Level::Info => writeln!(buf, "{}", record.args()),
            level => writeln!(buf, "{}: {}", level.as_str().to_lowercase(), record.args()),
        })
        .target(env_logger::Target::Stderr)
        .init();
}
