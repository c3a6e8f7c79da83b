//! `sort` command line front end
//!
//! Sorts lines of text files (or standard input) with field selection,
//! numeric, human-numeric, version and month ordering, stable sorting,
//! unique output and shuffling.

use clap::{Arg, ArgAction, Command};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};

use linesort::{
    config::{parse_field_index, KeyMode, SortConfig, SortConfigBuilder},
    error::SortResult,
    input::InputSource,
    output::Destination,
    run,
};

/// Set by the SIGINT handler, polled at input and output boundaries.
static INTERRUPTED: AtomicBool = AtomicBool::new(false);

fn main() {
    let result = run_cli();
    match result {
        Ok(exit_code) => process::exit(exit_code),
        Err(e) => {
            eprintln!("sort: {}", e);
            if e.is_config_error() {
                eprintln!("Try 'sort --help' for more information.");
            }
            process::exit(e.exit_code());
        }
    }
}

fn run_cli() -> SortResult<i32> {
    let matches = build_cli().get_matches();

    init_logging(matches.get_flag("debug"));
    install_interrupt_handler();

    let config = parse_config_from_matches(&matches)?;

    let files: Vec<String> = matches
        .get_many::<String>("files")
        .unwrap_or_default()
        .cloned()
        .collect();
    let sources = InputSource::from_args(&files);
    let destination =
        Destination::from_option(matches.get_one::<String>("output").map(String::as_str));

    log::debug!("Number of CPUs: {}", num_cpus::get());

    let report = run(&config, &sources, &destination, &INTERRUPTED)?;
    for failure in &report.failures {
        eprintln!("sort: {}: {}", failure.source, failure.error);
    }
    log::debug!(
        "read {} lines, wrote {}",
        report.lines_read,
        report.lines_written
    );

    Ok(report.exit_code())
}

fn build_cli() -> Command {
    Command::new("sort")
        .version(env!("CARGO_PKG_VERSION"))
        .override_usage("sort [OPTION]... [FILE]...")
        .about("Sort lines of text files")
        .long_about("Write sorted concatenation of all FILE(s) to standard output.\n\nWith no FILE, or when FILE is -, read standard input.")
        .disable_help_flag(true)  // We use -h for human-numeric-sort
        .disable_version_flag(true)  // We use -V for version-sort

        .arg(Arg::new("files")
            .help("Input files to sort (use '-' or omit for stdin)")
            .num_args(0..)
            .value_name("FILE"))

        // Key modes; when several are given numeric wins, then human-numeric, version, month
        .arg(Arg::new("numeric-sort")
            .short('n')
            .long("numeric-sort")
            .help("Compare according to numerical value")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("human-numeric-sort")
            .short('h')
            .long("human-numeric-sort")
            .help("Compare human readable numbers (e.g., 2K 1Gi)")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("version-sort")
            .short('V')
            .long("version-sort")
            .help("Natural sort of version numbers")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("month-sort")
            .short('M')
            .long("month-sort")
            .help("Compare (unknown) < 'JAN' < ... < 'DEC'")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("sort")
            .long("sort")
            .help("Sort according to WORD")
            .long_help("Sort according to WORD: human-numeric -h, month -M, numeric -n, random -R, version -V")
            .value_name("WORD")
            .value_parser(["human-numeric", "month", "numeric", "random", "version"]))
        .arg(Arg::new("random-sort")
            .short('R')
            .long("random-sort")
            .help("Shuffle the input; other ordering options are ignored")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("random-seed")
            .long("random-seed")
            .help("Seed the shuffle so it can be reproduced")
            .value_name("N")
            .value_parser(clap::value_parser!(u64)))

        // Sort modifiers
        .arg(Arg::new("reverse")
            .short('r')
            .long("reverse")
            .help("Reverse the result of comparisons")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("unique")
            .short('u')
            .long("unique")
            .help("Output only the first line of each group of equal keys")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("stable")
            .short('s')
            .long("stable")
            .help("Keep input order among lines with equal keys")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("ignore-case")
            .short('f')
            .long("ignore-case")
            .help("Fold case when comparing keys")
            .action(ArgAction::SetTrue))
        .arg(Arg::new("ignore-leading-blanks")
            .short('b')
            .long("ignore-leading-blanks")
            .help("Ignore leading blanks in the key")
            .action(ArgAction::SetTrue))

        // Field selection
        .arg(Arg::new("key")
            .short('k')
            .long("key")
            .help("Sort by field FIELD (1-based; 0 means the whole line)")
            .value_name("FIELD")
            .allow_hyphen_values(true))
        .arg(Arg::new("field-separator")
            .short('t')
            .long("field-separator")
            .help("Use SEP instead of runs of whitespace to split fields")
            .value_name("SEP"))

        // I/O
        .arg(Arg::new("output")
            .short('o')
            .long("output")
            .help("Write result to FILE instead of standard output")
            .value_name("FILE"))
        .arg(Arg::new("debug")
            .long("debug")
            .help("Log diagnostics about the run to standard error")
            .action(ArgAction::SetTrue))

        .arg(Arg::new("help")
            .long("help")
            .help("Display this help and exit")
            .action(ArgAction::Help))
        .arg(Arg::new("version")
            .long("version")
            .help("Output version information and exit")
            .action(ArgAction::Version))
}

/// Parse configuration from command line matches
fn parse_config_from_matches(matches: &clap::ArgMatches) -> SortResult<SortConfig> {
    let mut builder = SortConfigBuilder::new();

    if matches.get_flag("numeric-sort") {
        builder = builder.numeric();
    }
    if matches.get_flag("human-numeric-sort") {
        builder = builder.human_numeric();
    }
    if matches.get_flag("version-sort") {
        builder = builder.version_sort();
    }
    if matches.get_flag("month-sort") {
        builder = builder.month_sort();
    }
    if matches.get_flag("random-sort") {
        builder = builder.random();
    }
    if let Some(word) = matches.get_one::<String>("sort") {
        builder = match word.as_str() {
            "random" => builder.random(),
            other => match other.parse::<KeyMode>()? {
                KeyMode::Numeric => builder.numeric(),
                KeyMode::HumanNumeric => builder.human_numeric(),
                KeyMode::Version => builder.version_sort(),
                KeyMode::Month => builder.month_sort(),
                KeyMode::Lexicographic => builder,
            },
        };
    }

    if matches.get_flag("reverse") {
        builder = builder.reverse();
    }
    if matches.get_flag("unique") {
        builder = builder.unique();
    }
    if matches.get_flag("stable") {
        builder = builder.stable();
    }
    if matches.get_flag("ignore-case") {
        builder = builder.ignore_case();
    }
    if matches.get_flag("ignore-leading-blanks") {
        builder = builder.ignore_leading_blanks();
    }
    if let Some(seed) = matches.get_one::<u64>("random-seed") {
        builder = builder.random_seed(*seed);
    }
    if let Some(sep) = matches.get_one::<String>("field-separator") {
        builder = builder.delimiter(sep);
    }

    let mut config = builder.build()?;

    if let Some(field) = matches.get_one::<String>("key") {
        config.field = parse_field_index(field)?;
    }

    Ok(config)
}

/// Minimal stderr sink for the `log` facade, active only with `--debug`.
struct StderrLogger;

impl log::Log for StderrLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record) {
        if self.enabled(record.metadata()) {
            eprintln!("sort: {}: {}", record.level().as_str().to_lowercase(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logging(debug: bool) {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(if debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Off
        });
    }
}

#[cfg(unix)]
extern "C" fn on_interrupt(_signal: libc::c_int) {
    INTERRUPTED.store(true, Ordering::SeqCst);
}

/// First SIGINT requests cancellation; the handler resets so a second one
/// terminates as usual.
#[cfg(unix)]
fn install_interrupt_handler() {
    // SAFETY: the handler only stores to an atomic, which is async-signal-safe,
    // and the sigaction struct is fully initialized before use.
    unsafe {
        let mut action: libc::sigaction = std::mem::zeroed();
        action.sa_sigaction = on_interrupt as libc::sighandler_t;
        action.sa_flags = libc::SA_RESETHAND;
        libc::sigemptyset(&mut action.sa_mask);
        if libc::sigaction(libc::SIGINT, &action, std::ptr::null_mut()) != 0 {
            log::debug!("could not install SIGINT handler");
        }
    }
}

#[cfg(not(unix))]
fn install_interrupt_handler() {}

#[cfg(test)]
mod tests {
    use super::*;
    use linesort::config::Delimiter;
    use linesort::error::SortError;

    fn parse(args: &[&str]) -> SortResult<SortConfig> {
        let matches = build_cli()
            .try_get_matches_from(args)
            .expect("Failed to parse test arguments");
        parse_config_from_matches(&matches)
    }

    #[test]
    fn test_parse_basic_config() {
        let config = parse(&["sort", "-n", "-r"]).expect("Failed to parse test config");
        assert_eq!(config.mode, KeyMode::Numeric);
        assert!(config.reverse);
    }

    #[test]
    fn test_parse_field_options() {
        let config = parse(&["sort", "-k", "2", "-t", ",", "-u", "-s", "-f", "-b", "input.txt"])
            .expect("Failed to parse test config");
        assert_eq!(config.field, 2);
        assert_eq!(config.delimiter, Delimiter::Literal(",".to_string()));
        assert!(config.unique);
        assert!(config.stable);
        assert!(config.ignore_case);
        assert!(config.ignore_leading_blanks);
    }

    #[test]
    fn test_mode_precedence_from_flags() {
        let config = parse(&["sort", "-M", "-V", "-h"]).expect("Failed to parse test config");
        assert_eq!(config.mode, KeyMode::HumanNumeric);
    }

    #[test]
    fn test_sort_word() {
        let config = parse(&["sort", "--sort", "version"]).expect("Failed to parse test config");
        assert_eq!(config.mode, KeyMode::Version);

        let config = parse(&["sort", "--sort", "random", "--random-seed", "9"])
            .expect("Failed to parse test config");
        assert!(config.random);
        assert_eq!(config.random_seed, Some(9));
    }

    #[test]
    fn test_negative_field_is_config_error() {
        let result = parse(&["sort", "--key=-1"]);
        assert!(matches!(result, Err(SortError::InvalidField { .. })));

        let result = parse(&["sort", "-k", "-3"]);
        assert!(matches!(result, Err(SortError::InvalidField { .. })));
    }

    #[test]
    fn test_default_delimiter_is_whitespace() {
        let config = parse(&["sort", "-k", "1"]).expect("Failed to parse test config");
        assert_eq!(config.delimiter, Delimiter::Whitespace);

        let config = parse(&["sort", "-t", " "]).expect("Failed to parse test config");
        assert_eq!(config.delimiter, Delimiter::Whitespace);
    }
}
