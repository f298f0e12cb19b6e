mod output;

use clap::{crate_version, value_parser, Arg, ArgAction, ArgMatches, Command};
use jardiff::archive::{self, EntryFilter};
use jardiff::diff::{DiffReport, DiffSettings, Differ};
use jardiff::jvm::SupportedVersions;
use output::OutputMode;
use std::error::Error;
use std::path::PathBuf;
use std::process::exit;
use std::time::Duration;
use termcolor::{ColorChoice, StandardStream};

fn main() {
    let matches = Command::new("jardiff")
        .version(crate_version!())
        .about("Compares the classes in two JARs (or class directories) and reports API changes")
        .arg(
            Arg::new("LEFT")
                .help("Old version: a JAR file or a directory of class files")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(1),
        )
        .arg(
            Arg::new("RIGHT")
                .help("New version: a JAR file or a directory of class files")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .index(2),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .value_name("GLOB")
                .action(ArgAction::Append)
                .help("Skip entries whose path matches this pattern (eg. `META-INF/**`)"),
        )
        .arg(
            Arg::new("output mode")
                .short('m')
                .long("output-mode")
                .value_name("MODE")
                .value_parser(OutputMode::NAMES)
                .default_value("changes")
                .help("How to print the differences"),
        )
        .arg(
            Arg::new("class extensions")
                .long("class-exts")
                .value_name("EXTENSIONS")
                .value_delimiter(',')
                .action(ArgAction::Append)
                .help("Other file extensions to treat as class files (`.class` always wins)"),
        )
        .arg(
            Arg::new("include synthetics")
                .long("include-synthetics")
                .action(ArgAction::SetTrue)
                .help("Also report compiler generated members and bridge methods"),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .value_name("N")
                .value_parser(value_parser!(usize))
                .help("Number of classes to compare at the same time"),
        )
        .arg(
            Arg::new("min major")
                .long("min-major")
                .value_name("VERSION")
                .value_parser(value_parser!(u16))
                .help("Oldest class file major version to read"),
        )
        .arg(
            Arg::new("max major")
                .long("max-major")
                .value_name("VERSION")
                .value_parser(value_parser!(u16))
                .help("Newest class file major version to read"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout-ms")
                .value_name("MILLISECONDS")
                .value_parser(value_parser!(u64))
                .help("Give up on comparisons that have not finished after this long"),
        )
        .arg(
            Arg::new("color")
                .long("color")
                .value_name("WHEN")
                .value_parser(["auto", "always", "never"])
                .default_value("auto")
                .help("When to color the output"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .action(ArgAction::Count)
                .help("Log more (repeat for even more)"),
        )
        .get_matches();

    let level = match matches.get_count("verbose") {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let code = match run(&matches) {
        Ok(report) => {
            let summary = report.summary();
            if summary.failed > 0 || summary.incomplete > 0 {
                2
            } else if summary.changed > 0 {
                1
            } else {
                0
            }
        }
        Err(err) => {
            log::error!("{}", err);
            2
        }
    };
    exit(code)
}

/// Compare the two inputs and print the report
fn run(matches: &ArgMatches) -> Result<DiffReport, Box<dyn Error>> {
    let mut filter = EntryFilter::default();
    for pattern in matches.get_many::<String>("exclude").into_iter().flatten() {
        filter = filter.exclude(pattern)?;
    }
    for extension in matches
        .get_many::<String>("class extensions")
        .into_iter()
        .flatten()
    {
        filter = filter.with_class_extension(extension);
    }

    let mut settings = DiffSettings {
        include_synthetics: matches.get_flag("include synthetics"),
        ..DiffSettings::default()
    };
    if let Some(jobs) = matches.get_one::<usize>("jobs") {
        settings.parallelism = *jobs;
    }
    let defaults = SupportedVersions::default();
    settings.supported_versions = SupportedVersions::new(
        matches
            .get_one::<u16>("min major")
            .copied()
            .unwrap_or(defaults.min_major),
        matches
            .get_one::<u16>("max major")
            .copied()
            .unwrap_or(defaults.max_major),
    );
    settings.timeout = matches
        .get_one::<u64>("timeout")
        .map(|millis| Duration::from_millis(*millis));

    let differ = Differ::new(settings)?;

    let mut sources = vec![];
    for input in ["LEFT", "RIGHT"] {
        if let Some(path) = matches.get_one::<PathBuf>(input) {
            log::info!("Opening '{}'", path.display());
            sources.push(archive::open_source(path, &filter)?);
        }
    }
    let (old, new) = match sources.as_mut_slice() {
        [old, new] => (old, new),
        _ => return Err("expected two inputs".into()),
    };
    let report = differ.diff_sources(old.as_mut(), new.as_mut())?;

    let mode = matches
        .get_one::<String>("output mode")
        .and_then(|name| OutputMode::from_name(name))
        .unwrap_or(OutputMode::Changes);
    let color = match matches.get_one::<String>("color").map(String::as_str) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    };
    let stdout = StandardStream::stdout(color);
    output::write_report(&mut stdout.lock(), &report, mode)?;
    Ok(report)
}
