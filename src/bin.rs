use clap::{crate_authors, crate_version, App, AppSettings, Arg, ArgMatches, SubCommand};
use log::{LevelFilter, Log, Metadata, Record};
use ncclassic::{fixtures, NetCDF};

/// Prints library log records on stderr
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn level(verbosity: u64) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

fn init_logger(verbosity: u64) {
    match log::set_logger(&LOGGER) {
        Ok(()) => log::set_max_level(level(verbosity)),
        Err(e) => eprintln!("logging disabled: {}", e),
    }
}

fn main() {
    let matches = App::new("NetCDF classic fixtures")
        .version(crate_version!())
        .author(crate_authors!())
        .about("Writes and inspects NetCDF classic and 64-bit offset files")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help("Log more details on stderr (repeat for debug and trace output)"),
        )
        .subcommand(
            SubCommand::with_name("generate")
                .about("Write the reference files into a directory")
                .arg(
                    Arg::with_name("OUTPUT_DIR")
                        .help("Path of the output data directory")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("scenarios")
                        .short("s")
                        .long("scenario")
                        .value_name("NAME")
                        .takes_value(true)
                        .multiple(true)
                        .help("Only write the given files (default: all of them)"),
                ),
        )
        .subcommand(
            SubCommand::with_name("inspect")
                .about("Print the header of a file")
                .arg(
                    Arg::with_name("INPUT")
                        .help("Sets the input file to use")
                        .required(true)
                        .index(1),
                )
                .arg(
                    Arg::with_name("variables")
                        .short("v")
                        .long("variable")
                        .value_name("VARIABLE")
                        .takes_value(true)
                        .multiple(true)
                        .help("Print a variable declaration and its data"),
                ),
        )
        .subcommand(SubCommand::with_name("list").about("List the reference files"))
        .get_matches();

    let verbosity = match matches.subcommand() {
        (_, Some(m)) => m.occurrences_of("verbose").max(matches.occurrences_of("verbose")),
        _ => matches.occurrences_of("verbose"),
    };
    init_logger(verbosity);

    let result = match matches.subcommand() {
        ("generate", Some(m)) => generate(m),
        ("inspect", Some(m)) => inspect(m),
        ("list", Some(_)) => {
            for f in fixtures::FIXTURES {
                println!("{:<36} {}", f.file_name, f.description);
            }
            Ok(())
        }
        _ => Ok(()),
    };
    if let Err(e) = result {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn generate(matches: &ArgMatches) -> ncclassic::Result<()> {
    let dir = matches.value_of("OUTPUT_DIR").unwrap_or(".");
    let only: Vec<&str> = matches
        .values_of("scenarios")
        .map(|v| v.collect())
        .unwrap_or_default();
    for path in fixtures::generate(dir, &only)? {
        println!("{}", path.display());
    }
    Ok(())
}

fn inspect(matches: &ArgMatches) -> ncclassic::Result<()> {
    let input = matches.value_of("INPUT").unwrap_or_default();
    let mut netcdf = NetCDF::open(input)?;
    match matches.values_of("variables") {
        // if variables are given, only print them
        Some(variables) => {
            for name in variables {
                let header = netcdf.header();
                let var = header
                    .dataset
                    .var(name)
                    .cloned()
                    .ok_or_else(|| ncclassic::Error::UnknownVariable(name.to_string()))?;
                println!("{:#?}", var);
                println!("{:?}", netcdf.read_var(name)?);
            }
        }
        // if no variables are given, only print global attributes
        None => {
            let header = netcdf.header();
            println!(
                "{:?}, {} records, record size {}",
                header.dataset.version(),
                header.numrecs,
                header.layout.record_size
            );
            println!("{:#?}", header.dataset.dims());
            println!("{:#?}", header.dataset.attrs());
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_raises_log_level() {
        assert_eq!(level(0), LevelFilter::Warn);
        assert_eq!(level(1), LevelFilter::Info);
        assert_eq!(level(2), LevelFilter::Debug);
        assert_eq!(level(5), LevelFilter::Trace);
    }

    #[test]
    fn logger_reports_library_records() {
        init_logger(2);
        assert_eq!(log::max_level(), LevelFilter::Debug);
        assert!(log::logger().enabled(
            &Metadata::builder()
                .level(log::Level::Debug)
                .target("ncclassic::writer")
                .build()
        ));
        assert!(!log::logger().enabled(&Metadata::builder().level(log::Level::Trace).build()));
    }
}
