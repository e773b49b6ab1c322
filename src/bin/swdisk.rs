extern crate clap;
extern crate swdisk;

use clap::{App, AppSettings, Arg, SubCommand};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode};
use std::io::{self, Write};
use std::process;

use swdisk::disk::{Capture, DEFAULT_CAPTURE_SIZE};
use swdisk::record::{self, OutputSink, ScanSettings, Signatures};
use swdisk::util;

// Possible exit codes
static _EXIT_SUCCESS: i32 = 0;
static EXIT_FAILURE: i32 = 1;

/// If a dash is specified for a filename, this indicates that the user wants
/// to write to standard output.
static STDOUT_PSEUDOFILENAME: &str = "-";

/// Documents are appended here unless another output file is given.
static DEFAULT_OUTPUT_FILENAME: &str = "out.txt";

fn main() {
    // Parse command-line arguments
    let app = App::new("Word Processor Diskette Recovery Utility")
        .version("0.1.0")
        .about("Recover document text from raw word processor diskette images.")
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(Arg::with_name("diskimage").required(true))
        .arg(
            Arg::with_name("verbose")
                .short("v")
                .long("verbose")
                .multiple(true)
                .global(true)
                .help(
                    "Log more detail to stderr (-v info, -vv debug, -vvv trace; \
                     release builds log at most debug)",
                ),
        )
        .arg(
            Arg::with_name("limit")
                .short("l")
                .long("limit")
                .takes_value(true)
                .validator(size_validator)
                .help("Number of bytes to capture from the start of the image"),
        )
        .arg(
            Arg::with_name("signature")
                .short("s")
                .long("signature")
                .takes_value(true)
                .help("Record signature to search for (default CANONETW1)"),
        )
        .subcommand(
            SubCommand::with_name("extract")
                .about("Append every recovered document to an output file.")
                .arg(
                    Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .default_value(DEFAULT_OUTPUT_FILENAME)
                        .help("Output file, or - for standard output"),
                ),
        )
        .subcommand(SubCommand::with_name("find").about("List the offsets of record signatures."))
        .subcommand(
            SubCommand::with_name("sector")
                .about("Show a sector as hex and ASCII.")
                .arg(
                    Arg::with_name("sector")
                        .validator(size_validator)
                        .required(true),
                ),
        )
        .subcommand(SubCommand::with_name("dump").about("Provide a hex dump of the capture."));

    let mut app_clone = app.clone();
    let matches = app.get_matches();

    initialize_logging(matches.occurrences_of("verbose"));

    let diskimage = matches.value_of("diskimage").unwrap();
    let limit = matches
        .value_of("limit")
        .map(|v| size_parser(v))
        .unwrap_or(DEFAULT_CAPTURE_SIZE);
    let settings = match matches.value_of("signature") {
        Some(signature) => ScanSettings::default().signature(signature.as_bytes()),
        None => ScanSettings::default(),
    };

    let result = match matches.subcommand() {
        ("extract", Some(m)) => cmd_extract(
            diskimage,
            limit,
            &settings,
            m.value_of("output").unwrap_or(DEFAULT_OUTPUT_FILENAME),
        ),
        ("find", Some(_)) => cmd_find(diskimage, limit, &settings),
        ("sector", Some(m)) => cmd_sector(
            diskimage,
            limit,
            size_parser(m.value_of("sector").unwrap()),
        ),
        ("dump", Some(_)) => cmd_dump(diskimage, limit),
        _ => {
            app_clone.print_help().unwrap();
            println!();
            process::exit(EXIT_FAILURE);
        }
    };
    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(EXIT_FAILURE);
    }
}

fn initialize_logging(verbosity: u64) {
    let level = match verbosity {
        0 => return,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        3 => LevelFilter::Trace,
        _ => {
            eprintln!("using more than -vvv does not affect verbosity level");
            LevelFilter::Trace
        }
    };
    if let Err(e) = TermLogger::init(
        level,
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logging: {}", e);
    }
}

fn size_parser(v: &str) -> usize {
    // Validated by size_validator.
    v.parse::<usize>().unwrap_or(0)
}

/// Require a non-negative number.
fn size_validator(v: String) -> Result<(), String> {
    match v.parse::<usize>() {
        Ok(_) => Ok(()),
        Err(_) => Err("Expected a non-negative number.".to_owned()),
    }
}

/// Open a file for appending documents
fn open_output(filename: &str) -> io::Result<Box<dyn Write>> {
    if filename == STDOUT_PSEUDOFILENAME {
        Ok(Box::new(io::stdout()))
    } else {
        Ok(Box::new(OutputSink::append(filename)?))
    }
}

fn cmd_extract(
    diskimage: &str,
    limit: usize,
    settings: &ScanSettings,
    output: &str,
) -> io::Result<()> {
    let mut capture = Capture::open(diskimage, limit)?;
    let mut writer = open_output(output)?;
    let summary = record::scan(capture.as_mut_slice(), settings, &mut writer)?;
    writer.flush()?;
    eprintln!(
        "{} records, {} documents recovered, {} abandoned.",
        summary.matches, summary.documents, summary.failures
    );
    Ok(())
}

fn cmd_find(diskimage: &str, limit: usize, settings: &ScanSettings) -> io::Result<()> {
    let capture = Capture::open(diskimage, limit)?;
    let geometry = capture.geometry();
    for index in Signatures::new(capture.as_slice(), settings.get_signature()) {
        let sector = capture.sector_of(index);
        println!(
            "0x{:06X}  sector {:4} {}",
            index,
            sector,
            geometry.location(sector)
        );
    }
    Ok(())
}

fn cmd_sector(diskimage: &str, limit: usize, sector: usize) -> io::Result<()> {
    let capture = Capture::open(diskimage, limit)?;
    let bytes = capture.sector(sector)?;
    println!(
        "Sector: {:4} (0x{:04X}) of {}",
        sector,
        capture.geometry().sector_offset(sector),
        capture.sector_count()
    );
    print!("{}", util::sector_panes(bytes));
    io::stdout().flush()?;
    Ok(())
}

fn cmd_dump(diskimage: &str, limit: usize) -> io::Result<()> {
    let capture = Capture::open(diskimage, limit)?;
    capture.dump(&mut io::stdout())?;
    io::stdout().flush()?;
    Ok(())
}
