use clap::{Arg, Command};
use evtx_flat::err::Result;
use evtx_flat::EvtxParser;

use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::exit;

/// Tries to write to the output, aborts the program if that fails.
macro_rules! try_write {
    ($($arg:tt)*) => {
        if let Err(e) = write!($($arg)*) {
            eprintln!("{}", &e);
            exit(1)
        }
    };
}

/// Multi-line values would break the one-record-per-line output contract.
fn normalize_newlines(s: &str) -> String {
    s.chars()
        .map(|c| if c == '\r' || c == '\n' { ' ' } else { c })
        .collect()
}

fn dump_file(path: &PathBuf, output: &mut impl Write) -> Result<()> {
    let mut parser = EvtxParser::from_path(path)?;

    parser.for_each_record(|timestamp, record_id, values| {
        try_write!(
            output,
            "Record #{} {} ",
            record_id,
            timestamp.format("%Y-%m-%dT%H:%M:%SZ")
        );

        for (name, value) in values {
            try_write!(output, "{}:{},", name, normalize_newlines(value));
        }

        try_write!(output, "\n");
    })
}

fn main() {
    env_logger::init();

    let matches = Command::new("evtx_flat_dump")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Dumps EVTX event records as flat `key:value` lines")
        .arg(
            Arg::new("INPUT")
                .help("EVTX files to dump, parsed in sequence")
                .value_parser(clap::value_parser!(PathBuf))
                .num_args(1..)
                .required(true),
        )
        .get_matches();

    let stdout = io::stdout();
    let mut output = BufWriter::new(stdout.lock());

    for path in matches.get_many::<PathBuf>("INPUT").expect("required argument") {
        if let Err(e) = dump_file(path, &mut output) {
            let _ = output.flush();
            eprintln!("{}: {}", path.display(), e);
            exit(2);
        }
    }

    if output.flush().is_err() {
        exit(1);
    }
}
