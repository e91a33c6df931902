use clap::Parser;
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use tablepick::core::config::{self, Overrides, TablePickConfig};
use tablepick::core::table::rows_from_delimited;
use tablepick::{SelectableTable, row_texts};

#[derive(Parser)]
#[command(name = "tablepick", about = "Pick one row from a table in the terminal")]
struct Args {
    /// Delimited text with one row per line (stdin when omitted)
    file: Option<PathBuf>,

    /// Column separator in the input
    #[arg(short, long, default_value_t = ',')]
    delimiter: char,

    /// Treat the first line as column headers
    #[arg(long)]
    header: bool,

    /// Print the table once and return the first row
    #[arg(long)]
    batch: bool,

    /// Background color of the selected row
    #[arg(long)]
    background: Option<String>,

    /// Foreground color of the selected row
    #[arg(long)]
    foreground: Option<String>,

    /// Cancel after this many seconds without a keypress
    #[arg(long, value_name = "SECS")]
    timeout: Option<u64>,

    /// Print the chosen row as a JSON array
    #[arg(long)]
    json: bool,

    /// Write a debug log to this file
    #[arg(long, value_name = "PATH")]
    log: Option<PathBuf>,
}

fn main() -> io::Result<ExitCode> {
    let args = Args::parse();

    let (file_config, config_error) = match config::load_config() {
        Ok(c) => (c, None),
        Err(e) => (TablePickConfig::default(), Some(e)),
    };
    let overrides = Overrides {
        background: args.background.clone(),
        foreground: args.foreground.clone(),
        batch: args.batch,
        timeout_secs: args.timeout,
        log_file: args.log.clone(),
    };
    let resolved = config::resolve(&file_config, &overrides);

    // The widget owns the terminal, so logs only ever go to a file
    if let Some(path) = &resolved.log_file {
        let log_config = ConfigBuilder::new().set_time_format_rfc3339().build();
        match File::create(path) {
            Ok(log_file) => {
                let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
            }
            Err(e) => eprintln!("tablepick: cannot open log file {}: {e}", path.display()),
        }
    }
    if let Some(e) = config_error {
        log::warn!("{}, using defaults", e);
        eprintln!("tablepick: {e}, using defaults");
    }

    let input = match &args.file {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf)?;
            buf
        }
    };
    let mut rows = rows_from_delimited(&input, args.delimiter);
    log::info!("tablepick starting with {} lines of input", rows.len());

    let mut table = SelectableTable::from_config(&resolved);
    if args.header && !rows.is_empty() {
        let headers = rows.remove(0);
        table.set_headers(row_texts(&headers));
    }
    table.set_rows(rows);

    let Some(row) = table.select()? else {
        log::info!("Nothing selected");
        return Ok(ExitCode::FAILURE);
    };

    let values = row_texts(&row);
    if args.json {
        println!("{}", serde_json::to_string(&values).map_err(io::Error::other)?);
    } else {
        println!("{}", values.join(&args.delimiter.to_string()));
    }
    Ok(ExitCode::SUCCESS)
}
