use anyhow::{Context, Result};
use clap::Parser;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::process;
use std::time::Duration;

mod authors;
mod fetch;
mod input;
mod normalize;
mod pipeline;
mod record;
mod settings;

use fetch::DetailsApi;

#[macro_export]
macro_rules! blog {
    ($category:expr, $($arg:tt)*) => {{
        use termion::color;
        let formatted_args = format!($($arg)*);
        println!("{}{:>12}{} {}",color::Fg(color::Green), $category,color::Fg(color::Reset), formatted_args);
    }};
}

/// Pause once after the loop so back-to-back invocations do not hammer the
/// remote service.
const END_OF_RUN_PAUSE: Duration = Duration::from_secs(2);

#[derive(Parser)]
#[command(author, version, propagate_version = true)]
#[command(about = "Take a set of bioRxiv DOIs and parse them into INSERT statements for the database")]
struct Cli {
    /// Input file containing DOIs for bioRxiv
    #[arg(short, long, value_name = "FILE")]
    input: String,

    /// Output file for SQL
    #[arg(short, long, value_name = "FILE")]
    output: String,

    /// Output file mapping generated ids to DOIs
    #[arg(short = 'e', long, value_name = "FILE")]
    index: String,

    /// Integer to start counting from when generating new pubmed ids
    #[arg(short, long)]
    start: u64,
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli) {
        error_message(&format!("{:#}", err));
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let settings = settings::read_settings_file().context("Failed to read configuration")?;

    let input_path = settings.data_path(&cli.input);
    let infile = File::open(&input_path)
        .with_context(|| format!("Failed to open input file {}", input_path.display()))?;
    let ids = input::load_identifiers(BufReader::new(infile))
        .with_context(|| format!("Failed to parse {}", input_path.display()))?;
    blog!("Loaded", "{} unique identifiers", ids.len());

    let sql_path = settings.data_path(&cli.output);
    let mut sql_out = BufWriter::new(
        File::create(&sql_path).with_context(|| format!("Failed to create {}", sql_path.display()))?,
    );
    let index_path = settings.data_path(&cli.index);
    let mut index_out = BufWriter::new(
        File::create(&index_path)
            .with_context(|| format!("Failed to create {}", index_path.display()))?,
    );

    let fetcher = DetailsApi::new(&settings.source_url);
    blog!("Fetching", "from {}", settings.source_url);

    let mut notices = io::stdout();
    let report = pipeline::run(
        &ids,
        &fetcher,
        &mut sql_out,
        &mut index_out,
        &mut notices,
        cli.start,
        END_OF_RUN_PAUSE,
    )?;

    sql_out.flush().context("Failed to flush SQL output")?;
    index_out.flush().context("Failed to flush index output")?;

    blog!(
        "Done",
        "{} inserts written, {} already published, {} skipped",
        report.written,
        report.already_published,
        report.skipped
    );
    Ok(())
}

fn error_message(err: &str) {
    println!(
        "{}{:>12}{} {}",
        termion::color::Fg(termion::color::Red),
        "Error",
        termion::color::Fg(termion::color::Reset),
        err
    );
}
