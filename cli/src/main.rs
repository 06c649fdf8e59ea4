mod editor;

use std::io::{IsTerminal, Write};
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;
use roster_config::RosterConfig;
use roster_core::SeedTarget;
use roster_sqlite::{Console, DumpEngine, DumpOptions, ReaderLines, Seeder, TableSummary};
use tracing_subscriber::EnvFilter;

use crate::editor::EditorLines;

#[derive(Debug, Parser)]
#[command(name = "roster")]
#[command(about = "Inspect, dump, and seed a school roster database")]
#[command(version)]
struct Cli {
    /// YAML configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Database file; overrides the configured path.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Interactive SQL console with \dt, \l and \d <table> shorthand.
    Console,
    /// Write a DROP + INSERT script of every table.
    Dump(DumpArgs),
    /// Print columns, row counts and sample rows of every table.
    Inspect(InspectArgs),
    /// Create the roster tables if they are missing.
    Init,
    /// Regenerate the students of one class, creating school and class as needed.
    Seed(SeedArgs),
    /// Show a class's section statuses and per-section student counts.
    Status(StatusArgs),
}

#[derive(Debug, Args)]
struct DumpArgs {
    /// Output file (defaults to the configured dump path).
    #[arg(long, short)]
    output: Option<PathBuf>,

    /// Emit each table's CREATE TABLE statement after its DROP.
    #[arg(long)]
    include_schema: bool,

    /// Write the script to stdout instead of a file; nothing is printed if
    /// the dump fails.
    #[arg(long, conflicts_with = "output")]
    stdout: bool,
}

#[derive(Debug, Args)]
struct InspectArgs {
    /// Maximum sample rows per table.
    #[arg(long)]
    sample_rows: Option<usize>,
}

#[derive(Debug, Args)]
struct SeedArgs {
    /// School name.
    #[arg(long)]
    school: Option<String>,

    /// Grade of the class.
    #[arg(long)]
    grade: Option<u32>,

    /// Number of sections in the class.
    #[arg(long)]
    sections: Option<u32>,

    /// Fixed RNG seed for reproducible students.
    #[arg(long)]
    rng_seed: Option<u64>,
}

#[derive(Debug, Args)]
struct StatusArgs {
    /// School name.
    #[arg(long)]
    school: Option<String>,

    /// Grade of the class.
    #[arg(long)]
    grade: Option<u32>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = load_config(&cli).and_then(|config| match cli.command {
        Command::Console => run_console(&config),
        Command::Dump(args) => run_dump(&config, args),
        Command::Inspect(args) => run_inspect(&config, args),
        Command::Init => run_init(&config),
        Command::Seed(args) => run_seed(&config, args),
        Command::Status(args) => run_status(&config, args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(cli: &Cli) -> Result<RosterConfig, String> {
    let mut config = match &cli.config {
        Some(path) => RosterConfig::load(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => RosterConfig::default(),
    };
    if let Some(db) = &cli.db {
        config.database = db.clone();
    }
    Ok(config)
}

fn open_db(config: &RosterConfig, create: bool) -> Result<rusqlite::Connection, String> {
    roster_sqlite::open(&config.database, create).map_err(|e| e.to_string())
}

// ---------------------------------------------------------------------------
// console
// ---------------------------------------------------------------------------

fn run_console(config: &RosterConfig) -> Result<(), String> {
    let conn = open_db(config, false)?;
    let stdout = std::io::stdout();

    let result = if std::io::stdin().is_terminal() {
        println!("Connected to '{}'.", config.database.display());
        println!("Enter SQL queries (type 'exit' or 'quit' to exit, '\\dt' to list tables):");
        println!("{}", "-".repeat(80));
        let mut source = EditorLines::new()?;
        Console::new(&conn, stdout.lock()).run(&mut source)
    } else {
        let mut source = ReaderLines::new(std::io::stdin().lock());
        Console::new(&conn, stdout.lock()).run(&mut source)
    };
    let summary = result.map_err(|e| format!("Console failed: {e}"))?;

    tracing::info!(
        commands = summary.commands,
        errors = summary.errors,
        "Console session ended"
    );
    Ok(())
}

// ---------------------------------------------------------------------------
// dump / inspect
// ---------------------------------------------------------------------------

fn run_dump(config: &RosterConfig, args: DumpArgs) -> Result<(), String> {
    let conn = open_db(config, false)?;
    let options = DumpOptions {
        include_schema: args.include_schema || config.dump.include_schema,
    };
    let engine = DumpEngine::new(&conn).with_options(options);

    if args.stdout {
        let mut script = Vec::new();
        engine
            .write_script(&mut script)
            .map_err(|e| format!("Dump failed: {e}"))?;
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(&script)
            .and_then(|()| out.flush())
            .map_err(|e| format!("Failed to write output: {e}"))?;
        return Ok(());
    }

    let output = args.output.unwrap_or_else(|| config.dump.output.clone());
    let report = engine
        .write_to_path(&output)
        .map_err(|e| format!("Dump failed: {e}"))?;

    for table in &report.tables {
        println!("  {}: {} rows", table.table, table.rows);
    }
    println!(
        "Dump written to '{}': {} tables, {} rows, {} bytes",
        output.display(),
        report.tables.len(),
        report.total_rows(),
        report.bytes
    );
    println!("  Generated at: {}", report.generated_at);
    println!("  SHA-256: {}", report.checksum);
    Ok(())
}

fn run_inspect(config: &RosterConfig, args: InspectArgs) -> Result<(), String> {
    let sample_rows = args.sample_rows.unwrap_or(config.inspect.sample_rows);
    if sample_rows == 0 {
        return Err("--sample-rows must be at least 1".to_string());
    }
    let conn = open_db(config, false)?;
    let summaries = DumpEngine::new(&conn)
        .summarize(sample_rows)
        .map_err(|e| format!("Inspect failed: {e}"))?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    print_summaries(&mut out, &summaries, sample_rows)
        .map_err(|e| format!("Failed to write output: {e}"))
}

fn print_summaries<W: Write>(
    out: &mut W,
    summaries: &[TableSummary],
    sample_rows: usize,
) -> std::io::Result<()> {
    writeln!(out, "=== Database Tables ===")?;
    for summary in summaries {
        writeln!(out, "\n--- Table: {} ---", summary.table.name)?;
        writeln!(out, "Columns:")?;
        for col in &summary.table.columns {
            let null = if col.nullable { "" } else { " NOT NULL" };
            writeln!(out, "  - {}: {}{null}", col.name, col.type_label())?;
        }
        writeln!(out, "Row count: {}", summary.row_count)?;

        if summary.sample.is_empty() {
            continue;
        }
        writeln!(out, "\nSample data (first {sample_rows} rows):")?;
        let headers = summary.table.column_names().collect::<Vec<_>>();
        writeln!(out, "{}", headers.join(" | "))?;
        writeln!(out, "{}", "-".repeat(80))?;
        for row in &summary.sample {
            let cells = row.iter().map(|v| v.display()).collect::<Vec<_>>();
            writeln!(out, "{}", cells.join(" | "))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// init / seed / status
// ---------------------------------------------------------------------------

fn run_init(config: &RosterConfig) -> Result<(), String> {
    let conn = open_db(config, true)?;
    roster_sqlite::ensure_schema(&conn).map_err(|e| format!("Init failed: {e}"))?;
    println!(
        "Roster schema ready in '{}' ({}).",
        config.database.display(),
        roster_sqlite::ROSTER_TABLES.join(", ")
    );
    Ok(())
}

fn run_seed(config: &RosterConfig, args: SeedArgs) -> Result<(), String> {
    let target = SeedTarget::new(
        args.school.unwrap_or_else(|| config.seed.school.clone()),
        args.grade.unwrap_or(config.seed.grade),
        args.sections.unwrap_or(config.seed.section_count),
    );
    target
        .validate()
        .map_err(|e| format!("Invalid seed target: {e}"))?;

    let rng = match args.rng_seed.or(config.seed.rng_seed) {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let mut conn = open_db(config, true)?;
    let report = Seeder::new(&mut conn, rng)
        .with_school_password(config.seed.school_password.clone())
        .seed(&target)
        .map_err(|e| format!("Seed failed: {e}"))?;

    let created = |yes: bool| if yes { " (created)" } else { "" };
    println!("School ID: {}{}", report.school_id, created(report.school_created));
    println!("Class ID: {}{}", report.class_id, created(report.class_created));
    if let Some(previous) = report.section_count_patched {
        println!(
            "  Section count updated: {previous} -> {}",
            target.section_count
        );
    }
    println!("Cleared {} existing students.", report.students_deleted);
    println!(
        "Inserted {} students. (Groups: {})",
        report.students_inserted, report.grouped_students
    );
    println!("Marked {} sections as completed.", target.section_count);
    Ok(())
}

fn run_status(config: &RosterConfig, args: StatusArgs) -> Result<(), String> {
    let school = args.school.unwrap_or_else(|| config.seed.school.clone());
    let grade = args.grade.unwrap_or(config.seed.grade);

    let conn = open_db(config, false)?;
    let status = roster_sqlite::class_status(&conn, &school, grade)
        .map_err(|e| format!("Status failed: {e}"))?
        .ok_or_else(|| format!("No class for school '{school}' grade {grade}"))?;

    println!(
        "School '{school}' (id {}), grade {} (class id {})",
        status.school_id, status.grade, status.class_id
    );
    println!("Sections: {}", status.section_count);
    for section in 1..=status.section_count {
        let label = status
            .statuses
            .get(section)
            .map(|s| s.as_str())
            .unwrap_or("unknown");
        let students = status
            .students_per_section
            .iter()
            .find(|(s, _)| *s == section)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        println!("  {section}: {label} ({students} students)");
    }
    println!("Total students: {}", status.student_count());
    Ok(())
}
