// etiquetas-pdf: Generate A4 sheets of Code128 part labels

use chrono::Local;
use clap::Parser;
use std::path::{Path, PathBuf};

use etiquetas_pdf::clients::ClientMap;
use etiquetas_pdf::generate::{generate_preview, generate_sheet, open_in_viewer, LabelJob};
use etiquetas_pdf::import::import_fields;
use etiquetas_pdf::layout::BrandText;
use etiquetas_pdf::record::{LabelFields, DATE_FORMAT, TIME_FORMAT};
use etiquetas_pdf::AppError;

// ============================================================================
// Defaults
// ============================================================================

const DEFAULT_PART: &str = "A 960 505 49 55";
const DEFAULT_CODE_GROUP1: &str = "US873001";
const DEFAULT_CODE_GROUP2: &str = "GH123456";

// ============================================================================
// Data Structures
// ============================================================================

/// CLI Arguments
#[derive(Parser, Debug)]
#[command(author, version, about = "Generate A4 sheets of Code128 part labels")]
struct Args {
    /// Total number of labels in the grid
    #[arg(short = 'n', long, default_value = "15")]
    total: u32,

    /// Print two groups of labels with different data
    #[arg(long)]
    groups: bool,

    /// Number of labels in group 1 (only with --groups)
    #[arg(long, default_value = "8")]
    group1_count: u32,

    /// Client name for group 1
    #[arg(short, long, default_value = "")]
    client: String,

    /// Part number for group 1
    #[arg(short, long, default_value = DEFAULT_PART)]
    part: String,

    /// Date for group 1 (dd/mm/yyyy, defaults to today)
    #[arg(short, long)]
    date: Option<String>,

    /// Time for group 1 (HH:MM:SS, defaults to now)
    #[arg(short, long)]
    time: Option<String>,

    /// Barcode value for group 1
    #[arg(long, default_value = DEFAULT_CODE_GROUP1)]
    code: String,

    /// Logo image for group 1 (overrides the client mapping)
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Client name for group 2
    #[arg(long, default_value = "")]
    client2: String,

    /// Part number for group 2
    #[arg(long, default_value = DEFAULT_PART)]
    part2: String,

    /// Date for group 2 (dd/mm/yyyy, defaults to today)
    #[arg(long)]
    date2: Option<String>,

    /// Time for group 2 (HH:MM:SS, defaults to now)
    #[arg(long)]
    time2: Option<String>,

    /// Barcode value for group 2
    #[arg(long, default_value = DEFAULT_CODE_GROUP2)]
    code2: String,

    /// Logo image for group 2 (overrides the client mapping)
    #[arg(long)]
    logo2: Option<PathBuf>,

    /// Spreadsheet with Cliente/Peça/Data/Hora/Código columns; its first
    /// data rows replace the group fields
    #[arg(long)]
    excel: Option<PathBuf>,

    /// Client name to logo mapping (JSON object)
    #[arg(long, default_value = "clients.json")]
    clients: PathBuf,

    /// Brand line printed top-right
    #[arg(long, default_value = "MAHLE")]
    brand: String,

    /// Line printed under the brand
    #[arg(long, default_value = "MADE IN BRAZIL")]
    subbrand: String,

    /// Output directory (defaults to ~/Documents)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Write a one-label-per-group preview instead of the sheet
    #[arg(long)]
    preview: bool,

    /// Do not open the generated PDF
    #[arg(long)]
    no_open: bool,
}

// ============================================================================
// Main Entry Point
// ============================================================================

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        if e.is_validation() {
            eprintln!("  No PDF was written.");
        }
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let args = Args::parse();

    let clients = ClientMap::load(&args.clients);
    let mut fields = group_fields(&args);

    if let Some(ref excel) = args.excel {
        let rows = if args.groups { 2 } else { 1 };
        for (slot, imported) in fields.iter_mut().zip(import_fields(excel, rows)?) {
            *slot = LabelFields {
                logo: slot.logo.take(),
                ..imported
            };
        }
    }

    for group in fields.iter_mut() {
        if group.logo.is_none() {
            group.logo = clients.logo_for(&group.client).map(Path::to_path_buf);
        }
        if group.logo.is_none() && !group.client.trim().is_empty() && !clients.is_empty() {
            log::debug!(
                "No logo for client '{}' (known: {})",
                group.client,
                clients.names().collect::<Vec<_>>().join(", ")
            );
        }
    }

    let brand = BrandText {
        brand: args.brand.clone(),
        subbrand: args.subbrand.clone(),
    };
    let job = LabelJob::new(args.total, args.group1_count, args.groups, &fields, brand)?;

    let output_dir = args.output_dir.clone().unwrap_or_else(default_output_dir);
    std::fs::create_dir_all(&output_dir)?;

    if args.preview {
        let path = generate_preview(&job, &output_dir)?;
        println!("✓ Preview: {}", path.display());
        if !args.no_open {
            open_in_viewer(&path);
        }
        return Ok(());
    }

    let report = generate_sheet(&job, &output_dir)?;

    println!("✓ Generated: {}", report.path.display());
    println!("  Labels: {} ({} vertical + 2 horizontal)", report.labels, job.assignment.total());
    println!("  Pages: {}", report.pages);
    if job.assignment.use_groups() {
        println!(
            "  Groups: {} / {}",
            job.assignment.group1_count(),
            job.assignment.total() - job.assignment.group1_count()
        );
    }

    if !args.no_open {
        open_in_viewer(&report.path);
    }

    Ok(())
}

// ============================================================================
// Helper Functions
// ============================================================================

fn group_fields(args: &Args) -> [LabelFields; 2] {
    let now = Local::now();
    let today = now.format(DATE_FORMAT).to_string();
    let clock = now.format(TIME_FORMAT).to_string();

    [
        LabelFields {
            client: args.client.clone(),
            part: args.part.clone(),
            date: args.date.clone().unwrap_or_else(|| today.clone()),
            time: args.time.clone().unwrap_or_else(|| clock.clone()),
            code: args.code.clone(),
            logo: args.logo.clone(),
        },
        LabelFields {
            client: args.client2.clone(),
            part: args.part2.clone(),
            date: args.date2.clone().unwrap_or(today),
            time: args.time2.clone().unwrap_or(clock),
            code: args.code2.clone(),
            logo: args.logo2.clone(),
        },
    ]
}

fn default_output_dir() -> PathBuf {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(|home| PathBuf::from(home).join("Documents"))
        .unwrap_or_else(|| PathBuf::from("."))
}
