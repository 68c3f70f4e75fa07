//! dirsheet CLI - templated ODS export tool

mod logger;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use dirsheet::prelude::*;
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "dirsheet")]
#[command(author, version, about = "Export rows into spreadsheets built from ODS templates")]
struct Cli {
    /// More output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only report errors
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render CSV rows into a copy of an ODS template
    Export(ExportArgs),

    /// List the entries and sheets of an ODS file
    Inspect {
        /// ODS file
        input: PathBuf,
    },
}

#[derive(Args)]
struct ExportArgs {
    /// Template ODS file (never modified)
    #[arg(short, long)]
    template: PathBuf,

    /// Column layout (JSON)
    #[arg(short, long)]
    columns: PathBuf,

    /// Input CSV file
    #[arg(short, long)]
    input: PathBuf,

    /// Output ODS file
    #[arg(short, long)]
    output: PathBuf,

    /// Sheet name
    #[arg(short, long, default_value = "Sheet1")]
    sheet: String,

    /// Archive backend (native or command)
    #[arg(long, default_value = "native")]
    backend: BackendKind,

    /// Do not write a header row
    #[arg(long)]
    no_header: bool,

    /// Do not declare per-column widths
    #[arg(long)]
    no_size_columns: bool,

    /// Render all data rows alike
    #[arg(long)]
    flat: bool,

    /// Keep the scratch directory for inspection
    #[arg(long)]
    keep_scratch: bool,

    /// Separator splitting multivalue fields
    #[arg(long, default_value = ";")]
    separator: char,

    /// CSV field delimiter
    #[arg(short, long, default_value = ",")]
    delimiter: char,

    /// The input has no header record
    #[arg(long)]
    no_input_header: bool,
}

/// Column file: either a full layout or a bare list of columns
#[derive(Deserialize)]
#[serde(untagged)]
enum LayoutFile {
    Columns(Vec<ColumnDescriptor>),
    Layout(ColumnLayout),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    logger::init(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Export(args) => export(&args),
        Commands::Inspect { input } => inspect(&input),
    }
}

fn read_layout(path: &Path) -> Result<ColumnLayout> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read '{}'", path.display()))?;
    parse_layout(&json).with_context(|| format!("Invalid column layout in '{}'", path.display()))
}

fn parse_layout(json: &str) -> Result<ColumnLayout> {
    let layout = match serde_json::from_str(json)? {
        LayoutFile::Columns(columns) => ColumnLayout::new(columns),
        LayoutFile::Layout(layout) => layout,
    };
    anyhow::ensure!(layout.column_count() > 0, "no columns defined");
    Ok(layout)
}

fn export(args: &ExportArgs) -> Result<()> {
    let mut layout = read_layout(&args.columns)?;
    if args.flat {
        layout.flat = true;
    }
    let delimiter = u8::try_from(args.delimiter).context("Delimiter must be a single byte")?;

    let mut options = OdsOptions::new(&args.template, &args.output)
        .with_backend(args.backend)
        .with_retain_scratch(args.keep_scratch);
    if args.keep_scratch {
        if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
            options = options.with_scratch_parent(parent);
        }
    }

    let mut writer = OdsWriter::new(options, layout);
    writer
        .open()
        .with_context(|| format!("Failed to open template '{}'", args.template.display()))?;
    writer
        .create_sheet(&args.sheet, !args.no_header, !args.no_size_columns)
        .with_context(|| format!("Failed to create sheet '{}'", args.sheet))?;

    let import = CsvImportOptions {
        delimiter,
        has_header: !args.no_input_header,
        multivalue_separator: Some(args.separator),
        ..Default::default()
    };
    let rows = CsvImporter::import_file(&mut writer, &args.input, &import)
        .with_context(|| format!("Failed to import '{}'", args.input.display()))?;
    writer
        .close()
        .with_context(|| format!("Failed to write '{}'", args.output.display()))?;

    eprintln!("Wrote {} rows to '{}'", rows, args.output.display());
    Ok(())
}

fn inspect(input: &Path) -> Result<()> {
    let entries = dirsheet::inspect::list_entries(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    println!("File: {}", input.display());
    println!("Entries: {}", entries.len());
    for entry in &entries {
        println!("  {}", entry);
    }

    match dirsheet::inspect::sheet_names(input) {
        Ok(names) => {
            println!("Sheets: {}", names.len());
            for (i, name) in names.iter().enumerate() {
                println!("  {}\t{}", i, name);
            }
        }
        Err(e) => println!("Sheets: unavailable ({})", e),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;
    use std::ffi::OsStr;
    use std::io::Write;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_export_args() {
        let cli = Cli::try_parse_from([
            "dirsheet", "-vv", "export", "-t", "t.ods", "-c", "cols.json", "-i", "rows.csv",
            "-o", "out.ods", "--backend", "command", "--no-header",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        assert_eq!(args.backend, BackendKind::Command);
        assert_eq!(args.sheet, "Sheet1");
        assert!(args.no_header);
        assert_eq!(args.separator, ';');
    }

    #[test]
    fn test_unknown_backend_is_rejected() {
        let result = Cli::try_parse_from([
            "dirsheet", "export", "-t", "t.ods", "-c", "c.json", "-i", "r.csv", "-o", "o.ods",
            "--backend", "ftp",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_log_levels() {
        assert_eq!(logger::directive_for(0, false), "warn");
        assert_eq!(logger::directive_for(1, false), "info");
        assert_eq!(logger::directive_for(5, false), "trace");
        assert_eq!(logger::directive_for(3, true), "error");
    }

    #[test]
    fn test_parse_layout() {
        let layout = parse_layout(
            r#"{
                "flat": true,
                "columns": [
                    {"name": "Name", "width": "5cm"},
                    {"name": "Age", "numeric": true},
                    {"name": "Mail", "hyperlink": "email", "multivalue": true},
                    {"name": "Secret", "visible": false}
                ]
            }"#,
        )
        .unwrap();

        assert!(layout.flat);
        assert_eq!(layout.column_count(), 4);
        assert_eq!(layout.columns[0].width.as_deref(), Some("5cm"));
        assert!(layout.columns[1].numeric);
        assert_eq!(layout.columns[2].hyperlink, HyperlinkKind::Email);
        assert!(!layout.columns[3].visible);
        assert!(layout.columns[0].visible);
    }

    #[test]
    fn test_parse_bare_column_list() {
        let layout = parse_layout(r#"[{"name": "Name"}, {"name": "Room"}]"#).unwrap();
        assert!(!layout.flat);
        assert_eq!(layout.position("Room"), Some(1));

        assert!(parse_layout("[]").is_err());
        assert!(parse_layout(r#"{"columns": [{"name": 3}]}"#).is_err());
    }

    #[test]
    fn test_export_and_inspect() {
        let dir = tempfile::tempdir().unwrap();
        let template = dir.path().join("template.ods");
        {
            let mut zip = zip::ZipWriter::new(std::fs::File::create(&template).unwrap());
            let stored = zip::write::SimpleFileOptions::default()
                .compression_method(zip::CompressionMethod::Stored);
            zip.start_file("mimetype", stored).unwrap();
            zip.write_all(b"application/vnd.oasis.opendocument.spreadsheet")
                .unwrap();
            zip.start_file("content.xml", zip::write::SimpleFileOptions::default())
                .unwrap();
            zip.write_all(
                br#"<office:document-content><office:automatic-styles/><office:body><office:spreadsheet/></office:body></office:document-content>"#,
            )
            .unwrap();
            zip.finish().unwrap();
        }

        let columns = dir.path().join("cols.json");
        std::fs::write(&columns, r#"[{"name": "Name"}, {"name": "Age", "numeric": true}]"#)
            .unwrap();
        let input = dir.path().join("rows.csv");
        std::fs::write(&input, "name,age\nAda,36\nAlan,41\n").unwrap();

        let output = dir.path().join("out.ods");
        let argv: Vec<&OsStr> = vec![
            OsStr::new("dirsheet"),
            OsStr::new("export"),
            OsStr::new("-t"),
            template.as_os_str(),
            OsStr::new("-c"),
            columns.as_os_str(),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
            OsStr::new("-s"),
            OsStr::new("People"),
        ];
        let cli = Cli::try_parse_from(argv).unwrap();
        let Commands::Export(args) = cli.command else {
            panic!("expected export");
        };
        export(&args).unwrap();

        assert_eq!(
            dirsheet::inspect::sheet_names(&output).unwrap(),
            vec!["People"]
        );
        inspect(&output).unwrap();
    }
}
