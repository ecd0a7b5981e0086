//! # Tfhka CLI
//!
//! Command-line interface for The Factory HKA fiscal printers.
//!
//! ## Usage
//!
//! ```bash
//! # Point the driver at the serial port
//! tfhka set-port /dev/ttyS0
//!
//! # Probe the printer
//! tfhka check
//!
//! # Send a raw printer command
//! tfhka send "iS*Consumidor Final"
//!
//! # Status/error payload, optionally decoded
//! tfhka status
//! tfhka status --codes
//!
//! # Print an X report, close the day with a Z report
//! tfhka report X
//! tfhka report Z
//!
//! # Print an invoice described in a JSON file
//! tfhka invoice factura.json
//!
//! # Serve the JSON API
//! tfhka serve --listen 0.0.0.0:5000
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use tfhka::printer::{DriverConfig, Fiscal, ReportKind};
use tfhka::server::{serve, ServerConfig};
use tfhka::TfhkaError;

/// Tfhka - fiscal printer utility
#[derive(Parser, Debug)]
#[command(name = "tfhka")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the tfinulx driver executable
    #[arg(long, default_value = "./tfinulx")]
    driver: PathBuf,

    /// Directory the driver keeps its result files in
    #[arg(long, default_value = ".")]
    workdir: PathBuf,

    /// Upper bound on one driver invocation, in seconds
    #[arg(long, default_value_t = 30)]
    timeout: u64,

    /// Print an operation trace to stderr when done
    #[arg(long)]
    trace: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Store the serial port name the driver should use
    SetPort {
        /// Port name (e.g. /dev/ttyS0 or COM1)
        port: String,
    },

    /// Check the port and the printer behind it
    Check,

    /// Send a single raw command to the printer
    Send {
        /// Printer command text
        command: String,
    },

    /// Read the printer's status/error payload
    Status {
        /// Decode the payload into numeric codes with descriptions
        #[arg(long)]
        codes: bool,
    },

    /// Execute every line of a plain-text command file
    SendFile {
        /// Command file path
        path: PathBuf,
    },

    /// Upload a status block into a file and print its value
    UploadStatus {
        /// Status type code (e.g. S1)
        code: String,
        /// Output file the driver writes the block into
        file: String,
    },

    /// Upload an X/Z report into a file and print its content
    UploadReport {
        /// Report type code (e.g. U0X)
        code: String,
        /// Output file the driver writes the report into
        file: String,
    },

    /// Print an X or Z fiscal report
    Report {
        /// Report kind: X (running totals) or Z (daily close)
        kind: String,
    },

    /// Print a fiscal invoice from a JSON file
    Invoice {
        /// Invoice description (see the invoice module for the schema)
        path: PathBuf,
    },

    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(long, default_value = "0.0.0.0:5000")]
        listen: String,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), TfhkaError> {
    let cli = Cli::parse();

    let config = DriverConfig::new(&cli.workdir)
        .with_driver(&cli.driver)
        .with_timeout(cli.timeout)
        .with_trace(cli.trace);

    match cli.command {
        Commands::Serve { listen } => {
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(serve(ServerConfig {
                listen_addr: listen,
                driver: config,
            }))
        }
        command => {
            let mut printer = Fiscal::new(config);
            run_command(&mut printer, command)?;

            if let Some(trace) = printer.trace() {
                for entry in trace.entries() {
                    eprintln!("{}", entry);
                }
            }
            Ok(())
        }
    }
}

fn run_command(printer: &mut Fiscal, command: Commands) -> Result<(), TfhkaError> {
    match command {
        Commands::SetPort { port } => {
            printer.set_port(&port)?;
            println!("Port set to {}", port);
        }

        Commands::Check => {
            if printer.check_printer()? {
                println!("Printer connected: {}", printer.last_status());
            } else {
                println!("Printer not reachable: {}", printer.last_status());
            }
        }

        Commands::Send { command } => {
            println!("{}", printer.send_cmd(&command)?);
        }

        Commands::Status { codes } => {
            if codes {
                let report = printer.read_status_codes()?;
                println!("Status {}: {}", report.status, report.status_text());
                println!("Error {}: {}", report.error, report.error_text());
            } else {
                println!("{}", printer.read_status()?);
            }
        }

        Commands::SendFile { path } => {
            println!("{}", printer.send_file(&path)?);
        }

        Commands::UploadStatus { code, file } => {
            println!("{}", printer.upload_status(&code, &file)?);
        }

        Commands::UploadReport { code, file } => {
            println!("{}", printer.upload_report(&code, &file)?);
        }

        Commands::Report { kind } => {
            let kind: ReportKind = kind.parse().map_err(TfhkaError::InvalidInput)?;
            let reply = printer.print_report(kind)?;
            println!("Report {}: {}", kind, reply);
        }

        Commands::Invoice { path } => {
            let json = std::fs::read_to_string(&path)?;
            let invoice = serde_json::from_str(&json)
                .map_err(|e| TfhkaError::InvalidInput(format!("Invalid invoice JSON: {}", e)))?;
            println!("Invoice printed: {}", printer.send_invoice(&invoice)?);
        }

        // Handled in run() before a client is built
        Commands::Serve { .. } => {}
    }

    Ok(())
}
