// src/main.rs

use cellmetrics::{
    config::{OutputFormat, CONFIG},
    metrics::{cell_height, cell_width, resolve},
    os::winsize::{probe, query, Probe, ProbeOrigin},
    report::{Field, Report},
};

use anyhow::Context;
use clap::Parser;
use log::{debug, info};
use std::os::unix::io::RawFd;

/// Print the pixel size of the terminal's font cell.
#[derive(Debug, Parser)]
#[command(name = "cellmetrics", version)]
struct Cli {
    /// Query this file descriptor instead of probing stdin, stdout, stderr and /dev/tty.
    #[arg(long)]
    fd: Option<RawFd>,
    /// Print the whole report as JSON.
    #[arg(long)]
    json: bool,
    /// Print the cell width instead of the height.
    #[arg(long, conflicts_with = "both")]
    width: bool,
    /// Print the cell as WIDTHxHEIGHT.
    #[arg(long)]
    both: bool,
    /// Fail instead of falling back when the terminal reports no pixel size.
    #[arg(long)]
    strict: bool,
    /// Override the configured fallback cell height.
    #[arg(long, value_name = "PX")]
    fallback_height: Option<u16>,
    /// Override the configured fallback cell width.
    #[arg(long, value_name = "PX")]
    fallback_width: Option<u16>,
}

impl Cli {
    fn field(&self) -> Field {
        if self.both {
            Field::Both
        } else if self.width {
            Field::Width
        } else {
            Field::Height
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<String> {
    let found = match cli.fd {
        Some(fd) => Probe {
            origin: ProbeOrigin::Explicit(fd),
            size: query(fd)?,
        },
        None => probe().context("no terminal to query")?,
    };
    info!("Window size from {}: {:?}", found.origin, found.size);

    let field = cli.field();
    if cli.strict {
        if cli.json || field != Field::Width {
            cell_height(&found.size).context("failed to determine font cell height")?;
        }
        if cli.json || field != Field::Height {
            cell_width(&found.size).context("failed to determine font cell width")?;
        }
    }

    let mut fallback = CONFIG.fallback;
    if let Some(h) = cli.fallback_height {
        fallback.cell_height_px = h;
    }
    if let Some(w) = cli.fallback_width {
        fallback.cell_width_px = w;
    }
    debug!("Fallback cell: {:?}", fallback);

    let resolved = resolve(&found.size, &fallback);
    let format = if cli.json {
        OutputFormat::Json
    } else {
        CONFIG.output.format
    };

    Report::new(&found, &resolved).render(format, field)
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_micros()
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { 1 } else { 0 };
            let _ = e.print();
            std::process::exit(code);
        }
    };
    debug!("Arguments: {:?}", cli);

    match run(&cli) {
        Ok(output) => println!("{}", output),
        Err(e) => {
            eprintln!("cellmetrics: {:#}", e);
            std::process::exit(1);
        }
    }
}
