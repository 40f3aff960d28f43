//! Personal income tax calculator CLI.
//!
//! Computes the tax owed on a gross income under the fixed progressive
//! schedule, optionally with the per-bracket breakdown.

use std::io::Write;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::debug;

use taxcalc::core::calculator::Assessment;
use taxcalc::core::schedule;
use taxcalc::exit_codes;
use taxcalc::facade::{CalculateRequest, PersonalIncomeTaxService, TaxService};
use taxcalc::logging;

#[derive(Parser)]
#[command(
    name = "taxcalc",
    version,
    about = "Progressive personal income tax calculator"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the tax owed on a gross income.
    Compute {
        /// Gross income (negative values owe nothing).
        #[arg(allow_negative_numbers = true)]
        gross_income: f64,
        /// Include deduction, social insurance and per-bracket charges.
        #[arg(short, long)]
        breakdown: bool,
        /// Emit JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
    /// Print the bracket schedule.
    Brackets {
        /// Emit JSON instead of plain text.
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    logging::init();
    if let Err(err) = run() {
        eprintln!("{:#}", err);
        std::process::exit(exit_codes::INVALID);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut out = std::io::stdout().lock();
    match cli.command {
        Command::Compute {
            gross_income,
            breakdown,
            json,
        } => cmd_compute(&mut out, gross_income, breakdown, json),
        Command::Brackets { json } => cmd_brackets(&mut out, json),
    }
}

fn cmd_compute(out: &mut impl Write, gross_income: f64, breakdown: bool, json: bool) -> Result<()> {
    debug!(gross_income, breakdown, json, "compute");
    let service = PersonalIncomeTaxService::new();
    if breakdown {
        let assessment = service.assess(gross_income);
        if json {
            return write_json(out, &assessment);
        }
        return write_assessment(out, &assessment);
    }

    let response = service.handle(CalculateRequest { gross_income });
    if json {
        return write_json(out, &response);
    }
    writeln!(out, "{}", response.tax).context("write tax")?;
    Ok(())
}

fn cmd_brackets(out: &mut impl Write, json: bool) -> Result<()> {
    let rows = schedule::rows();
    if json {
        return write_json(out, &rows);
    }
    for row in rows {
        writeln!(
            out,
            "{:>10} - {:<10} {:>5.0}%",
            row.lower,
            upper_label(row.upper),
            row.rate * 100.0
        )
        .context("write bracket")?;
    }
    Ok(())
}

fn write_assessment(out: &mut impl Write, assessment: &Assessment) -> Result<()> {
    writeln!(out, "gross income:     {}", assessment.gross_income).context("write breakdown")?;
    writeln!(out, "deduction:        {}", assessment.deduction).context("write breakdown")?;
    writeln!(out, "social insurance: {}", assessment.social_insurance)
        .context("write breakdown")?;
    writeln!(out, "taxable income:   {}", assessment.taxable_income)
        .context("write breakdown")?;
    for charge in &assessment.charges {
        writeln!(
            out,
            "  {} - {} @ {}: {} -> {}",
            charge.lower,
            upper_label(charge.upper),
            charge.rate,
            charge.portion,
            charge.amount
        )
        .context("write breakdown")?;
    }
    writeln!(out, "tax:              {}", assessment.tax).context("write breakdown")?;
    Ok(())
}

fn upper_label(upper: Option<f64>) -> String {
    upper.map_or_else(|| "inf".to_string(), |value| value.to_string())
}

/// Serialize `value` to pretty-printed JSON with trailing newline.
fn write_json<T: Serialize>(out: &mut impl Write, value: &T) -> Result<()> {
    let mut payload = serde_json::to_string_pretty(value).context("serialize json")?;
    payload.push('\n');
    out.write_all(payload.as_bytes()).context("write json")?;
    Ok(())
}
