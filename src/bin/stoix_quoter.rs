//! Stoix quoting tool
//!
//! Command-line front end for the fixed-point Avellaneda-Stoikov core:
//! - Bucket table export (table, CSV or JSON)
//! - Reservation-price severity scenarios
//! - One-off skew, half-spread and quote calculations
//! - TOML config file support
//! - Structured logging with tracing

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;

use stoix_quoter::stoicov::{
    format_decimal, format_decimal_half_even, format_decimal_trimmed, format_signed_decimal,
    format_skew, parse_decimal,
};
use stoix_quoter::{
    calculate_half_spread_with_inventory, calculate_skew, severity_scenarios, standard_buckets,
    BucketSummary, Inventory, LogFormat, Quote, QuoterConfig, RiskyMode, ScenarioRow,
    StoicovQuoter, SwapDirection, TradeDescriptor, BPS_E5_DECIMALS, PPB_DECIMALS, U256,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser)]
#[command(name = "stoix_quoter")]
#[command(version, about = "Stoix Avellaneda-Stoikov quoting tool", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "stoix_quoter.toml", global = true)]
    config: PathBuf,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Output format for logs (pretty, json, compact)
    #[arg(long, global = true)]
    log_format: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the standard bucket ladder with its spread terms
    Table {
        /// Gamma scale applied to every bucket
        #[arg(long, default_value = "1")]
        gamma_scale: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Reservation-price stress grid for one level: σ × {0.5, 1, 2},
    /// gamma scale {0, 0.5, 1}, severity {0, 0.5, 1}
    Scenario {
        /// Target level in bps
        #[arg(long, default_value = "30")]
        level_bps: String,
        /// Horizon τ
        #[arg(long, default_value = "1")]
        tau: String,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Skew delta caused by a trade (PPB)
    Skew {
        #[command(flatten)]
        trade: TradeArgs,
        /// Risk mode (defaults to the config file's)
        #[arg(long)]
        mode: Option<RiskyMode>,
    },
    /// Half-spread from explicit terms (bps×1e5)
    Spread {
        #[arg(long, value_parser = parse_u256)]
        inv_k: U256,
        #[arg(long, value_parser = parse_u256)]
        term2: U256,
        #[arg(long, value_parser = parse_u256)]
        term3: U256,
        /// Skew in PPB, within [-1e9, 1e9]
        #[arg(long, allow_hyphen_values = true)]
        skew: i64,
        /// γσ² in PPB
        #[arg(long, value_parser = parse_u256)]
        gamma_stdev2: U256,
    },
    /// Full quote using the configured bucket and risk mode
    Quote {
        #[command(flatten)]
        trade: TradeArgs,
    },
    /// Generate a sample config file
    GenerateConfig {
        /// Output file path
        #[arg(short, long, default_value = "stoix_quoter.toml")]
        output: PathBuf,
    },
}

#[derive(clap::Args)]
struct TradeArgs {
    /// Pool holdings of asset0, native units
    #[arg(long, value_parser = parse_u256)]
    inventory0: U256,
    /// Pool holdings of asset1, native units
    #[arg(long, value_parser = parse_u256)]
    inventory1: U256,
    /// Trade size in the input asset's native units
    #[arg(long, value_parser = parse_u256)]
    amount: U256,
    /// Mid price, asset1 per asset0, PPB
    #[arg(long, value_parser = parse_u256)]
    mid_price_ppb: U256,
    /// Trader supplies asset1 instead of asset0
    #[arg(long)]
    one_for_zero: bool,
}

impl TradeArgs {
    fn inventory(&self) -> Inventory {
        Inventory::new(self.inventory0, self.inventory1)
    }

    fn trade(&self) -> TradeDescriptor {
        TradeDescriptor::new(self.amount, SwapDirection::from_zero_for_one(!self.one_for_zero))
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn parse_u256(s: &str) -> Result<U256, String> {
    U256::from_str_radix(s.trim(), 10).map_err(|e| format!("invalid unsigned integer '{s}': {e}"))
}

// ============================================================================
// Main
// ============================================================================

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if let Commands::GenerateConfig { output } = &cli.command {
        return generate_sample_config(output);
    }

    let config = QuoterConfig::load(&cli.config)?;
    setup_logging(&config, &cli)?;

    match &cli.command {
        Commands::Table {
            gamma_scale,
            format,
            output,
        } => {
            let scale = parse_decimal(gamma_scale, PPB_DECIMALS)?;
            let rows = standard_buckets(scale)?
                .iter()
                .map(|bucket| bucket.summary().map(|s| TableRow::from_summary(&s)))
                .collect::<Result<Vec<_>, _>>()?;
            let rendered = match format {
                OutputFormat::Table => render_table(&rows),
                OutputFormat::Csv => render_csv(&HEADERS, rows.iter().map(TableRow::cells)),
                OutputFormat::Json => serde_json::to_string_pretty(&rows)?,
            };
            emit(rendered, output.as_deref(), rows.len(), "bucket table")?;
        }
        Commands::Scenario {
            level_bps,
            tau,
            format,
            output,
        } => {
            let level = parse_decimal(level_bps, BPS_E5_DECIMALS)?;
            let tau = parse_decimal(tau, PPB_DECIMALS)?;
            let rows = severity_scenarios(level, tau)?;
            let rendered = match format {
                OutputFormat::Table => render_scenarios(&rows),
                OutputFormat::Csv => {
                    render_csv(&SCENARIO_HEADERS, rows.iter().map(scenario_cells))
                }
                OutputFormat::Json => serde_json::to_string_pretty(&rows)?,
            };
            emit(rendered, output.as_deref(), rows.len(), "scenario table")?;
        }
        Commands::Skew { trade, mode } => {
            let mode = mode.unwrap_or(config.quoter.risky_mode);
            let skew = calculate_skew(
                trade.inventory0,
                trade.inventory1,
                trade.amount,
                !trade.one_for_zero,
                mode,
                trade.mid_price_ppb,
            )?;
            println!("skew_ppb = {skew}");
            println!("skew     = {}", format_skew(skew));
        }
        Commands::Spread {
            inv_k,
            term2,
            term3,
            skew,
            gamma_stdev2,
        } => {
            let half = calculate_half_spread_with_inventory(*inv_k, *term2, *term3, *skew, *gamma_stdev2)?;
            println!("half_spread_bps_e5 = {half}");
            println!("half_spread_bps    = {}", format_decimal(half, BPS_E5_DECIMALS, BPS_E5_DECIMALS));
        }
        Commands::Quote { trade } => {
            let quoter = StoicovQuoter::from_config(&config)?;
            let quote = quoter.quote(trade.inventory(), trade.trade(), trade.mid_price_ppb)?;
            let report = QuoteReport::new(&quoter, quote);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Commands::GenerateConfig { output } => generate_sample_config(output)?,
    }

    Ok(())
}

// ============================================================================
// Table rendering
// ============================================================================

#[derive(Debug, Serialize)]
struct TableRow {
    min_target: String,
    std: String,
    k: String,
    gamma: String,
    inv_k: String,
    term2: String,
    term3: String,
    optimal_half_spread: String,
    q: String,
    q_gamma_std2: String,
    spread: String,
}

const HEADERS: [&str; 11] = [
    "Min Target",
    "stD",
    "k",
    "gamma",
    "1/k",
    "+gam/(2*k^2)",
    "+(gam*stD^2)/2",
    "optimal half spread",
    "q (inventory)",
    "q*gam*stD^2",
    "SPREAD",
];

/// Column of `SPREAD`, printed with thousands separators in table output.
const SPREAD_COLUMN: usize = 10;

impl TableRow {
    fn from_summary(s: &BucketSummary) -> Self {
        let bps = |v: U256| format_decimal_half_even(v, BPS_E5_DECIMALS, 2);
        Self {
            min_target: format_decimal_trimmed(s.bucket.level, BPS_E5_DECIMALS),
            std: format_decimal_trimmed(s.bucket.stdev, BPS_E5_DECIMALS),
            k: format_decimal_half_even(s.k, PPB_DECIMALS, 6),
            gamma: format_decimal_half_even(s.gamma, PPB_DECIMALS, 6),
            inv_k: bps(s.terms.inv_k),
            term2: bps(s.terms.term2),
            term3: bps(s.terms.term3),
            optimal_half_spread: bps(s.optimal_half_spread),
            q: "1".to_string(),
            q_gamma_std2: format_decimal_half_even(s.terms.gamma_stdev2, PPB_DECIMALS, 0),
            spread: bps(s.spread),
        }
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.min_target.clone(),
            self.std.clone(),
            self.k.clone(),
            self.gamma.clone(),
            self.inv_k.clone(),
            self.term2.clone(),
            self.term3.clone(),
            self.optimal_half_spread.clone(),
            self.q.clone(),
            self.q_gamma_std2.clone(),
            self.spread.clone(),
        ]
    }
}

const SCENARIO_HEADERS: [&str; 9] = [
    "level_bps",
    "σ_bps",
    "γ_scale",
    "s",
    "δ*_bps",
    "shift_bps",
    "bid_off_bps",
    "ask_off_bps",
    "spread_bps",
];

fn scenario_cells(row: &ScenarioRow) -> Vec<String> {
    let bps = |v| format_decimal_half_even(v, BPS_E5_DECIMALS, 2);
    let signed_bps = |v| format_signed_decimal(v, BPS_E5_DECIMALS, 2);
    vec![
        format_decimal_half_even(row.level, BPS_E5_DECIMALS, 1),
        format_decimal_half_even(row.stdev, BPS_E5_DECIMALS, 1),
        format_decimal_half_even(row.gamma_scale, PPB_DECIMALS, 2),
        format_decimal_half_even(row.severity, PPB_DECIMALS, 1),
        bps(row.half_spread),
        signed_bps(row.shift),
        signed_bps(row.bid_offset),
        signed_bps(row.ask_offset),
        bps(row.spread),
    ]
}

#[derive(Clone, Copy)]
enum Align {
    Left,
    Right,
}

fn pad_row<'a>(cells: impl Iterator<Item = &'a str>, widths: &[usize], align: Align) -> String {
    cells
        .zip(widths)
        .map(|(cell, &width)| match align {
            Align::Left => format!("{cell:<width$}"),
            Align::Right => format!("{cell:>width$}"),
        })
        .collect::<Vec<_>>()
        .join(" | ")
}

/// Pad every column to its widest cell and join with ` | `.
fn render_columns(headers: &[&str], rows: &[Vec<String>], align: Align) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut lines = vec![
        pad_row(headers.iter().copied(), &widths, align),
        widths.iter().map(|&w| "-".repeat(w)).collect::<Vec<_>>().join("-+-"),
    ];
    lines.extend(
        rows.iter()
            .map(|row| pad_row(row.iter().map(String::as_str), &widths, align)),
    );
    lines.join("\n")
}

fn render_table(rows: &[TableRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            let mut cells = row.cells();
            cells[SPREAD_COLUMN] = group_thousands(&cells[SPREAD_COLUMN]);
            cells
        })
        .collect();
    render_columns(&HEADERS, &cells, Align::Right)
}

fn render_scenarios(rows: &[ScenarioRow]) -> String {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| {
            scenario_cells(row)
                .into_iter()
                .enumerate()
                // bps columns get thousands separators
                .map(|(i, cell)| if i >= 4 { group_thousands(&cell) } else { cell })
                .collect()
        })
        .collect();
    render_columns(&SCENARIO_HEADERS, &cells, Align::Left)
}

fn render_csv(headers: &[&str], rows: impl Iterator<Item = Vec<String>>) -> String {
    let mut lines = vec![headers.join(",")];
    lines.extend(rows.map(|cells| cells.join(",")));
    lines.join("\n")
}

/// `1234567.50` → `1,234,567.50`. Sign and fraction are kept as-is.
fn group_thousands(number: &str) -> String {
    let (sign, unsigned) = match number.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", number),
    };
    let (int_part, frac_part) = match unsigned.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (unsigned, None),
    };
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    match frac_part {
        Some(frac) => format!("{sign}{grouped}.{frac}"),
        None => format!("{sign}{grouped}"),
    }
}

/// Quote plus the risk mode it was priced under.
#[derive(Debug, Serialize)]
struct QuoteReport {
    risky_mode: RiskyMode,
    reservation: bool,
    #[serde(flatten)]
    quote: Quote,
}

impl QuoteReport {
    fn new(quoter: &StoicovQuoter, quote: Quote) -> Self {
        Self {
            risky_mode: quoter.risky_mode(),
            reservation: quoter.reservation().is_some(),
            quote,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn emit(
    rendered: String,
    output: Option<&Path>,
    rows: usize,
    what: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    match output {
        Some(path) => {
            std::fs::write(path, rendered)?;
            info!(path = %path.display(), rows, what, "Wrote output");
        }
        None => println!("{rendered}"),
    }
    Ok(())
}

fn setup_logging(config: &QuoterConfig, cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    let level = cli.log_level.as_ref().unwrap_or(&config.logging.level);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    let format = cli
        .log_format
        .as_deref()
        .unwrap_or(match config.logging.format {
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
            LogFormat::Pretty => "pretty",
        });

    // Logs go to stderr so table and quote output stays clean on stdout
    match format {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .json()
                .init();
        }
        "compact" => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .compact()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .with_target(false)
                .init();
        }
    }

    Ok(())
}

fn generate_sample_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let sample = QuoterConfig::default();
    let content = sample.to_toml_string()?;

    let with_comments = format!(
        r#"# Stoix quoter configuration
# See: cargo run --bin stoix_quoter -- --help
#
# risky_mode: neutral | risky0 | risky1
# bucket values are decimal strings (bps for level/stdev, plain ratio for gamma_scale)
#
# Uncomment to centre quotes on the inventory-shifted reservation price:
# [quoter.reservation]
# inventory_mode = "value_neutral"   # no_inventory | risky0_zero | risky1_zero | value_neutral
# asset0_decimals = 18
# tau = "1"

{}"#,
        content
    );

    std::fs::write(path, with_comments)?;
    println!("Sample config written to: {}", path.display());
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use stoix_quoter::{InventoryMode, ReservationParams, SpreadTerms, PPB};

    const STANDARD_LEVELS: usize = 16;

    fn standard_rows() -> Vec<TableRow> {
        standard_buckets(U256::from(PPB))
            .unwrap()
            .iter()
            .map(|bucket| TableRow::from_summary(&bucket.summary().unwrap()))
            .collect()
    }

    fn split_row(line: &str) -> Vec<&str> {
        line.split(" | ").map(str::trim).collect()
    }

    #[test]
    fn test_table_header_row() {
        let rendered = render_table(&standard_rows());
        let mut lines = rendered.lines();
        assert_eq!(split_row(lines.next().unwrap()), HEADERS);
        assert!(lines.next().unwrap().chars().all(|c| c == '-' || c == '+'));
        assert_eq!(rendered.lines().count(), 2 + STANDARD_LEVELS);
    }

    #[test]
    fn test_table_half_bps_row() {
        let rows = standard_rows();
        assert_eq!(
            rows[0].cells(),
            ["0.5", "0.5", "2.000000", "2.000000", "0.50", "0.25", "0.25", "0.50", "1", "0", "1.00"]
        );
    }

    #[test]
    fn test_table_500_bps_row() {
        let rows = standard_rows();
        assert_eq!(
            rows[15].cells(),
            [
                "500", "500", "0.002000", "0.002000", "500.00", "250.00", "250.00", "500.00", "1",
                "500", "1000.00"
            ]
        );
        let rendered = render_table(&rows);
        let last = rendered.lines().last().unwrap();
        assert_eq!(split_row(last)[0], "500");
        assert_eq!(split_row(last)[SPREAD_COLUMN], "1,000.00");
    }

    #[test]
    fn test_table_trims_level_and_rounds_q_gamma_half_even() {
        let rows = standard_rows();
        // 2.5 bps level: γσ² = 2.5 prints as 2, 7.5 as 8
        assert_eq!(rows[2].min_target, "2.5");
        assert_eq!(rows[2].q_gamma_std2, "2");
        assert_eq!(rows[4].min_target, "7.5");
        assert_eq!(rows[4].q_gamma_std2, "8");
        assert_eq!(rows[8].min_target, "30");
    }

    #[test]
    fn test_csv_output() {
        let rows = standard_rows();
        let csv = render_csv(&HEADERS, rows.iter().map(TableRow::cells));
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[0],
            "Min Target,stD,k,gamma,1/k,+gam/(2*k^2),+(gam*stD^2)/2,optimal half spread,\
             q (inventory),q*gam*stD^2,SPREAD"
        );
        assert_eq!(lines.len(), 1 + STANDARD_LEVELS);
        for line in &lines {
            assert_eq!(line.split(',').count(), HEADERS.len());
        }
    }

    #[test]
    fn test_json_output() {
        let json = serde_json::to_string_pretty(&standard_rows()).unwrap();
        let parsed: Vec<serde_json::Value> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.len(), STANDARD_LEVELS);
        assert_eq!(parsed[0]["min_target"], "0.5");
        assert_eq!(parsed[15]["spread"], "1000.00");
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands("1000.00"), "1,000.00");
        assert_eq!(group_thousands("-1234567.5"), "-1,234,567.5");
        assert_eq!(group_thousands("999"), "999");
        assert_eq!(group_thousands("-15.00"), "-15.00");
        assert_eq!(group_thousands("100000"), "100,000");
    }

    fn scenario_rows() -> Vec<ScenarioRow> {
        severity_scenarios(U256::from(3_000_000u64), U256::from(PPB)).unwrap()
    }

    #[test]
    fn test_scenario_cells() {
        let rows = scenario_rows();
        assert_eq!(
            scenario_cells(&rows[0]),
            ["30.0", "15.0", "0.00", "0.0", "30.00", "0.00", "-30.00", "30.00", "60.00"]
        );
        // σ = 60, full gamma, full severity: δ* = 30 − 15 + 60
        assert_eq!(
            scenario_cells(&rows[26]),
            ["30.0", "60.0", "1.00", "1.0", "75.00", "-60.00", "-135.00", "15.00", "150.00"]
        );
    }

    #[test]
    fn test_scenario_table_layout() {
        let rendered = render_scenarios(&scenario_rows());
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 2 + 27);
        assert_eq!(split_row(lines[0]), SCENARIO_HEADERS);
        assert!(lines[2].starts_with("30.0 "));
        // Columns line up
        let bars = |line: &str| {
            line.match_indices(" | ")
                .map(|(i, _)| line[..i].chars().count())
                .collect::<Vec<_>>()
        };
        assert_eq!(bars(lines[0]), bars(lines[28]));
    }

    #[test]
    fn test_scenario_csv_and_json() {
        let rows = scenario_rows();
        let csv = render_csv(&SCENARIO_HEADERS, rows.iter().map(scenario_cells));
        assert_eq!(csv.lines().count(), 28);
        assert!(csv.lines().all(|l| l.split(',').count() == SCENARIO_HEADERS.len()));

        let parsed: Vec<serde_json::Value> =
            serde_json::from_str(&serde_json::to_string(&rows).unwrap()).unwrap();
        assert_eq!(parsed.len(), 27);
    }

    #[test]
    fn test_quote_report_serialization() {
        let terms = SpreadTerms::new(
            U256::from(50_000u64),
            U256::from(25_000u64),
            U256::from(100_000u64),
            U256::from(2_000_000_000u64),
        );
        let e18 = U256::from(1_000_000_000_000_000_000u128);
        let quoter = StoicovQuoter::new(terms, RiskyMode::Neutral).with_reservation(
            ReservationParams::new(InventoryMode::ValueNeutral, 18, U256::from(PPB))
                .unwrap(),
        );
        let quote = quoter
            .quote(
                Inventory::new(U256::from(20u64) * e18, U256::from(10_000u64) * e18),
                TradeDescriptor::zero_for_one(e18),
                U256::from(2_000_000_000_000u64),
            )
            .unwrap();
        let value = serde_json::to_value(QuoteReport::new(&quoter, quote)).unwrap();
        assert_eq!(value["risky_mode"], "neutral");
        assert_eq!(value["reservation"], true);
        assert_eq!(value["half_spread"], "141000");
        assert_eq!(value["reservation_price_ppb"], "1994000000000");
    }
}
