//! sqlexpr - evaluate SQL EXTRACT against a timestamp literal

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use log::{debug, info};
use sqlexpr::config::EvalConfig;
use sqlexpr::expression::{ExecutorContext, Expression, ExpressionUtil};
use sqlexpr::types::{Value, ValueFactory};

/// Extract a date part from a timestamp the way `EXTRACT(part FROM ts)` does
#[derive(ClapParser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Date part to extract (century, decade, year, month, day, dow, doy,
    /// hour, minute, second, millisecond, ...)
    #[arg(short, long)]
    part: String,

    /// Timestamp literal, e.g. "2017-01-01 12:13:14.999999+00"
    #[arg(short, long)]
    timestamp: String,

    /// Use date_trunc instead of extract
    #[arg(long)]
    trunc: bool,

    /// Fold the expression before evaluating it
    #[arg(long)]
    fold: bool,

    /// Report DAY as the civil day of month
    #[arg(long)]
    civil_day: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let timestamp = ValueFactory::cast_as_timestamp(&ValueFactory::get_varchar_value(
        args.timestamp.as_str(),
    ))
    .context("Failed to parse timestamp")?;

    let function = if args.trunc { "date_trunc" } else { "extract" };
    let mut expr = Expression::function(
        function,
        vec![
            Expression::constant(Value::Varchar(args.part.clone())),
            Expression::constant(timestamp),
        ],
    )
    .context("Failed to build expression")?;
    debug!("built {}", expr);

    let context = ExecutorContext::new()
        .with_config(EvalConfig::default().with_civil_day_of_month(args.civil_day));

    if args.fold {
        ExpressionUtil::transform_expression_with_context(None, &mut expr, Some(&context));
        info!("folded to {}", expr);
    }

    let result = expr
        .evaluate(None, None, Some(&context))
        .with_context(|| format!("Failed to evaluate {}", expr))?;

    println!("{}", result);
    Ok(())
}
