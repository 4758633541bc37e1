use dbwrap::config::load_config;
use dbwrap::{Database, DbError, Value};
use serde_json::json;
use std::process::ExitCode;
use tracing::info;

const USAGE: &str = "usage: dbwrap <config.toml> <sql> [arg ...]";

fn main() -> ExitCode {
    // Initialize the logging system using tracing subscriber
    tracing_subscriber::fmt().with_writer(std::io::stderr).init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 {
        eprintln!("{}", USAGE);
        return ExitCode::from(2);
    }

    match run(&args[1], &args[2], &args[3..]) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(config_path: &str, sql: &str, raw_args: &[String]) -> Result<String, Box<dyn std::error::Error>> {
    let config = load_config(config_path)?;
    let mut db = Database::from_config(&config)?;
    info!(dsn = %db.dsn(), "connected");

    let args: Vec<Value> = raw_args.iter().map(|raw| parse_arg(raw)).collect();
    let result = db.run(sql, &args)?;
    if let Some(failure) = result.take_error() {
        return Err(DbError::StatementExecutionFailed(failure).into());
    }

    let output = if result.column_count() == 0 {
        json!({ "row_count": result.row_count() })
    } else {
        serde_json::to_value(result.fetch_all())?
    };
    db.close();

    Ok(serde_json::to_string_pretty(&output)?)
}

/// Integers bind as integers, everything else as text
fn parse_arg(raw: &str) -> Value {
    raw.parse::<i64>()
        .map(Value::Int)
        .unwrap_or_else(|_| Value::from(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_arg() {
        assert_eq!(parse_arg("5"), Value::Int(5));
        assert_eq!(parse_arg("-12"), Value::Int(-12));
        assert_eq!(parse_arg("5a"), Value::Text("5a".to_string()));
        assert_eq!(parse_arg(""), Value::Text(String::new()));
    }
}
