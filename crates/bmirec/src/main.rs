//! `bmirec` - CLI for recording BMI calculations
//!
//! This binary provides the command-line front end: calculate and record a
//! BMI, enter one through an interactive form, and view the history.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use clap::Parser;

use bmirec::chart::{render_bar_chart, render_table};
use bmirec::cli::{CalcCommand, Cli, Command, ConfigCommand, HistoryCommand};
use bmirec::config::HistoryFormat;
use bmirec::engine::format_bmi;
use bmirec::{init_logging, Calculation, Calculator, Config, Error};

/// Exit status for rejected form input.
const INVALID_INPUT_EXIT: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match try_main(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn try_main(cli: Cli) -> bmirec::Result<ExitCode> {
    let config = Config::load_from(cli.config.clone())?;

    if let Command::Config(config_cmd) = cli.command {
        return handle_config(&config, config_cmd);
    }

    // Storage failures are fatal: any error opening or writing the store
    // ends the process, after the store has been closed.
    let mut calculator = Calculator::open(&config)?;
    let outcome = run(&calculator, &config, cli.command);
    let closed = calculator.close();

    let code = outcome?;
    closed?;
    Ok(code)
}

fn run(calculator: &Calculator, config: &Config, command: Command) -> bmirec::Result<ExitCode> {
    match command {
        Command::Calc(cmd) => handle_calc(calculator, config, &cmd),
        Command::Form(cmd) => handle_form(calculator, config, cmd.json),
        Command::History(cmd) => {
            handle_history(calculator, config, &cmd)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Status(cmd) => {
            handle_status(calculator, cmd.json)?;
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(_) => Ok(ExitCode::SUCCESS),
    }
}

fn handle_calc(
    calculator: &Calculator,
    config: &Config,
    cmd: &CalcCommand,
) -> bmirec::Result<ExitCode> {
    record(
        calculator,
        config,
        &cmd.name,
        &cmd.height_cm,
        &cmd.weight_kg,
        cmd.json,
    )
}

fn handle_form(calculator: &Calculator, config: &Config, json: bool) -> bmirec::Result<ExitCode> {
    let stdin = io::stdin();
    let mut input = stdin.lock();

    let name = prompt(&mut input, "Name: ")?;
    let height = prompt(&mut input, "Height (cm): ")?;
    let weight = prompt(&mut input, "Weight (kg): ")?;

    record(calculator, config, &name, &height, &weight, json)
}

/// Print a prompt and read one line. End of input reads as an empty field.
fn prompt(input: &mut impl BufRead, label: &str) -> bmirec::Result<String> {
    let mut stdout = io::stdout();
    write!(stdout, "{label}")?;
    stdout.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn record(
    calculator: &Calculator,
    config: &Config,
    name: &str,
    height_cm: &str,
    weight_kg: &str,
    json: bool,
) -> bmirec::Result<ExitCode> {
    match calculator.calculate(name, height_cm, weight_kg) {
        Ok(calc) => {
            print_calculation(&calc, config, json)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(Error::InvalidInput(err)) => {
            eprintln!("Input Error: {err}");
            eprintln!("Please enter a name and positive numerical values for height and weight.");
            Ok(ExitCode::from(INVALID_INPUT_EXIT))
        }
        Err(err) => Err(err),
    }
}

fn print_calculation(calc: &Calculation, config: &Config, json: bool) -> bmirec::Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(calc)?);
    } else {
        println!("BMI: {}", format_bmi(calc.bmi, config.display.precision));
        println!("Category: {}", calc.category);
    }
    Ok(())
}

fn handle_history(
    calculator: &Calculator,
    config: &Config,
    cmd: &HistoryCommand,
) -> bmirec::Result<()> {
    let format = cmd
        .format
        .map_or(config.display.default_history_format, HistoryFormat::from);
    let records = calculator.history()?;

    if format == HistoryFormat::Json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records found.");
        return Ok(());
    }

    match format {
        HistoryFormat::Chart => print!(
            "{}",
            render_bar_chart(
                &records,
                config.display.precision,
                config.display.chart_width
            )
        ),
        HistoryFormat::Table => print!("{}", render_table(&records, config.display.precision)),
        HistoryFormat::Json => {}
    }
    Ok(())
}

fn handle_status(calculator: &Calculator, json: bool) -> bmirec::Result<()> {
    let stats = calculator.stats()?;
    let path = calculator.store().path();

    if json {
        let status = serde_json::json!({
            "database_path": path,
            "total_records": stats.total_records,
            "oldest_record": stats.oldest_record,
            "newest_record": stats.newest_record,
            "db_size_bytes": stats.db_size_bytes,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
    } else {
        let describe = |ts: Option<chrono::DateTime<chrono::Utc>>| {
            ts.map_or_else(|| "-".to_string(), |t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        };
        println!("bmirec status");
        println!("-------------");
        println!("Database:      {}", path.display());
        println!("Records:       {}", stats.total_records);
        println!("Oldest:        {}", describe(stats.oldest_record));
        println!("Newest:        {}", describe(stats.newest_record));
        println!("Size (bytes):  {}", stats.db_size_bytes);
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> bmirec::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!("  Synchronous full:   {}", config.storage.synchronous_full);
                println!();
                println!("[Display]");
                println!("  Precision:          {}", config.display.precision);
                println!("  Chart width:        {}", config.display.chart_width);
                println!(
                    "  History format:     {:?}",
                    config.display.default_history_format
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            if let Err(e) = Config::load_from(Some(path)) {
                eprintln!("Configuration error: {e}");
                return Ok(ExitCode::FAILURE);
            }
            println!("Configuration is valid.");
        }
    }
    Ok(ExitCode::SUCCESS)
}
