use std::path::{Path, PathBuf};
use std::process::exit;

use clap::{arg, command, value_parser, ArgAction, Command};
use rayon::prelude::*;

use omr_grader::{
    grade_sheet, load_grading_options, scoring::QuestionFill, AnswerKey, GradeSheetError,
    GradedSheet, GradingOptions, InterpretOptions,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s {
            "csv" => OutputFormat::Csv,
            "json" => OutputFormat::Json,
            _ => OutputFormat::Table,
        }
    }
}

fn main() {
    pretty_env_logger::init_custom_env("LOG");

    let matches = cli().get_matches();
    let debug = matches.get_flag("debug");
    let key_text = matches.get_one::<String>("key").expect("key is required");
    let format = OutputFormat::from(
        matches
            .get_one::<String>("format")
            .map(String::as_str)
            .unwrap_or("table"),
    );
    let image_paths = matches
        .get_many::<PathBuf>("images")
        .expect("at least one image path is required")
        .cloned()
        .collect::<Vec<PathBuf>>();

    let grading = match matches.get_one::<PathBuf>("config") {
        Some(config_path) => match load_grading_options(config_path) {
            Ok(options) => options,
            Err(e) => {
                eprintln!("Error: {}", e);
                exit(1);
            }
        },
        None => GradingOptions::default(),
    };

    let key = match AnswerKey::parse(key_text, grading.options_per_question, grading.max_key_length)
    {
        Ok(key) => key,
        Err(e) => {
            eprintln!("Error parsing answer key: {}", e);
            exit(1);
        }
    };

    let options = InterpretOptions { debug, grading };

    let results = image_paths
        .par_iter()
        .map(|path| (path, grade_sheet(path, &key, &options)))
        .collect::<Vec<(&PathBuf, Result<GradedSheet, GradeSheetError>)>>();

    let mut failed = false;
    let show_path = results.len() > 1;
    for (path, result) in results {
        match result {
            Ok(graded) => print_report(path, &graded, format, show_path),
            Err(e) => {
                eprintln!("Error: {}", e);
                failed = true;
            }
        }
    }

    if failed {
        exit(1);
    }
}

fn print_report(path: &Path, graded: &GradedSheet, format: OutputFormat, show_path: bool) {
    match format {
        OutputFormat::Table => {
            if show_path {
                println!("{}", path.display());
            }
            print!("{}", graded.report.to_table());
        }
        OutputFormat::Csv => {
            if show_path {
                println!("# {}", path.display());
            }
            print!("{}", graded.report.to_csv());
        }
        OutputFormat::Json => match serde_json::to_string(&serde_json::json!({
            "path": path,
            "report": graded.report,
            "fills": graded
                .scored_questions
                .iter()
                .map(QuestionFill::from)
                .collect::<Vec<QuestionFill>>(),
        })) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("Error serializing report: {}", e),
        },
    }
}

#[allow(clippy::cognitive_complexity)]
fn cli() -> Command {
    command!()
        .arg(arg!(-k --key <KEY> "Answer key, one letter per question (e.g. ABCDABCD)").required(true))
        .arg(
            arg!(-c --config <PATH> "Path to a JSON file of grading options")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            arg!(-f --format <FORMAT> "Output format")
                .value_parser(["table", "csv", "json"])
                .default_value("table"),
        )
        .arg(arg!(-d --debug "Write debug images next to each sheet"))
        .arg(
            arg!(images: <IMAGE> "Paths to scanned answer sheets")
                .required(true)
                .num_args(1..)
                .action(ArgAction::Append)
                .value_parser(value_parser!(PathBuf)),
        )
}
