//! `interpreter <input_file> [-visualize | -visualize=ast | -visualize=st]`.
//! Reads the source file, drives the pipeline, prints whatever it produced,
//! and reports any stage failure as a descriptive message on stderr with
//! exit code 1. The `-visualize`/`-visualize=ast`/`-visualize=st` flag
//! writes a DOT file alongside the source instead of rendering a PNG.

use std::fs;
use std::process;

use log::{debug, info};
use rpal::Pipeline;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisualizeMode {
    Ast,
    St,
}

struct Config {
    input_path: String,
    visualize: Option<VisualizeMode>,
}

fn parse_args(args: &[String]) -> Result<Config, String> {
    let Some(input_path) = args.get(1) else {
        return Err("missing <input_file>".to_string());
    };

    let mut visualize = None;
    for extra in &args[2..] {
        visualize = Some(match extra.as_str() {
            "-visualize" | "-visualize=ast" => VisualizeMode::Ast,
            "-visualize=st" => VisualizeMode::St,
            other => return Err(format!("unrecognized option: {other}")),
        });
    }

    Ok(Config {
        input_path: input_path.clone(),
        visualize,
    })
}

fn usage(program: &str) {
    eprintln!("Usage: {program} <input_file> [-visualize | -visualize=ast | -visualize=st]");
}

fn main() {
    simple_logger::init_with_level(log::Level::Warn).unwrap();

    let args: Vec<String> = std::env::args().collect();
    let program = args.first().map(String::as_str).unwrap_or("interpreter");

    let config = match parse_args(&args) {
        Ok(config) => config,
        Err(msg) => {
            eprintln!("{program}: {msg}");
            usage(program);
            process::exit(1);
        }
    };

    let source = match fs::read_to_string(&config.input_path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{}: cannot read '{}': {}", program, config.input_path, e);
            process::exit(1);
        }
    };
    debug!("loaded '{}' ({} bytes)", config.input_path, source.len());

    let pipeline = match Pipeline::build(&source) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("{program}: {e}");
            process::exit(1);
        }
    };
    debug!(
        "compiled {} control structure(s)",
        pipeline.control_structures.len()
    );

    if let Some(mode) = config.visualize {
        let (suffix, tree) = match mode {
            VisualizeMode::Ast => ("ast", &pipeline.ast),
            VisualizeMode::St => ("st", &pipeline.st),
        };
        let dot_path = format!("{}.{}.dot", config.input_path, suffix);
        if let Err(e) = fs::write(&dot_path, tree.to_dot()) {
            eprintln!("{program}: cannot write '{dot_path}': {e}");
            process::exit(1);
        }
        eprintln!("DOT written to: {dot_path}");
    }

    match pipeline.evaluate() {
        Ok(output) => {
            print!("{output}");
            info!("evaluation complete");
        }
        Err(e) => {
            eprintln!("{program}: {e}");
            process::exit(1);
        }
    }
}
