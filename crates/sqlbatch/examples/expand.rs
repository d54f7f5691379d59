//! Expands a script file and prints each batch.
//!
//! ```text
//! cargo run --example expand -- deploy.sql Schema=dbo Env=staging
//! ```

use std::{env, fs, process::ExitCode};

use sqlbatch::{Preprocessor, PreprocessorOptions};

fn main() -> ExitCode {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: expand <script.sql> [name=value ...]");
        return ExitCode::FAILURE;
    };
    let script = match fs::read_to_string(&path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("{path}: {e}");
            return ExitCode::FAILURE;
        }
    };

    let mut pre = Preprocessor::new(PreprocessorOptions::default());
    for def in env::args().skip(2) {
        if let Some((name, value)) = def.split_once('=') {
            pre.variables_mut().set(name, value);
        }
    }

    for (i, batch) in pre.process(&script).enumerate() {
        match batch {
            Ok(b) => println!("-- batch {}\n{b}", i + 1),
            Err(e) => {
                eprintln!("error: {e}");
                return ExitCode::FAILURE;
            }
        }
    }
    ExitCode::SUCCESS
}
