#[macro_use]
extern crate clap;

use clap::Arg;
use std::path::Path;

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("SPL or assembly source file to run")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("address")
                .short("a")
                .long("address")
                .takes_value(true)
                .value_name("ADDRESS")
                .default_value("0")
                .help("Load address inside the code range"),
        )
        .arg(
            Arg::with_name("emit")
                .short("e")
                .long("emit")
                .takes_value(true)
                .value_name("BASENAME")
                .help("Also writes the .s/.i/.o/.meta.json artifacts"),
        )
        .arg(
            Arg::with_name("result")
                .short("r")
                .long("result")
                .help("Prints the memory word at the program's result address"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let base = match value_t!(matches.value_of("address"), u32) {
        Ok(base) => base,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    let stdin_lines = move || {
        let mut line = String::new();
        match std::io::stdin().read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => Some(line.trim_end_matches('\n').to_string()),
        }
    };

    let session = match spl::run_file(Path::new(input), base, stdin_lines) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    print!("{}", session.output);

    if let Some(basename) = matches.value_of("emit") {
        if let Err(err) = emit_artifacts(basename, &session) {
            eprintln!("Writing artifacts failed: {}", err);
            std::process::exit(1);
        }
    }

    if matches.is_present("result") {
        if let Some(address) = session.image.result_addr() {
            println!(
                "M[{}] = {}",
                address,
                session.driver.machine().memory().peek(address)
            );
        } else {
            eprintln!("No result address was recorded for this program");
        }
    }
}

fn emit_artifacts(basename: &str, session: &spl::Session) -> Result<(), splimg::ImageError> {
    std::fs::write(format!("{}.pp", basename), &session.preprocessed)?;
    std::fs::write(format!("{}.s", basename), &session.assembly)?;
    splimg::write_file(format!("{}.i", basename), &session.image)?;
    splimg::write_object_file(format!("{}.o", basename), &session.image, &session.symbols)?;
    splimg::write_meta_file(format!("{}.meta.json", basename), &session.image.metadata())
}
