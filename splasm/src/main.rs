#[macro_use]
extern crate clap;

use clap::Arg;
use std::fs::File;
use std::io::prelude::*;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug)]
enum IOErrorContext {
    ReadInput,
    WriteOutput,
}

#[derive(Debug)]
enum Error {
    Asm(splasm::Error),
    Img(splimg::ImageError),
    Io(std::io::Error, IOErrorContext, PathBuf),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::Io(err, context, path) => writeln!(
                f,
                "{} file \"{}\" failed: {}",
                match context {
                    IOErrorContext::ReadInput => "Reading input",
                    IOErrorContext::WriteOutput => "Writing output",
                },
                path.display(),
                err
            ),
            Error::Img(err) => writeln!(f, "Writing output failed: {}", err),
            Error::Asm(err) => {
                writeln!(f, "Assembling input failed:")?;
                write!(f, "{}", err)
            }
        }
    }
}

fn main() {
    let matches = app_from_crate!()
        .arg(
            Arg::with_name("INPUT")
                .help("Sets the assembly file to use")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::with_name("output")
                .short("o")
                .long("output")
                .takes_value(true)
                .value_name("OUTPUT")
                .help("Sets the image file to write to"),
        )
        .arg(
            Arg::with_name("object")
                .short("b")
                .long("object")
                .takes_value(true)
                .value_name("OBJECT")
                .help("Also writes the object file (INST/SYM lines)"),
        )
        .arg(
            Arg::with_name("meta")
                .short("m")
                .long("meta")
                .takes_value(true)
                .value_name("META")
                .help("Also writes the metadata sidecar (JSON)"),
        )
        .get_matches();

    let input = matches.value_of("INPUT").unwrap();
    let output = matches.value_of("output");
    let object = matches.value_of("object");
    let meta = matches.value_of("meta");

    if let Err(err) = splasm_files(input, output, object, meta) {
        eprintln!("{}", err);
        std::process::exit(1);
    }
}

fn splasm_files(
    input: &str,
    output: Option<&str>,
    object: Option<&str>,
    meta: Option<&str>,
) -> Result<(), Error> {
    let input_path = Path::new(input);

    let input_file = File::open(input_path)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, input_path.to_owned()))?;
    let mut buf_reader = BufReader::new(input_file);
    let mut source = String::new();
    buf_reader
        .read_to_string(&mut source)
        .map_err(|err| Error::Io(err, IOErrorContext::ReadInput, input_path.to_owned()))?;

    let (image, symbols) = splasm::assemble(&source).map_err(|err| {
        Error::Asm(match input_path.to_str() {
            Some(path_str) => err.with_path(path_str),
            None => err,
        })
    })?;

    let output_path: PathBuf = output
        .map(PathBuf::from)
        .unwrap_or_else(|| input_path.with_extension("i"));
    splimg::write_file(&output_path, &image).map_err(Error::Img)?;

    if let Some(object_path) = object {
        splimg::write_object_file(object_path, &image, &symbols).map_err(Error::Img)?;
    }

    if let Some(meta_path) = meta {
        splimg::write_meta_file(meta_path, &image.metadata()).map_err(Error::Img)?;
    }

    Ok(())
}
