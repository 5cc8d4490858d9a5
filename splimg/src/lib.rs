//! File formats produced by the SPL pipeline.
//!
//! An [`Image`] is the assembled program: an ordered list of 64-bit words
//! plus the optional entry-point and result-address metadata. On disk the
//! image (`.i`) is one `'0'`/`'1'` line per word; the metadata travels in a
//! `.meta.json` sidecar and the simple object format (`.o`) lists the
//! instruction words together with the symbol table.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use std::{error::Error as StdError, fmt};


pub type Word = u64;

/// Label name → instruction index pairs, in declaration order.
pub type SymbolTable = Vec<(String, u32)>;

#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    words: Vec<Word>,
    entry_index: Option<u32>,
    result_addr: Option<u32>,
}

impl Image {
    pub fn from(words: Vec<Word>, entry_index: Option<u32>, result_addr: Option<u32>) -> Image {
        Image {
            words,
            entry_index,
            result_addr,
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words[..]
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Index of the word at which execution should begin.
    pub fn entry_index(&self) -> Option<u32> {
        self.entry_index
    }

    /// Address of the program result in the data range, when one was found.
    pub fn result_addr(&self) -> Option<u32> {
        self.result_addr
    }

    pub fn metadata(&self) -> Metadata {
        Metadata {
            entry_index: self.entry_index,
            result_addr: self.result_addr,
        }
    }

    /// Renders the image as newline-separated 64-bit strings.
    pub fn to_text(&self) -> String {
        let mut out = String::with_capacity(self.words.len() * 65);
        for &word in &self.words {
            out.push_str(&util::word_to_bits(word));
            out.push('\n');
        }
        out
    }

    /// Parses an image from its text rendering. Relocation placeholders are
    /// a loader concern and are rejected here.
    pub fn from_text(text: &str) -> Result<Image, ImageError> {
        let mut words = Vec::new();
        for (i, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let word = util::bits_to_word(line).map_err(|err| ImageError::BadLine {
                line: i,
                source: err,
            })?;
            words.push(word);
        }
        Ok(Image::from(words, None, None))
    }
}

/// Sidecar metadata (`.meta.json`).
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_addr: Option<u32>,
}

#[derive(Debug)]
pub enum ImageError {
    Io(std::io::Error),
    Json(serde_json::Error),
    BadLine { line: usize, source: util::BitsError },
}

impl fmt::Display for ImageError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ImageError::Io(err) => write!(f, "{}", err),
            ImageError::Json(err) => write!(f, "{}", err),
            ImageError::BadLine { line, source } => {
                write!(f, "Image line {}: {}", line, source)
            }
        }
    }
}

impl StdError for ImageError {}

impl From<std::io::Error> for ImageError {
    fn from(err: std::io::Error) -> ImageError {
        ImageError::Io(err)
    }
}

impl From<serde_json::Error> for ImageError {
    fn from(err: serde_json::Error) -> ImageError {
        ImageError::Json(err)
    }
}

pub fn read<R: Read>(reader: &mut R) -> Result<Image, ImageError> {
    let mut text = String::new();
    reader.read_to_string(&mut text)?;
    Image::from_text(&text)
}

pub fn write<W: Write>(writer: &mut W, image: &Image) -> Result<(), ImageError> {
    writer.write_all(image.to_text().as_bytes())?;
    Ok(())
}

pub trait ReadImgExt: Read + Sized {
    fn read_img(&mut self) -> Result<Image, ImageError> {
        read(self)
    }
}

impl<R: Read + Sized> ReadImgExt for R {}

pub trait WriteImgExt: Write + Sized {
    fn write_img(&mut self, image: &Image) -> Result<(), ImageError> {
        write(self, image)
    }
}

impl<W: Write + Sized> WriteImgExt for W {}

pub fn read_file<P: AsRef<Path>>(path: P) -> Result<Image, ImageError> {
    BufReader::new(File::open(path)?).read_img()
}

pub fn write_file<P: AsRef<Path>>(path: P, image: &Image) -> Result<(), ImageError> {
    BufWriter::new(File::create(path)?).write_img(image)
}

/// Renders the simple object format: `INST:` lines in image order followed
/// by one `SYM:` line per label.
pub fn object_text(image: &Image, symbols: &SymbolTable) -> String {
    let mut out = String::new();
    for &word in image.words() {
        out.push_str("INST: ");
        out.push_str(&util::word_to_bits(word));
        out.push('\n');
    }
    for (name, addr) in symbols {
        out.push_str(&format!("SYM: {},{},local\n", name, addr));
    }
    out
}

pub fn write_object_file<P: AsRef<Path>>(
    path: P,
    image: &Image,
    symbols: &SymbolTable,
) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(object_text(image, symbols).as_bytes())?;
    Ok(())
}

pub fn read_meta_file<P: AsRef<Path>>(path: P) -> Result<Metadata, ImageError> {
    let mut text = String::new();
    BufReader::new(File::open(path)?).read_to_string(&mut text)?;
    Ok(serde_json::from_str(&text)?)
}

pub fn write_meta_file<P: AsRef<Path>>(path: P, metadata: &Metadata) -> Result<(), ImageError> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(serde_json::to_string_pretty(metadata)?.as_bytes())?;
    Ok(())
}
