//! Macro expansion and file inclusion.
//!
//! Two directives are recognized at the start of a line:
//!
//! - `#define NAME replacement` records a substitution applied to every
//!   later occurrence of `NAME` on identifier boundaries (so `NUM1` never
//!   fires inside `NUM10`). Redefinition is allowed; the last one wins.
//! - `#include "file"` / `#include <file>` splices another file in,
//!   preprocessed under the same define environment. Paths resolve against
//!   the including file's directory first, then the library directory.
//!   A file already included once is skipped, which also breaks cycles.
//!
//! Directive lines stay in the output as `#`-tagged trace comments, so the
//! expanded text is stable under a second preprocessor run.

use crate::error::PreprocessorError;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

struct Preprocessor {
    defines: Vec<(String, String)>,
    included: HashSet<PathBuf>,
    lib_dir: Option<PathBuf>,
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

// Word-boundary textual substitution.
fn substitute(line: &str, name: &str, value: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let bytes = line.as_bytes();
    let mut i = 0;
    while i < line.len() {
        if line[i..].starts_with(name) {
            let before_ok = i == 0 || !is_ident_char(bytes[i - 1] as char);
            let end = i + name.len();
            let after_ok = end >= line.len() || !is_ident_char(bytes[end] as char);
            if before_ok && after_ok {
                out.push_str(value);
                i = end;
                continue;
            }
        }
        let c = line[i..].chars().next().unwrap();
        out.push(c);
        i += c.len_utf8();
    }
    out
}

impl Preprocessor {
    fn define(&mut self, name: &str, value: &str) {
        if let Some(entry) = self.defines.iter_mut().find(|(n, _)| n == name) {
            entry.1 = value.to_string();
        } else {
            self.defines.push((name.to_string(), value.to_string()));
        }
    }

    fn expand(&self, line: &str) -> String {
        let mut expanded = line.to_string();
        for (name, value) in &self.defines {
            expanded = substitute(&expanded, name, value);
        }
        expanded
    }

    fn resolve_include(
        &self,
        filename: &str,
        current_file: Option<&Path>,
        line: u32,
    ) -> Result<PathBuf, PreprocessorError> {
        let mut candidates = Vec::new();
        if let Some(current) = current_file {
            if let Some(dir) = current.parent() {
                candidates.push(dir.join(filename));
            }
        }
        if let Some(lib) = &self.lib_dir {
            candidates.push(lib.join(filename));
        }
        for candidate in &candidates {
            if candidate.exists() {
                return candidate.canonicalize().map_err(|err| PreprocessorError {
                    message: format!("Cannot resolve include '{}': {}", filename, err),
                    line,
                });
            }
        }
        Err(PreprocessorError {
            message: format!("Included file '{}' was not found", filename),
            line,
        })
    }

    fn process(
        &mut self,
        text: &str,
        current_file: Option<&Path>,
    ) -> Result<String, PreprocessorError> {
        let mut out: Vec<String> = Vec::new();

        for (index, line) in text.lines().enumerate() {
            let line_num = index as u32 + 1;
            let stripped = line.trim_start();

            if stripped.starts_with("#define") {
                let rest = stripped["#define".len()..].trim_start();
                let name: String = rest.chars().take_while(|&c| is_ident_char(c)).collect();
                let value = rest[name.len()..].trim();
                if name.is_empty() || rest.len() == name.len() {
                    return Err(PreprocessorError {
                        message: format!("Invalid #define syntax: {}", line.trim()),
                        line: line_num,
                    });
                }
                self.define(&name, value);
                out.push(format!("# #define {} {}", name, value));
                continue;
            }

            if stripped.starts_with("#include") {
                let rest = stripped["#include".len()..].trim();
                let filename = parse_include_path(rest).ok_or_else(|| PreprocessorError {
                    message: format!(
                        "Invalid #include syntax: {} (use #include \"file\" or #include <file>)",
                        line.trim()
                    ),
                    line: line_num,
                })?;
                let path = self.resolve_include(filename, current_file, line_num)?;
                if self.included.contains(&path) {
                    out.push(format!("# #include \"{}\" (already included)", filename));
                    continue;
                }
                self.included.insert(path.clone());
                let included_text = fs::read_to_string(&path).map_err(|err| PreprocessorError {
                    message: format!("Cannot read included file '{}': {}", filename, err),
                    line: line_num,
                })?;
                out.push(format!("# BEGIN #include \"{}\"", filename));
                let processed = self.process(&included_text, Some(&path))?;
                out.extend(processed.lines().map(str::to_string));
                out.push(format!("# END #include \"{}\"", filename));
                continue;
            }

            out.push(self.expand(line));
        }

        Ok(out.join("\n"))
    }
}

fn parse_include_path(rest: &str) -> Option<&str> {
    let quoted = rest.starts_with('"') && rest.ends_with('"');
    let angled = rest.starts_with('<') && rest.ends_with('>');
    if rest.len() >= 2 && (quoted || angled) {
        Some(&rest[1..rest.len() - 1])
    } else {
        None
    }
}

/// Expands `source`, resolving includes relative to `source_file` when it is
/// given. No library directory is consulted.
pub fn preprocess(
    source: &str,
    source_file: Option<&Path>,
) -> Result<String, PreprocessorError> {
    preprocess_with_lib(source, source_file, None)
}

/// Expands `source` with an explicit library directory as the include
/// fallback.
pub fn preprocess_with_lib(
    source: &str,
    source_file: Option<&Path>,
    lib_dir: Option<&Path>,
) -> Result<String, PreprocessorError> {
    let mut preprocessor = Preprocessor {
        defines: Vec::new(),
        included: HashSet::new(),
        lib_dir: lib_dir.map(Path::to_path_buf),
    };
    preprocessor.process(source, source_file)
}

/// Reads and expands a whole file.
pub fn preprocess_file(path: &Path) -> Result<String, PreprocessorError> {
    let source = fs::read_to_string(path).map_err(|err| PreprocessorError {
        message: format!("Cannot read '{}': {}", path.display(), err),
        line: 0,
    })?;
    preprocess(&source, Some(path))
}
