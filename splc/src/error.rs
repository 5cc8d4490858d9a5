use std::error::Error as StdError;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreprocessorError {
    pub message: String,
    pub line: u32,
}

impl fmt::Display for PreprocessorError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Preprocessor error at line {}: {}", self.line, self.message)
    }
}

impl StdError for PreprocessorError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LexError {
    pub message: String,
    pub line: u32,
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Lex error at line {}: {}", self.line, self.message)
    }
}

impl StdError for LexError {}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub line: u32,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, line: u32) -> SyntaxError {
        SyntaxError {
            message: message.into(),
            line,
        }
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Syntax error at line {}: {}", self.line, self.message)
    }
}

impl StdError for SyntaxError {}

/// Any failure of the compilation pipeline, with the stage it came from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CompileError {
    Preprocessor(PreprocessorError),
    Lex(LexError),
    Syntax(SyntaxError),
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CompileError::Preprocessor(err) => write!(f, "{}", err),
            CompileError::Lex(err) => write!(f, "{}", err),
            CompileError::Syntax(err) => write!(f, "{}", err),
        }
    }
}

impl StdError for CompileError {}

impl From<PreprocessorError> for CompileError {
    fn from(err: PreprocessorError) -> CompileError {
        CompileError::Preprocessor(err)
    }
}

impl From<LexError> for CompileError {
    fn from(err: LexError) -> CompileError {
        CompileError::Lex(err)
    }
}

impl From<SyntaxError> for CompileError {
    fn from(err: SyntaxError) -> CompileError {
        CompileError::Syntax(err)
    }
}
