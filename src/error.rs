use std::io;
use thiserror::Error;
use crate::sat::SolverError;


#[derive(Debug, Error)]
pub enum Error {
    #[error("empty message")]
    EmptyMessage,

    #[error("opcode must be a single byte, got {0} bytes")]
    MalformedOpcode(usize),

    #[error("unknown opcode {:?}", opcode_char(.0))]
    UnknownOpcode(u8),

    #[error("opcode '{opcode}' expects {expected} payload field(s), got {got}")]
    FieldCount { opcode: char, expected: usize, got: usize },

    #[error("payload is not valid UTF-8")]
    NotUtf8,

    #[error("malformed integer {0:?}")]
    MalformedInt(String),

    #[error("variable number {0} is out of range")]
    InvalidVar(i64),

    #[error("clause terminator inside a single-clause field")]
    EmbeddedTerminator,

    #[error("clause field holds no literals")]
    EmptyClause,

    #[error("operation not supported in batch mode")]
    NotSupported,

    #[error("DIMACS parse error: {0}")]
    Dimacs(String),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Solver(#[from] SolverError),
}

impl Error {
    /// Errors after which the session can't give a reliable answer anymore.
    pub fn is_fatal(&self) -> bool {
        match self {
            Error::Solver(SolverError::OutOfMemory) => true,
            _ => false,
        }
    }
}

fn opcode_char(b: &u8) -> char {
    char::from(*b)
}

pub type Result<T> = std::result::Result<T, Error>;
