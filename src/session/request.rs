use std::{fmt, str};
use crate::error::{Error, Result};
use crate::sat::dimacs;
use crate::sat::formula::Var;


#[derive(PartialEq, Eq, Clone, Copy, Debug)]
pub enum Opcode {
    Output,     // 'o'
    LoadFile,   // 'd'
    Placement,  // 'p'
    Care,       // 'c'
    AddClauses, // 'r'
    Finish,     // 'f'
    Solve,      // 's'
    Unknown(u8),
}

impl Opcode {
    pub fn from_byte(b: u8) -> Opcode {
        match b {
            b'o' => Opcode::Output,
            b'd' => Opcode::LoadFile,
            b'p' => Opcode::Placement,
            b'c' => Opcode::Care,
            b'r' => Opcode::AddClauses,
            b'f' => Opcode::Finish,
            b's' => Opcode::Solve,
            other => Opcode::Unknown(other),
        }
    }

    pub fn byte(&self) -> u8 {
        match *self {
            Opcode::Output => b'o',
            Opcode::LoadFile => b'd',
            Opcode::Placement => b'p',
            Opcode::Care => b'c',
            Opcode::AddClauses => b'r',
            Opcode::Finish => b'f',
            Opcode::Solve => b's',
            Opcode::Unknown(b) => b,
        }
    }

    // Payload fields the opcode takes; 'None' for any number.
    fn arity(&self) -> Option<usize> {
        match *self {
            Opcode::Output | Opcode::Finish | Opcode::Solve => Some(0),
            Opcode::LoadFile | Opcode::Placement | Opcode::Care => Some(1),
            Opcode::AddClauses | Opcode::Unknown(_) => None,
        }
    }
}


#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Request {
    Output,
    LoadFile(String),
    Placement(Vec<Var>),
    Care(Vec<Var>),
    // Clause fields stay textual: how a field splits into clauses depends on the ledger.
    AddClauses(Vec<String>),
    Finish,
    Solve,
}

impl Request {
    pub fn decode(message: &[Vec<u8>]) -> Result<Request> {
        let (head, payload) = message.split_first().ok_or(Error::EmptyMessage)?;
        let opcode = match head[..] {
            [b] => Opcode::from_byte(b),
            _ => return Err(Error::MalformedOpcode(head.len())),
        };

        if let Opcode::Unknown(b) = opcode {
            return Err(Error::UnknownOpcode(b));
        }
        if let Some(expected) = opcode.arity() {
            if payload.len() != expected {
                return Err(Error::FieldCount {
                    opcode: char::from(opcode.byte()),
                    expected,
                    got: payload.len(),
                });
            }
        }

        let fields = payload.iter()
            .map(|field| str::from_utf8(field).map_err(|_| Error::NotUtf8))
            .collect::<Result<Vec<&str>>>()?;

        Ok(match opcode {
            Opcode::Output => Request::Output,
            Opcode::LoadFile => Request::LoadFile(fields[0].trim().to_string()),
            Opcode::Placement => Request::Placement(dimacs::parse_vars(fields[0])?),
            Opcode::Care => Request::Care(dimacs::parse_vars(fields[0])?),
            Opcode::AddClauses => Request::AddClauses(fields.iter().map(|f| f.to_string()).collect()),
            Opcode::Finish => Request::Finish,
            Opcode::Solve => Request::Solve,
            Opcode::Unknown(b) => return Err(Error::UnknownOpcode(b)),
        })
    }

    pub fn opcode(&self) -> Opcode {
        match *self {
            Request::Output => Opcode::Output,
            Request::LoadFile(_) => Opcode::LoadFile,
            Request::Placement(_) => Opcode::Placement,
            Request::Care(_) => Opcode::Care,
            Request::AddClauses(_) => Opcode::AddClauses,
            Request::Finish => Opcode::Finish,
            Request::Solve => Opcode::Solve,
        }
    }
}


#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Reply {
    Ok,
    NotSupported,
    Unsat,
    // The engine gave up within its conflict budget.
    Unknown,
    Solution(String),
    Problem(String),
    Error(String),
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Reply::Ok => write!(f, "OK"),
            Reply::NotSupported => write!(f, "NOT_SUPPORTED"),
            Reply::Unsat => write!(f, "UNSAT"),
            Reply::Unknown => write!(f, "UNKNOWN"),
            Reply::Solution(ref s) | Reply::Problem(ref s) => write!(f, "{}", s),
            Reply::Error(ref msg) => write!(f, "ERROR {}", msg),
        }
    }
}

impl<'a> From<&'a Error> for Reply {
    fn from(e: &'a Error) -> Reply {
        match *e {
            Error::NotSupported => Reply::NotSupported,
            ref other => Reply::Error(other.to_string()),
        }
    }
}
