use std::{fs, io, path};
use std::fmt::Write as FmtWrite;
use std::io::{BufRead, Read};
use std::iter::Peekable;
use std::str::Chars;
use flate2::read::GzDecoder;
use crate::error::Error;
use crate::sat::Solver;
use crate::sat::formula::{LBool, Lit, Var};


const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];


pub fn parse_int(token: &str) -> Result<i64, Error> {
    token.parse::<i64>().map_err(|_| Error::MalformedInt(token.to_string()))
}

/// Maps a one-based DIMACS variable number to its variable.
pub fn var_of(n: i64) -> Result<Var, Error> {
    if n >= 1 && n <= i64::from(i32::MAX) {
        Ok(Var::from_index((n - 1) as usize))
    } else {
        Err(Error::InvalidVar(n))
    }
}

/// Maps a signed non-zero DIMACS integer to its literal.
pub fn lit_of(n: i64) -> Result<Lit, Error> {
    let v = var_of(n.checked_abs().ok_or(Error::InvalidVar(n))?)?;
    Ok(v.sign_lit(n < 0))
}

pub fn lit_to_int(lit: Lit) -> i64 {
    let n = (lit.var().index() + 1) as i64;
    if lit.sign() { -n } else { n }
}


pub fn parse_vars(field: &str) -> Result<Vec<Var>, Error> {
    field.split_whitespace()
        .map(|token| parse_int(token).and_then(var_of))
        .collect()
}

// Splits a field into '0'-terminated clauses. A trailing group without its terminator
// still counts as a clause; a field without a single number is rejected.
pub fn parse_clauses(field: &str) -> Result<Vec<Vec<Lit>>, Error> {
    let mut clauses = Vec::new();
    let mut current = Vec::new();
    let mut tokens = 0;
    for token in field.split_whitespace() {
        tokens += 1;
        match parse_int(token)? {
            0 => clauses.push(std::mem::replace(&mut current, Vec::new())),
            n => current.push(lit_of(n)?),
        }
    }

    if tokens == 0 {
        return Err(Error::EmptyClause);
    }
    if !current.is_empty() {
        clauses.push(current);
    }
    Ok(clauses)
}

// Exactly one clause per field; only a final terminator is tolerated.
pub fn parse_clause(field: &str) -> Result<Vec<Lit>, Error> {
    let mut numbers = field.split_whitespace()
        .map(parse_int)
        .collect::<Result<Vec<_>, _>>()?;

    if numbers.is_empty() {
        return Err(Error::EmptyClause);
    }
    if numbers.last() == Some(&0) {
        numbers.pop();
    }
    if numbers.contains(&0) {
        return Err(Error::EmbeddedTerminator);
    }

    numbers.into_iter().map(lit_of).collect()
}


/// Appends `lits` as one DIMACS line, `0`-terminated.
pub fn write_clause(out: &mut String, lits: &[Lit]) {
    for &lit in lits.iter() {
        let _ = write!(out, "{} ", lit_to_int(lit));
    }
    out.push_str("0\n");
}

/// Full problem text: header followed by the clause lines.
pub fn write_problem(n_vars: usize, n_clauses: usize, body: &str) -> String {
    format!("p cnf {} {}\n{}", n_vars, n_clauses, body)
}

// Signed assignment of every assigned variable, DIMACS model style.
pub fn model_line(model: &[LBool]) -> String {
    let mut line = String::new();
    for (i, value) in model.iter().enumerate() {
        let n = (i + 1) as i64;
        match *value {
            LBool::True => { let _ = write!(line, "{} ", n); }
            LBool::False => { let _ = write!(line, "{} ", -n); }
            LBool::Undef => {}
        }
    }
    line.push('0');
    line
}

/// Creates variables until every literal of `lits` refers to a known one.
pub fn ensure_vars<S: Solver>(solver: &mut S, lits: &[Lit]) {
    if let Some(max) = lits.iter().map(|lit| lit.var().index()).max() {
        while max >= solver.nVars() {
            solver.newVar(None, true);
        }
    }
}


pub fn parse_file<P, F>(path: P, clause: F) -> Result<usize, Error>
where
    P: AsRef<path::Path>,
    F: FnMut(Vec<Lit>) -> Result<(), Error>,
{
    let mut reader = io::BufReader::new(fs::File::open(path)?);
    let gzipped = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    if gzipped {
        parse(GzDecoder::new(reader), clause)
    } else {
        parse(reader, clause)
    }
}

/// Feeds every clause of a DIMACS stream to `clause`, returning the number of clauses read.
pub fn parse<R, F>(mut reader: R, clause: F) -> Result<usize, Error>
where
    R: Read,
    F: FnMut(Vec<Lit>) -> Result<(), Error>,
{
    let mut buf = String::new();
    reader.read_to_string(&mut buf)?;

    let mut p = DimacsParser {
        reader: buf.chars().peekable(),
        line: 1,
    };
    p.parseMe(clause)
}


struct DimacsParser<'p> {
    reader: Peekable<Chars<'p>>,
    line: usize,
}

impl<'p> DimacsParser<'p> {
    fn parseMe<F>(&mut self, mut clause: F) -> Result<usize, Error>
    where
        F: FnMut(Vec<Lit>) -> Result<(), Error>,
    {
        let mut header = None;
        let mut count = 0;
        loop {
            self.skipWhitespace();
            match self.reader.peek() {
                None => break,
                Some('c') => self.skipLine(),
                Some('p') => {
                    if header.is_some() {
                        return Err(self.error("duplicate header"));
                    }
                    self.consume("p cnf")?;
                    let vars = self.nextInt()?;
                    let clauses = self.nextInt()?;
                    if vars < 0 || clauses < 0 {
                        return Err(self.error("negative header value"));
                    }
                    header = Some((vars, clauses));
                }
                Some(_) => {
                    let lits = self.parseClause()?;
                    count += 1;
                    clause(lits)?;
                }
            }
        }

        if let Some((_, clauses)) = header {
            if clauses as usize != count {
                warn!("DIMACS header mismatch: {} clauses declared, {} found", clauses, count);
            }
        }
        Ok(count)
    }

    fn parseClause(&mut self) -> Result<Vec<Lit>, Error> {
        let mut lits = Vec::new();
        loop {
            match self.nextInt()? {
                0 => return Ok(lits),
                n => lits.push(lit_of(n)?),
            }
        }
    }

    fn error(&self, msg: &str) -> Error {
        Error::Dimacs(format!("line {}: {}", self.line, msg))
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.reader.next();
        if c == Some('\n') {
            self.line += 1;
        }
        c
    }

    fn skipWhitespace(&mut self) {
        while let Some(&c) = self.reader.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.bump();
        }
    }

    fn skipLine(&mut self) {
        while let Some(c) = self.bump() {
            if c == '\n' {
                break;
            }
        }
    }

    fn consume(&mut self, target: &str) -> Result<(), Error> {
        for tc in target.chars() {
            match self.reader.peek() {
                Some(&c) if c == tc => { self.bump(); }
                _ => return Err(self.error(&format!("expected '{}'", target))),
            }
        }
        Ok(())
    }

    fn nextInt(&mut self) -> Result<i64, Error> {
        self.skipWhitespace();
        let mut token = String::new();
        if let Some(&c) = self.reader.peek() {
            if c == '-' || c == '+' {
                token.push(c);
                self.bump();
            }
        }
        while let Some(&c) = self.reader.peek() {
            if !c.is_ascii_digit() {
                break;
            }
            token.push(c);
            self.bump();
        }

        match token.trim_start_matches('+').parse::<i64>() {
            Ok(n) => Ok(n),
            Err(_) if self.reader.peek().is_none() => Err(self.error("unexpected end of file")),
            Err(_) => Err(self.error("integer expected")),
        }
    }
}
