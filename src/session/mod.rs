use std::path::Path;
use log::Level;
use crate::error::Result;
use crate::ipc::Transport;
use crate::sat::dimacs;
use crate::sat::formula::Var;
use self::ledger::{Ledger, Outcome};
use self::model::Selection;
use self::request::{Reply, Request};

pub mod ledger;
pub mod model;
pub mod request;


#[derive(PartialEq, Eq, Clone, Debug)]
pub enum Step {
    Continue(Reply),
    // Reply to the finish request; nothing is read after it.
    Finish(Reply),
}

impl Step {
    pub fn reply(&self) -> &Reply {
        match *self {
            Step::Continue(ref r) | Step::Finish(ref r) => r,
        }
    }
}


/// One client-facing solving session: the accumulated problem plus the care and placement sets.
pub struct Session<L> {
    ledger: L,
    selection: Selection,
}

impl<L: Ledger> Session<L> {
    pub fn new(ledger: L) -> Self {
        Session {
            ledger,
            selection: Selection::default(),
        }
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Serves requests until a finish request or the end of the transport.
    /// Only transport failures and fatal engine errors come back as `Err`.
    pub fn serve<T: Transport>(&mut self, transport: &mut T) -> Result<()> {
        while let Some(message) = transport.recv()? {
            match self.dispatch(&message)? {
                Step::Continue(reply) => {
                    transport.send(reply.to_string().as_bytes())?;
                }
                Step::Finish(reply) => {
                    transport.send(reply.to_string().as_bytes())?;
                    return Ok(());
                }
            }
        }
        Ok(())
    }

    /// Decodes and executes one raw message. Request errors become error replies.
    pub fn dispatch(&mut self, message: &[Vec<u8>]) -> Result<Step> {
        match Request::decode(message).and_then(|request| self.handle(request)) {
            Ok(step) => Ok(step),
            Err(e) if e.is_fatal() => Err(e),
            Err(e) => {
                warn!("Request failed: {}", e);
                Ok(Step::Continue(Reply::from(&e)))
            }
        }
    }

    pub fn handle(&mut self, request: Request) -> Result<Step> {
        let reply = match request {
            Request::Output => Reply::Problem(self.ledger.output()),

            Request::LoadFile(path) => {
                info!("Loading file: {}", path);
                let n = self.ledger.load_file(Path::new(&path))?;
                debug!("Loaded {} clauses", n);
                Reply::Ok
            }

            Request::Placement(vars) => {
                info!("Place vars are : {}", numbers(&vars));
                self.selection.set_placement(vars);
                Reply::Ok
            }

            Request::Care(vars) => {
                info!("We care about : {}", numbers(&vars));
                self.selection.set_care(vars);
                self.ledger.simplify();
                info!("Simplify");
                Reply::Ok
            }

            Request::AddClauses(fields) => {
                let mut clauses = Vec::new();
                for field in fields.iter() {
                    clauses.extend(self.ledger.decode_clauses(field)?);
                }
                for clause in clauses.iter() {
                    self.ledger.add_clause(clause)?;
                }
                Reply::Ok
            }

            Request::Finish => {
                info!("Closing, goodbye");
                return Ok(Step::Finish(Reply::Ok));
            }

            Request::Solve => self.solve()?,
        };

        Ok(Step::Continue(reply))
    }

    fn solve(&mut self) -> Result<Reply> {
        info!("Eliminate");
        match self.ledger.solve()? {
            Outcome::Sat(model) => {
                if log_enabled!(Level::Debug) {
                    debug!("SAT\n{}", dimacs::model_line(model.values()));
                }

                let solution = model.solution(self.selection.care());
                let blocking = model.blocking_clause(&self.selection.blocking_vars(model.n_vars()));
                self.ledger.add_clause(&blocking)?;
                Ok(Reply::Solution(solution))
            }

            Outcome::Unsat => {
                info!("UNSAT");
                Ok(Reply::Unsat)
            }

            Outcome::Unknown => {
                info!("UNKNOWN");
                Ok(Reply::Unknown)
            }
        }
    }
}

fn numbers(vars: &[Var]) -> String {
    let numbers: Vec<String> = vars.iter().map(|v| (v.index() + 1).to_string()).collect();
    numbers.join(" ")
}
