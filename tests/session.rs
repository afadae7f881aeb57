use std::collections::{HashSet, VecDeque};
use std::io::{self, Write};
use dminisat_rust::ipc::{Message, Transport};
use dminisat_rust::sat::minisat::{CoreSettings, CoreSolver};
use dminisat_rust::session::{Session, Step};
use dminisat_rust::session::ledger::{BatchLedger, IncrementalLedger, Ledger};
use dminisat_rust::session::request::Reply;


fn incremental() -> Session<IncrementalLedger<CoreSolver>> {
    Session::new(IncrementalLedger::new(CoreSolver::new(CoreSettings::default())))
}

fn batch() -> Session<impl Ledger> {
    Session::new(BatchLedger::new(|| CoreSolver::new(CoreSettings::default())))
}

fn message(opcode: u8, fields: &[&str]) -> Message {
    let mut parts = vec![vec![opcode]];
    parts.extend(fields.iter().map(|f| f.as_bytes().to_vec()));
    parts
}

fn call<L: Ledger>(session: &mut Session<L>, opcode: u8, fields: &[&str]) -> String {
    match session.dispatch(&message(opcode, fields)).unwrap() {
        Step::Continue(reply) => reply.to_string(),
        Step::Finish(reply) => panic!("unexpected finish: {}", reply),
    }
}

// Solves until UNSAT, returning every solution string seen.
fn enumerate<L: Ledger>(session: &mut Session<L>, limit: usize) -> Vec<String> {
    let mut seen = Vec::new();
    loop {
        let reply = call(session, b's', &[]);
        if reply == "UNSAT" {
            return seen;
        }
        seen.push(reply);
        assert!(seen.len() <= limit, "enumeration does not terminate: {:?}", seen);
    }
}

fn true_vars(solution: &str) -> Vec<i64> {
    solution.split_whitespace().map(|t| t.parse().unwrap()).collect()
}


#[test]
fn output_reproduces_the_clause_log() {
    let mut s = incremental();
    assert_eq!(call(&mut s, b'r', &["1 2 0"]), "OK");
    assert_eq!(call(&mut s, b'r', &["-1 3 0"]), "OK");
    assert_eq!(call(&mut s, b'o', &[]), "p cnf 3 2\n1 2 0\n-1 3 0\n");
}

#[test]
fn one_field_may_hold_several_clauses() {
    let mut s = incremental();
    assert_eq!(call(&mut s, b'r', &["1 2 0 -1 3 0", "4"]), "OK");
    assert_eq!(call(&mut s, b'o', &[]), "p cnf 4 3\n1 2 0\n-1 3 0\n4 0\n");
}

#[test]
fn empty_problem_is_trivially_sat() {
    for mode in 0..2 {
        let reply = if mode == 0 {
            call(&mut incremental(), b's', &[])
        } else {
            call(&mut batch(), b's', &[])
        };
        assert_eq!(reply, "");
    }
}

#[test]
fn empty_problem_has_exactly_one_solution() {
    let mut s = incremental();
    assert_eq!(call(&mut s, b's', &[]), "");
    // The blocking clause over zero variables is the empty clause.
    assert_eq!(call(&mut s, b's', &[]), "UNSAT");
    assert_eq!(call(&mut s, b'o', &[]), "p cnf 0 1\n0\n");
}

#[test]
fn enumeration_never_repeats_a_model() {
    let mut s = incremental();
    call(&mut s, b'r', &["1 2 3 0"]);
    let solutions = enumerate(&mut s, 8);
    assert_eq!(solutions.len(), 7);
    let distinct: HashSet<&String> = solutions.iter().collect();
    assert_eq!(distinct.len(), 7);
    assert!(!solutions.contains(&String::new()));
}

#[test]
fn all_false_model_is_blocked() {
    for &batch_mode in [false, true].iter() {
        let (first, second) = if batch_mode {
            let mut s = batch();
            call(&mut s, b'r', &["-1 0"]);
            call(&mut s, b'r', &["-2 0"]);
            (call(&mut s, b's', &[]), call(&mut s, b's', &[]))
        } else {
            let mut s = incremental();
            call(&mut s, b'r', &["-1 0", "-2 0"]);
            (call(&mut s, b's', &[]), call(&mut s, b's', &[]))
        };
        assert_eq!(first, "");
        assert_eq!(second, "UNSAT");
    }
}

#[test]
fn care_set_filters_and_orders_the_solution() {
    let mut s = incremental();
    call(&mut s, b'r', &["1 2 0", "-1 3 0", "4 5 0"]);
    assert_eq!(call(&mut s, b'c', &["3 1"]), "OK");

    let solutions = enumerate(&mut s, 4);
    for solution in solutions.iter() {
        let vars = true_vars(solution);
        assert!(vars.iter().all(|v| *v == 3 || *v == 1), "{}", solution);
        if vars.len() == 2 {
            assert_eq!(vars, vec![3, 1]);
        }
    }

    // Blocking over the care set enumerates its projections: x1 -> x3 leaves three.
    let distinct: HashSet<&String> = solutions.iter().collect();
    assert_eq!(distinct.len(), 3);
    assert!(distinct.contains(&"3 1".to_string()));
}

#[test]
fn placement_set_restricts_blocking() {
    let mut s = incremental();
    call(&mut s, b'r', &["1 2 3 0"]);
    assert_eq!(call(&mut s, b'p', &["1"]), "OK");
    assert_eq!(enumerate(&mut s, 3).len(), 2);
}

#[test]
fn placement_overrides_care_for_blocking() {
    let mut s = batch();
    call(&mut s, b'r', &["1 2"]);
    call(&mut s, b'c', &["1 2"]);
    call(&mut s, b'p', &["2"]);
    // Only x2 is blocked, so at most two answers.
    assert_eq!(enumerate(&mut s, 3).len(), 2);
}

#[test]
fn incremental_and_batch_enumerate_the_same_models() {
    let problems: Vec<Vec<&str>> = vec![
        vec!["1 2 0", "-1 -2 0", "2 3 -4 0", "4 5 0"],
        vec!["-1 2 0", "-2 3 0", "-3 1 0", "1 4 5 0", "-4 -5 0"],
        vec!["1 0", "-1 0"],
        vec!["1 -2 0", "2 -3 0", "3 -1 0", "-1 -2 -3 0", "4 0"],
    ];

    for clauses in problems.iter() {
        let mut inc = incremental();
        let mut bat = batch();
        for clause in clauses.iter() {
            assert_eq!(call(&mut inc, b'r', &[*clause]), "OK");
            assert_eq!(call(&mut bat, b'r', &[*clause]), "OK");
        }

        let a: HashSet<String> = enumerate(&mut inc, 64).into_iter().collect();
        let b: HashSet<String> = enumerate(&mut bat, 64).into_iter().collect();
        assert_eq!(a, b, "{:?}", clauses);
    }
}

#[test]
fn unsat_is_sticky_in_incremental_mode() {
    let mut s = incremental();
    call(&mut s, b'r', &["1 0", "-1 0"]);
    assert_eq!(call(&mut s, b's', &[]), "UNSAT");
    assert_eq!(call(&mut s, b's', &[]), "UNSAT");
    assert_eq!(call(&mut s, b'o', &[]), "p cnf 1 2\n1 0\n-1 0\n");
}

#[test]
fn protocol_violations_get_error_replies() {
    let mut s = incremental();
    assert!(call(&mut s, b'x', &[]).starts_with("ERROR unknown opcode"));
    assert!(call(&mut s, b'c', &["1", "2"]).starts_with("ERROR"));
    assert!(call(&mut s, b's', &["now"]).starts_with("ERROR"));
    assert!(call(&mut s, b'p', &["1 zero"]).starts_with("ERROR malformed integer"));
    assert!(call(&mut s, b'p', &["0"]).starts_with("ERROR"));
    assert!(call(&mut s, b'r', &[""]).starts_with("ERROR"));

    let reply = s.dispatch(&vec![b"so".to_vec()]).unwrap();
    assert!(reply.reply().to_string().starts_with("ERROR"));
    let reply = s.dispatch(&vec![b"r".to_vec(), vec![0xff, 0xfe]]).unwrap();
    assert!(reply.reply().to_string().starts_with("ERROR"));
    let reply = s.dispatch(&[]).unwrap();
    assert_eq!(reply, Step::Continue(Reply::Error("empty message".to_string())));

    // The session is still usable.
    assert_eq!(call(&mut s, b'r', &["1 0"]), "OK");
    assert_eq!(call(&mut s, b's', &[]), "1");
}

#[test]
fn add_clauses_is_all_or_nothing() {
    let mut s = incremental();
    assert!(call(&mut s, b'r', &["1 2 0", "1 x 0"]).starts_with("ERROR"));
    assert_eq!(call(&mut s, b'o', &[]), "p cnf 0 0\n");

    let mut b = batch();
    assert!(call(&mut b, b'r', &["1 2", "3 0 4"]).starts_with("ERROR"));
    assert_eq!(call(&mut b, b'o', &[]), "p cnf 0 0\n");
}

#[test]
fn batch_mode_rejects_load_file() {
    let mut s = batch();
    assert_eq!(call(&mut s, b'd', &["/nonexistent.cnf"]), "NOT_SUPPORTED");
    assert_eq!(call(&mut s, b'r', &["1"]), "OK");
    assert_eq!(call(&mut s, b's', &[]), "1");
}

#[test]
fn batch_output_lists_collected_and_blocking_clauses() {
    let mut s = batch();
    call(&mut s, b'r', &["1 -2 0"]);
    call(&mut s, b'p', &["1"]);
    let solution = call(&mut s, b's', &[]);
    let blocking = if solution.split_whitespace().any(|t| t == "1") { "-1 0\n" } else { "1 0\n" };
    assert_eq!(call(&mut s, b'o', &[]), format!("p cnf 2 2\n1 -2 0\n{}", blocking));
}

#[test]
fn load_file_goes_through_the_ledger() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "c test\np cnf 2 2\n1 2 0\n-1 0\n").unwrap();
    let path = file.path().to_str().unwrap();

    let mut s = incremental();
    assert_eq!(call(&mut s, b'd', &[path]), "OK");
    assert_eq!(call(&mut s, b'o', &[]), "p cnf 2 2\n1 2 0\n-1 0\n");
    assert_eq!(call(&mut s, b's', &[]), "2");

    assert!(call(&mut s, b'd', &["/nonexistent/dir/x.cnf"]).starts_with("ERROR"));
}

#[test]
fn broken_file_leaves_the_problem_untouched() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "p cnf 3 3\n1 2 0\n-1 0\nx 3 0\n").unwrap();
    let path = file.path().to_str().unwrap();

    let mut s = incremental();
    let reply = call(&mut s, b'd', &[path]);
    assert!(reply.starts_with("ERROR"), "{}", reply);
    assert!(reply.contains("line 4"), "{}", reply);
    assert_eq!(call(&mut s, b'o', &[]), "p cnf 0 0\n");

    // The rejected clauses are not in the engine either.
    assert_eq!(call(&mut s, b'r', &["-2 0"]), "OK");
    let solution = call(&mut s, b's', &[]);
    assert_ne!(solution, "UNSAT");
    assert!(!true_vars(&solution).contains(&2));
}

#[test]
fn care_triggers_simplification() {
    let mut s = incremental();
    call(&mut s, b'r', &["1 0", "1 2 0", "-1 3 0"]);
    assert_eq!(call(&mut s, b'c', &["2 3"]), "OK");
    let solution = call(&mut s, b's', &[]);
    assert!(true_vars(&solution).contains(&3));
}

#[test]
fn exhausted_budget_answers_unknown_without_blocking() {
    let mut settings = CoreSettings::default();
    settings.conflict_budget = Some(1);
    let mut s = Session::new(IncrementalLedger::new(CoreSolver::new(settings)));

    // 7 pigeons, 6 holes.
    let n = 6;
    let var = |p: i64, h: i64| p * n + h + 1;
    for p in 0..n + 1 {
        let clause: Vec<String> = (0..n).map(|h| var(p, h).to_string()).collect();
        call(&mut s, b'r', &[clause.join(" ").as_str()]);
    }
    for h in 0..n {
        for p in 0..n + 1 {
            for q in p + 1..n + 1 {
                call(&mut s, b'r', &[format!("-{} -{} 0", var(p, h), var(q, h)).as_str()]);
            }
        }
    }

    let before = s.ledger().n_clauses();
    assert_eq!(call(&mut s, b's', &[]), "UNKNOWN");
    assert_eq!(s.ledger().n_clauses(), before);
}

#[test]
fn out_of_memory_is_fatal() {
    let mut settings = CoreSettings::default();
    settings.core.mem_limit = Some(256);
    let mut s = Session::new(IncrementalLedger::new(CoreSolver::new(settings)));

    let mut fatal = None;
    for i in 0..64 {
        let field = format!("{} {} {} 0", 3 * i + 1, 3 * i + 2, 3 * i + 3);
        match s.dispatch(&message(b'r', &[field.as_str()])) {
            Ok(step) => assert_eq!(step, Step::Continue(Reply::Ok)),
            Err(e) => {
                fatal = Some(e);
                break;
            }
        }
    }
    assert!(fatal.map(|e| e.is_fatal()).unwrap_or(false));
}


struct Script {
    requests: VecDeque<Message>,
    replies: Vec<String>,
}

impl Transport for Script {
    fn recv(&mut self) -> io::Result<Option<Message>> {
        Ok(self.requests.pop_front())
    }

    fn send(&mut self, reply: &[u8]) -> io::Result<()> {
        self.replies.push(String::from_utf8(reply.to_vec()).unwrap());
        Ok(())
    }
}

#[test]
fn finish_replies_once_and_stops_reading() {
    let mut script = Script {
        requests: vec![
            message(b'r', &["1 0"]),
            message(b'f', &[]),
            message(b's', &[]),
        ].into_iter().collect(),
        replies: Vec::new(),
    };

    let mut s = incremental();
    s.serve(&mut script).unwrap();
    assert_eq!(script.replies, vec!["OK", "OK"]);
    assert_eq!(script.requests.len(), 1);
}

#[test]
fn every_request_gets_exactly_one_reply() {
    let mut script = Script {
        requests: vec![
            message(b'o', &[]),
            message(b'q', &[]),
            message(b'r', &["1 2 0"]),
            message(b's', &[]),
        ].into_iter().collect(),
        replies: Vec::new(),
    };

    let mut s = batch();
    s.serve(&mut script).unwrap();
    assert_eq!(script.replies.len(), 4);
    assert_eq!(script.replies[0], "p cnf 0 0\n");
    assert!(script.replies[1].starts_with("ERROR"));
}
