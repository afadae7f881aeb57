use std::{fs, io, path, process};
use dminisat_rust::sat::{dimacs, SolveRes, Solver, SolverError};
use dminisat_rust::sat::formula::{LBool, Lit, Var};
use dminisat_rust::sat::minisat::{CCMinMode, CoreSettings, CoreSolver};


fn lits(clause: &[i64]) -> Vec<Lit> {
    clause.iter().map(|&n| dimacs::lit_of(n).unwrap()).collect()
}

fn load<S: Solver>(solver: &mut S, clauses: &[Vec<i64>]) -> bool {
    let mut ok = true;
    for clause in clauses.iter() {
        let ls = lits(clause);
        dimacs::ensure_vars(solver, &ls);
        ok = solver.addClause(&ls).unwrap();
    }
    ok
}

fn lit_true<S: Solver>(solver: &S, lit: Lit) -> bool {
    (solver.modelValue(lit.var()) ^ lit.sign()) == LBool::True
}

fn model_satisfies<S: Solver>(solver: &S, clauses: &[Vec<i64>]) -> bool {
    clauses.iter().all(|c| lits(c).into_iter().any(|lit| lit_true(solver, lit)))
}

// n + 1 pigeons, n holes.
fn pigeonhole(n: i64) -> Vec<Vec<i64>> {
    let var = |pigeon: i64, hole: i64| pigeon * n + hole + 1;
    let mut clauses = Vec::new();
    for p in 0..n + 1 {
        clauses.push((0..n).map(|h| var(p, h)).collect());
    }
    for h in 0..n {
        for p in 0..n + 1 {
            for q in p + 1..n + 1 {
                clauses.push(vec![-var(p, h), -var(q, h)]);
            }
        }
    }
    clauses
}

struct Lcg(u64);

impl Lcg {
    fn next(&mut self, bound: u64) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        (self.0 >> 33) % bound
    }
}

fn random_3sat(rng: &mut Lcg, vars: u64, clauses: usize) -> Vec<Vec<i64>> {
    (0..clauses)
        .map(|_| {
            (0..3)
                .map(|_| {
                    let v = (rng.next(vars) + 1) as i64;
                    if rng.next(2) == 0 { v } else { -v }
                })
                .collect()
        })
        .collect()
}

fn brute_force(vars: u64, clauses: &[Vec<i64>]) -> bool {
    (0..1u64 << vars).any(|bits| {
        clauses.iter().all(|c| {
            c.iter().any(|&n| {
                let value = (bits >> (n.abs() - 1)) & 1 == 1;
                value == (n > 0)
            })
        })
    })
}


#[test]
fn empty_problem_is_sat() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::SAT);
    assert_eq!(solver.nVars(), 0);
}

#[test]
fn simple_sat_model_satisfies_clauses() {
    let clauses = vec![vec![1, 2], vec![-1, 3], vec![-2, -3], vec![2, 3]];
    let mut solver = CoreSolver::new(CoreSettings::default());
    assert!(load(&mut solver, &clauses));
    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::SAT);
    assert!(model_satisfies(&solver, &clauses));
}

#[test]
fn pigeonhole_is_unsat() {
    for &mode in [CCMinMode::None, CCMinMode::Basic, CCMinMode::Deep].iter() {
        let mut settings = CoreSettings::default();
        settings.ccmin_mode = mode;
        let mut solver = CoreSolver::new(settings);
        load(&mut solver, &pigeonhole(5));
        assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::UnSAT, "{:?}", mode);

        let stats = solver.stats();
        assert_eq!(stats.solves, 1);
        assert!(stats.conflicts > 0);
    }
}

#[test]
fn agrees_with_brute_force_on_random_3sat() {
    let mut rng = Lcg(0x5eed);
    let (mut sat, mut unsat) = (0, 0);
    for _ in 0..200 {
        let clauses = random_3sat(&mut rng, 10, 43);
        let mut solver = CoreSolver::new(CoreSettings::default());
        let expected = brute_force(10, &clauses);

        let res = if load(&mut solver, &clauses) {
            solver.solveLimited(&[]).unwrap()
        } else {
            SolveRes::UnSAT
        };

        if expected {
            sat += 1;
            assert_eq!(res, SolveRes::SAT, "{:?}", clauses);
            assert!(model_satisfies(&solver, &clauses));
        } else {
            unsat += 1;
            assert_eq!(res, SolveRes::UnSAT, "{:?}", clauses);
        }
    }
    assert!(sat > 0 && unsat > 0);
}

#[test]
fn clauses_can_be_added_between_solves() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    load(&mut solver, &[vec![1, 2]]);
    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::SAT);

    load(&mut solver, &[vec![-1]]);
    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::SAT);
    assert_eq!(solver.modelValue(Var::from_index(0)), LBool::False);
    assert_eq!(solver.modelValue(Var::from_index(1)), LBool::True);

    assert!(!load(&mut solver, &[vec![-2]]));
    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::UnSAT);
    // Stays inconsistent.
    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::UnSAT);
    assert_eq!(solver.modelValue(Var::from_index(0)), LBool::Undef);
}

#[test]
fn assumption_conflicts_are_not_permanent() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    load(&mut solver, &[vec![1], vec![-2, 3]]);

    let not_x1 = lits(&[-1]);
    assert_eq!(solver.solveLimited(&not_x1).unwrap(), SolveRes::UnSAT);

    let x2 = lits(&[2]);
    assert_eq!(solver.solveLimited(&x2).unwrap(), SolveRes::SAT);
    assert_eq!(solver.modelValue(Var::from_index(2)), LBool::True);

    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::SAT);
}

#[test]
fn unknown_variable_is_rejected() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    solver.newVar(None, true);
    let clause = lits(&[1, 5]);
    match solver.addClause(&clause) {
        Err(SolverError::UnknownVar(v)) => assert_eq!(v, Var::from_index(4)),
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(solver.nClauses(), 0);
}

#[test]
fn only_undecided_long_clauses_are_stored() {
    let mut solver = CoreSolver::new(CoreSettings::default());
    assert!(load(&mut solver, &[vec![1, 2]]));
    assert_eq!(solver.nClauses(), 1);

    // Unit, satisfied and tautological clauses never reach the database.
    assert!(load(&mut solver, &[vec![1], vec![1, 3], vec![2, -2]]));
    assert_eq!(solver.nClauses(), 1);

    // False literals are dropped before storing.
    assert!(load(&mut solver, &[vec![-1, 2, 3]]));
    assert_eq!(solver.nClauses(), 2);

    assert!(!load(&mut solver, &[vec![-1]]));
    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::UnSAT);
}

#[test]
fn conflict_budget_gives_unknown() {
    let mut settings = CoreSettings::default();
    settings.conflict_budget = Some(1);
    let mut solver = CoreSolver::new(settings);
    load(&mut solver, &pigeonhole(6));

    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::Unknown);
    // Still usable afterwards.
    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::Unknown);
    assert_eq!(solver.stats().solves, 2);
}

#[test]
fn memory_limit_reports_out_of_memory() {
    let mut settings = CoreSettings::default();
    settings.core.mem_limit = Some(100);
    let mut solver = CoreSolver::new(settings);

    let mut failed = None;
    for i in 0..10 {
        let clause = lits(&[3 * i + 1, 3 * i + 2, 3 * i + 3]);
        dimacs::ensure_vars(&mut solver, &clause);
        if let Err(e) = solver.addClause(&clause) {
            failed = Some(e);
            break;
        }
    }
    assert_eq!(failed, Some(SolverError::OutOfMemory));
}

#[test]
fn geometric_restarts_and_random_decisions() {
    let mut settings = CoreSettings::default();
    settings.search.restart.luby_restart = false;
    settings.heur.random_var_freq = 0.5;
    let mut solver = CoreSolver::new(settings);
    load(&mut solver, &pigeonhole(5));
    assert_eq!(solver.solveLimited(&[]).unwrap(), SolveRes::UnSAT);
    assert!(solver.stats().rnd_decisions > 0);
}


#[test]
#[ignore]
fn compare_with_minisat() {
    walk().expect("IO Error");
}


fn walk() -> io::Result<()> {
    for entry in fs::read_dir("./tests/cnf")? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            let path = entry.path();
            test_file(path.as_path())?;
            println!("ok: {}", path.display());
        }
    }

    Ok(())
}


fn test_file(path: &path::Path) -> io::Result<()> {
    let out = process::Command::new("minisat").arg(path).output()?;
    let expected = match out.status.code() {
        Some(10) => SolveRes::SAT,
        Some(20) => SolveRes::UnSAT,
        code => panic!("minisat error code {:?} on {}", code, path.display()),
    };

    let mut solver = CoreSolver::new(CoreSettings::default());
    let mut clauses = Vec::new();
    let mut ok = true;
    let parsed = dimacs::parse_file(path, |clause| {
        dimacs::ensure_vars(&mut solver, &clause);
        ok = solver.addClause(&clause)? && ok;
        clauses.push(clause);
        Ok(())
    });
    if let Err(e) = parsed {
        panic!("Error parsing {}: {}", path.display(), e);
    }

    let res = if ok { solver.solveLimited(&[]).unwrap() } else { SolveRes::UnSAT };
    assert_eq!(res, expected, "Result difference on {}", path.display());

    if res == SolveRes::SAT {
        let satisfied = clauses.iter().all(|c| c.iter().any(|&lit| lit_true(&solver, lit)));
        assert!(satisfied, "SELF-CHECK FAILED on {}", path.display());
    }
    Ok(())
}
