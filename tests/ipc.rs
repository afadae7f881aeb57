use std::{fs, thread};
use std::sync::Arc;
use dminisat_rust::ipc::{self, Client, Endpoint};
use dminisat_rust::monitor::Monitor;
use dminisat_rust::sat::minisat::{CoreSettings, CoreSolver};
use dminisat_rust::session::Session;
use dminisat_rust::session::ledger::IncrementalLedger;
use dminisat_rust::{MainOptions, Mode};


#[test]
fn session_over_a_socket() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session");
    let mut endpoint = Endpoint::bind(&path).unwrap();

    let server = thread::spawn(move || {
        let solver = CoreSolver::new(CoreSettings::default());
        Session::new(IncrementalLedger::new(solver)).serve(&mut endpoint)
    });

    let mut client = Client::connect(&path).unwrap();
    assert_eq!(client.call(b'r', &["1 2 0", "-1 0"]).unwrap(), "OK");
    assert_eq!(client.call(b'o', &[]).unwrap(), "p cnf 2 2\n1 2 0\n-1 0\n");
    assert_eq!(client.call(b's', &[]).unwrap(), "2");
    assert_eq!(client.call(b'z', &[]).unwrap(), "ERROR unknown opcode 'z'");

    // A new peer continues the same session.
    drop(client);
    let mut client = Client::connect(&path).unwrap();
    assert_eq!(client.call(b's', &[]).unwrap(), "UNSAT");
    assert_eq!(client.call(b'f', &[]).unwrap(), "OK");

    server.join().unwrap().unwrap();
}

#[test]
fn plain_req_socket_sends_multipart_requests() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain");
    let mut endpoint = Endpoint::bind(&path).unwrap();

    let server = thread::spawn(move || {
        let solver = CoreSolver::new(CoreSettings::default());
        Session::new(IncrementalLedger::new(solver)).serve(&mut endpoint)
    });

    let ctx = zmq::Context::new();
    let req = ctx.socket(zmq::REQ).unwrap();
    req.set_linger(0).unwrap();
    req.connect(&ipc::address(&path)).unwrap();

    req.send_multipart(vec![&b"r"[..], &b"1 0"[..], &b"-2 0"[..]], 0).unwrap();
    assert_eq!(req.recv_multipart(0).unwrap(), vec![b"OK".to_vec()]);
    req.send_multipart(vec![&b"c"[..], &b"2 1"[..]], 0).unwrap();
    assert_eq!(req.recv_bytes(0).unwrap(), b"OK".to_vec());
    req.send(&b"s"[..], 0).unwrap();
    assert_eq!(req.recv_bytes(0).unwrap(), b"1".to_vec());
    req.send(&b"f"[..], 0).unwrap();
    assert_eq!(req.recv_bytes(0).unwrap(), b"OK".to_vec());

    server.join().unwrap().unwrap();
}

#[test]
fn bind_replaces_a_stale_socket_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stale");
    fs::write(&path, b"left over").unwrap();

    let endpoint = Endpoint::bind(&path).unwrap();
    assert_eq!(endpoint.path(), path.as_path());
    assert_eq!(ipc::address(&path), format!("ipc://{}", path.display()));
    drop(endpoint);
    assert!(!path.exists());
}

#[test]
fn empty_request_is_refused_by_the_client() {
    let dir = tempfile::tempdir().unwrap();
    let mut client = Client::connect(dir.path().join("nobody")).unwrap();
    let parts: [&[u8]; 0] = [];
    assert!(client.request(&parts).is_err());
}

#[test]
fn run_serves_batch_mode_until_finish() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("batch");
    let monitor = Arc::new(Monitor::new());

    let options = MainOptions { mode: Mode::Batch, endpoint: path.clone() };
    let server = {
        let monitor = monitor.clone();
        thread::spawn(move || dminisat_rust::run(options, CoreSettings::default(), monitor))
    };

    let mut client = Client::connect(&path).unwrap();
    assert_eq!(client.call(b'd', &["problem.cnf"]).unwrap(), "NOT_SUPPORTED");
    assert_eq!(client.call(b'r', &["1 2"]).unwrap(), "OK");
    assert_eq!(client.call(b'p', &["1 2"]).unwrap(), "OK");

    let mut solutions = Vec::new();
    loop {
        let reply = client.call(b's', &[]).unwrap();
        if reply == "UNSAT" {
            break;
        }
        solutions.push(reply);
    }
    solutions.sort();
    assert_eq!(solutions, vec!["1", "1 2", "2"]);

    assert_eq!(client.call(b'f', &[]).unwrap(), "OK");
    server.join().unwrap().unwrap();

    // One engine per solve, all retired.
    assert_eq!(monitor.snapshot().solves, 4);
}
