#[macro_use]
extern crate clap;
#[macro_use]
extern crate log;

use std::io::Write;
use std::path;
use std::process;
use std::sync::Arc;
use dminisat_rust::monitor::Monitor;
use dminisat_rust::sat::minisat::{self, CCMinMode, PhaseSaving};


fn main() {
    let ls012 = ["0", "1", "2"];
    let matches =
        clap::App::new("dminisat-rust")
        .version(crate_version!())
        .about("Incremental SAT solving session served over a ZeroMQ REP socket")

        .arg(clap::Arg::with_name("verb").long("verb").takes_value(true).possible_values(&ls012).help("Verbosity level (0=silent, 1=some, 2=more)"))
        .arg(clap::Arg::with_name("ipc-name").long("ipc-name").takes_value(true).default_value("dminisat").help("Socket name, the endpoint is ipc://<ipc-dir>/<ipc-name>"))
        .arg(clap::Arg::with_name("ipc-dir").long("ipc-dir").takes_value(true).default_value("/tmp").help("Directory holding the socket"))
        .arg(clap::Arg::with_name("batch").long("batch").help("Collect clauses and replay them into a fresh solver for every solve"))
        .arg(clap::Arg::with_name("mem-lim").long("mem-lim").takes_value(true).help("Limit on clause memory usage in megabytes"))
        .arg(clap::Arg::with_name("conflict-budget").long("conflict-budget").takes_value(true).help("Conflicts allowed per solve before answering UNKNOWN"))

        .arg(clap::Arg::with_name("var-decay").long("var-decay").takes_value(true).help("The variable activity decay factor"))
        .arg(clap::Arg::with_name("cla-decay").long("cla-decay").takes_value(true).help("The clause activity decay factor"))
        .arg(clap::Arg::with_name("rnd-freq").long("rnd-freq").takes_value(true).help("The frequency with which the decision heuristic tries to choose a random variable"))
        .arg(clap::Arg::with_name("rnd-seed").long("rnd-seed").takes_value(true).help("Used by the random variable selection"))
        .arg(clap::Arg::with_name("ccmin-mode").long("ccmin-mode").takes_value(true).possible_values(&ls012).help("Controls conflict clause minimization (0=none, 1=basic, 2=deep)"))
        .arg(clap::Arg::with_name("phase-saving").long("phase-saving").takes_value(true).possible_values(&ls012).help("Controls the level of phase saving (0=none, 1=limited, 2=full)"))
        .arg(clap::Arg::with_name("rnd-init").long("rnd-init").help("Randomize the initial activity"))
        .arg(clap::Arg::with_name("no-rnd-init").long("no-rnd-init").conflicts_with("rnd-init"))
        .arg(clap::Arg::with_name("luby").long("luby").help("Use the Luby restart sequence"))
        .arg(clap::Arg::with_name("no-luby").long("no-luby").conflicts_with("luby"))
        .arg(clap::Arg::with_name("rfirst").long("rfirst").takes_value(true).help("The base restart interval"))
        .arg(clap::Arg::with_name("rinc").long("rinc").takes_value(true).help("Restart interval increase factor"))
        .arg(clap::Arg::with_name("gc-frac").long("gc-frac").takes_value(true).help("The fraction of wasted memory allowed before a garbage collection is triggered"))
        .arg(clap::Arg::with_name("min-learnts").long("min-learnts").takes_value(true).help("Minimum learnt clause limit"))

        .get_matches();

    let verbosity = matches.value_of("verb").and_then(|v| v.parse::<u8>().ok()).unwrap_or(0);
    {
        let mut builder = env_logger::Builder::new();
        builder.format(|buf, record| writeln!(buf, "{}", record.args()));
        builder.filter(
            None,
            match verbosity {
                0 => log::LevelFilter::Error,
                1 => log::LevelFilter::Info,
                _ => log::LevelFilter::Trace,
            },
        );
        builder.init();
    }

    let settings = {
        let mut s = minisat::CoreSettings::default();

        for &x in matches.value_of("var-decay").and_then(|s| s.parse().ok()).iter() {
            if 0.0 < x && x < 1.0 {
                s.heur.var_decay = x;
            }
        }

        for &x in matches.value_of("cla-decay").and_then(|s| s.parse().ok()).iter() {
            if 0.0 < x && x < 1.0 {
                s.db.clause_decay = x;
            }
        }

        for &x in matches.value_of("rnd-freq").and_then(|s| s.parse().ok()).iter() {
            if 0.0 <= x && x <= 1.0 {
                s.heur.random_var_freq = x;
            }
        }

        for &x in matches.value_of("rnd-seed").and_then(|s| s.parse().ok()).iter() {
            if 0.0 < x {
                s.heur.random_seed = x;
            }
        }

        match matches.value_of("ccmin-mode") {
            Some("0") => s.ccmin_mode = CCMinMode::None,
            Some("1") => s.ccmin_mode = CCMinMode::Basic,
            Some("2") => s.ccmin_mode = CCMinMode::Deep,
            _ => {}
        }

        match matches.value_of("phase-saving") {
            Some("0") => s.heur.phase_saving = PhaseSaving::None,
            Some("1") => s.heur.phase_saving = PhaseSaving::Limited,
            Some("2") => s.heur.phase_saving = PhaseSaving::Full,
            _ => {}
        }

        if matches.is_present("rnd-init") {
            s.heur.rnd_init_act = true;
        }
        if matches.is_present("no-rnd-init") {
            s.heur.rnd_init_act = false;
        }

        if matches.is_present("luby") {
            s.search.restart.luby_restart = true;
        }
        if matches.is_present("no-luby") {
            s.search.restart.luby_restart = false;
        }

        for &x in matches.value_of("rfirst").and_then(|s| s.parse().ok()).iter() {
            if 0.0 < x {
                s.search.restart.restart_first = x;
            }
        }

        for &x in matches.value_of("rinc").and_then(|s| s.parse().ok()).iter() {
            if 1.0 < x {
                s.search.restart.restart_inc = x;
            }
        }

        for &x in matches.value_of("gc-frac").and_then(|s| s.parse().ok()).iter() {
            if 0.0 < x && x <= 1.0 {
                s.core.garbage_frac = x;
            }
        }

        for &x in matches.value_of("min-learnts").and_then(|s| s.parse().ok()).iter() {
            if 0 <= x {
                s.search.learn.min_learnts_lim = x;
            }
        }

        for &mb in matches.value_of("mem-lim").and_then(|s| s.parse::<usize>().ok()).iter() {
            if 0 < mb {
                s.core.mem_limit = mb.checked_mul(1024 * 1024);
            }
        }

        s.conflict_budget = matches.value_of("conflict-budget").and_then(|s| s.parse().ok());
        s
    };

    let options = dminisat_rust::MainOptions {
        mode: if matches.is_present("batch") {
            dminisat_rust::Mode::Batch
        } else {
            dminisat_rust::Mode::Incremental
        },
        endpoint: path::Path::new(matches.value_of("ipc-dir").unwrap_or("/tmp"))
            .join(matches.value_of("ipc-name").unwrap_or("dminisat")),
    };

    let monitor = Arc::new(Monitor::new());
    {
        let monitor = monitor.clone();
        let res = ctrlc::set_handler(move || {
            println!();
            println!("*** INTERRUPTED ***");
            if verbosity > 0 {
                print!("{}", monitor.report());
                println!();
                println!("*** INTERRUPTED ***");
            }
            process::exit(1);
        });
        if let Err(e) = res {
            warn!("Could not install the interrupt handler: {}", e);
        }
    }

    match dminisat_rust::run(options, settings, monitor.clone()) {
        Ok(()) => {
            if verbosity > 0 {
                print!("{}", monitor.report());
            }
        }

        Err(ref e) if e.is_fatal() => {
            info!("{}", e);
            println!("===============================================================================");
            println!("INDETERMINATE");
            process::exit(0);
        }

        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}
