//! Command-line front end for the mod bridge injection engine.

use bridge_core::{
    CancelToken, InjectionEngine, InjectionRequest, ProcessEnumerator, StatusSink,
};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "bridge")]
#[command(about = "Inject a mod loader DLL into a running game process", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List running processes (pid and executable name)
    List {
        /// Only show processes whose name contains this text
        #[arg(value_name = "FILTER")]
        filter: Option<String>,
    },

    /// Inject a DLL into a running process
    Inject {
        /// Target process: a PID or an executable name
        #[arg(value_name = "PROCESS")]
        process: String,

        /// Path to the DLL to inject
        #[arg(value_name = "DLL_PATH")]
        dll_path: PathBuf,

        /// Relaunch elevated without asking when privileges are missing
        #[arg(long)]
        auto_elevate: bool,
    },
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    match args.command {
        Command::List { filter } => list_processes(filter.as_deref()),
        Command::Inject {
            process,
            dll_path,
            auto_elevate,
        } => inject(&process, &dll_path, auto_elevate),
    }
}

fn list_processes(filter: Option<&str>) {
    let processes = match filter {
        Some(name) => ProcessEnumerator::find_by_name(name),
        None => ProcessEnumerator::enumerate(),
    };

    match processes {
        Ok(processes) => {
            for process in &processes {
                println!("{:>8}  {}", process.pid, process.name);
            }
            println!("{} processes", processes.len());
        }
        Err(e) => {
            eprintln!("❌ Failed to enumerate processes: {}", e);
            std::process::exit(1);
        }
    }
}

fn inject(process: &str, dll_path: &std::path::Path, auto_elevate: bool) {
    let pid = resolve_target(process);

    let dll_path = if dll_path.is_absolute() {
        dll_path.to_path_buf()
    } else {
        std::env::current_dir()
            .expect("failed to get current directory")
            .join(dll_path)
    };

    println!("💉 Injecting {} into PID {}", dll_path.display(), pid);

    let sink = PrintSink;
    let outcome = InjectionEngine::new().inject(
        &InjectionRequest::new(pid, dll_path),
        &sink,
        &CancelToken::new(),
    );

    if outcome.succeeded {
        println!("✅ {} ({:?})", outcome.message, outcome.elapsed);
        return;
    }

    if outcome.needs_elevation() {
        println!("{}", outcome.output);
        if auto_elevate || confirm("Restart elevated now?") {
            if let Err(e) = bridge_core::relaunch_elevated() {
                eprintln!("❌ Elevated relaunch failed: {}", e);
                std::process::exit(1);
            }
            // relaunch_elevated exits the process on success
        }
        std::process::exit(2);
    }

    eprintln!("❌ {} [{}]", outcome.message, outcome.error_code);
    std::process::exit(1);
}

/// Accepts either a PID or an executable name; a name must match exactly
/// one running process.
fn resolve_target(process: &str) -> u32 {
    if let Ok(pid) = process.parse::<u32>() {
        return pid;
    }

    match ProcessEnumerator::find_by_name(process) {
        Ok(matches) if matches.len() == 1 => matches[0].pid,
        Ok(matches) if matches.is_empty() => {
            eprintln!("❌ No process matching '{}'", process);
            std::process::exit(1);
        }
        Ok(matches) => {
            eprintln!("❌ '{}' is ambiguous, matches:", process);
            for m in matches {
                eprintln!("   {:>8}  {}", m.pid, m.name);
            }
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ Failed to enumerate processes: {}", e);
            std::process::exit(1);
        }
    }
}

fn confirm(prompt: &str) -> bool {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().ok();
    let mut answer = String::new();
    std::io::stdin().read_line(&mut answer).ok();
    matches!(answer.trim(), "y" | "Y" | "yes")
}

/// Prints live engine status lines to the terminal.
struct PrintSink;

impl StatusSink for PrintSink {
    fn report(&self, message: &str) {
        println!("   {}", message);
    }
}
