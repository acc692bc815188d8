//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = saferoads_cli::run() {
        eprintln!("saferoads: {err}");
        std::process::exit(1);
    }
}
