//! pc binary entry point.

fn main() {
    if let Err(e) = pcshell::cli::run() {
        eprintln!("error: {:#}", e);
        std::process::exit(1);
    }
}
