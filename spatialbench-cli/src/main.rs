fn main() {
    if let Err(e) = spatialbench_cli::run() {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
