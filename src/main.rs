fn main() {
    if let Err(err) = switchboard::cli::main() {
        eprintln!("❌ {err}");
        std::process::exit(1);
    }
}
