fn main() {
    if let Err(err) = archdiag::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
