fn main() {
    if let Err(err) = stepflow::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
