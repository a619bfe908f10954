fn main() {
    if let Err(err) = marine_accidents::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
