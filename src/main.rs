fn main() {
    if let Err(e) = snakewm_lib::run() {
        eprintln!("snakewm: {}", e);
        std::process::exit(1);
    }
}
