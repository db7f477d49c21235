fn main() {
    if let Err(err) = believe_notify_lib::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
