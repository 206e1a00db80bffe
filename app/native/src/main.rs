//! Banners - command-line tooling for front-matter banners.
//!
//! Resolves banners for notes in a vault, converts legacy banner values and
//! manages the settings file.

fn main() {
    if let Err(err) = banners_lib::cli::run() {
        eprintln!("banners: {err}");
        std::process::exit(1);
    }
}
