//! Colored terminal output helpers.
//!
//! Status messages go through these functions so we get consistent
//! styling across every command.  Payloads (names, record text,
//! generated passwords) are printed plainly so they can be piped.

use console::style;

/// Print a green success message: "check_mark {msg}"
pub fn success(msg: &str) {
    println!("{} {}", style("\u{2713}").green().bold(), msg);
}

/// Print a red error message: "x_mark {msg}"
pub fn error(msg: &str) {
    eprintln!("{} {}", style("\u{2717}").red().bold(), msg);
}

/// Print a blue info message: "info_sign {msg}"
pub fn info(msg: &str) {
    println!("{} {}", style("\u{2139}").blue().bold(), msg);
}

/// Print a dim tip/hint: "arrow {msg}"
pub fn tip(msg: &str) {
    println!("{} {}", style("\u{2192}").dim(), style(msg).dim());
}

/// Print record names, one per line.
pub fn print_names(names: &[String]) {
    if names.is_empty() {
        info("No records in this store yet.");
        tip("Run `pwstore edit --name <NAME>` to add your first record.");
        return;
    }

    for name in names {
        println!("{name}");
    }
}
