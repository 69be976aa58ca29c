//! What querytree prints.
//!
//! Trees, config and choice lists go to stdout uncoloured so they can be
//! piped. Diagnostics (script warnings, errors) go to stderr. `colored`
//! honours NO_COLOR and CLICOLOR_FORCE.

use std::fmt::Display;

use colored::Colorize;

pub fn error(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "error".red().bold(), msg);
}

/// A script edit that was applied but uses a value outside the choice lists.
pub fn warning(msg: &(impl Display + ?Sized)) {
    eprintln!("{}: {}", "warning".yellow().bold(), msg);
}

pub fn success(msg: &(impl Display + ?Sized)) {
    println!("{} {}", "✓".green(), msg);
}

/// `label: value` line, e.g. a config location.
pub fn labelled(label: &str, value: &(impl Display + ?Sized)) {
    println!("{}: {}", label.green(), value);
}

/// Heading above a choice list or above one snapshot of `run --each`.
pub fn section(title: &(impl Display + ?Sized)) {
    println!("{}", title.to_string().cyan().bold());
}

/// One entry of a choice list.
pub fn item(entry: &(impl Display + ?Sized)) {
    println!("  {}", entry);
}

/// Rendered tree or TOML, printed verbatim.
pub fn document(text: &(impl Display + ?Sized)) {
    println!("{}", text);
}
