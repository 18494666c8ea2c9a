//! Styled terminal output.
//!
//! Status lines are prefixed with a colored glyph.  Success, info and
//! tips go to stdout; warnings and errors go to stderr.  A revealed
//! secret is printed bare by `secret` so it can be piped.

use std::fmt::Display;

use comfy_table::{ContentArrangement, Table};
use console::{style, StyledObject};

use crate::vault::Listing;

enum Stream {
    Out,
    Err,
}

fn line(stream: Stream, glyph: StyledObject<&str>, msg: impl Display) {
    match stream {
        Stream::Out => println!("{glyph} {msg}"),
        Stream::Err => eprintln!("{glyph} {msg}"),
    }
}

pub fn success(msg: &str) {
    line(Stream::Out, style("\u{2713}").green().bold(), msg);
}

pub fn error(msg: &str) {
    line(Stream::Err, style("\u{2717}").red().bold(), msg);
}

pub fn warning(msg: &str) {
    line(Stream::Err, style("\u{26a0}").yellow().bold(), msg);
}

pub fn info(msg: &str) {
    line(Stream::Out, style("\u{2139}").blue().bold(), msg);
}

/// Dimmed hint pointing at the next command to run.
pub fn tip(msg: &str) {
    line(Stream::Out, style("\u{2192}").dim(), style(msg).dim());
}

/// Print a revealed value with nothing around it.
pub fn secret(value: &str) {
    println!("{value}");
}

/// Render a listing as a two-column table, one row per secret.
///
/// The category cell is only filled on the first row of each group.
pub fn print_listing(listing: &Listing) {
    if listing.is_empty() {
        info("No matching secrets.");
        tip("Run `shroud add <NAME>` to add a secret.");
        return;
    }

    let mut table = Table::new();
    table
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Category", "Name"]);

    for (category, names) in listing {
        for (i, name) in names.iter().enumerate() {
            let group = if i == 0 { category.as_str() } else { "" };
            table.add_row(vec![group, name.as_str()]);
        }
    }

    println!("{table}");
}
