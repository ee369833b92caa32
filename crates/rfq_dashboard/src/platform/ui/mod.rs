use std::io::{self, Write};

pub mod render;

/// Writes lines to stdout under one lock so concurrent output never interleaves.
pub fn print_lines<S: AsRef<str>>(lines: &[S]) {
    let mut out = io::stdout().lock();
    for line in lines {
        let _ = writeln!(out, "{}", line.as_ref());
    }
    let _ = out.flush();
}
