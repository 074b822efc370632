//! Line protocol for hosts that run navfilter as a helper process.
//!
//! Each input line is `<category-tag> <url>`, or just `<url>` for a request of
//! unknown category. Each answer is one [`HostResponse`] JSON object per line,
//! in input order. Blank lines are skipped.

use std::io::{BufRead, Write};

use crate::category::ResourceCategory;
use crate::error::Result;
use crate::policy::{EngineHandle, RequestDescriptor};
use crate::response::HostResponse;

/// Split a request line into its category and URL.
pub fn parse_line(line: &str) -> Option<RequestDescriptor<'_>> {
    let line = line.trim();
    if line.is_empty() {
        return None;
    }
    let descriptor = match line.split_once(char::is_whitespace) {
        Some((tag, url)) => RequestDescriptor::from_tag(url.trim(), tag),
        None => RequestDescriptor::new(line, ResourceCategory::Other),
    };
    Some(descriptor)
}

/// Answer every request line from `reader` until end of input.
///
/// Returns the number of requests answered. The active engine is looked up
/// per line so a reload takes effect on the next request. Lines that are not
/// valid UTF-8 are decoded lossily; such a URL matches no rule and is allowed.
pub fn run_pipe<R: BufRead, W: Write>(
    handle: &EngineHandle,
    reader: &mut R,
    writer: &mut W,
) -> Result<usize> {
    let mut answered = 0;
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let line = String::from_utf8_lossy(&buf);
        let Some(req) = parse_line(&line) else {
            continue;
        };
        let response = HostResponse::from(handle.evaluate(&req));
        writeln!(writer, "{}", response.to_json()?)?;
        writer.flush()?;
        answered += 1;
    }
    Ok(answered)
}
