//! `packages.list` parsing.
//!
//! One package per line, fields separated by runs of whitespace:
//!
//! ```text
//! name  ownerId  debug(0|1)  dataPath  securityLabel  gid[,gid]..|none
//! ```
//!
//! Newer platform releases append more columns; those are ignored.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use pkgdb_schema::{OwnerId, PackageRecord};
use tracing::trace;

use crate::error::{DbError, ManifestError, ParseError};
use crate::number::parse_u32;

/// Number of leading columns this parser understands.
pub const LIST_FIELDS: usize = 6;

/// Group-id column value meaning "no supplementary groups".
pub const NO_GROUPS: &str = "none";

/// Pull-based reader yielding one partial [`PackageRecord`] per line.
///
/// Each record is reassembled with `read_until` before it is split, so it
/// does not matter how the underlying stream is chunked. The parser does no
/// work ahead of the consumer; dropping it early is always safe.
#[derive(Debug)]
pub struct ListReader<R> {
    reader: R,
    buf: Vec<u8>,
    line: usize,
    done: bool,
}

impl<R: BufRead> ListReader<R> {
    /// Wrap a buffered reader.
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buf: Vec::new(),
            line: 0,
            done: false,
        }
    }

    /// Read the next non-blank line into `self.buf`, without its terminator.
    fn next_line(&mut self) -> std::io::Result<bool> {
        loop {
            self.buf.clear();
            if self.reader.read_until(b'\n', &mut self.buf)? == 0 {
                return Ok(false);
            }
            self.line += 1;

            if self.buf.last() == Some(&b'\n') {
                self.buf.pop();
            }
            if self.buf.last() == Some(&b'\r') {
                self.buf.pop();
            }
            if self.buf.iter().any(|b| !b.is_ascii_whitespace()) {
                return Ok(true);
            }
        }
    }
}

impl<R: BufRead> Iterator for ListReader<R> {
    type Item = Result<PackageRecord, ManifestError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_line() {
            Ok(true) => Some(parse_line(&self.buf, self.line).map_err(ManifestError::from)),
            Ok(false) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e.into()))
            }
        }
    }
}

/// Parse one non-blank line (terminator already stripped).
///
/// # Errors
///
/// Fails on fewer than six fields, non-UTF-8 content, or an owner id or
/// group id that is not an unsigned 32-bit literal.
pub fn parse_line(raw: &[u8], line: usize) -> Result<PackageRecord, ParseError> {
    let text = std::str::from_utf8(raw).map_err(|_| ParseError::InvalidUtf8 { line })?;
    let fields: Vec<&str> = text.split_ascii_whitespace().collect();
    if fields.len() < LIST_FIELDS {
        return Err(ParseError::MissingFields {
            line,
            found: fields.len(),
        });
    }

    // 0 name, 1 owner id, 2 debug flag (ignored), 3 data path,
    // 4 security label, 5 group ids
    let name = fields[0];
    let owner = parse_u32(fields[1]).map_err(|source| ParseError::InvalidNumber {
        field: "ownerId",
        package: name.to_string(),
        value: fields[1].to_string(),
        source,
    })?;
    let group_ids = parse_group_ids(name, fields[5])?;

    if fields.len() > LIST_FIELDS {
        trace!(line, package = name, extra = fields.len() - LIST_FIELDS, "ignoring trailing columns");
    }

    let mut record = PackageRecord::new(name, OwnerId::new(owner));
    record.data_path = Some(PathBuf::from(fields[3]));
    record.security_label = Some(fields[4].to_string());
    record.group_ids = group_ids;
    Ok(record)
}

fn parse_group_ids(package: &str, field: &str) -> Result<Vec<u32>, ParseError> {
    if field == NO_GROUPS {
        return Ok(Vec::new());
    }
    field
        .split(',')
        .map(|gid| {
            parse_u32(gid).map_err(|source| ParseError::InvalidNumber {
                field: "groupId",
                package: package.to_string(),
                value: gid.to_string(),
                source,
            })
        })
        .collect()
}

/// Parse a whole line manifest from a reader.
///
/// # Errors
///
/// Returns the first read or grammar failure; nothing is returned for the
/// lines before it.
pub fn parse_packages_list<R: BufRead>(reader: R) -> Result<Vec<PackageRecord>, ManifestError> {
    ListReader::new(reader).collect()
}

/// Open and parse the line manifest at `path`.
///
/// # Errors
///
/// I/O and grammar failures are reported against `path`.
pub fn load_packages_list(path: &Path) -> Result<Vec<PackageRecord>, DbError> {
    let file = File::open(path).map_err(|e| DbError::io(path, e))?;
    parse_packages_list(BufReader::new(file)).map_err(|e| DbError::from_manifest(path, e))
}
