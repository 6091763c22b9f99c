//! Error taxonomy for manifest parsing and registry refreshes.

use std::num::ParseIntError;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// A field in one of the manifests violates its grammar.
///
/// Every variant carries enough context (package, field, raw text) to
/// diagnose the problem without re-reading the file.
#[derive(Error, Debug)]
pub enum ParseError {
    /// A line-manifest record has fewer than six fields.
    #[error("line {line}: expected at least 6 fields, found {found}")]
    MissingFields {
        /// 1-based line number.
        line: usize,
        /// Number of fields actually present.
        found: usize,
    },

    /// A line-manifest record is not valid UTF-8.
    #[error("line {line}: not valid UTF-8")]
    InvalidUtf8 {
        /// 1-based line number.
        line: usize,
    },

    /// A numeric field is not an unsigned 32-bit literal.
    #[error("Cannot parse {field} <{value}> for {package}: {source}")]
    InvalidNumber {
        /// Name of the offending field.
        field: &'static str,
        /// Package the field belongs to.
        package: String,
        /// Raw text of the field.
        value: String,
        /// Underlying conversion error.
        #[source]
        source: ParseIntError,
    },

    /// Neither `userId` nor `sharedUserId` resolves to a non-zero owner id.
    #[error("{package}: owner id and shared owner id both absent")]
    MissingOwnerId {
        /// Package without an owner id.
        package: String,
    },

    /// The signing certificate of a package could not be decoded.
    #[error("{package}: {source}")]
    Certificate {
        /// Package whose certificate failed.
        package: String,
        /// What went wrong.
        #[source]
        source: CertificateError,
    },

    /// A `<package>` element has no `name` attribute.
    #[error("package element at byte {position} has no name")]
    MissingName {
        /// Byte offset of the element in the document.
        position: u64,
    },

    /// Two `<package>` elements declare the same name.
    #[error("package {name} is declared more than once")]
    DuplicatePackage {
        /// The repeated name.
        name: String,
    },

    /// The markup document is not well-formed.
    #[error("malformed document at byte {position}: {source}")]
    Markup {
        /// Byte offset where the reader stopped.
        position: u64,
        /// Underlying reader error.
        #[source]
        source: quick_xml::Error,
    },

    /// The markup document's root element is not `<packages>`.
    #[error("expected root element <packages>, found <{found}>")]
    UnexpectedRoot {
        /// Name of the root element actually found.
        found: String,
    },

    /// The markup document ended before the root element was closed.
    #[error("document ended before </packages>")]
    UnexpectedEof,
}

/// Hex or DER decoding of a signing certificate failed.
#[derive(Error, Debug)]
pub enum CertificateError {
    /// The key material is not valid hex.
    #[error("Can't decode cert hex: {0}")]
    Hex(#[from] hex::FromHexError),

    /// The decoded bytes are not a DER X.509 certificate.
    #[error("Can't parse X509 DER cert: {0}")]
    Der(#[from] x509_cert::der::Error),
}

/// Error from a streaming manifest parser.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Reading the underlying stream failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The content violates the manifest grammar.
    #[error(transparent)]
    Parse(#[from] ParseError),
}

/// Error surfaced by [`PackageDb`](crate::PackageDb) operations.
#[derive(Error, Debug)]
pub enum DbError {
    /// A manifest could not be opened or read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        /// Manifest that failed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A manifest could not be parsed.
    #[error("Cannot parse {}: {source}", path.display())]
    Parse {
        /// Manifest that failed.
        path: PathBuf,
        /// What was wrong with it.
        #[source]
        source: ParseError,
    },
}

impl DbError {
    /// Attach the manifest path to a streaming parser error.
    pub fn from_manifest(path: &Path, err: ManifestError) -> Self {
        match err {
            ManifestError::Io(source) => Self::io(path, source),
            ManifestError::Parse(source) => Self::parse(path, source),
        }
    }

    /// An I/O failure on `path`.
    pub fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// A grammar failure in `path`.
    pub fn parse(path: &Path, source: ParseError) -> Self {
        Self::Parse {
            path: path.to_path_buf(),
            source,
        }
    }

    /// The manifest this error refers to.
    pub fn path(&self) -> &Path {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }

    /// Whether this is a grammar failure rather than an I/O failure.
    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}
