//! `packages.xml` parsing.
//!
//! Only the pieces the registry needs are read:
//!
//! ```text
//! <packages>
//!   <version sdkVersion=".." databaseVersion=".." />        (skipped)
//!   <package name=".." codePath=".." userId=".." sharedUserId="..">
//!     <sigs count="1">
//!       <cert index="0" key="3082...." />
//!     </sigs>
//!   </package>
//!   <shared-user .. />                                     (skipped)
//! </packages>
//! ```
//!
//! The platform writes each distinct certificate once; later packages signed
//! with the same key carry `<cert index="N"/>` without `key`.

use std::borrow::Cow;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use pkgdb_schema::{OwnerId, PackageRecord};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::{trace, warn};

use crate::cert::decode_certificate;
use crate::error::{DbError, ParseError};
use crate::number::parse_u32;
use crate::options::CertificatePolicy;

const ROOT: &[u8] = b"packages";
const PACKAGE: &[u8] = b"package";
const SIGS: &[u8] = b"sigs";
const CERT: &[u8] = b"cert";

// Element depths, root = 1.
const PACKAGE_DEPTH: usize = 2;
const SIGS_DEPTH: usize = 3;
const CERT_DEPTH: usize = 4;

/// A `<package>` element whose children are still being read.
#[derive(Debug, Default)]
struct PendingPackage {
    name: String,
    code_path: Option<String>,
    user_id: Option<String>,
    shared_user_id: Option<String>,
    cert_key: Option<String>,
    position: u64,
}

impl PendingPackage {
    fn owner_id(&self) -> Result<OwnerId, ParseError> {
        let user_id = self.numeric("userId", self.user_id.as_deref())?;
        if user_id > 0 {
            return Ok(OwnerId::new(user_id));
        }
        let shared = self.numeric("sharedUserId", self.shared_user_id.as_deref())?;
        if shared > 0 {
            return Ok(OwnerId::new(shared));
        }
        Err(ParseError::MissingOwnerId {
            package: self.name.clone(),
        })
    }

    /// Absent or empty attributes count as zero.
    fn numeric(&self, field: &'static str, raw: Option<&str>) -> Result<u32, ParseError> {
        match raw {
            None | Some("") => Ok(0),
            Some(value) => parse_u32(value).map_err(|source| ParseError::InvalidNumber {
                field,
                package: self.name.clone(),
                value: value.to_string(),
                source,
            }),
        }
    }
}

struct XmlParser {
    policy: CertificatePolicy,
    records: Vec<PackageRecord>,
    seen: HashSet<String>,
    /// Key material declared so far, by `<cert index>`.
    keys: HashMap<String, String>,
    current: Option<PendingPackage>,
    in_sigs: bool,
}

impl XmlParser {
    fn new(policy: CertificatePolicy) -> Self {
        Self {
            policy,
            records: Vec::new(),
            seen: HashSet::new(),
            keys: HashMap::new(),
            current: None,
            in_sigs: false,
        }
    }

    fn open(&mut self, e: &BytesStart<'_>, depth: usize, position: u64) -> Result<(), ParseError> {
        let name = e.name();
        let tag = name.as_ref();
        match depth {
            1 if tag != ROOT => Err(ParseError::UnexpectedRoot {
                found: String::from_utf8_lossy(tag).into_owned(),
            }),
            PACKAGE_DEPTH if tag == PACKAGE => {
                self.current = Some(read_package(e, position)?);
                Ok(())
            }
            SIGS_DEPTH if tag == SIGS && self.current.is_some() => {
                self.in_sigs = true;
                Ok(())
            }
            CERT_DEPTH if tag == CERT && self.in_sigs => self.read_cert(e, position),
            _ => Ok(()),
        }
    }

    fn close(&mut self, depth: usize) -> Result<(), ParseError> {
        match depth {
            PACKAGE_DEPTH => {
                if let Some(pending) = self.current.take() {
                    self.finish(pending)?;
                }
            }
            SIGS_DEPTH => self.in_sigs = false,
            _ => {}
        }
        Ok(())
    }

    fn read_cert(&mut self, e: &BytesStart<'_>, position: u64) -> Result<(), ParseError> {
        let mut index = None;
        let mut key = None;
        for attr in e.attributes() {
            let attr = attr.map_err(|err| markup(position, err.into()))?;
            match attr.key.as_ref() {
                b"index" => index = Some(attr_value(&attr, position)?.into_owned()),
                b"key" => key = Some(attr_value(&attr, position)?.into_owned()),
                _ => {}
            }
        }

        let resolved = match (key, index) {
            (Some(key), Some(index)) => {
                self.keys.insert(index, key.clone());
                Some(key)
            }
            (Some(key), None) => Some(key),
            (None, Some(index)) => self.keys.get(&index).cloned(),
            (None, None) => None,
        };

        if let Some(pending) = self.current.as_mut() {
            // First signer wins.
            if pending.cert_key.is_none() {
                pending.cert_key = resolved;
            }
        }
        Ok(())
    }

    fn finish(&mut self, pending: PendingPackage) -> Result<(), ParseError> {
        if pending.name.is_empty() {
            return Err(ParseError::MissingName {
                position: pending.position,
            });
        }
        if !self.seen.insert(pending.name.clone()) {
            return Err(ParseError::DuplicatePackage { name: pending.name });
        }

        let owner_id = pending.owner_id()?;
        let mut record = PackageRecord::new(pending.name.as_str(), owner_id);
        record.install_path = pending.code_path.as_deref().map(PathBuf::from);

        if let Some(key) = pending.cert_key.as_deref() {
            match decode_certificate(key) {
                Ok(signer) => record.signer = signer,
                Err(source) => match self.policy {
                    CertificatePolicy::Strict => {
                        return Err(ParseError::Certificate {
                            package: pending.name,
                            source,
                        });
                    }
                    CertificatePolicy::Lenient => {
                        warn!(package = %pending.name, error = %source, "dropping undecodable certificate");
                    }
                },
            }
        }

        trace!(package = %record.name, owner = %record.owner_id, "parsed package element");
        self.records.push(record);
        Ok(())
    }
}

fn read_package(e: &BytesStart<'_>, position: u64) -> Result<PendingPackage, ParseError> {
    let mut pending = PendingPackage {
        position,
        ..PendingPackage::default()
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|err| markup(position, err.into()))?;
        let slot = match attr.key.as_ref() {
            b"name" => {
                pending.name = attr_value(&attr, position)?.into_owned();
                continue;
            }
            b"codePath" => &mut pending.code_path,
            b"userId" => &mut pending.user_id,
            b"sharedUserId" => &mut pending.shared_user_id,
            // nativeLibraryPath, publicFlags, installer, version, ...
            _ => continue,
        };
        *slot = Some(attr_value(&attr, position)?.into_owned());
    }
    Ok(pending)
}

fn attr_value<'a>(
    attr: &quick_xml::events::attributes::Attribute<'a>,
    position: u64,
) -> Result<Cow<'a, str>, ParseError> {
    attr.unescape_value().map_err(|err| markup(position, err))
}

fn markup(position: u64, source: quick_xml::Error) -> ParseError {
    ParseError::Markup { position, source }
}

/// Parse a markup manifest held in memory.
///
/// Records come back in document order.
///
/// # Errors
///
/// Fails on malformed markup, a root other than `<packages>`, a package
/// without name or owner id, a repeated package name, a non-numeric id, or
/// (under [`CertificatePolicy::Strict`]) an undecodable certificate.
pub fn parse_packages_xml(
    data: &[u8],
    policy: CertificatePolicy,
) -> Result<Vec<PackageRecord>, ParseError> {
    let mut reader = Reader::from_reader(data);
    reader.config_mut().expand_empty_elements = true;

    let mut parser = XmlParser::new(policy);
    let mut depth = 0usize;

    loop {
        let position = reader.buffer_position();
        match reader.read_event() {
            Err(err) => return Err(markup(reader.error_position(), err)),
            Ok(Event::Start(e)) => {
                depth += 1;
                parser.open(&e, depth, position)?;
            }
            Ok(Event::End(_)) => {
                parser.close(depth)?;
                depth -= 1;
                if depth == 0 {
                    break;
                }
            }
            Ok(Event::Eof) => return Err(ParseError::UnexpectedEof),
            Ok(_) => {}
        }
    }

    Ok(parser.records)
}

/// Read and parse the markup manifest at `path`.
///
/// # Errors
///
/// I/O and grammar failures are reported against `path`.
pub fn load_packages_xml(
    path: &Path,
    policy: CertificatePolicy,
) -> Result<Vec<PackageRecord>, DbError> {
    let data = std::fs::read(path).map_err(|e| DbError::io(path, e))?;
    parse_packages_xml(&data, policy).map_err(|e| DbError::parse(path, e))
}
