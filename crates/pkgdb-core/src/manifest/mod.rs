//! Parsers for the two on-disk package manifests.
//!
//! - [`list`]: the line-oriented `packages.list` (owner id, data path,
//!   security label, group ids).
//! - [`xml`]: the markup `packages.xml` (identity, owner id resolution,
//!   install path, signing certificate).

pub mod list;
pub mod xml;

pub use list::{ListReader, load_packages_list, parse_packages_list};
pub use xml::{load_packages_xml, parse_packages_xml};
