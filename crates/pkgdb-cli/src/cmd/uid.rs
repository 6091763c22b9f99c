//! `pkgdb uid`

use anyhow::{Context, Result, bail};
use pkgdb_core::number::parse_u32;
use pkgdb_schema::OwnerId;

use crate::SourceArgs;
use crate::cmd::info::print_record;
use crate::ui::list::{print_list_footer, print_list_header, print_list_row};
use crate::view::{PackageView, print_json};

/// Show the first (or every) package running under `uid`
pub fn uid(source: &SourceArgs, uid: &str, all: bool, json: bool) -> Result<()> {
    let owner = OwnerId::new(parse_u32(uid).with_context(|| format!("Invalid uid '{uid}'"))?);
    let db = source.open()?;

    if !all {
        let Some(record) = db.get_first_by_owner_id(owner) else {
            bail!("No package runs as uid {owner}");
        };
        if json {
            return print_json(&PackageView::from(&*record));
        }
        print_record(&record);
        return Ok(());
    }

    let records = db.get_all_by_owner_id(owner);
    if records.is_empty() {
        bail!("No package runs as uid {owner}");
    }
    if json {
        let views: Vec<PackageView<'_>> = records.iter().map(|r| PackageView::from(&**r)).collect();
        return print_json(&views);
    }

    print_list_header();
    for record in &records {
        print_list_row(record);
    }
    print_list_footer(records.len());
    Ok(())
}
