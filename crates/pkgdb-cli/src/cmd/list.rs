use anyhow::Result;

use crate::SourceArgs;
use crate::ui::list::{print_list_footer, print_list_header, print_list_row};
use crate::view::{PackageView, print_json};

/// List every package, ordered by name
pub fn list(source: &SourceArgs, json: bool) -> Result<()> {
    let db = source.open()?;
    let snap = db.snapshot();

    if json {
        let views: Vec<PackageView<'_>> = snap.iter().map(|r| PackageView::from(&**r)).collect();
        return print_json(&views);
    }

    if snap.is_empty() {
        println!();
        println!("  No packages found.");
        println!(
            "  Check --packages-xml ({}) and --packages-list ({}).",
            source.packages_xml.display(),
            source.packages_list.display()
        );
        return Ok(());
    }

    print_list_header();
    for record in snap.iter() {
        print_list_row(record);
    }
    print_list_footer(snap.len());

    Ok(())
}
