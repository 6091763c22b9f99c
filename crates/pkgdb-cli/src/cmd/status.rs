//! `pkgdb status`

use anyhow::Result;
use crossterm::style::Stylize;

use crate::SourceArgs;
use crate::ui::Theme;
use crate::view::{StatusView, print_json};

/// Show where the manifests are read from and what the snapshot holds
pub fn status(source: &SourceArgs, json: bool) -> Result<()> {
    let db = source.open()?;
    let snap = db.snapshot();
    let view = StatusView::new(db.paths(), &snap);

    if json {
        return print_json(&view);
    }

    let theme = Theme::default();
    let lw = theme.layout.label_width;
    let last_update = chrono::DateTime::<chrono::Local>::from(snap.built_at())
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    println!();
    println!(
        "  {} {}",
        "pkgdb".white().bold(),
        crate::VERSION.dark_grey()
    );
    println!();
    println!("  {:<lw$}{}", "xml", view.packages_xml);
    println!("  {:<lw$}{}", "list", view.packages_list);
    println!("  {:<lw$}{}", "updated", last_update);
    println!("  {:<lw$}{}", "generation", view.generation);
    println!("  {:<lw$}{}", "packages", view.packages);
    println!("  {:<lw$}{}", "uids", view.uids);

    let unsigned = snap.iter().filter(|r| r.signer.is_none()).count();
    if unsigned > 0 {
        println!(
            "  {:<lw$}{}",
            "unsigned",
            unsigned.to_string().with(theme.colors.warning)
        );
    }
    Ok(())
}
