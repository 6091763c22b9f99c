//! `pkgdb name`

use anyhow::{Result, bail};
use crossterm::style::Stylize;
use pkgdb_schema::PackageRecord;

use crate::SourceArgs;
use crate::ui::Theme;
use crate::view::{PackageView, print_json, timestamp};

/// Show one package in detail
pub fn info(source: &SourceArgs, name: &str, json: bool) -> Result<()> {
    let db = source.open()?;
    let Some(record) = db.get_by_name(name) else {
        bail!("Package '{name}' not found");
    };

    if json {
        return print_json(&PackageView::from(&*record));
    }
    print_record(&record);
    Ok(())
}

/// Render the detail view used by `name` and `uid`
pub fn print_record(record: &PackageRecord) {
    let theme = Theme::default();
    let lw = theme.layout.label_width;
    let none = || "-".dark_grey().to_string();

    println!();
    println!(
        "  {} {}",
        record.name.as_str().white().bold(),
        format!("uid {}", record.owner_id).dark_grey()
    );
    println!();

    let gids = if record.group_ids.is_empty() {
        none()
    } else {
        record
            .group_ids
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join(",")
    };
    println!("  {:<lw$}{}", "gids", gids);
    println!(
        "  {:<lw$}{}",
        "data",
        record
            .data_path
            .as_ref()
            .map_or_else(none, |p| p.display().to_string())
    );
    println!(
        "  {:<lw$}{}",
        "code",
        record
            .install_path
            .as_ref()
            .map_or_else(none, |p| p.display().to_string())
    );
    println!(
        "  {:<lw$}{}",
        "seinfo",
        record.security_label.clone().unwrap_or_else(none)
    );

    let Some(signer) = &record.signer else {
        println!("  {:<lw$}{}", "signer", none());
        return;
    };
    println!("  {:<lw$}{}", "signer", signer.subject());
    println!("  {:<lw$}{}", "issuer", signer.issuer());
    println!("  {:<lw$}{}", "serial", signer.serial_hex());
    println!(
        "  {:<lw$}{} .. {}",
        "valid",
        timestamp(signer.not_before()),
        timestamp(signer.not_after())
    );
    println!("  {:<lw$}{}", "sha1", signer.fingerprint());
    println!("  {:<lw$}{}", "sha256", signer.sha256().to_string().dark_grey());
}
