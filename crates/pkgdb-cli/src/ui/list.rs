//! Column-aligned rendering for `pkgdb list` and `pkgdb uid --all`.

use super::theme::Theme;
use crossterm::style::Stylize;
use pkgdb_schema::PackageRecord;

/// Print column headers
pub fn print_list_header() {
    let theme = Theme::default();

    println!();
    let header = format!(
        "  {:<nw$} {:>uw$}   {}",
        "name",
        "uid",
        "signer",
        nw = theme.layout.name_width,
        uw = theme.layout.uid_width,
    );
    println!("{}", header.with(theme.colors.header));
}

/// Print one package row
pub fn print_list_row(record: &PackageRecord) {
    let theme = Theme::default();

    let name_part = format!("{:<width$}", record.name.as_str(), width = theme.layout.name_width);
    let uid_part = format!("{:>width$}", record.owner_id.get(), width = theme.layout.uid_width);
    let signer = record
        .signer
        .as_ref()
        .map(|s| s.common_name().unwrap_or_else(|| short_hex(&s.fingerprint().to_hex())))
        .unwrap_or_default();

    println!(
        "  {} {}   {}",
        name_part.with(theme.colors.package_name),
        uid_part.with(theme.colors.uid),
        signer.with(theme.colors.secondary)
    );
}

/// Print the package count
pub fn print_list_footer(count: usize) {
    let theme = Theme::default();

    println!();
    let noun = if count == 1 { "package" } else { "packages" };
    println!("{}", format!("  {count} {noun}").with(theme.colors.secondary));
}

fn short_hex(hex: &str) -> String {
    hex.chars().take(12).collect()
}
