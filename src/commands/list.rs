//! List mode: print installed games and exit.

use std::io::{self, Write};

use crate::catalog::Catalog;
use crate::size::format_size;

/// Longest name shown before truncation.
const MAX_NAME_WIDTH: usize = 50;

/// Write the catalog as a table of name, reported size and Proton usage.
pub fn write_listing(catalog: &Catalog, out: &mut impl Write) -> io::Result<()> {
    if catalog.is_empty() {
        writeln!(out, "No installed games found.")?;
        return Ok(());
    }

    writeln!(out, "Found {} installed games:\n", catalog.len())?;

    let name_width = catalog
        .iter()
        .map(|g| g.name.chars().count())
        .max()
        .unwrap_or(0)
        .min(MAX_NAME_WIDTH);

    for game in catalog {
        let name: String = game.name.chars().take(MAX_NAME_WIDTH).collect();
        let layer = if game.has_compatdata { "Proton" } else { "Native" };
        writeln!(
            out,
            "  {name:<name_width$}  {:>10}  {layer}",
            format_size(game.size_on_disk)
        )?;
    }

    writeln!(out, "\nTotal: {} games", catalog.len())?;
    Ok(())
}
