//! Text reports over categorized regions.

use std::fmt;

use crate::category::Selection;
use crate::classifier::CategorizedRegions;

/// Renders each selected category as a numbered list, in report order.
///
/// A selected category with no regions still gets a heading marked
/// `(No entries)`. An empty selection renders nothing.
pub fn render(categorized: &CategorizedRegions, selection: Selection) -> String {
    Report {
        categorized,
        selection,
    }
    .to_string()
}

/// One line per category with its region count and total mapped size.
pub fn render_summary(categorized: &CategorizedRegions) -> String {
    Summary { categorized }.to_string()
}

struct Report<'a> {
    categorized: &'a CategorizedRegions,
    selection: Selection,
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for category in self.selection.categories() {
            let regions = self.categorized.get(category);
            let heading = category.label().to_uppercase();

            if regions.is_empty() {
                writeln!(f, "\n--- {heading} SECTIONS (No entries) ---\n")?;
                continue;
            }

            writeln!(f, "\n--- {heading} SECTIONS ---\n")?;
            for (n, region) in regions.iter().enumerate() {
                writeln!(f, "{}: {}", n + 1, region)?;
            }
        }
        Ok(())
    }
}

struct Summary<'a> {
    categorized: &'a CategorizedRegions,
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{:<12} {:>8} {:>12}", "Category", "Regions", "Size(KB)")?;

        for (category, regions) in self.categorized.iter() {
            // Ranges span up to the full 64-bit space, so the total saturates.
            let size_kb = regions
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.size()))
                / 1024;
            writeln!(f, "{:<12} {:>8} {:>12}", category.label(), regions.len(), size_kb)?;
        }
        writeln!(f, "{:<12} {:>8}", "total", self.categorized.total())
    }
}
