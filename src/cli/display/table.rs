//! Table builder wrapper around comfy-table for consistent list display.

use comfy_table::{presets, Cell, CellAlignment, ContentArrangement, Table};
use console::style;

use crate::domain::models::{EvidenceBullet, Peak, Report};

use super::colors::{colorize_confidence, colorize_convergence};

/// Create a standard list table with the given headers.
///
/// Uses the NOTHING preset (no borders) for a clean CLI aesthetic.
pub fn list_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(presets::NOTHING)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h.to_uppercase()).set_alignment(CellAlignment::Left)),
        );
    table
}

/// Render the table to string with a count header.
pub fn render_list(entity_name: &str, table: &Table, total: usize) -> String {
    if total == 0 {
        return format!("No {entity_name}s found.");
    }
    let count_line = format!(
        "{} {}:",
        style(total).bold(),
        if total == 1 {
            entity_name.to_string()
        } else {
            format!("{entity_name}s")
        }
    );
    format!("{count_line}\n{table}")
}

pub fn peak_table(peaks: &[Peak]) -> Table {
    let mut table = list_table(&["index", "delta", "prominence", "width", "bases", "confidence"]);
    for p in peaks {
        table.add_row(vec![
            p.index.to_string(),
            format!("{:.4}", p.delta),
            format!("{:.4}", p.prominence),
            p.width.to_string(),
            format!("{}..{}", p.left_base, p.right_base),
            colorize_confidence(p.confidence).to_string(),
        ]);
    }
    table
}

pub fn evidence_table(evidence: &[EvidenceBullet]) -> Table {
    let mut table = list_table(&["motif", "count", "persisted", "confidence"]);
    for e in evidence {
        table.add_row(vec![
            e.motif.clone(),
            e.count.to_string(),
            format!("{}w", e.persisted),
            colorize_confidence(e.confidence).to_string(),
        ]);
    }
    table
}

pub fn report_table(reports: &[Report]) -> Table {
    let mut table = list_table(&["t", "convergence", "stability", "fractal", "jaccard", "top motif"]);
    for r in reports {
        table.add_row(vec![
            format!("{:.0}", r.t),
            colorize_convergence(r.metrics.convergence).to_string(),
            format!("{:.3}", r.metrics.stability),
            format!("{:.3}", r.metrics.fractal_dim),
            format!("{:.3}", r.metrics.jaccard_prev),
            r.top_motifs
                .first()
                .map_or_else(|| "-".to_string(), |m| format!("{}\u{d7}{}", m.motif, m.count)),
        ]);
    }
    table
}
