use comfy_table::{Cell, Color, ContentArrangement, Table};
use std::collections::BTreeMap;

/// Render per-collection upsert counts as a table with a total row
pub fn format_upsert_stats(stats: &BTreeMap<String, u64>) -> String {
    let mut table = Table::new();

    table.set_header(vec![
        Cell::new("컬렉션").fg(Color::Cyan),
        Cell::new("upsert").fg(Color::Cyan),
    ]);

    for (collection, count) in stats {
        table.add_row(vec![Cell::new(collection), Cell::new(count)]);
    }

    let total: u64 = stats.values().sum();
    table.add_row(vec![Cell::new("합계").fg(Color::Green), Cell::new(total)]);

    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_upsert_stats() {
        let mut stats = BTreeMap::new();
        stats.insert("pois_kr".to_string(), 700);
        stats.insert("pois_geo_kr".to_string(), 650);

        let rendered = format_upsert_stats(&stats);
        assert!(rendered.contains("pois_kr"));
        assert!(rendered.contains("pois_geo_kr"));
        assert!(rendered.contains("1350"));
    }
}
