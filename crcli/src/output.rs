use cardrange::{BulkImportResponse, CardRangeData, IndexStats};
use comfy_table::{ContentArrangement, Table};

fn field_table() -> Table {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["FIELD", "VALUE"]);
    table
}

fn show<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn range_table(range: &CardRangeData) -> Table {
    let mut table = field_table();
    table.add_row(vec!["startRange".to_string(), show(range.start_range)]);
    table.add_row(vec!["endRange".to_string(), show(range.end_range)]);
    table.add_row(vec!["actionInd".to_string(), show(range.action_ind.as_deref())]);
    table.add_row(vec![
        "acsStartProtocolVersion".to_string(),
        show(range.acs_start_protocol_version.as_deref()),
    ]);
    table.add_row(vec![
        "acsEndProtocolVersion".to_string(),
        show(range.acs_end_protocol_version.as_deref()),
    ]);
    table.add_row(vec![
        "threeDSMethodURL".to_string(),
        show(range.three_ds_method_url.as_deref()),
    ]);
    table.add_row(vec![
        "acsInfoInd".to_string(),
        show(range.acs_info_ind.as_ref().map(|v| v.join(", "))),
    ]);
    table
}

pub fn import_table(response: &BulkImportResponse) -> String {
    let mut table = field_table();
    table.add_row(vec!["total".to_string(), response.total_processed.to_string()]);
    table.add_row(vec!["success".to_string(), response.success_count.to_string()]);
    table.add_row(vec!["errors".to_string(), response.error_count.to_string()]);
    table.add_row(vec!["processedAt".to_string(), response.processed_at.to_rfc3339()]);

    if response.errors.is_empty() {
        return table.to_string();
    }
    let mut errors = Table::new();
    errors.set_content_arrangement(ContentArrangement::Dynamic);
    errors.set_header(vec!["ERROR"]);
    for line in &response.errors {
        errors.add_row(vec![line.clone()]);
    }
    format!("{table}\n{errors}")
}

pub fn stats_table(stored: usize, stats: &IndexStats) -> Table {
    let mut table = field_table();
    table.add_row(vec!["stored ranges".to_string(), stored.to_string()]);
    table.add_row(vec!["index size".to_string(), stats.size.to_string()]);
    table.add_row(vec!["index height".to_string(), stats.height.to_string()]);
    table.add_row(vec!["index initialized".to_string(), stats.initialized.to_string()]);
    table
}
