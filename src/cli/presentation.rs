//! Presentation: formatters for context records, strings and store listings.

use crate::context::{ContextInfoMap, ContextualString};
use crate::error::ApiError;
use crate::store::persistence::PathRecord;
use crate::store::StoreDir;
use comfy_table::Table;

pub fn format_info_json(info: &ContextInfoMap) -> Result<String, ApiError> {
    Ok(serde_json::to_string_pretty(info)?)
}

pub fn format_info_table(info: &ContextInfoMap) -> String {
    if info.is_empty() {
        return "No context.".to_string();
    }
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Path", "Plain", "All outputs", "Outputs"]);
    for (path, facets) in info.iter() {
        let mark = |b: bool| if b { "yes" } else { "-" };
        let outputs = if facets.outputs.is_empty() {
            "-".to_string()
        } else {
            facets.outputs.join(", ")
        };
        table.add_row(vec![
            path.as_str(),
            mark(facets.path),
            mark(facets.all_outputs),
            outputs.as_str(),
        ]);
    }
    table.to_string()
}

/// `{"text": ..., "context": [<compact elements>]}`
pub fn format_string_json(dir: &StoreDir, s: &ContextualString) -> Result<String, ApiError> {
    let context: Vec<String> = s.context().iter().map(|e| e.render(dir)).collect();
    let out = serde_json::json!({
        "text": s.text(),
        "context": context,
    });
    Ok(serde_json::to_string_pretty(&out)?)
}

pub fn format_store_list_json(dir: &StoreDir, records: &[PathRecord]) -> Result<String, ApiError> {
    let arr: Vec<serde_json::Value> = records
        .iter()
        .map(|r| {
            serde_json::json!({
                "path": dir.print_path(&r.path),
                "deriver": r.deriver.as_ref().map(|d| dir.print_path(d)),
                "registered_at": r.registered_at,
            })
        })
        .collect();
    Ok(serde_json::to_string_pretty(&arr)?)
}

pub fn format_store_list_text(dir: &StoreDir, records: &[PathRecord]) -> String {
    if records.is_empty() {
        return "No registered paths.".to_string();
    }
    records
        .iter()
        .map(|r| dir.print_path(&r.path))
        .collect::<Vec<_>>()
        .join("\n")
}
