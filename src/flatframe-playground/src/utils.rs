//! Result-printing helpers for the demo binaries.

use arrow::array::{Array, Date32Array, Float32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::DataType as ArrowDataType;
use arrow::record_batch::RecordBatch;

use flatframe_storage::Table;

/// Print a section header.
pub fn print_header(title: &str) {
    println!();
    println!("=== {title} ===");
}

/// Format each row of a batch as a pipe-separated line.
pub fn format_batch(batch: &RecordBatch) -> Vec<String> {
    (0..batch.num_rows())
        .map(|row| {
            let cells: Vec<String> = batch
                .columns()
                .iter()
                .map(|column| format_cell(column.as_ref(), row))
                .collect();
            cells.join(" | ")
        })
        .collect()
}

fn format_cell(column: &dyn Array, row: usize) -> String {
    if column.is_null(row) {
        return "NULL".to_string();
    }

    match column.data_type() {
        ArrowDataType::Int64 => column
            .as_any()
            .downcast_ref::<Int64Array>()
            .map_or_else(|| "?".to_string(), |a| a.value(row).to_string()),
        ArrowDataType::Float32 => column
            .as_any()
            .downcast_ref::<Float32Array>()
            .map_or_else(|| "?".to_string(), |a| a.value(row).to_string()),
        ArrowDataType::Float64 => column
            .as_any()
            .downcast_ref::<Float64Array>()
            .map_or_else(|| "?".to_string(), |a| a.value(row).to_string()),
        ArrowDataType::Utf8 => column
            .as_any()
            .downcast_ref::<StringArray>()
            .map_or_else(|| "?".to_string(), |a| a.value(row).to_string()),
        ArrowDataType::Date32 => column
            .as_any()
            .downcast_ref::<Date32Array>()
            .map_or_else(|| "?".to_string(), |a| a.value(row).to_string()),
        other => format!("<{other}>"),
    }
}

/// Print the first `limit` rows of a table with its column names.
pub fn print_results(title: &str, table: &Table, limit: usize) {
    print_header(title);
    println!("{}", table.schema().column_names().join(" | "));

    let mut remaining = limit;
    for batch in table.batches() {
        if remaining == 0 {
            break;
        }
        for line in format_batch(batch).into_iter().take(remaining) {
            println!("{line}");
            remaining -= 1;
        }
    }

    println!("({} rows total)", table.num_rows());
}
