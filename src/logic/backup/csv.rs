//! CSV Section Encoding
//!
//! One reusable field/section encoder shared by every block of the combined
//! backup document. Standard CSV quoting: a field containing a comma, a
//! double quote or a newline is wrapped in double quotes with internal
//! quotes doubled; missing and null values encode as the empty string.

use serde_json::Value;

/// A labeled, self-contained block of header+rows within one combined
/// backup document.
pub struct CsvSection<'a> {
    pub label: &'a str,
    pub columns: &'a [&'a str],
    pub rows: &'a [Value],
}

/// Encode a single field value.
///
/// Priority order matters: absent/null first, then stringify, then the
/// quoting check over the stringified form.
pub fn encode_field(value: Option<&Value>) -> String {
    let value = match value {
        None | Some(Value::Null) => return String::new(),
        Some(v) => v,
    };

    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };

    if text.contains(',') || text.contains('"') || text.contains('\n') {
        format!("\"{}\"", text.replace('"', "\"\""))
    } else {
        text
    }
}

/// Encode one dataset: a header line in the caller-declared column order,
/// then one line per record. An empty dataset encodes as the empty string.
pub fn dataset_to_csv(rows: &[Value], columns: &[&str]) -> String {
    if rows.is_empty() {
        return String::new();
    }

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(columns.join(","));

    for row in rows {
        let fields: Vec<String> = columns
            .iter()
            .map(|col| encode_field(row.get(*col)))
            .collect();
        lines.push(fields.join(","));
    }

    lines.join("\n")
}

/// Join labeled sections with a blank line between them.
pub fn sections_to_csv(sections: &[CsvSection<'_>]) -> String {
    sections
        .iter()
        .map(|section| format!("{}\n{}", section.label, dataset_to_csv(section.rows, section.columns)))
        .collect::<Vec<_>>()
        .join("\n\n")
}
