//! Report sink: renders a workflow's final pipeline report for the operator console.

use serde_json::Value;
use std::fmt::Write as _;

/// Longest preview included in a rendered report, in characters.
const PREVIEW_LIMIT: usize = 1000;

/// Render the final pipeline report carried in `payload`.
///
/// Accepts either `{"final_report": {...}}` or the report object itself, and
/// tolerates missing sections; the workflow engine assembles the payload and
/// its shape drifts.
pub fn render_report(payload: &Value) -> String {
    let report = payload.get("final_report").unwrap_or(payload);
    let file = report.get("file");
    let routing = report.get("routing");
    let summaries = report.get("summaries");
    let preview = report.get("content_preview");

    let mut out = String::new();
    out.push_str("\n========== DOC PIPELINE REPORT ==========\n");
    let _ = writeln!(out, "status: {}", field(report, "status"));
    let _ = writeln!(
        out,
        "file:   {} | pages={} | size={} | lang={} OCR={}",
        nested(file, "original_name"),
        nested(file, "pages"),
        nested(file, "size_bytes"),
        nested(file, "detected_lang"),
        nested(file, "used_ocr"),
    );

    if routing.and_then(|r| r.get("matched")).and_then(Value::as_bool) == Some(true) {
        let _ = writeln!(
            out,
            "path:   {}  (conf={})",
            nested(routing, "selected_path"),
            nested(routing, "confidence"),
        );
    } else {
        if routing
            .and_then(|r| r.get("needs_new_folder"))
            .and_then(Value::as_bool)
            == Some(true)
        {
            let suggested = routing
                .and_then(|r| r.get("selected_path").or_else(|| r.get("suggested_path")))
                .map(render_value)
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "path:   NEEDS NEW → {suggested}  (conf={})",
                nested(routing, "confidence"),
            );
        }
        let reason = nested(routing, "reason");
        if !reason.is_empty() {
            let _ = writeln!(out, "reason: {reason}");
        }
    }

    let _ = writeln!(out, "\n-- SUMMARY (RU) --\n{}", nested(summaries, "ru"));
    let _ = writeln!(out, "\n-- SUMMARY (DE) --\n{}", nested(summaries, "de"));
    let _ = writeln!(
        out,
        "\n-- FULL TEXT PREVIEW (RU, {PREVIEW_LIMIT}) --\n{}",
        shorten(&nested(preview, "ru_short"), PREVIEW_LIMIT)
    );
    let _ = writeln!(
        out,
        "\n-- FULL TEXT PREVIEW (DE, {PREVIEW_LIMIT}) --\n{}",
        shorten(&nested(preview, "de_short"), PREVIEW_LIMIT)
    );
    out.push_str("=========================================\n");
    out
}

fn field(value: &Value, key: &str) -> String {
    value.get(key).map(render_value).unwrap_or_default()
}

fn nested(section: Option<&Value>, key: &str) -> String {
    section.and_then(|s| s.get(key)).map(render_value).unwrap_or_default()
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Cut `text` at a word boundary near `limit` characters, appending an
/// ellipsis when anything was dropped.
fn shorten(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let head: String = text.chars().take(limit).collect();
    let cut = head.rsplit_once(' ').map_or(head.as_str(), |(kept, _)| kept);
    format!("{cut}…")
}
