//! Plain text export

use crate::ExportSource;

pub fn render_txt(source: &ExportSource) -> Vec<u8> {
    let mut parts: Vec<String> = vec![source.heading().to_string(), String::new()];
    if !source.summary.is_empty() {
        parts.push(source.summary.clone());
    }
    if !source.keywords.is_empty() {
        parts.push(String::new());
        parts.push(format!("Keywords: {}", source.keywords));
    }
    parts.join("\n").into_bytes()
}
