use std::sync::OnceLock;

use apidoc_schema::SchemaIndex;
use regex::Regex;

fn numeric() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:[ui](?:8|16|32|64|128|size)|f32|f64)$").expect("valid numeric pattern"))
}

fn blank_lines() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n{2,}").expect("valid blank line pattern"))
}

fn special_segment() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"&lt;.*?&gt;").expect("valid segment pattern"))
}

fn body_wrapper() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^(?:Json|Form)<(.+)>$").expect("valid wrapper pattern"))
}

/// Human-readable rendering of a type reference. Indexed types become links
/// under `link_base`.
pub fn display_type(ty: &str, index: &SchemaIndex, link_base: &str) -> String {
    if let Some(inner) = ty.strip_suffix("[]") {
        return format!("Array of {}", display_type(inner, index, link_base));
    }

    if numeric().is_match(ty) {
        return "Number".to_string();
    }
    match ty {
        "bool" => return "Boolean".to_string(),
        "str" | "String" => return "String".to_string(),
        "file" => return "File".to_string(),
        _ => {}
    }

    match index.link_target(ty) {
        Some(target) => format!("[{ty}]({link_base}/{target})"),
        None => escape_angles(ty),
    }
}

/// Doc text flattened for a table cell.
pub fn inline_doc(doc: Option<&str>) -> String {
    let doc = doc.unwrap_or_default().trim().replace('|', "\\|");
    blank_lines()
        .replace_all(&doc, "<br><br>")
        .replace('\n', " ")
}

/// Split a doc comment at the first example separator into trimmed
/// `(prose, example)` halves.
pub fn split_example<'a>(doc: Option<&'a str>, separator: &str) -> (&'a str, &'a str) {
    let doc = doc.unwrap_or_default();
    match doc.split_once(separator) {
        Some((prose, example)) => (prose.trim(), example.trim()),
        None => (doc.trim(), ""),
    }
}

/// The method/route line of a route page. Parameter segments such as `<id>`
/// are wrapped so they can be styled separately.
pub fn route_line(method: &str, route: &str) -> String {
    let escaped = escape_angles(route);
    let route = special_segment().replace_all(&escaped, r#"<span class="special-segment">$0</span>"#);
    format!(r#"<span class="method">{method}</span><span class="route">{route}</span>"#)
}

/// Strip a `Json<…>` or `Form<…>` extractor from a request body type.
pub fn unwrap_body_type(ty: &str) -> &str {
    body_wrapper()
        .captures(ty)
        .and_then(|caps| caps.get(1))
        .map_or(ty, |inner| inner.as_str())
}

fn escape_angles(text: &str) -> String {
    text.replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidoc_schema::{Item, ItemInfo, ObjectInfo};

    fn index_with(entries: &[&str]) -> SchemaIndex {
        SchemaIndex::from_entries(entries.iter().map(|path| {
            let name = path
                .trim_end_matches(".json")
                .rsplit('/')
                .next()
                .unwrap()
                .to_string();
            (
                path.to_string(),
                ItemInfo {
                    name,
                    doc: None,
                    category: String::new(),
                    hidden: false,
                    package: String::new(),
                    item: Item::Object(ObjectInfo::default()),
                },
            )
        }))
        .unwrap()
    }

    #[test]
    fn primitives_and_arrays() {
        let index = SchemaIndex::default();
        assert_eq!(display_type("u64", &index, "/reference"), "Number");
        assert_eq!(display_type("usize", &index, "/reference"), "Number");
        assert_eq!(display_type("i128", &index, "/reference"), "Number");
        assert_eq!(display_type("f64", &index, "/reference"), "Number");
        assert_eq!(display_type("bool", &index, "/reference"), "Boolean");
        assert_eq!(display_type("String", &index, "/reference"), "String");
        assert_eq!(display_type("file", &index, "/reference"), "File");
        assert_eq!(
            display_type("str[][]", &index, "/reference"),
            "Array of Array of String"
        );
        assert_eq!(display_type("uint", &index, "/reference"), "uint");
        assert_eq!(display_type("u999", &index, "/reference"), "u999");
        assert_eq!(display_type("i0", &index, "/reference"), "i0");
    }

    #[test]
    fn indexed_types_link_and_others_escape() {
        let index = index_with(&["todel/Message.json"]);
        assert_eq!(
            display_type("Message[]", &index, "/reference"),
            "Array of [Message](/reference/todel/Message)"
        );
        assert_eq!(
            display_type("Option<Message>", &index, "/docs"),
            "Option&lt;Message&gt;"
        );
    }

    #[test]
    fn inline_doc_flattens_newlines_and_pipes() {
        assert_eq!(
            inline_doc(Some("First line\nsame paragraph.\n\n\nNew | paragraph.\n")),
            "First line same paragraph.<br><br>New \\| paragraph."
        );
        assert_eq!(inline_doc(None), "");
    }

    #[test]
    fn splits_at_first_separator() {
        assert_eq!(
            split_example(Some("Prose.\n\n-----\n\n```json\n{}\n```\n-----\nmore"), "-----"),
            ("Prose.", "```json\n{}\n```\n-----\nmore")
        );
        assert_eq!(split_example(Some(" Only prose "), "-----"), ("Only prose", ""));
        assert_eq!(split_example(None, "-----"), ("", ""));
    }

    #[test]
    fn route_line_marks_every_parameter() {
        assert_eq!(
            route_line("GET", "/messages/<id>/<other>"),
            concat!(
                r#"<span class="method">GET</span><span class="route">/messages/"#,
                r#"<span class="special-segment">&lt;id&gt;</span>/"#,
                r#"<span class="special-segment">&lt;other&gt;</span></span>"#
            )
        );
    }

    #[test]
    fn unwraps_extractor_types() {
        assert_eq!(unwrap_body_type("Json<Message>"), "Message");
        assert_eq!(unwrap_body_type("Form<FileUpload>"), "FileUpload");
        assert_eq!(unwrap_body_type("Json<Vec<Message>>"), "Vec<Message>");
        assert_eq!(unwrap_body_type("Message"), "Message");
    }
}
