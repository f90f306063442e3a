use apidoc_schema::{EnumInfo, EnumVariant, FieldInfo, Item, ItemInfo, RouteInfo};
use tracing::warn;

use crate::display::{display_type, inline_doc, route_line, split_example, unwrap_body_type};
use crate::names::{title_case, RenameRule};
use crate::Renderer;

const FIELDS_HEADER: &str = "|Field|Type|Description|\n|---|---|---|";
const PARAMS_HEADER: &str = "|Name|Type|\n|---|---|";

/// Markdown blocks that are joined by a single blank line.
#[derive(Default)]
struct Blocks(Vec<String>);

impl Blocks {
    fn push(&mut self, block: impl Into<String>) {
        let block = block.into();
        if !block.trim().is_empty() {
            self.0.push(block);
        }
    }

    fn extend(&mut self, other: Blocks) {
        self.0.extend(other.0);
    }

    fn join(self) -> String {
        self.0.join("\n\n")
    }
}

impl Renderer<'_> {
    pub(crate) fn page(&self, info: &ItemInfo) -> String {
        let mut blocks = Blocks::default();
        blocks.push(format!("# {}", title_case(&info.name)));

        if let Item::Route(route) = &info.item {
            blocks.push(route_line(&route.method, &route.route));
        }

        let (doc, example) = split_example(info.doc.as_deref(), &self.options.example_separator);
        blocks.push(doc);

        match &info.item {
            Item::Object(object) => blocks.push(self.fields_table(&object.fields, &info.name)),
            Item::Enum(item) => {
                let mut seen = vec![info.name.clone()];
                for variant in &item.variants {
                    blocks.push(format!("## {}", title_case(variant.name())));
                    let (doc, example) =
                        split_example(variant.doc(), &self.options.example_separator);
                    blocks.push(doc);
                    blocks.extend(self.variant(variant, item, &info.name, &mut seen));
                    blocks.push(example);
                }
            }
            Item::Route(route) => blocks.extend(self.route_sections(route)),
        }

        blocks.push(example);
        blocks.join()
    }

    /// Short description of a referenced item, embedded in other pages.
    /// `seen` holds the items already being described further up.
    fn brief(&self, info: &ItemInfo, seen: &mut Vec<String>) -> Blocks {
        let mut blocks = Blocks::default();
        if seen.contains(&info.name) {
            warn!(name = %info.name, "not describing a type inside itself");
            return blocks;
        }
        seen.push(info.name.clone());
        match &info.item {
            Item::Object(object) => blocks.push(self.fields_table(&object.fields, &info.name)),
            Item::Enum(item) => {
                for variant in &item.variants {
                    blocks.push(format!("- {}", title_case(variant.name())));
                    let (doc, _) = split_example(variant.doc(), &self.options.example_separator);
                    blocks.push(doc);
                    blocks.extend(self.variant(variant, item, &info.name, seen));
                }
            }
            Item::Route(_) => {}
        }
        seen.pop();
        blocks
    }

    fn fields_table(&self, fields: &[FieldInfo], owner: &str) -> String {
        let rows = self.field_rows(fields, &mut vec![owner.to_string()]);
        if rows.is_empty() {
            return String::new();
        }
        table(FIELDS_HEADER, rows)
    }

    fn field_rows(&self, fields: &[FieldInfo], expanding: &mut Vec<String>) -> Vec<String> {
        let mut rows = Vec::new();
        for field in fields {
            if field.flattened {
                if let Some(entry) = self.index.lookup(&field.field_type) {
                    if let Item::Object(inner) = &entry.info().item {
                        if expanding.contains(&field.field_type) {
                            warn!(
                                field = %field.name,
                                type_name = %field.field_type,
                                "flattened field refers back to an enclosing type"
                            );
                        } else {
                            expanding.push(field.field_type.clone());
                            rows.extend(self.field_rows(&inner.fields, expanding));
                            expanding.pop();
                            continue;
                        }
                    }
                }
            }
            rows.push(self.field_row(field));
        }
        rows
    }

    fn field_row(&self, field: &FieldInfo) -> String {
        format!(
            "|{}{}|{}{}|{}|",
            field.name,
            if field.omittable { "?" } else { "" },
            self.display_type(&field.field_type),
            if field.nullable { "?" } else { "" },
            inline_doc(field.doc.as_deref()),
        )
    }

    fn variant(
        &self,
        variant: &EnumVariant,
        item: &EnumInfo,
        model: &str,
        seen: &mut Vec<String>,
    ) -> Blocks {
        let mut blocks = Blocks::default();
        let tag_row = item
            .effective_tag()
            .map(|tag| self.tag_row(tag, variant.name(), item, model));

        match variant {
            EnumVariant::Unit { .. } => {
                if let Some(tag_row) = tag_row {
                    blocks.push(table(FIELDS_HEADER, vec![tag_row]));
                }
            }
            EnumVariant::Tuple { field_type, .. } => match tag_row {
                Some(tag_row) => {
                    let mut rows = vec![tag_row];
                    match &item.content {
                        Some(content) => rows.push(format!(
                            "|{content}|{}|The data of this variant.|",
                            self.display_type(field_type)
                        )),
                        None => {
                            if let Some(entry) = self.index.lookup(field_type) {
                                if let Item::Object(inner) = &entry.info().item {
                                    let mut expanding = vec![field_type.clone()];
                                    rows.extend(self.field_rows(&inner.fields, &mut expanding));
                                }
                            }
                        }
                    }
                    blocks.push(table(FIELDS_HEADER, rows));
                }
                None => {
                    blocks.push(format!(
                        "This variant contains a {}.",
                        self.display_type(field_type)
                    ));
                    if let Some(entry) = self.index.lookup(field_type) {
                        blocks.extend(self.brief(entry.info(), seen));
                    }
                }
            },
            EnumVariant::Object { name, fields, .. } => match tag_row {
                Some(tag_row) => {
                    let mut rows = vec![tag_row];
                    match &item.content {
                        Some(content) => {
                            rows.push(format!(
                                "|{content}|{} Data|The data of this variant.|",
                                title_case(name)
                            ));
                            blocks.push(table(FIELDS_HEADER, rows));
                            let data = self.fields_table(fields, model);
                            if !data.is_empty() {
                                blocks.push("With the data of this variant being:");
                                blocks.push(data);
                            }
                        }
                        None => {
                            rows.extend(self.field_rows(fields, &mut vec![model.to_string()]));
                            blocks.push(table(FIELDS_HEADER, rows));
                        }
                    }
                }
                None => blocks.push(self.fields_table(fields, model)),
            },
        }
        blocks
    }

    fn tag_row(&self, tag: &str, variant: &str, item: &EnumInfo, model: &str) -> String {
        let label = match item.rename_all.as_deref() {
            Some(rule) => match rule.parse::<RenameRule>() {
                Ok(rule) => rule.apply(variant),
                Err(err) => {
                    warn!(enum_name = %model, %err, "leaving variant name unchanged");
                    variant.to_string()
                }
            },
            None => variant.to_string(),
        };
        format!("|{tag}|\"{label}\"|The {tag} of this {model} variant.|")
    }

    fn route_sections(&self, route: &RouteInfo) -> Blocks {
        let mut blocks = Blocks::default();

        for (heading, params) in [
            ("## Path Params", &route.path_params),
            ("## Query Params", &route.query_params),
        ] {
            if params.is_empty() {
                continue;
            }
            blocks.push(heading);
            let rows = params
                .iter()
                .map(|param| format!("|{}|{}|", param.name, self.display_type(&param.param_type)))
                .collect();
            blocks.push(table(PARAMS_HEADER, rows));
        }

        if let Some(body) = &route.body {
            blocks.push("## Request Body");
            let body_type = unwrap_body_type(&body.body_type);
            match self.index.lookup(body_type) {
                Some(entry) => {
                    if !entry.info().hidden {
                        let shown = self.display_type(body_type);
                        blocks.push(match body.format.as_deref() {
                            Some("application/json") => format!("A JSON {shown}"),
                            Some("multipart/form-data") => {
                                format!("A Multi-part form data {shown}")
                            }
                            _ => shown,
                        });
                    }
                    blocks.extend(self.brief(entry.info(), &mut Vec::new()));
                }
                None => blocks.push(self.display_type(body_type)),
            }
        }

        if let Some(response) = &route.response {
            blocks.push("## Response");
            let status = format!(r#"<span class="status">{}</span>"#, response.status_code);
            if response.format.as_deref() == Some("raw") {
                blocks.push(format!("{status} Raw file content."));
            } else {
                blocks.push(format!(
                    "{status} {}",
                    self.display_type(&response.response_type)
                ));
                if let Some(entry) = self.index.lookup(&response.response_type) {
                    blocks.extend(self.brief(entry.info(), &mut Vec::new()));
                }
            }
        }

        blocks
    }

    fn display_type(&self, ty: &str) -> String {
        display_type(ty, self.index, &self.options.link_base)
    }
}

fn table(header: &str, rows: Vec<String>) -> String {
    let mut out = String::from(header);
    for row in rows {
        out.push('\n');
        out.push_str(&row);
    }
    out
}
