use serde::{Deserialize, Serialize};

/// A documented item as emitted by the schema extractor, one per JSON file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub package: String,
    pub item: Item,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Item {
    #[serde(alias = "struct")]
    Object(ObjectInfo),
    Enum(EnumInfo),
    Route(RouteInfo),
}

impl Item {
    pub fn kind(&self) -> ItemKind {
        match self {
            Item::Object(_) => ItemKind::Object,
            Item::Enum(_) => ItemKind::Enum,
            Item::Route(_) => ItemKind::Route,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    Object,
    Enum,
    Route,
}

impl ItemKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ItemKind::Object => "object",
            ItemKind::Enum => "enum",
            ItemKind::Route => "route",
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectInfo {
    #[serde(default)]
    pub fields: Vec<FieldInfo>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldInfo {
    pub name: String,
    #[serde(default)]
    pub doc: Option<String>,
    #[serde(rename = "type", alias = "field_type")]
    pub field_type: String,
    #[serde(default)]
    pub flattened: bool,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default, alias = "ommitable")]
    pub omittable: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EnumInfo {
    /// Discriminant field name for internally/adjacently tagged enums.
    #[serde(default)]
    pub tag: Option<String>,
    #[serde(default)]
    pub untagged: bool,
    /// Content field name for adjacently tagged enums.
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub rename_all: Option<String>,
    #[serde(default)]
    pub variants: Vec<EnumVariant>,
}

impl EnumInfo {
    /// The tag that actually appears on the wire; `untagged` wins over `tag`.
    pub fn effective_tag(&self) -> Option<&str> {
        if self.untagged {
            None
        } else {
            self.tag.as_deref()
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnumVariant {
    Unit {
        name: String,
        #[serde(default)]
        doc: Option<String>,
    },
    Tuple {
        name: String,
        #[serde(default)]
        doc: Option<String>,
        field_type: String,
    },
    #[serde(alias = "struct")]
    Object {
        name: String,
        #[serde(default)]
        doc: Option<String>,
        #[serde(default)]
        fields: Vec<FieldInfo>,
    },
}

impl EnumVariant {
    pub fn name(&self) -> &str {
        match self {
            EnumVariant::Unit { name, .. }
            | EnumVariant::Tuple { name, .. }
            | EnumVariant::Object { name, .. } => name,
        }
    }

    pub fn doc(&self) -> Option<&str> {
        match self {
            EnumVariant::Unit { doc, .. }
            | EnumVariant::Tuple { doc, .. }
            | EnumVariant::Object { doc, .. } => doc.as_deref(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RouteInfo {
    pub method: String,
    pub route: String,
    #[serde(default)]
    pub path_params: Vec<ParamInfo>,
    #[serde(default)]
    pub query_params: Vec<ParamInfo>,
    #[serde(default)]
    pub body: Option<Body>,
    #[serde(default)]
    pub response: Option<Response>,
    #[serde(default)]
    pub requires_auth: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ParamInfo {
    pub name: String,
    #[serde(rename = "type", alias = "param_type")]
    pub param_type: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Body {
    #[serde(rename = "type")]
    pub body_type: String,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Response {
    #[serde(rename = "type")]
    pub response_type: String,
    #[serde(default)]
    pub format: Option<String>,
    #[serde(default = "default_status_code")]
    pub status_code: u16,
    #[serde(default)]
    pub rate_limit: bool,
}

fn default_status_code() -> u16 {
    200
}
