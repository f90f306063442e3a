//! Serde models for extracted API items and the name index that resolves
//! type references between them.

mod error;
mod index;
mod model;

pub use error::{SchemaError, SchemaResult};
pub use index::{IndexEntry, IndexFile, SchemaIndex};
pub use model::{
    Body, EnumInfo, EnumVariant, FieldInfo, Item, ItemInfo, ItemKind, ObjectInfo, ParamInfo,
    Response, RouteInfo,
};
