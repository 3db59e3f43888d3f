use crate::decode_column::{ColumnMetadata, decode_column};
use quote::ToTokens;
use syn::{ItemStruct, LitStr, parse::ParseBuffer};

pub(crate) struct TableMetadata {
    pub(crate) item: ItemStruct,
    pub(crate) columns: Vec<ColumnMetadata>,
    /// Declared table name, schema qualified when a schema was given.
    pub(crate) name: Option<String>,
}

pub(crate) fn decode_table(item: ItemStruct) -> TableMetadata {
    let columns: Vec<_> = item.fields.iter().map(decode_column).collect();
    let mut name = None;
    let mut schema = None;
    for attr in &item.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("quarry") {
            let Ok(list) = meta.require_list() else {
                panic!("Error while parsing `quarry`, use it like: `#[quarry(attribute = value, ..)]`");
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `name`, use it like: `#[quarry(name = \"my_table\")]`"
                        );
                    };
                    name = Some(value.value());
                } else if arg.path.is_ident("schema") {
                    let Ok(value) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!(
                            "Error while parsing `schema`, use it like: `#[quarry(schema = \"my_schema\")]`"
                        );
                    };
                    schema = Some(value.value());
                } else {
                    panic!(
                        "Unknown attribute `{}` inside quarry macro",
                        arg.path.to_token_stream()
                    );
                }
                Ok(())
            });
        }
    }
    let name = match (schema, name) {
        (Some(schema), Some(name)) => Some(format!("{}.{}", schema, name)),
        (Some(schema), None) => Some(format!("{}.{}", schema, item.ident)),
        (None, name) => name,
    };
    TableMetadata {
        item,
        columns,
        name,
    }
}
