use quote::ToTokens;
use syn::{Field, Ident, LitStr, Type, parse::ParseBuffer};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GeneratedKind {
    #[default]
    None,
    Identity,
    Computed,
}

pub(crate) struct ColumnMetadata {
    pub(crate) ident: Ident,
    pub(crate) ty: Type,
    pub(crate) name: String,
    pub(crate) primary_key: bool,
    pub(crate) generated: GeneratedKind,
    pub(crate) not_mapped: bool,
}

pub(crate) fn decode_column(field: &Field) -> ColumnMetadata {
    let ident = field
        .ident
        .clone()
        .expect("Field is expected to have a name");
    let mut name = ident.to_string();
    if name.starts_with('_') {
        name.remove(0);
    }
    let mut metadata = ColumnMetadata {
        ident,
        ty: field.ty.clone(),
        name,
        primary_key: false,
        generated: GeneratedKind::None,
        not_mapped: false,
    };
    for attr in &field.attrs {
        let meta = &attr.meta;
        if meta.path().is_ident("quarry") {
            let Ok(list) = meta.require_list() else {
                panic!(
                    "Error while parsing `quarry`, use it like: `#[quarry(attribute = value, ...)]`",
                );
            };
            let _ = list.parse_nested_meta(|arg| {
                if arg.path.is_ident("name") {
                    let Ok(v) = arg.value().and_then(ParseBuffer::parse::<LitStr>) else {
                        panic!("Error while parsing `name`, use it like: `#[quarry(name = \"my_column\")]`");
                    };
                    metadata.name = v.value();
                } else if arg.path.is_ident("primary_key") {
                    let Err(..) = arg.value() else {
                        // value() is Err for Meta::Path
                        panic!("Error while parsing `primary_key`, use it like: `#[quarry(primary_key)]`");
                    };
                    metadata.primary_key = true;
                } else if arg.path.is_ident("identity") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `identity`, use it like: `#[quarry(identity)]`");
                    };
                    metadata.generated = GeneratedKind::Identity;
                } else if arg.path.is_ident("computed") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `computed`, use it like: `#[quarry(computed)]`");
                    };
                    metadata.generated = GeneratedKind::Computed;
                } else if arg.path.is_ident("not_mapped") {
                    let Err(..) = arg.value() else {
                        panic!("Error while parsing `not_mapped`, use it like: `#[quarry(not_mapped)]`");
                    };
                    metadata.not_mapped = true;
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
    if metadata.not_mapped && (metadata.primary_key || metadata.generated != GeneratedKind::None) {
        panic!(
            "Field `{}` is not mapped, it cannot be a primary key or generated",
            metadata.ident
        );
    }
    metadata
}
