mod decode_column;
mod decode_table;
mod encode_column_def;
mod from_row_trait;

use decode_table::decode_table;
use encode_column_def::encode_column_def;
use from_row_trait::from_row_body;
use proc_macro::TokenStream;
use quote::quote;
use syn::{ItemStruct, parse_macro_input};

/// Implements `quarry::Entity` for a struct with named fields.
///
/// ```ignore
/// #[derive(Entity)]
/// #[quarry(name = "Person", schema = "dbo")]
/// struct Person {
///     #[quarry(name = "Id", primary_key, identity)]
///     id: i32,
///     #[quarry(name = "FirstName")]
///     first_name: String,
///     #[quarry(not_mapped)]
///     display: String,
/// }
/// ```
#[proc_macro_derive(Entity, attributes(quarry))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    let item: ItemStruct = parse_macro_input!(input as ItemStruct);
    let table = decode_table(item);
    let name = &table.item.ident;
    let type_name = name.to_string();
    let table_name = match &table.name {
        Some(v) => quote!(Some(#v)),
        None => quote!(None),
    };
    let columns = table.columns.iter().map(encode_column_def);
    let values = table.columns.iter().map(|c| {
        let ident = &c.ident;
        if c.not_mapped {
            quote!(::quarry::Value::Null)
        } else {
            quote!(::quarry::AsValue::as_value(::std::clone::Clone::clone(&self.#ident)))
        }
    });
    let from_row = from_row_body(&table);
    quote! {
        impl ::quarry::Entity for #name {
            fn entity_def() -> &'static ::quarry::EntityDef {
                static RESULT: ::std::sync::LazyLock<::quarry::EntityDef> =
                    ::std::sync::LazyLock::new(|| {
                        ::quarry::EntityDef::new(#type_name, #table_name, vec![#(#columns),*])
                    });
                &RESULT
            }

            fn row(&self) -> ::quarry::Row {
                vec![#(#values),*].into_boxed_slice()
            }

            fn from_row(__row__: ::quarry::RowLabeled) -> ::quarry::Result<Self> {
                #from_row
            }
        }
    }
    .into()
}
