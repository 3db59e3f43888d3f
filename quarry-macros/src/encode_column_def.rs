use crate::decode_column::{ColumnMetadata, GeneratedKind};
use proc_macro2::TokenStream;
use quote::quote;

pub(crate) fn encode_column_def(metadata: &ColumnMetadata) -> TokenStream {
    let field = metadata.ident.to_string();
    let name = &metadata.name;
    let mut result = quote!(::quarry::ColumnDef::new(#field).name(#name));
    if metadata.primary_key {
        result = quote!(#result.primary_key());
    }
    match metadata.generated {
        GeneratedKind::None => {}
        GeneratedKind::Identity => result = quote!(#result.identity()),
        GeneratedKind::Computed => result = quote!(#result.computed()),
    }
    if metadata.not_mapped {
        result = quote!(#result.not_mapped());
    }
    result
}
