use crate::decode_table::TableMetadata;
use proc_macro2::TokenStream;
use quote::quote;

/// Body of `Entity::from_row`: every mapped column must be present in the row, not mapped
/// fields take their default value.
pub(crate) fn from_row_body(table: &TableMetadata) -> TokenStream {
    let struct_name = &table.item.ident;
    let mapped: Vec<_> = table.columns.iter().filter(|c| !c.not_mapped).collect();
    let holders = mapped.iter().map(|c| {
        let ident = &c.ident;
        let ty = &c.ty;
        quote! {
            let mut #ident: Option<#ty> = None;
        }
    });
    let assignments = mapped.iter().map(|c| {
        let ident = &c.ident;
        let ty = &c.ty;
        let name = &c.name;
        quote! {
            if __n__ == #name {
                #ident = Some(<#ty as ::quarry::AsValue>::try_from_value(__v__)?);
                continue;
            }
        }
    });
    let fields = table.columns.iter().map(|c| {
        let ident = &c.ident;
        let name = &c.name;
        if c.not_mapped {
            quote!(#ident: Default::default())
        } else {
            quote!(#ident: #ident.ok_or_else(|| __make_error__(#name))?)
        }
    });
    quote! {
        #(#holders)*
        for (__n__, __v__) in ::std::iter::zip(__row__.labels.iter(), __row__.values.into_vec()) {
            #(#assignments)*
        }
        let __make_error__ = |name: &str| ::quarry::Error::msg(format!(
            "Column `{}` does not exist in the row provided",
            name
        ));
        Ok(#struct_name {
            #(#fields,)*
        })
    }
}
