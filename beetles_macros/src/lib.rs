use proc_macro::TokenStream;
use quote::quote;
use syn::{Item, parse_macro_input};

extern crate proc_macro;

/// Turns a struct or enum into a workload descriptor (a `beetles::Journey`).
///
/// Derives everything a journey needs to travel inside a work order
/// (serde, `Debug`, `Clone`) and implements the marker trait. The trait
/// must be in scope at the use site.
///
/// Generic parameters are carried over to the `Journey` impl, so they need
/// the bounds a journey's fields need (usually `T: Journey`).
#[proc_macro_attribute]
pub fn journey(_attr: TokenStream, item: TokenStream) -> TokenStream {
    let ast = parse_macro_input!(item as Item);
    let (ident, generics) = match &ast {
        Item::Struct(s) => (&s.ident, &s.generics),
        Item::Enum(e) => (&e.ident, &e.generics),
        other => {
            return syn::Error::new_spanned(other, "#[journey] only supports structs and enums")
                .to_compile_error()
                .into();
        }
    };

    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    let expanded = quote! {
        #[derive(
            serde::Serialize,
            serde::Deserialize,
            std::fmt::Debug,
            std::clone::Clone
        )]
        #ast

        impl #impl_generics Journey for #ident #ty_generics #where_clause {}
    };

    TokenStream::from(expanded)
}
