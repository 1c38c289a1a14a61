use proc_macro::TokenStream;
use proc_macro2::{Literal, Span, TokenStream as TokenStream2};
use quote::quote;
use syn::ext::IdentExt;
use syn::{Attribute, Data, DeriveInput, Error, Field, Fields, Ident, LitStr, Result, Type, parse_macro_input, spanned::Spanned};

mod parsed;

use parsed::ParsedRecord;

/// Derives `fieldmap::Value` and `fieldmap::Record` for a struct with named
/// fields.
///
/// Fields opt into mapping with `#[fieldmap("path[,types<...>]")]`; fields
/// without it are skipped. `#[fieldmap(rename = "Name")]` on the struct sets
/// the name `types<...>` rules match against.
#[proc_macro_derive(Record, attributes(fieldmap))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match ParsedRecord::from_input(&input) {
        Ok(parsed) => parsed.emit().into(),
        Err(err) => err.to_compile_error().into(),
    }
}
