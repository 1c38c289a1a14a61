#[allow(unused_imports)]
use super::*;

pub(crate) struct ParsedField {
    ident: Ident,
    name: String,
    ty: Type,
    annotation: Option<LitStr>,
}

impl ParsedField {
    pub(crate) fn from_field(field: &Field) -> Result<Self> {
        let ident = field
            .ident
            .clone()
            .ok_or_else(|| Error::new(field.span(), "Record requires named fields"))?;
        let name = ident.unraw().to_string();

        let mut annotation = None;
        for attr in &field.attrs {
            if attr.path().is_ident("fieldmap") {
                Self::parse_field_attr(attr, &mut annotation)?;
            }
        }

        Ok(Self {
            ident,
            name,
            ty: field.ty.clone(),
            annotation,
        })
    }

    fn parse_field_attr(attr: &Attribute, annotation: &mut Option<LitStr>) -> Result<()> {
        let value: LitStr = attr.parse_args()?;
        if annotation.is_some() {
            return Err(Error::new(attr.span(), "duplicate #[fieldmap(\"...\")] annotation"));
        }
        *annotation = Some(value);
        Ok(())
    }

    pub(crate) fn ident(&self) -> &Ident {
        &self.ident
    }

    /// `FieldDef` constructor for the generated static layout.
    pub(crate) fn def_tokens(&self) -> TokenStream2 {
        let name = LitStr::new(&self.name, self.ident.span());
        let ty = &self.ty;
        let annotation = match &self.annotation {
            Some(text) => quote!(::core::option::Option::Some(#text)),
            None => quote!(::core::option::Option::None),
        };
        quote! {
            ::fieldmap::FieldDef::new(#name, #annotation, <#ty as ::fieldmap::Value>::type_def)
        }
    }
}
