#[allow(unused_imports)]
use super::*;

pub(crate) struct ParsedRecord {
    name: Ident,
    type_name: String,
    fields: Vec<ParsedField>,
}

impl ParsedRecord {
    pub(crate) fn from_input(input: &DeriveInput) -> Result<Self> {
        if !input.generics.params.is_empty() {
            return Err(Error::new(
                input.generics.span(),
                "Record cannot be derived for generic types",
            ));
        }

        let mut type_name = input.ident.unraw().to_string();
        for attr in &input.attrs {
            if attr.path().is_ident("fieldmap") {
                Self::parse_container_attr(attr, &mut type_name)?;
            }
        }

        let fields = match &input.data {
            Data::Struct(data) => match &data.fields {
                Fields::Named(named) => named
                    .named
                    .iter()
                    .map(ParsedField::from_field)
                    .collect::<Result<Vec<_>>>()?,
                _ => return Err(Error::new(input.ident.span(), "Record requires named fields")),
            },
            _ => return Err(Error::new(input.ident.span(), "Record can only be derived for structs")),
        };

        Ok(Self {
            name: input.ident.clone(),
            type_name,
            fields,
        })
    }

    fn parse_container_attr(attr: &Attribute, type_name: &mut String) -> Result<()> {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let value: LitStr = meta.value()?.parse()?;
                if value.value().is_empty() {
                    return Err(Error::new(value.span(), "rename must not be empty"));
                }
                *type_name = value.value();
                Ok(())
            } else {
                Err(meta.error("unknown fieldmap container option, expected `rename`"))
            }
        })
    }

    pub(crate) fn emit(&self) -> TokenStream2 {
        let name = &self.name;
        let type_name = LitStr::new(&self.type_name, Span::call_site());
        let field_defs = self.fields.iter().map(ParsedField::def_tokens);

        let zero_checks = self.fields.iter().map(|field| {
            let ident = field.ident();
            quote!(::fieldmap::Value::is_zero(&self.#ident))
        });
        let field_arms = self.fields.iter().enumerate().map(|(index, field)| {
            let index = Literal::usize_unsuffixed(index);
            let ident = field.ident();
            quote!(#index => ::core::option::Option::Some(&self.#ident as &dyn ::fieldmap::Value))
        });
        let field_mut_arms = self.fields.iter().enumerate().map(|(index, field)| {
            let index = Literal::usize_unsuffixed(index);
            let ident = field.ident();
            quote!(#index => ::core::option::Option::Some(&mut self.#ident as &mut dyn ::fieldmap::Value))
        });

        quote! {
            impl ::fieldmap::Value for #name {
                fn type_def() -> ::fieldmap::TypeDef {
                    ::fieldmap::TypeDef::record::<Self>(<Self as ::fieldmap::Record>::record_def())
                }

                fn value_type_def(&self) -> ::fieldmap::TypeDef {
                    <Self as ::fieldmap::Value>::type_def()
                }

                fn reflect_ref(&self) -> ::fieldmap::ReflectRef<'_> {
                    ::fieldmap::ReflectRef::Record(self)
                }

                fn reflect_mut(&mut self) -> ::fieldmap::ReflectMut<'_> {
                    ::fieldmap::ReflectMut::Record(self)
                }

                fn is_zero(&self) -> bool {
                    true #(&& #zero_checks)*
                }

                fn assign(&mut self, source: &dyn ::fieldmap::Value) -> bool {
                    ::fieldmap::assign_cloned(self, source)
                }

                fn as_any(&self) -> &dyn ::core::any::Any {
                    self
                }
            }

            impl ::fieldmap::Record for #name {
                fn record_def() -> &'static ::fieldmap::RecordDef {
                    static FIELDS: &[::fieldmap::FieldDef] = &[#(#field_defs),*];
                    static RECORD: ::fieldmap::RecordDef =
                        ::fieldmap::RecordDef::new(#type_name, ::core::module_path!(), FIELDS);
                    &RECORD
                }

                #[allow(unreachable_patterns)]
                fn field(&self, index: usize) -> ::core::option::Option<&dyn ::fieldmap::Value> {
                    match index {
                        #(#field_arms,)*
                        _ => ::core::option::Option::None,
                    }
                }

                #[allow(unreachable_patterns)]
                fn field_mut(&mut self, index: usize) -> ::core::option::Option<&mut dyn ::fieldmap::Value> {
                    match index {
                        #(#field_mut_arms,)*
                        _ => ::core::option::Option::None,
                    }
                }
            }
        }
    }
}
