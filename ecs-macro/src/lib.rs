use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Fields, Index, parse_macro_input};

/// Derive the `Component` trait for a scene component.
///
/// The type must also implement `Clone` and `Debug`. Cloning must produce an
/// independent deep copy; owned fields (`Vec`, `String`, `Box`, nested
/// structs) satisfy this automatically.
///
/// Alongside `Component` this derive implements `ComponentType` (the static
/// name) and `StructuralEq` (exact field-by-field comparison), so every field
/// type must implement `StructuralEq` too. Fields marked
/// `#[structural(skip)]` are left out of the comparison.
///
/// # Named structs
///
/// ```ignore
/// #[derive(Debug, Clone, Default, Component)]
/// struct Transform {
///     position: Vec2,
///     rotation: f32,
/// }
/// ```
///
/// # Invisible components
///
/// Components that only hold derived display state are marked invisible and
/// are skipped by `ClonePolicy::SkipInvisible` snapshots:
///
/// ```ignore
/// #[derive(Debug, Clone, Default, Component)]
/// #[component(invisible)]
/// struct SpriteRenderState {
///     vertices: Vec<f32>,
/// }
/// ```
#[proc_macro_derive(Component, attributes(component, structural))]
pub fn derive_component(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let name_str = name.to_string();
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    if !matches!(input.data, Data::Struct(_)) {
        return syn::Error::new_spanned(&input.ident, "Component can only be derived for structs")
            .to_compile_error()
            .into();
    }

    let invisible = match parse_invisible(&input.attrs) {
        Ok(invisible) => invisible,
        Err(err) => return err.to_compile_error().into(),
    };

    let structural = match structural_eq_impl(&input) {
        Ok(tokens) => tokens,
        Err(err) => return err.to_compile_error().into(),
    };

    let expanded = quote! {
        #structural

        impl #impl_generics scenedit_ecs::ComponentType for #name #ty_generics #where_clause {
            const NAME: &'static str = #name_str;
        }

        impl #impl_generics scenedit_ecs::Component for #name #ty_generics #where_clause {
            fn component_name(&self) -> &'static str {
                #name_str
            }

            fn is_invisible(&self) -> bool {
                #invisible
            }

            fn clone_component(&self) -> ::std::boxed::Box<dyn scenedit_ecs::Component> {
                ::std::boxed::Box::new(::core::clone::Clone::clone(self))
            }

            fn structural_eq(
                &self,
                other: &dyn scenedit_ecs::Component,
            ) -> ::core::option::Option<bool> {
                match scenedit_ecs::Component::as_any(other).downcast_ref::<Self>() {
                    ::core::option::Option::Some(other) => ::core::option::Option::Some(
                        scenedit_ecs::StructuralEq::structural_eq(self, other),
                    ),
                    ::core::option::Option::None => ::core::option::Option::Some(false),
                }
            }

            fn as_any(&self) -> &dyn ::core::any::Any {
                self
            }

            fn as_any_mut(&mut self) -> &mut dyn ::core::any::Any {
                self
            }
        }
    };

    expanded.into()
}

/// Derive `StructuralEq` for a struct or enum nested inside a component.
///
/// Compares every field with `StructuralEq`; enums compare equal only when
/// both sides are the same variant with structurally equal fields.
///
/// ```ignore
/// #[derive(Debug, Clone, StructuralEq)]
/// enum Shape {
///     Circle { radius: f32 },
///     Polygon(Vec<Vec2>),
/// }
/// ```
#[proc_macro_derive(StructuralEq, attributes(structural))]
pub fn derive_structural_eq(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match structural_eq_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn structural_eq_impl(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let body = match &input.data {
        Data::Struct(data) => {
            let comparisons = compared_fields(&data.fields)?
                .into_iter()
                .map(|member| {
                    quote! {
                        scenedit_ecs::StructuralEq::structural_eq(&self.#member, &other.#member)
                    }
                })
                .collect::<Vec<_>>();
            quote! { true #(&& #comparisons)* }
        }
        Data::Enum(data) => {
            let mut arms = Vec::new();
            for variant in &data.variants {
                let vname = &variant.ident;
                let bindings = variant_bindings(&variant.fields)?;
                let compared = bindings.iter().filter_map(|b| {
                    b.as_ref().map(|(l, r)| {
                        quote! { scenedit_ecs::StructuralEq::structural_eq(#l, #r) }
                    })
                });
                let lhs = bindings.iter().map(|b| match b {
                    Some((l, _)) => quote! { #l },
                    None => quote! { _ },
                });
                let rhs = bindings.iter().map(|b| match b {
                    Some((_, r)) => quote! { #r },
                    None => quote! { _ },
                });
                let arm = match &variant.fields {
                    Fields::Named(fields) => {
                        let idents: Vec<_> = fields
                            .named
                            .iter()
                            .filter_map(|f| f.ident.clone())
                            .collect();
                        quote! {
                            (
                                Self::#vname { #(#idents: #lhs),* },
                                Self::#vname { #(#idents: #rhs),* },
                            ) => true #(&& #compared)*
                        }
                    }
                    Fields::Unnamed(_) => quote! {
                        (Self::#vname(#(#lhs),*), Self::#vname(#(#rhs),*)) => true #(&& #compared)*
                    },
                    Fields::Unit => quote! {
                        (Self::#vname, Self::#vname) => true
                    },
                };
                arms.push(arm);
            }
            quote! {
                match (self, other) {
                    #(#arms,)*
                    #[allow(unreachable_patterns)]
                    _ => false,
                }
            }
        }
        Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "StructuralEq cannot be derived for unions",
            ));
        }
    };

    Ok(quote! {
        impl #impl_generics scenedit_ecs::StructuralEq for #name #ty_generics #where_clause {
            fn structural_eq(&self, other: &Self) -> bool {
                #body
            }
        }
    })
}

/// Returns the members of `fields` that take part in the comparison.
fn compared_fields(fields: &Fields) -> syn::Result<Vec<proc_macro2::TokenStream>> {
    let mut members = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        if is_skipped(&field.attrs)? {
            continue;
        }
        let member = match &field.ident {
            Some(ident) => quote! { #ident },
            None => {
                let index = Index::from(i);
                quote! { #index }
            }
        };
        members.push(member);
    }
    Ok(members)
}

/// Pattern bindings for one enum variant: `None` for skipped fields.
fn variant_bindings(
    fields: &Fields,
) -> syn::Result<Vec<Option<(proc_macro2::Ident, proc_macro2::Ident)>>> {
    let mut bindings = Vec::new();
    for (i, field) in fields.iter().enumerate() {
        if is_skipped(&field.attrs)? {
            bindings.push(None);
        } else {
            bindings.push(Some((format_ident!("l_{i}"), format_ident!("r_{i}"))));
        }
    }
    Ok(bindings)
}

fn is_skipped(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut skip = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("structural")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("skip") {
                skip = true;
                Ok(())
            } else {
                Err(meta.error("expected `skip`"))
            }
        })?;
    }
    Ok(skip)
}

fn parse_invisible(attrs: &[Attribute]) -> syn::Result<bool> {
    let mut invisible = false;
    for attr in attrs.iter().filter(|a| a.path().is_ident("component")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("invisible") {
                invisible = true;
                Ok(())
            } else {
                Err(meta.error("expected `invisible`"))
            }
        })?;
    }
    Ok(invisible)
}
