//! Token rendering for generated SObject modules.
//!
//! Output is a flat token stream; run `cargo fmt` over the target directory
//! for readable files. Picklist enums carry an untagged `Other(String)`
//! fallback, which needs serde 1.0.181 or later in the consuming crate.

use std::collections::HashSet;

use convert_case::{Case, Casing};
use proc_macro2::{Ident, Span, TokenStream};
use quote::quote;

use crate::model::{FieldType, ObjectSpec};

const HEADER: &str = "// @generated by cloudy from Salesforce describe metadata. Do not edit.\n\n";

/// Keywords that can only be used as raw identifiers.
const RAW_KEYWORDS: &[&str] = &[
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "do",
    "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "gen", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "static", "struct", "trait", "true", "try", "type", "typeof", "unsafe", "unsized",
    "use", "virtual", "where", "while", "yield",
];

/// Keywords that cannot be raw identifiers either.
const RESERVED: &[&str] = &["self", "Self", "super", "crate", "_"];

/// File stem (and module name) for an object.
pub fn module_name(class_name: &str) -> String {
    sanitize(class_name, Case::Snake, "m_")
}

/// Rust type name for an object.
pub fn type_name(class_name: &str) -> String {
    sanitize(class_name, Case::Pascal, "T")
}

/// Render the source of one object module.
pub fn render_object(spec: &ObjectSpec) -> String {
    format!("{HEADER}{}\n", object_tokens(spec))
}

/// Render a `mod.rs` declaring and re-exporting every object module.
pub fn render_mod(specs: &[ObjectSpec]) -> String {
    let items: Vec<TokenStream> = specs
        .iter()
        .map(|spec| {
            let module = ident(&module_name(&spec.class_name));
            let ty = ident(&type_name(&spec.class_name));
            quote! {
                pub mod #module;
                pub use #module::#ty;
            }
        })
        .collect();

    let tokens = quote! { #(#items)* };
    format!("{HEADER}{tokens}\n")
}

fn object_tokens(spec: &ObjectSpec) -> TokenStream {
    let struct_name = type_name(&spec.class_name);
    let struct_ident = ident(&struct_name);
    let sobject = spec.class_name.as_str();

    let mut type_names = HashSet::from([struct_name]);
    let mut field_names = HashSet::new();
    let mut fields = quote!();
    let mut enums = quote!();

    for field in &spec.fields {
        let api_name = field.name.as_str();
        let field_ident = ident(&unique(
            sanitize(api_name, Case::Snake, "f_"),
            "_",
            &mut field_names,
        ));

        let ty = match field.field_type {
            FieldType::String => quote!(String),
            FieldType::Float => quote!(f64),
            FieldType::Integer => quote!(i64),
            FieldType::Boolean => quote!(bool),
            FieldType::Json => quote!(serde_json::Value),
            FieldType::Picklist => {
                let enum_name = format!("{}Picklist", type_name(api_name));
                let enum_ident = ident(&unique(enum_name, "", &mut type_names));
                let values = field.picklist.as_deref().unwrap_or_default();
                enums.extend(picklist_tokens(&enum_ident, api_name, values));
                quote!(#enum_ident)
            }
        };

        fields.extend(quote! {
            #[serde(rename = #api_name, default, skip_serializing_if = "Option::is_none")]
            pub #field_ident: Option<#ty>,
        });
    }

    let doc = format!(" `{sobject}` record.");

    quote! {
        use serde::{Deserialize, Serialize};

        #[doc = #doc]
        #[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
        pub struct #struct_ident {
            #fields
        }

        impl #struct_ident {
            /// Salesforce API name of this object.
            pub const SOBJECT: &'static str = #sobject;
        }

        #enums
    }
}

fn picklist_tokens(enum_ident: &Ident, api_name: &str, values: &[String]) -> TokenStream {
    let mut taken = HashSet::from(["Other".to_string()]);
    let variants: Vec<TokenStream> = values
        .iter()
        .map(|value| {
            let variant = ident(&unique(sanitize(value, Case::Pascal, "V"), "", &mut taken));
            quote! {
                #[serde(rename = #value)]
                #variant,
            }
        })
        .collect();

    let doc = format!(" Active values of `{api_name}`.");

    quote! {
        #[doc = #doc]
        #[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
        pub enum #enum_ident {
            #(#variants)*
            /// A value that was not active when this file was generated.
            #[serde(untagged)]
            Other(String),
        }
    }
}

/// Reduce an arbitrary Salesforce name or value to an ASCII identifier in
/// the given case.
fn sanitize(raw: &str, case: Case, prefix: &str) -> String {
    let words = raw
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|word| !word.is_empty())
        .collect::<Vec<_>>()
        .join(" ");

    let mut name = words.to_case(case);
    name.retain(|c| c.is_ascii_alphanumeric() || c == '_');

    if name.is_empty() || name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, prefix);
    }
    if RESERVED.contains(&name.as_str()) {
        name.push('_');
    }
    name
}

fn unique(name: String, separator: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(name.clone()) {
        return name;
    }
    let mut n = 2;
    loop {
        let candidate = format!("{name}{separator}{n}");
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

fn ident(name: &str) -> Ident {
    if RAW_KEYWORDS.contains(&name) {
        Ident::new_raw(name, Span::call_site())
    } else {
        Ident::new(name, Span::call_site())
    }
}
