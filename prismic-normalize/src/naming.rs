//! Generated type names.

/// Converts an identifier to PascalCase: `blog_post` and `blog-post` both
/// become `BlogPost`.
pub fn pascal_case(id: &str) -> String {
    id.split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}

/// `Prismic` + prefix + PascalCase of the parts.
pub fn type_name<'a>(prefix: Option<&str>, parts: impl IntoIterator<Item = &'a str>) -> String {
    let mut name = String::from("Prismic");
    if let Some(prefix) = prefix {
        name.push_str(&pascal_case(prefix));
    }
    for part in parts {
        name.push_str(&pascal_case(part));
    }
    name
}

/// Type name of a document node, e.g. `PrismicPage`.
pub fn document_type_name(prefix: Option<&str>, custom_type: &str) -> String {
    type_name(prefix, [custom_type])
}
