/// Whether a declared content type is some `image/*`.
pub fn accepts(content_type: &str) -> bool {
    let essence = content_type.split(';').next().unwrap_or_default().trim();

    match essence.split_once('/') {
        Some((kind, subtype)) => kind.eq_ignore_ascii_case("image") && !subtype.trim().is_empty(),
        None => false,
    }
}
