/// Indices of the rows in `data` that match both the search term and the
/// active tag.
///
/// * The term is trimmed and compared case-insensitively as a substring of
///   the row's full text; an empty term matches everything
/// * `tag == None` means "All" and imposes no tag restriction
///
/// ```text
/// term "web", tag Some("prod")
/// └── keep rows that
///     ├─ contain "web" anywhere in their text
///     └─ carry the "prod" tag
/// ```
#[tracing::instrument(skip(data, text_of, tags_of), fields(rows = data.len()))]
pub fn filter_rows<T, F, G>(
    data: &[T],
    term: &str,
    tag: Option<&str>,
    text_of: F,
    tags_of: G,
) -> Vec<usize>
where
    F: Fn(&T) -> &str,
    G: Fn(&T) -> &[String],
{
    let needle = term.trim().to_lowercase();

    data.iter()
        .enumerate()
        .filter(|(_, item)| needle.is_empty() || text_of(*item).to_lowercase().contains(&needle))
        .filter(|(_, item)| match tag {
            Some(wanted) => tags_of(*item).iter().any(|t| t == wanted),
            None => true,
        })
        .map(|(idx, _)| idx)
        .collect()
}
