//! Per-widget filter state and the pure render step.
//!
//! Nothing in here touches the document: the table widget snapshots its rows
//! into [`RowData`] once and asks [`render`] which of them to show.

use std::collections::BTreeSet;

use crate::enhance::page::{window, PageWindow};
use crate::filter::filter_rows;
use crate::sort::{sort_by_cell, Direction};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum TagChoice {
    #[default]
    All,
    Tag(String),
}

impl TagChoice {
    fn as_filter(&self) -> Option<&str> {
        match self {
            TagChoice::All => None,
            TagChoice::Tag(t) => Some(t.as_str()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: usize,
    pub direction: Direction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    search: String,
    tag: TagChoice,
    sort: Option<SortKey>,
    page: usize,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            search: String::new(),
            tag: TagChoice::All,
            sort: None,
            page: 1,
        }
    }
}

impl FilterState {
    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn tag(&self) -> &TagChoice {
        &self.tag
    }

    pub fn sort(&self) -> Option<SortKey> {
        self.sort
    }

    pub fn page(&self) -> usize {
        self.page
    }

    /// New search term; back to page 1.
    pub fn set_search(&mut self, term: &str) {
        self.search = term.to_string();
        self.page = 1;
    }

    /// New tag selection; back to page 1.
    pub fn select_tag(&mut self, tag: TagChoice) {
        self.tag = tag;
        self.page = 1;
    }

    /// Same column flips direction, another column starts ascending. The
    /// current page is kept.
    pub fn sort_by(&mut self, column: usize) {
        self.sort = Some(match self.sort {
            Some(key) if key.column == column => SortKey {
                column,
                direction: key.direction.reversed(),
            },
            _ => SortKey {
                column,
                direction: Direction::Asc,
            },
        });
    }

    pub fn prev_page(&mut self) -> bool {
        if self.page > 1 {
            self.page -= 1;
            true
        } else {
            false
        }
    }

    pub fn next_page(&mut self, page_count: usize) -> bool {
        if self.page < page_count {
            self.page += 1;
            true
        } else {
            false
        }
    }
}

/// Snapshot of one row taken at enhancement time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowData {
    /// Full text content, used for search.
    pub text: String,
    pub tags: Vec<String>,
    /// Per-column text, used for sorting.
    pub cells: Vec<String>,
}

/// Output of one render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    /// Every row index in display order.
    pub order: Vec<usize>,
    /// Rows on the current page, in display order.
    pub visible: Vec<usize>,
    pub filtered: usize,
    pub window: PageWindow,
}

impl View {
    pub fn is_visible(&self, row: usize) -> bool {
        self.visible.contains(&row)
    }
}

/// Filter, sort, then page. Clamps the state's page into range.
pub fn render(state: &mut FilterState, rows: &[RowData], per_page: usize) -> View {
    let mut order: Vec<usize> = (0..rows.len()).collect();
    if let Some(key) = state.sort {
        sort_by_cell(&mut order, key.direction, |idx| {
            rows[idx].cells.get(key.column).cloned().unwrap_or_default()
        });
    }

    let mut matches = vec![false; rows.len()];
    for idx in filter_rows(
        rows,
        &state.search,
        state.tag.as_filter(),
        |r| r.text.as_str(),
        |r| r.tags.as_slice(),
    ) {
        matches[idx] = true;
    }

    let filtered: Vec<usize> = order.iter().copied().filter(|&i| matches[i]).collect();
    let window = window(filtered.len(), per_page, state.page);
    state.page = window.page;

    View {
        visible: filtered[window.start..window.end].to_vec(),
        filtered: filtered.len(),
        order,
        window,
    }
}

/// Distinct tags across all rows, alphabetically.
pub fn distinct_tags(rows: &[RowData]) -> Vec<String> {
    rows.iter()
        .flat_map(|r| r.tags.iter().cloned())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(n: usize) -> Vec<RowData> {
        (0..n)
            .map(|i| RowData {
                text: format!("host-{i:02} {}", if i % 2 == 0 { "Running" } else { "Stopped" }),
                tags: if i % 3 == 0 { vec!["prod".into()] } else { vec!["dev".into()] },
                cells: vec![format!("host-{i:02}"), format!("{}", (i * 7) % 30)],
            })
            .collect()
    }

    #[test]
    fn test_thirty_rows_two_pages() {
        let data = rows(30);
        let mut state = FilterState::default();

        let view = render(&mut state, &data, 25);
        assert_eq!(view.visible.len(), 25);
        assert_eq!(view.filtered, 30);
        assert!(!view.window.has_prev());
        assert!(view.window.has_next());

        assert!(state.next_page(view.window.page_count));
        let view = render(&mut state, &data, 25);
        assert_eq!(view.visible, (25..30).collect::<Vec<_>>());
        assert!(!view.window.has_next());
        assert!(!state.next_page(view.window.page_count));
    }

    #[test]
    fn test_no_filter_keeps_all_rows() {
        let data = rows(12);
        let mut state = FilterState::default();
        let view = render(&mut state, &data, 100);
        assert_eq!(view.filtered, data.len());
    }

    #[test]
    fn test_visible_rows_match_search_and_tag() {
        let data = rows(30);
        let mut state = FilterState::default();
        state.set_search("running");
        state.select_tag(TagChoice::Tag("prod".into()));

        let view = render(&mut state, &data, 100);
        for (idx, row) in data.iter().enumerate() {
            let expected = row.text.to_lowercase().contains("running")
                && row.tags.iter().any(|t| t == "prod");
            assert_eq!(view.is_visible(idx), expected, "row {idx}");
        }
        assert_eq!(view.filtered, view.visible.len());
    }

    #[test]
    fn test_filter_changes_reset_page_and_sort_does_not() {
        let data = rows(30);
        let mut state = FilterState::default();
        state.next_page(2);
        state.sort_by(1);
        assert_eq!(state.page(), 2);

        state.set_search("host");
        assert_eq!(state.page(), 1);

        state.next_page(2);
        state.select_tag(TagChoice::All);
        assert_eq!(state.page(), 1);

        let _ = render(&mut state, &data, 10);
    }

    #[test]
    fn test_page_is_clamped_on_render() {
        let data = rows(5);
        let mut state = FilterState::default();
        for _ in 0..4 {
            state.next_page(10);
        }
        let view = render(&mut state, &data, 2);
        assert_eq!(state.page(), 3);
        assert_eq!(view.visible, vec![4]);
    }

    #[test]
    fn test_sort_header_cycle() {
        let mut state = FilterState::default();
        state.sort_by(1);
        assert_eq!(state.sort().map(|k| k.direction), Some(Direction::Asc));
        state.sort_by(1);
        assert_eq!(state.sort().map(|k| k.direction), Some(Direction::Desc));
        state.sort_by(0);
        assert_eq!(
            state.sort(),
            Some(SortKey {
                column: 0,
                direction: Direction::Asc
            })
        );
    }

    #[test]
    fn test_second_click_reverses_order() {
        let data: Vec<RowData> = ["10", "2", "abc", "33", "b"]
            .iter()
            .map(|v| RowData {
                text: v.to_string(),
                tags: Vec::new(),
                cells: vec![v.to_string()],
            })
            .collect();
        let mut state = FilterState::default();

        state.sort_by(0);
        let asc = render(&mut state, &data, 25).visible;
        assert_eq!(asc, vec![1, 0, 3, 2, 4]);

        state.sort_by(0);
        let mut desc = render(&mut state, &data, 25).visible;
        desc.reverse();
        assert_eq!(desc, asc);
    }

    #[test]
    fn test_distinct_tags_sorted() {
        let data = vec![
            RowData {
                tags: vec!["web".into(), "prod".into()],
                ..Default::default()
            },
            RowData {
                tags: vec!["db".into(), "prod".into()],
                ..Default::default()
            },
            RowData::default(),
        ];
        assert_eq!(distinct_tags(&data), vec!["db", "prod", "web"]);
    }
}
