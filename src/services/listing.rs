use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Copy)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn from_query(value: Option<&str>) -> Self {
        match value.unwrap_or("desc").trim().to_ascii_lowercase().as_str() {
            "asc" => SortOrder::Asc,
            _ => SortOrder::Desc,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

pub fn clamp_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

pub fn clamp_page_size(page_size: Option<i64>) -> i64 {
    page_size.unwrap_or(20).clamp(1, 200)
}

pub fn normalize_search(search: Option<&str>) -> Option<String> {
    let raw = search?.trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

pub fn build_pagination(page: i64, page_size: i64, total: i64) -> Pagination {
    let total_pages = if total > 0 {
        (total + page_size - 1) / page_size
    } else {
        0
    };

    Pagination {
        page,
        page_size,
        total,
        total_pages,
    }
}

/// Case-insensitive substring predicate, the in-process equivalent of the
/// ILIKE patterns the list queries bind.
pub fn matches_search(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pagination_rounds_up() {
        let p = build_pagination(1, 20, 41);
        assert_eq!(p.total_pages, 3);
        assert_eq!(p.total, 41);
    }

    #[test]
    fn pagination_empty_total_has_zero_pages() {
        let p = build_pagination(1, 20, 0);
        assert_eq!(p.total_pages, 0);
    }

    #[test]
    fn page_and_page_size_clamp() {
        assert_eq!(clamp_page(None), 1);
        assert_eq!(clamp_page(Some(-3)), 1);
        assert_eq!(clamp_page_size(None), 20);
        assert_eq!(clamp_page_size(Some(0)), 1);
        assert_eq!(clamp_page_size(Some(10_000)), 200);
    }

    #[test]
    fn search_normalization_drops_blank() {
        assert_eq!(normalize_search(Some("  ")), None);
        assert_eq!(normalize_search(Some(" verbs ")), Some("verbs".to_string()));
        assert_eq!(normalize_search(None), None);
    }

    #[test]
    fn search_predicate_is_case_insensitive() {
        let names = ["Grammar", "Travel", "Business English", "travel tips", "Idioms"];
        let matched: Vec<&str> = names
            .iter()
            .copied()
            .filter(|name| matches_search(name, "TRAV"))
            .collect();
        assert_eq!(matched, vec!["Travel", "travel tips"]);
    }

    #[test]
    fn sort_order_parses_loosely() {
        assert!(matches!(SortOrder::from_query(Some("ASC")), SortOrder::Asc));
        assert!(matches!(SortOrder::from_query(Some("bogus")), SortOrder::Desc));
        assert!(matches!(SortOrder::from_query(None), SortOrder::Desc));
    }
}
