//! Filter and sort composition for listing searches.
//!
//! Everything here is pure: raw query values go in, SQL fragments with bound
//! parameters come out. Malformed optional values are dropped rather than
//! reported.

use std::str::FromStr;

use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};

/// Result ordering for listing searches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ListingSort {
    #[default]
    NewestFirst,
    OldestFirst,
    PriceAsc,
    PriceDesc,
    TitleAsc,
    TitleDesc,
}

impl ListingSort {
    /// Map a wire value (`-created_at`, `price`, ...) to a sort order.
    /// Anything unrecognised sorts newest first.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("created_at") => Self::OldestFirst,
            Some("price") => Self::PriceAsc,
            Some("-price") => Self::PriceDesc,
            Some("title") => Self::TitleAsc,
            Some("-title") => Self::TitleDesc,
            _ => Self::default(),
        }
    }

    /// ORDER BY clause body. Ties fall back to id so pages never overlap.
    pub fn order_by(self) -> &'static str {
        match self {
            Self::NewestFirst => "l.created_at DESC, l.id DESC",
            Self::OldestFirst => "l.created_at ASC, l.id DESC",
            Self::PriceAsc => "l.price ASC, l.id DESC",
            Self::PriceDesc => "l.price DESC, l.id DESC",
            Self::TitleAsc => "l.title ASC, l.id DESC",
            Self::TitleDesc => "l.title DESC, l.id DESC",
        }
    }
}

/// Parse a price bound; blank or non-numeric input is ignored
pub fn parse_price(raw: Option<&str>) -> Option<Decimal> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| Decimal::from_str(s).ok())
}

/// Escape `%`, `_` and `\` so user input matches literally inside LIKE
pub fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn non_blank(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Predicates over active listings, AND-combined
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingFilters {
    /// Exact owner username
    pub seller: Option<String>,
    /// Resolved category subtree
    pub category_ids: Option<Vec<i64>>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    /// Case-insensitive substring of the city
    pub city: Option<String>,
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
}

impl ListingFilters {
    /// Build filters from raw query values. The category reference is
    /// resolved separately and attached with [`ListingFilters::with_categories`].
    pub fn from_raw(
        seller: Option<&str>,
        min_price: Option<&str>,
        max_price: Option<&str>,
        city: Option<&str>,
        search: Option<&str>,
    ) -> Self {
        Self {
            seller: non_blank(seller),
            category_ids: None,
            min_price: parse_price(min_price),
            max_price: parse_price(max_price),
            city: non_blank(city),
            search: non_blank(search),
        }
    }

    pub fn with_categories(mut self, category_ids: Option<Vec<i64>>) -> Self {
        self.category_ids = category_ids;
        self
    }

    /// Append the WHERE clause. Expects `listings` aliased as `l` and the
    /// owner joined as `u`.
    pub fn push_where(&self, qb: &mut QueryBuilder<'_, Postgres>) {
        qb.push(" WHERE l.status = 'active'");

        if let Some(seller) = &self.seller {
            qb.push(" AND u.username = ").push_bind(seller.clone());
        }
        if let Some(ids) = &self.category_ids {
            qb.push(" AND l.category_id = ANY(")
                .push_bind(ids.clone())
                .push(")");
        }
        if let Some(min) = self.min_price {
            qb.push(" AND l.price >= ").push_bind(min);
        }
        if let Some(max) = self.max_price {
            qb.push(" AND l.price <= ").push_bind(max);
        }
        if let Some(city) = &self.city {
            qb.push(" AND l.city ILIKE ")
                .push_bind(format!("%{}%", escape_like(city)))
                .push(r" ESCAPE '\'");
        }
        if let Some(search) = &self.search {
            let pattern = format!("%{}%", escape_like(search));
            qb.push(" AND (l.title ILIKE ")
                .push_bind(pattern.clone())
                .push(r" ESCAPE '\' OR l.description ILIKE ")
                .push_bind(pattern)
                .push(r" ESCAPE '\')");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn where_sql(filters: &ListingFilters) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM listings l");
        filters.push_where(&mut qb);
        qb.sql().to_string()
    }

    #[test]
    fn test_sort_wire_values() {
        assert_eq!(ListingSort::parse(None), ListingSort::NewestFirst);
        assert_eq!(ListingSort::parse(Some("-created_at")), ListingSort::NewestFirst);
        assert_eq!(ListingSort::parse(Some("created_at")), ListingSort::OldestFirst);
        assert_eq!(ListingSort::parse(Some("price")), ListingSort::PriceAsc);
        assert_eq!(ListingSort::parse(Some("-price")), ListingSort::PriceDesc);
        assert_eq!(ListingSort::parse(Some("title")), ListingSort::TitleAsc);
        assert_eq!(ListingSort::parse(Some("-title")), ListingSort::TitleDesc);
    }

    #[test]
    fn test_bogus_sort_orders_like_no_sort() {
        assert_eq!(
            ListingSort::parse(Some("bogus_value")).order_by(),
            ListingSort::parse(None).order_by()
        );
        // column injection attempts never reach SQL
        assert_eq!(
            ListingSort::parse(Some("price; DROP TABLE listings")),
            ListingSort::NewestFirst
        );
    }

    #[test]
    fn test_every_order_has_id_tiebreak() {
        for raw in ["-created_at", "created_at", "price", "-price", "title", "-title"] {
            assert!(ListingSort::parse(Some(raw)).order_by().ends_with("l.id DESC"));
        }
    }

    #[test]
    fn test_parse_price() {
        assert_eq!(parse_price(Some("400")), Some(Decimal::new(400, 0)));
        assert_eq!(parse_price(Some(" 99.50 ")), Some(Decimal::new(9950, 2)));
        assert_eq!(parse_price(Some("abc")), None);
        assert_eq!(parse_price(Some("")), None);
        assert_eq!(parse_price(None), None);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("100%"), r"100\%");
        assert_eq!(escape_like("a_b"), r"a\_b");
        assert_eq!(escape_like(r"c:\temp"), r"c:\\temp");
        assert_eq!(escape_like("Chișinău"), "Chișinău");
    }

    #[test]
    fn test_no_filters_only_restricts_status() {
        let sql = where_sql(&ListingFilters::default());
        assert_eq!(sql, "SELECT 1 FROM listings l WHERE l.status = 'active'");
    }

    #[test]
    fn test_all_filters_bind_in_order() {
        let filters = ListingFilters::from_raw(
            Some("ion"),
            Some("400"),
            Some("600"),
            Some("Chisinau"),
            Some("iphone"),
        )
        .with_categories(Some(vec![1, 2, 3]));
        let sql = where_sql(&filters);

        assert!(sql.contains("u.username = $1"));
        assert!(sql.contains("l.category_id = ANY($2)"));
        assert!(sql.contains("l.price >= $3"));
        assert!(sql.contains("l.price <= $4"));
        assert!(sql.contains("l.city ILIKE $5"));
        assert!(sql.contains("(l.title ILIKE $6 ESCAPE '\\' OR l.description ILIKE $7"));
    }

    #[test]
    fn test_malformed_values_are_dropped() {
        let filters = ListingFilters::from_raw(Some("  "), Some("cheap"), Some("1e"), None, Some(""));
        assert_eq!(filters, ListingFilters::default());
    }
}
