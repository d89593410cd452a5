/// Represents the result window of a query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Pagination {
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl Pagination {
    /// Window from optional bounds; `None` leaves the bound unset rather than zero
    pub fn new(limit: Option<u64>, offset: Option<u64>) -> Self {
        Self { limit, offset }
    }

    /// Create pagination with only limit
    pub fn limit_only(limit: u64) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }

    /// Create pagination with only offset
    pub fn offset_only(offset: u64) -> Self {
        Self {
            limit: None,
            offset: Some(offset),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.limit.is_none() && self.offset.is_none()
    }

    pub fn to_dql(&self) -> String {
        let mut dql = String::new();

        if let Some(limit) = self.limit {
            dql.push_str(&format!(" LIMIT {limit}"));
        }

        if let Some(offset) = self.offset {
            dql.push_str(&format!(" OFFSET {offset}"));
        }

        dql
    }
}
