//! Browse query for listing documents in a collection

use bson::Document as BsonDocument;

/// Upper bound on documents returned by one browse request
pub const MAX_LIMIT: i64 = 1000;

/// Default page size when a request names none
pub const DEFAULT_LIMIT: i64 = 100;

/// Filter plus paging for a find operation
#[derive(Debug, Clone, PartialEq)]
pub struct FindQuery {
    filter: BsonDocument,
    skip: Option<u64>,
    limit: i64,
}

impl Default for FindQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl FindQuery {
    /// Everything, first page
    pub fn new() -> Self {
        Self {
            filter: BsonDocument::new(),
            skip: None,
            limit: DEFAULT_LIMIT,
        }
    }

    /// Set the filter document
    pub fn filter(mut self, filter: BsonDocument) -> Self {
        self.filter = filter;
        self
    }

    /// Set the number of documents to skip
    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = Some(skip);
        self
    }

    /// Set the maximum number of documents to return, clamped to `1..=MAX_LIMIT`
    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = limit.clamp(1, MAX_LIMIT);
        self
    }

    /// Get the filter document
    pub fn get_filter(&self) -> &BsonDocument {
        &self.filter
    }

    /// Get the skip value
    pub fn get_skip(&self) -> Option<u64> {
        self.skip
    }

    /// Get the limit value
    pub fn get_limit(&self) -> i64 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn test_find_query_new() {
        let q = FindQuery::new();
        assert!(q.get_filter().is_empty());
        assert!(q.get_skip().is_none());
        assert_eq!(q.get_limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn test_find_query_chaining() {
        let filter = doc! { "active": true };
        let q = FindQuery::new().filter(filter.clone()).skip(5).limit(10);
        assert_eq!(q.get_filter(), &filter);
        assert_eq!(q.get_skip(), Some(5));
        assert_eq!(q.get_limit(), 10);
    }

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(FindQuery::new().limit(0).get_limit(), 1);
        assert_eq!(FindQuery::new().limit(-5).get_limit(), 1);
        assert_eq!(FindQuery::new().limit(50_000).get_limit(), MAX_LIMIT);
    }
}
