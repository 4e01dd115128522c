use garde::Validate;
use serde::Deserialize;
use valuable::Valuable;

const DEFAULT_LIMIT: i64 = 500;

/// Query parameters shared by every list endpoint.
#[derive(Deserialize, Validate, Valuable, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct Pagination {
    #[garde(range(min = 1))]
    pub limit: i64,
    #[garde(range(min = 0))]
    pub offset: i64,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!({}), Pagination { limit: 500, offset: 0 })]
    #[case(json!({"limit": 10}), Pagination { limit: 10, offset: 0 })]
    #[case(json!({"offset": 20}), Pagination { limit: 500, offset: 20 })]
    fn pagination_defaults(#[case] query: serde_json::Value, #[case] expected: Pagination) {
        let pagination: Pagination = serde_json::from_value(query).unwrap();
        assert_eq!(pagination, expected);
    }

    #[rstest]
    #[case(Pagination { limit: 0, offset: 0 })]
    #[case(Pagination { limit: 5, offset: -1 })]
    fn invalid_pagination(#[case] pagination: Pagination) {
        assert!(pagination.validate().is_err());
    }
}
