//! Query parameter extractors for paginated endpoints.

use serde::Deserialize;

use parley_types::config::ParleyConfig;
use parley_types::page::PageRequest;

use crate::http::error::AppError;

/// Query parameters for the session timeline endpoint.
#[derive(Debug, Deserialize, Default)]
pub struct PageQuery {
    /// 1-based page number (default 1).
    pub page: Option<u32>,
    /// Page size (default from config).
    pub limit: Option<u32>,
}

impl PageQuery {
    /// Apply defaults and bounds from the config.
    pub fn resolve(&self, config: &ParleyConfig) -> Result<PageRequest, AppError> {
        let page = self.page.unwrap_or(1);
        let limit = self.limit.unwrap_or(config.default_page_limit);

        if page < 1 {
            return Err(AppError::Validation("page must be at least 1".to_string()));
        }
        if limit < 1 || limit > config.max_page_limit {
            return Err(AppError::Validation(format!(
                "limit must be between 1 and {}",
                config.max_page_limit
            )));
        }

        Ok(PageRequest::new(page, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let req = PageQuery::default().resolve(&ParleyConfig::default()).unwrap();
        assert_eq!(req, PageRequest::new(1, 20));
    }

    #[test]
    fn test_config_default_limit() {
        let config = ParleyConfig {
            default_page_limit: 5,
            ..ParleyConfig::default()
        };
        let req = PageQuery::default().resolve(&config).unwrap();
        assert_eq!(req.limit, 5);
    }

    #[test]
    fn test_rejects_out_of_range() {
        let config = ParleyConfig::default();
        let zero_page = PageQuery { page: Some(0), limit: None };
        assert!(matches!(zero_page.resolve(&config), Err(AppError::Validation(_))));

        let zero_limit = PageQuery { page: None, limit: Some(0) };
        assert!(matches!(zero_limit.resolve(&config), Err(AppError::Validation(_))));

        let huge_limit = PageQuery { page: None, limit: Some(101) };
        assert!(matches!(huge_limit.resolve(&config), Err(AppError::Validation(_))));

        let max_limit = PageQuery { page: Some(3), limit: Some(100) };
        assert_eq!(max_limit.resolve(&config).unwrap(), PageRequest::new(3, 100));
    }
}
