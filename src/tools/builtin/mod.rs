//! Built-in data tools: weather, news, web search.

pub mod news;
pub mod search;
pub mod weather;

pub use news::NewsTool;
pub use search::SearchTool;
pub use weather::WeatherTool;

use std::sync::Arc;

use crate::config::ToolKeys;
use crate::tools::registry::{RegistryError, ToolRegistry};

/// Register the built-in tools. Missing credentials do not block
/// registration; the affected tool reports failure at invocation time.
pub fn register_builtin(
    registry: &mut ToolRegistry,
    http: &reqwest::Client,
    keys: ToolKeys,
) -> Result<(), RegistryError> {
    registry.register(Arc::new(WeatherTool::new(http.clone(), keys.weather)))?;
    registry.register(Arc::new(NewsTool::new(http.clone(), keys.news)))?;
    registry.register(Arc::new(SearchTool::new(
        http.clone(),
        keys.search,
        keys.search_cx,
    )))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_builtin_without_keys() {
        let mut registry = ToolRegistry::new();
        register_builtin(&mut registry, &reqwest::Client::new(), ToolKeys::default()).unwrap();

        assert_eq!(registry.count(), 3);
        assert!(registry.has("get_weather"));
        assert!(registry.has("get_news"));
        assert!(registry.has("get_search"));
    }
}
