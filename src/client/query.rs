use serde::Deserialize;

/// Filters understood by the Octopus list endpoints.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Query {
    pub ids: Vec<String>,
    pub partial_name: Option<String>,
    pub skip: Option<i64>,
    pub take: Option<i64>,
    /// Collection specific filters, e.g. `accountType` or `tags`.
    pub extra: Vec<(&'static str, String)>,
}

impl Query {
    pub fn with(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.extra.push((key, value.into()));
        self
    }

    pub fn pairs(&self) -> Vec<(&str, String)> {
        let mut pairs = Vec::new();
        if !self.ids.is_empty() {
            pairs.push(("ids", self.ids.join(",")));
        }
        if let Some(partial_name) = &self.partial_name {
            pairs.push(("partialName", partial_name.clone()));
        }
        if let Some(skip) = self.skip {
            pairs.push(("skip", skip.to_string()));
        }
        if let Some(take) = self.take {
            pairs.push(("take", take.to_string()));
        }
        pairs.extend(self.extra.iter().map(|(key, value)| (*key, value.clone())));
        pairs
    }
}

/// One page of a list endpoint.
#[derive(Deserialize, Debug)]
#[serde(rename_all = "PascalCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_results: i64,
    #[serde(default)]
    pub items_per_page: i64,
}
