use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::kernel::Filter;

/// What to do with a filter token that names no known filter.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownFilterPolicy {
    /// Drop the token and keep going.
    #[default]
    Skip,
    /// Fail the whole job.
    Reject,
}

impl FromStr for UnknownFilterPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "skip" => Ok(UnknownFilterPolicy::Skip),
            "reject" => Ok(UnknownFilterPolicy::Reject),
            other => Err(Error::Config(format!(
                "unknown filter policy '{other}', expected skip|reject"
            ))),
        }
    }
}

/// Ordered filter chain, identical on every participant.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterPlan {
    filters: Vec<Filter>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParsedPlan {
    pub plan: FilterPlan,
    /// Tokens dropped under [`UnknownFilterPolicy::Skip`], in input order.
    pub dropped: Vec<String>,
}

impl FilterPlan {
    pub fn new(filters: Vec<Filter>) -> Self {
        Self { filters }
    }

    pub fn parse<I, S>(tokens: I, policy: UnknownFilterPolicy) -> Result<ParsedPlan>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut filters = Vec::new();
        let mut dropped = Vec::new();

        for token in tokens {
            let token = token.as_ref();
            match Filter::from_str(token) {
                Ok(filter) => filters.push(filter),
                Err(_) => match policy {
                    UnknownFilterPolicy::Skip => {
                        tracing::warn!(token, "Dropping unknown filter");
                        dropped.push(token.to_string());
                    }
                    UnknownFilterPolicy::Reject => {
                        return Err(Error::UnknownFilter(token.to_string()))
                    }
                },
            }
        }

        Ok(ParsedPlan {
            plan: FilterPlan { filters },
            dropped,
        })
    }

    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    pub fn len(&self) -> usize {
        self.filters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Filter> {
        self.filters.iter()
    }
}

impl std::fmt::Display for FilterPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<String> = self.filters.iter().map(Filter::to_string).collect();
        write!(f, "[{}]", names.join(", "))
    }
}
