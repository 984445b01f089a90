//! Plan-time checks on configured values.
//!
//! Unknown and null values are skipped: they are checked again once known.
use tf_provider::value::Value;
use tf_provider::{AttributePath, Diagnostics};
use url::Url;

use super::value::{TfString, TfStrings};

#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub summary: String,
    pub detail: String,
    pub path: Vec<PathStep>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PathStep {
    Attribute(String),
    Index(i64),
}

/// Collects validation issues, then reports them as diagnostics.
#[derive(Debug, Default)]
pub struct Validation {
    prefix: Vec<PathStep>,
    issues: Vec<Issue>,
}

impl Validation {
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn error(&mut self, attribute: &str, summary: impl Into<String>, detail: impl Into<String>) {
        let mut path = self.prefix.clone();
        path.push(PathStep::Attribute(attribute.to_string()));
        self.issues.push(Issue {
            summary: summary.into(),
            detail: detail.into(),
            path,
        });
    }

    /// Run checks on the `index`th element of a nested block.
    pub fn within(&mut self, block: &str, index: usize, check: impl FnOnce(&mut Validation)) {
        let depth = self.prefix.len();
        self.prefix.push(PathStep::Attribute(block.to_string()));
        self.prefix.push(PathStep::Index(index as i64));
        check(self);
        self.prefix.truncate(depth);
    }

    pub fn one_of(&mut self, attribute: &str, value: &TfString, allowed: &[&str]) {
        if let Value::Value(value) = value {
            if !allowed.contains(&value.as_str()) {
                self.error(
                    attribute,
                    format!("invalid value for {attribute}"),
                    format!("expected one of [{}], got {value:?}", allowed.join(", ")),
                );
            }
        }
    }

    pub fn each_one_of(&mut self, attribute: &str, values: &TfStrings, allowed: &[&str]) {
        let Value::Value(values) = values else {
            return;
        };
        for value in values {
            if let Value::Value(value) = value {
                if !allowed.contains(&value.as_str()) {
                    self.error(
                        attribute,
                        format!("invalid value in {attribute}"),
                        format!("expected each item to be one of [{}], got {value:?}", allowed.join(", ")),
                    );
                }
            }
        }
    }

    pub fn not_empty(&mut self, attribute: &str, value: &TfString) {
        if let Value::Value(value) = value {
            if value.trim().is_empty() {
                self.error(attribute, format!("{attribute} must not be empty"), "");
            }
        }
    }

    pub fn uuid(&mut self, attribute: &str, value: &TfString) {
        if let Value::Value(value) = value {
            if uuid::Uuid::parse_str(value).is_err() {
                self.error(
                    attribute,
                    format!("invalid value for {attribute}"),
                    format!("{value:?} is not a UUID"),
                );
            }
        }
    }

    pub fn url(&mut self, attribute: &str, value: &TfString) {
        if let Value::Value(value) = value {
            match Url::parse(value) {
                Ok(url) if matches!(url.scheme(), "http" | "https") => {}
                Ok(url) => self.error(
                    attribute,
                    format!("invalid value for {attribute}"),
                    format!("unsupported scheme {:?} in {value:?}", url.scheme()),
                ),
                Err(err) => self.error(
                    attribute,
                    format!("invalid value for {attribute}"),
                    format!("{value:?}: {err}"),
                ),
            }
        }
    }

    pub fn at_least(&mut self, attribute: &str, value: &Value<i64>, min: i64) {
        if let Value::Value(value) = value {
            if *value < min {
                self.error(
                    attribute,
                    format!("invalid value for {attribute}"),
                    format!("expected at least {min}, got {value}"),
                );
            }
        }
    }

    /// Move every issue into the diagnostics. `None` when anything was reported.
    pub fn report(self, diags: &mut Diagnostics) -> Option<()> {
        let valid = self.issues.is_empty();
        for issue in self.issues {
            diags.error(issue.summary, issue.detail, attribute_path(&issue.path));
        }
        valid.then_some(())
    }
}

fn attribute_path(steps: &[PathStep]) -> AttributePath {
    let mut steps = steps.iter();
    let mut path = match steps.next() {
        Some(PathStep::Attribute(name)) => AttributePath::new(name.clone()),
        _ => return AttributePath::default(),
    };
    for step in steps {
        path = match step {
            PathStep::Attribute(name) => path.attribute(name.clone()),
            PathStep::Index(index) => path.index(*index),
        };
    }
    path
}
