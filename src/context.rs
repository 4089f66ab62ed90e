//! Per-test documentation context and operation identifier placeholders.
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::errors::ContextError;

/// The test currently being documented.
///
/// The step counter is incremented once per documented operation, so an
/// identifier such as `{method-name}-{step}` stays unique within one test.
/// A context is shared by reference with the operations it documents.
/// Where snippets end up is decided by
/// [`DocumentationConfig`](crate::config::DocumentationConfig).
#[derive(Debug)]
pub struct DocumentationContext {
    test_class: String,
    test_method: String,
    step: AtomicUsize,
}

impl DocumentationContext {
    pub fn new(test_class: impl Into<String>, test_method: impl Into<String>) -> Self {
        Self {
            test_class: test_class.into(),
            test_method: test_method.into(),
            step: AtomicUsize::new(0),
        }
    }

    pub fn test_class(&self) -> &str {
        &self.test_class
    }

    pub fn test_method(&self) -> &str {
        &self.test_method
    }

    /// Number of operations documented so far.
    pub fn step(&self) -> usize {
        self.step.load(Ordering::SeqCst)
    }

    /// Marks the start of a new operation and returns its step, starting at 1.
    pub fn before_operation(&self) -> usize {
        self.step.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Replaces the placeholders in an operation identifier.
    ///
    /// | placeholder | `get_user_by_id` / `UserApiTests` |
    /// |---|---|
    /// | `{methodName}` | `get_user_by_id` (as given) |
    /// | `{method-name}` | `get-user-by-id` |
    /// | `{method_name}` | `get_user_by_id` |
    /// | `{MethodName}` | `GetUserById` |
    /// | `{ClassName}` | `UserApiTests` (as given) |
    /// | `{class-name}` | `user-api-tests` |
    /// | `{class_name}` | `user_api_tests` |
    /// | `{step}` | current step |
    ///
    /// Unknown placeholders are left as they are.
    pub fn resolve(&self, identifier: &str) -> String {
        let mut resolved = String::with_capacity(identifier.len());
        let mut rest = identifier;
        while let Some(start) = rest.find('{') {
            resolved.push_str(&rest[..start]);
            let candidate = &rest[start..];
            let Some(end) = candidate.find('}') else {
                rest = candidate;
                break;
            };
            let name = &candidate[1..end];
            match self.placeholder(name) {
                Some(value) => resolved.push_str(&value),
                None => resolved.push_str(&candidate[..=end]),
            }
            rest = &candidate[end + 1..];
        }
        resolved.push_str(rest);
        resolved
    }

    fn placeholder(&self, name: &str) -> Option<String> {
        let value = match name {
            "step" => self.step().to_string(),
            "methodName" => self.test_method.clone(),
            "method-name" => separated(&self.test_method, '-'),
            "method_name" => separated(&self.test_method, '_'),
            "MethodName" => pascal_case(&self.test_method),
            "ClassName" => self.test_class.clone(),
            "class-name" => separated(&self.test_class, '-'),
            "class_name" => separated(&self.test_class, '_'),
            _ => return None,
        };
        Some(value)
    }
}

/// Splits camel case, snake case and kebab case names into lowercase words.
fn words(name: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    for c in name.chars() {
        if c == '_' || c == '-' || c.is_whitespace() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
        } else if c.is_uppercase() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            current.extend(c.to_lowercase());
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

fn separated(name: &str, separator: char) -> String {
    words(name).join(&separator.to_string())
}

fn pascal_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect()
}

/// Context management for tests that drive documentation by hand.
///
/// ```rust
/// use restdocs::context::ManualDocumentation;
/// # fn main() -> Result<(), restdocs::errors::ContextError> {
/// let mut docs = ManualDocumentation::new();
/// docs.before_test("UserApiTests", "get_user")?;
/// let context = docs.before_operation()?;
/// assert_eq!(context.resolve("{method-name}-{step}"), "get-user-1");
/// docs.after_test();
/// # Ok(()) }
/// ```
#[derive(Debug, Default)]
pub struct ManualDocumentation {
    context: Option<Arc<DocumentationContext>>,
}

impl ManualDocumentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn before_test(&mut self, test_class: &str, test_method: &str) -> Result<(), ContextError> {
        if self.context.is_some() {
            return Err(ContextError::AlreadyStarted);
        }
        log::debug!("documenting {test_class}::{test_method}");
        self.context = Some(Arc::new(DocumentationContext::new(test_class, test_method)));
        Ok(())
    }

    pub fn after_test(&mut self) {
        self.context = None;
    }

    /// Advances the step of the current test and returns its context.
    pub fn before_operation(&self) -> Result<Arc<DocumentationContext>, ContextError> {
        let context = self.context.as_ref().ok_or(ContextError::NoTestInProgress)?;
        context.before_operation();
        Ok(Arc::clone(context))
    }
}
