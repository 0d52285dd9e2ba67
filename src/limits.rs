//! Limits and constraints for schema processing
//!
//! The resolution passes walk reference chains that a hostile or broken
//! schema can make cyclic or arbitrarily deep. Every such walk is bounded by
//! one of these limits.

use crate::error::{Error, Result};

/// Global limits configuration
#[derive(Debug, Clone)]
pub struct Limits {
    /// Maximum number of links followed in a simple-type restriction chain
    pub max_restriction_chain: usize,

    /// Maximum depth of a base-type inheritance chain
    pub max_inheritance_depth: usize,

    /// Maximum nesting of group references during expansion
    pub max_group_depth: usize,

    /// Maximum schema file size in bytes
    pub max_schema_size: usize,

    /// Maximum number of files pulled in through `xs:include`
    pub max_includes: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_restriction_chain: 100,
            max_inheritance_depth: 100,
            max_group_depth: 64,
            max_schema_size: 100 * 1024 * 1024, // 100 MB
            max_includes: 1000,
        }
    }
}

impl Limits {
    /// Create a new Limits with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Create strict limits (more restrictive)
    pub fn strict() -> Self {
        Self {
            max_restriction_chain: 20,
            max_inheritance_depth: 20,
            max_group_depth: 16,
            max_schema_size: 10 * 1024 * 1024, // 10 MB
            max_includes: 100,
        }
    }

    /// Set the restriction chain budget
    pub fn with_max_restriction_chain(mut self, max: usize) -> Self {
        self.max_restriction_chain = max;
        self
    }

    /// Set the inheritance depth ceiling
    pub fn with_max_inheritance_depth(mut self, max: usize) -> Self {
        self.max_inheritance_depth = max;
        self
    }

    /// Check if an inheritance chain is within limits
    pub fn check_inheritance_depth(&self, depth: usize, component: &str) -> Result<()> {
        if depth > self.max_inheritance_depth {
            Err(Error::InheritanceDepth {
                component: component.to_string(),
                limit: self.max_inheritance_depth,
            })
        } else {
            Ok(())
        }
    }

    /// Check if schema size is within limits
    pub fn check_schema_size(&self, size: usize) -> Result<()> {
        if size > self.max_schema_size {
            Err(Error::LimitExceeded(format!(
                "schema size {} bytes exceeds maximum {} bytes",
                size, self.max_schema_size
            )))
        } else {
            Ok(())
        }
    }

    /// Check if the number of included files is within limits
    pub fn check_includes(&self, count: usize) -> Result<()> {
        if count > self.max_includes {
            Err(Error::LimitExceeded(format!(
                "include count {} exceeds maximum {}",
                count, self.max_includes
            )))
        } else {
            Ok(())
        }
    }
}
