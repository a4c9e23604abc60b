use thiserror::Error;

/// Failure of a single call into the live runtime.
///
/// Runtime implementations return `Err` where the underlying runtime throws and
/// `Ok(None)` where it returns nothing; capabilities a runtime lacks report
/// [`AccessError::Unsupported`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AccessError {
    #[error("runtime does not provide `{capability}`")]
    Unsupported { capability: &'static str },
    #[error("`{capability}(\"{name}\")` failed: {message}")]
    Failed {
        capability: &'static str,
        name: String,
        message: String,
    },
    #[error("expected a {expected} value, found {found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },
}

impl AccessError {
    pub fn unsupported(capability: &'static str) -> Self {
        AccessError::Unsupported { capability }
    }

    pub fn failed(
        capability: &'static str,
        name: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        AccessError::Failed {
            capability,
            name: name.into(),
            message: message.into(),
        }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, AccessError::Unsupported { .. })
    }
}

/// Errors produced while reading a static document descriptor.
#[derive(Debug, Error)]
pub enum DescriptorError {
    #[error("descriptor json parse error: {0}")]
    Parse(#[from] serde_json::Error),
}
