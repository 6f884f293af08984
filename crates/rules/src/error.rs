use thiserror::Error;

/// Failure modes of the engine entry points.
///
/// Caller bugs that the original design treated as fatal (`init` called
/// twice, any operation before `init`) still panic; these variants cover
/// the conditions that must stay observable in release builds.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    #[error("input set must be frozen before computing results")]
    InputNotFrozen,
    #[error("result set is incomplete and cannot be processed")]
    IncompleteResults,
}

/// Rejections raised while building an input set.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("input set is frozen; no further mutation is allowed")]
    Frozen,
    #[error("resource has an empty request URL")]
    EmptyUrl,
    #[error("resource has invalid response status code {0}")]
    InvalidStatus(i32),
    #[error("a resource with URL {0} already exists")]
    DuplicateUrl(String),
}
