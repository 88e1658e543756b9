use thiserror::Error;

use crate::config::ConfigError;
use crate::hierarchy::HierarchyError;
use crate::outline::OutlineError;

/// Any failure of the render pipeline. Every one of them is fatal.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Outline(#[from] OutlineError),

    #[error(transparent)]
    Hierarchy(#[from] HierarchyError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
