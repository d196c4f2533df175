pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Tree(#[from] TreeError),

    #[error("node collection JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config value at `{path}`: {message}")]
    InvalidConfig { path: String, message: String },
}

/// Structural violations found while building a node collection from external data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    #[error("mind map has no root node")]
    NoRoot,

    #[error("mind map has more than one root (\"{first}\" and \"{second}\")")]
    MultipleRoots { first: String, second: String },

    #[error("duplicate node id \"{0}\"")]
    DuplicateId(String),

    #[error("node \"{parent}\" lists unknown child \"{child}\"")]
    DanglingChild { parent: String, child: String },

    #[error("node \"{parent}\" lists child \"{child}\" more than once")]
    DuplicateChild { parent: String, child: String },

    #[error("node \"{child}\" is listed under \"{listed_under}\" but its parent is {parent:?}")]
    ParentMismatch {
        child: String,
        listed_under: String,
        parent: Option<String>,
    },

    #[error("node \"{node}\" is not listed in the children of its parent \"{parent}\"")]
    NotListedByParent { node: String, parent: String },

    #[error("node \"{0}\" is not reachable from the root")]
    Unreachable(String),

    #[error("node \"{node}\" has progress {progress}, expected 0..=100")]
    ProgressOutOfRange { node: String, progress: u8 },
}

/// Rejected edit operations. These never mutate state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("the root node \"{0}\" cannot be deleted")]
    RootProtected(String),

    #[error("unknown node \"{0}\"")]
    UnknownNode(String),

    #[error("node id \"{0}\" is already in use")]
    DuplicateId(String),
}
