use core_types::NodeKey;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomError {
    #[error("node {0:?} does not exist")]
    MissingNode(NodeKey),
    #[error("node {0:?} has the wrong kind for this operation")]
    WrongNodeKind(NodeKey),
    #[error("node {0:?} cannot have children")]
    InvalidParent(NodeKey),
    #[error("node {0:?} cannot be inserted as a child")]
    InvalidChild(NodeKey),
    #[error("node {before:?} is not a child of {parent:?}")]
    InvalidSibling { parent: NodeKey, before: NodeKey },
    #[error("inserting {child:?} under {parent:?} would create a cycle")]
    CycleDetected { parent: NodeKey, child: NodeKey },
    #[error("element {0:?} already hosts a shadow root")]
    ShadowRootExists(NodeKey),
    #[error("element {0:?} cannot host a shadow root")]
    UnsupportedShadowHost(NodeKey),
    #[error("node {0:?} is still attached to a parent")]
    StillAttached(NodeKey),
}

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("snapshot does not form a valid tree: {0}")]
    Dom(#[from] DomError),
}
