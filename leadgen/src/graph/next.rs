/// What a node asks for after it ran.
///
/// Pipeline nodes always return `Continue` and leave the choice to their conditional
/// edges, which override whatever the node returns. `Node` and `End` only matter for
/// nodes wired with plain edges.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Next {
    /// Follow the outgoing edge; END when there is none.
    Continue,
    Node(String),
    End,
}
