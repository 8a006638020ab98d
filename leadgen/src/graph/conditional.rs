//! Conditional edges.
//!
//! Agent nodes route on the `"continue"` / `"call_tool"` keys through a path map; the
//! tool-execution node has no path map and routes on `state.sender`, resolved again on
//! every visit.

use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::Arc;

/// Routing key (or node id) for the current state.
pub type ConditionalRouterFn<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Routing function plus optional path map; a key missing from the map is used as the
/// node id itself.
#[derive(Clone)]
pub struct ConditionalRouter<S> {
    pub(super) path: ConditionalRouterFn<S>,
    pub(super) path_map: Option<HashMap<String, String>>,
}

impl<S> ConditionalRouter<S>
where
    S: Clone + Send + Sync + Debug + 'static,
{
    pub fn new(path: ConditionalRouterFn<S>, path_map: Option<HashMap<String, String>>) -> Self {
        Self { path, path_map }
    }

    /// Resolves the next node id (or END) from the current state.
    pub fn resolve_next(&self, state: &S) -> String {
        let key = (self.path)(state);
        self.path_map
            .as_ref()
            .and_then(|m| m.get(&key))
            .cloned()
            .unwrap_or(key)
    }
}

/// Outgoing edge of one node.
#[derive(Clone)]
pub enum NextEntry<S> {
    Unconditional(String),
    /// Overrides the node's `Next`.
    Conditional(ConditionalRouter<S>),
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: A key present in the path map resolves to the mapped target.
    #[test]
    fn resolve_next_uses_path_map() {
        let router = ConditionalRouter::<i32>::new(
            Arc::new(|s| if *s > 0 { "pos".into() } else { "neg".into() }),
            Some([("pos".to_string(), "a".to_string())].into_iter().collect()),
        );
        assert_eq!(router.resolve_next(&1), "a");
    }

    /// **Scenario**: A key missing from the path map is used as the node id.
    #[test]
    fn resolve_next_falls_back_to_key() {
        let router = ConditionalRouter::<i32>::new(
            Arc::new(|_| "b".into()),
            Some(HashMap::new()),
        );
        assert_eq!(router.resolve_next(&0), "b");
    }
}
