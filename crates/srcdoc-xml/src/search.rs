//! Position lookup over decoded trees
//!
//! Editors ask "what is under the cursor"; the answer is the innermost
//! decoded node or attribute whose range contains the position, as a
//! [`Tip`] carrying the node's usage key. The per-node descent is
//! generated by [`xml_node!`](crate::xml_node); containers get blanket
//! impls here.

use serde::Serialize;
use srcdoc_core::{Position, Range};

use crate::decode::{AttrBase, NodeBase};

/// What a position lookup returns
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Tip {
    /// The range of the innermost node found
    pub range: Range,

    /// The node's usage localization key
    pub usage: &'static str,
}

/// Descend into a value looking for the innermost tip at `pos`
pub trait Search {
    /// The innermost tip containing `pos`, if any
    fn search_tip(&self, pos: Position) -> Option<Tip>;
}

impl<T: Search> Search for Option<T> {
    fn search_tip(&self, pos: Position) -> Option<Tip> {
        self.as_ref().and_then(|v| v.search_tip(pos))
    }
}

impl<T: Search> Search for Vec<T> {
    fn search_tip(&self, pos: Position) -> Option<Tip> {
        self.iter().find_map(|v| v.search_tip(pos))
    }
}

impl NodeBase {
    /// The tip for this node itself
    pub fn tip(&self) -> Option<Tip> {
        if self.usage_key.is_empty() {
            return None;
        }
        Some(Tip {
            range: self.range,
            usage: self.usage_key,
        })
    }
}

impl AttrBase {
    /// The tip for this attribute, when it contains `pos`
    pub fn tip_at(&self, pos: Position) -> Option<Tip> {
        if self.usage_key.is_empty() || !self.range.contains(pos) {
            return None;
        }
        Some(Tip {
            range: self.range,
            usage: self.usage_key,
        })
    }
}
