// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Visitor infrastructure for typed tree traversal.
//!
//! [`TreeVisitor`] has one `visit_*` / `leave_*` pair per payload type,
//! generated from the same payload list as [`Node`]. Kinds that share a
//! payload (binary operators, unary operators, comprehensions, annotations)
//! share a method; use `tree.kind(id)` to tell them apart.
//!
//! # Traversal Order
//!
//! - **Depth-first, pre-order** for `visit_*` methods
//! - **Post-order** for `leave_*` methods
//! - Children are visited in source order
//!
//! ```
//! use tuglint_python_cst::visitor::{TreeVisitor, VisitResult};
//! use tuglint_python_cst::{parse_module, Name, NodeId, ParseOptions, Tree};
//!
//! struct NameCounter {
//!     count: usize,
//! }
//!
//! impl TreeVisitor for NameCounter {
//!     fn visit_name(&mut self, _tree: &Tree, _id: NodeId, _node: &Name) -> VisitResult {
//!         self.count += 1;
//!         VisitResult::Continue
//!     }
//! }
//!
//! let tree = parse_module("a = b + c\n", ParseOptions::default()).unwrap();
//! let mut counter = NameCounter { count: 0 };
//! tree.walk(&mut counter);
//! assert_eq!(counter.count, 3);
//! ```

use crate::nodes::with_payloads;
use crate::nodes::*;

/// Result of visiting a node - controls traversal behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum VisitResult {
    /// Continue traversal into children.
    #[default]
    Continue,

    /// Skip children, continue with siblings. `leave_*` is still called.
    SkipChildren,

    /// Stop traversal entirely.
    Stop,
}

macro_rules! visitor_methods {
    ($($base_name:ident : $payload:ident),* $(,)?) => {
        /// Immutable visitor over a [`Tree`].
        ///
        /// Every method has a default that continues traversal, so
        /// implementors override only what they need.
        pub trait TreeVisitor {
            paste::paste! {
                $(
                    #[doc = concat!("Visit a [`", stringify!($payload), "`] node.")]
                    #[allow(unused_variables)]
                    fn [<visit_ $base_name>](&mut self, tree: &Tree, id: NodeId, node: &$payload) -> VisitResult {
                        VisitResult::Continue
                    }

                    #[doc = concat!("Leave a [`", stringify!($payload), "`] node.")]
                    #[allow(unused_variables)]
                    fn [<leave_ $base_name>](&mut self, tree: &Tree, id: NodeId, node: &$payload) {}
                )*
            }
        }

        /// Double dispatch from a node to its `visit_*` method.
        pub(crate) fn accept<V: TreeVisitor + ?Sized>(tree: &Tree, id: NodeId, visitor: &mut V) -> VisitResult {
            paste::paste! {
                match tree.node(id) {
                    $( Node::$payload(node) => visitor.[<visit_ $base_name>](tree, id, node), )*
                }
            }
        }

        fn leave<V: TreeVisitor + ?Sized>(tree: &Tree, id: NodeId, visitor: &mut V) {
            paste::paste! {
                match tree.node(id) {
                    $( Node::$payload(node) => visitor.[<leave_ $base_name>](tree, id, node), )*
                }
            }
        }
    };
}

with_payloads!(visitor_methods);

/// Walk the subtree at `id` in pre-order.
///
/// Returns [`VisitResult::Stop`] if the visitor stopped the walk.
pub fn walk<V: TreeVisitor + ?Sized>(tree: &Tree, id: NodeId, visitor: &mut V) -> VisitResult {
    match accept(tree, id, visitor) {
        VisitResult::Stop => return VisitResult::Stop,
        VisitResult::SkipChildren => {}
        VisitResult::Continue => {
            for child in tree.child_nodes(id) {
                if walk(tree, child, visitor) == VisitResult::Stop {
                    return VisitResult::Stop;
                }
            }
        }
    }
    leave(tree, id, visitor);
    VisitResult::Continue
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parse_module, Kind, ParseOptions};

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl TreeVisitor for Recorder {
        fn visit_func_def(&mut self, tree: &Tree, _id: NodeId, node: &FuncDef) -> VisitResult {
            self.events.push(format!("enter def {}", tree.text(node.name)));
            VisitResult::Continue
        }

        fn leave_func_def(&mut self, tree: &Tree, _id: NodeId, node: &FuncDef) {
            self.events.push(format!("leave def {}", tree.text(node.name)));
        }

        fn visit_class_def(&mut self, _tree: &Tree, _id: NodeId, _node: &ClassDef) -> VisitResult {
            self.events.push("class".to_string());
            VisitResult::SkipChildren
        }

        fn visit_binary_expr(&mut self, tree: &Tree, id: NodeId, _node: &BinaryExpr) -> VisitResult {
            self.events.push(format!("binary {}", tree.kind(id)));
            VisitResult::Continue
        }
    }

    #[test]
    fn test_walk_order_and_skip() {
        let source = "def f():\n    def g():\n        pass\nclass C:\n    def m(self): pass\nx = a + b\n";
        let tree = parse_module(source, ParseOptions::default()).unwrap();
        let mut recorder = Recorder::default();
        assert_eq!(tree.walk(&mut recorder), VisitResult::Continue);
        assert_eq!(
            recorder.events,
            vec![
                "enter def f",
                "enter def g",
                "leave def g",
                "leave def f",
                "class",
                "binary Plus",
            ]
        );
    }

    struct StopAtFirstName {
        seen: usize,
    }

    impl TreeVisitor for StopAtFirstName {
        fn visit_name(&mut self, _tree: &Tree, _id: NodeId, _node: &Name) -> VisitResult {
            self.seen += 1;
            VisitResult::Stop
        }
    }

    #[test]
    fn test_stop_halts_walk() {
        let tree = parse_module("a\nb\nc\n", ParseOptions::default()).unwrap();
        let mut visitor = StopAtFirstName { seen: 0 };
        assert_eq!(tree.walk(&mut visitor), VisitResult::Stop);
        assert_eq!(visitor.seen, 1);
    }

    #[test]
    fn test_accept_dispatches_on_payload() {
        let tree = parse_module("-x\n", ParseOptions::default()).unwrap();
        let unary = tree.ids().find(|&id| tree.is(id, Kind::UnaryMinus)).unwrap();

        struct Unary(bool);
        impl TreeVisitor for Unary {
            fn visit_unary_expr(&mut self, _tree: &Tree, _id: NodeId, _node: &UnaryExpr) -> VisitResult {
                self.0 = true;
                VisitResult::SkipChildren
            }
        }

        let mut visitor = Unary(false);
        assert_eq!(tree.accept(unary, &mut visitor), VisitResult::SkipChildren);
        assert!(visitor.0);
    }
}
