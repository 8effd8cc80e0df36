//! Script resolution
//!
//! Attaches `^`/`_` marker nodes and their operands to the node before
//! them, and resolves `\lim_{...}`. Runs in one forward pass and recurses
//! into every node that owns children.

use std::collections::VecDeque;

use super::parser::{MathNode, TextStyle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScriptKind {
    Sub,
    Sup,
}

impl ScriptKind {
    fn opposite(self) -> Self {
        match self {
            ScriptKind::Sub => ScriptKind::Sup,
            ScriptKind::Sup => ScriptKind::Sub,
        }
    }
}

fn marker_kind(node: &MathNode) -> Option<ScriptKind> {
    match node {
        MathNode::Text {
            val,
            style: TextStyle::Plain,
        } => match val.as_str() {
            "_" => Some(ScriptKind::Sub),
            "^" => Some(ScriptKind::Sup),
            _ => None,
        },
        _ => None,
    }
}

/// Resolve script markers into nested nodes.
pub fn build_math_tree(nodes: Vec<MathNode>) -> Vec<MathNode> {
    let mut queue: VecDeque<MathNode> = nodes.into();
    let mut out = Vec::with_capacity(queue.len());

    while let Some(node) = queue.pop_front() {
        let mut node = resolve_children(node);

        if let MathNode::Limit { base, .. } = node {
            match take_script(&mut queue, Some(ScriptKind::Sub)) {
                Some((_, sub)) => {
                    out.push(MathNode::Limit { base, sub });
                    continue;
                }
                None => node = MathNode::plain(base),
            }
        }

        let Some((kind, first)) = take_script(&mut queue, None) else {
            out.push(node);
            continue;
        };
        let second = take_script(&mut queue, Some(kind.opposite())).map(|(_, ops)| ops);
        let (sub, sup) = match kind {
            ScriptKind::Sub => (Some(first), second),
            ScriptKind::Sup => (second, Some(first)),
        };

        out.push(match node {
            MathNode::Sum {
                kind,
                sub: prev_sub,
                sup: prev_sup,
            } => MathNode::Sum {
                kind,
                sub: sub.or(prev_sub),
                sup: sup.or(prev_sup),
            },
            other => MathNode::Script {
                base: vec![other],
                sub,
                sup,
            },
        });
    }
    out
}

/// Pop a marker and its operand when the queue starts with one, optionally
/// of a required kind. A marker without an operand is left in place.
fn take_script(
    queue: &mut VecDeque<MathNode>,
    wanted: Option<ScriptKind>,
) -> Option<(ScriptKind, Vec<MathNode>)> {
    let kind = marker_kind(queue.front()?)?;
    if wanted.is_some_and(|w| w != kind) {
        return None;
    }
    if queue.get(1).map_or(true, |op| marker_kind(op).is_some()) {
        return None;
    }
    queue.pop_front();
    let operand = queue.pop_front()?;
    Some((kind, into_operand(resolve_children(operand))))
}

/// Groups contribute their (already resolved) children; anything else
/// is a single-element operand.
fn into_operand(node: MathNode) -> Vec<MathNode> {
    match node {
        MathNode::Group { children } => children,
        other => vec![other],
    }
}

fn resolve_children(node: MathNode) -> MathNode {
    match node {
        MathNode::Group { children } => MathNode::Group {
            children: build_math_tree(children),
        },
        MathNode::Fraction { num, den } => MathNode::Fraction {
            num: build_math_tree(num),
            den: build_math_tree(den),
        },
        MathNode::Radical { deg, children } => MathNode::Radical {
            deg: deg.map(build_math_tree),
            children: build_math_tree(children),
        },
        MathNode::Accent { accent, children } => MathNode::Accent {
            accent,
            children: build_math_tree(children),
        },
        other => other,
    }
}
