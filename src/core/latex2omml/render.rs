//! Lowering of resolved math nodes into OMML primitives

use mdocx_ir::{MathPrimitive, MathRunStyle};

use super::parser::{MathNode, TextStyle};
use super::symbols::lookup_symbol;

impl From<TextStyle> for MathRunStyle {
    fn from(style: TextStyle) -> Self {
        match style {
            TextStyle::Plain => MathRunStyle::Plain,
            TextStyle::Italic => MathRunStyle::Italic,
        }
    }
}

/// Lower nodes to math primitives. Groups are spliced into the parent run
/// sequence.
pub fn render_to_docx_math(nodes: &[MathNode]) -> Vec<MathPrimitive> {
    let mut out = Vec::with_capacity(nodes.len());
    for node in nodes {
        render_node(node, &mut out);
    }
    out
}

/// Lowered operand list, never empty.
fn render_operand(nodes: &[MathNode]) -> Vec<MathPrimitive> {
    let mut out = render_to_docx_math(nodes);
    if out.is_empty() {
        out.push(MathPrimitive::blank());
    }
    out
}

fn render_node(node: &MathNode, out: &mut Vec<MathPrimitive>) {
    match node {
        MathNode::Text { val, style } => out.push(MathPrimitive::run(val.as_str(), (*style).into())),
        MathNode::Cmd { val } => {
            out.push(MathPrimitive::plain(lookup_symbol(val).unwrap_or(val.as_str())));
        }
        MathNode::Group { children } => out.extend(render_to_docx_math(children)),
        MathNode::Fraction { num, den } => out.push(MathPrimitive::Fraction {
            num: render_operand(num),
            den: render_operand(den),
        }),
        MathNode::Radical { deg, children } => out.push(MathPrimitive::Radical {
            degree: deg.as_deref().map(render_operand),
            body: render_operand(children),
        }),
        MathNode::Accent { accent, children } => out.push(MathPrimitive::Accent {
            chr: *accent,
            body: render_operand(children),
        }),
        MathNode::Limit { base, sub } => out.push(MathPrimitive::LimitLower {
            base: vec![MathPrimitive::plain(base.as_str())],
            lim: render_operand(sub),
        }),
        // The operand after the operator stays a sibling; the body is a
        // placeholder.
        MathNode::Sum { kind, sub, sup } => out.push(MathPrimitive::Nary {
            op: kind.symbol(),
            integral: kind.is_integral(),
            sub: sub.as_deref().map(render_operand),
            sup: sup.as_deref().map(render_operand),
            body: vec![MathPrimitive::blank()],
        }),
        MathNode::Script { base, sub, sup } => {
            let base = render_operand(base);
            match (sub, sup) {
                (None, None) => out.extend(base),
                (Some(sub), None) => out.push(MathPrimitive::Sub {
                    base,
                    sub: render_operand(sub),
                }),
                (None, Some(sup)) => out.push(MathPrimitive::Sup {
                    base,
                    sup: render_operand(sup),
                }),
                (Some(sub), Some(sup)) => out.push(MathPrimitive::SubSup {
                    base,
                    sub: render_operand(sub),
                    sup: render_operand(sup),
                }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::latex2omml::parser::{parse_latex_to_structure, NaryKind};
    use crate::core::latex2omml::tree::build_math_tree;
    use pretty_assertions::assert_eq;

    fn lower(latex: &str) -> Vec<MathPrimitive> {
        render_to_docx_math(&build_math_tree(parse_latex_to_structure(latex)))
    }

    #[test]
    fn test_empty_numerator_is_guarded() {
        assert_eq!(
            lower("\\frac{}{x}"),
            vec![MathPrimitive::Fraction {
                num: vec![MathPrimitive::blank()],
                den: vec![MathPrimitive::run("x", MathRunStyle::Italic)],
            }]
        );
    }

    #[test]
    fn test_sum_lowering() {
        let lowered = lower("\\sum_{i=1}^{n} a_i");
        match &lowered[0] {
            MathPrimitive::Nary {
                op,
                integral,
                sub,
                sup,
                body,
            } => {
                assert_eq!(*op, '∑');
                assert!(!integral);
                assert_eq!(sub.as_deref().map(mdocx_ir::math_text), Some("i=1".to_string()));
                assert_eq!(sup.as_deref().map(mdocx_ir::math_text), Some("n".to_string()));
                assert!(body[0].is_blank());
            }
            other => panic!("expected n-ary, got {:?}", other),
        }
        assert!(matches!(lowered.last(), Some(MathPrimitive::Sub { .. })));
    }

    #[test]
    fn test_integral_flag() {
        let nodes = vec![MathNode::Sum {
            kind: NaryKind::Integral,
            sub: None,
            sup: None,
        }];
        assert!(matches!(
            render_to_docx_math(&nodes)[0],
            MathPrimitive::Nary {
                integral: true,
                op: '∫',
                ..
            }
        ));
    }

    #[test]
    fn test_groups_are_transparent() {
        assert_eq!(
            lower("{a}{b}"),
            vec![
                MathPrimitive::run("a", MathRunStyle::Italic),
                MathPrimitive::run("b", MathRunStyle::Italic),
            ]
        );
    }

    #[test]
    fn test_unknown_command_renders_raw_name() {
        assert_eq!(lower("\\foo"), vec![MathPrimitive::plain("\\foo")]);
    }

    #[test]
    fn test_limit_and_accent() {
        assert_eq!(
            lower("\\lim_{n}\\hat{x}"),
            vec![
                MathPrimitive::LimitLower {
                    base: vec![MathPrimitive::plain("lim")],
                    lim: vec![MathPrimitive::run("n", MathRunStyle::Italic)],
                },
                MathPrimitive::Accent {
                    chr: '\u{0302}',
                    body: vec![MathPrimitive::run("x", MathRunStyle::Italic)],
                },
            ]
        );
    }

    #[test]
    fn test_empty_radical_degree() {
        assert_eq!(
            lower("\\sqrt[]{2}"),
            vec![MathPrimitive::Radical {
                degree: Some(vec![MathPrimitive::blank()]),
                body: vec![MathPrimitive::plain("2")],
            }]
        );
    }
}
