//! OMML (Office Math Markup Language) serialization.

use mdocx_ir::{MathPrimitive, MathRunStyle};

use crate::text::escape_text;

const MATH_FONT: &str = "Cambria Math";

/// Render a primitive list wrapped in `<m:oMath>`.
pub fn render_omath(primitives: &[MathPrimitive]) -> String {
    let mut out = String::from("<m:oMath>");
    write_list(&mut out, primitives);
    out.push_str("</m:oMath>");
    out
}

/// Render a display equation as `<m:oMathPara>`.
pub fn render_omath_para(primitives: &[MathPrimitive]) -> String {
    let mut out = String::from("<m:oMathPara>");
    out.push_str(&render_omath(primitives));
    out.push_str("</m:oMathPara>");
    out
}

/// Render the primitives without any wrapper element.
pub fn render_math(primitives: &[MathPrimitive]) -> String {
    let mut out = String::new();
    write_list(&mut out, primitives);
    out
}

// Word refuses documents containing operand slots without content.
fn write_list(out: &mut String, primitives: &[MathPrimitive]) {
    if primitives.is_empty() {
        write_run(out, "", MathRunStyle::Plain);
        return;
    }
    for p in primitives {
        write_primitive(out, p);
    }
}

fn write_slot(out: &mut String, tag: &str, primitives: &[MathPrimitive]) {
    out.push('<');
    out.push_str(tag);
    out.push('>');
    write_list(out, primitives);
    out.push_str("</");
    out.push_str(tag);
    out.push('>');
}

fn write_run(out: &mut String, text: &str, style: MathRunStyle) {
    out.push_str("<m:r>");
    if style == MathRunStyle::Plain {
        out.push_str(r#"<m:rPr><m:sty m:val="p"/></m:rPr>"#);
    }
    out.push_str(r#"<w:rPr><w:rFonts w:ascii=""#);
    out.push_str(MATH_FONT);
    out.push_str(r#"" w:hAnsi=""#);
    out.push_str(MATH_FONT);
    out.push_str(r#""/></w:rPr><m:t xml:space="preserve">"#);
    out.push_str(&escape_text(text));
    out.push_str("</m:t></m:r>");
}

fn write_primitive(out: &mut String, primitive: &MathPrimitive) {
    match primitive {
        MathPrimitive::Run { text, style } => write_run(out, text, *style),
        MathPrimitive::Fraction { num, den } => {
            out.push_str("<m:f>");
            write_slot(out, "m:num", num);
            write_slot(out, "m:den", den);
            out.push_str("</m:f>");
        }
        MathPrimitive::Radical { degree, body } => {
            out.push_str("<m:rad>");
            match degree {
                Some(deg) => write_slot(out, "m:deg", deg),
                None => out.push_str(r#"<m:radPr><m:degHide m:val="1"/></m:radPr><m:deg/>"#),
            }
            write_slot(out, "m:e", body);
            out.push_str("</m:rad>");
        }
        MathPrimitive::Sub { base, sub } => {
            out.push_str("<m:sSub>");
            write_slot(out, "m:e", base);
            write_slot(out, "m:sub", sub);
            out.push_str("</m:sSub>");
        }
        MathPrimitive::Sup { base, sup } => {
            out.push_str("<m:sSup>");
            write_slot(out, "m:e", base);
            write_slot(out, "m:sup", sup);
            out.push_str("</m:sSup>");
        }
        MathPrimitive::SubSup { base, sub, sup } => {
            out.push_str("<m:sSubSup>");
            write_slot(out, "m:e", base);
            write_slot(out, "m:sub", sub);
            write_slot(out, "m:sup", sup);
            out.push_str("</m:sSubSup>");
        }
        MathPrimitive::Nary {
            op,
            integral,
            sub,
            sup,
            body,
        } => {
            out.push_str("<m:nary><m:naryPr><m:chr m:val=\"");
            out.push(*op);
            out.push_str("\"/><m:limLoc m:val=\"");
            out.push_str(if *integral { "subSup" } else { "undOvr" });
            out.push_str("\"/>");
            if sub.is_none() {
                out.push_str(r#"<m:subHide m:val="1"/>"#);
            }
            if sup.is_none() {
                out.push_str(r#"<m:supHide m:val="1"/>"#);
            }
            out.push_str("</m:naryPr>");
            match sub {
                Some(sub) => write_slot(out, "m:sub", sub),
                None => out.push_str("<m:sub/>"),
            }
            match sup {
                Some(sup) => write_slot(out, "m:sup", sup),
                None => out.push_str("<m:sup/>"),
            }
            write_slot(out, "m:e", body);
            out.push_str("</m:nary>");
        }
        MathPrimitive::LimitLower { base, lim } => {
            out.push_str("<m:limLow>");
            write_slot(out, "m:e", base);
            write_slot(out, "m:lim", lim);
            out.push_str("</m:limLow>");
        }
        MathPrimitive::Accent { chr, body } => {
            out.push_str("<m:acc><m:accPr><m:chr m:val=\"");
            out.push(*chr);
            out.push_str("\"/></m:accPr>");
            write_slot(out, "m:e", body);
            out.push_str("</m:acc>");
        }
    }
}
