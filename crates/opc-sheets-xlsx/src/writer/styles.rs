//! Style part generation
//!
//! Every table of the style cache maps one-to-one onto a section of
//! `styles.xml`, in id order, so the ids cells were written with stay
//! valid.

use std::fmt::Write as _;

use opc_sheets_core::{
    Alignment, BorderEdge, BorderStyle, Color, FillStyle, FontStyle, Protection, Style, StyleCache,
};

use super::xml::escape;

const STYLESHEET_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

/// Render the style part for everything interned so far
pub(crate) fn styles_xml(cache: &StyleCache) -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\" standalone=\"yes\"?>\n");
    let _ = write!(xml, "<styleSheet xmlns=\"{}\">", STYLESHEET_NS);

    let numfmts = cache.custom_number_formats();
    if !numfmts.is_empty() {
        let _ = write!(xml, "<numFmts count=\"{}\">", numfmts.len());
        for (id, code) in &numfmts {
            let _ = write!(
                xml,
                "<numFmt numFmtId=\"{}\" formatCode=\"{}\"/>",
                id,
                escape(code)
            );
        }
        xml.push_str("</numFmts>");
    }

    let fonts = cache.fonts();
    let _ = write!(xml, "<fonts count=\"{}\">", fonts.len());
    for font in &fonts {
        write_font(&mut xml, font);
    }
    xml.push_str("</fonts>");

    let fills = cache.fills();
    let _ = write!(xml, "<fills count=\"{}\">", fills.len());
    for fill in &fills {
        write_fill(&mut xml, fill);
    }
    xml.push_str("</fills>");

    let borders = cache.borders();
    let _ = write!(xml, "<borders count=\"{}\">", borders.len());
    for border in &borders {
        write_border(&mut xml, border);
    }
    xml.push_str("</borders>");

    xml.push_str(
        "<cellStyleXfs count=\"1\"><xf numFmtId=\"0\" fontId=\"0\" fillId=\"0\" borderId=\"0\"/></cellStyleXfs>",
    );

    let styles = cache.styles();
    let _ = write!(xml, "<cellXfs count=\"{}\">", styles.len());
    for style in &styles {
        write_xf(&mut xml, style);
    }
    xml.push_str("</cellXfs>");

    xml.push_str(
        "<cellStyles count=\"1\"><cellStyle name=\"Normal\" xfId=\"0\" builtinId=\"0\"/></cellStyles>",
    );
    xml.push_str("<dxfs count=\"0\"/><tableStyles count=\"0\"/>");
    xml.push_str("</styleSheet>");
    xml
}

fn write_color(xml: &mut String, tag: &str, color: &Color) {
    match color {
        Color::Auto => {
            let _ = write!(xml, "<{} auto=\"1\"/>", tag);
        }
        Color::Argb { a, r, g, b } => {
            let _ = write!(xml, "<{} rgb=\"{:02X}{:02X}{:02X}{:02X}\"/>", tag, a, r, g, b);
        }
        Color::Indexed(i) => {
            let _ = write!(xml, "<{} indexed=\"{}\"/>", tag, i);
        }
        Color::Theme { index, tint } => {
            if *tint == 0 {
                let _ = write!(xml, "<{} theme=\"{}\"/>", tag, index);
            } else {
                let _ = write!(
                    xml,
                    "<{} theme=\"{}\" tint=\"{}\"/>",
                    tag,
                    index,
                    f64::from(*tint) / 100.0
                );
            }
        }
    }
}

fn write_font(xml: &mut String, font: &FontStyle) {
    xml.push_str("<font>");
    if font.bold {
        xml.push_str("<b/>");
    }
    if font.italic {
        xml.push_str("<i/>");
    }
    if font.strikethrough {
        xml.push_str("<strike/>");
    }
    match font.underline.as_xml() {
        Some("single") => xml.push_str("<u/>"),
        Some(val) => {
            let _ = write!(xml, "<u val=\"{}\"/>", val);
        }
        None => {}
    }
    let _ = write!(xml, "<sz val=\"{}\"/>", font.size);
    if !font.color.is_auto() {
        write_color(xml, "color", &font.color);
    }
    let _ = write!(xml, "<name val=\"{}\"/>", escape(&font.name));
    xml.push_str("<family val=\"2\"/></font>");
}

fn write_fill(xml: &mut String, fill: &FillStyle) {
    match fill {
        FillStyle::None => xml.push_str("<fill><patternFill patternType=\"none\"/></fill>"),
        FillStyle::Gray125 => xml.push_str("<fill><patternFill patternType=\"gray125\"/></fill>"),
        FillStyle::Solid { color } => {
            xml.push_str("<fill><patternFill patternType=\"solid\">");
            write_color(xml, "fgColor", color);
            xml.push_str("<bgColor indexed=\"64\"/></patternFill></fill>");
        }
        FillStyle::Pattern {
            pattern,
            foreground,
            background,
        } => {
            let _ = write!(xml, "<fill><patternFill patternType=\"{}\">", pattern.as_xml());
            write_color(xml, "fgColor", foreground);
            write_color(xml, "bgColor", background);
            xml.push_str("</patternFill></fill>");
        }
    }
}

fn write_border_edge(xml: &mut String, tag: &str, edge: &Option<BorderEdge>) {
    match edge {
        Some(edge) if edge.style != Default::default() => {
            let _ = write!(xml, "<{} style=\"{}\">", tag, edge.style.as_xml());
            write_color(xml, "color", &edge.color);
            let _ = write!(xml, "</{}>", tag);
        }
        _ => {
            let _ = write!(xml, "<{}/>", tag);
        }
    }
}

fn write_border(xml: &mut String, border: &BorderStyle) {
    xml.push_str("<border>");
    write_border_edge(xml, "left", &border.left);
    write_border_edge(xml, "right", &border.right);
    write_border_edge(xml, "top", &border.top);
    write_border_edge(xml, "bottom", &border.bottom);
    xml.push_str("<diagonal/></border>");
}

fn write_alignment(xml: &mut String, al: &Alignment) {
    xml.push_str("<alignment");
    if let Some(h) = al.horizontal.as_xml() {
        let _ = write!(xml, " horizontal=\"{}\"", h);
    }
    if let Some(v) = al.vertical.as_xml() {
        let _ = write!(xml, " vertical=\"{}\"", v);
    }
    if al.wrap_text {
        xml.push_str(" wrapText=\"1\"");
    }
    if al.shrink_to_fit {
        xml.push_str(" shrinkToFit=\"1\"");
    }
    if al.indent != 0 {
        let _ = write!(xml, " indent=\"{}\"", al.indent);
    }
    if al.rotation != 0 {
        // Negative angles are stored as 90 + |angle|
        let rotation = if al.rotation < 0 {
            90 - al.rotation
        } else {
            al.rotation
        };
        let _ = write!(xml, " textRotation=\"{}\"", rotation);
    }
    xml.push_str("/>");
}

fn write_protection(xml: &mut String, p: &Protection) {
    xml.push_str("<protection");
    let _ = write!(xml, " locked=\"{}\"", u8::from(p.locked));
    if p.hidden {
        xml.push_str(" hidden=\"1\"");
    }
    xml.push_str("/>");
}

fn write_xf(xml: &mut String, style: &Style) {
    let _ = write!(
        xml,
        "<xf numFmtId=\"{}\" fontId=\"{}\" fillId=\"{}\" borderId=\"{}\" xfId=\"0\"",
        style.number_format_id, style.font_id, style.fill_id, style.border_id
    );
    if style.number_format_id != 0 {
        xml.push_str(" applyNumberFormat=\"1\"");
    }
    if style.font_id != 0 {
        xml.push_str(" applyFont=\"1\"");
    }
    if style.fill_id != 0 {
        xml.push_str(" applyFill=\"1\"");
    }
    if style.border_id != 0 {
        xml.push_str(" applyBorder=\"1\"");
    }
    let alignment = style.alignment.as_ref().filter(|a| **a != Alignment::default());
    let protection = style.protection.as_ref().filter(|p| **p != Protection::default());
    if alignment.is_some() {
        xml.push_str(" applyAlignment=\"1\"");
    }
    if protection.is_some() {
        xml.push_str(" applyProtection=\"1\"");
    }

    if alignment.is_none() && protection.is_none() {
        xml.push_str("/>");
        return;
    }
    xml.push('>');
    if let Some(al) = alignment {
        write_alignment(xml, al);
    }
    if let Some(p) = protection {
        write_protection(xml, p);
    }
    xml.push_str("</xf>");
}
