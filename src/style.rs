//! Style resolver – the literal override table behind the export pipeline's
//! central invariant: every utility class reachable by either template maps
//! to explicit computed values (color, spacing, column widths, font sizing,
//! wrapping). A class with no entry here silently reverts to defaults in the
//! captured bitmap, which is exactly the fidelity defect the override-
//! coverage test guards against.

use crate::dom::{DomNode, ElementNode, Tag};

/// Fully resolved style for a single element.
#[derive(Debug, Clone, PartialEq)]
pub struct ComputedStyle {
    // Layout
    pub display: Display,
    pub flex_direction: FlexDirection,
    pub justify_content: JustifyContent,
    pub gap: f32,
    pub width: Dimension,

    // Spacing (px)
    pub margin_top: f32,
    pub margin_right: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub padding_top: f32,
    pub padding_right: f32,
    pub padding_bottom: f32,
    pub padding_left: f32,

    // Rules
    pub border_bottom: f32,
    pub border_color: Color,

    // Typography
    pub font_size: f32,
    pub font_weight: FontWeight,
    pub font_style: FontStyle,
    pub text_decoration: TextDecoration,
    pub text_transform: TextTransform,
    pub text_align: TextAlign,
    pub line_height: f32,
    pub color: Color,

    // Background
    pub background_color: Color,
}

impl Default for ComputedStyle {
    fn default() -> Self {
        Self {
            display: Display::Block,
            flex_direction: FlexDirection::Row,
            justify_content: JustifyContent::Start,
            gap: 0.0,
            width: Dimension::Auto,
            margin_top: 0.0,
            margin_right: 0.0,
            margin_bottom: 0.0,
            margin_left: 0.0,
            padding_top: 0.0,
            padding_right: 0.0,
            padding_bottom: 0.0,
            padding_left: 0.0,
            border_bottom: 0.0,
            border_color: Color::GRAY_300,
            font_size: 14.0,
            font_weight: FontWeight::Normal,
            font_style: FontStyle::Normal,
            text_decoration: TextDecoration::None,
            text_transform: TextTransform::None,
            text_align: TextAlign::Left,
            line_height: 1.4,
            color: Color::GRAY_900,
            background_color: Color::TRANSPARENT,
        }
    }
}

// ---------------------------------------------------------------------------
// Supporting enums
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Display {
    Block,
    Flex,
    Inline,
    ListItem,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlexDirection {
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JustifyContent {
    Start,
    Center,
    SpaceBetween,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontWeight {
    Normal,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FontStyle {
    Normal,
    Italic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextDecoration {
    None,
    Underline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextTransform {
    None,
    Uppercase,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dimension {
    Auto,
    Px(f32),
    Percent(f32),
}

/// RGBA colour (0.0 – 1.0).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Self = Self::opaque(0.0, 0.0, 0.0);
    pub const WHITE: Self = Self::opaque(1.0, 1.0, 1.0);
    pub const TRANSPARENT: Self = Self {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };
    pub const GRAY_300: Self = Self::opaque(0.831, 0.843, 0.871);
    pub const GRAY_600: Self = Self::opaque(0.294, 0.333, 0.388);
    pub const GRAY_900: Self = Self::opaque(0.067, 0.094, 0.153);

    const fn opaque(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn is_transparent(&self) -> bool {
        self.a < 0.001
    }

    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.trim_start_matches('#');
        if hex.len() != 6 {
            return None;
        }
        let r = u8::from_str_radix(&hex[0..2], 16).ok()? as f32 / 255.0;
        let g = u8::from_str_radix(&hex[2..4], 16).ok()? as f32 / 255.0;
        let b = u8::from_str_radix(&hex[4..6], 16).ok()? as f32 / 255.0;
        Some(Self { r, g, b, a: 1.0 })
    }
}

// ---------------------------------------------------------------------------
// Style resolution
// ---------------------------------------------------------------------------

/// Resolve the style for an element, inheriting text properties from its
/// parent. Unrecognized classes are skipped here; the export pipeline's
/// normalization stage reports them.
pub fn resolve_style(element: &ElementNode, parent: Option<&ComputedStyle>) -> ComputedStyle {
    let mut style = base_style_for_tag(&element.tag);

    if let Some(p) = parent {
        style.font_size = p.font_size;
        style.font_weight = p.font_weight;
        style.font_style = p.font_style;
        style.text_transform = p.text_transform;
        style.text_align = p.text_align;
        style.line_height = p.line_height;
        style.color = p.color;
    }

    for class in element.classes() {
        apply_class(&mut style, class);
    }
    if let Some(inline) = element.inline_style() {
        apply_inline_style(&mut style, inline);
    }

    style
}

/// Default styles based on tag semantics.
fn base_style_for_tag(tag: &Tag) -> ComputedStyle {
    let mut s = ComputedStyle::default();
    match tag {
        Tag::H1 => {
            s.font_size = 30.0;
            s.font_weight = FontWeight::Bold;
            s.margin_bottom = 6.0;
        }
        Tag::H2 => {
            s.font_size = 18.0;
            s.font_weight = FontWeight::Bold;
            s.margin_bottom = 4.0;
        }
        Tag::H3 => {
            s.font_size = 16.0;
            s.font_weight = FontWeight::Bold;
            s.margin_bottom = 4.0;
        }
        Tag::P => {
            s.margin_bottom = 2.0;
        }
        Tag::Ul => {
            s.margin_top = 2.0;
            s.margin_bottom = 4.0;
        }
        Tag::Li => {
            s.display = Display::ListItem;
            s.margin_bottom = 2.0;
        }
        Tag::Span | Tag::A => {
            s.display = Display::Inline;
        }
        Tag::Pre => {
            s.font_size = 11.0;
            s.line_height = 1.3;
        }
        Tag::Div => {}
        Tag::Unknown(_) => {
            s.display = Display::None;
        }
    }
    s
}

/// Apply one utility class as literal values. Returns `true` when the class
/// is part of the override table (including deliberate no-ops).
pub fn apply_class(s: &mut ComputedStyle, class: &str) -> bool {
    match class {
        // Layout
        "flex" => s.display = Display::Flex,
        "justify-between" => s.justify_content = JustifyContent::SpaceBetween,
        "justify-center" => s.justify_content = JustifyContent::Center,

        // Width fractions
        "w-full" => s.width = Dimension::Percent(100.0),
        "w-2/3" => s.width = Dimension::Percent(66.666),
        "w-1/3" => s.width = Dimension::Percent(33.333),
        "w-1/2" => s.width = Dimension::Percent(50.0),

        // Typography
        "font-bold" => s.font_weight = FontWeight::Bold,
        "italic" => s.font_style = FontStyle::Italic,
        "underline" => s.text_decoration = TextDecoration::Underline,
        "uppercase" => s.text_transform = TextTransform::Uppercase,
        "text-left" => s.text_align = TextAlign::Left,
        "text-center" => s.text_align = TextAlign::Center,
        "text-right" => s.text_align = TextAlign::Right,
        "text-xs" => {
            s.font_size = 11.0;
            s.line_height = 1.35;
        }
        "text-sm" => {
            s.font_size = 12.5;
            s.line_height = 1.4;
        }
        "text-lg" => {
            s.font_size = 18.0;
            s.line_height = 1.4;
        }
        "text-3xl" => {
            s.font_size = 30.0;
            s.line_height = 1.2;
        }

        // Colors
        "text-gray-900" => s.color = Color::GRAY_900,
        "text-gray-600" => s.color = Color::GRAY_600,
        "bg-white" => s.background_color = Color::WHITE,

        // Rules
        "border-b" => {
            s.border_bottom = 1.0;
            s.border_color = Color::GRAY_300;
        }

        // Recognized no-ops: the ul marker is always rendered, and the
        // wrapper class carries no visual properties of its own.
        "list-disc" | "resume-preview" => {}

        _ => {
            return apply_spacing_class(s, class) || apply_gap_class(s, class);
        }
    }
    true
}

/// True when `class` resolves to literal values in the override table.
pub fn is_supported_class(class: &str) -> bool {
    apply_class(&mut ComputedStyle::default(), class)
}

/// Dynamic spacing utilities: p-{n}, px/py/pt/pr/pb/pl-{n}, m… (1 unit = 4px).
fn apply_spacing_class(s: &mut ComputedStyle, class: &str) -> bool {
    let Some((prefix, value_str)) = class.rsplit_once('-') else {
        return false;
    };
    let Ok(units) = value_str.parse::<f32>() else {
        return false;
    };
    let v = units * 4.0;
    match prefix {
        "p" => {
            s.padding_top = v;
            s.padding_right = v;
            s.padding_bottom = v;
            s.padding_left = v;
        }
        "px" => {
            s.padding_left = v;
            s.padding_right = v;
        }
        "py" => {
            s.padding_top = v;
            s.padding_bottom = v;
        }
        "pt" => s.padding_top = v,
        "pr" => s.padding_right = v,
        "pb" => s.padding_bottom = v,
        "pl" => s.padding_left = v,
        "m" => {
            s.margin_top = v;
            s.margin_right = v;
            s.margin_bottom = v;
            s.margin_left = v;
        }
        "mx" => {
            s.margin_left = v;
            s.margin_right = v;
        }
        "my" => {
            s.margin_top = v;
            s.margin_bottom = v;
        }
        "mt" => s.margin_top = v,
        "mr" => s.margin_right = v,
        "mb" => s.margin_bottom = v,
        "ml" => s.margin_left = v,
        _ => return false,
    }
    true
}

fn apply_gap_class(s: &mut ComputedStyle, class: &str) -> bool {
    if let Some(rest) = class.strip_prefix("gap-") {
        if let Ok(v) = rest.parse::<f32>() {
            s.gap = v * 4.0;
            return true;
        }
    }
    false
}

// ---------------------------------------------------------------------------
// Inline style parsing (limited subset)
// ---------------------------------------------------------------------------

fn apply_inline_style(s: &mut ComputedStyle, style_str: &str) {
    for decl in style_str.split(';') {
        let decl = decl.trim();
        if decl.is_empty() {
            continue;
        }
        let Some((prop, val)) = decl.split_once(':') else {
            continue;
        };
        let (prop, val) = (prop.trim(), val.trim());
        match prop {
            "font-size" => {
                if let Some(px) = parse_px(val) {
                    s.font_size = px;
                }
            }
            "color" => {
                if let Some(c) = Color::from_hex(val) {
                    s.color = c;
                }
            }
            "background-color" | "background" => {
                if let Some(c) = Color::from_hex(val) {
                    s.background_color = c;
                }
            }
            "width" => {
                if let Some(px) = parse_px(val) {
                    s.width = Dimension::Px(px);
                }
            }
            "text-align" => {
                s.text_align = match val {
                    "center" => TextAlign::Center,
                    "right" => TextAlign::Right,
                    _ => TextAlign::Left,
                };
            }
            _ => {}
        }
    }
}

fn parse_px(s: &str) -> Option<f32> {
    s.trim().trim_end_matches("px").parse().ok()
}

// ---------------------------------------------------------------------------
// Styled DOM tree
// ---------------------------------------------------------------------------

/// A DOM node annotated with its computed style.
#[derive(Debug, Clone)]
pub enum StyledNode {
    Element {
        tag: Tag,
        style: ComputedStyle,
        children: Vec<StyledNode>,
    },
    Text {
        text: String,
        style: ComputedStyle,
    },
}

/// Build a styled tree from a DOM tree, resolving styles top-down.
pub fn build_styled_tree(
    nodes: &[DomNode],
    parent_style: Option<&ComputedStyle>,
) -> Vec<StyledNode> {
    let mut result = Vec::new();
    for node in nodes {
        match node {
            DomNode::Element(e) => {
                let style = resolve_style(e, parent_style);
                let children = build_styled_tree(&e.children, Some(&style));
                result.push(StyledNode::Element {
                    tag: e.tag.clone(),
                    style,
                    children,
                });
            }
            DomNode::Text(text) => {
                if !text.trim().is_empty() {
                    let mut style = parent_style.cloned().unwrap_or_default();
                    // Text renders inline: box-model properties stay on the
                    // enclosing element, never on the run itself.
                    style.border_bottom = 0.0;
                    style.background_color = Color::TRANSPARENT;
                    style.margin_top = 0.0;
                    style.margin_right = 0.0;
                    style.margin_bottom = 0.0;
                    style.margin_left = 0.0;
                    style.padding_top = 0.0;
                    style.padding_right = 0.0;
                    style.padding_bottom = 0.0;
                    style.padding_left = 0.0;
                    result.push(StyledNode::Text {
                        text: text.clone(),
                        style,
                    });
                }
            }
        }
    }
    result
}
