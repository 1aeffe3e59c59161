//! Layout engine – uses Taffy to compute flexbox layout from a styled
//! preview tree, then extracts a tree of absolutely positioned boxes for the
//! rasterizer.

use std::collections::HashMap;
use taffy::prelude::*;

use crate::dom::Tag;
use crate::fonts::{wrap_text, FontManager};
use crate::style::{self, ComputedStyle, StyledNode};

// ---------------------------------------------------------------------------
// Positioned boxes (post-layout, pre-raster)
// ---------------------------------------------------------------------------

/// A positioned box in content coordinates (origin = top-left of the
/// isolated container).
#[derive(Debug, Clone)]
pub struct PositionedBox {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub style: ComputedStyle,
    pub content: BoxContent,
    pub children: Vec<PositionedBox>,
}

#[derive(Debug, Clone)]
pub enum BoxContent {
    None,
    /// Pre-wrapped text lines. List items carry their bullet as a marker
    /// drawn in the left gutter.
    Text {
        lines: Vec<String>,
        marker: Option<String>,
    },
}

impl PositionedBox {
    /// Bottom edge of this subtree in content coordinates.
    pub fn subtree_bottom(&self) -> f32 {
        self.children
            .iter()
            .map(PositionedBox::subtree_bottom)
            .fold(self.y + self.height, f32::max)
    }
}

/// Full scrollable height of a laid-out tree.
pub fn content_height(boxes: &[PositionedBox]) -> f32 {
    boxes
        .iter()
        .map(PositionedBox::subtree_bottom)
        .fold(0.0, f32::max)
}

// ---------------------------------------------------------------------------
// Build Taffy tree from styled nodes
// ---------------------------------------------------------------------------

struct LayoutBuilder<'a> {
    taffy: TaffyTree<()>,
    fonts: &'a FontManager,
    node_styles: HashMap<NodeId, ComputedStyle>,
    node_content: HashMap<NodeId, BoxContent>,
}

impl<'a> LayoutBuilder<'a> {
    fn new(fonts: &'a FontManager) -> Self {
        Self {
            taffy: TaffyTree::new(),
            fonts,
            node_styles: HashMap::new(),
            node_content: HashMap::new(),
        }
    }

    /// Collect all text from an inline subtree (spans, anchors, text runs).
    fn collect_inline_text(node: &StyledNode) -> String {
        match node {
            StyledNode::Text { text, .. } => text.clone(),
            StyledNode::Element { children, .. } => children
                .iter()
                .map(Self::collect_inline_text)
                .collect::<Vec<_>>()
                .join(""),
        }
    }

    /// True when every child is a text run or a display:inline element.
    fn all_inline(children: &[StyledNode]) -> bool {
        children.iter().all(|c| match c {
            StyledNode::Text { .. } => true,
            StyledNode::Element {
                style,
                children: gc,
                ..
            } => style.display == style::Display::Inline && Self::all_inline(gc),
        })
    }

    fn build_node(&mut self, styled: &StyledNode, parent_width: f32) -> NodeId {
        match styled {
            StyledNode::Text { text, style } => {
                self.build_text_node(text, style, parent_width, false)
            }
            StyledNode::Element {
                tag,
                style,
                children,
            } => self.build_element_node(tag, style, children, parent_width),
        }
    }

    fn build_text_node(
        &mut self,
        text: &str,
        style: &ComputedStyle,
        parent_width: f32,
        with_block_spacing: bool,
    ) -> NodeId {
        let display_text = match style.text_transform {
            style::TextTransform::Uppercase => text.trim().to_uppercase(),
            style::TextTransform::None => text.trim().to_string(),
        };
        let bold = style.font_weight == style::FontWeight::Bold;
        let italic = style.font_style == style::FontStyle::Italic;
        let line_height = self.fonts.line_height_px(style.font_size, style.line_height);

        let max_w = if parent_width > 0.0 { parent_width } else { f32::MAX };
        let lines = wrap_text(&display_text, style.font_size, bold, italic, max_w, self.fonts);

        let text_width = lines
            .iter()
            .map(|l| self.fonts.measure_text_width(l, style.font_size, bold, italic))
            .fold(0.0f32, f32::max);
        let text_height = lines.len() as f32 * line_height;

        let mut taffy_style = Style {
            size: Size {
                width: Dimension::Length(text_width),
                height: Dimension::Length(text_height),
            },
            ..Default::default()
        };
        if with_block_spacing {
            // Paragraph-merged text carries the enclosing block's spacing.
            taffy_style.margin = margin_rect(style);
            taffy_style.padding = padding_rect(style);
        }

        let node = self.taffy.new_leaf(taffy_style).unwrap();
        self.node_styles.insert(node, style.clone());
        self.node_content
            .insert(node, BoxContent::Text { lines, marker: None });
        node
    }

    fn build_element_node(
        &mut self,
        tag: &Tag,
        style: &ComputedStyle,
        children: &[StyledNode],
        parent_width: f32,
    ) -> NodeId {
        // Paragraph-like blocks whose children are all inline merge into a
        // single wrapped text node so spans flow as one run.
        let is_paragraph = matches!(tag, Tag::P | Tag::H1 | Tag::H2 | Tag::H3 | Tag::Li);
        if is_paragraph && !children.is_empty() && Self::all_inline(children) {
            let raw: String = children.iter().map(Self::collect_inline_text).collect();
            let combined = raw.split_whitespace().collect::<Vec<_>>().join(" ");
            if !combined.is_empty() {
                let inner = parent_width - style.padding_left - style.padding_right;
                return self.build_text_node(&combined, style, inner, true);
            }
        }

        let my_width = match style.width {
            style::Dimension::Px(w) => w,
            style::Dimension::Percent(p) => parent_width * p / 100.0,
            style::Dimension::Auto => parent_width,
        };
        let inner_width = my_width - style.padding_left - style.padding_right;

        // Estimate per-child width for flex rows so text wraps to its column
        // at build time. Fraction-width children get their own share.
        let is_flex_row = style.display == style::Display::Flex
            && style.flex_direction == style::FlexDirection::Row;
        let elem_children = children
            .iter()
            .filter(|c| matches!(c, StyledNode::Element { .. }))
            .count()
            .max(1);

        let mut child_nodes = Vec::new();
        for child in children {
            let child_width = match child {
                StyledNode::Element { style: cs, .. } => match cs.width {
                    style::Dimension::Percent(p) => inner_width * p / 100.0,
                    style::Dimension::Px(w) => w,
                    style::Dimension::Auto if is_flex_row => {
                        let gap_total = style.gap * (elem_children.saturating_sub(1)) as f32;
                        ((inner_width - gap_total) / elem_children as f32).max(1.0)
                    }
                    style::Dimension::Auto => inner_width,
                },
                StyledNode::Text { .. } => inner_width,
            };
            let child_id = self.build_node(child, child_width);
            child_nodes.push(child_id);
        }

        let taffy_style = self.computed_to_taffy(style);
        let node = self
            .taffy
            .new_with_children(taffy_style, &child_nodes)
            .unwrap();
        self.node_styles.insert(node, style.clone());

        // Attach bullet markers to list items so the rasterizer can draw
        // them in the gutter. Paragraph-merged li nodes are text leaves at
        // this point.
        if *tag == Tag::Ul {
            for &child in &child_nodes {
                if let Some(BoxContent::Text { marker, .. }) = self.node_content.get_mut(&child) {
                    *marker = Some("\u{2022}".to_string());
                }
            }
        }

        node
    }

    fn computed_to_taffy(&self, s: &ComputedStyle) -> Style {
        let mut ts = Style::default();

        match s.display {
            style::Display::Flex => {
                ts.display = taffy::Display::Flex;
                ts.flex_direction = match s.flex_direction {
                    style::FlexDirection::Row => taffy::FlexDirection::Row,
                    style::FlexDirection::Column => taffy::FlexDirection::Column,
                };
                ts.justify_content = Some(match s.justify_content {
                    style::JustifyContent::Start => taffy::JustifyContent::Start,
                    style::JustifyContent::Center => taffy::JustifyContent::Center,
                    style::JustifyContent::SpaceBetween => taffy::JustifyContent::SpaceBetween,
                });
            }
            style::Display::Block | style::Display::ListItem => {
                // Block-level elements stack vertically.
                ts.display = taffy::Display::Flex;
                ts.flex_direction = taffy::FlexDirection::Column;
            }
            style::Display::Inline => {
                ts.display = taffy::Display::Flex;
                ts.flex_direction = taffy::FlexDirection::Row;
                ts.flex_wrap = taffy::FlexWrap::Wrap;
            }
            style::Display::None => {
                ts.display = taffy::Display::None;
            }
        }

        // Centered/right-aligned blocks align their children accordingly.
        if matches!(ts.flex_direction, taffy::FlexDirection::Column) {
            ts.align_items = Some(match s.text_align {
                style::TextAlign::Left => taffy::AlignItems::Start,
                style::TextAlign::Center => taffy::AlignItems::Center,
                style::TextAlign::Right => taffy::AlignItems::End,
            });
        }

        ts.size = Size {
            width: match s.width {
                style::Dimension::Auto => Dimension::Auto,
                style::Dimension::Px(v) => Dimension::Length(v),
                style::Dimension::Percent(v) => Dimension::Percent(v / 100.0),
            },
            height: Dimension::Auto,
        };
        ts.margin = margin_rect(s);
        ts.padding = padding_rect(s);
        ts.border = Rect {
            top: LengthPercentage::Length(0.0),
            right: LengthPercentage::Length(0.0),
            bottom: LengthPercentage::Length(s.border_bottom),
            left: LengthPercentage::Length(0.0),
        };
        ts.gap = Size {
            width: LengthPercentage::Length(s.gap),
            height: LengthPercentage::Length(s.gap),
        };

        ts
    }

    /// Extract positioned boxes after layout computation. Coordinates are
    /// accumulated so every box carries content-absolute x/y.
    fn extract(&self, node: NodeId, offset_x: f32, offset_y: f32) -> PositionedBox {
        let layout = self.taffy.layout(node).unwrap();
        let style = self.node_styles.get(&node).cloned().unwrap_or_default();
        let content = self
            .node_content
            .get(&node)
            .cloned()
            .unwrap_or(BoxContent::None);

        let x = offset_x + layout.location.x;
        let y = offset_y + layout.location.y;

        let children: Vec<PositionedBox> = self
            .taffy
            .children(node)
            .unwrap_or_default()
            .iter()
            .map(|&child| self.extract(child, x, y))
            .collect();

        PositionedBox {
            x,
            y,
            width: layout.size.width,
            height: layout.size.height,
            style,
            content,
            children,
        }
    }
}

fn margin_rect(s: &ComputedStyle) -> Rect<LengthPercentageAuto> {
    Rect {
        top: LengthPercentageAuto::Length(s.margin_top),
        right: LengthPercentageAuto::Length(s.margin_right),
        bottom: LengthPercentageAuto::Length(s.margin_bottom),
        left: LengthPercentageAuto::Length(s.margin_left),
    }
}

fn padding_rect(s: &ComputedStyle) -> Rect<LengthPercentage> {
    Rect {
        top: LengthPercentage::Length(s.padding_top),
        right: LengthPercentage::Length(s.padding_right),
        bottom: LengthPercentage::Length(s.padding_bottom),
        left: LengthPercentage::Length(s.padding_left),
    }
}

/// Compute layout for a styled tree within `available_width` px and return
/// the positioned top-level boxes.
pub fn compute_layout(
    styled: &[StyledNode],
    available_width: f32,
    fonts: &FontManager,
) -> Vec<PositionedBox> {
    let mut builder = LayoutBuilder::new(fonts);

    let child_nodes: Vec<NodeId> = styled
        .iter()
        .map(|node| builder.build_node(node, available_width))
        .collect();

    let root_style = Style {
        display: taffy::Display::Flex,
        flex_direction: taffy::FlexDirection::Column,
        size: Size {
            width: Dimension::Length(available_width),
            height: Dimension::Auto,
        },
        ..Default::default()
    };
    let root = builder
        .taffy
        .new_with_children(root_style, &child_nodes)
        .unwrap();

    builder
        .taffy
        .compute_layout(
            root,
            Size {
                width: AvailableSpace::Definite(available_width),
                height: AvailableSpace::MaxContent,
            },
        )
        .unwrap();

    builder.extract(root, 0.0, 0.0).children
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::parse_markup;
    use crate::style::build_styled_tree;

    fn layout(markup: &str, width: f32) -> Vec<PositionedBox> {
        let dom = parse_markup(markup);
        let styled = build_styled_tree(&dom, None);
        let fonts = FontManager::new();
        compute_layout(&styled, width, &fonts)
    }

    #[test]
    fn blocks_stack_vertically() {
        let boxes = layout("<div><p>one</p><p>two</p></div>", 500.0);
        let div = &boxes[0];
        assert_eq!(div.children.len(), 2);
        assert!(div.children[1].y > div.children[0].y);
    }

    #[test]
    fn justify_between_pushes_right_cell_out() {
        let markup = r#"<div class="flex justify-between"><span>left</span><span>right</span></div>"#;
        let boxes = layout(markup, 400.0);
        let row = &boxes[0];
        assert_eq!(row.children.len(), 2);
        let right = &row.children[1];
        assert!(
            right.x + right.width > 350.0,
            "right cell should be flush right, got x={} w={}",
            right.x,
            right.width
        );
    }

    #[test]
    fn fraction_widths_partition_row() {
        let markup =
            r#"<div class="flex"><div class="w-2/3"><p>a</p></div><div class="w-1/3"><p>b</p></div></div>"#;
        let boxes = layout(markup, 600.0);
        let row = &boxes[0];
        assert!((row.children[0].width - 400.0).abs() < 2.0);
        assert!((row.children[1].width - 200.0).abs() < 2.0);
    }

    #[test]
    fn uppercase_transform_reaches_text_lines() {
        let boxes = layout(r#"<h1 class="uppercase">Name</h1>"#, 500.0);
        let BoxContent::Text { lines, .. } = &boxes[0].content else {
            panic!("expected merged text, got {:?}", boxes[0].content);
        };
        assert_eq!(lines[0], "NAME");
    }

    #[test]
    fn list_items_carry_markers() {
        let boxes = layout("<ul><li>alpha</li><li>beta</li></ul>", 500.0);
        let ul = &boxes[0];
        assert_eq!(ul.children.len(), 2);
        for li in &ul.children {
            let BoxContent::Text { marker, .. } = &li.content else {
                panic!("expected text leaf for li");
            };
            assert_eq!(marker.as_deref(), Some("\u{2022}"));
        }
    }

    #[test]
    fn content_height_covers_subtree() {
        let boxes = layout("<div><p>one</p><p>two</p><p>three</p></div>", 500.0);
        assert!(content_height(&boxes) > 0.0);
    }
}
