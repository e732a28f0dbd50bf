// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Primitive geometry builders.
//!
//! [`PrimitiveBuilder`] is bound to one stream's [`PrimitiveState`]. Each
//! factory appends an empty shape entry and hands back a [`ShapeBuilder`]
//! over it; the factory consumes the previous builder, so only one shape is
//! open at a time. A shape mutator that fails removes the shape it was
//! building and returns the error, leaving earlier shapes untouched.

use tracing::trace;
use xviz_proto::{
    Circle, Color, Image, Point, Polygon, Polyline, PrimitiveBase, PrimitiveState, PrimitiveType,
    StyleObjectValue, Text,
};

use crate::error::BuildError;
use crate::style::{convert_optional, StyleError, StyleMap};

/// A shape variant stored in a [`PrimitiveState`] list.
pub trait Shape: Default {
    /// Primitive type of the shape.
    const KIND: PrimitiveType;

    /// The list this shape lives in.
    fn list(state: &mut PrimitiveState) -> &mut Vec<Self>;

    /// Shared base fields.
    fn base_mut(&mut self) -> &mut Option<PrimitiveBase>;
}

macro_rules! impl_shape {
    ($shape:ty, $kind:ident, $list:ident) => {
        impl Shape for $shape {
            const KIND: PrimitiveType = PrimitiveType::$kind;

            fn list(state: &mut PrimitiveState) -> &mut Vec<Self> {
                &mut state.$list
            }

            fn base_mut(&mut self) -> &mut Option<PrimitiveBase> {
                &mut self.base
            }
        }
    };
}

impl_shape!(Polygon, Polygon, polygons);
impl_shape!(Polyline, Polyline, polylines);
impl_shape!(Circle, Circle, circles);
impl_shape!(Point, Point, points);
impl_shape!(Image, Image, images);
impl_shape!(Text, Text, texts);

fn flatten(vertices: &[[f32; 3]]) -> Vec<f32> {
    vertices.iter().flatten().copied().collect()
}

/// Builder over one stream's geometry.
#[derive(Debug)]
pub struct PrimitiveBuilder<'a> {
    stream: &'a str,
    state: &'a mut PrimitiveState,
}

impl<'a> PrimitiveBuilder<'a> {
    pub(crate) fn new(stream: &'a str, state: &'a mut PrimitiveState) -> Self {
        Self { stream, state }
    }

    fn start<S: Shape>(self, shape: S) -> ShapeBuilder<'a, S> {
        let list = S::list(self.state);
        let index = list.len();
        list.push(shape);
        trace!(stream = self.stream, kind = %S::KIND, index, "start shape");
        ShapeBuilder { stream: self.stream, state: self.state, index, marker: std::marker::PhantomData }
    }

    /// Appends a polygon with flattened `vertices`.
    pub fn polygon(self, vertices: &[[f32; 3]]) -> ShapeBuilder<'a, Polygon> {
        self.start(Polygon { base: None, vertices: flatten(vertices) })
    }

    /// Appends a polyline with flattened `vertices`.
    pub fn polyline(self, vertices: &[[f32; 3]]) -> ShapeBuilder<'a, Polyline> {
        self.start(Polyline { base: None, vertices: flatten(vertices) })
    }

    /// Appends a circle.
    pub fn circle(self, center: [f32; 3], radius: f32) -> ShapeBuilder<'a, Circle> {
        self.start(Circle { base: None, center: center.to_vec(), radius })
    }

    /// Appends a point cloud with flattened `points`.
    pub fn points(self, points: &[[f32; 3]]) -> ShapeBuilder<'a, Point> {
        self.start(Point { base: None, points: flatten(points), colors: Vec::new() })
    }

    /// Appends an encoded image.
    pub fn image(self, data: Vec<u8>) -> ShapeBuilder<'a, Image> {
        self.start(Image { data, ..Image::default() })
    }

    /// Appends a text label.
    pub fn text(self, text: impl Into<String>) -> ShapeBuilder<'a, Text> {
        self.start(Text { text: text.into(), ..Text::default() })
    }
}

/// Builder over the shape most recently appended to a stream.
#[derive(Debug)]
pub struct ShapeBuilder<'a, S> {
    stream: &'a str,
    state: &'a mut PrimitiveState,
    index: usize,
    marker: std::marker::PhantomData<S>,
}

impl<'a, S: Shape> ShapeBuilder<'a, S> {
    fn shape(&mut self) -> &mut S {
        &mut S::list(self.state)[self.index]
    }

    fn base(&mut self) -> &mut PrimitiveBase {
        self.shape().base_mut().get_or_insert_with(PrimitiveBase::default)
    }

    /// Drops the open shape and returns `err`.
    fn abandon(self, err: BuildError) -> BuildError {
        S::list(self.state).truncate(self.index);
        trace!(stream = self.stream, kind = %S::KIND, index = self.index, "abandon shape");
        err
    }

    /// Object id.
    pub fn id(mut self, object_id: impl Into<String>) -> Self {
        self.base().object_id = object_id.into();
        self
    }

    /// Style classes declared in the stream metadata.
    pub fn classes<I, C>(mut self, classes: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<String>,
    {
        self.base().classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Per-object style. An empty map leaves the style unset.
    pub fn style(mut self, style: &StyleMap) -> Result<Self, BuildError> {
        match convert_optional::<StyleObjectValue>(style) {
            Ok(Some(converted)) => {
                self.base().style = Some(converted);
                Ok(self)
            }
            Ok(None) => Ok(self),
            Err(source) => Err(self.abandon_style(source)),
        }
    }

    fn abandon_style(self, source: StyleError) -> BuildError {
        let target = format!("{} #{} on {}", S::KIND, self.index, self.stream);
        self.abandon(BuildError::Style { target, source })
    }

    /// Closes the shape and returns to the stream's primitive builder.
    pub fn end(self) -> PrimitiveBuilder<'a> {
        PrimitiveBuilder { stream: self.stream, state: self.state }
    }
}

impl ShapeBuilder<'_, Circle> {
    /// Fill colour (`#RRGGBB(AA)` hex). Other style fields are kept.
    pub fn color(mut self, color: &str) -> Result<Self, BuildError> {
        match Color::from_hex(color) {
            Ok(fill) => {
                self.base().style.get_or_insert_with(StyleObjectValue::default).fill_color = Some(fill);
                Ok(self)
            }
            Err(source) => {
                let source = StyleError::InvalidColor { field: "fill_color".to_owned(), value: color.to_owned(), source };
                Err(self.abandon_style(source))
            }
        }
    }
}

impl ShapeBuilder<'_, Point> {
    /// Flattened `r, g, b, a` bytes, four per point.
    pub fn colors(mut self, colors: Vec<u8>) -> Result<Self, BuildError> {
        let points = self.shape().points.len() / 3;
        if colors.len() % 4 != 0 || colors.len() / 4 != points {
            let err = BuildError::PointColorCount { stream: self.stream.to_owned(), colors: colors.len(), points };
            return Err(self.abandon(err));
        }
        self.shape().colors = colors;
        Ok(self)
    }

    /// One `[r, g, b, a]` per point.
    pub fn colors_rgba(self, colors: &[[u8; 4]]) -> Result<Self, BuildError> {
        self.colors(colors.iter().flatten().copied().collect())
    }
}

impl ShapeBuilder<'_, Text> {
    /// Anchor position.
    pub fn position(mut self, position: [f32; 3]) -> Self {
        self.shape().position = position.to_vec();
        self
    }
}

impl ShapeBuilder<'_, Image> {
    /// Anchor position.
    pub fn position(mut self, position: [f32; 3]) -> Self {
        self.shape().position = position.to_vec();
        self
    }

    /// Pixel dimensions.
    pub fn dimensions(mut self, width_px: u32, height_px: u32) -> Self {
        let image = self.shape();
        image.width_px = width_px;
        image.height_px = height_px;
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::style;

    #[test]
    fn failed_style_drops_only_the_open_shape() {
        let mut state = PrimitiveState::default();
        let err = PrimitiveBuilder::new("/s", &mut state)
            .circle([0.0, 0.0, 0.0], 1.0)
            .id("kept")
            .end()
            .circle([1.0, 1.0, 0.0], 2.0)
            .style(&style! { "no_such_field" => true })
            .unwrap_err();
        assert!(matches!(err, BuildError::Style { .. }));
        assert_eq!(state.circles.len(), 1);
        assert_eq!(state.circles[0].base.as_ref().unwrap().object_id, "kept");
    }

    #[test]
    fn circle_color_sets_base_fill() {
        let mut state = PrimitiveState::default();
        PrimitiveBuilder::new("/s", &mut state).circle([0.0; 3], 1.0).color("#00ff00").unwrap();
        let style = state.circles[0].base.as_ref().unwrap().style.as_ref().unwrap();
        assert_eq!(style.fill_color.as_ref().unwrap().as_bytes(), &[0x00, 0xff, 0x00]);
    }

    #[test]
    fn circle_color_keeps_earlier_style_fields() {
        let mut state = PrimitiveState::default();
        PrimitiveBuilder::new("/s", &mut state)
            .circle([0.0; 3], 1.0)
            .style(&style! { "stroke_width" => 2.0_f32, "stroke_color" => "#0000ff" })
            .unwrap()
            .color("#ff0000")
            .unwrap();
        let style = state.circles[0].base.as_ref().unwrap().style.as_ref().unwrap();
        assert_eq!(style.fill_color.as_ref().unwrap().as_bytes(), &[0xff, 0x00, 0x00]);
        assert_eq!(style.stroke_color.as_ref().unwrap().as_bytes(), &[0x00, 0x00, 0xff]);
        assert_eq!(style.stroke_width, Some(2.0));
    }

    #[test]
    fn bad_circle_color_drops_the_circle() {
        let mut state = PrimitiveState::default();
        let err = PrimitiveBuilder::new("/s", &mut state).circle([0.0; 3], 1.0).color("#abc").unwrap_err();
        assert!(matches!(err, BuildError::Style { source: StyleError::InvalidColor { .. }, .. }));
        assert!(state.circles.is_empty());
    }

    #[test]
    fn point_colours_need_four_bytes_per_point() {
        let mut state = PrimitiveState::default();
        let err = PrimitiveBuilder::new("/s", &mut state)
            .points(&[[0.0; 3], [1.0; 3]])
            .colors(vec![255, 0, 0, 255])
            .unwrap_err();
        assert!(matches!(err, BuildError::PointColorCount { colors: 4, points: 2, .. }));
        assert!(state.points.is_empty());

        PrimitiveBuilder::new("/s", &mut state)
            .points(&[[0.0; 3], [1.0; 3]])
            .colors_rgba(&[[255, 0, 0, 255], [0, 0, 255, 128]])
            .unwrap();
        assert_eq!(state.points[0].colors, hex::decode("ff0000ff0000ff80").unwrap());
    }

    #[test]
    fn image_and_text_mutators() {
        let mut state = PrimitiveState::default();
        PrimitiveBuilder::new("/s", &mut state)
            .image(vec![1, 2, 3])
            .position([1.0, 2.0, 3.0])
            .dimensions(640, 480)
            .end()
            .text("hello")
            .position([4.0, 5.0, 6.0])
            .classes(["label"]);
        assert_eq!(state.images[0].width_px, 640);
        assert_eq!(state.images[0].position, vec![1.0, 2.0, 3.0]);
        assert_eq!(state.texts[0].text, "hello");
        assert_eq!(state.texts[0].base.as_ref().unwrap().classes, vec!["label".to_string()]);
    }
}
