// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Category-gated stream descriptor builder.
//!
//! Two call shapes share one implementation:
//!
//! * runtime-checked: [`StreamMetadataBuilder::category`] followed by
//!   [`StreamMetadataBuilder::stream_type`] / [`StreamMetadataBuilder::unit`],
//!   which re-validate the live category on every call;
//! * type-state: [`StreamMetadataBuilder::category_of`] returns a
//!   [`CategoryBuilder`] whose `primitive_type`, `scalar_type` and `unit`
//!   methods only exist for compatible categories.

use std::marker::PhantomData;

use xviz_proto::{
    Category, CoordinateType, PrimitiveType, ScalarType, StreamMetadata, StyleClass,
    StyleObjectValue, StyleStreamValue,
};

use crate::error::BuildError;
use crate::slot::Slot;
use crate::style::{convert_optional, StyleMap};

/// A stream type enum whose legality depends on the stream category.
pub trait StreamType: Copy {
    /// Operation name used in errors.
    const OP: &'static str;
    /// Enum type name used in errors.
    const ENUM_NAME: &'static str;

    /// `false` for the unset sentinel.
    fn is_concrete(self) -> bool;

    /// Categories that accept this type.
    fn permits(category: Category) -> bool;

    /// Writes the value into the descriptor.
    fn write(self, descriptor: &mut StreamMetadata);
}

impl StreamType for PrimitiveType {
    const OP: &'static str = "primitive type";
    const ENUM_NAME: &'static str = "PrimitiveType";

    fn is_concrete(self) -> bool {
        self.is_set()
    }

    fn permits(category: Category) -> bool {
        category == Category::Primitive
    }

    fn write(self, descriptor: &mut StreamMetadata) {
        descriptor.primitive_type = self;
    }
}

impl StreamType for ScalarType {
    const OP: &'static str = "scalar type";
    const ENUM_NAME: &'static str = "ScalarType";

    fn is_concrete(self) -> bool {
        self.is_set()
    }

    fn permits(category: Category) -> bool {
        is_scalar(category)
    }

    fn write(self, descriptor: &mut StreamMetadata) {
        descriptor.scalar_type = self;
    }
}

const fn is_scalar(category: Category) -> bool {
    matches!(category, Category::TimeSeries | Category::Variable)
}

/// Builder over one stream descriptor, borrowed from a
/// [`MetadataBuilder`](crate::MetadataBuilder).
#[derive(Debug)]
pub struct StreamMetadataBuilder<'a> {
    stream: &'a str,
    descriptor: &'a mut StreamMetadata,
    category: &'a mut Slot<Category>,
}

impl<'a> StreamMetadataBuilder<'a> {
    pub(crate) fn new(stream: &'a str, descriptor: &'a mut StreamMetadata, category: &'a mut Slot<Category>) -> Self {
        Self { stream, descriptor, category }
    }

    /// Stream id.
    pub fn stream_id(&self) -> &str {
        self.stream
    }

    /// Sets the stream category. Re-stating the current category is a no-op;
    /// changing it is an error.
    pub fn category(self, category: Category) -> Result<Self, BuildError> {
        if !category.is_set() {
            return Err(BuildError::UnsetEnum { target: format!("stream {}", self.stream), enum_name: "Category" });
        }
        let current = self.descriptor.category;
        if current.is_set() && current != category {
            return Err(BuildError::CategoryAlreadySet {
                stream: self.stream.to_owned(),
                current,
                requested: category,
            });
        }
        self.category.end();
        self.category.start(category)?;
        self.descriptor.category = category;
        Ok(self)
    }

    /// Sets the category statically and returns the gated builder.
    pub fn category_of<C: CategoryMarker>(self) -> Result<CategoryBuilder<'a, C>, BuildError> {
        let inner = self.category(C::CATEGORY)?;
        Ok(CategoryBuilder { inner, marker: PhantomData })
    }

    /// Sets the primitive or scalar type, checked against the live category.
    pub fn stream_type<T: StreamType>(self, value: T) -> Result<Self, BuildError> {
        if !value.is_concrete() {
            return Err(BuildError::UnsetEnum { target: format!("stream {}", self.stream), enum_name: T::ENUM_NAME });
        }
        let category = self.live_category();
        if !T::permits(category) {
            return Err(self.mismatch(T::OP, category));
        }
        value.write(self.descriptor);
        Ok(self)
    }

    /// Sets the unit label; legal for TIME_SERIES and VARIABLE only.
    pub fn unit(self, unit: impl Into<String>) -> Result<Self, BuildError> {
        let category = self.live_category();
        if !is_scalar(category) {
            return Err(self.mismatch("unit", category));
        }
        self.descriptor.units = unit.into();
        Ok(self)
    }

    /// Sets the coordinate frame.
    pub fn coordinate(self, coordinate: CoordinateType) -> Self {
        self.descriptor.coordinate = coordinate;
        self
    }

    /// Sets the stream-wide default style. An empty map leaves it unset.
    pub fn stream_style(self, style: &StyleMap) -> Result<Self, BuildError> {
        let converted = convert_optional::<StyleStreamValue>(style)
            .map_err(|source| BuildError::Style { target: format!("stream {}", self.stream), source })?;
        if converted.is_some() {
            self.descriptor.stream_style = converted;
        }
        Ok(self)
    }

    /// Appends a named style class.
    pub fn style_class(self, name: impl Into<String>, style: &StyleMap) -> Result<Self, BuildError> {
        let name = name.into();
        let converted = convert_optional::<StyleObjectValue>(style).map_err(|source| BuildError::Style {
            target: format!("style class {name} of stream {}", self.stream),
            source,
        })?;
        self.descriptor.style_classes.push(StyleClass { name, style: converted });
        Ok(self)
    }

    fn live_category(&self) -> Category {
        self.category.key().copied().unwrap_or(self.descriptor.category)
    }

    fn mismatch(&self, op: &'static str, category: Category) -> BuildError {
        BuildError::CategoryMismatch { stream: self.stream.to_owned(), op, category }
    }
}

/// Type-level stream categories for [`StreamMetadataBuilder::category_of`].
pub mod kind {
    use xviz_proto::Category;

    use super::CategoryMarker;

    /// POSE streams.
    #[derive(Debug)]
    pub enum Pose {}
    /// PRIMITIVE streams.
    #[derive(Debug)]
    pub enum Primitive {}
    /// TIME_SERIES streams.
    #[derive(Debug)]
    pub enum TimeSeries {}
    /// VARIABLE streams.
    #[derive(Debug)]
    pub enum Variable {}
    /// UI_PRIMITIVE streams.
    #[derive(Debug)]
    pub enum UiPrimitive {}

    impl CategoryMarker for Pose {
        const CATEGORY: Category = Category::Pose;
    }
    impl CategoryMarker for Primitive {
        const CATEGORY: Category = Category::Primitive;
    }
    impl CategoryMarker for TimeSeries {
        const CATEGORY: Category = Category::TimeSeries;
    }
    impl CategoryMarker for Variable {
        const CATEGORY: Category = Category::Variable;
    }
    impl CategoryMarker for UiPrimitive {
        const CATEGORY: Category = Category::UiPrimitive;
    }

    impl super::ScalarCategory for TimeSeries {}
    impl super::ScalarCategory for Variable {}
}

/// A type-level stream category.
pub trait CategoryMarker {
    /// Runtime category value.
    const CATEGORY: Category;
}

/// Categories carrying scalar values (TIME_SERIES, VARIABLE).
pub trait ScalarCategory: CategoryMarker {}

/// Stream builder whose category is fixed in the type.
///
/// Only setters legal for `C` exist:
///
/// ```
/// use xviz_builder::{kind, MetadataBuilder};
/// use xviz_proto::{PrimitiveType, ScalarType};
///
/// # fn main() -> Result<(), xviz_builder::BuildError> {
/// let mut builder = MetadataBuilder::new();
/// builder.stream("/shape")?.category_of::<kind::Primitive>()?.primitive_type(PrimitiveType::Polygon)?;
/// builder.stream("/speed")?.category_of::<kind::TimeSeries>()?.scalar_type(ScalarType::Float)?.unit("m/s");
/// # Ok(())
/// # }
/// ```
///
/// POSE streams take no unit:
///
/// ```compile_fail
/// use xviz_builder::{kind, MetadataBuilder};
///
/// # fn main() -> Result<(), xviz_builder::BuildError> {
/// let mut builder = MetadataBuilder::new();
/// builder.stream("/pose")?.category_of::<kind::Pose>()?.unit("m");
/// # Ok(())
/// # }
/// ```
///
/// PRIMITIVE streams take no scalar type:
///
/// ```compile_fail
/// use xviz_builder::{kind, MetadataBuilder};
/// use xviz_proto::ScalarType;
///
/// # fn main() -> Result<(), xviz_builder::BuildError> {
/// let mut builder = MetadataBuilder::new();
/// builder.stream("/shape")?.category_of::<kind::Primitive>()?.scalar_type(ScalarType::Float)?;
/// # Ok(())
/// # }
/// ```
///
/// TIME_SERIES streams take no primitive type:
///
/// ```compile_fail
/// use xviz_builder::{kind, MetadataBuilder};
/// use xviz_proto::PrimitiveType;
///
/// # fn main() -> Result<(), xviz_builder::BuildError> {
/// let mut builder = MetadataBuilder::new();
/// builder.stream("/speed")?.category_of::<kind::TimeSeries>()?.primitive_type(PrimitiveType::Point)?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CategoryBuilder<'a, C> {
    inner: StreamMetadataBuilder<'a>,
    marker: PhantomData<C>,
}

impl<'a, C: CategoryMarker> CategoryBuilder<'a, C> {
    /// Sets the coordinate frame.
    pub fn coordinate(self, coordinate: CoordinateType) -> Self {
        Self { inner: self.inner.coordinate(coordinate), marker: PhantomData }
    }

    /// Sets the stream-wide default style. An empty map leaves it unset.
    pub fn stream_style(self, style: &StyleMap) -> Result<Self, BuildError> {
        Ok(Self { inner: self.inner.stream_style(style)?, marker: PhantomData })
    }

    /// Appends a named style class.
    pub fn style_class(self, name: impl Into<String>, style: &StyleMap) -> Result<Self, BuildError> {
        Ok(Self { inner: self.inner.style_class(name, style)?, marker: PhantomData })
    }

    /// Returns to the runtime-checked builder.
    pub fn into_inner(self) -> StreamMetadataBuilder<'a> {
        self.inner
    }
}

impl CategoryBuilder<'_, kind::Primitive> {
    /// Sets the geometry kind. Fails only on the unset sentinel.
    pub fn primitive_type(self, value: PrimitiveType) -> Result<Self, BuildError> {
        Ok(Self { inner: self.inner.stream_type(value)?, marker: PhantomData })
    }
}

impl<C: ScalarCategory> CategoryBuilder<'_, C> {
    /// Sets the scalar kind. Fails only on the unset sentinel.
    pub fn scalar_type(self, value: ScalarType) -> Result<Self, BuildError> {
        Ok(Self { inner: self.inner.stream_type(value)?, marker: PhantomData })
    }

    /// Sets the unit label.
    pub fn unit(self, unit: impl Into<String>) -> Self {
        self.inner.descriptor.units = unit.into();
        self
    }
}
