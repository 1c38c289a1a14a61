//! Static type descriptors and the dynamic value access traits the mapper walks.
//!
//! Every type that can appear in a mapped record implements [`Value`], which
//! classifies it into one [`Shape`]. Record types implement [`Record`] through
//! `#[derive(Record)]`, which emits a static [`RecordDef`] describing the
//! declared fields and their annotations.

use std::any::{Any, TypeId};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;

use serde::{Serialize, Serializer};

/// Closed classification of a type's shape, used for field kinds in mappings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Scalar,
    Pointer,
    Collection,
    Map,
    Record,
}

/// Structural shape of a type.
///
/// Inner types are referenced through function pointers so descriptors stay
/// `Copy` and can be built lazily, including for self-referencing records.
#[derive(Debug, Clone, Copy)]
pub enum Shape {
    Scalar,
    /// Optional or boxed indirection to the inner type.
    Pointer(fn() -> TypeDef),
    /// Ordered collection of the element type.
    Collection(fn() -> TypeDef),
    /// Keyed collection of the value type. Maps are copied whole.
    Map(fn() -> TypeDef),
    Record(&'static RecordDef),
}

/// Runtime descriptor of a type: identity, readable name and shape.
#[derive(Clone, Copy)]
pub struct TypeDef {
    type_id: TypeId,
    type_name: &'static str,
    shape: Shape,
}

impl TypeDef {
    pub fn of<T: Any>(shape: Shape) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            shape,
        }
    }

    pub fn scalar<T: Any>() -> Self {
        Self::of::<T>(Shape::Scalar)
    }

    pub fn record<T: Any>(def: &'static RecordDef) -> Self {
        Self::of::<T>(Shape::Record(def))
    }

    #[inline]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    #[inline]
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    #[inline]
    pub fn shape(&self) -> Shape {
        self.shape
    }

    pub fn kind(&self) -> FieldKind {
        match self.shape {
            Shape::Scalar => FieldKind::Scalar,
            Shape::Pointer(_) => FieldKind::Pointer,
            Shape::Collection(_) => FieldKind::Collection,
            Shape::Map(_) => FieldKind::Map,
            Shape::Record(_) => FieldKind::Record,
        }
    }

    /// Returns the record layout when this type is itself a record.
    pub fn record_def(&self) -> Option<&'static RecordDef> {
        match self.shape {
            Shape::Record(def) => Some(def),
            _ => None,
        }
    }

    /// Follows pointer shapes down to the first non-pointer type.
    pub fn deref_pointers(self) -> TypeDef {
        match self.shape {
            Shape::Pointer(inner) => inner().deref_pointers(),
            _ => self,
        }
    }

    /// The underlying element type: one collection or map level is stripped,
    /// then any pointers.
    pub fn element(self) -> TypeDef {
        match self.shape {
            Shape::Collection(inner) | Shape::Map(inner) => inner().deref_pointers(),
            _ => self.deref_pointers(),
        }
    }

    /// Record type this type is, or indirects to through pointers or a single
    /// collection level.
    pub fn indirect_record(self) -> Option<TypeDef> {
        let target = self.deref_pointers();
        match target.shape {
            Shape::Record(_) => Some(target),
            Shape::Collection(inner) => {
                let element = inner().deref_pointers();
                element.record_def().map(|_| element)
            }
            _ => None,
        }
    }
}

impl PartialEq for TypeDef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for TypeDef {}

impl fmt::Debug for TypeDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDef")
            .field("type_name", &self.type_name)
            .field("kind", &self.kind())
            .finish()
    }
}

impl Serialize for TypeDef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.type_name)
    }
}

/// Static layout of a record type, emitted by `#[derive(Record)]`.
#[derive(Debug)]
pub struct RecordDef {
    name: &'static str,
    module_path: &'static str,
    fields: &'static [FieldDef],
}

impl RecordDef {
    pub const fn new(name: &'static str, module_path: &'static str, fields: &'static [FieldDef]) -> Self {
        Self {
            name,
            module_path,
            fields,
        }
    }

    /// Name used to match `types<...>` rules.
    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    #[inline]
    pub const fn module_path(&self) -> &'static str {
        self.module_path
    }

    /// Fields in declaration order.
    #[inline]
    pub const fn fields(&self) -> &'static [FieldDef] {
        self.fields
    }

    pub fn field_at(&self, index: usize) -> Option<&'static FieldDef> {
        self.fields.get(index)
    }

    /// Finds a field by declared name, returning its position as well.
    pub fn position(&self, name: &str) -> Option<(usize, &'static FieldDef)> {
        self.fields.iter().enumerate().find(|(_, field)| field.name == name)
    }
}

/// One declared record field.
#[derive(Debug)]
pub struct FieldDef {
    name: &'static str,
    annotation: Option<&'static str>,
    type_def: fn() -> TypeDef,
}

impl FieldDef {
    pub const fn new(name: &'static str, annotation: Option<&'static str>, type_def: fn() -> TypeDef) -> Self {
        Self {
            name,
            annotation,
            type_def,
        }
    }

    #[inline]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Raw `#[fieldmap("...")]` text, if the field carries one.
    #[inline]
    pub const fn annotation(&self) -> Option<&'static str> {
        self.annotation
    }

    #[inline]
    pub fn type_def(&self) -> TypeDef {
        (self.type_def)()
    }
}

/// Borrowed view of a value, split by shape.
pub enum ReflectRef<'a> {
    Scalar(&'a dyn Value),
    Pointer(&'a dyn Pointer),
    Collection(&'a dyn Collection),
    Map(&'a dyn Value),
    Record(&'a dyn Record),
}

/// Mutable view of a value, split by shape.
pub enum ReflectMut<'a> {
    Scalar(&'a mut dyn Value),
    Pointer(&'a mut dyn Pointer),
    Collection(&'a mut dyn Collection),
    Map(&'a mut dyn Value),
    Record(&'a mut dyn Record),
}

/// A value the mapper can read, compare against its zero value, and assign.
pub trait Value: Any {
    fn type_def() -> TypeDef
    where
        Self: Sized;

    /// Descriptor of the concrete type behind a `dyn Value`.
    fn value_type_def(&self) -> TypeDef;

    fn reflect_ref(&self) -> ReflectRef<'_>;

    fn reflect_mut(&mut self) -> ReflectMut<'_>;

    /// True for the type's zero value: default scalars, `None`, empty
    /// collections and maps, records whose fields are all zero.
    fn is_zero(&self) -> bool;

    /// Replaces `self` with a clone of `source` when both are the same type.
    fn assign(&mut self, source: &dyn Value) -> bool;

    fn as_any(&self) -> &dyn Any;
}

/// Record types with indexed field access. Implemented by `#[derive(Record)]`.
pub trait Record: Value {
    fn record_def() -> &'static RecordDef
    where
        Self: Sized;

    fn field(&self, index: usize) -> Option<&dyn Value>;

    fn field_mut(&mut self, index: usize) -> Option<&mut dyn Value>;
}

/// Indirection that may be absent.
pub trait Pointer {
    fn pointee(&self) -> Option<&dyn Value>;

    /// Returns the pointee, allocating a default one when absent.
    fn pointee_or_alloc(&mut self) -> &mut dyn Value;
}

/// Ordered collection; the mapper only ever touches the first element.
pub trait Collection {
    fn len(&self) -> usize;

    fn first(&self) -> Option<&dyn Value>;

    /// Returns the first element, pushing a default one when empty.
    fn first_or_alloc(&mut self) -> &mut dyn Value;
}

/// Clones `source` into `target` when it has the same concrete type.
pub fn assign_cloned<T: Value + Clone>(target: &mut T, source: &dyn Value) -> bool {
    match source.as_any().downcast_ref::<T>() {
        Some(value) => {
            *target = value.clone();
            true
        }
        None => false,
    }
}

macro_rules! impl_scalar_value {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Value for $ty {
                fn type_def() -> TypeDef {
                    TypeDef::scalar::<Self>()
                }

                fn value_type_def(&self) -> TypeDef {
                    Self::type_def()
                }

                fn reflect_ref(&self) -> ReflectRef<'_> {
                    ReflectRef::Scalar(self)
                }

                fn reflect_mut(&mut self) -> ReflectMut<'_> {
                    ReflectMut::Scalar(self)
                }

                fn is_zero(&self) -> bool {
                    *self == <$ty>::default()
                }

                fn assign(&mut self, source: &dyn Value) -> bool {
                    assign_cloned(self, source)
                }

                fn as_any(&self) -> &dyn Any {
                    self
                }
            }
        )*
    };
}

impl_scalar_value!(
    bool, char, i8, i16, i32, i64, i128, isize, u8, u16, u32, u64, u128, usize, f32, f64, String,
);

impl<T: Value + Default + Clone> Value for Option<T> {
    fn type_def() -> TypeDef {
        TypeDef::of::<Self>(Shape::Pointer(T::type_def))
    }

    fn value_type_def(&self) -> TypeDef {
        Self::type_def()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }

    fn is_zero(&self) -> bool {
        self.is_none()
    }

    fn assign(&mut self, source: &dyn Value) -> bool {
        assign_cloned(self, source)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Value + Default + Clone> Pointer for Option<T> {
    fn pointee(&self) -> Option<&dyn Value> {
        self.as_ref().map(|value| value as &dyn Value)
    }

    fn pointee_or_alloc(&mut self) -> &mut dyn Value {
        self.get_or_insert_with(T::default)
    }
}

impl<T: Value + Clone> Value for Box<T> {
    fn type_def() -> TypeDef {
        TypeDef::of::<Self>(Shape::Pointer(T::type_def))
    }

    fn value_type_def(&self) -> TypeDef {
        Self::type_def()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Pointer(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Pointer(self)
    }

    // A box is never absent, so it is as empty as what it holds.
    fn is_zero(&self) -> bool {
        (**self).is_zero()
    }

    fn assign(&mut self, source: &dyn Value) -> bool {
        assign_cloned(self, source)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Value + Clone> Pointer for Box<T> {
    fn pointee(&self) -> Option<&dyn Value> {
        Some(&**self)
    }

    fn pointee_or_alloc(&mut self) -> &mut dyn Value {
        &mut **self
    }
}

impl<T: Value + Default + Clone> Value for Vec<T> {
    fn type_def() -> TypeDef {
        TypeDef::of::<Self>(Shape::Collection(T::type_def))
    }

    fn value_type_def(&self) -> TypeDef {
        Self::type_def()
    }

    fn reflect_ref(&self) -> ReflectRef<'_> {
        ReflectRef::Collection(self)
    }

    fn reflect_mut(&mut self) -> ReflectMut<'_> {
        ReflectMut::Collection(self)
    }

    fn is_zero(&self) -> bool {
        self.is_empty()
    }

    fn assign(&mut self, source: &dyn Value) -> bool {
        assign_cloned(self, source)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

impl<T: Value + Default + Clone> Collection for Vec<T> {
    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn first(&self) -> Option<&dyn Value> {
        self.as_slice().first().map(|value| value as &dyn Value)
    }

    fn first_or_alloc(&mut self) -> &mut dyn Value {
        if self.is_empty() {
            self.push(T::default());
        }
        &mut self[0]
    }
}

macro_rules! impl_map_value {
    ($map:ident, $($bound:path),+) => {
        impl<K, V> Value for $map<K, V>
        where
            K: Clone + 'static $(+ $bound)+,
            V: Value + Clone,
        {
            fn type_def() -> TypeDef {
                TypeDef::of::<Self>(Shape::Map(V::type_def))
            }

            fn value_type_def(&self) -> TypeDef {
                Self::type_def()
            }

            fn reflect_ref(&self) -> ReflectRef<'_> {
                ReflectRef::Map(self)
            }

            fn reflect_mut(&mut self) -> ReflectMut<'_> {
                ReflectMut::Map(self)
            }

            fn is_zero(&self) -> bool {
                self.is_empty()
            }

            fn assign(&mut self, source: &dyn Value) -> bool {
                assign_cloned(self, source)
            }

            fn as_any(&self) -> &dyn Any {
                self
            }
        }
    };
}

impl_map_value!(HashMap, Eq, Hash);
impl_map_value!(BTreeMap, Ord);
