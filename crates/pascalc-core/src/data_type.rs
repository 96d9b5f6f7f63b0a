//! Type descriptors for the language.
//!
//! Only two shapes exist: the primitive kinds (`integer`, `boolean`) and
//! bounded N-dimensional arrays of a primitive kind. Equality is structural
//! and there is no implicit conversion between any two types.
//!
//! # Example
//!
//! ```
//! use pascalc_core::{ArrayType, DataType, PrimitiveKind, Range};
//!
//! let grid = ArrayType::new(
//!     PrimitiveKind::Integer,
//!     vec![Range::new(1, 10).unwrap(), Range::new(1, 5).unwrap()],
//! )
//! .unwrap();
//!
//! assert_eq!(grid.size(), 50);
//! assert_ne!(DataType::Array(grid), DataType::INTEGER);
//! ```

use std::fmt::{self, Display, Formatter};

/// The primitive kinds. Both are 32-bit integers at the instruction level;
/// a boolean is the integer 0 or 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveKind {
    Integer,
    Boolean,
}

impl PrimitiveKind {
    /// Keyword spelling of the kind.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveKind::Integer => "integer",
            PrimitiveKind::Boolean => "boolean",
        }
    }
}

impl Display for PrimitiveKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An inclusive index range `from..to` of one array dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Range {
    from: i32,
    to: i32,
}

impl Range {
    /// Create a range. Returns `None` when `from > to`.
    pub fn new(from: i32, to: i32) -> Option<Self> {
        (from <= to).then_some(Self { from, to })
    }

    /// Lowest valid index.
    #[inline]
    pub fn from(&self) -> i32 {
        self.from
    }

    /// Highest valid index.
    #[inline]
    pub fn to(&self) -> i32 {
        self.to
    }

    /// Number of indices covered, `to - from + 1`.
    #[inline]
    pub fn length(&self) -> u64 {
        (i64::from(self.to) - i64::from(self.from) + 1) as u64
    }

    /// Whether `index` lies within the range.
    #[inline]
    pub fn contains(&self, index: i32) -> bool {
        self.from <= index && index <= self.to
    }
}

impl Display for Range {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}..{}", self.from, self.to)
    }
}

/// A bounded, row-major, N-dimensional array of a primitive kind.
///
/// All cells live in one flat backing store of [`size`](Self::size) cells.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ArrayType {
    element: PrimitiveKind,
    dimensions: Vec<Range>,
}

impl ArrayType {
    /// Create an array type. Returns `None` when `dimensions` is empty.
    pub fn new(element: PrimitiveKind, dimensions: Vec<Range>) -> Option<Self> {
        (!dimensions.is_empty()).then_some(Self {
            element,
            dimensions,
        })
    }

    /// The element kind.
    #[inline]
    pub fn element(&self) -> PrimitiveKind {
        self.element
    }

    /// The element type as a [`DataType`].
    #[inline]
    pub fn element_type(&self) -> DataType {
        DataType::Primitive(self.element)
    }

    /// The dimensions, outermost first.
    #[inline]
    pub fn dimensions(&self) -> &[Range] {
        &self.dimensions
    }

    /// Number of dimensions.
    #[inline]
    pub fn rank(&self) -> usize {
        self.dimensions.len()
    }

    /// Total cell count: the product of every dimension length.
    ///
    /// Saturates at `u64::MAX`.
    pub fn size(&self) -> u64 {
        self.dimensions
            .iter()
            .fold(1u64, |acc, r| acc.saturating_mul(r.length()))
    }

    /// Flat row-major offset of `indices`, or `None` if the arity differs or
    /// any index is out of its range.
    ///
    /// This is the same computation the translator emits as instructions.
    pub fn linear_offset(&self, indices: &[i32]) -> Option<u64> {
        if indices.len() != self.dimensions.len() {
            return None;
        }
        let mut offset = 0u64;
        for (range, &index) in self.dimensions.iter().zip(indices) {
            if !range.contains(index) {
                return None;
            }
            let normalized = (i64::from(index) - i64::from(range.from())) as u64;
            offset = offset * range.length() + normalized;
        }
        Some(offset)
    }
}

impl Display for ArrayType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str("array[")?;
        for (i, range) in self.dimensions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{range}")?;
        }
        write!(f, "] of {}", self.element)
    }
}

/// A complete type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DataType {
    Primitive(PrimitiveKind),
    Array(ArrayType),
}

impl DataType {
    pub const INTEGER: DataType = DataType::Primitive(PrimitiveKind::Integer);
    pub const BOOLEAN: DataType = DataType::Primitive(PrimitiveKind::Boolean);

    /// Whether this is a primitive (non-array) type.
    #[inline]
    pub fn is_primitive(&self) -> bool {
        matches!(self, DataType::Primitive(_))
    }

    /// The primitive kind, if this is a primitive type.
    #[inline]
    pub fn as_primitive(&self) -> Option<PrimitiveKind> {
        match self {
            DataType::Primitive(kind) => Some(*kind),
            DataType::Array(_) => None,
        }
    }

    /// The array descriptor, if this is an array type.
    #[inline]
    pub fn as_array(&self) -> Option<&ArrayType> {
        match self {
            DataType::Array(array) => Some(array),
            DataType::Primitive(_) => None,
        }
    }
}

impl Display for DataType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            DataType::Primitive(kind) => write!(f, "{kind}"),
            DataType::Array(array) => write!(f, "{array}"),
        }
    }
}

impl From<PrimitiveKind> for DataType {
    fn from(kind: PrimitiveKind) -> Self {
        DataType::Primitive(kind)
    }
}

impl From<ArrayType> for DataType {
    fn from(array: ArrayType) -> Self {
        DataType::Array(array)
    }
}
