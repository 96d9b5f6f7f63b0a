//! Binary artifact format for compiled units.
//!
//! ```text
//! magic      "PSCU"
//! version    u16
//! name       str
//! constants  u32 count, then per constant: u8 tag, i32 | str
//! fields     u16 count, then per field: str name, type
//! methods    u16 count, then per method:
//!              str name, u8 param count, types, u8 has-return, [type],
//!              u16 local count, u32 code length, code bytes
//! checksum   u64 xxh64 of every preceding byte
//! ```
//!
//! All integers are big-endian and strings are a u16 length followed by
//! UTF-8 bytes. A type is a tag byte (0 integer, 1 boolean, 2 array); an
//! array tag is followed by the element tag, a u8 rank and an `i32 from,
//! i32 to` pair per dimension. Encoding the same unit always yields the
//! same bytes. A length or count that overflows its field fails encoding
//! with [`ArtifactError::LimitExceeded`].

use pascalc_core::{ArrayType, ArtifactError, DataType, PrimitiveKind, Range};
use xxhash_rust::xxh64::xxh64;

use crate::bytecode::{BytecodeChunk, Constant};
use crate::unit::{FieldDef, MethodDef, Unit};

/// Leading magic bytes.
pub const MAGIC: &[u8; 4] = b"PSCU";
/// Current format version.
pub const VERSION: u16 = 1;

const TAG_INTEGER: u8 = 0;
const TAG_BOOLEAN: u8 = 1;
const TAG_ARRAY: u8 = 2;

/// Encode a unit into its binary form.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn encode(unit: &Unit) -> Result<Vec<u8>, ArtifactError> {
    let mut w = Writer::default();
    w.bytes(MAGIC);
    w.u16(VERSION);
    w.str("unit name", &unit.name)?;

    w.u32(narrow("constant count", unit.constants.len())?);
    for constant in &unit.constants {
        w.u8(constant.tag());
        match constant {
            Constant::Int(value) => w.u32(*value as u32),
            Constant::StringData(data) => {
                w.u16(narrow("string constant", data.len())?);
                w.bytes(data);
            }
        }
    }

    w.u16(narrow("field count", unit.fields.len())?);
    for field in &unit.fields {
        w.str("field name", &field.name)?;
        w.data_type(&field.ty)?;
    }

    w.u16(narrow("method count", unit.methods.len())?);
    for method in &unit.methods {
        w.str("method name", &method.name)?;
        w.u8(narrow("parameter count", method.params.len())?);
        for param in &method.params {
            w.data_type(param)?;
        }
        match &method.return_type {
            Some(ty) => {
                w.u8(1);
                w.data_type(ty)?;
            }
            None => w.u8(0),
        }
        w.u16(method.local_count);
        w.u32(narrow("code length", method.chunk.len())?);
        w.bytes(method.chunk.code());
    }

    let checksum = xxh64(&w.buf, 0);
    w.u64(checksum);
    Ok(w.buf)
}

/// Convert a length to the width of its field.
fn narrow<T>(what: &'static str, len: usize) -> Result<T, ArtifactError>
where
    T: TryFrom<usize> + Bounded,
{
    T::try_from(len).map_err(|_| ArtifactError::LimitExceeded {
        what,
        len,
        max: T::MAX_LEN,
    })
}

trait Bounded {
    const MAX_LEN: usize;
}

impl Bounded for u8 {
    const MAX_LEN: usize = u8::MAX as usize;
}

impl Bounded for u16 {
    const MAX_LEN: usize = u16::MAX as usize;
}

impl Bounded for u32 {
    const MAX_LEN: usize = u32::MAX as usize;
}

/// Decode and validate a binary unit.
#[cfg_attr(feature = "profiling", profiling::function)]
pub fn decode(bytes: &[u8]) -> Result<Unit, ArtifactError> {
    if bytes.len() < MAGIC.len() || &bytes[..MAGIC.len()] != MAGIC {
        return Err(ArtifactError::BadMagic);
    }
    let body_len = bytes
        .len()
        .checked_sub(8)
        .ok_or(ArtifactError::Truncated { offset: bytes.len() })?;
    let (body, trailer) = bytes.split_at(body_len);

    let mut r = Reader { buf: body, pos: MAGIC.len() };
    let version = r.u16()?;
    if version != VERSION {
        return Err(ArtifactError::UnsupportedVersion(version));
    }

    let mut stored = [0u8; 8];
    stored.copy_from_slice(trailer);
    let stored = u64::from_be_bytes(stored);
    let computed = xxh64(body, 0);
    if stored != computed {
        return Err(ArtifactError::ChecksumMismatch { stored, computed });
    }

    let name = r.str()?;

    let constant_count = r.u32()?;
    let mut constants = Vec::new();
    for _ in 0..constant_count {
        let offset = r.pos;
        let constant = match r.u8()? {
            0 => Constant::Int(r.u32()? as i32),
            1 => {
                let len = r.u16()? as usize;
                Constant::StringData(r.take(len)?.to_vec())
            }
            tag => {
                return Err(ArtifactError::InvalidTag {
                    what: "constant",
                    tag,
                    offset,
                });
            }
        };
        constants.push(constant);
    }

    let field_count = r.u16()?;
    let mut fields = Vec::with_capacity(field_count as usize);
    for _ in 0..field_count {
        let name = r.str()?;
        let ty = r.data_type()?;
        fields.push(FieldDef { name, ty });
    }

    let method_count = r.u16()?;
    let mut methods = Vec::with_capacity(method_count as usize);
    for _ in 0..method_count {
        let name = r.str()?;
        let param_count = r.u8()?;
        let params = (0..param_count)
            .map(|_| r.data_type())
            .collect::<Result<Vec<_>, _>>()?;
        let return_type = match r.u8()? {
            0 => None,
            _ => Some(r.data_type()?),
        };
        let local_count = r.u16()?;
        let code_len = r.u32()? as usize;
        let code = r.take(code_len)?.to_vec();
        methods.push(MethodDef {
            name,
            params,
            return_type,
            local_count,
            chunk: BytecodeChunk::from_code(code),
        });
    }

    if r.pos != body.len() {
        return Err(ArtifactError::Truncated { offset: r.pos });
    }

    Ok(Unit {
        name,
        constants,
        fields,
        methods,
    })
}

#[derive(Default)]
struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    fn u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    fn u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    fn bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    fn str(&mut self, what: &'static str, s: &str) -> Result<(), ArtifactError> {
        self.u16(narrow(what, s.len())?);
        self.bytes(s.as_bytes());
        Ok(())
    }

    fn primitive(&mut self, kind: PrimitiveKind) {
        self.u8(match kind {
            PrimitiveKind::Integer => TAG_INTEGER,
            PrimitiveKind::Boolean => TAG_BOOLEAN,
        });
    }

    fn data_type(&mut self, ty: &DataType) -> Result<(), ArtifactError> {
        match ty {
            DataType::Primitive(kind) => self.primitive(*kind),
            DataType::Array(array) => {
                self.u8(TAG_ARRAY);
                self.primitive(array.element());
                self.u8(narrow("array rank", array.rank())?);
                for range in array.dimensions() {
                    self.u32(range.from() as u32);
                    self.u32(range.to() as u32);
                }
            }
        }
        Ok(())
    }
}

struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], ArtifactError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.buf.len())
            .ok_or(ArtifactError::Truncated { offset: self.pos })?;
        let slice = &self.buf[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn u8(&mut self) -> Result<u8, ArtifactError> {
        Ok(self.take(1)?[0])
    }

    fn u16(&mut self) -> Result<u16, ArtifactError> {
        let b = self.take(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    fn u32(&mut self) -> Result<u32, ArtifactError> {
        let b = self.take(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    fn str(&mut self) -> Result<String, ArtifactError> {
        let len = self.u16()? as usize;
        let offset = self.pos;
        let bytes = self.take(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ArtifactError::InvalidUtf8 { offset })
    }

    fn primitive(&mut self) -> Result<PrimitiveKind, ArtifactError> {
        let offset = self.pos;
        match self.u8()? {
            TAG_INTEGER => Ok(PrimitiveKind::Integer),
            TAG_BOOLEAN => Ok(PrimitiveKind::Boolean),
            tag => Err(ArtifactError::InvalidTag {
                what: "element type",
                tag,
                offset,
            }),
        }
    }

    fn data_type(&mut self) -> Result<DataType, ArtifactError> {
        let offset = self.pos;
        match self.u8()? {
            TAG_INTEGER => Ok(DataType::INTEGER),
            TAG_BOOLEAN => Ok(DataType::BOOLEAN),
            TAG_ARRAY => {
                let element = self.primitive()?;
                let rank = self.u8()?;
                let mut dimensions = Vec::with_capacity(rank as usize);
                for _ in 0..rank {
                    let range_offset = self.pos;
                    let from = self.u32()? as i32;
                    let to = self.u32()? as i32;
                    let range = Range::new(from, to).ok_or(ArtifactError::InvalidTag {
                        what: "array range",
                        tag: TAG_ARRAY,
                        offset: range_offset,
                    })?;
                    dimensions.push(range);
                }
                ArrayType::new(element, dimensions)
                    .map(DataType::Array)
                    .ok_or(ArtifactError::InvalidTag {
                        what: "array rank",
                        tag: rank,
                        offset,
                    })
            }
            tag => Err(ArtifactError::InvalidTag {
                what: "type",
                tag,
                offset,
            }),
        }
    }
}
