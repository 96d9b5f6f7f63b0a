//! Forward-referenceable jump labels.
//!
//! A label is allocated before its position is known, referenced by any
//! number of jumps, and bound exactly once. Jump operands are recorded as
//! fixups and resolved when the method body is finished.

use super::EmitError;

/// An opaque jump destination within one method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Label(pub(crate) u32);

impl Label {
    /// The label's index within its method.
    pub fn index(&self) -> u32 {
        self.0
    }
}

/// A jump operand waiting for its label's position.
#[derive(Debug, Clone, Copy)]
struct Fixup {
    /// Offset of the 32-bit operand in the code.
    operand: usize,
    label: Label,
}

/// Label positions and pending fixups for one method body.
#[derive(Debug, Default)]
pub(crate) struct LabelTable {
    positions: Vec<Option<u32>>,
    fixups: Vec<Fixup>,
}

impl LabelTable {
    pub fn new_label(&mut self) -> Label {
        let label = Label(self.positions.len() as u32);
        self.positions.push(None);
        label
    }

    pub fn bind(&mut self, label: Label, position: u32) -> Result<(), EmitError> {
        match self.positions.get_mut(label.0 as usize) {
            Some(slot @ None) => {
                *slot = Some(position);
                Ok(())
            }
            Some(Some(_)) => Err(EmitError::LabelRebound(label.0)),
            None => Err(EmitError::UnknownLabel(label.0)),
        }
    }

    pub fn position(&self, label: Label) -> Option<u32> {
        self.positions.get(label.0 as usize).copied().flatten()
    }

    pub fn add_fixup(&mut self, operand: usize, label: Label) {
        self.fixups.push(Fixup { operand, label });
    }

    pub fn fixup_count(&self) -> usize {
        self.fixups.len()
    }

    /// Forget fixups recorded after `fixups` and bindings beyond `code_len`.
    pub fn rewind(&mut self, fixups: usize, code_len: usize) {
        self.fixups.truncate(fixups);
        for slot in &mut self.positions {
            if slot.is_some_and(|pos| pos as usize > code_len) {
                *slot = None;
            }
        }
    }

    /// Resolve every fixup, yielding `(operand offset, target)` pairs.
    pub fn resolve(&self) -> Result<Vec<(usize, u32)>, EmitError> {
        self.fixups
            .iter()
            .map(|fixup| {
                self.position(fixup.label)
                    .map(|target| (fixup.operand, target))
                    .ok_or(EmitError::UnboundLabel(fixup.label.0))
            })
            .collect()
    }
}
