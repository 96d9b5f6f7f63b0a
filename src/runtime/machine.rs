//! Stack machine that executes compiled units.
//!
//! One shared operand stack and a stack of call frames. Each frame owns its
//! local slots; parameters occupy the first slots and the remaining ones
//! start at zero.

use std::io::{BufRead, Write};

use pascalc_compiler::unit::{CLINIT, MAIN};
use pascalc_compiler::{Constant, MethodDef, MethodId, OpCode, Unit};
use pascalc_core::{DataType, PrimitiveKind, RuntimeError};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::value::Value;

type Result<T> = std::result::Result<T, RuntimeError>;

/// Execution limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MachineConfig {
    /// Maximum number of nested calls.
    pub max_call_depth: usize,
    /// Maximum number of values on the operand stack.
    pub max_stack_depth: usize,
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            max_call_depth: 1024,
            max_stack_depth: 64 * 1024,
        }
    }
}

struct CallFrame<'u> {
    method: &'u MethodDef,
    ip: usize,
    locals: Vec<Value>,
    /// Operand stack height when the frame was entered.
    base: usize,
}

/// Executes the methods of one unit.
///
/// `write` output goes to `output`, one value per line; `read` consumes one
/// line of `input` per target.
pub struct Machine<'u, R, W> {
    unit: &'u Unit,
    config: MachineConfig,
    globals: Vec<Value>,
    global_index: FxHashMap<&'u str, usize>,
    stack: Vec<Value>,
    frames: Vec<CallFrame<'u>>,
    initialized: bool,
    input: R,
    output: W,
}

impl<'u, R: BufRead, W: Write> Machine<'u, R, W> {
    /// Create a machine with default limits.
    pub fn new(unit: &'u Unit, input: R, output: W) -> Self {
        Self::with_config(unit, MachineConfig::default(), input, output)
    }

    /// Create a machine with explicit limits.
    pub fn with_config(unit: &'u Unit, config: MachineConfig, input: R, output: W) -> Self {
        let globals = unit
            .fields
            .iter()
            .map(|f| if f.defaults_to_null() { Value::Null } else { Value::Int(0) })
            .collect();
        let global_index = unit
            .fields
            .iter()
            .enumerate()
            .map(|(i, f)| (f.name.as_str(), i))
            .collect();

        Self {
            unit,
            config,
            globals,
            global_index,
            stack: Vec::new(),
            frames: Vec::new(),
            initialized: false,
            input,
            output,
        }
    }

    /// Run the static initializer, once.
    pub fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }
        self.initialized = true;
        if let Some(id) = self.unit.method_id(CLINIT) {
            self.execute(id, Vec::new())?;
        }
        Ok(())
    }

    /// Initialize the unit and run its entry routine.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn run_main(&mut self) -> Result<()> {
        self.initialize()?;
        let entry = self.unit.entry().ok_or_else(|| RuntimeError::MissingEntry {
            name: MAIN.to_string(),
        })?;
        debug!(unit = %self.unit.name, "invoking entry");
        self.execute(entry, Vec::new())?;
        self.output.flush()?;
        Ok(())
    }

    /// Call a function by name, picking the overload whose parameters
    /// accept the arguments. Integer and boolean parameters take
    /// [`Value::Int`]; array parameters take [`Value::Array`] or
    /// [`Value::Null`]. Overloads that differ only between integer and
    /// boolean are ambiguous here; use [`invoke_signature`](Self::invoke_signature).
    pub fn invoke(&mut self, name: &str, args: Vec<Value>) -> Result<Option<Value>> {
        let unit = self.unit;
        let mut matches = unit
            .methods
            .iter()
            .enumerate()
            .filter(|(_, m)| m.name == name && accepts(&m.params, &args))
            .map(|(i, _)| i);
        let id = match (matches.next(), matches.next()) {
            (Some(id), None) => id,
            (None, _) => {
                return Err(RuntimeError::MissingEntry {
                    name: name.to_string(),
                });
            }
            (Some(_), Some(_)) => {
                return Err(RuntimeError::AmbiguousCall {
                    name: name.to_string(),
                    candidates: 2 + matches.count(),
                });
            }
        };
        self.call(MethodId(id as u16), args)
    }

    /// Call the overload of `name` declared with exactly `params`.
    pub fn invoke_signature(
        &mut self,
        name: &str,
        params: &[DataType],
        args: Vec<Value>,
    ) -> Result<Option<Value>> {
        let id = self
            .unit
            .methods
            .iter()
            .position(|m| m.name == name && m.params == params && accepts(params, &args))
            .ok_or_else(|| RuntimeError::MissingEntry {
                name: name.to_string(),
            })?;
        self.call(MethodId(id as u16), args)
    }

    fn call(&mut self, id: MethodId, args: Vec<Value>) -> Result<Option<Value>> {
        self.initialize()?;
        let result = self.execute(id, args)?;
        self.output.flush()?;
        Ok(result)
    }

    /// Current value of a global variable.
    pub fn global(&self, name: &str) -> Option<&Value> {
        self.global_index.get(name).map(|&i| &self.globals[i])
    }

    /// Consume the machine and return its output sink.
    pub fn into_output(self) -> W {
        self.output
    }

    // ==========================================================================
    // Execution
    // ==========================================================================

    fn execute(&mut self, id: MethodId, args: Vec<Value>) -> Result<Option<Value>> {
        self.stack.clear();
        self.frames.clear();
        self.push_frame(id, args)?;

        loop {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(None);
            };
            let method = frame.method;
            let offset = frame.ip;
            let chunk = &method.chunk;

            let op = chunk
                .read_op(offset)
                .ok_or_else(|| invalid(method, offset, "unknown opcode or end of code"))?;
            frame.ip = offset + 1 + op.operand_size();
            if frame.ip > chunk.len() {
                return Err(invalid(method, offset, "truncated operand"));
            }

            match op {
                OpCode::Constant => {
                    let index = self.operand_u8(method, offset)? as usize;
                    self.push_constant(method, offset, index)?;
                }
                OpCode::ConstantWide => {
                    let index = self.operand_u16(method, offset)? as usize;
                    self.push_constant(method, offset, index)?;
                }
                OpCode::PushNull => self.push(Value::Null)?,
                OpCode::PushZero => self.push(Value::Int(0))?,
                OpCode::PushOne => self.push(Value::Int(1))?,

                OpCode::Pop => {
                    self.pop()?;
                }
                OpCode::Dup => {
                    let top = self.peek(0)?.clone();
                    self.push(top)?;
                }
                OpCode::Dup2 => {
                    let a = self.peek(1)?.clone();
                    let b = self.peek(0)?.clone();
                    self.push(a)?;
                    self.push(b)?;
                }

                OpCode::GetLocal => {
                    let slot = self.operand_u8(method, offset)? as usize;
                    let value = self.local(method, offset, slot)?.clone();
                    self.push(value)?;
                }
                OpCode::GetLocalWide => {
                    let slot = self.operand_u16(method, offset)? as usize;
                    let value = self.local(method, offset, slot)?.clone();
                    self.push(value)?;
                }
                OpCode::SetLocal => {
                    let slot = self.operand_u8(method, offset)? as usize;
                    let value = self.pop()?;
                    *self.local(method, offset, slot)? = value;
                }
                OpCode::SetLocalWide => {
                    let slot = self.operand_u16(method, offset)? as usize;
                    let value = self.pop()?;
                    *self.local(method, offset, slot)? = value;
                }
                OpCode::IncLocal => {
                    let slot = self.operand_u16(method, offset)? as usize;
                    let delta = chunk
                        .read_byte(offset + 3)
                        .ok_or_else(|| invalid(method, offset, "truncated operand"))?
                        as i8;
                    let local = self.local(method, offset, slot)?;
                    *local = Value::Int(local.as_int()?.wrapping_add(delta as i32));
                }

                OpCode::GetGlobal => {
                    let field = self.operand_u16(method, offset)? as usize;
                    let value = self
                        .globals
                        .get(field)
                        .cloned()
                        .ok_or_else(|| invalid(method, offset, "field out of range"))?;
                    self.push(value)?;
                }
                OpCode::SetGlobal => {
                    let field = self.operand_u16(method, offset)? as usize;
                    let value = self.pop()?;
                    let slot = self
                        .globals
                        .get_mut(field)
                        .ok_or_else(|| invalid(method, offset, "field out of range"))?;
                    *slot = value;
                }

                OpCode::Add => self.binary(i32::wrapping_add)?,
                OpCode::Sub => self.binary(i32::wrapping_sub)?,
                OpCode::Mul => self.binary(i32::wrapping_mul)?,
                OpCode::BitAnd => self.binary(|a, b| a & b)?,
                OpCode::BitOr => self.binary(|a, b| a | b)?,
                OpCode::BitXor => self.binary(|a, b| a ^ b)?,
                OpCode::Div | OpCode::Mod => {
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    if b == 0 {
                        return Err(RuntimeError::DivisionByZero);
                    }
                    let result = if op == OpCode::Div {
                        a.wrapping_div(b)
                    } else {
                        a.wrapping_rem(b)
                    };
                    self.push(Value::Int(result))?;
                }
                OpCode::Neg => {
                    let a = self.pop_int()?;
                    self.push(Value::Int(a.wrapping_neg()))?;
                }

                OpCode::Jump => {
                    let target = self.operand_u32(method, offset)?;
                    self.jump(target);
                }
                OpCode::JumpIfZero => {
                    let target = self.operand_u32(method, offset)?;
                    if self.pop_int()? == 0 {
                        self.jump(target);
                    }
                }
                OpCode::JumpIfEq
                | OpCode::JumpIfNe
                | OpCode::JumpIfLt
                | OpCode::JumpIfLe
                | OpCode::JumpIfGt
                | OpCode::JumpIfGe => {
                    let target = self.operand_u32(method, offset)?;
                    let b = self.pop_int()?;
                    let a = self.pop_int()?;
                    let taken = match op {
                        OpCode::JumpIfEq => a == b,
                        OpCode::JumpIfNe => a != b,
                        OpCode::JumpIfLt => a < b,
                        OpCode::JumpIfLe => a <= b,
                        OpCode::JumpIfGt => a > b,
                        _ => a >= b,
                    };
                    if taken {
                        self.jump(target);
                    }
                }

                OpCode::NewArray => {
                    let len = self.pop_int()?;
                    let len = usize::try_from(len)
                        .map_err(|_| invalid(method, offset, "negative array length"))?;
                    self.push(Value::new_array(len))?;
                }
                OpCode::ArrayLoad => {
                    let index = self.pop_int()?;
                    let array = self.pop()?;
                    let cells = array.as_array()?.borrow();
                    let value = cell_index(index, cells.len()).map(|i| cells[i])?;
                    drop(cells);
                    self.push(Value::Int(value))?;
                }
                OpCode::ArrayStore => {
                    let value = self.pop_int()?;
                    let index = self.pop_int()?;
                    let array = self.pop()?;
                    let mut cells = array.as_array()?.borrow_mut();
                    let i = cell_index(index, cells.len())?;
                    cells[i] = value;
                }
                OpCode::Fault => {
                    let index = self.operand_u16(method, offset)? as usize;
                    let message = match self.unit.constants.get(index) {
                        Some(Constant::StringData(bytes)) => String::from_utf8_lossy(bytes).into_owned(),
                        _ => return Err(invalid(method, offset, "fault message is not a string")),
                    };
                    return Err(RuntimeError::BoundsFault { message });
                }

                OpCode::Call => {
                    let callee = self.operand_u16(method, offset)?;
                    let argc = chunk
                        .read_byte(offset + 3)
                        .ok_or_else(|| invalid(method, offset, "truncated operand"))?
                        as usize;
                    let base = self.frames.last().map_or(0, |f| f.base);
                    if self.stack.len() < base + argc {
                        return Err(underflow(method));
                    }
                    let args = self.stack.split_off(self.stack.len() - argc);
                    self.push_frame(MethodId(callee), args)?;
                }
                OpCode::Return => {
                    let value = self.pop()?;
                    if let Some(result) = self.pop_frame(Some(value))? {
                        return Ok(Some(result));
                    }
                }
                OpCode::ReturnVoid => {
                    self.pop_frame(None)?;
                    if self.frames.is_empty() {
                        return Ok(None);
                    }
                }

                OpCode::Print => {
                    let value = self.pop_int()?;
                    writeln!(self.output, "{value}")?;
                }
                OpCode::ReadInt => {
                    let line = self.read_line()?;
                    let value = line.trim().parse::<i32>().map_err(|_| RuntimeError::InvalidInput {
                        input: line.trim().to_string(),
                        expected: PrimitiveKind::Integer,
                    })?;
                    self.push(Value::Int(value))?;
                }
                OpCode::ReadBool => {
                    let line = self.read_line()?;
                    let value = line.trim().eq_ignore_ascii_case("true");
                    self.push(Value::from(value))?;
                }
            }
        }
    }

    fn push_frame(&mut self, id: MethodId, args: Vec<Value>) -> Result<()> {
        if self.frames.len() >= self.config.max_call_depth {
            return Err(RuntimeError::StackOverflow {
                depth: self.frames.len(),
            });
        }
        let method = self.unit.method(id).ok_or_else(|| RuntimeError::MissingEntry {
            name: id.to_string(),
        })?;
        if args.len() != method.params.len() {
            return Err(RuntimeError::InvalidBytecode {
                method: method.name.clone(),
                offset: 0,
                message: format!("expected {} arguments, got {}", method.params.len(), args.len()),
            });
        }
        trace!(method = %method.name, depth = self.frames.len(), "call");

        let mut locals = args;
        let slots = (method.local_count as usize).max(locals.len());
        locals.resize(slots, Value::Int(0));
        self.frames.push(CallFrame {
            method,
            ip: 0,
            locals,
            base: self.stack.len(),
        });
        Ok(())
    }

    /// Leave the current frame. Returns the value when the outermost frame
    /// returns one; otherwise hands it to the caller's stack.
    fn pop_frame(&mut self, value: Option<Value>) -> Result<Option<Value>> {
        let frame = self.frames.pop().ok_or_else(|| RuntimeError::StackUnderflow {
            method: String::from("<none>"),
        })?;
        self.stack.truncate(frame.base);
        if self.frames.is_empty() {
            return Ok(value);
        }
        if let Some(value) = value {
            self.push(value)?;
        }
        Ok(None)
    }

    fn jump(&mut self, target: u32) {
        if let Some(frame) = self.frames.last_mut() {
            frame.ip = target as usize;
        }
    }

    fn push(&mut self, value: Value) -> Result<()> {
        if self.stack.len() >= self.config.max_stack_depth {
            return Err(RuntimeError::StackOverflow {
                depth: self.frames.len(),
            });
        }
        self.stack.push(value);
        Ok(())
    }

    fn pop(&mut self) -> Result<Value> {
        let base = self.frames.last().map_or(0, |f| f.base);
        if self.stack.len() <= base {
            return Err(self.underflow_here());
        }
        self.stack.pop().ok_or_else(|| self.underflow_here())
    }

    fn pop_int(&mut self) -> Result<i32> {
        self.pop()?.as_int()
    }

    fn peek(&self, depth: usize) -> Result<&Value> {
        let base = self.frames.last().map_or(0, |f| f.base);
        let len = self.stack.len();
        if len < base + depth + 1 {
            return Err(self.underflow_here());
        }
        Ok(&self.stack[len - depth - 1])
    }

    fn binary(&mut self, op: impl FnOnce(i32, i32) -> i32) -> Result<()> {
        let b = self.pop_int()?;
        let a = self.pop_int()?;
        self.push(Value::Int(op(a, b)))
    }

    fn local(&mut self, method: &MethodDef, offset: usize, slot: usize) -> Result<&mut Value> {
        self.frames
            .last_mut()
            .and_then(|f| f.locals.get_mut(slot))
            .ok_or_else(|| invalid(method, offset, "local slot out of range"))
    }

    fn push_constant(&mut self, method: &MethodDef, offset: usize, index: usize) -> Result<()> {
        match self.unit.constants.get(index) {
            Some(Constant::Int(v)) => self.push(Value::Int(*v)),
            _ => Err(invalid(method, offset, "constant is not an integer")),
        }
    }

    fn operand_u8(&self, method: &MethodDef, offset: usize) -> Result<u8> {
        method
            .chunk
            .read_byte(offset + 1)
            .ok_or_else(|| invalid(method, offset, "truncated operand"))
    }

    fn operand_u16(&self, method: &MethodDef, offset: usize) -> Result<u16> {
        method
            .chunk
            .read_u16(offset + 1)
            .ok_or_else(|| invalid(method, offset, "truncated operand"))
    }

    fn operand_u32(&self, method: &MethodDef, offset: usize) -> Result<u32> {
        method
            .chunk
            .read_u32(offset + 1)
            .ok_or_else(|| invalid(method, offset, "truncated operand"))
    }

    fn read_line(&mut self) -> Result<String> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(RuntimeError::EndOfInput);
        }
        Ok(line)
    }

    fn underflow_here(&self) -> RuntimeError {
        RuntimeError::StackUnderflow {
            method: self
                .frames
                .last()
                .map_or_else(|| String::from("<none>"), |f| f.method.name.clone()),
        }
    }
}

fn cell_index(index: i32, len: usize) -> Result<usize> {
    usize::try_from(index)
        .ok()
        .filter(|&i| i < len)
        .ok_or_else(|| RuntimeError::BoundsFault {
            message: format!("cell {index} outside backing store of {len} cells"),
        })
}

fn invalid(method: &MethodDef, offset: usize, message: &str) -> RuntimeError {
    RuntimeError::InvalidBytecode {
        method: method.name.clone(),
        offset,
        message: message.to_string(),
    }
}

fn underflow(method: &MethodDef) -> RuntimeError {
    RuntimeError::StackUnderflow {
        method: method.name.clone(),
    }
}

fn accepts(params: &[DataType], args: &[Value]) -> bool {
    params.len() == args.len()
        && params.iter().zip(args).all(|(param, arg)| match (param, arg) {
            (DataType::Primitive(_), Value::Int(_)) => true,
            (DataType::Array(_), Value::Array(_) | Value::Null) => true,
            _ => false,
        })
}
