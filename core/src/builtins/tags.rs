//! Lowering tags on ambient functions.
//!
//! - `@syscall NAME`: one interop call.
//! - `@operation MNEMONIC [OPERAND]`, repeatable: an inline operation
//!   sequence. Jump operands are offsets relative to the jump itself; an
//!   offset landing just past the last operation targets a trailing `noop`.

use num_bigint::BigInt;
use tracing::trace;

use crate::compiler::object::invoker;
use crate::compiler::{CompileError, CompileTimeObject, Compiler};
use crate::ops::{Integer, JumpKind, Operation, Ops, StackItemType};
use crate::syntax::{FunctionDecl, Tagged};
use crate::{Vec, format, vec};

/// The callable object for an ambient function with lowering tags, or `None`
/// when it has none.
pub fn function_object<'a>(
    compiler: &'a Compiler<'a>,
    function: &'a FunctionDecl<'a>,
) -> Result<Option<CompileTimeObject<'a>>, CompileError> {
    let template = if let Some(tag) = function.tag("syscall") {
        OperationTemplate {
            steps: vec![Step::Op(Operation::Syscall(tag.text.trim()))],
        }
    } else if function.has_tag("operation") {
        OperationTemplate::parse(compiler, function)?
    } else {
        return Ok(None);
    };
    trace!(function = function.name, steps = template.len(), "Registered function");

    let call = invoker(move |invocation| {
        let mut ops = invocation.args_reversed()?;
        ops.extend(template.instantiate(compiler));
        Ok(CompileTimeObject::new(ops))
    });
    Ok(Some(
        CompileTimeObject::declared(function, function.symbol, Vec::new()).with_call(call),
    ))
}

#[derive(Debug, Clone, PartialEq)]
enum Step<'a> {
    Op(Operation<'a>),
    /// Jump to the step at this absolute index.
    Jump { kind: JumpKind, target: usize },
}

/// A validated operation sequence that is instantiated afresh for every
/// call, so each call site owns its jump targets.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationTemplate<'a> {
    steps: Vec<Step<'a>>,
}

impl<'a> OperationTemplate<'a> {
    /// Reads every `@operation` tag of `function`, in order.
    pub fn parse(
        compiler: &'a Compiler<'a>,
        function: &'a FunctionDecl<'a>,
    ) -> Result<Self, CompileError> {
        let mut steps = Vec::new();
        for (index, tag) in function
            .tags
            .iter()
            .filter(|tag| tag.name == "operation")
            .enumerate()
        {
            let invalid = |reason: &str| {
                CompileError::invalid_argument(
                    function,
                    &format!("@operation {}: {}", tag.text.trim(), reason),
                )
            };
            let mut words = tag.text.split_whitespace();
            let mnemonic = words.next().ok_or_else(|| invalid("missing mnemonic"))?;
            let operand = words.next();
            if words.next().is_some() {
                return Err(invalid("too many operands"));
            }
            let step = parse_step(compiler, index, mnemonic, operand).map_err(invalid)?;
            steps.push(step);
        }

        let len = steps.len();
        for step in &steps {
            if let Step::Jump { target, .. } = step {
                match steps.get(*target) {
                    None if *target == len => {}
                    None => {
                        return Err(CompileError::invalid_argument(
                            function,
                            "jump offset out of range",
                        ));
                    }
                    Some(Step::Jump { .. }) => {
                        return Err(CompileError::invalid_argument(
                            function,
                            "jump target must not be another jump",
                        ));
                    }
                    Some(Step::Op(_)) => {}
                }
            }
        }
        Ok(OperationTemplate { steps })
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Fresh operations for one call site.
    pub fn instantiate(&self, compiler: &'a Compiler<'a>) -> Ops<'a> {
        let end = compiler.noop();
        let mut slots: Vec<Option<&'a Operation<'a>>> = self
            .steps
            .iter()
            .map(|step| match step {
                Step::Op(op) => Some(compiler.op(*op)),
                Step::Jump { .. } => None,
            })
            .collect();
        let mut uses_end = false;
        for (index, step) in self.steps.iter().enumerate() {
            if let Step::Jump { kind, target } = step {
                let landing = slots.get(*target).copied().flatten().unwrap_or_else(|| {
                    uses_end = true;
                    end
                });
                slots[index] = Some(compiler.jump(*kind, landing));
            }
        }
        let mut ops: Ops<'a> = slots.into_iter().flatten().collect();
        if uses_end {
            ops.push(end);
        }
        ops
    }
}

fn parse_step<'a>(
    compiler: &'a Compiler<'a>,
    index: usize,
    mnemonic: &'a str,
    operand: Option<&'a str>,
) -> Result<Step<'a>, &'static str> {
    let mnemonic_lower = mnemonic.to_ascii_lowercase();
    let needs_operand = || operand.ok_or("missing operand");

    if let Some(kind) = jump_kind(&mnemonic_lower) {
        let offset: i64 = needs_operand()?.parse().map_err(|_| "invalid jump offset")?;
        let target = i64::try_from(index)
            .ok()
            .and_then(|index| index.checked_add(offset))
            .and_then(|target| usize::try_from(target).ok())
            .ok_or("jump offset out of range")?;
        return Ok(Step::Jump { kind, target });
    }

    let op = match mnemonic_lower.as_str() {
        "pushint" => {
            let value: BigInt = needs_operand()?.parse().map_err(|_| "invalid integer")?;
            Operation::PushInt(Integer::new(compiler.arena(), &value))
        }
        "pushdata" => {
            let text = needs_operand()?;
            let bytes = match text.strip_prefix("0x") {
                Some(digits) => hex::decode(digits).map_err(|_| "invalid hex data")?,
                None => text.as_bytes().to_vec(),
            };
            Operation::PushData(compiler.arena().alloc_slice_copy(&bytes))
        }
        "pushbool" => match needs_operand()? {
            "true" => Operation::PushBool(true),
            "false" => Operation::PushBool(false),
            _ => return Err("invalid boolean"),
        },
        "syscall" => Operation::Syscall(needs_operand()?),
        "convert" => Operation::Convert(
            stack_item_type(needs_operand()?).ok_or("unknown stack item type")?,
        ),
        other => {
            if operand.is_some() {
                return Err("unexpected operand");
            }
            simple_operation(other).ok_or("unknown mnemonic")?
        }
    };
    Ok(Step::Op(op))
}

fn jump_kind(mnemonic: &str) -> Option<JumpKind> {
    Some(match mnemonic {
        "jump" => JumpKind::Always,
        "jumpif" => JumpKind::If,
        "jumpifnot" => JumpKind::IfNot,
        "jumpeq" => JumpKind::Eq,
        "jumpne" => JumpKind::Ne,
        "jumpgt" => JumpKind::Gt,
        "jumpge" => JumpKind::Ge,
        "jumplt" => JumpKind::Lt,
        "jumple" => JumpKind::Le,
        _ => return None,
    })
}

fn stack_item_type(name: &str) -> Option<StackItemType> {
    Some(match name.to_ascii_lowercase().as_str() {
        "any" => StackItemType::Any,
        "pointer" => StackItemType::Pointer,
        "boolean" => StackItemType::Boolean,
        "integer" => StackItemType::Integer,
        "bytestring" => StackItemType::ByteString,
        "buffer" => StackItemType::Buffer,
        "array" => StackItemType::Array,
        "struct" => StackItemType::Struct,
        "map" => StackItemType::Map,
        "interopinterface" => StackItemType::InteropInterface,
        _ => return None,
    })
}

/// Operand-free operations, by mnemonic. `return` is deliberately absent:
/// inline sequences must fall through to the caller.
fn simple_operation<'a>(mnemonic: &str) -> Option<Operation<'a>> {
    Some(match mnemonic {
        "pushnull" => Operation::PushNull,
        "noop" => Operation::Noop,
        "throw" => Operation::Throw,
        "duplicate" | "dup" => Operation::Duplicate,
        "drop" => Operation::Drop,
        "swap" => Operation::Swap,
        "rot" => Operation::Rot,
        "isnull" => Operation::IsNull,
        "size" => Operation::Size,
        "pickitem" => Operation::PickItem,
        "setitem" => Operation::SetItem,
        "haskey" => Operation::HasKey,
        "packarray" | "pack" => Operation::PackArray,
        "packmap" => Operation::PackMap,
        "concat" | "cat" => Operation::Concat,
        "add" => Operation::Add,
        "subtract" | "sub" => Operation::Subtract,
        "multiply" | "mul" => Operation::Multiply,
        "divide" | "div" => Operation::Divide,
        "modulo" | "mod" => Operation::Modulo,
        "power" | "pow" => Operation::Power,
        "shiftleft" | "shl" => Operation::ShiftLeft,
        "shiftright" | "shr" => Operation::ShiftRight,
        "and" => Operation::And,
        "or" => Operation::Or,
        "xor" => Operation::Xor,
        "equal" => Operation::Equal,
        "notequal" => Operation::NotEqual,
        "lessthan" | "lt" => Operation::LessThan,
        "lessthanorequal" | "le" => Operation::LessThanOrEqual,
        "greaterthan" | "gt" => Operation::GreaterThan,
        "greaterthanorequal" | "ge" => Operation::GreaterThanOrEqual,
        "not" => Operation::Not,
        "negate" => Operation::Negate,
        "invert" => Operation::Invert,
        "increment" | "inc" => Operation::Increment,
        "decrement" | "dec" => Operation::Decrement,
        _ => return None,
    })
}
