//! Assembly emission. The parser drives these functions statement by
//! statement; expressions and conditions arrive as trees and are folded
//! into lines of assembly text.

use crate::ast::{BinOp, CmpOp, Cond, Expr, Index, PrintArg};
use crate::error::SyntaxError;
use splvm::{constants, pack_text};
use std::collections::HashMap;

/// Per-compilation state: the register allocator, the declared types and
/// array shapes, the accumulated data section and the fresh-name counters.
pub struct CompilationUnit {
    reg_start: u32,
    reg_end: u32,
    next_reg: u32,
    var_map: HashMap<String, u32>,
    type_table: Vec<(String, Vec<String>)>,
    array_dims: HashMap<String, Vec<i64>>,
    pub data_section: Vec<String>,
    label_count: u32,
    temp_count: u32,
}

impl Default for CompilationUnit {
    fn default() -> CompilationUnit {
        CompilationUnit::new()
    }
}

impl CompilationUnit {
    pub fn new() -> CompilationUnit {
        CompilationUnit {
            reg_start: constants::REG_GP_START as u32,
            reg_end: 15,
            next_reg: constants::REG_GP_START as u32,
            var_map: HashMap::new(),
            type_table: Vec::new(),
            array_dims: HashMap::new(),
            data_section: Vec::new(),
            label_count: 0,
            temp_count: 0,
        }
    }

    pub fn reg_start(&self) -> u32 {
        self.reg_start
    }

    /// Stable register of a user variable, allocated on first use.
    pub fn reg_for(&mut self, var: &str) -> u32 {
        if let Some(&reg) = self.var_map.get(var) {
            return reg;
        }
        if self.next_reg > self.reg_end {
            self.next_reg = self.reg_start;
        }
        let reg = self.next_reg;
        self.var_map.insert(var.to_string(), reg);
        self.next_reg += 1;
        reg
    }

    /// Scratch register for an intermediate value; wraps around the
    /// general-purpose window.
    pub fn new_temp(&mut self) -> u32 {
        if self.next_reg > self.reg_end {
            self.next_reg = self.reg_start;
        }
        let reg = self.next_reg;
        self.next_reg += 1;
        self.temp_count += 1;
        reg
    }

    pub fn new_label(&mut self, prefix: &str) -> String {
        self.label_count += 1;
        format!("{}_{}", prefix, self.label_count)
    }

    /// Pins a procedure parameter to the register the call protocol uses.
    pub fn bind_param(&mut self, name: &str, index: u32) {
        self.var_map
            .insert(name.to_string(), self.reg_start + index);
    }

    pub fn declare_type(&mut self, name: &str, fields: Vec<String>) {
        if let Some(entry) = self.type_table.iter_mut().find(|(n, _)| n == name) {
            entry.1 = fields;
        } else {
            self.type_table.push((name.to_string(), fields));
        }
    }

    pub fn type_len(&self, name: &str) -> Option<usize> {
        self.type_table
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, fields)| fields.len())
    }

    /// Offset of `field` in the first declared type that has it.
    pub fn field_offset(&self, field: &str) -> Option<i64> {
        for (_, fields) in &self.type_table {
            if let Some(index) = fields.iter().position(|f| f == field) {
                return Some(index as i64);
            }
        }
        None
    }

    pub fn declare_array(&mut self, name: &str, dims: Vec<i64>) {
        self.array_dims.insert(name.to_string(), dims);
    }

    pub fn dims_of(&self, name: &str) -> Option<&[i64]> {
        self.array_dims.get(name).map(|d| &d[..])
    }

    /// Appends a labelled reservation to the data section.
    pub fn push_data(&mut self, label: &str, values: &str) {
        self.data_section.push(format!("{}:", label));
        self.data_section.push(format!(".data {}", values));
    }
}

fn io_addr() -> u32 {
    constants::IO_RANGE.0
}

/// Emits assembly computing `expr` into `target`.
pub fn generate_expr(
    cu: &mut CompilationUnit,
    expr: &Expr,
    target: u32,
    line: u32,
    out: &mut Vec<String>,
) -> Result<(), SyntaxError> {
    match expr {
        Expr::Num(value) => {
            out.push(format!("ICARGA R{} {}", target, value));
        }
        Expr::Name(name) => {
            let src = cu.reg_for(name);
            if src != target {
                out.push(format!("COPIA R{}, R{}", target, src));
            }
        }
        Expr::MemRef(address) => {
            out.push(format!("CARGA R{}, M[{}]", target, address));
        }
        Expr::MemRefLabel { name, offset } => {
            out.push(format!("CARGA R{}, M[{}+{}]", target, name, offset));
        }
        Expr::MemRefIndirect { name, offset } => {
            let off_temp = cu.new_temp();
            generate_expr(cu, offset, off_temp, line, out)?;
            let base_temp = cu.new_temp();
            out.push(format!("ICARGA R{} {}", base_temp, name));
            out.push(format!("SUMA R{}, R{}", base_temp, off_temp));
            out.push(format!("CARGAIND R{} R{}", target, base_temp));
        }
        Expr::Input => {
            out.push(format!("CARGA R{}, M[{}]", target, io_addr()));
        }
        Expr::UMinus(inner) => {
            generate_expr(cu, inner, target, line, out)?;
            let temp = cu.new_temp();
            out.push(format!("ICARGA R{} -1", temp));
            out.push(format!("MULT R{}, R{}", target, temp));
        }
        Expr::BinOp { op, left, right } => {
            generate_expr(cu, left, target, line, out)?;
            // Constant right operands use the immediate forms.
            if let Expr::Num(value) = **right {
                if fits_i32(value) {
                    let mnemonic = match op {
                        BinOp::Add => "ISUMA",
                        BinOp::Sub => "IRESTA",
                        BinOp::Mul => "IMULT",
                        BinOp::Div => "IDIVI",
                    };
                    out.push(format!("{} R{} {}", mnemonic, target, value));
                    return Ok(());
                }
            }
            let temp = cu.new_temp();
            generate_expr(cu, right, temp, line, out)?;
            let mnemonic = match op {
                BinOp::Add => "SUMA",
                BinOp::Sub => "RESTA",
                BinOp::Mul => "MULT",
                BinOp::Div => "DIVI",
            };
            out.push(format!("{} R{}, R{}", mnemonic, target, temp));
        }
    }
    Ok(())
}

fn fits_i32(value: i64) -> bool {
    value >= i64::from(i32::min_value()) && value <= i64::from(i32::max_value())
}

// Comparison operands that are plain names keep their allocated register;
// everything else is evaluated into a temporary first.
fn cond_operand(
    cu: &mut CompilationUnit,
    expr: &Expr,
    line: u32,
    out: &mut Vec<String>,
) -> Result<u32, SyntaxError> {
    if let Expr::Name(name) = expr {
        return Ok(cu.reg_for(name));
    }
    let temp = cu.new_temp();
    generate_expr(cu, expr, temp, line, out)?;
    Ok(temp)
}

/// Emits branching assembly for `cond`: control reaches `true_label` when
/// the condition holds and `end_label` otherwise.
pub fn generate_cond(
    cu: &mut CompilationUnit,
    cond: &Cond,
    true_label: &str,
    end_label: &str,
    line: u32,
    out: &mut Vec<String>,
) -> Result<(), SyntaxError> {
    match cond {
        Cond::Cmp { left, op, right } => {
            let r_left = cond_operand(cu, left, line, out)?;
            let r_right = cond_operand(cu, right, line, out)?;
            out.push(format!("COMP R{}, R{}", r_left, r_right));
            match op {
                CmpOp::Eq => out.push(format!("SICERO {}", true_label)),
                CmpOp::Ne => out.push(format!("SINCERO {}", true_label)),
                CmpOp::Lt => out.push(format!("SINEG {}", true_label)),
                CmpOp::Le => {
                    out.push(format!("SICERO {}", true_label));
                    out.push(format!("SINEG {}", true_label));
                }
                CmpOp::Gt => out.push(format!("SIPOS {}", true_label)),
                CmpOp::Ge => {
                    out.push(format!("SICERO {}", true_label));
                    out.push(format!("SIPOS {}", true_label));
                }
            }
            out.push(format!("SALTA {}", end_label));
        }
        Cond::And(left, right) => {
            let mid = cu.new_label("and_mid");
            generate_cond(cu, left, &mid, end_label, line, out)?;
            out.push(format!("{}:", mid));
            generate_cond(cu, right, true_label, end_label, line, out)?;
        }
        Cond::Or(left, right) => {
            let cont = cu.new_label("or_cont");
            generate_cond(cu, left, true_label, &cont, line, out)?;
            out.push(format!("{}:", cont));
            generate_cond(cu, right, true_label, end_label, line, out)?;
        }
        Cond::Not(inner) => {
            generate_cond(cu, inner, end_label, true_label, line, out)?;
        }
    }
    Ok(())
}

/// `name = expr` / `name := expr`.
pub fn assign_var(
    cu: &mut CompilationUnit,
    name: &str,
    expr: &Expr,
    line: u32,
    out: &mut Vec<String>,
) -> Result<(), SyntaxError> {
    let target = cu.reg_for(name);
    generate_expr(cu, expr, target, line, out)
}

/// `M[addr] = expr`.
pub fn mem_store(
    cu: &mut CompilationUnit,
    address: u64,
    expr: &Expr,
    line: u32,
    out: &mut Vec<String>,
) -> Result<(), SyntaxError> {
    let temp = cu.new_temp();
    generate_expr(cu, expr, temp, line, out)?;
    out.push(format!("GUARD R{}, M[{}]", temp, address));
    Ok(())
}

// Row-major flattening for constant 2-D indices, with the declaration
// check shared by every 2-D access path.
fn const_2d_offset(
    cu: &CompilationUnit,
    name: &str,
    i: i64,
    j: i64,
    line: u32,
) -> Result<i64, SyntaxError> {
    let cols = columns_of(cu, name, line)?;
    Ok(i * cols + j)
}

fn columns_of(cu: &CompilationUnit, name: &str, line: u32) -> Result<i64, SyntaxError> {
    match cu.dims_of(name) {
        Some(dims) if dims.len() >= 2 => Ok(dims[1]),
        _ => Err(SyntaxError::new(
            format!(
                "Array '{}' used with two indices but not declared as 2-D",
                name
            ),
            line,
        )),
    }
}

/// Folds an indexed reference into the expression variant it lowers to.
pub fn array_ref_expr(
    cu: &mut CompilationUnit,
    name: &str,
    indices: &[Index],
    line: u32,
) -> Result<Expr, SyntaxError> {
    match indices {
        [Index::Const(offset)] => Ok(Expr::MemRefLabel {
            name: name.to_string(),
            offset: *offset,
        }),
        [Index::Dyn(offset)] => Ok(Expr::MemRefIndirect {
            name: name.to_string(),
            offset: Box::new(offset.clone()),
        }),
        [Index::Const(i), Index::Const(j)] => Ok(Expr::MemRefLabel {
            name: name.to_string(),
            offset: const_2d_offset(cu, name, *i, *j, line)?,
        }),
        [first, second] => {
            let cols = columns_of(cu, name, line)?;
            let i = index_expr(first);
            let j = index_expr(second);
            // offset = i * cols + j
            let offset = Expr::BinOp {
                op: BinOp::Add,
                left: Box::new(Expr::BinOp {
                    op: BinOp::Mul,
                    left: Box::new(i),
                    right: Box::new(Expr::Num(cols)),
                }),
                right: Box::new(j),
            };
            Ok(Expr::MemRefIndirect {
                name: name.to_string(),
                offset: Box::new(offset),
            })
        }
        _ => Err(SyntaxError::new(
            format!("Array '{}' used with more than two indices", name),
            line,
        )),
    }
}

fn index_expr(index: &Index) -> Expr {
    match index {
        Index::Const(value) => Expr::Num(*value),
        Index::Dyn(expr) => expr.clone(),
    }
}

/// `name[i] = expr`, `name[i][j] = expr`, for constant and computed indices.
pub fn array_assign(
    cu: &mut CompilationUnit,
    name: &str,
    indices: &[Index],
    value: &Expr,
    line: u32,
    out: &mut Vec<String>,
) -> Result<(), SyntaxError> {
    match array_ref_expr(cu, name, indices, line)? {
        Expr::MemRefLabel { name, offset } => {
            let temp = cu.new_temp();
            generate_expr(cu, value, temp, line, out)?;
            out.push(format!("GUARD R{}, M[{}+{}]", temp, name, offset));
        }
        Expr::MemRefIndirect { name, offset } => {
            let val_temp = cu.new_temp();
            generate_expr(cu, value, val_temp, line, out)?;
            let off_temp = cu.new_temp();
            generate_expr(cu, &offset, off_temp, line, out)?;
            let base_temp = cu.new_temp();
            out.push(format!("ICARGA R{} {}", base_temp, name));
            out.push(format!("SUMA R{}, R{}", base_temp, off_temp));
            out.push(format!("GUARDIND R{} R{}", val_temp, base_temp));
        }
        _ => unreachable!(),
    }
    Ok(())
}

/// `obj.field = expr`.
pub fn field_assign(
    cu: &mut CompilationUnit,
    object: &str,
    field: &str,
    expr: &Expr,
    line: u32,
    out: &mut Vec<String>,
) -> Result<(), SyntaxError> {
    let offset = cu.field_offset(field).ok_or_else(|| {
        SyntaxError::new(
            format!("Unknown field '{}' for variable {}", field, object),
            line,
        )
    })?;
    let temp = cu.new_temp();
    generate_expr(cu, expr, temp, line, out)?;
    out.push(format!("GUARD R{}, M[{}+{}]", temp, object, offset));
    Ok(())
}

/// `print(arg, …)`: strings as packed 8-byte chunks, expressions behind the
/// numeric marker, and a trailing newline.
pub fn print(
    cu: &mut CompilationUnit,
    args: &[PrintArg],
    line: u32,
    out: &mut Vec<String>,
) -> Result<(), SyntaxError> {
    let es = io_addr();

    let mut emit_data_word = |cu: &mut CompilationUnit, out: &mut Vec<String>, value: u64| {
        let label = cu.new_label("str");
        cu.push_data(&label, &value.to_string());
        let temp = cu.new_temp();
        out.push(format!("CARGA R{}, M[{}]", temp, label));
        out.push(format!("GUARD R{}, M[{}]", temp, es));
    };

    for arg in args {
        match arg {
            PrintArg::Str(text) => {
                for chunk in text.as_bytes().chunks(8) {
                    emit_data_word(cu, out, pack_text(chunk));
                }
            }
            PrintArg::Expr(expr) => {
                // The marker makes the observer render the value in decimal.
                emit_data_word(cu, out, constants::IO_NUMERIC_MARKER);
                let temp = cu.new_temp();
                generate_expr(cu, expr, temp, line, out)?;
                out.push(format!("GUARD R{}, M[{}]", temp, es));
            }
        }
    }

    emit_data_word(cu, out, constants::IO_NEWLINE_MARKER);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expr_lines(expr: &Expr) -> Vec<String> {
        let mut cu = CompilationUnit::new();
        let mut out = Vec::new();
        let target = cu.new_temp();
        generate_expr(&mut cu, expr, target, 1, &mut out).unwrap();
        out
    }

    #[test]
    fn constants_load_immediates() {
        assert_eq!(expr_lines(&Expr::Num(375)), vec!["ICARGA R4 375"]);
    }

    #[test]
    fn constant_right_operands_use_immediate_forms() {
        let expr = Expr::BinOp {
            op: BinOp::Sub,
            left: Box::new(Expr::Num(10)),
            right: Box::new(Expr::Num(3)),
        };
        assert_eq!(expr_lines(&expr), vec!["ICARGA R4 10", "IRESTA R4 3"]);
    }

    #[test]
    fn division_lowers_to_idivi() {
        let expr = Expr::BinOp {
            op: BinOp::Div,
            left: Box::new(Expr::Num(84)),
            right: Box::new(Expr::Num(2)),
        };
        assert_eq!(expr_lines(&expr), vec!["ICARGA R4 84", "IDIVI R4 2"]);
    }

    #[test]
    fn variable_registers_are_stable() {
        let mut cu = CompilationUnit::new();
        assert_eq!(cu.reg_for("a"), 4);
        assert_eq!(cu.reg_for("b"), 5);
        assert_eq!(cu.reg_for("a"), 4);
    }

    #[test]
    fn temp_registers_wrap_around() {
        let mut cu = CompilationUnit::new();
        for _ in 0..12 {
            cu.new_temp();
        }
        // The window is R4..R15; the 13th temporary wraps.
        assert_eq!(cu.new_temp(), 4);
    }

    #[test]
    fn labels_are_fresh() {
        let mut cu = CompilationUnit::new();
        assert_eq!(cu.new_label("loop"), "loop_1");
        assert_eq!(cu.new_label("end"), "end_2");
    }

    #[test]
    fn two_d_access_requires_a_declaration() {
        let mut cu = CompilationUnit::new();
        let indices = [Index::Const(1), Index::Const(2)];
        assert!(array_ref_expr(&mut cu, "a", &indices, 3).is_err());

        cu.declare_array("a", vec![2, 3]);
        let expr = array_ref_expr(&mut cu, "a", &indices, 3).unwrap();
        assert_eq!(
            expr,
            Expr::MemRefLabel {
                name: "a".to_string(),
                offset: 5
            }
        );
    }

    #[test]
    fn field_offsets_follow_declaration_order() {
        let mut cu = CompilationUnit::new();
        cu.declare_type("Point", vec!["x".to_string(), "y".to_string()]);
        assert_eq!(cu.field_offset("x"), Some(0));
        assert_eq!(cu.field_offset("y"), Some(1));
        assert_eq!(cu.field_offset("z"), None);
    }

    #[test]
    fn condition_lowering_shapes() {
        let mut cu = CompilationUnit::new();
        let mut out = Vec::new();
        let cond = Cond::Cmp {
            left: Expr::Name("a".to_string()),
            op: CmpOp::Le,
            right: Expr::Name("b".to_string()),
        };
        generate_cond(&mut cu, &cond, "v", "f", 1, &mut out).unwrap();
        assert_eq!(
            out,
            vec!["COMP R4, R5", "SICERO v", "SINEG v", "SALTA f"]
        );
    }

    #[test]
    fn not_swaps_the_targets() {
        let mut cu = CompilationUnit::new();
        let mut out = Vec::new();
        let cond = Cond::Not(Box::new(Cond::Cmp {
            left: Expr::Name("a".to_string()),
            op: CmpOp::Eq,
            right: Expr::Num(0),
        }));
        generate_cond(&mut cu, &cond, "v", "f", 1, &mut out).unwrap();
        // The inner compare now jumps to the false target on success.
        assert!(out.contains(&"SICERO f".to_string()));
        assert!(out.contains(&"SALTA v".to_string()));
    }

    #[test]
    fn print_packs_strings_and_appends_a_newline() {
        let mut cu = CompilationUnit::new();
        let mut out = Vec::new();
        print(
            &mut cu,
            &[PrintArg::Str("hi".to_string())],
            1,
            &mut out,
        )
        .unwrap();
        // One chunk plus the newline marker: two data words, two stores.
        assert_eq!(cu.data_section.len(), 4);
        assert_eq!(
            out.iter()
                .filter(|l| l.starts_with("GUARD"))
                .count(),
            2
        );
        let packed = u64::from(b'h') | u64::from(b'i') << 8;
        assert!(cu
            .data_section
            .iter()
            .any(|l| *l == format!(".data {}", packed)));
    }
}
