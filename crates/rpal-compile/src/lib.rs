//! Compiles a standardized tree into the `CS[0..k]` family of control
//! structures consumed by the CSE evaluator.
//!
//! Each control structure is a flat instruction list built by a depth-first
//! walk that *appends* as it descends; the evaluator consumes a control
//! structure back-to-front (`Vec::pop`), so the last instruction appended
//! for a subtree is the first one the machine executes. Emission order —
//! including the order sibling subtrees are appended in — is chosen so the
//! resulting instruction lists are stack-consumable in exactly that order.

pub mod error;

use error::CompileError;
use rpal_tree::Tree;

type CResult<T> = Result<T, CompileError>;

/// One instruction in a control structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CsInstr {
    /// Pushes a closure: the given control structure, bound over the
    /// parameter(s), closed over the environment active when this
    /// instruction executes.
    Lambda { param: LambdaParam, body_cs: usize },
    /// Builds an n-tuple from the top `n` stack values.
    Tau(usize),
    /// Pushes the "then" branch control structure.
    DeltaThen(usize),
    /// Pushes the "else" branch control structure.
    DeltaElse(usize),
    /// Chooses between the two most recently pushed delta closures using a
    /// boolean popped from the stack.
    Beta,
    /// Applies a function value to an argument value.
    Gamma,
    /// A named built-in operator (`+`, `not`, `aug`, `&`, `**`, …).
    Op(String),
    Identifier(String),
    Integer(String),
    Str(String),
    /// The `nil` literal: the empty tuple.
    Nil,
    /// The `dummy` literal.
    DummyLit,
}

/// A lambda's parameter list: either a single bound name, or a tuple
/// pattern destructured at call time (`lambda (x, y). E`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LambdaParam {
    Single(String),
    Tuple(Vec<String>),
}

/// The full `CS[0..k]` family. `CS[0]` is the program's entry point.
#[derive(Debug, Clone, Default)]
pub struct CsFamily {
    control_structures: Vec<Vec<CsInstr>>,
}

impl CsFamily {
    /// Build a `CsFamily` directly from a raw `CS[0..k]` family rather than
    /// via `compile`. Used by evaluator tests that need a control-structure
    /// shape `compile` itself would never emit (e.g. a `Delta` with no
    /// matching `Beta`, to exercise the evaluator's own error path).
    pub fn from_structures_for_test(control_structures: Vec<Vec<CsInstr>>) -> Self {
        CsFamily { control_structures }
    }

    pub fn get(&self, index: usize) -> &[CsInstr] {
        &self.control_structures[index]
    }

    pub fn main(&self) -> &[CsInstr] {
        &self.control_structures[0]
    }

    pub fn len(&self) -> usize {
        self.control_structures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.control_structures.is_empty()
    }
}

/// Binary and unary operator labels the compiler treats as `Op` nodes
/// rather than structural forms (see DESIGN.md for why `&` and `**` are
/// included alongside the arithmetic/relational/tuple operators).
const OPERATORS: &[&str] = &[
    "+", "-", "/", "*", "**", "aug", "neg", "not", "eq", "gr", "ge", "ls", "le", "ne", "or", "&",
];

fn is_operator(label: &str) -> bool {
    OPERATORS.contains(&label)
}

pub fn compile(standardized: &Tree) -> CResult<CsFamily> {
    let mut compiler = Compiler {
        control_structures: Vec::new(),
    };
    let entry = compiler.alloc_cs();
    debug_assert_eq!(entry, 0);
    compiler.compile_into(standardized, 0)?;
    Ok(CsFamily {
        control_structures: compiler.control_structures,
    })
}

struct Compiler {
    control_structures: Vec<Vec<CsInstr>>,
}

impl Compiler {
    fn alloc_cs(&mut self) -> usize {
        let index = self.control_structures.len();
        self.control_structures.push(Vec::new());
        index
    }

    fn emit(&mut self, cs: usize, instr: CsInstr) {
        self.control_structures[cs].push(instr);
    }

    fn compile_into(&mut self, node: &Tree, cs: usize) -> CResult<()> {
        match node.label.as_str() {
            "lambda" => self.compile_lambda(node, cs),
            "tau" => self.compile_tau(node, cs),
            "->" => self.compile_conditional(node, cs),
            label if is_operator(label) => self.compile_operator(node, cs),
            "gamma" => self.compile_gamma(node, cs),
            "identifier" => {
                self.emit(cs, CsInstr::Identifier(leaf_value(node)?));
                Ok(())
            }
            "integer" => {
                self.emit(cs, CsInstr::Integer(leaf_value(node)?));
                Ok(())
            }
            "string" => {
                self.emit(cs, CsInstr::Str(leaf_value(node)?));
                Ok(())
            }
            "nil" => {
                self.emit(cs, CsInstr::Nil);
                Ok(())
            }
            "dummy" => {
                self.emit(cs, CsInstr::DummyLit);
                Ok(())
            }
            other => Err(CompileError::NotStandardized {
                label: other.to_string(),
            }),
        }
    }

    fn compile_lambda(&mut self, node: &Tree, cs: usize) -> CResult<()> {
        if node.children.len() != 2 {
            return Err(CompileError::WrongArity {
                label: "lambda".to_string(),
                expected: "2".to_string(),
                found: node.children.len(),
            });
        }
        let param = if node.children[0].label == "," {
            LambdaParam::Tuple(
                node.children[0]
                    .children
                    .iter()
                    .map(|c| leaf_value(c))
                    .collect::<CResult<Vec<_>>>()?,
            )
        } else if node.children[0].label == "()" {
            LambdaParam::Tuple(Vec::new())
        } else {
            LambdaParam::Single(leaf_value(&node.children[0])?)
        };
        let body_cs = self.alloc_cs();
        self.emit(cs, CsInstr::Lambda { param, body_cs });
        self.compile_into(&node.children[1], body_cs)
    }

    fn compile_tau(&mut self, node: &Tree, cs: usize) -> CResult<()> {
        self.emit(cs, CsInstr::Tau(node.children.len()));
        for child in &node.children {
            self.compile_into(child, cs)?;
        }
        Ok(())
    }

    fn compile_conditional(&mut self, node: &Tree, cs: usize) -> CResult<()> {
        if node.children.len() != 3 {
            return Err(CompileError::WrongArity {
                label: "->".to_string(),
                expected: "3".to_string(),
                found: node.children.len(),
            });
        }
        let then_cs = self.alloc_cs();
        let else_cs = self.alloc_cs();
        self.emit(cs, CsInstr::DeltaThen(then_cs));
        self.emit(cs, CsInstr::DeltaElse(else_cs));
        self.emit(cs, CsInstr::Beta);
        self.compile_into(&node.children[1], then_cs)?;
        self.compile_into(&node.children[2], else_cs)?;
        self.compile_into(&node.children[0], cs)
    }

    fn compile_operator(&mut self, node: &Tree, cs: usize) -> CResult<()> {
        self.emit(cs, CsInstr::Op(node.label.clone()));
        for child in &node.children {
            self.compile_into(child, cs)?;
        }
        Ok(())
    }

    fn compile_gamma(&mut self, node: &Tree, cs: usize) -> CResult<()> {
        self.emit(cs, CsInstr::Gamma);
        for child in &node.children {
            self.compile_into(child, cs)?;
        }
        Ok(())
    }
}

fn leaf_value(node: &Tree) -> CResult<String> {
    node.value()
        .map(str::to_string)
        .ok_or_else(|| CompileError::NotStandardized {
            label: node.label.clone(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(label: &str, value: &str) -> Tree {
        Tree::leaf(label, value)
    }

    #[test]
    fn compiles_single_integer_leaf() {
        let st = leaf("integer", "42");
        let family = compile(&st).unwrap();
        assert_eq!(family.main(), &[CsInstr::Integer("42".to_string())]);
    }

    #[test]
    fn compiles_gamma_application() {
        // gamma(Print, 1)
        let st = Tree::internal("gamma", vec![leaf("identifier", "Print"), leaf("integer", "1")]);
        let family = compile(&st).unwrap();
        assert_eq!(
            family.main(),
            &[
                CsInstr::Gamma,
                CsInstr::Identifier("Print".to_string()),
                CsInstr::Integer("1".to_string()),
            ]
        );
    }

    #[test]
    fn compiles_lambda_into_its_own_control_structure() {
        // lambda(x, x)
        let st = Tree::internal("lambda", vec![leaf("identifier", "x"), leaf("identifier", "x")]);
        let family = compile(&st).unwrap();
        assert_eq!(family.len(), 2);
        match &family.main()[0] {
            CsInstr::Lambda { param, body_cs } => {
                assert_eq!(*param, LambdaParam::Single("x".to_string()));
                assert_eq!(family.get(*body_cs), &[CsInstr::Identifier("x".to_string())]);
            }
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn compiles_tuple_destructuring_lambda() {
        let pattern = Tree::internal(",", vec![leaf("identifier", "x"), leaf("identifier", "y")]);
        let st = Tree::internal("lambda", vec![pattern, leaf("identifier", "x")]);
        let family = compile(&st).unwrap();
        match &family.main()[0] {
            CsInstr::Lambda { param, .. } => {
                assert_eq!(
                    *param,
                    LambdaParam::Tuple(vec!["x".to_string(), "y".to_string()])
                );
            }
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn compiles_empty_tuple_parameter_lambda() {
        // fn () . nil
        let st = Tree::internal("lambda", vec![Tree::bare_leaf("()"), Tree::leaf("nil", "nil")]);
        let family = compile(&st).unwrap();
        match &family.main()[0] {
            CsInstr::Lambda { param, body_cs } => {
                assert_eq!(*param, LambdaParam::Tuple(Vec::new()));
                assert_eq!(family.get(*body_cs), &[CsInstr::Nil]);
            }
            other => panic!("expected Lambda, got {other:?}"),
        }
    }

    #[test]
    fn compiles_nil_and_dummy_literals() {
        assert_eq!(compile(&leaf("nil", "nil")).unwrap().main(), &[CsInstr::Nil]);
        assert_eq!(
            compile(&leaf("dummy", "dummy")).unwrap().main(),
            &[CsInstr::DummyLit]
        );
    }

    #[test]
    fn compiles_conditional_into_three_control_structures() {
        // true -> 1 | 2
        let st = Tree::internal(
            "->",
            vec![leaf("integer", "1"), leaf("integer", "10"), leaf("integer", "20")],
        );
        let family = compile(&st).unwrap();
        assert_eq!(family.len(), 3);
        assert_eq!(
            family.main(),
            &[
                CsInstr::DeltaThen(1),
                CsInstr::DeltaElse(2),
                CsInstr::Beta,
                CsInstr::Integer("1".to_string()),
            ]
        );
        assert_eq!(family.get(1), &[CsInstr::Integer("10".to_string())]);
        assert_eq!(family.get(2), &[CsInstr::Integer("20".to_string())]);
    }

    #[test]
    fn compiles_tau_then_its_elements() {
        let st = Tree::internal("tau", vec![leaf("integer", "1"), leaf("integer", "2")]);
        let family = compile(&st).unwrap();
        assert_eq!(
            family.main(),
            &[
                CsInstr::Tau(2),
                CsInstr::Integer("1".to_string()),
                CsInstr::Integer("2".to_string()),
            ]
        );
    }

    #[test]
    fn rejects_unstandardized_node() {
        let st = Tree::internal("let", vec![]);
        let err = compile(&st).unwrap_err();
        assert_eq!(
            err,
            CompileError::NotStandardized {
                label: "let".to_string()
            }
        );
    }
}
