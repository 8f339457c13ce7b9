//! Thin aggregator over the RPAL pipeline crates: bundles `rpal-tree`,
//! `rpal-lexer`, `rpal-parser`, `rpal-standardize`, `rpal-compile`, and
//! `rpal-vm` behind a single dependency for consumers.
//!
//! `run_source` threads a source string through lex → parse → standardize
//! → compile → evaluate and writes everything `Print` emitted to the given
//! sink, so callers (the CLI, integration tests) never touch the real
//! `stdout` directly unless they choose to.

pub use rpal_compile as compile;
pub use rpal_lexer as lexer;
pub use rpal_parser as parser;
pub use rpal_standardize as standardize;
pub use rpal_tree as tree;
pub use rpal_vm as vm;

use std::fmt::Write as _;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RpalError {
    #[error(transparent)]
    Parse(#[from] rpal_parser::error::ParseError),
    #[error(transparent)]
    Standardize(#[from] rpal_standardize::error::StandardizeError),
    #[error(transparent)]
    Compile(#[from] rpal_compile::error::CompileError),
    #[error(transparent)]
    Eval(#[from] rpal_vm::error::VmError),
}

/// Run the full pipeline over `source`, returning everything `Print`ed in
/// program-emission order. A stage error aborts immediately with no
/// partial output beyond whatever `Print`s already ran.
pub fn run_source(source: &str) -> Result<String, RpalError> {
    let ast = rpal_parser::parse(source)?;
    let st = rpal_standardize::standardize(ast)?;
    let family = rpal_compile::compile(&st)?;
    let output = rpal_vm::run(&family)?;
    Ok(output)
}

/// Same pipeline, but appends the `Print`ed output to an arbitrary sink
/// instead of returning an owned `String` — used by the CLI so output can
/// be written straight to `stdout` as it streams in, once evaluation
/// finishes (the evaluator itself buffers internally; see `rpal-vm`).
pub fn run_into(source: &str, out: &mut impl std::fmt::Write) -> Result<(), RpalError> {
    let rendered = run_source(source)?;
    write!(out, "{rendered}").expect("writing to an in-memory sink cannot fail");
    Ok(())
}

/// Pipeline stage outputs useful to a caller that wants more than just the
/// printed text — e.g. the CLI's `-visualize` flag, which needs the AST
/// and/or ST trees alongside the normal evaluation result.
pub struct Pipeline {
    pub ast: rpal_tree::Tree,
    pub st: rpal_tree::Tree,
    pub control_structures: rpal_compile::CsFamily,
}

impl Pipeline {
    /// Run lex → parse → standardize → compile, stopping short of
    /// evaluation so a caller can inspect the intermediate trees.
    pub fn build(source: &str) -> Result<Self, RpalError> {
        let ast = rpal_parser::parse(source)?;
        let st = rpal_standardize::standardize(ast.clone())?;
        let control_structures = rpal_compile::compile(&st)?;
        Ok(Pipeline {
            ast,
            st,
            control_structures,
        })
    }

    pub fn evaluate(&self) -> Result<String, RpalError> {
        Ok(rpal_vm::run(&self.control_structures)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_source_executes_the_full_pipeline() {
        assert_eq!(run_source("let x = 3 + 4 * 2 in Print x").unwrap(), "11\n");
    }

    #[test]
    fn run_source_surfaces_parse_errors() {
        let err = run_source("let x = in x").unwrap_err();
        assert!(matches!(err, RpalError::Parse(_)));
    }

    #[test]
    fn run_source_surfaces_lookup_errors() {
        let err = run_source("Print undefined_name").unwrap_err();
        assert!(matches!(err, RpalError::Eval(_)));
    }

    #[test]
    fn pipeline_exposes_intermediate_trees() {
        let pipeline = Pipeline::build("let x = 1 in Print x").unwrap();
        assert_eq!(pipeline.ast.label, "let");
        assert_eq!(pipeline.st.label, "gamma");
        assert_eq!(pipeline.evaluate().unwrap(), "1\n");
    }
}
