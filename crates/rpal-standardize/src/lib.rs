//! Rewrites an AST into the standardized tree (ST): a restricted vocabulary
//! of application (`gamma`), abstraction (`lambda`), conditional (`->`),
//! tuple (`tau`), and recursion (`rec` via `Y*`).
//!
//! The walk is bottom-up: children are standardized and reconstructed
//! before the parent's own label is inspected.

pub mod error;

use error::StandardizeError;
use rpal_tree::Tree;

type SResult<T> = Result<T, StandardizeError>;

pub fn standardize(tree: Tree) -> SResult<Tree> {
    let label = tree.label.clone();
    let value = tree.value.clone();
    let mut children = Vec::with_capacity(tree.children.len());
    for child in tree.children {
        children.push(standardize(child)?);
    }

    match label.as_str() {
        "let" => rewrite_let_or_where("let", children),
        "where" => rewrite_let_or_where("where", children),
        "fcn_form" => rewrite_fcn_form(children),
        "lambda" => rewrite_lambda(children),
        "within" => rewrite_within(children),
        "and" => rewrite_and(children),
        "@" => rewrite_at(children),
        "rec" => rewrite_rec(children),
        _ => Ok(Tree {
            label,
            value,
            children,
        }),
    }
}

/// `let`/`where`: 2 children, one labelled `=` with 2 children (var, expr);
/// the other is the body. `gamma( lambda(var, body), expr )`.
fn rewrite_let_or_where(label: &str, mut children: Vec<Tree>) -> SResult<Tree> {
    if children.len() != 2 {
        return Err(StandardizeError::WrongArity {
            label: label.to_string(),
            expected: "2".to_string(),
            found: children.len(),
        });
    }
    let (eq_node, body) = if children[0].label == "=" {
        let body = children.remove(1);
        let eq = children.remove(0);
        (eq, body)
    } else if children[1].label == "=" {
        let eq = children.remove(1);
        let body = children.remove(0);
        (eq, body)
    } else {
        return Err(StandardizeError::MissingEqChild {
            label: label.to_string(),
        });
    };
    let (var, expr) = eq_pair(&label, eq_node)?;
    Ok(Tree::internal(
        "gamma",
        vec![Tree::internal("lambda", vec![var, body]), expr],
    ))
}

/// Pull `(var, expr)` out of an `=` node, checking arity.
fn eq_pair(context: &str, mut eq_node: Tree) -> SResult<(Tree, Tree)> {
    if eq_node.label != "=" || eq_node.children.len() != 2 {
        return Err(StandardizeError::MalformedEqChild {
            label: context.to_string(),
            found: eq_node.children.len(),
        });
    }
    let expr = eq_node.children.pop().unwrap();
    let var = eq_node.children.pop().unwrap();
    Ok((var, expr))
}

/// `fcn_form`: `name v1 v2 … vn expr` (≥3 children) →
/// `=( name, lambda(v1, lambda(v2, … lambda(vn, expr))) )`.
fn rewrite_fcn_form(mut children: Vec<Tree>) -> SResult<Tree> {
    if children.len() < 3 {
        return Err(StandardizeError::WrongArity {
            label: "fcn_form".to_string(),
            expected: ">= 3".to_string(),
            found: children.len(),
        });
    }
    let expr = children.pop().unwrap();
    let name = children.remove(0);
    let curried = fold_curried_lambda(children, expr);
    Ok(Tree::internal("=", vec![name, curried]))
}

/// `lambda` with more than one parameter (`fn v1 v2 … vn . expr`):
/// right-fold into curried single-parameter lambdas, one per `Vb`. A `Vb`
/// is itself either a plain identifier, a `,`-list (tuple destructuring),
/// or `()` (empty pattern) — each becomes its own curry level unchanged.
/// A lambda with exactly one parameter needs no folding, whichever of
/// those three forms that parameter takes.
fn rewrite_lambda(mut children: Vec<Tree>) -> SResult<Tree> {
    if children.len() > 2 {
        let expr = children.pop().unwrap();
        Ok(fold_curried_lambda(children, expr))
    } else {
        Ok(Tree::internal("lambda", children))
    }
}

/// Right-fold `v1, v2, …, vn` and a body into `lambda(v1, lambda(v2, …))`.
fn fold_curried_lambda(params: Vec<Tree>, body: Tree) -> Tree {
    params
        .into_iter()
        .rev()
        .fold(body, |acc, param| Tree::internal("lambda", vec![param, acc]))
}

/// `within`: 2 `=` children `=(x1,e1)` and `=(x2,e2)` →
/// `=( x2, gamma( lambda(x1, e2), e1 ) )`.
fn rewrite_within(mut children: Vec<Tree>) -> SResult<Tree> {
    if children.len() != 2 {
        return Err(StandardizeError::WrongArity {
            label: "within".to_string(),
            expected: "2".to_string(),
            found: children.len(),
        });
    }
    let eq2 = children.pop().unwrap();
    let eq1 = children.pop().unwrap();
    let (x1, e1) = eq_pair("within", eq1)?;
    let (x2, e2) = eq_pair("within", eq2)?;
    Ok(Tree::internal(
        "=",
        vec![x2, Tree::internal("gamma", vec![Tree::internal("lambda", vec![x1, e2]), e1])],
    ))
}

/// `and`: n `=` children, each `=(xi, ei)` →
/// `=( ,(x1,…,xn), tau(e1,…,en) )`.
fn rewrite_and(children: Vec<Tree>) -> SResult<Tree> {
    if children.is_empty() {
        return Err(StandardizeError::WrongArity {
            label: "and".to_string(),
            expected: ">= 1".to_string(),
            found: 0,
        });
    }
    let mut xs = Vec::with_capacity(children.len());
    let mut es = Vec::with_capacity(children.len());
    for child in children {
        let (x, e) = eq_pair("and", child)?;
        xs.push(x);
        es.push(e);
    }
    Ok(Tree::internal(
        "=",
        vec![Tree::internal(",", xs), Tree::internal("tau", es)],
    ))
}

/// `@`: 3 children `a n r` (`n` is the operator identifier) →
/// `gamma( gamma(n, a), r )`.
fn rewrite_at(mut children: Vec<Tree>) -> SResult<Tree> {
    if children.len() != 3 {
        return Err(StandardizeError::WrongArity {
            label: "@".to_string(),
            expected: "3".to_string(),
            found: children.len(),
        });
    }
    let r = children.pop().unwrap();
    let n = children.pop().unwrap();
    let a = children.pop().unwrap();
    Ok(Tree::internal(
        "gamma",
        vec![Tree::internal("gamma", vec![n, a]), r],
    ))
}

/// `rec`: one `=` child `=(x, e)` → `=( x, gamma(Y*, lambda(x, e)) )`.
fn rewrite_rec(mut children: Vec<Tree>) -> SResult<Tree> {
    if children.len() != 1 {
        return Err(StandardizeError::WrongArity {
            label: "rec".to_string(),
            expected: "1".to_string(),
            found: children.len(),
        });
    }
    let eq = children.pop().unwrap();
    let (x, e) = eq_pair("rec", eq)?;
    Ok(Tree::internal(
        "=",
        vec![
            x.clone(),
            Tree::internal(
                "gamma",
                vec![Tree::leaf("identifier", "Y*"), Tree::internal("lambda", vec![x, e])],
            ),
        ],
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(name: &str) -> Tree {
        Tree::leaf("identifier", name)
    }
    fn int(n: &str) -> Tree {
        Tree::leaf("integer", n)
    }

    #[test]
    fn let_becomes_gamma_lambda() {
        // let x = 1 in x
        let eq = Tree::internal("=", vec![ident("x"), int("1")]);
        let let_node = Tree::internal("let", vec![eq, ident("x")]);
        let st = standardize(let_node).unwrap();
        assert_eq!(st.label, "gamma");
        assert_eq!(st.children[0].label, "lambda");
        assert_eq!(st.children[0].children[0].value(), Some("x"));
        assert_eq!(st.children[1].value(), Some("1"));
    }

    #[test]
    fn fcn_form_curries_params() {
        // f x y = x  =>  =(f, lambda(x, lambda(y, x)))
        let fcn = Tree::internal(
            "fcn_form",
            vec![ident("f"), ident("x"), ident("y"), ident("x")],
        );
        let st = standardize(fcn).unwrap();
        assert_eq!(st.label, "=");
        assert_eq!(st.children[0].value(), Some("f"));
        let lam1 = &st.children[1];
        assert_eq!(lam1.label, "lambda");
        assert_eq!(lam1.children[0].value(), Some("x"));
        let lam2 = &lam1.children[1];
        assert_eq!(lam2.label, "lambda");
        assert_eq!(lam2.children[0].value(), Some("y"));
    }

    #[test]
    fn rec_installs_y_star() {
        let eq = Tree::internal("=", vec![ident("f"), ident("f")]);
        let rec = Tree::internal("rec", vec![eq]);
        let st = standardize(rec).unwrap();
        assert_eq!(st.label, "=");
        assert_eq!(st.children[0].value(), Some("f"));
        let gamma = &st.children[1];
        assert_eq!(gamma.label, "gamma");
        assert_eq!(gamma.children[0].value(), Some("Y*"));
        assert_eq!(gamma.children[1].label, "lambda");
    }

    #[test]
    fn and_collects_simultaneous_defs() {
        let eq1 = Tree::internal("=", vec![ident("a"), int("1")]);
        let eq2 = Tree::internal("=", vec![ident("b"), int("2")]);
        let and = Tree::internal("and", vec![eq1, eq2]);
        let st = standardize(and).unwrap();
        assert_eq!(st.label, "=");
        assert_eq!(st.children[0].label, ",");
        assert_eq!(st.children[0].children.len(), 2);
        assert_eq!(st.children[1].label, "tau");
    }

    #[test]
    fn within_chains_two_defs() {
        let eq1 = Tree::internal("=", vec![ident("x1"), int("1")]);
        let eq2 = Tree::internal("=", vec![ident("x2"), ident("x1")]);
        let within = Tree::internal("within", vec![eq1, eq2]);
        let st = standardize(within).unwrap();
        assert_eq!(st.label, "=");
        assert_eq!(st.children[0].value(), Some("x2"));
        assert_eq!(st.children[1].label, "gamma");
    }

    #[test]
    fn single_tuple_destructuring_param_is_untouched() {
        let pattern = Tree::internal(",", vec![ident("x"), ident("y")]);
        let lam = Tree::internal("lambda", vec![pattern, ident("x")]);
        let st = standardize(lam).unwrap();
        assert_eq!(st.label, "lambda");
        assert_eq!(st.children[0].label, ",");
    }

    #[test]
    fn multi_vb_lambda_curries_each_param_including_a_tuple_pattern() {
        // fn (x,y) z . x
        let pattern = Tree::internal(",", vec![ident("x"), ident("y")]);
        let lam = Tree::internal("lambda", vec![pattern, ident("z"), ident("x")]);
        let st = standardize(lam).unwrap();
        assert_eq!(st.label, "lambda");
        assert_eq!(st.children[0].label, ",");
        let inner = &st.children[1];
        assert_eq!(inner.label, "lambda");
        assert_eq!(inner.children[0].value(), Some("z"));
    }

    #[test]
    fn standardization_is_idempotent_on_st_only_trees() {
        let eq = Tree::internal("=", vec![ident("x"), int("1")]);
        let let_node = Tree::internal("let", vec![eq, ident("x")]);
        let once = standardize(let_node).unwrap();
        let twice = standardize(once.clone()).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn malformed_let_reports_missing_eq_child() {
        let bad = Tree::internal("let", vec![ident("x"), ident("y")]);
        let err = standardize(bad).unwrap_err();
        assert_eq!(
            err,
            StandardizeError::MissingEqChild {
                label: "let".to_string()
            }
        );
    }
}
