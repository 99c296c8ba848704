//! Filter match predicate.

/// The parts of a problem that filter matching looks at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProblemSignature<'a> {
    pub id: u32,
    pub type_name: Option<&'a str>,
    pub arguments: &'a [String],
}

/// Whether a live problem matches the problem stored in a filter.
///
/// Ids must be equal, type names strictly equal (both absent counts as
/// equal) and message arguments equivalent position by position.
#[must_use]
pub fn problems_match(filter: ProblemSignature<'_>, problem: ProblemSignature<'_>) -> bool {
    filter.id == problem.id
        && filter.type_name == problem.type_name
        && arguments_equal(problem.arguments, filter.arguments)
}

/// Positional, length-exact argument comparison.
///
/// Filters recorded in the IDE store simple names while problems found
/// outside of it carry qualified ones, so `a.b.Foo` and `Foo` are equal. Two
/// qualified names or two simple names must match exactly.
#[must_use]
pub fn arguments_equal(problem_args: &[String], filter_args: &[String]) -> bool {
    problem_args.len() == filter_args.len()
        && problem_args
            .iter()
            .zip(filter_args)
            .all(|(p, f)| argument_equal(p, f))
}

fn argument_equal(problem_arg: &str, filter_arg: &str) -> bool {
    if problem_arg == filter_arg {
        return true;
    }
    match (problem_arg.rfind('.'), filter_arg.rfind('.')) {
        (None, Some(idx)) => &filter_arg[idx + 1..] == problem_arg,
        (Some(idx), None) => &problem_arg[idx + 1..] == filter_arg,
        _ => false,
    }
}
