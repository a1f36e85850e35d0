use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::catalog::Parameters;
use crate::error::{IntegrityError, Result};

static SPACES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(,?)\s+").unwrap());
static SIGNATURE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(?P<name>[^(\s][^(]*)\((?P<params>[^()]*)\)$").unwrap());

/// Drop whitespace except a single space after each comma:
/// `"Array.prototype.map ( callbackfn [ , thisArg ] )"` → `"Array.prototype.map(callbackfn[, thisArg])"`.
pub fn compact(title: &str) -> String {
    SPACES_RE
        .replace_all(title.trim(), |caps: &Captures| {
            if caps[1].is_empty() {
                String::new()
            } else {
                ", ".to_string()
            }
        })
        .into_owned()
}

pub fn looks_like_signature(title: &str) -> bool {
    SIGNATURE_RE.is_match(&compact(title))
}

/// Parse `Name(a, b, [c, [d]], ...rest)` into `("Name()", arity)`.
pub fn parse_signature(title: &str) -> Result<(String, Parameters)> {
    let compacted = compact(title);
    let caps = SIGNATURE_RE
        .captures(&compacted)
        .ok_or_else(|| IntegrityError::BadSignature(title.to_string()))?;
    let name = &caps["name"];
    let params = &caps["params"];

    let total = if params.is_empty() {
        0
    } else {
        params.split(',').count()
    };
    let optional = params.matches('[').count();
    let rest_at = params.find("...");
    let rest = rest_at.is_some();
    // `[ ...args ]` is already counted once as optional.
    let bare_rest = rest_at.is_some_and(|at| {
        let before = &params[..at];
        before.matches('[').count() == before.matches(']').count()
    });

    let required = total
        .checked_sub(optional + usize::from(bare_rest))
        .ok_or_else(|| IntegrityError::BadSignature(title.to_string()))?;

    Ok((
        format!("{}()", name),
        Parameters {
            required,
            optional,
            rest,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn arity(title: &str) -> (usize, usize, bool) {
        let (_, p) = parse_signature(title).unwrap();
        (p.required, p.optional, p.rest)
    }

    #[test]
    fn required_and_optional() {
        assert_eq!(arity("Name(a, b, [c])"), (2, 1, false));
        assert_eq!(arity("Array.prototype.map ( callbackfn [ , thisArg ] )"), (1, 1, false));
    }

    #[test]
    fn nested_optional() {
        assert_eq!(arity("Date.UTC ( year [ , month [ , date ] ] )"), (1, 2, false));
    }

    #[test]
    fn rest_only() {
        assert_eq!(arity("Name(...args)"), (0, 0, true));
        assert_eq!(arity("Array.prototype.splice ( start, deleteCount, ...items )"), (2, 0, true));
    }

    #[test]
    fn bracketed_rest_counts_as_optional_once() {
        assert_eq!(arity("f ( [ ...args ] )"), (0, 1, true));
        assert_eq!(arity("f ( a [ , ...rest ] )"), (1, 1, true));
    }

    #[test]
    fn no_parameters() {
        let (name, p) = parse_signature("Array.prototype.keys ( )").unwrap();
        assert_eq!(name, "Array.prototype.keys()");
        assert_eq!(p, Parameters::default());
    }

    #[test]
    fn normalizes_name() {
        let (name, _) = parse_signature("%IteratorPrototype% [ @@iterator ] ( )").unwrap();
        assert_eq!(name, "%IteratorPrototype%[@@iterator]()");
    }

    #[test]
    fn elided_constructor_parameters_are_rest() {
        let (name, p) = parse_signature("Array ( . . . )").unwrap();
        assert_eq!(name, "Array()");
        assert!(p.rest);
    }

    #[test]
    fn rejects_non_signatures() {
        for title in ["Math.PI", "get Map.prototype.size", "(x)", "f(a)(b)"] {
            assert_eq!(
                parse_signature(title),
                Err(IntegrityError::BadSignature(title.to_string())),
                "{}",
                title
            );
            assert!(!looks_like_signature(title));
        }
    }

    #[test]
    fn compact_keeps_space_after_comma_only() {
        assert_eq!(compact("f ( a ,  b )"), "f(a, b)");
    }
}
