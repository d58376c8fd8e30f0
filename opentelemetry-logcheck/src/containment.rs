//! Resolution of a set of attribute predicates against the attribute scopes
//! of one log.
use crate::attribute::AttributePredicate;
use crate::error::{MatchError, MatchResult};
use crate::scope::AttributeScope;
use crate::value::{normalize, AttributeValue};
use opentelemetry::otel_debug;

/// Returns whether every predicate is satisfied by a distinct attribute of
/// `scopes`.
///
/// Scopes are scanned in the given order, and every attribute retires at
/// most the first still-pending predicate it satisfies. Scanning stops as
/// soon as no predicate is pending, so later attributes and scopes are never
/// read. Any error from normalizing an attribute value or from evaluating a
/// predicate aborts the whole check.
pub fn contains<S: AttributeScope>(predicates: &[AttributePredicate], scopes: &[S]) -> MatchResult {
    // pending predicates live in `pending[..live]`
    let mut pending: Vec<&AttributePredicate> = predicates.iter().collect();
    let mut live = pending.len();

    for (index, scope) in scopes.iter().enumerate() {
        if live == 0 {
            break;
        }
        for (name, value) in scope.attributes() {
            let value = normalize(value)?;
            let Some(matched) = first_match(&pending[..live], &name, &value)? else {
                continue;
            };
            pending.swap(matched, live - 1);
            live -= 1;
            if live == 0 {
                otel_debug!(
                    name: "AttributeContainment.ShortCircuit",
                    scope_index = index,
                    skipped_scopes = scopes.len() - index - 1
                );
                break;
            }
        }
    }

    Ok(live == 0)
}

fn first_match(
    pending: &[&AttributePredicate],
    name: &str,
    value: &AttributeValue,
) -> Result<Option<usize>, MatchError> {
    for (index, predicate) in pending.iter().enumerate() {
        if predicate.matches(name, value)? {
            return Ok(Some(index));
        }
    }
    Ok(None)
}
