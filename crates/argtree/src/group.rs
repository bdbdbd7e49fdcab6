//! Argument group constraints.

use crate::error::{ErrorKind, GroupViolation};
use crate::tree::{ArgumentGroup, CommandNode, GroupMember, Restriction};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Outcome {
    satisfied: bool,
    /// At least one member was given.
    engaged: bool,
}

/// Check every group of `node` against the arguments for which `present`
/// returns `true`, returning one error per violated group.
///
/// Nested groups are evaluated first. A nested group counts as given to its
/// parent when it is satisfied and at least one of its own members was given.
/// A nested group none of whose members were given leaves the decision to its
/// parent; top-level groups always report.
pub fn evaluate(node: &CommandNode, present: impl Fn(&str) -> bool) -> Vec<ErrorKind> {
    let mut errors = Vec::new();
    for group in node.groups() {
        check(group, node, &present, true, &mut errors);
    }
    errors
}

fn check(
    group: &ArgumentGroup,
    node: &CommandNode,
    present: &dyn Fn(&str) -> bool,
    top_level: bool,
    errors: &mut Vec<ErrorKind>,
) -> Outcome {
    let mut labels = Vec::with_capacity(group.members().len());
    let mut given = Vec::new();
    let mut missing = Vec::new();
    let mut engaged = false;

    for member in group.members() {
        let (label, is_given) = match member {
            GroupMember::Argument(name) => {
                let label = node
                    .argument(name)
                    .map(|a| a.display_name())
                    .unwrap_or_else(|| name.clone());
                let is_given = present(name);
                engaged |= is_given;
                (label, is_given)
            }
            GroupMember::Group(inner) => {
                let outcome = check(inner, node, present, false, errors);
                engaged |= outcome.engaged;
                (
                    format!("[{}]", inner.name()),
                    outcome.satisfied && outcome.engaged,
                )
            }
        };
        if is_given {
            given.push(label.clone());
        } else {
            missing.push(label.clone());
        }
        labels.push(label);
    }

    let violation = match group.restriction() {
        Restriction::None => None,
        Restriction::ExactlyOne => match given.len() {
            0 => Some(GroupViolation::NoneSatisfied),
            1 => None,
            _ => Some(GroupViolation::MultipleSatisfied { present: given }),
        },
        Restriction::AtLeastOne if given.is_empty() => Some(GroupViolation::NoneSatisfied),
        Restriction::AtLeastOne => None,
        Restriction::All if missing.is_empty() => None,
        Restriction::All => Some(GroupViolation::MissingMembers { missing }),
    };

    let satisfied = violation.is_none();
    if let Some(violation) = violation {
        if top_level || engaged {
            tracing::debug!(group = group.name(), "group constraint violated");
            errors.push(ErrorKind::GroupConstraintViolated {
                group: group.name().to_string(),
                restriction: group.restriction(),
                violation,
                members: labels,
            });
        }
    }

    Outcome { satisfied, engaged }
}
