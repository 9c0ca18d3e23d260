//! Selection of the methods that become graph operations.

use tracing::trace;

use crate::descriptor::{MethodDescriptor, Verb};

/// Name fragments reserved for streaming and internal dispatch methods.
pub const RESERVED_NAME_FRAGMENTS: &[&str] = &["Stream", "invoke"];

const QUERY_VERBS: &[Verb] = &[Verb::Get, Verb::Head];
const MUTATION_VERBS: &[Verb] = &[Verb::Post, Verb::Delete, Verb::Put, Verb::Patch, Verb::All];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
}

impl OperationKind {
    pub fn allowed_verbs(self) -> &'static [Verb] {
        match self {
            Self::Query => QUERY_VERBS,
            Self::Mutation => MUTATION_VERBS,
        }
    }

    pub fn allows(self, verb: Verb) -> bool {
        self.allowed_verbs().contains(&verb)
    }
}

/// Why a method was left out of the generated surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    ReservedName,
    VerbNotAllowed,
    /// Only static methods are supported for now.
    InstanceMethod,
}

pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAME_FRAGMENTS.iter().any(|f| name.contains(f))
}

/// Decide whether `method` is eligible for an operation of `kind`.
pub fn check_method(method: &MethodDescriptor, kind: OperationKind) -> Result<(), Exclusion> {
    if is_reserved_name(&method.name) {
        return Err(Exclusion::ReservedName);
    }
    if !kind.allows(method.verb) {
        return Err(Exclusion::VerbNotAllowed);
    }
    if !method.is_static {
        return Err(Exclusion::InstanceMethod);
    }
    Ok(())
}

/// Eligible methods of one model for `kind`, in declaration order.
pub fn eligible_methods<'a>(
    model: &str,
    methods: &'a [MethodDescriptor],
    kind: OperationKind,
) -> Vec<&'a MethodDescriptor> {
    methods
        .iter()
        .filter(|m| match check_method(m, kind) {
            Ok(()) => true,
            Err(reason) => {
                trace!(model, method = %m.name, ?kind, ?reason, "method skipped");
                false
            },
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use {super::*, crate::descriptor::ValueType};

    fn method(name: &str, verb: Verb) -> MethodDescriptor {
        MethodDescriptor::new(name, verb)
            .static_method()
            .returns(ValueType::Json)
    }

    #[test]
    fn query_keeps_get_and_head_only() {
        let methods = vec![
            method("find", Verb::Get),
            method("exists", Verb::Head),
            method("create", Verb::Post),
            method("upsert", Verb::Put),
            method("everything", Verb::All),
        ];
        let names: Vec<_> = eligible_methods("Widget", &methods, OperationKind::Query)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["find", "exists"]);
    }

    #[test]
    fn mutation_keeps_write_verbs_in_declaration_order() {
        let methods = vec![
            method("destroyById", Verb::Delete),
            method("find", Verb::Get),
            method("create", Verb::Post),
            method("patchAttributes", Verb::Patch),
            method("replace", Verb::Put),
            method("any", Verb::All),
        ];
        let names: Vec<_> = eligible_methods("Widget", &methods, OperationKind::Mutation)
            .into_iter()
            .map(|m| m.name.as_str())
            .collect();
        assert_eq!(names, ["destroyById", "create", "patchAttributes", "replace", "any"]);
    }

    #[test]
    fn instance_methods_are_never_eligible() {
        let methods = vec![
            MethodDescriptor::new("updateAttributes", Verb::Put),
            MethodDescriptor::new("getOwner", Verb::Get),
        ];
        assert!(eligible_methods("Widget", &methods, OperationKind::Query).is_empty());
        assert!(eligible_methods("Widget", &methods, OperationKind::Mutation).is_empty());
        assert_eq!(
            check_method(&methods[0], OperationKind::Mutation),
            Err(Exclusion::InstanceMethod)
        );
    }

    #[test]
    fn reserved_names_are_skipped() {
        let methods = vec![
            method("createChangeStream", Verb::Post),
            method("invokeRemote", Verb::Get),
            method("count", Verb::Get),
        ];
        let q = eligible_methods("Widget", &methods, OperationKind::Query);
        assert_eq!(q.len(), 1);
        assert_eq!(q[0].name, "count");
        assert_eq!(
            check_method(&methods[0], OperationKind::Mutation),
            Err(Exclusion::ReservedName)
        );
    }
}
