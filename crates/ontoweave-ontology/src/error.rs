use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("template variable `{key}` is not registered")]
    UnresolvedVariable { key: String },

    #[error("no template variable resolves to `{value}`")]
    NotFound { value: String },
}

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template `{name}` not found")]
    NotFound { name: String },

    #[error("template `{name}` is malformed: {message}")]
    Malformed { name: String, message: String },

    #[error("rank hierarchy has no root among {members:?}")]
    CyclicRankHierarchy { members: Vec<String> },

    #[error("failed to read template `{name}`")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error)]
pub enum OntologyError {
    #[error("ontology `{child}` already has parent `{parent}`")]
    Reparent { child: String, parent: String },

    #[error(
        "cannot infer link variable for `{entity}`: expected one characteristic relationship, found {}{}",
        .candidates.len(),
        list_candidates(.candidates)
    )]
    AmbiguousLink {
        entity: String,
        candidates: Vec<String>,
    },

    #[error("no path from `{from}` to `{to}` while binding `{child}` into `{parent}`")]
    StructuralPath {
        parent: String,
        child: String,
        from: String,
        to: String,
    },

    #[error("term `{term}` is not in the graph of `{entity}`")]
    UnknownTerm { entity: String, term: String },

    #[error("adopt model `{model}` is not in the reference template (adopting into `{entity}`)")]
    UnknownModel { entity: String, model: String },

    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Template(#[from] TemplateError),
}

fn list_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        String::new()
    } else {
        format!(" ({})", candidates.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ambiguous_link_lists_candidates() {
        let err = OntologyError::AmbiguousLink {
            entity: "M".to_string(),
            candidates: vec!["M speed".to_string(), "M torque".to_string()],
        };
        let message = err.to_string();
        assert!(message.contains("found 2"));
        assert!(message.contains("M speed, M torque"));
    }
}
