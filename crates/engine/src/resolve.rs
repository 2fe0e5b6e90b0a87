//! Variable resolution against an extension's catalog.

use extrelay_types::Variable;

/// Select catalog entries for each requested identifier, in request order.
///
/// For every identifier in `ids`, all catalog entries carrying that
/// identifier are appended in catalog order before the next identifier is
/// considered. Duplicate catalog entries are kept. Identifiers with no match
/// contribute nothing; missing inputs surface later as fetch failures.
pub fn resolve_variables(catalog: &[Variable], ids: &[String]) -> Vec<Variable> {
    ids.iter()
        .flat_map(|id| catalog.iter().filter(move |variable| &variable.variable_id == id))
        .cloned()
        .collect()
}
