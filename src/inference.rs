use crate::error::{InsightError, Result};
use crate::schema::{ColumnRef, ColumnRoleMap, Role};
use log::debug;

/// Roles in evaluation order with their keywords in priority order.
/// A header belongs to the first role with a keyword contained in it.
pub const ROLE_KEYWORDS: &[(Role, &[&str])] = &[
    (Role::Product, &["product", "item", "description", "particular"]),
    (Role::Revenue, &["amount", "total", "value", "net", "price"]),
    (Role::Date, &["date", "time"]),
    (Role::Quantity, &["qty", "quantity", "units", "nos"]),
];

/// Lowercases and drops whitespace and punctuation: `"Txn. Date"` -> `"txndate"`.
pub fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The role a single header would be classified as, with the keyword that matched.
pub fn classify_header(header: &str) -> Option<(Role, &'static str)> {
    let normalized = normalize_header(header);
    ROLE_KEYWORDS.iter().find_map(|(role, keywords)| {
        keywords
            .iter()
            .find(|keyword| normalized.contains(*keyword))
            .map(|keyword| (*role, *keyword))
    })
}

/// Maps headers to semantic roles.
///
/// Each header gets at most one role. When several headers share a role,
/// the first in file order wins and the rest are ignored.
pub fn infer_column_roles(headers: &[String]) -> Result<ColumnRoleMap> {
    let mut product = None;
    let mut revenue = None;
    let mut date = None;
    let mut quantity = None;

    for (index, header) in headers.iter().enumerate() {
        let Some((role, keyword)) = classify_header(header) else {
            continue;
        };

        let slot = match role {
            Role::Product => &mut product,
            Role::Revenue => &mut revenue,
            Role::Date => &mut date,
            Role::Quantity => &mut quantity,
        };

        if slot.is_none() {
            debug!(
                "Column '{}' (#{}) inferred as {} via keyword '{}'",
                header,
                index,
                role.as_str(),
                keyword
            );
            *slot = Some(ColumnRef {
                header: header.clone(),
                index,
                matched_keyword: keyword.to_string(),
            });
        }
    }

    let revenue = revenue.ok_or_else(|| InsightError::SchemaInference {
        headers: headers.to_vec(),
    })?;

    Ok(ColumnRoleMap {
        product,
        revenue,
        date,
        quantity,
    })
}
