//! Filling the form from a JSON draft.

use anyhow::{bail, Context};

use signup::forms::schema::{default_tech_row, TECHS};
use signup::forms::{FormState, RawValue};

/// Writes every field of `draft` into `form`.
///
/// `techs` rows start from the default row, so a row may omit keys. Files
/// cannot be part of a draft and are attached separately.
pub fn fill(form: &mut FormState, draft: serde_json::Value) -> anyhow::Result<()> {
    let RawValue::Map(fields) = RawValue::from_json(draft) else {
        bail!("the draft must be a JSON object");
    };

    for (name, value) in fields {
        if name != TECHS {
            form.set_field(&name, value)
                .with_context(|| format!("draft field '{name}'"))?;
            continue;
        }

        let rows = match value {
            RawValue::List(rows) => rows,
            RawValue::Null => Vec::new(),
            other => bail!("'techs' must be a list, found {}", other.type_name()),
        };
        let techs = form.array_mut(TECHS).context("the form has no technology list")?;
        for (index, row) in rows.into_iter().enumerate() {
            let RawValue::Map(row) = row else {
                bail!("technology {index} must be an object");
            };
            let mut entry = default_tech_row();
            entry.extend(row);
            techs.append(entry);
        }
    }
    Ok(())
}
