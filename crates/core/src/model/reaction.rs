use std::fmt;

use thiserror::Error;

/// Shown by the hint action when a reaction carries no notes.
pub const NO_HINT_TEXT: &str = "No hints available.";

/// Shown in the details panel when a reaction carries no notes.
pub const NO_NOTES_TEXT: &str = "No additional notes.";

//
// ─── FIELDS ────────────────────────────────────────────────────────────────────
//

/// Columns of the question source, in their canonical order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionField {
    ElementA,
    ElementB,
    Products,
    ReactionType,
    Conditions,
    ReactionEquation,
    Notes,
}

impl ReactionField {
    /// Fields every row must provide.
    pub const REQUIRED: [ReactionField; 5] = [
        ReactionField::ElementA,
        ReactionField::ElementB,
        ReactionField::Products,
        ReactionField::ReactionType,
        ReactionField::Conditions,
    ];

    /// Header name used by the tabular source.
    #[must_use]
    pub fn column(self) -> &'static str {
        match self {
            ReactionField::ElementA => "Element A",
            ReactionField::ElementB => "Element B",
            ReactionField::Products => "Products",
            ReactionField::ReactionType => "Reaction Type",
            ReactionField::Conditions => "Conditions",
            ReactionField::ReactionEquation => "Reaction Equation",
            ReactionField::Notes => "Notes",
        }
    }
}

impl fmt::Display for ReactionField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ReactionError {
    #[error("required field `{0}` is missing or blank")]
    MissingField(ReactionField),
}

//
// ─── DRAFT ─────────────────────────────────────────────────────────────────────
//

/// Unvalidated reaction as read from a source row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReactionDraft {
    pub element_a: String,
    pub element_b: String,
    pub products: String,
    pub reaction_type: String,
    pub conditions: String,
    pub reaction_equation: Option<String>,
    pub notes: Option<String>,
}

impl ReactionDraft {
    /// Check required fields and normalize optional ones.
    ///
    /// Required values keep their original text; blank optional values become `None`.
    ///
    /// # Errors
    ///
    /// Returns `ReactionError::MissingField` for the first required field that is blank.
    pub fn validate(self) -> Result<ReactionRecord, ReactionError> {
        let required = [
            (ReactionField::ElementA, &self.element_a),
            (ReactionField::ElementB, &self.element_b),
            (ReactionField::Products, &self.products),
            (ReactionField::ReactionType, &self.reaction_type),
            (ReactionField::Conditions, &self.conditions),
        ];
        if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(ReactionError::MissingField(*field));
        }

        Ok(ReactionRecord {
            element_a: self.element_a,
            element_b: self.element_b,
            products: self.products,
            reaction_type: self.reaction_type,
            conditions: self.conditions,
            reaction_equation: normalize_optional(self.reaction_equation),
            notes: normalize_optional(self.notes),
        })
    }
}

//
// ─── RECORD ────────────────────────────────────────────────────────────────────
//

/// One validated row of the question bank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionRecord {
    element_a: String,
    element_b: String,
    products: String,
    reaction_type: String,
    conditions: String,
    reaction_equation: Option<String>,
    notes: Option<String>,
}

impl ReactionRecord {
    #[must_use]
    pub fn element_a(&self) -> &str {
        &self.element_a
    }

    #[must_use]
    pub fn element_b(&self) -> &str {
        &self.element_b
    }

    #[must_use]
    pub fn products(&self) -> &str {
        &self.products
    }

    #[must_use]
    pub fn reaction_type(&self) -> &str {
        &self.reaction_type
    }

    #[must_use]
    pub fn conditions(&self) -> &str {
        &self.conditions
    }

    #[must_use]
    pub fn reaction_equation(&self) -> Option<&str> {
        self.reaction_equation.as_deref()
    }

    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// The question shown to the player, e.g. `H2 + O2 = ?`.
    #[must_use]
    pub fn prompt(&self) -> String {
        format!("{} + {} = ?", self.element_a.trim(), self.element_b.trim())
    }

    /// Notes used as a hint, falling back to [`NO_HINT_TEXT`].
    #[must_use]
    pub fn hint(&self) -> &str {
        self.notes().unwrap_or(NO_HINT_TEXT)
    }

    #[must_use]
    pub fn details(&self) -> ReactionDetails {
        ReactionDetails {
            equation: self.reaction_equation.clone().unwrap_or_default(),
            reaction_type: self.reaction_type.clone(),
            conditions: self.conditions.clone(),
            notes: self
                .notes
                .clone()
                .unwrap_or_else(|| NO_NOTES_TEXT.to_owned()),
        }
    }
}

/// Reference information revealed on request for the active reaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReactionDetails {
    pub equation: String,
    pub reaction_type: String,
    pub conditions: String,
    pub notes: String,
}

impl ReactionDetails {
    /// Plain-text rendering, one `Label: value` line per field.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ReactionDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reaction Equation: {}", self.equation)?;
        writeln!(f, "Reaction Type: {}", self.reaction_type)?;
        writeln!(f, "Conditions: {}", self.conditions)?;
        write!(f, "Notes: {}", self.notes)
    }
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value.filter(|val| !val.trim().is_empty())
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> ReactionDraft {
        ReactionDraft {
            element_a: "H2".into(),
            element_b: "O2".into(),
            products: "H2O".into(),
            reaction_type: "Synthesis".into(),
            conditions: "Spark".into(),
            reaction_equation: Some("2H2 + O2 -> 2H2O".into()),
            notes: Some("Highly exothermic".into()),
        }
    }

    #[test]
    fn valid_draft_becomes_record() {
        let record = draft().validate().unwrap();
        assert_eq!(record.prompt(), "H2 + O2 = ?");
        assert_eq!(record.hint(), "Highly exothermic");
        assert_eq!(record.reaction_equation(), Some("2H2 + O2 -> 2H2O"));
    }

    #[test]
    fn blank_required_field_is_rejected() {
        let mut d = draft();
        d.conditions = "   ".into();
        let err = d.validate().unwrap_err();
        assert_eq!(err, ReactionError::MissingField(ReactionField::Conditions));
        assert_eq!(
            err.to_string(),
            "required field `Conditions` is missing or blank"
        );
    }

    #[test]
    fn first_missing_field_is_reported() {
        let d = ReactionDraft::default();
        assert_eq!(
            d.validate().unwrap_err(),
            ReactionError::MissingField(ReactionField::ElementA)
        );
    }

    #[test]
    fn blank_optional_fields_fall_back() {
        let mut d = draft();
        d.notes = Some("  ".into());
        d.reaction_equation = None;
        let record = d.validate().unwrap();

        assert_eq!(record.notes(), None);
        assert_eq!(record.hint(), NO_HINT_TEXT);

        let details = record.details();
        assert_eq!(details.equation, "");
        assert_eq!(details.notes, NO_NOTES_TEXT);
    }

    #[test]
    fn details_render_as_plain_lines() {
        let details = draft().validate().unwrap().details();
        assert_eq!(
            details.to_plain_text(),
            "Reaction Equation: 2H2 + O2 -> 2H2O\n\
             Reaction Type: Synthesis\n\
             Conditions: Spark\n\
             Notes: Highly exothermic"
        );
    }

    #[test]
    fn required_columns_match_headers() {
        let columns: Vec<_> = ReactionField::REQUIRED.iter().map(|f| f.column()).collect();
        assert_eq!(
            columns,
            ["Element A", "Element B", "Products", "Reaction Type", "Conditions"]
        );
    }
}
