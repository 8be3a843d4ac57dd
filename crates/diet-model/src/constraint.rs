/// Direction of a nutrient-aggregate bound
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bound {
    /// Aggregate must be >= value
    AtLeast,
    /// Aggregate must be <= value
    AtMost,
}

/// An explicit requirement layered on top of the food and nutrient tables.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    /// `Buy[food] == amount`
    Fixed {
        food: String,
        amount: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        label: Option<String>,
    },
    /// `Buy[food] <= amount`
    AtMost {
        food: String,
        amount: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        label: Option<String>,
    },
    /// `sum(content[f][nutrient] * Buy[f]) >= / <= value`
    Nutrient {
        nutrient: String,
        bound: Bound,
        value: f64,
        #[cfg_attr(feature = "serde", serde(default))]
        label: Option<String>,
    },
}

impl Constraint {
    pub fn fixed(food: impl Into<String>, amount: f64) -> Self {
        Constraint::Fixed {
            food: food.into(),
            amount,
            label: None,
        }
    }

    pub fn at_most(food: impl Into<String>, amount: f64) -> Self {
        Constraint::AtMost {
            food: food.into(),
            amount,
            label: None,
        }
    }

    pub fn nutrient(nutrient: impl Into<String>, bound: Bound, value: f64) -> Self {
        Constraint::Nutrient {
            nutrient: nutrient.into(),
            bound,
            value,
            label: None,
        }
    }

    /// Override the row name used in the model
    pub fn labeled(mut self, name: impl Into<String>) -> Self {
        match &mut self {
            Constraint::Fixed { label, .. }
            | Constraint::AtMost { label, .. }
            | Constraint::Nutrient { label, .. } => *label = Some(name.into()),
        }
        self
    }

    /// The food or nutrient identifier this constraint refers to
    pub fn subject(&self) -> &str {
        match self {
            Constraint::Fixed { food, .. } | Constraint::AtMost { food, .. } => food,
            Constraint::Nutrient { nutrient, .. } => nutrient,
        }
    }

    /// Row name in the generated model
    pub fn row_name(&self) -> String {
        match self {
            Constraint::Fixed { food, label, .. } => {
                label.clone().unwrap_or_else(|| format!("{}_fixed", food))
            }
            Constraint::AtMost { food, label, .. } => {
                label.clone().unwrap_or_else(|| format!("{}_max", food))
            }
            Constraint::Nutrient {
                nutrient,
                bound,
                label,
                ..
            } => label.clone().unwrap_or_else(|| match bound {
                Bound::AtLeast => format!("{}_min", nutrient),
                Bound::AtMost => format!("{}_max", nutrient),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_row_names() {
        assert_eq!(Constraint::fixed("BEEF", 3.0).row_name(), "BEEF_fixed");
        assert_eq!(Constraint::at_most("CABB", 5.0).row_name(), "CABB_max");
        assert_eq!(
            Constraint::nutrient("Ene", Bound::AtMost, 2100.0).row_name(),
            "Ene_max"
        );
        assert_eq!(
            Constraint::nutrient("Prot", Bound::AtLeast, 50.0).row_name(),
            "Prot_min"
        );
    }

    #[test]
    fn test_label_overrides_row_name() {
        let c = Constraint::fixed("BEEF", 3.0).labeled("Beef_Requirement");
        assert_eq!(c.row_name(), "Beef_Requirement");
        assert_eq!(c.subject(), "BEEF");
    }
}
