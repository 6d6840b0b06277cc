use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use strum::{EnumIter, IntoEnumIterator};

/// Periodic report forms the locator searches for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumIter)]
#[serde(try_from = "String", into = "String")]
pub enum FormType {
    Form10K,
    Form10Q,
}

impl TryFrom<String> for FormType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        FormType::from_str(&s)
    }
}

impl From<FormType> for String {
    fn from(form: FormType) -> Self {
        form.to_string()
    }
}

impl fmt::Display for FormType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormType::Form10K => write!(f, "10-K"),
            FormType::Form10Q => write!(f, "10-Q"),
        }
    }
}

pub static FORM_TYPES: Lazy<String> = Lazy::new(|| {
    FormType::iter()
        .map(|t| t.to_string())
        .collect::<Vec<_>>()
        .join(", ")
});

impl FormType {
    pub fn list_types() -> &'static str {
        &FORM_TYPES
    }
}

impl FromStr for FormType {
    type Err = String;

    // Amendments ("10-K/A") count as their base form.
    fn from_str(s: &str) -> Result<FormType, String> {
        let upper = s.trim().to_uppercase();
        let base = upper.strip_suffix("/A").unwrap_or(&upper);
        match base {
            "10-K" => Ok(FormType::Form10K),
            "10-Q" => Ok(FormType::Form10Q),
            _ => Err(format!(
                "unsupported form type {:?}, expected one of {}",
                s,
                FormType::list_types()
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_base_and_amended_forms() {
        assert_eq!("10-K".parse::<FormType>(), Ok(FormType::Form10K));
        assert_eq!("10-q".parse::<FormType>(), Ok(FormType::Form10Q));
        assert_eq!("10-K/A".parse::<FormType>(), Ok(FormType::Form10K));
        assert!("8-K".parse::<FormType>().is_err());
    }

    #[test]
    fn lists_types_in_declaration_order() {
        assert_eq!(FormType::list_types(), "10-K, 10-Q");
    }
}
