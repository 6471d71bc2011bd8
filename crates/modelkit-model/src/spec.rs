//! # Type Spec Resolution
//!
//! Turns a model's declared item and return types into [`TypeSpec`]s once,
//! when its handle is built. Calls never look at the declaration again.
//!
//! | Declared as                        | Resolves to           |
//! |------------------------------------|-----------------------|
//! | `serde_json::Value` (any)          | `Unchecked`           |
//! | any type + `SkipValidation`        | `Unchecked`, schema never generated |
//! | any other type                     | `Checked(schema)`     |

use std::fmt;

use modelkit_schema::{Schema, SchemaError, SchemaType};

/// How a model declares one of its two types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Declaration {
    /// Values are checked and constructed against the type's schema.
    #[default]
    Checked,
    /// Values are trusted: the schema engine never sees them.
    SkipValidation,
}

/// Resolved validation behavior for one role.
pub enum TypeSpec<T> {
    /// Validate against this compiled schema.
    Checked(SchemaType<T>),
    /// Accept every value unchanged.
    Unchecked,
}

impl<T: Schema> TypeSpec<T> {
    /// Resolve how values of `T` are validated, as declared.
    ///
    /// # Errors
    ///
    /// Returns `SchemaError` if `T`'s generated schema does not compile.
    pub fn resolve(declaration: Declaration) -> Result<Self, SchemaError> {
        match declaration {
            Declaration::SkipValidation => Ok(Self::Unchecked),
            Declaration::Checked => {
                let schema = SchemaType::<T>::derive()?;
                if schema.is_unconstrained() {
                    Ok(Self::Unchecked)
                } else {
                    Ok(Self::Checked(schema))
                }
            }
        }
    }
}

impl<T> TypeSpec<T> {
    /// True if values for this role are validated.
    pub fn is_checked(&self) -> bool {
        matches!(self, Self::Checked(_))
    }

    /// The compiled schema, when checked.
    pub fn schema(&self) -> Option<&SchemaType<T>> {
        match self {
            Self::Checked(schema) => Some(schema),
            Self::Unchecked => None,
        }
    }
}

impl<T> fmt::Debug for TypeSpec<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Checked(schema) => f.debug_tuple("Checked").field(&schema.name()).finish(),
            Self::Unchecked => write!(f, "Unchecked"),
        }
    }
}

/// Resolve the item and return specs of a model in one step.
pub fn resolve<I: Schema, R: Schema>(
    item: Declaration,
    ret: Declaration,
) -> Result<(TypeSpec<I>, TypeSpec<R>), SchemaError> {
    Ok((TypeSpec::resolve(item)?, TypeSpec::resolve(ret)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemars::JsonSchema;
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize, JsonSchema)]
    struct Example {
        data: String,
    }

    #[test]
    fn concrete_type_is_checked() {
        let spec = TypeSpec::<Example>::resolve(Declaration::Checked).unwrap();
        assert!(spec.is_checked());
        assert_eq!(spec.schema().map(|s| s.name()), Some("Example"));
        assert_eq!(format!("{spec:?}"), r#"Checked("Example")"#);
    }

    #[test]
    fn any_is_unchecked() {
        let spec = TypeSpec::<Value>::resolve(Declaration::Checked).unwrap();
        assert!(!spec.is_checked());
        assert!(spec.schema().is_none());
    }

    #[test]
    fn skip_validation_is_unchecked() {
        let spec = TypeSpec::<Example>::resolve(Declaration::SkipValidation).unwrap();
        assert!(!spec.is_checked());
        assert_eq!(format!("{spec:?}"), "Unchecked");
    }

    #[test]
    fn roles_resolve_independently() {
        let (item, ret) =
            resolve::<Example, Example>(Declaration::Checked, Declaration::SkipValidation).unwrap();
        assert!(item.is_checked());
        assert!(!ret.is_checked());
    }

    #[test]
    fn default_declaration_is_checked() {
        assert_eq!(Declaration::default(), Declaration::Checked);
    }
}
