//! String-addressed access to single parameter leaves.
//!
//! Categories and keys are the JSON field names of the tree. Mutation goes
//! through the serde_json projection and back through the typed tree, so a
//! value of the wrong shape is rejected instead of corrupting state.

use serde_json::Value;

use super::adaptive::AdaptiveParameters;
use crate::errors::ParamsError;

impl AdaptiveParameters {
    /// Read one parameter group, or one leaf when `key` is given.
    pub fn get_value(&self, category: &str, key: Option<&str>) -> Result<Value, ParamsError> {
        let root = self.to_json()?;
        let group = root
            .get(category)
            .ok_or_else(|| ParamsError::UnknownCategory {
                name: category.to_string(),
            })?;
        match key {
            None => Ok(group.clone()),
            Some(key) => group
                .get(key)
                .cloned()
                .ok_or_else(|| ParamsError::UnknownField {
                    category: category.to_string(),
                    name: key.to_string(),
                }),
        }
    }

    /// Replace one leaf value. The category and key must already exist; the
    /// new value must deserialize into the leaf's type.
    pub fn set_value(
        &mut self,
        category: &str,
        key: &str,
        value: Value,
    ) -> Result<(), ParamsError> {
        let mut root = self.to_json()?;
        let group = root
            .get_mut(category)
            .ok_or_else(|| ParamsError::UnknownCategory {
                name: category.to_string(),
            })?;
        let leaf = group
            .get_mut(key)
            .ok_or_else(|| ParamsError::UnknownField {
                category: category.to_string(),
                name: key.to_string(),
            })?;
        *leaf = value;

        *self = serde_json::from_value(root).map_err(|e| ParamsError::InvalidValue {
            field: format!("{category}.{key}"),
            message: e.to_string(),
        })?;
        Ok(())
    }

    fn to_json(&self) -> Result<Value, ParamsError> {
        serde_json::to_value(self).map_err(|e| ParamsError::Serialize {
            message: e.to_string(),
        })
    }
}
