//! Configuration access port trait.

use crate::domain::error::SigtraderError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;

    /// `default` when the key is absent; `ConfigInvalid` when it is present
    /// but not a number.
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, SigtraderError> {
        match self.get_string(section, key) {
            None => Ok(default),
            Some(raw) => raw.parse().map_err(|_| SigtraderError::ConfigInvalid {
                section: section.to_string(),
                key: key.to_string(),
                reason: format!("'{raw}' is not a number"),
            }),
        }
    }
}
