use std::str::FromStr;

use crate::error::RwError;

/// Maximum profile description length, counted in characters.
pub const MAX_DESCRIPTION_LENGTH: usize = 250;

#[derive(Clone, Debug, Default, Eq, PartialEq, serde::Serialize)]
#[serde(transparent)]
pub struct Description(String);

impl Description {
    /// Wrap a description read back from storage, which enforces the same bound.
    pub fn valid(description: String) -> Self {
        Self(description)
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Description {
    type Error = RwError;

    fn try_from(description: String) -> Result<Self, Self::Error> {
        if description.chars().count() > MAX_DESCRIPTION_LENGTH {
            return Err(RwError::DescriptionTooLong);
        }
        Ok(Self(description))
    }
}

impl FromStr for Description {
    type Err = RwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.to_string().try_into()
    }
}

impl AsRef<str> for Description {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}
