//! Instance identifier validation.
//!
//! The instance number is the only request value interpolated into a shell
//! command, so it must be a plain integer inside the configured range.

use std::fmt;

/// Errors raised while validating an instance identifier.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    #[error("only numbers are acceptable!")]
    NotANumber,

    #[error("top-server only has {from}-{to} instance")]
    OutOfRange { from: u32, to: u32 },

    #[error("empty instance range: {from} > {to}")]
    EmptyRange { from: u32, to: u32 },
}

/// A validated instance number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InstanceId(u32);

impl InstanceId {
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Inclusive range of addressable instances.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceRange {
    from: u32,
    to: u32,
}

impl InstanceRange {
    pub fn new(from: u32, to: u32) -> Result<Self, InstanceError> {
        if from > to {
            return Err(InstanceError::EmptyRange { from, to });
        }
        Ok(Self { from, to })
    }

    pub fn contains(&self, n: i64) -> bool {
        n >= i64::from(self.from) && n <= i64::from(self.to)
    }

    /// Parse and range-check a raw query value.
    pub fn validate(&self, raw: Option<&str>) -> Result<InstanceId, InstanceError> {
        let n: i64 = raw
            .map(str::trim)
            .ok_or(InstanceError::NotANumber)?
            .parse()
            .map_err(|_| InstanceError::NotANumber)?;

        if !self.contains(n) {
            return Err(InstanceError::OutOfRange {
                from: self.from,
                to: self.to,
            });
        }

        // In range, so it fits in u32.
        Ok(InstanceId(n as u32))
    }

    /// Every instance in the range, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = InstanceId> {
        (self.from..=self.to).map(InstanceId)
    }
}
