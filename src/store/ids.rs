use crate::error::AppError;

/// Strictly increasing ids from 1, never reissued.
#[derive(Debug, Clone, Default)]
pub struct IdAllocator {
    last: u64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_after(last: u64) -> Self {
        Self { last }
    }

    pub fn next(&mut self) -> Result<u64, AppError> {
        self.last = self
            .last
            .checked_add(1)
            .ok_or_else(|| AppError::Internal("identifier space exhausted".to_string()))?;
        Ok(self.last)
    }

    pub fn last_issued(&self) -> Option<u64> {
        (self.last > 0).then_some(self.last)
    }
}
