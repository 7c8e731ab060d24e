use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AllocatorError {
    #[error("An allocator needs at least one arm")]
    NoArms,

    #[error("Arm index {index} is out of range for {arms} arms")]
    ArmOutOfRange { index: usize, arms: usize },

    #[error("Fairness must be within 0..=100, got {0}")]
    InvalidFairness(u8),

    #[error("Invalid arm state: {0}")]
    InvalidArm(String),
}
