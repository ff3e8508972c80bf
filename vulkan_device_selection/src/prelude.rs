use std::fmt::Display;

use crate::device_selection::Rejection;

pub type VulkanResult<T> = Result<T, VulkanError>;

/// Rejections collected while scanning candidate devices, one per device.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Rejections(pub Vec<Rejection>);

impl Display for Rejections {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.is_empty() {
            return write!(f, "no vulkan capable device has been reported by the driver");
        }

        for (index, rejection) in self.0.iter().enumerate() {
            if index > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{rejection}")?;
        }

        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FrameworkError {
    #[error("memory allocation failed while enumerating {0}")]
    MallocFail(&'static str),
    #[error("no suitable device found: {0}")]
    NoSuitableDeviceFound(Rejections),
    #[error("the selected device has no queue family supporting graphics operations")]
    MissingGraphicsQueueFamily,
    #[error("the selected device has no queue family able to present to the surface")]
    MissingPresentQueueFamily,
    #[error("invalid user input: {0}")]
    UserInput(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VulkanError {
    #[error("Framework error: {0}")]
    Framework(#[from] FrameworkError),
    #[error("Vulkan error enumerating {what}: {result}")]
    Enumeration {
        what: &'static str,
        result: ash::vk::Result,
    },
    #[error("Vulkan error querying {what}: {result}")]
    Query {
        what: &'static str,
        result: ash::vk::Result,
    },
    #[error("Vulkan error creating the logical device: {0}")]
    DeviceCreation(ash::vk::Result),
}

/// Symbolic error codes handed to an [`crate::device_selection::ErrorSink`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    NoSuitableDevice,
    MissingGraphicsQueueFamily,
    MissingPresentQueueFamily,
    LogicalDeviceCreationFailed,
    /// A driver enumeration or query failed, device extension enumeration included.
    EnumerationFailed,
    AllocationFailed,
    InvalidConfiguration,
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::NoSuitableDevice => write!(f, "NoSuitableDevice"),
            ErrorCode::MissingGraphicsQueueFamily => write!(f, "MissingGraphicsQueueFamily"),
            ErrorCode::MissingPresentQueueFamily => write!(f, "MissingPresentQueueFamily"),
            ErrorCode::LogicalDeviceCreationFailed => write!(f, "LogicalDeviceCreationFailed"),
            ErrorCode::EnumerationFailed => write!(f, "EnumerationFailed"),
            ErrorCode::AllocationFailed => write!(f, "AllocationFailed"),
            ErrorCode::InvalidConfiguration => write!(f, "InvalidConfiguration"),
        }
    }
}

impl VulkanError {
    pub fn code(&self) -> ErrorCode {
        match self {
            VulkanError::Framework(error) => match error {
                FrameworkError::MallocFail(_) => ErrorCode::AllocationFailed,
                FrameworkError::NoSuitableDeviceFound(_) => ErrorCode::NoSuitableDevice,
                FrameworkError::MissingGraphicsQueueFamily => {
                    ErrorCode::MissingGraphicsQueueFamily
                }
                FrameworkError::MissingPresentQueueFamily => ErrorCode::MissingPresentQueueFamily,
                FrameworkError::UserInput(_) => ErrorCode::InvalidConfiguration,
            },
            VulkanError::Enumeration { .. } | VulkanError::Query { .. } => {
                ErrorCode::EnumerationFailed
            }
            VulkanError::DeviceCreation(_) => ErrorCode::LogicalDeviceCreationFailed,
        }
    }
}
