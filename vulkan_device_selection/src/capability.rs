use std::ffi::{CStr, CString};

use ash::vk;

use crate::{
    driver::Driver,
    enumerate::enumerate_two_call,
    prelude::{FrameworkError, VulkanError, VulkanResult},
};

/**
 * Device extensions a device must expose to be selected.
 *
 * Names keep the order they were given in, duplicates are dropped keeping the first occurrence.
 */
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequiredExtensionSet {
    names: Vec<CString>,
}

impl RequiredExtensionSet {
    pub fn new<'a, I>(names: I) -> Self
    where
        I: IntoIterator<Item = &'a CStr>,
    {
        let mut set = Self::default();
        for name in names {
            set.insert(name);
        }
        set
    }

    /// Parses extension names given as rust strings, as read from user configuration.
    pub fn from_strings<S: AsRef<str>>(names: &[S]) -> VulkanResult<Self> {
        let mut set = Self::default();
        for name in names.iter() {
            match CString::new(name.as_ref()) {
                Ok(name) => set.insert(name.as_c_str()),
                Err(_) => {
                    return Err(VulkanError::Framework(FrameworkError::UserInput(format!(
                        "extension name {:?} contains a nul byte",
                        name.as_ref()
                    ))))
                }
            }
        }
        Ok(set)
    }

    pub fn insert(&mut self, name: &CStr) {
        if !self.names.iter().any(|present| present.as_c_str() == name) {
            self.names.push(name.to_owned());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &CStr> {
        self.names.iter().map(|name| name.as_c_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Required names that are not part of `available`, in requirement order.
    pub fn missing_from(&self, available: &[CString]) -> Vec<CString> {
        self.iter()
            .filter(|name| !extension_supported(available, name))
            .map(|name| name.to_owned())
            .collect()
    }

    pub(crate) fn as_ptrs(&self) -> Vec<*const std::os::raw::c_char> {
        self.names.iter().map(|name| name.as_ptr()).collect()
    }
}

/// Surface related properties of a (device, surface) pair, valid for a single evaluation.
#[derive(Debug, Clone, Default)]
pub struct SurfaceSupportDetails {
    pub capabilities: vk::SurfaceCapabilitiesKHR,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
}

impl SurfaceSupportDetails {
    pub fn query<D: Driver>(
        driver: &D,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VulkanResult<Self> {
        let capabilities = driver
            .get_surface_capabilities(physical_device, surface)
            .map_err(|result| VulkanError::Query {
                what: "surface capabilities",
                result,
            })?;

        Ok(Self {
            capabilities,
            formats: query_formats(driver, physical_device, surface)?,
            present_modes: query_present_modes(driver, physical_device, surface)?,
        })
    }

    /// At least one color format and one present mode are available.
    pub fn is_swapchain_adequate(&self) -> bool {
        !self.formats.is_empty() && !self.present_modes.is_empty()
    }
}

pub fn list_device_extensions<D: Driver>(
    driver: &D,
    physical_device: vk::PhysicalDevice,
) -> VulkanResult<Vec<CString>> {
    let properties = enumerate_two_call("device extensions", |count, data| {
        driver.enumerate_device_extension_properties(physical_device, count, data)
    })?;

    Ok(properties
        .iter()
        .filter_map(|ext| match ext.extension_name_as_c_str() {
            Ok(name) => Some(name.to_owned()),
            Err(err) => {
                log::warn!("Skipping a device extension with a malformed name: {err}");
                None
            }
        })
        .collect())
}

pub fn extension_supported(available: &[CString], name: &CStr) -> bool {
    available.iter().any(|ext| ext.as_c_str() == name)
}

pub fn query_formats<D: Driver>(
    driver: &D,
    physical_device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> VulkanResult<Vec<vk::SurfaceFormatKHR>> {
    enumerate_two_call("surface formats", |count, data| {
        driver.get_surface_formats(physical_device, surface, count, data)
    })
}

pub fn query_present_modes<D: Driver>(
    driver: &D,
    physical_device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> VulkanResult<Vec<vk::PresentModeKHR>> {
    enumerate_two_call("surface present modes", |count, data| {
        driver.get_surface_present_modes(physical_device, surface, count, data)
    })
}
