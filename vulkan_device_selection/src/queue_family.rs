use ash::vk;

use crate::{driver::Driver, enumerate::enumerate_two_call_infallible, prelude::VulkanResult};

/**
 * Queue family indices able to perform graphics operations and presentation.
 *
 * Each field is resolved independently: some devices expose the two capabilities on
 * different families and both have to be opened in that case.
 */
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub struct QueueFamilyIndices {
    graphics_family: Option<u32>,
    present_family: Option<u32>,
}

impl QueueFamilyIndices {
    pub fn new(graphics_family: Option<u32>, present_family: Option<u32>) -> Self {
        Self {
            graphics_family,
            present_family,
        }
    }

    pub fn graphics_family(&self) -> Option<u32> {
        self.graphics_family
    }

    pub fn present_family(&self) -> Option<u32> {
        self.present_family
    }

    pub fn is_complete(&self) -> bool {
        self.graphics_family.is_some() && self.present_family.is_some()
    }

    /**
     * Scans queue families in index order and keeps, for each capability, the first index
     * that provides it. The scan stops as soon as both are known.
     *
     * @param families queue family properties as reported by the driver
     * @param present_support tells if the family at the given index can present to the surface
     */
    pub fn resolve<F>(families: &[vk::QueueFamilyProperties], mut present_support: F) -> Self
    where
        F: FnMut(u32) -> bool,
    {
        let mut indices = Self::default();

        for (family_index, family) in families.iter().enumerate() {
            let family_index = family_index as u32;

            if indices.graphics_family.is_none()
                && family.queue_flags.contains(vk::QueueFlags::GRAPHICS)
            {
                indices.graphics_family = Some(family_index);
            }

            if indices.present_family.is_none() && present_support(family_index) {
                indices.present_family = Some(family_index);
            }

            if indices.is_complete() {
                break;
            }
        }

        indices
    }
}

pub fn queue_family_properties<D: Driver>(
    driver: &D,
    physical_device: vk::PhysicalDevice,
) -> VulkanResult<Vec<vk::QueueFamilyProperties>> {
    enumerate_two_call_infallible("queue families", |count, data| {
        driver.get_queue_family_properties(physical_device, count, data)
    })
}

pub fn find_queue_families<D: Driver>(
    driver: &D,
    physical_device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
) -> VulkanResult<QueueFamilyIndices> {
    let families = queue_family_properties(driver, physical_device)?;

    Ok(QueueFamilyIndices::resolve(families.as_slice(), |family_index| {
        match driver.get_surface_support(physical_device, family_index, surface) {
            Ok(supported) => supported,
            Err(err) => {
                log::warn!(
                    "Present support query failed for queue family {family_index}, treating it as unsupported: {err}"
                );
                false
            }
        }
    }))
}
