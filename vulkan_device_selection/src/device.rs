use ash::vk;
use smallvec::SmallVec;

use crate::{
    device_selection::{DeviceRequirements, SelectedDevice},
    driver::Driver,
    prelude::{FrameworkError, VulkanError, VulkanResult},
    queue_family::QueueFamilyIndices,
};

/// Priority of every queue requested at device creation.
pub const DEFAULT_QUEUE_PRIORITY: f32 = 1.0;

/**
 * Queue families to be opened on the logical device.
 *
 * When graphics and presentation are provided by the same family only one queue is requested,
 * as asking for the same family twice in a single device creation is invalid.
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct QueueCreatePlan {
    graphics_family: u32,
    present_family: u32,
}

impl QueueCreatePlan {
    pub fn new(indices: &QueueFamilyIndices) -> VulkanResult<Self> {
        let Some(graphics_family) = indices.graphics_family() else {
            return Err(VulkanError::Framework(
                FrameworkError::MissingGraphicsQueueFamily,
            ));
        };

        let Some(present_family) = indices.present_family() else {
            return Err(VulkanError::Framework(
                FrameworkError::MissingPresentQueueFamily,
            ));
        };

        Ok(Self {
            graphics_family,
            present_family,
        })
    }

    pub fn graphics_family(&self) -> u32 {
        self.graphics_family
    }

    pub fn present_family(&self) -> u32 {
        self.present_family
    }

    /// Distinct families to open, graphics first.
    pub fn families(&self) -> SmallVec<[u32; 2]> {
        let mut families = SmallVec::new();
        families.push(self.graphics_family);
        if self.present_family != self.graphics_family {
            families.push(self.present_family);
        }
        families
    }

    /// One create info per distinct family, each asking for a single queue.
    pub fn create_infos<'a>(
        &self,
        priorities: &'a [f32; 1],
    ) -> SmallVec<[vk::DeviceQueueCreateInfo<'a>; 2]> {
        self.families()
            .into_iter()
            .map(|family_index| {
                vk::DeviceQueueCreateInfo::default()
                    .queue_family_index(family_index)
                    .queue_priorities(priorities)
            })
            .collect()
    }
}

/**
 * The opened logical device and its queues.
 *
 * graphics_queue and present_queue are the same queue when both capabilities come from the
 * same family: queues are owned by the device and must not be released on their own.
 *
 * Dropping the handles does not release the logical device: [`LogicalDeviceHandles::destroy`]
 * must be called with the driver that created it.
 */
#[must_use = "the logical device is only released by LogicalDeviceHandles::destroy"]
pub struct LogicalDeviceHandles<L> {
    device: L,
    graphics_queue: vk::Queue,
    present_queue: vk::Queue,
}

impl<L> LogicalDeviceHandles<L> {
    pub fn device(&self) -> &L {
        &self.device
    }

    pub fn graphics_queue(&self) -> vk::Queue {
        self.graphics_queue
    }

    pub fn present_queue(&self) -> vk::Queue {
        self.present_queue
    }

    pub fn queues_alias(&self) -> bool {
        self.graphics_queue == self.present_queue
    }

    /// Releases the logical device, and with it both queues.
    pub fn destroy<D>(self, driver: &D)
    where
        D: Driver<LogicalDevice = L>,
    {
        driver.destroy_device(self.device)
    }
}

/**
 * Opens the selected physical device.
 *
 * The required extensions and features are enabled and queue 0 is retrieved from the graphics
 * and present families.
 *
 * A selection lacking either queue family is a contract violation and fails before the driver
 * is called.
 */
pub fn create_logical_device<D: Driver>(
    driver: &D,
    selected: &SelectedDevice,
    requirements: &DeviceRequirements,
) -> VulkanResult<LogicalDeviceHandles<D::LogicalDevice>> {
    let plan = QueueCreatePlan::new(&selected.indices())?;

    let priorities = [DEFAULT_QUEUE_PRIORITY];
    let queue_create_infos = plan.create_infos(&priorities);
    let extensions_ptr = requirements.extensions().as_ptrs();
    let enabled_features = requirements.enabled_features();

    let device_create_info = vk::DeviceCreateInfo::default()
        .queue_create_infos(queue_create_infos.as_slice())
        .enabled_extension_names(extensions_ptr.as_slice())
        .enabled_features(&enabled_features);

    let device = driver
        .create_device(selected.physical_device(), &device_create_info)
        .map_err(VulkanError::DeviceCreation)?;

    let graphics_queue = driver.get_device_queue(&device, plan.graphics_family(), 0);
    let present_queue = driver.get_device_queue(&device, plan.present_family(), 0);

    log::info!(
        "Opened {} with {} queue(s): graphics family {}, present family {}",
        selected.name(),
        queue_create_infos.len(),
        plan.graphics_family(),
        plan.present_family()
    );

    Ok(LogicalDeviceHandles {
        device,
        graphics_queue,
        present_queue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_family_is_requested_once() {
        let plan = QueueCreatePlan::new(&QueueFamilyIndices::new(Some(2), Some(2))).unwrap();
        let priorities = [DEFAULT_QUEUE_PRIORITY];
        let infos = plan.create_infos(&priorities);

        assert_eq!(infos.len(), 1);
        assert_eq!(infos[0].queue_family_index, 2);
        assert_eq!(infos[0].queue_count, 1);
    }

    #[test]
    fn distinct_families_are_requested_separately() {
        let plan = QueueCreatePlan::new(&QueueFamilyIndices::new(Some(2), Some(5))).unwrap();
        let priorities = [DEFAULT_QUEUE_PRIORITY];
        let infos = plan.create_infos(&priorities);

        assert_eq!(infos.len(), 2);
        assert_eq!(
            infos.iter().map(|info| info.queue_family_index).collect::<Vec<_>>(),
            vec![2, 5]
        );
        assert!(infos.iter().all(|info| info.queue_count == 1));
    }

    #[test]
    fn incomplete_indices_fail_fast() {
        let err = QueueCreatePlan::new(&QueueFamilyIndices::new(None, Some(0))).unwrap_err();
        assert_eq!(
            err,
            VulkanError::Framework(FrameworkError::MissingGraphicsQueueFamily)
        );

        let err = QueueCreatePlan::new(&QueueFamilyIndices::new(Some(0), None)).unwrap_err();
        assert_eq!(
            err,
            VulkanError::Framework(FrameworkError::MissingPresentQueueFamily)
        );
    }
}
