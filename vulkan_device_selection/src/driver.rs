use ash::prelude::VkResult;
use ash::vk;

/**
 * The subset of the vulkan driver used to select a device and open it.
 *
 * Enumerations keep the raw count-then-fill shape of the C API: when `data` is None the
 * implementation writes the number of available elements into `count`, otherwise `data` has
 * exactly `count` slots to be filled and `count` is updated with the number of written ones.
 * Use [`crate::enumerate::enumerate_two_call`] to turn these into owned vectors.
 *
 * Handles passed in are owned by the caller (or by the driver itself) and are never released
 * by an implementation, with the exception of [`Driver::destroy_device`].
 */
pub trait Driver {
    type LogicalDevice;

    fn enumerate_physical_devices(
        &self,
        count: &mut u32,
        data: Option<&mut [vk::PhysicalDevice]>,
    ) -> vk::Result;

    fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        count: &mut u32,
        data: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result;

    fn get_queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        count: &mut u32,
        data: Option<&mut [vk::QueueFamilyProperties]>,
    );

    fn get_surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        data: Option<&mut [vk::SurfaceFormatKHR]>,
    ) -> vk::Result;

    fn get_surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        data: Option<&mut [vk::PresentModeKHR]>,
    ) -> vk::Result;

    fn get_surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR>;

    fn get_surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool>;

    fn get_physical_device_features(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceFeatures;

    fn get_physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties;

    fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<Self::LogicalDevice>;

    fn get_device_queue(
        &self,
        device: &Self::LogicalDevice,
        queue_family_index: u32,
        queue_index: u32,
    ) -> vk::Queue;

    fn destroy_device(&self, device: Self::LogicalDevice);
}

/// Writes the raw pointer pair expected by the C enumeration entry points.
fn out_ptr<T>(count: &mut u32, data: Option<&mut [T]>) -> (*mut u32, *mut T) {
    match data {
        Some(buffer) => {
            debug_assert!(buffer.len() >= *count as usize);
            *count = buffer.len() as u32;
            (count as *mut u32, buffer.as_mut_ptr())
        }
        None => (count as *mut u32, std::ptr::null_mut()),
    }
}

/**
 * Driver backed by a live vulkan instance with the VK_KHR_surface extension loaded.
 *
 * The instance and the surface loader are owned by the upstream collaborator, this struct only
 * keeps the dispatch tables around.
 */
#[derive(Clone)]
pub struct AshDriver {
    instance: ash::Instance,
    surface_khr_ext: ash::khr::surface::Instance,
}

impl AshDriver {
    /**
     * Loads the surface extension function table for the given instance.
     *
     * # Safety
     *
     * `instance` must have been created with VK_KHR_surface enabled and must outlive the
     * returned driver. Every physical device and surface handle given to the driver must
     * belong to `instance`.
     */
    pub unsafe fn new(entry: &ash::Entry, instance: &ash::Instance) -> Self {
        Self {
            instance: instance.clone(),
            surface_khr_ext: ash::khr::surface::Instance::new(entry, instance),
        }
    }

    pub fn ash_handle(&self) -> &ash::Instance {
        &self.instance
    }

    pub(crate) fn get_surface_khr_extension(&self) -> &ash::khr::surface::Instance {
        &self.surface_khr_ext
    }
}

impl Driver for AshDriver {
    type LogicalDevice = ash::Device;

    fn enumerate_physical_devices(
        &self,
        count: &mut u32,
        data: Option<&mut [vk::PhysicalDevice]>,
    ) -> vk::Result {
        let (count_ptr, data_ptr) = out_ptr(count, data);
        unsafe {
            (self.instance.fp_v1_0().enumerate_physical_devices)(
                self.instance.handle(),
                count_ptr,
                data_ptr,
            )
        }
    }

    fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        count: &mut u32,
        data: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        let (count_ptr, data_ptr) = out_ptr(count, data);
        unsafe {
            (self.instance.fp_v1_0().enumerate_device_extension_properties)(
                physical_device,
                std::ptr::null(),
                count_ptr,
                data_ptr,
            )
        }
    }

    fn get_queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        count: &mut u32,
        data: Option<&mut [vk::QueueFamilyProperties]>,
    ) {
        let (count_ptr, data_ptr) = out_ptr(count, data);
        unsafe {
            (self
                .instance
                .fp_v1_0()
                .get_physical_device_queue_family_properties)(
                physical_device, count_ptr, data_ptr
            )
        }
    }

    fn get_surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        data: Option<&mut [vk::SurfaceFormatKHR]>,
    ) -> vk::Result {
        let (count_ptr, data_ptr) = out_ptr(count, data);
        unsafe {
            (self
                .get_surface_khr_extension()
                .fp()
                .get_physical_device_surface_formats_khr)(
                physical_device,
                surface,
                count_ptr,
                data_ptr,
            )
        }
    }

    fn get_surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        data: Option<&mut [vk::PresentModeKHR]>,
    ) -> vk::Result {
        let (count_ptr, data_ptr) = out_ptr(count, data);
        unsafe {
            (self
                .get_surface_khr_extension()
                .fp()
                .get_physical_device_surface_present_modes_khr)(
                physical_device,
                surface,
                count_ptr,
                data_ptr,
            )
        }
    }

    fn get_surface_capabilities(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        unsafe {
            self.get_surface_khr_extension()
                .get_physical_device_surface_capabilities(physical_device, surface)
        }
    }

    fn get_surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        unsafe {
            self.get_surface_khr_extension().get_physical_device_surface_support(
                physical_device,
                queue_family_index,
                surface,
            )
        }
    }

    fn get_physical_device_features(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceFeatures {
        unsafe { self.instance.get_physical_device_features(physical_device) }
    }

    fn get_physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        unsafe { self.instance.get_physical_device_properties(physical_device) }
    }

    fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<ash::Device> {
        unsafe {
            self.instance
                .create_device(physical_device, create_info, None)
        }
    }

    fn get_device_queue(
        &self,
        device: &ash::Device,
        queue_family_index: u32,
        queue_index: u32,
    ) -> vk::Queue {
        unsafe { device.get_device_queue(queue_family_index, queue_index) }
    }

    fn destroy_device(&self, device: ash::Device) {
        unsafe { device.destroy_device(None) }
    }
}
