#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::ffi::{CStr, CString};

use ash::prelude::VkResult;
use ash::vk::{self, Handle};

use vulkan_device_selection::driver::Driver;

pub const SURFACE_RAW: u64 = 0x5EF;

pub fn surface() -> vk::SurfaceKHR {
    vk::SurfaceKHR::from_raw(SURFACE_RAW)
}

pub fn physical_device(index: usize) -> vk::PhysicalDevice {
    vk::PhysicalDevice::from_raw(0x100 + index as u64)
}

fn fill<T: Copy>(source: &[T], count: &mut u32, data: Option<&mut [T]>) -> vk::Result {
    match data {
        None => {
            *count = source.len() as u32;
            vk::Result::SUCCESS
        }
        Some(buffer) => {
            assert_eq!(buffer.len(), *count as usize, "fill buffer not sized to count");
            let written = buffer.len().min(source.len());
            buffer[..written].copy_from_slice(&source[..written]);
            *count = written as u32;
            match written < source.len() {
                true => vk::Result::INCOMPLETE,
                false => vk::Result::SUCCESS,
            }
        }
    }
}

pub fn family(flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
    vk::QueueFamilyProperties::default()
        .queue_flags(flags)
        .queue_count(4)
}

/// A synthetic physical device.
#[derive(Clone)]
pub struct FakeDevice {
    pub name: &'static CStr,
    pub features: vk::PhysicalDeviceFeatures,
    pub extensions: Vec<&'static CStr>,
    pub queue_families: Vec<vk::QueueFamilyProperties>,
    pub present_support: Vec<VkResult<bool>>,
    pub formats: Vec<vk::SurfaceFormatKHR>,
    pub present_modes: Vec<vk::PresentModeKHR>,
    pub extension_enumeration_error: Option<vk::Result>,
}

impl FakeDevice {
    /// Graphics and presentation on family 0, swapchain and geometry shaders available.
    pub fn suitable(name: &'static CStr) -> Self {
        Self {
            name,
            features: vk::PhysicalDeviceFeatures::default().geometry_shader(true),
            extensions: vec![c"VK_KHR_maintenance1", ash::khr::swapchain::NAME],
            queue_families: vec![family(
                vk::QueueFlags::GRAPHICS | vk::QueueFlags::COMPUTE | vk::QueueFlags::TRANSFER,
            )],
            present_support: vec![Ok(true)],
            formats: vec![vk::SurfaceFormatKHR {
                format: vk::Format::B8G8R8A8_SRGB,
                color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
            }],
            present_modes: vec![vk::PresentModeKHR::FIFO, vk::PresentModeKHR::MAILBOX],
            extension_enumeration_error: None,
        }
    }

    pub fn without_swapchain(mut self) -> Self {
        self.extensions.retain(|ext| *ext != ash::khr::swapchain::NAME);
        self
    }

    pub fn with_queue_families(
        mut self,
        families: Vec<vk::QueueFamilyProperties>,
        present_support: Vec<VkResult<bool>>,
    ) -> Self {
        assert_eq!(families.len(), present_support.len());
        self.queue_families = families;
        self.present_support = present_support;
        self
    }
}

/// What the driver received when a logical device was created.
#[derive(Debug, Clone, PartialEq)]
pub struct FakeLogicalDevice {
    pub id: u64,
    pub physical_device: vk::PhysicalDevice,
    pub queue_families: Vec<u32>,
    pub queue_counts: Vec<u32>,
    pub queue_priorities: Vec<f32>,
    pub extensions: Vec<CString>,
    pub geometry_shader: bool,
}

#[derive(Default)]
pub struct FakeDriver {
    pub devices: Vec<FakeDevice>,
    pub device_creation_error: Option<vk::Result>,
    /// Number of surface support queries, one per `SurfaceSupportDetails::query`.
    pub surface_queries: Cell<usize>,
    pub created: RefCell<Vec<FakeLogicalDevice>>,
    pub destroyed: RefCell<Vec<u64>>,
}

impl FakeDriver {
    pub fn new(devices: Vec<FakeDevice>) -> Self {
        Self {
            devices,
            ..Default::default()
        }
    }

    fn device(&self, physical_device: vk::PhysicalDevice) -> &FakeDevice {
        let index = (physical_device.as_raw() - 0x100) as usize;
        &self.devices[index]
    }

    pub fn index_of(&self, physical_device: vk::PhysicalDevice) -> usize {
        (physical_device.as_raw() - 0x100) as usize
    }
}

impl Driver for FakeDriver {
    type LogicalDevice = FakeLogicalDevice;

    fn enumerate_physical_devices(
        &self,
        count: &mut u32,
        data: Option<&mut [vk::PhysicalDevice]>,
    ) -> vk::Result {
        let handles = (0..self.devices.len())
            .map(physical_device)
            .collect::<Vec<_>>();
        fill(&handles, count, data)
    }

    fn enumerate_device_extension_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        count: &mut u32,
        data: Option<&mut [vk::ExtensionProperties]>,
    ) -> vk::Result {
        let device = self.device(physical_device);
        if let Some(err) = device.extension_enumeration_error {
            return err;
        }

        let properties = device
            .extensions
            .iter()
            .map(|name| {
                vk::ExtensionProperties::default()
                    .extension_name(name)
                    .unwrap()
                    .spec_version(1)
            })
            .collect::<Vec<_>>();
        fill(&properties, count, data)
    }

    fn get_queue_family_properties(
        &self,
        physical_device: vk::PhysicalDevice,
        count: &mut u32,
        data: Option<&mut [vk::QueueFamilyProperties]>,
    ) {
        let _ = fill(&self.device(physical_device).queue_families, count, data);
    }

    fn get_surface_formats(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        data: Option<&mut [vk::SurfaceFormatKHR]>,
    ) -> vk::Result {
        assert_eq!(surface.as_raw(), SURFACE_RAW);
        fill(&self.device(physical_device).formats, count, data)
    }

    fn get_surface_present_modes(
        &self,
        physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
        count: &mut u32,
        data: Option<&mut [vk::PresentModeKHR]>,
    ) -> vk::Result {
        assert_eq!(surface.as_raw(), SURFACE_RAW);
        fill(&self.device(physical_device).present_modes, count, data)
    }

    fn get_surface_capabilities(
        &self,
        _physical_device: vk::PhysicalDevice,
        surface: vk::SurfaceKHR,
    ) -> VkResult<vk::SurfaceCapabilitiesKHR> {
        assert_eq!(surface.as_raw(), SURFACE_RAW);
        self.surface_queries.set(self.surface_queries.get() + 1);
        Ok(vk::SurfaceCapabilitiesKHR::default()
            .min_image_count(2)
            .max_image_count(8))
    }

    fn get_surface_support(
        &self,
        physical_device: vk::PhysicalDevice,
        queue_family_index: u32,
        surface: vk::SurfaceKHR,
    ) -> VkResult<bool> {
        assert_eq!(surface.as_raw(), SURFACE_RAW);
        self.device(physical_device).present_support[queue_family_index as usize]
    }

    fn get_physical_device_features(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceFeatures {
        self.device(physical_device).features
    }

    fn get_physical_device_properties(
        &self,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        vk::PhysicalDeviceProperties::default()
            .device_type(vk::PhysicalDeviceType::DISCRETE_GPU)
            .device_name(self.device(physical_device).name)
            .unwrap()
    }

    fn create_device(
        &self,
        physical_device: vk::PhysicalDevice,
        create_info: &vk::DeviceCreateInfo<'_>,
    ) -> VkResult<FakeLogicalDevice> {
        if let Some(err) = self.device_creation_error {
            return Err(err);
        }

        let queue_infos = unsafe {
            std::slice::from_raw_parts(
                create_info.p_queue_create_infos,
                create_info.queue_create_info_count as usize,
            )
        };
        let extensions = unsafe {
            std::slice::from_raw_parts(
                create_info.pp_enabled_extension_names,
                create_info.enabled_extension_count as usize,
            )
            .iter()
            .map(|name| CStr::from_ptr(*name).to_owned())
            .collect::<Vec<_>>()
        };
        let queue_priorities = queue_infos
            .iter()
            .flat_map(|info| unsafe {
                std::slice::from_raw_parts(info.p_queue_priorities, info.queue_count as usize)
                    .to_vec()
            })
            .collect::<Vec<_>>();
        let geometry_shader = unsafe { create_info.p_enabled_features.as_ref() }
            .map(|features| features.geometry_shader == vk::TRUE)
            .unwrap_or(false);

        let mut created = self.created.borrow_mut();
        let device = FakeLogicalDevice {
            id: created.len() as u64 + 1,
            physical_device,
            queue_families: queue_infos.iter().map(|info| info.queue_family_index).collect(),
            queue_counts: queue_infos.iter().map(|info| info.queue_count).collect(),
            queue_priorities,
            extensions,
            geometry_shader,
        };
        created.push(device.clone());
        Ok(device)
    }

    fn get_device_queue(
        &self,
        device: &FakeLogicalDevice,
        queue_family_index: u32,
        queue_index: u32,
    ) -> vk::Queue {
        assert!(device.queue_families.contains(&queue_family_index));
        assert_eq!(queue_index, 0);
        vk::Queue::from_raw((device.id << 16) | (queue_family_index as u64 + 1))
    }

    fn destroy_device(&self, device: FakeLogicalDevice) {
        self.destroyed.borrow_mut().push(device.id);
    }
}
