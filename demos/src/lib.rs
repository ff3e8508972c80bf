use std::ffi::CStr;
use std::os::raw::c_char;

use ash::vk;

use vulkan_device_selection::{
    driver::AshDriver,
    enumerate::enumerate_two_call,
    prelude::{VulkanError, VulkanResult},
};

pub const VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

/**
 * Checks that every required instance layer is available.
 *
 * Returns the name of the first missing layer, if any.
 */
pub fn check_validation_layer_support<'a>(
    entry: &ash::Entry,
    required_layers: &[&'a CStr],
) -> VulkanResult<Option<&'a CStr>> {
    log::debug!("Starting validation layer support check");

    let available_layers = enumerate_two_call("instance layers", |count, data| unsafe {
        (entry.fp_v1_0().enumerate_instance_layer_properties)(
            count,
            data.map_or(std::ptr::null_mut(), |buffer| buffer.as_mut_ptr()),
        )
    })?;

    log::debug!("Total layers found: {}", available_layers.len());

    for required_layer in required_layers.iter() {
        let found = available_layers
            .iter()
            .any(|layer| layer.layer_name_as_c_str() == Ok(*required_layer));

        if !found {
            log::debug!("Required layer {:?} not found", required_layer);
            return Ok(Some(*required_layer));
        }
    }

    log::debug!("All required layers found");
    Ok(None)
}

/// Instance, headless surface and driver used by the demos, destroyed on drop.
pub struct DemoContext {
    entry: ash::Entry,
    instance: ash::Instance,
    surface: vk::SurfaceKHR,
    driver: AshDriver,
}

impl Drop for DemoContext {
    fn drop(&mut self) {
        let surface_khr_ext = ash::khr::surface::Instance::new(&self.entry, &self.instance);
        unsafe {
            surface_khr_ext.destroy_surface(self.surface, None);
            self.instance.destroy_instance(None);
        }
    }
}

impl DemoContext {
    pub fn new(app_name: &CStr, enable_debugging: bool) -> VulkanResult<Self> {
        let entry = unsafe { ash::Entry::load() }.map_err(|err| {
            VulkanError::Framework(vulkan_device_selection::prelude::FrameworkError::UserInput(
                format!("cannot load the vulkan library: {err}"),
            ))
        })?;

        let mut enabled_layers: Vec<*const c_char> = vec![];
        if enable_debugging {
            match check_validation_layer_support(&entry, &[VALIDATION_LAYER])? {
                None => enabled_layers.push(VALIDATION_LAYER.as_ptr()),
                Some(missing) => log::warn!(
                    "Validation layer {:?} is not available, continuing without it",
                    missing
                ),
            }
        }

        let enabled_extensions = [
            ash::khr::surface::NAME.as_ptr(),
            ash::ext::headless_surface::NAME.as_ptr(),
        ];

        let app_info = vk::ApplicationInfo::default()
            .application_name(app_name)
            .application_version(vk::make_api_version(0, 1, 0, 0))
            .engine_name(c"No Engine")
            .engine_version(vk::make_api_version(0, 1, 0, 0))
            .api_version(vk::API_VERSION_1_0);

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_info)
            .enabled_layer_names(enabled_layers.as_slice())
            .enabled_extension_names(&enabled_extensions);

        let instance = unsafe { entry.create_instance(&create_info, None) }.map_err(|result| {
            VulkanError::Query {
                what: "instance creation",
                result,
            }
        })?;

        let headless_ext = ash::ext::headless_surface::Instance::new(&entry, &instance);
        let surface = match unsafe {
            headless_ext.create_headless_surface(&vk::HeadlessSurfaceCreateInfoEXT::default(), None)
        } {
            Ok(surface) => surface,
            Err(result) => {
                unsafe { instance.destroy_instance(None) };
                return Err(VulkanError::Query {
                    what: "headless surface creation",
                    result,
                });
            }
        };

        let driver = unsafe { AshDriver::new(&entry, &instance) };

        Ok(Self {
            entry,
            instance,
            surface,
            driver,
        })
    }

    pub fn driver(&self) -> &AshDriver {
        &self.driver
    }

    pub fn surface(&self) -> vk::SurfaceKHR {
        self.surface
    }
}
