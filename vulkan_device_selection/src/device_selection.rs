use std::ffi::CString;
use std::fmt::Display;

use ash::vk;

use crate::{
    capability::{list_device_extensions, RequiredExtensionSet, SurfaceSupportDetails},
    device::{create_logical_device, LogicalDeviceHandles},
    driver::Driver,
    enumerate::enumerate_two_call,
    prelude::{ErrorCode, FrameworkError, Rejections, VulkanError, VulkanResult},
    queue_family::{find_queue_families, QueueFamilyIndices},
};

/**
 * Physical device features that can be required from a candidate device.
 *
 * Each one maps to the homonymous VkBool32 field of VkPhysicalDeviceFeatures.
 */
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DeviceFeature {
    GeometryShader,
    TessellationShader,
    SamplerAnisotropy,
    FillModeNonSolid,
    WideLines,
    DepthClamp,
    IndependentBlend,
    MultiDrawIndirect,
    ShaderFloat64,
    ShaderInt64,
}

impl DeviceFeature {
    pub fn name(&self) -> &'static str {
        match self {
            DeviceFeature::GeometryShader => "geometryShader",
            DeviceFeature::TessellationShader => "tessellationShader",
            DeviceFeature::SamplerAnisotropy => "samplerAnisotropy",
            DeviceFeature::FillModeNonSolid => "fillModeNonSolid",
            DeviceFeature::WideLines => "wideLines",
            DeviceFeature::DepthClamp => "depthClamp",
            DeviceFeature::IndependentBlend => "independentBlend",
            DeviceFeature::MultiDrawIndirect => "multiDrawIndirect",
            DeviceFeature::ShaderFloat64 => "shaderFloat64",
            DeviceFeature::ShaderInt64 => "shaderInt64",
        }
    }

    fn flag(&self, features: &vk::PhysicalDeviceFeatures) -> vk::Bool32 {
        match self {
            DeviceFeature::GeometryShader => features.geometry_shader,
            DeviceFeature::TessellationShader => features.tessellation_shader,
            DeviceFeature::SamplerAnisotropy => features.sampler_anisotropy,
            DeviceFeature::FillModeNonSolid => features.fill_mode_non_solid,
            DeviceFeature::WideLines => features.wide_lines,
            DeviceFeature::DepthClamp => features.depth_clamp,
            DeviceFeature::IndependentBlend => features.independent_blend,
            DeviceFeature::MultiDrawIndirect => features.multi_draw_indirect,
            DeviceFeature::ShaderFloat64 => features.shader_float64,
            DeviceFeature::ShaderInt64 => features.shader_int64,
        }
    }

    pub fn is_supported(&self, features: &vk::PhysicalDeviceFeatures) -> bool {
        self.flag(features) == vk::TRUE
    }

    pub fn enable(&self, features: vk::PhysicalDeviceFeatures) -> vk::PhysicalDeviceFeatures {
        match self {
            DeviceFeature::GeometryShader => features.geometry_shader(true),
            DeviceFeature::TessellationShader => features.tessellation_shader(true),
            DeviceFeature::SamplerAnisotropy => features.sampler_anisotropy(true),
            DeviceFeature::FillModeNonSolid => features.fill_mode_non_solid(true),
            DeviceFeature::WideLines => features.wide_lines(true),
            DeviceFeature::DepthClamp => features.depth_clamp(true),
            DeviceFeature::IndependentBlend => features.independent_blend(true),
            DeviceFeature::MultiDrawIndirect => features.multi_draw_indirect(true),
            DeviceFeature::ShaderFloat64 => features.shader_float64(true),
            DeviceFeature::ShaderInt64 => features.shader_int64(true),
        }
    }
}

/**
 * What a device has to provide in order to be selected.
 *
 * The default asks for VK_KHR_swapchain and geometry shaders.
 */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRequirements {
    extensions: RequiredExtensionSet,
    features: Vec<DeviceFeature>,
}

impl Default for DeviceRequirements {
    fn default() -> Self {
        Self::new(
            RequiredExtensionSet::new([ash::khr::swapchain::NAME]),
            &[DeviceFeature::GeometryShader],
        )
    }
}

impl DeviceRequirements {
    pub fn new(extensions: RequiredExtensionSet, features: &[DeviceFeature]) -> Self {
        let mut requirements = Self {
            extensions,
            features: vec![],
        };
        for feature in features.iter() {
            requirements = requirements.with_feature(*feature);
        }
        requirements
    }

    pub fn with_extension(mut self, name: &std::ffi::CStr) -> Self {
        self.extensions.insert(name);
        self
    }

    pub fn with_feature(mut self, feature: DeviceFeature) -> Self {
        if !self.features.contains(&feature) {
            self.features.push(feature);
        }
        self
    }

    pub fn extensions(&self) -> &RequiredExtensionSet {
        &self.extensions
    }

    pub fn features(&self) -> &[DeviceFeature] {
        self.features.as_slice()
    }

    /// Features record with every required feature turned on, everything else off.
    pub fn enabled_features(&self) -> vk::PhysicalDeviceFeatures {
        self.features
            .iter()
            .fold(vk::PhysicalDeviceFeatures::default(), |features, feature| {
                feature.enable(features)
            })
    }
}

/// A single criterion a candidate device failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Unsuitability {
    MissingGraphicsQueueFamily,
    MissingPresentQueueFamily,
    MissingFeature(DeviceFeature),
    MissingExtensions(Vec<CString>),
    InadequateSwapchain {
        formats: usize,
        present_modes: usize,
    },
}

impl Display for Unsuitability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Unsuitability::MissingGraphicsQueueFamily => {
                write!(f, "no queue family supports graphics")
            }
            Unsuitability::MissingPresentQueueFamily => {
                write!(f, "no queue family can present to the surface")
            }
            Unsuitability::MissingFeature(feature) => {
                write!(f, "feature {} is not supported", feature.name())
            }
            Unsuitability::MissingExtensions(names) => {
                write!(f, "missing extension(s)")?;
                for name in names.iter() {
                    write!(f, " {}", name.to_string_lossy())?;
                }
                Ok(())
            }
            Unsuitability::InadequateSwapchain {
                formats,
                present_modes,
            } => write!(
                f,
                "inadequate swapchain support ({formats} format(s), {present_modes} present mode(s))"
            ),
        }
    }
}

/// Why a candidate device has been skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rejection {
    pub device_name: String,
    pub reasons: Vec<Unsuitability>,
}

impl Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: ", self.device_name)?;
        for (index, reason) in self.reasons.iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{reason}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Suitability {
    Suitable(QueueFamilyIndices),
    Unsuitable(Vec<Unsuitability>),
}

impl Suitability {
    pub fn is_suitable(&self) -> bool {
        matches!(self, Suitability::Suitable(_))
    }
}

/// The physical device chosen for rendering together with its resolved queue families.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedDevice {
    physical_device: vk::PhysicalDevice,
    indices: QueueFamilyIndices,
    name: String,
}

impl SelectedDevice {
    pub fn physical_device(&self) -> vk::PhysicalDevice {
        self.physical_device
    }

    pub fn indices(&self) -> QueueFamilyIndices {
        self.indices
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

pub(crate) fn device_name<D: Driver>(driver: &D, physical_device: vk::PhysicalDevice) -> String {
    let properties = driver.get_physical_device_properties(physical_device);
    match properties.device_name_as_c_str() {
        Ok(name) => name.to_string_lossy().into_owned(),
        Err(_) => format!("device {:#x}", ash::vk::Handle::as_raw(physical_device)),
    }
}

pub fn enumerate_physical_devices<D: Driver>(driver: &D) -> VulkanResult<Vec<vk::PhysicalDevice>> {
    enumerate_two_call("physical devices", |count, data| {
        driver.enumerate_physical_devices(count, data)
    })
}

/**
 * Checks a single device against the requirements.
 *
 * Every failed criterion is reported. Surface support is only queried once all required
 * extensions are known to be available, as the queries are meaningless otherwise.
 */
pub fn evaluate_device<D: Driver>(
    driver: &D,
    physical_device: vk::PhysicalDevice,
    surface: vk::SurfaceKHR,
    requirements: &DeviceRequirements,
) -> VulkanResult<Suitability> {
    let indices = find_queue_families(driver, physical_device, surface)?;
    let features = driver.get_physical_device_features(physical_device);

    let mut reasons = vec![];

    if indices.graphics_family().is_none() {
        reasons.push(Unsuitability::MissingGraphicsQueueFamily);
    }

    if indices.present_family().is_none() {
        reasons.push(Unsuitability::MissingPresentQueueFamily);
    }

    for feature in requirements.features().iter() {
        if !feature.is_supported(&features) {
            reasons.push(Unsuitability::MissingFeature(*feature));
        }
    }

    let available_extensions = list_device_extensions(driver, physical_device)?;
    let missing_extensions = requirements.extensions().missing_from(&available_extensions);

    match missing_extensions.is_empty() {
        true => {
            let details = SurfaceSupportDetails::query(driver, physical_device, surface)?;
            if !details.is_swapchain_adequate() {
                reasons.push(Unsuitability::InadequateSwapchain {
                    formats: details.formats.len(),
                    present_modes: details.present_modes.len(),
                });
            }
        }
        false => reasons.push(Unsuitability::MissingExtensions(missing_extensions)),
    }

    Ok(match reasons.is_empty() {
        true => Suitability::Suitable(indices),
        false => Suitability::Unsuitable(reasons),
    })
}

/**
 * Returns the first suitable device in driver enumeration order.
 *
 * Devices are not ranked: a later device with more capabilities does not replace an earlier
 * suitable one.
 *
 * @param candidates physical devices in the order the driver enumerated them
 * @param surface the surface rendered images will be presented to
 */
pub fn pick_device<D: Driver>(
    driver: &D,
    candidates: &[vk::PhysicalDevice],
    surface: vk::SurfaceKHR,
    requirements: &DeviceRequirements,
) -> VulkanResult<SelectedDevice> {
    let mut rejections = vec![];

    for physical_device in candidates.iter() {
        let name = device_name(driver, *physical_device);

        match evaluate_device(driver, *physical_device, surface, requirements)? {
            Suitability::Suitable(indices) => {
                log::info!("Device Name: {name}");
                return Ok(SelectedDevice {
                    physical_device: *physical_device,
                    indices,
                    name,
                });
            }
            Suitability::Unsuitable(reasons) => {
                let rejection = Rejection {
                    device_name: name,
                    reasons,
                };
                log::debug!("Skipping device {rejection}");
                rejections.push(rejection);
            }
        }
    }

    Err(VulkanError::Framework(
        FrameworkError::NoSuitableDeviceFound(Rejections(rejections)),
    ))
}

/// Receives fatal errors raised while selecting and opening the device.
pub trait ErrorSink {
    fn report(&self, code: ErrorCode, error: &VulkanError);
}

impl<F> ErrorSink for F
where
    F: Fn(ErrorCode, &VulkanError),
{
    fn report(&self, code: ErrorCode, error: &VulkanError) {
        self(code, error)
    }
}

/// Sink writing errors to the `log` facade.
#[derive(Debug, Copy, Clone, Default)]
pub struct LogErrorSink;

impl ErrorSink for LogErrorSink {
    fn report(&self, code: ErrorCode, error: &VulkanError) {
        log::error!("[{code}] {error}");
    }
}

/**
 * Selects a device able to render and present to the given surface, then opens it.
 *
 * On failure the error is reported once to the sink and returned: nothing is retried and no
 * fallback device is used.
 */
pub fn initialize_device<D: Driver, S: ErrorSink + ?Sized>(
    driver: &D,
    surface: vk::SurfaceKHR,
    requirements: &DeviceRequirements,
    sink: &S,
) -> VulkanResult<(SelectedDevice, LogicalDeviceHandles<D::LogicalDevice>)> {
    let result = enumerate_physical_devices(driver)
        .and_then(|candidates| pick_device(driver, candidates.as_slice(), surface, requirements))
        .and_then(|selected| {
            create_logical_device(driver, &selected, requirements).map(|handles| (selected, handles))
        });

    if let Err(err) = result.as_ref() {
        sink.report(err.code(), err);
    }

    result
}
