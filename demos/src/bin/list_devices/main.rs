use demos::DemoContext;
use vulkan_device_selection::device_selection::{
    enumerate_physical_devices, evaluate_device, DeviceRequirements, Suitability,
};

fn main() {
    pretty_env_logger::init();

    let Ok(context) = DemoContext::new(c"list_devices", false) else {
        panic!("Error creating vulkan instance");
    };

    let requirements = DeviceRequirements::default();

    let physical_devices = match enumerate_physical_devices(context.driver()) {
        Ok(physical_devices) => physical_devices,
        Err(err) => {
            println!("Error enumerating physical devices: {err}");
            return;
        }
    };

    println!("{} physical device(s) found", physical_devices.len());

    for (index, physical_device) in physical_devices.iter().enumerate() {
        let properties = unsafe {
            context
                .driver()
                .ash_handle()
                .get_physical_device_properties(*physical_device)
        };
        let name = properties
            .device_name_as_c_str()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();

        match evaluate_device(
            context.driver(),
            *physical_device,
            context.surface(),
            &requirements,
        ) {
            Ok(Suitability::Suitable(indices)) => println!(
                "    {index}) {name}: suitable (graphics {:?}, present {:?})",
                indices.graphics_family(),
                indices.present_family()
            ),
            Ok(Suitability::Unsuitable(reasons)) => {
                println!("    {index}) {name}: unsuitable");
                for reason in reasons.iter() {
                    println!("        - {reason}");
                }
            }
            Err(err) => println!("    {index}) {name}: error evaluating the device: {err}"),
        }
    }
}
