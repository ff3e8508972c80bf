use demos::DemoContext;
use vulkan_device_selection::{
    device_selection::{initialize_device, DeviceRequirements, LogErrorSink},
    prelude::VulkanResult,
};

fn run() -> VulkanResult<()> {
    let context = DemoContext::new(c"hello_device", cfg!(debug_assertions))?;

    println!("Vulkan instance and headless surface created");

    let requirements = DeviceRequirements::default();

    let (selected, handles) = initialize_device(
        context.driver(),
        context.surface(),
        &requirements,
        &LogErrorSink,
    )?;

    println!("Device opened successfully: {}", selected.name());
    println!(
        "    graphics family {:?}, present family {:?}, shared queue: {}",
        selected.indices().graphics_family(),
        selected.indices().present_family(),
        handles.queues_alias()
    );

    handles.destroy(context.driver());

    Ok(())
}

fn main() {
    pretty_env_logger::init();

    if let Err(err) = run() {
        println!("Error opening a suitable device ({}): {}", err.code(), err);
        std::process::exit(1);
    }
}
