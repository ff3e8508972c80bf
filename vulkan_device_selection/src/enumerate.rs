use crate::prelude::{FrameworkError, VulkanError, VulkanResult};

/**
 * Runs a vulkan count-then-fill enumeration and returns the data as an owned vector.
 *
 * The fill callback is invoked first with no buffer so that the driver writes the number of
 * available elements, then with a buffer of exactly that many default-initialized slots.
 * If the driver reports VK_INCOMPLETE on the second call the set has grown in the meantime
 * and the whole query is performed again.
 *
 * A count of zero is not an error: an empty vector is returned without a second call.
 *
 * @param what human readable name of the enumerated objects, used in errors and logs
 * @param fill the driver call, receives the count (in/out) and an optional output buffer
 */
pub fn enumerate_two_call<T, F>(what: &'static str, mut fill: F) -> VulkanResult<Vec<T>>
where
    T: Default + Clone,
    F: FnMut(&mut u32, Option<&mut [T]>) -> ash::vk::Result,
{
    loop {
        let mut count: u32 = 0;
        match fill(&mut count, None) {
            ash::vk::Result::SUCCESS => {}
            result => return Err(VulkanError::Enumeration { what, result }),
        }

        if count == 0 {
            log::trace!("no {what} reported");
            return Ok(Vec::new());
        }

        let mut data: Vec<T> = Vec::new();
        if data.try_reserve_exact(count as usize).is_err() {
            return Err(VulkanError::Framework(FrameworkError::MallocFail(what)));
        }
        data.resize(count as usize, T::default());

        match fill(&mut count, Some(data.as_mut_slice())) {
            ash::vk::Result::SUCCESS => {
                data.truncate(count as usize);
                log::trace!("enumerated {} {what}", data.len());
                return Ok(data);
            }
            ash::vk::Result::INCOMPLETE => {
                log::debug!("{what} changed between count and fill calls, querying again");
                continue;
            }
            result => return Err(VulkanError::Enumeration { what, result }),
        }
    }
}

/// Same as [`enumerate_two_call`] for driver calls that cannot fail.
pub fn enumerate_two_call_infallible<T, F>(what: &'static str, mut fill: F) -> VulkanResult<Vec<T>>
where
    T: Default + Clone,
    F: FnMut(&mut u32, Option<&mut [T]>),
{
    enumerate_two_call(what, |count, data| {
        fill(count, data);
        ash::vk::Result::SUCCESS
    })
}
