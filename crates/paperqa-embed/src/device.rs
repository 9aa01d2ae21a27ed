use candle_core::Device;

pub fn select_device() -> Device {
    #[cfg(feature = "metal")]
    {
        if let Ok(dev) = Device::new_metal(0) {
            tracing::info!("embedding device: Metal (MPS)");
            return dev;
        }
    }
    if let Ok(dev) = Device::cuda_if_available(0) {
        if dev.is_cuda() {
            tracing::info!("embedding device: CUDA");
            return dev;
        }
    }
    tracing::info!("embedding device: CPU");
    Device::Cpu
}
